//! Connection front door over real TCP sockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use encourage_ledger::{InMemoryLedger, Proposal};
use encourage_settlement::{SessionHandler, listener, start_contract};
use encourage_types::constants::MAX_FRAME_LEN;
use encourage_types::{ContractConfig, ListenerConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;
use tokio::task::JoinHandle;

type Lines = tokio::io::Lines<BufReader<OwnedReadHalf>>;

async fn read_line(lines: &mut Lines) -> String {
    tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("reply within timeout")
        .expect("read ok")
        .expect("line present")
}

/// Contract with an active admin and a running listener.
async fn serve_with_admin() -> (
    Arc<InMemoryLedger>,
    encourage_types::OfferId,
    Arc<SessionHandler>,
    SocketAddr,
    watch::Sender<bool>,
    JoinHandle<encourage_types::Result<()>>,
) {
    let ledger = Arc::new(InMemoryLedger::new());
    let config = ContractConfig {
        listener: Some(ListenerConfig {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
        }),
        ..ContractConfig::default()
    };
    let listener_config = config.listener.clone().unwrap();
    let started = start_contract(config, ledger.clone()).await.unwrap();
    let admin = ledger
        .redeem(started.admin_invitation, Proposal::empty())
        .await
        .unwrap()
        .offer_id;
    let sessions = started.sessions.unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (addr, server) = listener::spawn(&listener_config, Arc::clone(&sessions), shutdown_rx)
        .await
        .unwrap();
    (ledger, admin, sessions, addr, shutdown_tx, server)
}

async fn connect(addr: SocketAddr) -> (String, Lines, OwnedWriteHalf) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let local = stream.local_addr().unwrap().to_string();
    let (reader, writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    assert_eq!(
        read_line(&mut lines).await,
        format!("Hi {local}! I'm the encouragement dapp!")
    );
    (local, lines, writer)
}

#[tokio::test]
async fn non_utf8_packet_still_answered() {
    let (_ledger, _admin, sessions, addr, shutdown_tx, server) = serve_with_admin().await;
    let (local, mut lines, mut writer) = connect(addr).await;

    writer.write_all(b"\xff\xfe payload\n").await.unwrap();
    assert_eq!(
        read_line(&mut lines).await,
        format!("{local}: Wow, just wow. I have never seen such talent!")
    );
    writer.write_all(b"\xff\n").await.unwrap();
    assert_eq!(read_line(&mut lines).await, format!("{local}: You're doing great!"));
    assert_eq!(sessions.active_sessions(), 1);

    shutdown_tx.send(true).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn overlong_frame_closes_only_that_connection() {
    let (_ledger, _admin, sessions, addr, shutdown_tx, server) = serve_with_admin().await;
    let (_, mut flooding, mut flood_writer) = connect(addr).await;
    let (local, mut lines, mut writer) = connect(addr).await;

    flood_writer
        .write_all(&vec![b'x'; MAX_FRAME_LEN + 1])
        .await
        .unwrap();
    let closed = tokio::time::timeout(Duration::from_secs(5), flooding.next_line())
        .await
        .expect("closed within timeout");
    assert!(matches!(closed, Ok(None) | Err(_)));

    writer.write_all(b"still here\n").await.unwrap();
    assert_eq!(
        read_line(&mut lines).await,
        format!("{local}: Wow, just wow. I have never seen such talent!")
    );
    assert_eq!(sessions.active_sessions(), 1);

    shutdown_tx.send(true).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_closes_open_connections() {
    let (_ledger, _admin, sessions, addr, shutdown_tx, server) = serve_with_admin().await;
    let (_, mut lines, _writer) = connect(addr).await;
    assert_eq!(sessions.active_sessions(), 1);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server stops")
        .unwrap()
        .unwrap();
    assert_eq!(sessions.active_sessions(), 0);
    let eof = tokio::time::timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("peer sees close");
    assert!(matches!(eof, Ok(None) | Err(_)));
}

#[tokio::test]
async fn tcp_session_replies_in_sequence() {
    encourage_settlement::init_tracing();

    let ledger = Arc::new(InMemoryLedger::new());
    let config = ContractConfig {
        listener: Some(ListenerConfig {
            listen_addr: "127.0.0.1:0".parse().unwrap(),
        }),
        ..ContractConfig::default()
    };
    let listener_config = config.listener.clone().unwrap();
    let started = start_contract(config, ledger.clone()).await.unwrap();
    let admin = ledger
        .redeem(started.admin_invitation, Proposal::empty())
        .await
        .unwrap()
        .offer_id;
    let sessions = started.sessions.clone().unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (addr, server) = listener::spawn(&listener_config, Arc::clone(&sessions), shutdown_rx)
        .await
        .unwrap();

    let stream = TcpStream::connect(addr).await.unwrap();
    let local = stream.local_addr().unwrap().to_string();
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    assert_eq!(
        read_line(&mut lines).await,
        format!("Hi {local}! I'm the encouragement dapp!")
    );

    writer.write_all(b"first\n").await.unwrap();
    assert_eq!(
        read_line(&mut lines).await,
        format!("{local}: Wow, just wow. I have never seen such talent!")
    );

    writer.write_all(b"second\n").await.unwrap();
    assert_eq!(read_line(&mut lines).await, format!("{local}: You're doing great!"));

    ledger.exit(admin).unwrap();
    writer.write_all(b"third\n").await.unwrap();
    assert_eq!(
        read_line(&mut lines).await,
        format!("Sorry, {local}: We are no longer giving encouragement.")
    );

    // Session released once the peer hangs up.
    drop(writer);
    drop(lines);
    tokio::time::timeout(Duration::from_secs(5), async {
        while sessions.active_sessions() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session released");

    shutdown_tx.send(true).unwrap();
    server.await.unwrap().unwrap();
    assert_eq!(started.public.get_notifier().latest().count, 0);
}

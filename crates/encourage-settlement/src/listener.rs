//! TCP port adapter for the session handler.
//!
//! Each accepted socket becomes one session. Inbound packets are
//! newline-delimited raw bytes capped at [`MAX_FRAME_LEN`]; every reply is
//! written as one line. The ack/nack verdict is logged, since a raw socket
//! has no channel for it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use encourage_types::constants::MAX_FRAME_LEN;
use encourage_types::{ConnectionId, EncourageError, ListenerConfig, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::session::{Connection, SessionHandler};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Write half of an accepted socket.
pub struct TcpConnection {
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    #[must_use]
    pub fn new(writer: OwnedWriteHalf) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send(&self, message: &str) -> Result<()> {
        let mut writer = self.writer.lock().await;
        let mut line = Vec::with_capacity(message.len() + 1);
        line.extend_from_slice(message.as_bytes());
        line.push(b'\n');
        writer
            .write_all(&line)
            .await
            .map_err(|e| EncourageError::SendFailed {
                reason: e.to_string(),
            })
    }
}

/// Bind `config.listen_addr` and serve in a background task.
///
/// Returns the bound address (useful with port 0) and the serve task.
pub async fn spawn(
    config: &ListenerConfig,
    sessions: Arc<SessionHandler>,
    shutdown: watch::Receiver<bool>,
) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
    let listener = TcpListener::bind(config.listen_addr).await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(serve(listener, sessions, shutdown));
    Ok((addr, handle))
}

/// Accept connections until `shutdown` flips to `true` or its sender drops.
///
/// Connection tasks see the same signal; `serve` returns once all of them
/// have closed their sessions.
pub async fn serve(
    listener: TcpListener,
    sessions: Arc<SessionHandler>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let local = listener.local_addr()?;
    info!(addr = %local, "Encouragement listener started");
    let mut connections = JoinSet::new();

    while !*shutdown.borrow() {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, remote)) => {
                        let sessions = Arc::clone(&sessions);
                        let shutdown = shutdown.clone();
                        connections.spawn(async move {
                            let result =
                                handle_connection(stream, local, remote, sessions, shutdown).await;
                            if let Err(e) = result {
                                warn!(remote = %remote, error = %e, "Connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "Accept failed");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }
    }

    drop(listener);
    while connections.join_next().await.is_some() {}
    info!(addr = %local, "Encouragement listener stopped");
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    local: SocketAddr,
    remote: SocketAddr,
    sessions: Arc<SessionHandler>,
    shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let (reader, writer) = stream.into_split();
    let conn = TcpConnection::new(writer);
    let id = sessions.on_accept(&local.to_string(), &remote.to_string());
    let result = drive(&sessions, id, &conn, reader, shutdown).await;
    sessions.on_close(id);
    result
}

async fn drive(
    sessions: &SessionHandler,
    id: ConnectionId,
    conn: &TcpConnection,
    reader: OwnedReadHalf,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    sessions.on_open(id, conn).await?;
    let mut reader = BufReader::new(reader);
    let mut frame = Vec::new();
    loop {
        frame.clear();
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    debug!(conn = %id, "Listener shutting down; closing connection");
                    return Ok(());
                }
            }
            read = read_frame(&mut reader, &mut frame) => {
                if !read? {
                    return Ok(());
                }
                let ack = sessions.on_receive(id, conn, &frame).await?;
                debug!(conn = %id, %ack, "Packet handled");
            }
        }
    }
}

/// Read one newline-terminated frame into `frame`, newline stripped.
///
/// Returns `false` at end of stream. A trailing frame without a newline is
/// still delivered.
async fn read_frame<R>(reader: &mut R, frame: &mut Vec<u8>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
{
    let limit = (MAX_FRAME_LEN + 1) as u64;
    let read = reader.take(limit).read_until(b'\n', frame).await?;
    if read == 0 {
        return Ok(false);
    }
    if frame.last() == Some(&b'\n') {
        frame.pop();
        if frame.last() == Some(&b'\r') {
            frame.pop();
        }
    } else if frame.len() > MAX_FRAME_LEN {
        return Err(EncourageError::FrameTooLong {
            limit: MAX_FRAME_LEN,
        });
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn frames(input: &[u8]) -> Result<Vec<Vec<u8>>> {
        let mut reader = BufReader::new(input);
        let mut out = Vec::new();
        let mut frame = Vec::new();
        loop {
            frame.clear();
            if !read_frame(&mut reader, &mut frame).await? {
                return Ok(out);
            }
            out.push(frame.clone());
        }
    }

    #[tokio::test]
    async fn frames_split_on_newline() {
        let got = frames(b"one\r\ntwo\n\nlast").await.unwrap();
        assert_eq!(got, vec![b"one".to_vec(), b"two".to_vec(), Vec::new(), b"last".to_vec()]);
    }

    #[tokio::test]
    async fn frames_carry_raw_bytes() {
        let got = frames(b"\xff\xfe payload\n").await.unwrap();
        assert_eq!(got, vec![b"\xff\xfe payload".to_vec()]);
    }

    #[tokio::test]
    async fn frame_at_limit_accepted() {
        let mut input = vec![b'a'; MAX_FRAME_LEN];
        input.push(b'\n');
        let got = frames(&input).await.unwrap();
        assert_eq!(got[0].len(), MAX_FRAME_LEN);
    }

    #[tokio::test]
    async fn overlong_frame_rejected() {
        let input = vec![b'a'; MAX_FRAME_LEN + 10];
        let err = frames(&input).await.unwrap_err();
        assert!(matches!(err, EncourageError::FrameTooLong { .. }));
    }
}

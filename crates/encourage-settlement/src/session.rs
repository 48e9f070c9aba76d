//! Connection session handler: the informational front door.
//!
//! ## State Machine (per connection)
//!
//! ```text
//!   accept    ┌───────┐  first reply   ┌────────┐
//!  ──────────▶│ FRESH ├───────────────▶│ STEADY │──┐ later replies
//!             └───────┘                └────────┘◀─┘
//! ```
//!
//! FRESH replies with the premium message, STEADY with the basic one. While
//! no admin offer is active every packet is answered with an apology and
//! nacked, and the phase does not move. Sessions never touch tip accounting.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use encourage_types::{ConnectionId, EncourageError, Messages, Result, constants};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::engine::SettlementEngine;

/// Outbound half of a connection.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Verdict returned to the port for each received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    Ack,
    Nack,
}

impl std::fmt::Display for Ack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ack => write!(f, "ack"),
            Self::Nack => write!(f, "nack"),
        }
    }
}

/// Where a connection is in its reply sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Accepted, nothing sent in reply yet.
    Fresh,
    /// At least one reply sent.
    Steady,
}

impl SessionPhase {
    /// Message the next reply will carry.
    #[must_use]
    pub fn next_message<'a>(&self, messages: &'a Messages) -> &'a str {
        match self {
            Self::Fresh => &messages.premium,
            Self::Steady => &messages.basic,
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fresh => write!(f, "FRESH"),
            Self::Steady => write!(f, "STEADY"),
        }
    }
}

/// Per-connection record.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    pub local_addr: String,
    pub remote_addr: String,
    pub phase: SessionPhase,
}

/// Owns every open session, keyed by connection.
pub struct SessionHandler {
    engine: Arc<SettlementEngine>,
    sessions: Mutex<HashMap<ConnectionId, ConnectionSession>>,
}

impl SessionHandler {
    #[must_use]
    pub fn new(engine: Arc<SettlementEngine>) -> Self {
        Self {
            engine,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start tracking a newly accepted connection in the FRESH phase.
    pub fn on_accept(&self, local_addr: &str, remote_addr: &str) -> ConnectionId {
        let id = ConnectionId::new();
        self.sessions.lock().insert(
            id,
            ConnectionSession {
                local_addr: local_addr.to_string(),
                remote_addr: remote_addr.to_string(),
                phase: SessionPhase::Fresh,
            },
        );
        info!(conn = %id, remote = remote_addr, "Connection accepted");
        id
    }

    /// Greet the peer. Sent regardless of admin liveness.
    pub async fn on_open(&self, id: ConnectionId, conn: &dyn Connection) -> Result<()> {
        let remote = self.remote_addr(id)?;
        conn.send(&format!("Hi {remote}! I'm the {}!", constants::CONTRACT_NAME))
            .await
    }

    /// Answer one inbound packet.
    ///
    /// # Errors
    /// `UnknownConnection` for untracked ids; send and ledger failures
    /// propagate.
    pub async fn on_receive(
        &self,
        id: ConnectionId,
        conn: &dyn Connection,
        bytes: &[u8],
    ) -> Result<Ack> {
        let remote = self.remote_addr(id)?;

        if !self.engine.is_admin_active().await? {
            conn.send(&format!("Sorry, {remote}: {}.", constants::NO_LONGER_GIVING))
                .await?;
            warn!(conn = %id, remote = %remote, "Packet nacked: no active admin offer");
            return Ok(Ack::Nack);
        }

        let message = {
            let sessions = self.sessions.lock();
            let session = sessions
                .get(&id)
                .ok_or(EncourageError::UnknownConnection(id))?;
            session.phase.next_message(self.engine.messages()).to_string()
        };
        conn.send(&format!("{remote}: {message}")).await?;

        // Closed while sending: nothing left to advance.
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.phase = SessionPhase::Steady;
        }
        debug!(conn = %id, bytes = bytes.len(), "Packet acked");
        Ok(Ack::Ack)
    }

    /// Forget a closed connection.
    pub fn on_close(&self, id: ConnectionId) -> Option<ConnectionSession> {
        let session = self.sessions.lock().remove(&id);
        if session.is_some() {
            info!(conn = %id, "Connection closed");
        }
        session
    }

    #[must_use]
    pub fn session(&self, id: ConnectionId) -> Option<ConnectionSession> {
        self.sessions.lock().get(&id).cloned()
    }

    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    fn remote_addr(&self, id: ConnectionId) -> Result<String> {
        self.sessions
            .lock()
            .get(&id)
            .map(|s| s.remote_addr.clone())
            .ok_or(EncourageError::UnknownConnection(id))
    }
}

//! Error types for the encouragement contract.
//!
//! All errors use the `EN_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Offer errors
//! - 2xx: Amount errors
//! - 3xx: Reallocation errors
//! - 4xx: Invitation errors
//! - 5xx: Connection errors
//! - 9xx: General errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ConnectionId, InvitationId, OfferId, OfferState};

/// Central error enum for all encouragement contract operations.
#[derive(Debug, Error)]
pub enum EncourageError {
    // =================================================================
    // Offer Errors (1xx)
    // =================================================================
    /// The ledger has no offer with this identity.
    #[error("EN_ERR_100: Offer not found: {0}")]
    OfferNotFound(OfferId),

    /// The offer exists but is no longer active.
    #[error("EN_ERR_101: Offer {id} is {state}, not ACTIVE")]
    OfferNotActive { id: OfferId, state: OfferState },

    /// An illegal lifecycle transition was requested.
    #[error("EN_ERR_102: Cannot transition offer {id} from {from} to {to}")]
    InvalidTransition {
        id: OfferId,
        from: OfferState,
        to: OfferState,
    },

    // =================================================================
    // Amount Errors (2xx)
    // =================================================================
    /// An amount would become negative.
    #[error("EN_ERR_200: Amount must be non-negative, got {0}")]
    AmountNegative(Decimal),

    /// Adding two amounts overflowed.
    #[error("EN_ERR_201: Amount overflow")]
    AmountOverflow,

    // =================================================================
    // Reallocation Errors (3xx)
    // =================================================================
    /// The reallocation request is malformed (lengths, duplicates, keywords).
    #[error("EN_ERR_300: Invalid reallocation: {reason}")]
    InvalidReallocation { reason: String },

    /// The reallocation would create or destroy assets.
    #[error("EN_ERR_301: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // Invitation Errors (4xx)
    // =================================================================
    /// The invitation was never issued or has already been redeemed.
    #[error("EN_ERR_400: Invitation not found or already redeemed: {0}")]
    InvitationNotFound(InvitationId),

    // =================================================================
    // Connection Errors (5xx)
    // =================================================================
    /// No session is tracked for this connection.
    #[error("EN_ERR_500: Unknown connection: {0}")]
    UnknownConnection(ConnectionId),

    /// Sending over a connection failed.
    #[error("EN_ERR_501: Send failed: {reason}")]
    SendFailed { reason: String },

    /// A peer sent a frame longer than the listener accepts.
    #[error("EN_ERR_502: Frame exceeds {limit} bytes")]
    FrameTooLong { limit: usize },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("EN_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// I/O error (network).
    #[error("EN_ERR_902: I/O error: {0}")]
    Io(String),

    /// The contract instance backing a hook has been dropped.
    #[error("EN_ERR_903: Contract has shut down")]
    ContractShutDown,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, EncourageError>;

impl From<std::io::Error> for EncourageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

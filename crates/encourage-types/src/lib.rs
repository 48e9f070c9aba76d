//! # encourage-types
//!
//! Shared types, errors, and configuration for the **encouragement contract**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OfferId`], [`InvitationId`], [`ConnectionId`]
//! - **Asset model**: [`Amount`], [`Allocation`], [`Keyword`]
//! - **Offer model**: [`OfferRecord`], [`OfferRole`], [`OfferState`]
//! - **Published state**: [`AggregateState`], [`Messages`]
//! - **Configuration**: [`ContractConfig`], [`ListenerConfig`]
//! - **Errors**: [`EncourageError`] with `EN_ERR_` prefix codes
//! - **Constants**: default messages, reply texts, and limits

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod offer;
pub mod state;

// Re-export all primary types at crate root for ergonomic imports:
//   use encourage_types::{Amount, Allocation, OfferId, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use offer::*;
pub use state::*;

// Constants are accessed via `encourage_types::constants::FOO`
// (not re-exported to avoid name collisions).

//! # encourage-settlement
//!
//! **Settlement core** of the encouragement contract: accepts admin and
//! user offers, moves tips to the admin, answers every user with an
//! encouragement, and publishes the running count to observers. Also serves
//! the optional connection front door.
//!
//! ## Architecture
//!
//! 1. **SettlementEngine**: owns `count` and the admin offer identity,
//!    decides the message tier and drives reallocation
//! 2. **AdminHook / EncouragementHook**: invitation callbacks into the engine
//! 3. **Notifier**: broadcast of [`AggregateState`](encourage_types::AggregateState) snapshots
//! 4. **SessionHandler**: per-connection FRESH → STEADY reply state machine
//! 5. **listener**: TCP adapter delivering connection lifecycle calls
//! 6. **start_contract**: wires it all together and exposes the public facet
//!
//! ## User Redemption Flow
//!
//! ```text
//! redeem(invite) → admin live? ─no─→ reject → count += 1 → publish
//!                      │ yes
//!                      ▼
//!           tip >= threshold? ─yes─→ reallocate(admin += tip, user = 0)
//!                      ▼
//!           complete → count += 1 → publish → message
//! ```

pub mod contract;
pub mod engine;
pub mod hooks;
pub mod listener;
pub mod logging;
pub mod notifier;
pub mod session;

pub use contract::{PublicFacet, StartedContract, start_contract};
pub use engine::SettlementEngine;
pub use hooks::{AdminHook, EncouragementHook};
pub use logging::init_tracing;
pub use notifier::{Notifier, NotifierUpdater, Snapshot, produce_notifier};
pub use session::{Ack, Connection, ConnectionSession, SessionHandler, SessionPhase};

//! # encourage-ledger
//!
//! **Offer Ledger**: the custody platform the encouragement contract runs
//! against. It creates offers from redeemed invitations, escrows what they
//! give, reallocates atomically between offers, and pays out on settlement.
//!
//! ## Architecture
//!
//! 1. **OfferLedger**: the async contract the settlement engine consumes
//! 2. **OfferHook**: the callback bound to an invitation, run on redemption
//! 3. **InvitationRegistry**: one-shot invitation → hook bindings
//! 4. **SupplyConservation**: escrow in == escrow held + paid out
//! 5. **InMemoryLedger**: reference implementation of all of the above
//!
//! ## Offer Flow
//!
//! ```text
//! create_invitation(hook) → Invitation → redeem(proposal)
//!     → offer ACTIVE (escrow recorded) → hook.on_offer(id)
//!     → reallocate / complete / reject → payout
//! ```

pub mod api;
pub mod invitation;
pub mod memory;
pub mod supply_conservation;

pub use api::{Invitation, InvitationDetails, OfferHook, OfferLedger, OfferResult, Proposal};
pub use invitation::InvitationRegistry;
pub use memory::InMemoryLedger;
pub use supply_conservation::SupplyConservation;

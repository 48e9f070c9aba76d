//! # Offer: a party's escrowed commitment
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐ escrowed  ┌────────┐  complete   ┌───────────┐
//!   │ PENDING ├──────────▶│ ACTIVE ├────────────▶│ COMPLETED │
//!   └─────────┘           └───┬────┘             └───────────┘
//!                             │ reject
//!                             ▼
//!                        ┌──────────┐
//!                        │ REJECTED │
//!                        └──────────┘
//! ```
//!
//! Transitions are monotonic. COMPLETED and REJECTED are terminal and
//! mutually exclusive: an offer settles exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Allocation, EncourageError, InvitationId, OfferId, Result};

/// Which invitation an offer was made through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferRole {
    /// The privileged party that collects tips.
    Admin,
    /// An ordinary party asking for encouragement.
    User,
}

impl std::fmt::Display for OfferRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

/// The lifecycle state of an offer, owned by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferState {
    /// Created, escrow not yet recorded.
    Pending,
    /// Escrow held; allocations may be reallocated.
    Active,
    /// Settled normally; the current allocation was paid out.
    Completed,
    /// Refused; the escrow was returned as-is.
    Rejected,
}

impl OfferState {
    /// Can an offer in this state move to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Active) | (Self::Active, Self::Completed | Self::Rejected)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl std::fmt::Display for OfferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Ledger-side record of one offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecord {
    pub id: OfferId,
    pub role: OfferRole,
    pub state: OfferState,
    /// Amounts currently escrowed for this offer.
    pub allocation: Allocation,
    /// The invitation this offer was made through.
    pub invitation: InvitationId,
    /// Set when the offer is rejected.
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When the offer reached a terminal state.
    pub settled_at: Option<DateTime<Utc>>,
}

impl OfferRecord {
    /// A fresh PENDING offer.
    #[must_use]
    pub fn new(role: OfferRole, invitation: InvitationId, allocation: Allocation) -> Self {
        Self {
            id: OfferId::new(),
            role,
            state: OfferState::Pending,
            allocation,
            invitation,
            rejection_reason: None,
            created_at: Utc::now(),
            settled_at: None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == OfferState::Active
    }

    /// Move to `target`, stamping `settled_at` on terminal states.
    ///
    /// # Errors
    /// Returns [`EncourageError::InvalidTransition`] if the move is not allowed.
    pub fn transition(&mut self, target: OfferState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(EncourageError::InvalidTransition {
                id: self.id,
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        if target.is_terminal() {
            self.settled_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Reject with a reason.
    ///
    /// # Errors
    /// Returns [`EncourageError::InvalidTransition`] unless ACTIVE.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<()> {
        self.transition(OfferState::Rejected)?;
        self.rejection_reason = Some(reason.into());
        Ok(())
    }
}

/// Dummy offer for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl OfferRecord {
    /// An ACTIVE user offer holding `allocation`.
    pub fn dummy_active(allocation: Allocation) -> Self {
        let mut offer = Self::new(OfferRole::User, InvitationId::new(), allocation);
        offer.state = OfferState::Active;
        offer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_transitions_valid() {
        assert!(OfferState::Pending.can_transition_to(OfferState::Active));
        assert!(OfferState::Active.can_transition_to(OfferState::Completed));
        assert!(OfferState::Active.can_transition_to(OfferState::Rejected));
    }

    #[test]
    fn state_transitions_invalid() {
        assert!(!OfferState::Pending.can_transition_to(OfferState::Completed));
        assert!(!OfferState::Completed.can_transition_to(OfferState::Rejected));
        assert!(!OfferState::Rejected.can_transition_to(OfferState::Completed));
        assert!(!OfferState::Completed.can_transition_to(OfferState::Active));
    }

    #[test]
    fn complete_stamps_settled_at() {
        let mut offer = OfferRecord::dummy_active(Allocation::tip(1));
        assert!(offer.settled_at.is_none());
        offer.transition(OfferState::Completed).unwrap();
        assert_eq!(offer.state, OfferState::Completed);
        assert!(offer.settled_at.is_some());
    }

    #[test]
    fn reject_records_reason() {
        let mut offer = OfferRecord::dummy_active(Allocation::new());
        offer.reject("closed").unwrap();
        assert_eq!(offer.state, OfferState::Rejected);
        assert_eq!(offer.rejection_reason.as_deref(), Some("closed"));
    }

    #[test]
    fn rejected_cannot_complete() {
        let mut offer = OfferRecord::dummy_active(Allocation::new());
        offer.reject("closed").unwrap();
        let err = offer.transition(OfferState::Completed).unwrap_err();
        assert!(matches!(err, EncourageError::InvalidTransition { .. }));
    }

    #[test]
    fn new_offer_is_pending() {
        let offer = OfferRecord::new(OfferRole::Admin, InvitationId::new(), Allocation::new());
        assert_eq!(offer.state, OfferState::Pending);
        assert!(!offer.is_active());
    }
}

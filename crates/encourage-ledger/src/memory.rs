//! In-memory reference ledger.
//!
//! Holds every offer record, escrow totals, and outstanding invitations in
//! process. Each mutation takes the state lock once and validates fully
//! before writing, so a failed call leaves the ledger unchanged. The lock is
//! never held while a hook runs: hooks call back into the ledger.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use encourage_types::{
    Allocation, EncourageError, Keyword, OfferId, OfferRecord, OfferState, Result,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::api::{Invitation, InvitationDetails, OfferHook, OfferLedger, OfferResult, Proposal};
use crate::invitation::InvitationRegistry;
use crate::supply_conservation::SupplyConservation;

#[derive(Default)]
struct LedgerState {
    offers: HashMap<OfferId, OfferRecord>,
    /// What each settled offer was paid out.
    payouts: HashMap<OfferId, Allocation>,
    supply: SupplyConservation,
}

impl LedgerState {
    fn offer(&self, id: OfferId) -> Result<&OfferRecord> {
        self.offers.get(&id).ok_or(EncourageError::OfferNotFound(id))
    }

    fn active(&self, id: OfferId) -> Result<&OfferRecord> {
        let offer = self.offer(id)?;
        if !offer.is_active() {
            return Err(EncourageError::OfferNotActive {
                id,
                state: offer.state,
            });
        }
        Ok(offer)
    }

    /// Move an active offer to a terminal state and pay it out.
    fn settle(
        &mut self,
        id: OfferId,
        target: OfferState,
        reason: Option<&str>,
    ) -> Result<Allocation> {
        let offer = self
            .offers
            .get_mut(&id)
            .ok_or(EncourageError::OfferNotFound(id))?;
        match reason {
            Some(reason) => offer.reject(reason)?,
            None => offer.transition(target)?,
        }
        let payout = offer.allocation.clone();
        for (keyword, amount) in payout.iter() {
            self.supply.record_payout(keyword, amount.value());
        }
        self.payouts.insert(id, payout.clone());
        Ok(payout)
    }

    fn held(&self, keyword: &str) -> Decimal {
        self.offers
            .values()
            .filter(|o| o.is_active())
            .map(|o| o.allocation.get(keyword).value())
            .sum()
    }
}

fn check_distinct(offer_ids: &[OfferId]) -> Result<()> {
    let unique: HashSet<&OfferId> = offer_ids.iter().collect();
    if unique.len() != offer_ids.len() {
        return Err(EncourageError::InvalidReallocation {
            reason: "offer ids must be distinct".into(),
        });
    }
    Ok(())
}

/// Reference [`OfferLedger`] keeping everything in memory.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    invitations: InvitationRegistry,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Redeem an invitation: escrow `proposal.give` in a new offer, then run
    /// the invitation's hook with the new offer's id.
    ///
    /// # Errors
    /// - `InvitationNotFound` if the invitation was already redeemed
    /// - whatever the hook returns
    pub async fn redeem(&self, invitation: Invitation, proposal: Proposal) -> Result<OfferResult> {
        let registration = self.invitations.take(invitation.id())?;

        let offer_id = {
            let mut offer = OfferRecord::new(registration.role, invitation.id(), proposal.give);
            offer.transition(OfferState::Active)?;
            let mut state = self.state.lock();
            for (keyword, amount) in offer.allocation.iter() {
                state.supply.record_escrow(keyword, amount.value());
            }
            let id = offer.id;
            state.offers.insert(id, offer);
            id
        };

        info!(
            offer = %offer_id,
            invitation = %invitation.id(),
            role = %registration.role,
            desc = %invitation.details().description,
            "Invitation redeemed"
        );

        let outcome = registration.hook.on_offer(offer_id).await?;
        Ok(OfferResult { offer_id, outcome })
    }

    /// The holder withdraws an active offer and takes back its allocation.
    ///
    /// # Errors
    /// Returns `OfferNotFound` / `InvalidTransition` unless the offer is active.
    pub fn exit(&self, offer_id: OfferId) -> Result<Allocation> {
        let payout = self
            .state
            .lock()
            .settle(offer_id, OfferState::Completed, None)?;
        info!(offer = %offer_id, "Offer exited");
        Ok(payout)
    }

    /// Snapshot of an offer record.
    #[must_use]
    pub fn offer(&self, offer_id: OfferId) -> Option<OfferRecord> {
        self.state.lock().offers.get(&offer_id).cloned()
    }

    #[must_use]
    pub fn state_of(&self, offer_id: OfferId) -> Option<OfferState> {
        self.state.lock().offers.get(&offer_id).map(|o| o.state)
    }

    /// What a settled offer was paid out; `None` while it is still open.
    #[must_use]
    pub fn payout(&self, offer_id: OfferId) -> Option<Allocation> {
        self.state.lock().payouts.get(&offer_id).cloned()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.lock().offers.values().filter(|o| o.is_active()).count()
    }

    /// Invitations minted but not yet redeemed.
    #[must_use]
    pub fn outstanding_invitations(&self) -> usize {
        self.invitations.outstanding()
    }

    /// Check escrow conservation for `keyword`.
    ///
    /// # Errors
    /// Returns [`EncourageError::ConservationViolation`] on mismatch.
    pub fn verify_supply(&self, keyword: &str) -> Result<()> {
        let state = self.state.lock();
        state.supply.verify(keyword, state.held(keyword))
    }
}

#[async_trait]
impl OfferLedger for InMemoryLedger {
    async fn is_active(&self, offer_id: OfferId) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .offers
            .get(&offer_id)
            .is_some_and(OfferRecord::is_active))
    }

    async fn current_allocation(&self, offer_id: OfferId) -> Result<Allocation> {
        Ok(self.state.lock().active(offer_id)?.allocation.clone())
    }

    async fn reallocate(
        &self,
        offer_ids: &[OfferId],
        allocations: &[Allocation],
        keywords: &[Keyword],
    ) -> Result<()> {
        if offer_ids.is_empty() || offer_ids.len() != allocations.len() {
            return Err(EncourageError::InvalidReallocation {
                reason: format!(
                    "{} offers but {} allocations",
                    offer_ids.len(),
                    allocations.len()
                ),
            });
        }
        if keywords.is_empty() {
            return Err(EncourageError::InvalidReallocation {
                reason: "no keywords to reallocate".into(),
            });
        }
        check_distinct(offer_ids)?;

        let mut state = self.state.lock();

        let listed = |k: &&str| keywords.iter().any(|kw| kw.as_str() == *k);
        let mut current = Vec::with_capacity(offer_ids.len());
        for (id, alloc) in offer_ids.iter().zip(allocations) {
            current.push(&state.active(*id)?.allocation);
            if let Some(stray) = alloc.keywords().find(|k| !listed(k)) {
                return Err(EncourageError::InvalidReallocation {
                    reason: format!("keyword {stray} not listed for offer {id}"),
                });
            }
        }

        for keyword in keywords {
            let before = Allocation::total(current.iter().copied(), keyword)?;
            let after = Allocation::total(allocations, keyword)?;
            if before != after {
                return Err(EncourageError::ConservationViolation {
                    reason: format!("{keyword}: {before} before, {after} after"),
                });
            }
        }

        for (id, alloc) in offer_ids.iter().zip(allocations) {
            if let Some(offer) = state.offers.get_mut(id) {
                for keyword in keywords {
                    offer.allocation.set(keyword.clone(), alloc.get(keyword));
                }
            }
        }

        debug!(offers = offer_ids.len(), keywords = ?keywords, "Reallocated");
        Ok(())
    }

    async fn complete(&self, offer_ids: &[OfferId]) -> Result<()> {
        check_distinct(offer_ids)?;
        let mut state = self.state.lock();
        for id in offer_ids {
            state.active(*id)?;
        }
        for id in offer_ids {
            state.settle(*id, OfferState::Completed, None)?;
            debug!(offer = %id, "Offer completed");
        }
        Ok(())
    }

    async fn reject(&self, offer_id: OfferId, reason: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.active(offer_id)?;
        state.settle(offer_id, OfferState::Rejected, Some(reason))?;
        info!(offer = %offer_id, reason, "Offer rejected");
        Ok(())
    }

    async fn create_invitation(
        &self,
        hook: Arc<dyn OfferHook>,
        details: InvitationDetails,
    ) -> Result<Invitation> {
        let invitation = self.invitations.mint(hook, details);
        debug!(
            invitation = %invitation.id(),
            desc = %invitation.details().description,
            "Invitation minted"
        );
        Ok(invitation)
    }
}

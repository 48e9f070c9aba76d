//! The ledger contract consumed by the settlement engine.
//!
//! Every call is a suspension point: implementations may be remote, so the
//! engine must not assume state is unchanged across two calls.

use std::sync::Arc;

use async_trait::async_trait;
use encourage_types::{Allocation, InvitationId, Keyword, OfferId, OfferRole, Result};

/// Callback bound to an invitation, invoked once with the new offer's id.
/// Its return value is handed back to the redeemer.
#[async_trait]
pub trait OfferHook: Send + Sync {
    async fn on_offer(&self, offer_id: OfferId) -> Result<String>;
}

/// Offer custody operations.
#[async_trait]
pub trait OfferLedger: Send + Sync {
    /// Whether the offer is ACTIVE. Unknown offers are not active.
    async fn is_active(&self, offer_id: OfferId) -> Result<bool>;

    /// Amounts currently escrowed for an active offer.
    async fn current_allocation(&self, offer_id: OfferId) -> Result<Allocation>;

    /// Replace the `keywords` portion of each offer's allocation.
    ///
    /// All-or-nothing: either every allocation is written or none is.
    /// Per-keyword totals over `offer_ids` must be unchanged.
    async fn reallocate(
        &self,
        offer_ids: &[OfferId],
        allocations: &[Allocation],
        keywords: &[Keyword],
    ) -> Result<()>;

    /// Settle the offers normally, paying out their current allocations.
    async fn complete(&self, offer_ids: &[OfferId]) -> Result<()>;

    /// Refuse the offer, returning its escrow untouched.
    async fn reject(&self, offer_id: OfferId, reason: &str) -> Result<()>;

    /// Mint a one-shot invitation bound to `hook`.
    async fn create_invitation(
        &self,
        hook: Arc<dyn OfferHook>,
        details: InvitationDetails,
    ) -> Result<Invitation>;
}

/// Public metadata carried by an invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationDetails {
    pub description: String,
    /// Role of the offer created on redemption.
    pub role: OfferRole,
}

impl InvitationDetails {
    #[must_use]
    pub fn new(description: impl Into<String>, role: OfferRole) -> Self {
        Self {
            description: description.into(),
            role,
        }
    }
}

/// A redeemable token. Not `Clone`: redeeming consumes it.
#[derive(Debug)]
pub struct Invitation {
    id: InvitationId,
    details: InvitationDetails,
}

impl Invitation {
    #[must_use]
    pub fn new(id: InvitationId, details: InvitationDetails) -> Self {
        Self { id, details }
    }

    #[must_use]
    pub fn id(&self) -> InvitationId {
        self.id
    }

    #[must_use]
    pub fn details(&self) -> &InvitationDetails {
        &self.details
    }
}

/// What a redeemer puts into escrow.
#[derive(Debug, Clone, Default)]
pub struct Proposal {
    pub give: Allocation,
}

impl Proposal {
    #[must_use]
    pub fn give(give: Allocation) -> Self {
        Self { give }
    }

    /// A proposal that escrows nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Returned to the redeemer: the new offer and the hook's reply.
#[derive(Debug, Clone)]
pub struct OfferResult {
    pub offer_id: OfferId,
    pub outcome: String,
}

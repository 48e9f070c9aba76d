//! Invitation hooks routing redemptions into the settlement engine.
//!
//! Hooks live in the ledger's invitation registry while the engine holds the
//! ledger, so they keep only a weak handle on the engine.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use encourage_ledger::OfferHook;
use encourage_types::{EncourageError, OfferId, Result};

use crate::engine::SettlementEngine;

fn upgrade(engine: &Weak<SettlementEngine>) -> Result<Arc<SettlementEngine>> {
    engine.upgrade().ok_or(EncourageError::ContractShutDown)
}

/// Bound to the admin invitation.
pub struct AdminHook {
    engine: Weak<SettlementEngine>,
}

impl AdminHook {
    #[must_use]
    pub fn new(engine: &Arc<SettlementEngine>) -> Self {
        Self {
            engine: Arc::downgrade(engine),
        }
    }
}

#[async_trait]
impl OfferHook for AdminHook {
    async fn on_offer(&self, offer_id: OfferId) -> Result<String> {
        Ok(upgrade(&self.engine)?.on_admin_redeem(offer_id))
    }
}

/// Bound to every user invitation.
pub struct EncouragementHook {
    engine: Weak<SettlementEngine>,
}

impl EncouragementHook {
    #[must_use]
    pub fn new(engine: &Arc<SettlementEngine>) -> Self {
        Self {
            engine: Arc::downgrade(engine),
        }
    }
}

#[async_trait]
impl OfferHook for EncouragementHook {
    async fn on_offer(&self, offer_id: OfferId) -> Result<String> {
        upgrade(&self.engine)?.on_user_redeem(offer_id).await
    }
}

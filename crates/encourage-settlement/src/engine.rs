//! Settlement engine: the encouragement state machine.
//!
//! Holds the admin offer identity and the encouragement count, and drives
//! every user redemption through a fixed sequence:
//!
//! 1. Admin liveness check (reject + count + publish if not live)
//! 2. Read the user's tip
//! 3. Choose basic or premium
//! 4. Premium only: move the whole tip to the admin in one reallocation
//! 5. Complete the user's offer
//! 6. Increment `count`
//! 7. Publish the aggregate state
//!
//! Ledger calls are suspension points. Engine state sits behind a mutex that
//! is only held between them, never across an `.await`.

use std::sync::Arc;

use encourage_ledger::OfferLedger;
use encourage_types::{
    AggregateState, Allocation, Amount, ContractConfig, Keyword, Messages, OfferId, Result,
    constants,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::notifier::{Notifier, NotifierUpdater, produce_notifier};

#[derive(Debug, Default)]
struct EngineState {
    /// Encouragements given, including rejected redemptions.
    count: u64,
    /// Last admin offer redeemed. Overwritten by each admin redemption.
    admin_offer: Option<OfferId>,
}

/// Owns the contract's mutable state and publishes it.
pub struct SettlementEngine {
    ledger: Arc<dyn OfferLedger>,
    messages: Messages,
    tip_keyword: Keyword,
    premium_threshold: Amount,
    state: Mutex<EngineState>,
    updater: NotifierUpdater,
    notifier: Notifier,
}

impl SettlementEngine {
    /// Create an engine and publish the initial state (`count = 0`).
    pub fn new(config: &ContractConfig, ledger: Arc<dyn OfferLedger>) -> Self {
        let (notifier, updater) = produce_notifier(AggregateState {
            messages: config.messages.clone(),
            count: 0,
        });
        Self {
            ledger,
            messages: config.messages.clone(),
            tip_keyword: config.tip_keyword.clone(),
            premium_threshold: config.premium_threshold_amount(),
            state: Mutex::new(EngineState::default()),
            updater,
            notifier,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.state.lock().count
    }

    /// The currently recorded admin offer, live or not.
    #[must_use]
    pub fn admin_offer(&self) -> Option<OfferId> {
        self.state.lock().admin_offer
    }

    /// Read handle on the published state.
    #[must_use]
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    #[must_use]
    pub fn aggregate_state(&self) -> AggregateState {
        AggregateState {
            messages: self.messages.clone(),
            count: self.count(),
        }
    }

    /// Whether an admin offer is recorded and still active on the ledger.
    pub async fn is_admin_active(&self) -> Result<bool> {
        match self.admin_offer() {
            Some(admin) => self.ledger.is_active(admin).await,
            None => Ok(false),
        }
    }

    /// Record `offer_id` as the admin offer, replacing any previous one.
    ///
    /// The previous admin offer is left as it is on the ledger.
    pub fn on_admin_redeem(&self, offer_id: OfferId) -> String {
        let previous = self.state.lock().admin_offer.replace(offer_id);
        match previous {
            Some(previous) => warn!(
                offer = %offer_id,
                previous = %previous,
                "Admin offer replaced; previous admin offer left open"
            ),
            None => info!(offer = %offer_id, "Admin offer recorded"),
        }
        constants::ADMIN_REDEEMED.to_string()
    }

    /// Settle one user offer and return the reply for the redeemer.
    ///
    /// # Errors
    /// Ledger failures propagate unchanged. An inactive admin is not an
    /// error: the offer is rejected and the rejection text returned.
    pub async fn on_user_redeem(&self, offer_id: OfferId) -> Result<String> {
        // One admin identity for the whole settlement, even if a new admin
        // redeems while this one is suspended on the ledger.
        let admin = match self.admin_offer() {
            Some(admin) => self.ledger.is_active(admin).await?.then_some(admin),
            None => None,
        };

        let Some(admin) = admin else {
            self.ledger
                .reject(offer_id, constants::NO_LONGER_GIVING)
                .await?;
            let count = self.record_encouragement();
            warn!(offer = %offer_id, count, "No active admin offer; user offer rejected");
            return Ok(constants::NO_LONGER_GIVING.to_string());
        };

        let keyword = self.tip_keyword.as_str();
        let user_tip = self.ledger.current_allocation(offer_id).await?.get(keyword);
        let premium = user_tip.is_at_least(&self.premium_threshold);

        if premium {
            let admin_tip = self.ledger.current_allocation(admin).await?.get(keyword);
            let new_admin = Allocation::new().with(keyword, admin_tip.checked_add(&user_tip)?);
            let new_user = Allocation::new().with(keyword, Amount::empty());
            self.ledger
                .reallocate(
                    &[admin, offer_id],
                    &[new_admin, new_user],
                    &[self.tip_keyword.clone()],
                )
                .await?;
            debug!(
                admin = %admin,
                offer = %offer_id,
                tip = %user_tip,
                "Tip moved to admin offer"
            );
        }

        self.ledger.complete(&[offer_id]).await?;
        let count = self.record_encouragement();

        let encouragement = if premium {
            &self.messages.premium
        } else {
            &self.messages.basic
        };
        info!(
            offer = %offer_id,
            tier = if premium { "premium" } else { "basic" },
            count,
            "Encouragement given"
        );
        Ok(encouragement.clone())
    }

    /// Hand out a basic encouragement with no offer involved.
    pub fn on_free_encouragement(&self) -> String {
        let count = self.record_encouragement();
        debug!(count, "Free encouragement given");
        self.messages.basic.clone()
    }

    /// Increment `count` and publish. Publishing happens under the state
    /// lock so observers never see counts out of order.
    fn record_encouragement(&self) -> u64 {
        let mut state = self.state.lock();
        state.count += 1;
        self.updater.update_state(AggregateState {
            messages: self.messages.clone(),
            count: state.count,
        });
        state.count
    }
}

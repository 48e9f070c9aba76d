//! Contract wiring: builds the engine, mints the admin invitation, and
//! exposes the public facet.

use std::sync::Arc;

use encourage_ledger::{Invitation, InvitationDetails, OfferLedger};
use encourage_types::{ContractConfig, OfferRole, Result, constants};
use tracing::info;

use crate::engine::SettlementEngine;
use crate::hooks::{AdminHook, EncouragementHook};
use crate::notifier::Notifier;
use crate::session::SessionHandler;

/// Everything handed back to whoever started the contract.
pub struct StartedContract {
    /// Redeem to become the admin (the tip collector).
    pub admin_invitation: Invitation,
    /// Operations anyone may call.
    pub public: PublicFacet,
    /// Present when the config names a listener.
    pub sessions: Option<Arc<SessionHandler>>,
}

/// Public operations of a running contract.
#[derive(Clone)]
pub struct PublicFacet {
    engine: Arc<SettlementEngine>,
    ledger: Arc<dyn OfferLedger>,
}

impl PublicFacet {
    #[must_use]
    pub fn get_notifier(&self) -> Notifier {
        self.engine.notifier()
    }

    /// Mint a user invitation; redeeming it settles through the engine.
    pub async fn make_invite(&self) -> Result<Invitation> {
        self.ledger
            .create_invitation(
                Arc::new(EncouragementHook::new(&self.engine)),
                InvitationDetails::new(constants::ENCOURAGEMENT_INVITATION_DESC, OfferRole::User),
            )
            .await
    }

    pub fn get_free_encouragement(&self) -> String {
        self.engine.on_free_encouragement()
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<SettlementEngine> {
        &self.engine
    }
}

/// Start a contract instance against `ledger`.
///
/// # Errors
/// `Configuration` for invalid terms; ledger failures propagate.
pub async fn start_contract(
    config: ContractConfig,
    ledger: Arc<dyn OfferLedger>,
) -> Result<StartedContract> {
    config.validate()?;
    let engine = Arc::new(SettlementEngine::new(&config, Arc::clone(&ledger)));

    let admin_invitation = ledger
        .create_invitation(
            Arc::new(AdminHook::new(&engine)),
            InvitationDetails::new(constants::ADMIN_INVITATION_DESC, OfferRole::Admin),
        )
        .await?;

    let sessions = config
        .listener
        .as_ref()
        .map(|_| Arc::new(SessionHandler::new(Arc::clone(&engine))));

    info!(
        keyword = %config.tip_keyword,
        threshold = config.premium_threshold,
        listener = ?config.listener.as_ref().map(|l| l.listen_addr),
        version = constants::VERSION,
        "Encouragement contract started"
    );

    Ok(StartedContract {
        admin_invitation,
        public: PublicFacet { engine, ledger },
        sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encourage_ledger::InMemoryLedger;
    use encourage_types::{EncourageError, ListenerConfig, Messages};

    #[tokio::test]
    async fn start_without_listener() {
        let started = start_contract(ContractConfig::default(), Arc::new(InMemoryLedger::new()))
            .await
            .unwrap();
        assert_eq!(started.admin_invitation.details().description, "admin");
        assert_eq!(started.admin_invitation.details().role, OfferRole::Admin);
        assert!(started.sessions.is_none());
        assert_eq!(started.public.get_notifier().latest().count, 0);
    }

    #[tokio::test]
    async fn start_with_listener_builds_sessions() {
        let config = ContractConfig {
            listener: Some(ListenerConfig::default()),
            ..ContractConfig::default()
        };
        let started = start_contract(config, Arc::new(InMemoryLedger::new()))
            .await
            .unwrap();
        assert_eq!(started.sessions.unwrap().active_sessions(), 0);
    }

    #[tokio::test]
    async fn invalid_config_refused() {
        let config = ContractConfig {
            messages: Messages {
                basic: String::new(),
                premium: "x".into(),
            },
            ..ContractConfig::default()
        };
        let err = start_contract(config, Arc::new(InMemoryLedger::new()))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EncourageError::Configuration(_)));
    }

    #[tokio::test]
    async fn zero_threshold_refused() {
        let config = ContractConfig {
            premium_threshold: 0,
            ..ContractConfig::default()
        };
        let ledger = Arc::new(InMemoryLedger::new());
        let err = start_contract(config, ledger.clone()).await.err().unwrap();
        assert!(matches!(err, EncourageError::Configuration(_)));
        assert_eq!(ledger.outstanding_invitations(), 0);
    }

    #[tokio::test]
    async fn make_invite_is_user_invitation() {
        let started = start_contract(ContractConfig::default(), Arc::new(InMemoryLedger::new()))
            .await
            .unwrap();
        let invite = started.public.make_invite().await.unwrap();
        assert_eq!(invite.details().description, "encouragement");
        assert_eq!(invite.details().role, OfferRole::User);
    }
}

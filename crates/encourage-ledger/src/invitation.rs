//! One-shot invitation registry.
//!
//! Minting an invitation registers its hook under a fresh id. Redemption
//! removes the registration, so a hook can only ever be looked up once.

use std::collections::HashMap;
use std::sync::Arc;

use encourage_types::{EncourageError, InvitationId, OfferRole, Result};
use parking_lot::Mutex;

use crate::api::{Invitation, InvitationDetails, OfferHook};

/// A hook waiting for its invitation to be redeemed.
#[derive(Clone)]
pub struct Registration {
    pub hook: Arc<dyn OfferHook>,
    pub role: OfferRole,
}

/// Outstanding invitations keyed by id.
#[derive(Default)]
pub struct InvitationRegistry {
    pending: Mutex<HashMap<InvitationId, Registration>>,
}

impl InvitationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` and hand out the matching invitation.
    pub fn mint(&self, hook: Arc<dyn OfferHook>, details: InvitationDetails) -> Invitation {
        let id = InvitationId::new();
        self.pending.lock().insert(
            id,
            Registration {
                hook,
                role: details.role,
            },
        );
        Invitation::new(id, details)
    }

    /// Remove and return the registration for `id`.
    ///
    /// # Errors
    /// Returns [`EncourageError::InvitationNotFound`] if `id` was never
    /// minted here or was already taken.
    pub fn take(&self, id: InvitationId) -> Result<Registration> {
        self.pending
            .lock()
            .remove(&id)
            .ok_or(EncourageError::InvitationNotFound(id))
    }

    /// Number of invitations not yet redeemed.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.pending.lock().len()
    }
}

//! Escrow conservation invariant checker.
//!
//! Invariant enforced by the ledger after every mutation:
//! ```text
//! ∀ keyword: Σ(active allocations) == Σ(escrowed) - Σ(paid out)
//! ```
//!
//! Reallocation only moves amounts between offers, so it never changes
//! either side of the equation.

use std::collections::HashMap;

use encourage_types::{EncourageError, Keyword, Result};
use rust_decimal::Decimal;

/// Tracks per-keyword escrow totals.
#[derive(Debug, Default)]
pub struct SupplyConservation {
    /// Total escrowed per keyword since the ledger started.
    escrowed: HashMap<Keyword, Decimal>,
    /// Total paid out per keyword since the ledger started.
    paid_out: HashMap<Keyword, Decimal>,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record amounts entering escrow.
    pub fn record_escrow(&mut self, keyword: &str, amount: Decimal) {
        *self
            .escrowed
            .entry(keyword.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Record amounts leaving escrow.
    pub fn record_payout(&mut self, keyword: &str, amount: Decimal) {
        *self
            .paid_out
            .entry(keyword.to_string())
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Escrowed minus paid out.
    #[must_use]
    pub fn expected_held(&self, keyword: &str) -> Decimal {
        self.total_escrowed(keyword) - self.total_paid_out(keyword)
    }

    /// Check `actual_held` (sum over active offers) against the books.
    ///
    /// # Errors
    /// Returns [`EncourageError::ConservationViolation`] if they differ.
    pub fn verify(&self, keyword: &str, actual_held: Decimal) -> Result<()> {
        let expected = self.expected_held(keyword);
        if actual_held != expected {
            return Err(EncourageError::ConservationViolation {
                reason: format!(
                    "Keyword {keyword}: held {actual_held} != expected {expected} \
                     (escrowed={}, paid_out={})",
                    self.total_escrowed(keyword),
                    self.total_paid_out(keyword),
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_escrowed(&self, keyword: &str) -> Decimal {
        self.escrowed.get(keyword).copied().unwrap_or(Decimal::ZERO)
    }

    #[must_use]
    pub fn total_paid_out(&self, keyword: &str) -> Decimal {
        self.paid_out.get(keyword).copied().unwrap_or(Decimal::ZERO)
    }
}

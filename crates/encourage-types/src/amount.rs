//! Amount and allocation types for escrowed assets.
//!
//! An [`Amount`] is a non-negative quantity of one fungible asset. An
//! [`Allocation`] maps allocation keywords (e.g. `"Tip"`) to amounts and is
//! what the ledger holds for each active offer.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{EncourageError, Result};

/// Type alias for allocation keywords (e.g., "Tip").
pub type Keyword = String;

/// A non-negative fungible quantity.
///
/// Construction through [`Amount::new`] rejects negative values, and the
/// arithmetic helpers never produce one, so every `Amount` in circulation is
/// `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    /// Wrap a decimal value.
    ///
    /// # Errors
    /// Returns [`EncourageError::AmountNegative`] if `value < 0`.
    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(EncourageError::AmountNegative(value));
        }
        Ok(Self(value))
    }

    /// An amount of `units` whole units.
    #[must_use]
    pub fn of(units: u64) -> Self {
        Self(Decimal::from(units))
    }

    /// The zero amount.
    #[must_use]
    pub fn empty() -> Self {
        Self(Decimal::ZERO)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }

    /// `self >= other`.
    #[must_use]
    pub fn is_at_least(&self, other: &Self) -> bool {
        self.0 >= other.0
    }

    /// # Errors
    /// Returns [`EncourageError::AmountOverflow`] if the sum is not representable.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(EncourageError::AmountOverflow)
    }

    /// # Errors
    /// Returns [`EncourageError::AmountNegative`] if `other > self`.
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        Self::new(self.0 - other.0)
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Default for Amount {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = EncourageError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Amounts currently escrowed for one offer, keyed by allocation keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation(BTreeMap<Keyword, Amount>);

impl Allocation {
    /// An allocation holding nothing.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder: set `keyword` to `amount`.
    #[must_use]
    pub fn with(mut self, keyword: impl Into<Keyword>, amount: Amount) -> Self {
        self.0.insert(keyword.into(), amount);
        self
    }

    /// Amount held under `keyword`; absent keywords read as empty.
    #[must_use]
    pub fn get(&self, keyword: &str) -> Amount {
        self.0.get(keyword).copied().unwrap_or_default()
    }

    pub fn set(&mut self, keyword: impl Into<Keyword>, amount: Amount) {
        self.0.insert(keyword.into(), amount);
    }

    /// Keywords present in this allocation.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Amount)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether every amount in this allocation is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Amount::is_empty)
    }

    /// Sum of `keyword` across `allocations`.
    pub fn total<'a>(
        allocations: impl IntoIterator<Item = &'a Allocation>,
        keyword: &str,
    ) -> Result<Amount> {
        allocations
            .into_iter()
            .try_fold(Amount::empty(), |acc, alloc| acc.checked_add(&alloc.get(keyword)))
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Allocation {
    /// Allocation of `units` tips. Test fixture.
    pub fn tip(units: u64) -> Self {
        Self::new().with(crate::constants::TIP_KEYWORD, Amount::of(units))
    }
}

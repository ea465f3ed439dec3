use crate::core::traits::RateSource;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// ISO 4217-style currency code.
///
/// Links are denominated in a currency; any identifier is accepted so
/// that private units (hours, points) can circulate as well.
///
/// # Examples
///
/// ```
/// use credit_path_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let cad = CurrencyCode::new("CAD");
/// assert_ne!(usd, cad);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Name of an exchange rate, e.g. `USDCAD`.
///
/// Links refer to rates by name; the numeric value is looked up when a
/// search session starts using it, so a link always converts at the
/// rate effective at search time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateName(String);

impl RateName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RateName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Errors arising from exchange rate lookups and updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RateError {
    #[error("no exchange rate named {name}")]
    NotFound { name: RateName },
    #[error("exchange rate must be positive, got {rate} for {name}")]
    InvalidRate { name: RateName, rate: Decimal },
    #[error("exchange rate {name} has no entry effective yet")]
    NotYetEffective { name: RateName },
}

/// One value in the history of a named rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub rate: Decimal,
    pub effective_at: DateTime<Utc>,
}

/// Named exchange rates with their history of superseded values.
///
/// A rate of `r` converts one unit of the upstream link's currency into
/// `r` units of the downstream link's currency.
///
/// # Examples
///
/// ```
/// use credit_path_engine::core::currency::{RateName, RateTable};
/// use credit_path_engine::core::traits::RateSource;
/// use rust_decimal_macros::dec;
///
/// let mut rates = RateTable::new();
/// rates.set_rate(RateName::new("USDCAD"), dec!(1.25)).unwrap();
/// rates.set_rate(RateName::new("USDCAD"), dec!(1.30)).unwrap();
///
/// assert_eq!(rates.rate(&RateName::new("USDCAD")).unwrap(), dec!(1.30));
/// assert_eq!(rates.history(&RateName::new("USDCAD")).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    /// Entries per rate, ordered by `effective_at`.
    entries: HashMap<RateName, Vec<RateEntry>>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new value for `name`, effective immediately.
    pub fn set_rate(&mut self, name: RateName, rate: Decimal) -> Result<(), RateError> {
        self.set_rate_effective(name, rate, Utc::now())
    }

    /// Record a value for `name` that takes effect at `effective_at`.
    pub fn set_rate_effective(
        &mut self,
        name: RateName,
        rate: Decimal,
        effective_at: DateTime<Utc>,
    ) -> Result<(), RateError> {
        if rate <= Decimal::ZERO {
            return Err(RateError::InvalidRate { name, rate });
        }
        let history = self.entries.entry(name).or_default();
        // Equal timestamps keep insertion order, so the later call wins.
        let pos = history.partition_point(|e| e.effective_at <= effective_at);
        history.insert(pos, RateEntry { rate, effective_at });
        Ok(())
    }

    /// The value of `name` effective at `at`.
    pub fn rate_at(&self, name: &RateName, at: DateTime<Utc>) -> Result<Decimal, RateError> {
        let history = self.entries.get(name).ok_or_else(|| RateError::NotFound {
            name: name.clone(),
        })?;
        history
            .iter()
            .rev()
            .find(|e| e.effective_at <= at)
            .map(|e| e.rate)
            .ok_or_else(|| RateError::NotYetEffective { name: name.clone() })
    }

    /// Every recorded value of `name`, oldest first.
    pub fn history(&self, name: &RateName) -> &[RateEntry] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn names(&self) -> impl Iterator<Item = &RateName> {
        self.entries.keys()
    }
}

impl RateSource for RateTable {
    fn rate(&self, name: &RateName) -> Result<Decimal, RateError> {
        self.rate_at(name, Utc::now())
    }
}

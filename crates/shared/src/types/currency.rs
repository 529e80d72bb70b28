//! Currency codes and per-currency balance maps.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` throughout.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An opaque currency code (e.g. "USD", "EUR").
///
/// Codes are normalised to uppercase on construction so that map lookups
/// never depend on caller casing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

/// Error returned for malformed currency codes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid currency code: {0:?}")]
pub struct InvalidCurrencyCode(pub String);

impl CurrencyCode {
    /// Creates a currency code, normalising to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCurrencyCode` if the code is empty or contains
    /// non-alphabetic characters.
    pub fn new(code: &str) -> Result<Self, InvalidCurrencyCode> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = InvalidCurrencyCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A per-currency balance container with a defined zero-default lookup.
///
/// The distinction between "currency key absent" and "balance is zero" is
/// load-bearing: income and expense operations fail when the key is absent,
/// while transfers and edits may create the key at a zero basis. The two
/// lookups are therefore separate methods rather than one implicit default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceMap(BTreeMap<CurrencyCode, Decimal>);

impl BalanceMap {
    /// Creates an empty balance map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the currency has been initialised on this map,
    /// regardless of its amount.
    #[must_use]
    pub fn contains(&self, currency: &CurrencyCode) -> bool {
        self.0.contains_key(currency)
    }

    /// Returns the amount for an initialised currency, or `None` if the
    /// currency key is absent.
    #[must_use]
    pub fn amount(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.0.get(currency).copied()
    }

    /// Returns the amount for a currency, defaulting to zero when the key
    /// is absent. The key is not created.
    #[must_use]
    pub fn amount_or_zero(&self, currency: &CurrencyCode) -> Decimal {
        self.0.get(currency).copied().unwrap_or(Decimal::ZERO)
    }

    /// Initialises a currency key at zero if it is absent.
    pub fn ensure(&mut self, currency: CurrencyCode) {
        self.0.entry(currency).or_insert(Decimal::ZERO);
    }

    /// Adds a signed delta to a currency, creating the key at a zero basis
    /// if absent.
    pub fn add(&mut self, currency: CurrencyCode, delta: Decimal) {
        *self.0.entry(currency).or_insert(Decimal::ZERO) += delta;
    }

    /// Iterates over (currency, amount) entries in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &Decimal)> {
        self.0.iter()
    }

    /// Returns the number of initialised currency keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no currency keys are initialised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CurrencyCode, Decimal)> for BalanceMap {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, Decimal)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyCode {
        CurrencyCode::new("USD").unwrap()
    }

    fn eur() -> CurrencyCode {
        CurrencyCode::new("EUR").unwrap()
    }

    #[rstest]
    #[case("usd", "USD")]
    #[case("USD", "USD")]
    #[case("Eur", "EUR")]
    #[case("idr", "IDR")]
    fn test_currency_code_normalises(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(CurrencyCode::new(input).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("US1")]
    #[case("U S")]
    #[case("€UR")]
    fn test_currency_code_rejects_malformed(#[case] input: &str) {
        assert!(CurrencyCode::new(input).is_err());
    }

    #[test]
    fn test_absent_key_is_distinct_from_zero() {
        let mut map = BalanceMap::new();
        assert!(!map.contains(&usd()));
        assert_eq!(map.amount(&usd()), None);
        assert_eq!(map.amount_or_zero(&usd()), Decimal::ZERO);

        map.ensure(usd());
        assert!(map.contains(&usd()));
        assert_eq!(map.amount(&usd()), Some(Decimal::ZERO));
    }

    #[test]
    fn test_add_creates_key_at_zero_basis() {
        let mut map = BalanceMap::new();
        map.add(usd(), dec!(25.50));
        assert_eq!(map.amount(&usd()), Some(dec!(25.50)));

        map.add(usd(), dec!(-30));
        assert_eq!(map.amount(&usd()), Some(dec!(-4.50)));
    }

    #[test]
    fn test_ensure_does_not_clobber_existing_amount() {
        let mut map = BalanceMap::new();
        map.add(eur(), dec!(100));
        map.ensure(eur());
        assert_eq!(map.amount(&eur()), Some(dec!(100)));
    }

    #[test]
    fn test_iteration_in_code_order() {
        let mut map = BalanceMap::new();
        map.add(usd(), dec!(1));
        map.add(eur(), dec!(2));
        let codes: Vec<&str> = map.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, vec!["EUR", "USD"]);
    }
}

//! # Program Catalog
//!
//! List prices per program slug, so a quote can be priced from the slug on
//! the program card alone.

use std::collections::BTreeMap;

use coupon_core::validation::{validate_price_cents, validate_program_slug};
use coupon_core::Money;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Program slug → list price in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramCatalog {
    prices: BTreeMap<String, i64>,
}

impl ProgramCatalog {
    pub fn new() -> Self {
        ProgramCatalog::default()
    }

    /// Adds or replaces a program price.
    pub fn insert(&mut self, slug: impl Into<String>, list_cents: i64) -> StoreResult<()> {
        let slug = slug.into();
        validate_program_slug(&slug)?;
        validate_price_cents(list_cents)?;
        self.prices.insert(slug, list_cents);
        Ok(())
    }

    /// Builds a catalog from pairs, validating every entry.
    pub fn from_prices<I, S>(prices: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut catalog = ProgramCatalog::new();
        for (slug, cents) in prices {
            catalog.insert(slug, cents)?;
        }
        Ok(catalog)
    }

    /// List price for a program.
    pub fn price(&self, slug: &str) -> StoreResult<Money> {
        self.prices
            .get(slug)
            .copied()
            .map(Money::from_cents)
            .ok_or_else(|| StoreError::UnknownProgram(slug.to_string()))
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.prices.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Re-checks every entry; used after deserializing untrusted input.
    pub fn validate(&self) -> StoreResult<()> {
        for (slug, cents) in &self.prices {
            validate_program_slug(slug)?;
            validate_price_cents(*cents)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_lookup() {
        let catalog =
            ProgramCatalog::from_prices([("cpr-ems", 12500), ("business", 495000)]).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.price("cpr-ems").unwrap().cents(), 12500);
        assert!(matches!(
            catalog.price("welding"),
            Err(StoreError::UnknownProgram(slug)) if slug == "welding"
        ));
    }

    #[test]
    fn test_rejects_bad_entries() {
        let mut catalog = ProgramCatalog::new();
        assert!(catalog.insert("cpr-ems", -1).is_err());
        assert!(catalog.insert("CPR", 100).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_deserializes_as_plain_map() {
        let catalog: ProgramCatalog =
            serde_json::from_str(r#"{"building-tech": 295000, "cpr-ems": 12500}"#).unwrap();
        assert!(catalog.contains("building-tech"));
        assert!(catalog.validate().is_ok());

        let bad: ProgramCatalog = serde_json::from_str(r#"{"cpr-ems": -5}"#).unwrap();
        assert!(bad.validate().is_err());
    }
}

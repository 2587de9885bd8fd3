//! # Domain Types
//!
//! Core domain types for coupon evaluation.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐   ┌─────────────────┐   ┌─────────────────┐  │
//! │  │       Coupon         │   │  DiscountKind   │   │   PercentOff    │  │
//! │  │  ──────────────────  │   │  ─────────────  │   │  ─────────────  │  │
//! │  │  code                │   │  Amount         │   │  units (u64)    │  │
//! │  │  type / value (raw)  │   │  Percent        │   │  1e12 per point │  │
//! │  │  active, window      │   └─────────────────┘   └─────────────────┘  │
//! │  │  cap / count         │                                              │
//! │  │  allowed_programs    │   ┌─────────────────┐                        │
//! │  └──────────────────────┘   │ PricingContext  │                        │
//! │                             │  now, program   │                        │
//! │                             └─────────────────┘                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`Coupon`] is a read-only snapshot handed over by whoever stores it.
//! `type` and `value` stay loosely typed here because stored data may be
//! malformed; the engine resolves them into [`DiscountKind`],
//! [`crate::money::Money`] and [`PercentOff`] only after the coupon is found
//! eligible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Percent Off
// =============================================================================

/// A percentage discount in fixed point, [`PercentOff::SCALE`] units per
/// percentage point.
///
/// Fine enough that any percent a coupon record can hold (up to twelve
/// decimal places) is applied exactly, so `33.333` is `33_333_000_000_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PercentOff(u64);

impl PercentOff {
    /// Units per percentage point.
    pub const SCALE: u64 = 1_000_000_000_000;

    /// 100% off, in units.
    pub const FULL: u64 = 100 * Self::SCALE;

    /// Creates a percentage from raw units.
    #[inline]
    pub const fn from_units(units: u64) -> Self {
        PercentOff(units)
    }

    /// Creates a percentage from basis points (1 bps = 0.01%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        PercentOff(bps as u64 * (Self::SCALE / 100))
    }

    /// Returns the percentage in raw units.
    #[inline]
    pub const fn units(&self) -> u64 {
        self.0
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// The discount formula a coupon uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Fixed amount off, `value` in cents.
    Amount,
    /// Percentage off, `value` in percentage points (0-100).
    Percent,
}

impl DiscountKind {
    /// The tag as stored in the coupon record.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Amount => "amount",
            DiscountKind::Percent => "percent",
        }
    }

    /// Resolves a stored type tag. Matching is exact: `"Amount"` is unknown.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "amount" => Some(DiscountKind::Amount),
            "percent" => Some(DiscountKind::Percent),
            _ => None,
        }
    }

    /// Like [`DiscountKind::from_tag`] but unknown tags are an error.
    ///
    /// Used when *creating* coupons, where an unknown tag is a caller bug.
    pub fn try_from_tag(tag: &str) -> CoreResult<Self> {
        Self::from_tag(tag).ok_or_else(|| CoreError::UnrecognizedDiscountType(tag.to_string()))
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A coupon record as supplied by the coupon store.
///
/// ## Field Defaults
/// `active` deserializes to `false` when missing: a coupon must be
/// explicitly switched on. `redeemed_count` defaults to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// Unique identifier (UUID v4), assigned by the store.
    #[serde(default)]
    pub id: String,

    /// Redemption code, stored upper-case.
    pub code: String,

    /// Raw discount type tag (`"amount"` or `"percent"`).
    #[serde(rename = "type", default)]
    pub discount_type: Option<String>,

    /// Cents for `amount`, percentage points for `percent`.
    #[serde(default)]
    pub value: Option<f64>,

    #[serde(default)]
    pub active: bool,

    /// First instant the coupon is usable (inclusive).
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,

    /// Last instant the coupon is usable (inclusive).
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,

    /// Upper bound on total redemptions.
    #[serde(default)]
    pub max_redemptions: Option<i64>,

    #[serde(default)]
    pub redeemed_count: i64,

    /// Program slugs this coupon is restricted to. Empty = unrestricted.
    #[serde(default)]
    pub allowed_programs: Option<Vec<String>>,

    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Coupon {
    /// Whether the coupon is limited to a set of programs.
    pub fn has_program_restriction(&self) -> bool {
        self.allowed_programs
            .as_ref()
            .map_or(false, |programs| !programs.is_empty())
    }

    /// Checks the program restriction.
    ///
    /// An unrestricted coupon allows everything, and a price with no program
    /// attached is not held back by a restricted coupon.
    pub fn allows_program(&self, program_slug: Option<&str>) -> bool {
        match (&self.allowed_programs, program_slug) {
            (Some(programs), Some(slug)) if !programs.is_empty() => {
                programs.iter().any(|allowed| allowed == slug)
            }
            _ => true,
        }
    }

    /// Redemptions left before the cap is hit, `None` when uncapped.
    pub fn remaining_redemptions(&self) -> Option<i64> {
        self.max_redemptions
            .map(|max| (max - self.redeemed_count).max(0))
    }
}

// =============================================================================
// New Coupon
// =============================================================================

/// Input shape for creating a coupon.
///
/// `id`, `created_at` and `redeemed_count` are owned by the store and cannot
/// be supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCoupon {
    pub code: String,
    #[serde(rename = "type")]
    pub discount_type: String,
    pub value: f64,
    #[serde(default = "default_active")]
    pub active: bool,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_redemptions: Option<i64>,
    #[serde(default)]
    pub allowed_programs: Option<Vec<String>>,
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Pricing Context
// =============================================================================

/// Everything about the moment of evaluation that is not part of the coupon.
///
/// The clock is injected so the engine stays a pure function of its inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingContext {
    /// The instant the validity window is checked against.
    pub now: DateTime<Utc>,
    /// The program the price applies to.
    pub program_slug: Option<String>,
}

impl PricingContext {
    /// Context evaluated at the current wall-clock time.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Context evaluated at a fixed instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        PricingContext {
            now,
            program_slug: None,
        }
    }

    /// Attaches the program the price applies to.
    pub fn for_program(mut self, program_slug: impl Into<String>) -> Self {
        self.program_slug = Some(program_slug.into());
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.program_slug.as_deref()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(allowed: Option<Vec<&str>>) -> Coupon {
        Coupon {
            id: String::new(),
            code: "SPRING".to_string(),
            discount_type: Some("amount".to_string()),
            value: Some(100.0),
            active: true,
            starts_at: None,
            ends_at: None,
            max_redemptions: None,
            redeemed_count: 0,
            allowed_programs: allowed.map(|p| p.into_iter().map(String::from).collect()),
            created_at: None,
        }
    }

    #[test]
    fn test_percent_off_from_bps() {
        assert_eq!(PercentOff::from_bps(2500).units(), 25 * PercentOff::SCALE);
        assert_eq!(PercentOff::from_bps(10_000).units(), PercentOff::FULL);
        assert_eq!(PercentOff::from_bps(1), PercentOff::from_units(PercentOff::SCALE / 100));
    }

    #[test]
    fn test_discount_kind_tags() {
        assert_eq!(DiscountKind::from_tag("amount"), Some(DiscountKind::Amount));
        assert_eq!(DiscountKind::from_tag("percent"), Some(DiscountKind::Percent));
        assert_eq!(DiscountKind::from_tag("Percent"), None);
        assert_eq!(DiscountKind::from_tag("bogo"), None);
        assert_eq!(DiscountKind::Percent.as_str(), "percent");
        assert!(matches!(
            DiscountKind::try_from_tag("bogo"),
            Err(CoreError::UnrecognizedDiscountType(tag)) if tag == "bogo"
        ));
    }

    #[test]
    fn test_program_restriction() {
        let open = coupon(None);
        assert!(!open.has_program_restriction());
        assert!(open.allows_program(Some("anything")));

        let empty = coupon(Some(vec![]));
        assert!(!empty.has_program_restriction());
        assert!(empty.allows_program(Some("anything")));

        let restricted = coupon(Some(vec!["a", "b"]));
        assert!(restricted.has_program_restriction());
        assert!(restricted.allows_program(Some("a")));
        assert!(!restricted.allows_program(Some("c")));
        assert!(restricted.allows_program(None));
    }

    #[test]
    fn test_remaining_redemptions() {
        let mut c = coupon(None);
        assert_eq!(c.remaining_redemptions(), None);

        c.max_redemptions = Some(5);
        c.redeemed_count = 3;
        assert_eq!(c.remaining_redemptions(), Some(2));

        c.redeemed_count = 9;
        assert_eq!(c.remaining_redemptions(), Some(0));
    }

    #[test]
    fn test_coupon_deserializes_store_row() {
        let row = serde_json::json!({
            "code": "WELCOME25",
            "type": "percent",
            "value": 25,
            "active": true,
            "ends_at": "2026-12-31T23:59:59Z",
            "allowed_programs": ["cpr-ems"]
        });
        let c: Coupon = serde_json::from_value(row).unwrap();
        assert_eq!(c.discount_type.as_deref(), Some("percent"));
        assert_eq!(c.value, Some(25.0));
        assert_eq!(c.redeemed_count, 0);
        assert!(c.ends_at.is_some());
        assert!(c.starts_at.is_none());
    }

    #[test]
    fn test_coupon_missing_active_is_inactive() {
        let c: Coupon = serde_json::from_value(serde_json::json!({ "code": "X" })).unwrap();
        assert!(!c.active);
        assert_eq!(c.discount_type, None);
    }

    #[test]
    fn test_new_coupon_defaults_active() {
        let n: NewCoupon = serde_json::from_value(serde_json::json!({
            "code": "save5", "type": "amount", "value": 500
        }))
        .unwrap();
        assert!(n.active);
        assert_eq!(n.max_redemptions, None);
    }

    #[test]
    fn test_pricing_context_builder() {
        let ctx = PricingContext::now().for_program("business");
        assert_eq!(ctx.program(), Some("business"));
    }
}

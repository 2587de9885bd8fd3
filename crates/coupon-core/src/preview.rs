//! # Preview Payloads
//!
//! Shapes an [`Evaluation`] into what the checkout front-end consumes.
//!
//! ## Payloads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CouponPreview (coupon field on the program card)                       │
//! │    { valid, discounted_cents, type, value, reason }                     │
//! │                                                                         │
//! │  DiscountMetadata (attached to the checkout session)                   │
//! │    { original_price_cents, discounted_price_cents,                      │
//! │      discount_amount_cents }                                            │
//! │    only present when the coupon actually lowers the price              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::engine::{AppliedDiscount, Evaluation};
use crate::types::Coupon;

// =============================================================================
// Coupon Preview
// =============================================================================

/// Response body for a coupon preview request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponPreview {
    pub valid: bool,
    pub discounted_cents: Option<i64>,
    #[serde(rename = "type")]
    pub discount_type: Option<String>,
    pub value: Option<f64>,
    /// Human-readable explanation when `valid` is false.
    pub reason: Option<String>,
}

impl CouponPreview {
    /// Builds the preview for an evaluation of `coupon` (if one was found).
    ///
    /// `type` and `value` echo the stored coupon so the card can render
    /// "25% off" even when the coupon does not apply.
    pub fn from_evaluation(evaluation: &Evaluation, coupon: Option<&Coupon>) -> Self {
        let (valid, discounted_cents, reason) = match evaluation {
            Evaluation::Applied(applied) => (true, Some(applied.discounted_cents), None),
            Evaluation::Ineligible(reason) => (false, None, Some(reason.to_string())),
            Evaluation::Invalid(err) => (false, None, Some(format!("Invalid coupon: {err}"))),
        };

        CouponPreview {
            valid,
            discounted_cents,
            discount_type: coupon.and_then(|c| c.discount_type.clone()),
            value: coupon.and_then(|c| c.value),
            reason,
        }
    }
}

// =============================================================================
// Discount Metadata
// =============================================================================

/// Discount details recorded alongside a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountMetadata {
    pub original_price_cents: i64,
    pub discounted_price_cents: i64,
    pub discount_amount_cents: i64,
}

impl DiscountMetadata {
    /// Writes the fields into an existing metadata object.
    pub fn merge_into(&self, metadata: &mut Map<String, Value>) {
        metadata.insert(
            "original_price_cents".to_string(),
            Value::from(self.original_price_cents),
        );
        metadata.insert(
            "discounted_price_cents".to_string(),
            Value::from(self.discounted_price_cents),
        );
        metadata.insert(
            "discount_amount_cents".to_string(),
            Value::from(self.discount_amount_cents),
        );
    }
}

impl AppliedDiscount {
    /// Checkout metadata, `None` when the discount leaves the price unchanged.
    pub fn metadata(&self) -> Option<DiscountMetadata> {
        self.changes_price().then(|| DiscountMetadata {
            original_price_cents: self.list_cents,
            discounted_price_cents: self.discounted_cents,
            discount_amount_cents: self.discount_amount_cents,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # coupon-core: Pure Discount Engine
//!
//! Decides whether a coupon applies to a program price and computes the
//! discounted price in integer cents. Zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Checkout front-end / HTTP handlers                  │   │
//! │  │      coupon field ──► preview ──► checkout ──► payment hook     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                coupon-store (CouponPricer)                      │   │
//! │  │     lookup by code, catalog prices, compare-and-increment       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshot                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coupon-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │  types   │  │  money   │  │  engine  │  │  validation  │   │   │
//! │  │   │  Coupon  │  │  Money   │  │ evaluate │  │  boundaries  │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK READS IN THE ENGINE • NO MUTATION           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Coupon record, discount kinds, pricing context
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`engine`] - Eligibility checks and discount formulas
//! - [`preview`] - Front-end preview and checkout metadata payloads
//! - [`validation`] - Boundary validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use coupon_core::{evaluate, Coupon, Evaluation, PricingContext};
//!
//! let coupon: Coupon = serde_json::from_value(serde_json::json!({
//!     "code": "WELCOME25", "type": "percent", "value": 25, "active": true
//! })).unwrap();
//!
//! let ctx = PricingContext::now().for_program("cpr-ems");
//! match evaluate(12500, Some(&coupon), &ctx) {
//!     Evaluation::Applied(applied) => assert_eq!(applied.discounted_cents, 9375),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod engine;
pub mod error;
pub mod money;
pub mod preview;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use engine::{
    calculate_discounted_cents, evaluate, try_discounted_cents, AppliedDiscount, Evaluation,
    IneligibleReason,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use preview::{CouponPreview, DiscountMetadata};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest accepted coupon code.
pub const MAX_COUPON_CODE_LEN: usize = 64;

/// Longest accepted program slug.
pub const MAX_PROGRAM_SLUG_LEN: usize = 100;

//! # Discount Engine
//!
//! Decides whether a coupon applies to a price and computes the discounted
//! price in integer cents.
//!
//! ## Evaluation Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  evaluate(list_cents, coupon, ctx)                                      │
//! │                                                                         │
//! │  list_cents < 0? ──────────────────────────────► Invalid               │
//! │  coupon absent? ───────────────────────────────► Ineligible(NoCoupon)  │
//! │  !active? ─────────────────────────────────────► Ineligible(Inactive)  │
//! │  now < starts_at? ─────────────────────────────► Ineligible(NotStarted)│
//! │  now > ends_at? ───────────────────────────────► Ineligible(Expired)   │
//! │  redeemed_count >= max_redemptions? ───────────► Ineligible(Exhausted) │
//! │  program not in allowed_programs? ─────────────► Ineligible(Program..) │
//! │  type missing? ────────────────────────────────► Invalid               │
//! │  type unknown? ────────────────────────────────► Ineligible(Unrecog..) │
//! │  value missing / out of range? ────────────────► Invalid               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  amount:  max(0, list - value)                                         │
//! │  percent: round_half_up(list × (100 - value) / 100)   ──► Applied      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Eligibility is checked before the record's `type`/`value` are validated:
//! an inactive or expired coupon with garbage in it is simply not applicable.
//!
//! ## Purity
//! No I/O, no clock reads (the instant comes from [`PricingContext`]), no
//! mutation. Redemption bookkeeping belongs to the caller.
//!
//! ## Example
//! ```rust
//! use coupon_core::engine::{calculate_discounted_cents, evaluate};
//! use coupon_core::types::{Coupon, PricingContext};
//!
//! let coupon: Coupon = serde_json::from_value(serde_json::json!({
//!     "code": "SAVE3", "type": "amount", "value": 300, "active": true
//! })).unwrap();
//! let ctx = PricingContext::now();
//!
//! assert_eq!(calculate_discounted_cents(1000, Some(&coupon), &ctx), Some(700));
//! assert_eq!(calculate_discounted_cents(1000, None, &ctx), None);
//! assert!(evaluate(1000, Some(&coupon), &ctx).is_applied());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Coupon, DiscountKind, PricingContext};
use crate::validation::{
    validate_amount_value, validate_percent_value, validate_price_cents,
    validate_redemption_counts,
};

// =============================================================================
// Results
// =============================================================================

/// A discount that passed every eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedDiscount {
    pub kind: DiscountKind,
    pub list_cents: i64,
    pub discounted_cents: i64,
    /// `list_cents - discounted_cents`, never negative.
    pub discount_amount_cents: i64,
}

impl AppliedDiscount {
    fn new(kind: DiscountKind, list: Money, discounted: Money) -> Self {
        AppliedDiscount {
            kind,
            list_cents: list.cents(),
            discounted_cents: discounted.cents(),
            discount_amount_cents: (list - discounted).cents(),
        }
    }

    /// The discounted price as [`Money`].
    pub fn discounted(&self) -> Money {
        Money::from_cents(self.discounted_cents)
    }

    /// The amount saved as [`Money`].
    pub fn savings(&self) -> Money {
        Money::from_cents(self.discount_amount_cents)
    }

    /// Whether the discount actually lowers the price (a 0% coupon does not).
    pub fn changes_price(&self) -> bool {
        self.discounted_cents != self.list_cents
    }
}

/// Why a coupon did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum IneligibleReason {
    /// No coupon was supplied.
    NoCoupon,
    /// A code was supplied but the store has no such coupon.
    UnknownCode { code: String },
    Inactive,
    NotStarted {
        #[ts(as = "String")]
        starts_at: DateTime<Utc>,
    },
    Expired {
        #[ts(as = "String")]
        ends_at: DateTime<Utc>,
    },
    Exhausted {
        max_redemptions: i64,
        redeemed_count: i64,
    },
    ProgramNotAllowed { program_slug: String },
    UnrecognizedType { raw: String },
    /// Concurrent redemptions kept winning the counter race.
    RedemptionContended,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibleReason::NoCoupon => write!(f, "No coupon applied"),
            IneligibleReason::UnknownCode { code } => write!(f, "Coupon {code} not found"),
            IneligibleReason::Inactive => write!(f, "Coupon is not active"),
            IneligibleReason::NotStarted { starts_at } => {
                write!(f, "Coupon is not valid until {}", starts_at.to_rfc3339())
            }
            IneligibleReason::Expired { ends_at } => {
                write!(f, "Coupon expired at {}", ends_at.to_rfc3339())
            }
            IneligibleReason::Exhausted { .. } => {
                write!(f, "Coupon has reached its redemption limit")
            }
            IneligibleReason::ProgramNotAllowed { program_slug } => {
                write!(f, "Coupon does not apply to program {program_slug}")
            }
            IneligibleReason::UnrecognizedType { raw } => {
                write!(f, "Unsupported coupon type: {raw}")
            }
            IneligibleReason::RedemptionContended => {
                write!(f, "Coupon could not be redeemed right now, please try again")
            }
        }
    }
}

/// Outcome of evaluating a coupon against a price.
///
/// ## Variants
/// - `Applied` - every check passed, discount computed
/// - `Ineligible` - a normal runtime state (expired, exhausted, ...)
/// - `Invalid` - malformed input, almost always a caller or data bug
///
/// Call sites that only need the lenient "discount or full price" behavior
/// use [`Evaluation::final_cents`].
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Applied(AppliedDiscount),
    Ineligible(IneligibleReason),
    Invalid(ValidationError),
}

impl Evaluation {
    pub fn is_applied(&self) -> bool {
        matches!(self, Evaluation::Applied(_))
    }

    pub fn applied(&self) -> Option<&AppliedDiscount> {
        match self {
            Evaluation::Applied(applied) => Some(applied),
            _ => None,
        }
    }

    pub fn ineligible_reason(&self) -> Option<&IneligibleReason> {
        match self {
            Evaluation::Ineligible(reason) => Some(reason),
            _ => None,
        }
    }

    /// The discounted price, or `None` for "not applicable".
    pub fn discounted_cents(&self) -> Option<i64> {
        self.applied().map(|applied| applied.discounted_cents)
    }

    /// The price to charge: discounted when applied, `list_cents` otherwise.
    ///
    /// A bad coupon never blocks checkout, it just fails to discount.
    pub fn final_cents(&self, list_cents: i64) -> i64 {
        self.discounted_cents().unwrap_or(list_cents)
    }

    /// Strict view: invalid input becomes an error, ineligibility `None`.
    pub fn into_result(self) -> CoreResult<Option<AppliedDiscount>> {
        match self {
            Evaluation::Applied(applied) => Ok(Some(applied)),
            Evaluation::Ineligible(_) => Ok(None),
            Evaluation::Invalid(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Evaluates a coupon against a list price.
pub fn evaluate(list_cents: i64, coupon: Option<&Coupon>, ctx: &PricingContext) -> Evaluation {
    match apply(list_cents, coupon, ctx) {
        Ok(applied) => Evaluation::Applied(applied),
        Err(Rejection::Ineligible(reason)) => Evaluation::Ineligible(reason),
        Err(Rejection::Invalid(err)) => Evaluation::Invalid(err),
    }
}

/// Lenient contract: `Some(discounted_cents)` or `None` for "not applicable".
///
/// Invalid input also collapses to `None`. Use [`try_discounted_cents`] to
/// tell the two apart.
pub fn calculate_discounted_cents(
    list_cents: i64,
    coupon: Option<&Coupon>,
    ctx: &PricingContext,
) -> Option<i64> {
    evaluate(list_cents, coupon, ctx).discounted_cents()
}

/// Strict contract: invalid input is an error, ineligibility is `Ok(None)`.
pub fn try_discounted_cents(
    list_cents: i64,
    coupon: Option<&Coupon>,
    ctx: &PricingContext,
) -> CoreResult<Option<i64>> {
    Ok(evaluate(list_cents, coupon, ctx)
        .into_result()?
        .map(|applied| applied.discounted_cents))
}

// =============================================================================
// Internals
// =============================================================================

enum Rejection {
    Ineligible(IneligibleReason),
    Invalid(ValidationError),
}

impl From<IneligibleReason> for Rejection {
    fn from(reason: IneligibleReason) -> Self {
        Rejection::Ineligible(reason)
    }
}

impl From<ValidationError> for Rejection {
    fn from(err: ValidationError) -> Self {
        Rejection::Invalid(err)
    }
}

fn apply(
    list_cents: i64,
    coupon: Option<&Coupon>,
    ctx: &PricingContext,
) -> Result<AppliedDiscount, Rejection> {
    validate_price_cents(list_cents)?;
    let coupon = coupon.ok_or(IneligibleReason::NoCoupon)?;

    check_eligibility(coupon, ctx)?;

    let kind = resolve_kind(coupon)?;
    let value = coupon.value.ok_or_else(|| ValidationError::required("value"))?;

    let list = Money::from_cents(list_cents);
    let discounted = match kind {
        DiscountKind::Amount => list.less_fixed(validate_amount_value(value)?),
        DiscountKind::Percent => list.less_percentage(validate_percent_value(value)?),
    };

    Ok(AppliedDiscount::new(kind, list, discounted))
}

fn check_eligibility(coupon: &Coupon, ctx: &PricingContext) -> Result<(), Rejection> {
    if !coupon.active {
        return Err(IneligibleReason::Inactive.into());
    }

    if let Some(starts_at) = coupon.starts_at {
        if ctx.now < starts_at {
            return Err(IneligibleReason::NotStarted { starts_at }.into());
        }
    }

    if let Some(ends_at) = coupon.ends_at {
        if ctx.now > ends_at {
            return Err(IneligibleReason::Expired { ends_at }.into());
        }
    }

    if let Some(max_redemptions) = coupon.max_redemptions {
        validate_redemption_counts(Some(max_redemptions), coupon.redeemed_count)?;
        if coupon.redeemed_count >= max_redemptions {
            return Err(IneligibleReason::Exhausted {
                max_redemptions,
                redeemed_count: coupon.redeemed_count,
            }
            .into());
        }
    }

    if let Some(slug) = ctx.program() {
        if !coupon.allows_program(Some(slug)) {
            return Err(IneligibleReason::ProgramNotAllowed {
                program_slug: slug.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn resolve_kind(coupon: &Coupon) -> Result<DiscountKind, Rejection> {
    match coupon.discount_type.as_deref() {
        Some(tag) if !tag.trim().is_empty() => DiscountKind::from_tag(tag).ok_or_else(|| {
            IneligibleReason::UnrecognizedType {
                raw: tag.to_string(),
            }
            .into()
        }),
        _ => Err(ValidationError::required("type").into()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn ctx() -> PricingContext {
        PricingContext::at(now())
    }

    fn coupon(kind: &str, value: f64) -> Coupon {
        Coupon {
            id: "c-1".to_string(),
            code: "TEST".to_string(),
            discount_type: Some(kind.to_string()),
            value: Some(value),
            active: true,
            starts_at: None,
            ends_at: None,
            max_redemptions: None,
            redeemed_count: 0,
            allowed_programs: None,
            created_at: None,
        }
    }

    fn reason(eval: Evaluation) -> IneligibleReason {
        match eval {
            Evaluation::Ineligible(reason) => reason,
            other => panic!("expected ineligible, got {other:?}"),
        }
    }

    #[test]
    fn test_no_coupon_is_not_applicable() {
        for list in [0, 1, 1000, 495000] {
            assert_eq!(calculate_discounted_cents(list, None, &ctx()), None);
            assert_eq!(reason(evaluate(list, None, &ctx())), IneligibleReason::NoCoupon);
        }
    }

    #[test]
    fn test_inactive_coupon_is_not_applicable() {
        let mut c = coupon("amount", 300.0);
        c.active = false;
        assert_eq!(reason(evaluate(1000, Some(&c), &ctx())), IneligibleReason::Inactive);

        // Eligibility is decided before the record's shape is validated
        c.value = Some(-50.0);
        c.discount_type = None;
        assert_eq!(reason(evaluate(1000, Some(&c), &ctx())), IneligibleReason::Inactive);
    }

    #[test]
    fn test_amount_discount() {
        let c = coupon("amount", 300.0);
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &ctx()), Some(700));

        let applied = *evaluate(1000, Some(&c), &ctx()).applied().unwrap();
        assert_eq!(applied.kind, DiscountKind::Amount);
        assert_eq!(applied.discount_amount_cents, 300);
        assert_eq!(applied.savings().cents(), 300);
        assert!(applied.changes_price());
    }

    #[test]
    fn test_percent_discount() {
        let c = coupon("percent", 25.0);
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &ctx()), Some(750));
    }

    #[test]
    fn test_amount_discount_floors_at_zero() {
        let c = coupon("amount", 500.0);
        assert_eq!(calculate_discounted_cents(100, Some(&c), &ctx()), Some(0));

        let applied = *evaluate(100, Some(&c), &ctx()).applied().unwrap();
        assert_eq!(applied.discount_amount_cents, 100);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        let c = coupon("percent", 50.0);
        assert_eq!(calculate_discounted_cents(101, Some(&c), &ctx()), Some(51));
        assert_eq!(calculate_discounted_cents(1, Some(&c), &ctx()), Some(1));
        assert_eq!(calculate_discounted_cents(0, Some(&c), &ctx()), Some(0));
    }

    /// Fractional percents go through the exact `round(list × (1 - value/100))`.
    #[test]
    fn test_fractional_percent_is_applied_exactly() {
        let cases = [
            (1_000_000, 33.333, 666_670),
            (1_000_000, 0.004, 999_960),
            (1_000_000, 0.005, 999_950),
            (200_000, 12.345, 175_310),
            (12_500, 12.5, 10_938),
            (999, 0.05, 999),
        ];
        for (list, value, expected) in cases {
            let c = coupon("percent", value);
            assert_eq!(
                calculate_discounted_cents(list, Some(&c), &ctx()),
                Some(expected),
                "{value}% off {list}"
            );
        }
    }

    #[test]
    fn test_zero_percent_does_not_change_price() {
        let c = coupon("percent", 0.0);
        let applied = *evaluate(1000, Some(&c), &ctx()).applied().unwrap();
        assert_eq!(applied.discounted_cents, 1000);
        assert!(!applied.changes_price());
    }

    #[test]
    fn test_expired_coupon() {
        let mut c = coupon("amount", 300.0);
        c.ends_at = Some(now() - Duration::days(1));
        assert!(matches!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::Expired { .. }
        ));
    }

    #[test]
    fn test_not_yet_started_coupon() {
        let mut c = coupon("amount", 300.0);
        c.starts_at = Some(now() + Duration::hours(1));
        assert!(matches!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::NotStarted { .. }
        ));
    }

    #[test]
    fn test_window_is_inclusive() {
        let mut c = coupon("amount", 300.0);
        c.starts_at = Some(now());
        c.ends_at = Some(now());
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &ctx()), Some(700));

        let after = PricingContext::at(now() + Duration::seconds(1));
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &after), None);
    }

    #[test]
    fn test_exhausted_at_equality() {
        let mut c = coupon("amount", 300.0);
        c.max_redemptions = Some(5);

        c.redeemed_count = 4;
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &ctx()), Some(700));

        c.redeemed_count = 5;
        assert_eq!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::Exhausted {
                max_redemptions: 5,
                redeemed_count: 5
            }
        );
    }

    #[test]
    fn test_zero_max_redemptions_is_always_exhausted() {
        let mut c = coupon("amount", 300.0);
        c.max_redemptions = Some(0);
        assert!(matches!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::Exhausted { .. }
        ));
    }

    #[test]
    fn test_program_restriction() {
        let mut c = coupon("amount", 300.0);
        c.allowed_programs = Some(vec!["a".to_string(), "b".to_string()]);

        let wrong = ctx().for_program("c");
        assert_eq!(
            reason(evaluate(1000, Some(&c), &wrong)),
            IneligibleReason::ProgramNotAllowed {
                program_slug: "c".to_string()
            }
        );

        let right = ctx().for_program("a");
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &right), Some(700));

        // No program on the price: the restriction cannot be checked
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &ctx()), Some(700));
    }

    #[test]
    fn test_empty_allowed_programs_is_unrestricted() {
        let mut c = coupon("amount", 300.0);
        c.allowed_programs = Some(vec![]);
        let any = ctx().for_program("c");
        assert_eq!(calculate_discounted_cents(1000, Some(&c), &any), Some(700));
    }

    #[test]
    fn test_unrecognized_type_is_ineligible_not_error() {
        let c = coupon("bogo", 50.0);
        assert_eq!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::UnrecognizedType {
                raw: "bogo".to_string()
            }
        );
        assert!(matches!(try_discounted_cents(1000, Some(&c), &ctx()), Ok(None)));
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        let mut c = coupon("bogo", 50.0);
        c.ends_at = Some(now() - Duration::days(1));
        c.max_redemptions = Some(1);
        c.redeemed_count = 1;
        assert!(matches!(
            reason(evaluate(1000, Some(&c), &ctx())),
            IneligibleReason::Expired { .. }
        ));
    }

    #[test]
    fn test_negative_price_is_invalid() {
        let c = coupon("amount", 300.0);
        assert_eq!(
            evaluate(-1, Some(&c), &ctx()),
            Evaluation::Invalid(ValidationError::negative("list_cents"))
        );
        assert!(matches!(evaluate(-1, None, &ctx()), Evaluation::Invalid(_)));
    }

    #[test]
    fn test_malformed_values_are_invalid() {
        let cases = [
            coupon("amount", -300.0),
            coupon("amount", 12.5),
            coupon("percent", 150.0),
            coupon("percent", -1.0),
            coupon("percent", f64::NAN),
        ];
        for c in &cases {
            assert!(
                matches!(evaluate(1000, Some(c), &ctx()), Evaluation::Invalid(_)),
                "expected invalid for {c:?}"
            );
            assert_eq!(calculate_discounted_cents(1000, Some(c), &ctx()), None);
        }
    }

    #[test]
    fn test_missing_type_or_value_is_invalid() {
        let mut no_type = coupon("amount", 300.0);
        no_type.discount_type = None;
        assert_eq!(
            evaluate(1000, Some(&no_type), &ctx()),
            Evaluation::Invalid(ValidationError::required("type"))
        );

        let mut blank_type = coupon("amount", 300.0);
        blank_type.discount_type = Some("  ".to_string());
        assert!(matches!(
            evaluate(1000, Some(&blank_type), &ctx()),
            Evaluation::Invalid(_)
        ));

        let mut no_value = coupon("percent", 0.0);
        no_value.value = None;
        assert_eq!(
            evaluate(1000, Some(&no_value), &ctx()),
            Evaluation::Invalid(ValidationError::required("value"))
        );
    }

    #[test]
    fn test_negative_counts_are_invalid() {
        let mut c = coupon("amount", 300.0);
        c.max_redemptions = Some(10);
        c.redeemed_count = -3;
        assert!(matches!(evaluate(1000, Some(&c), &ctx()), Evaluation::Invalid(_)));
    }

    #[test]
    fn test_strict_api_surfaces_invalid_input() {
        let c = coupon("percent", 150.0);
        let err = try_discounted_cents(1000, Some(&c), &ctx()).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let ok = coupon("percent", 10.0);
        assert_eq!(try_discounted_cents(1000, Some(&ok), &ctx()).unwrap(), Some(900));
    }

    #[test]
    fn test_final_cents_falls_back_to_list_price() {
        let mut c = coupon("amount", 300.0);
        assert_eq!(evaluate(1000, Some(&c), &ctx()).final_cents(1000), 700);

        c.active = false;
        assert_eq!(evaluate(1000, Some(&c), &ctx()).final_cents(1000), 1000);
    }

    #[test]
    fn test_evaluation_is_pure_and_repeatable() {
        let mut c = coupon("percent", 15.0);
        c.max_redemptions = Some(3);
        c.redeemed_count = 2;
        let before = c.clone();

        let first = evaluate(1999, Some(&c), &ctx());
        for _ in 0..10 {
            assert_eq!(evaluate(1999, Some(&c), &ctx()), first);
        }
        assert_eq!(c, before);
        assert_eq!(first.discounted_cents(), Some(1699));
    }

    #[test]
    fn test_result_never_exceeds_list_or_goes_negative() {
        let kinds = [
            ("amount", 0.0),
            ("amount", 999.0),
            ("percent", 0.0),
            ("percent", 33.33),
            ("percent", 100.0),
        ];
        for list in [0, 1, 7, 99, 100, 101, 12500, 495000] {
            for (kind, value) in kinds {
                let c = coupon(kind, value);
                let cents = calculate_discounted_cents(list, Some(&c), &ctx()).unwrap();
                assert!((0..=list).contains(&cents), "{kind} {value} on {list} gave {cents}");
            }
        }
    }

    #[test]
    fn test_reason_messages() {
        assert_eq!(IneligibleReason::Inactive.to_string(), "Coupon is not active");
        assert_eq!(
            IneligibleReason::ProgramNotAllowed {
                program_slug: "cpr-ems".to_string()
            }
            .to_string(),
            "Coupon does not apply to program cpr-ems"
        );
        assert_eq!(
            IneligibleReason::UnknownCode {
                code: "NOPE".to_string()
            }
            .to_string(),
            "Coupon NOPE not found"
        );
    }

    #[test]
    fn test_reason_serializes_with_tag() {
        let json = serde_json::to_value(IneligibleReason::Exhausted {
            max_redemptions: 3,
            redeemed_count: 3,
        })
        .unwrap();
        assert_eq!(json["reason"], "exhausted");
        assert_eq!(json["max_redemptions"], 3);
    }
}

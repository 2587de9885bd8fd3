//! # Validation Module
//!
//! Boundary checks for prices and coupon records.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Coupon creation (coupon-store insert)                        │
//! │  ├── normalize_coupon_code, validate_program_slug                      │
//! │  └── value checks per discount kind                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Evaluation (engine)                                          │
//! │  ├── validate_price_cents on every call                                │
//! │  └── value / count checks on the stored snapshot                       │
//! │                                                                         │
//! │  Stored data can drift from Layer 1 rules, so Layer 2 re-checks.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coupon_core::types::PercentOff;
//! use coupon_core::validation::{normalize_coupon_code, validate_percent_value};
//!
//! assert_eq!(normalize_coupon_code("  spring-25 ").unwrap(), "SPRING-25");
//! assert_eq!(validate_percent_value(12.5).unwrap(), PercentOff::from_bps(1250));
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::PercentOff;
use crate::{MAX_COUPON_CODE_LEN, MAX_PROGRAM_SLUG_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates and normalizes a coupon code.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must not be empty, at most 64 characters
/// - ASCII letters, digits, hyphens and underscores only
///
/// ## Returns
/// The upper-cased code, which is the form codes are stored and looked up in.
///
/// ## Example
/// ```rust
/// use coupon_core::validation::normalize_coupon_code;
///
/// assert_eq!(normalize_coupon_code("welcome25").unwrap(), "WELCOME25");
/// assert!(normalize_coupon_code("").is_err());
/// assert!(normalize_coupon_code("two words").is_err());
/// ```
pub fn normalize_coupon_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::required("code"));
    }

    if code.len() > MAX_COUPON_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_COUPON_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "code",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a program slug (e.g. `cpr-ems`, `building-tech`).
///
/// ## Rules
/// - Must not be empty, at most 100 characters
/// - Lowercase ASCII letters, digits, hyphens and underscores only
pub fn validate_program_slug(slug: &str) -> ValidationResult<()> {
    if slug.trim().is_empty() {
        return Err(ValidationError::required("program_slug"));
    }

    if slug.len() > MAX_PROGRAM_SLUG_LEN {
        return Err(ValidationError::TooLong {
            field: "program_slug".to_string(),
            max: MAX_PROGRAM_SLUG_LEN,
        });
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid_format(
            "program_slug",
            "must contain only lowercase letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a list price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free programs)
///
/// ## Example
/// ```rust
/// use coupon_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(12500).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::negative("list_cents"));
    }

    Ok(())
}

/// Validates the `value` of an amount coupon and converts it to [`Money`].
///
/// ## Rules
/// - Finite and non-negative
/// - Whole cents only (`300.0` is fine, `299.5` is not)
pub fn validate_amount_value(value: f64) -> ValidationResult<Money> {
    check_finite_non_negative(value)?;

    if value.fract() != 0.0 {
        return Err(ValidationError::invalid_format(
            "value",
            "amount must be a whole number of cents",
        ));
    }

    if value >= i64::MAX as f64 {
        return Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(Money::from_cents(value as i64))
}

/// Validates the `value` of a percent coupon and converts it to [`PercentOff`].
///
/// ## Rules
/// - Finite, between 0 and 100 inclusive
/// - Kept to twelve decimal places, which absorbs binary float noise
///   (`33.333` is stored as `33.33299999...`) without losing any digit a
///   coupon record actually carries
///
/// ## Example
/// ```rust
/// use coupon_core::types::PercentOff;
/// use coupon_core::validation::validate_percent_value;
///
/// assert_eq!(validate_percent_value(25.0).unwrap(), PercentOff::from_bps(2500));
/// assert!(validate_percent_value(150.0).is_err());
/// ```
pub fn validate_percent_value(value: f64) -> ValidationResult<PercentOff> {
    check_finite_non_negative(value)?;

    if value > 100.0 {
        return Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(PercentOff::from_units(
        (value * PercentOff::SCALE as f64).round() as u64,
    ))
}

/// Validates the redemption counters of a stored coupon.
///
/// ## Rules
/// - `redeemed_count` must be non-negative
/// - `max_redemptions`, when set, must be non-negative (zero means "never")
pub fn validate_redemption_counts(
    max_redemptions: Option<i64>,
    redeemed_count: i64,
) -> ValidationResult<()> {
    if redeemed_count < 0 {
        return Err(ValidationError::negative("redeemed_count"));
    }

    if matches!(max_redemptions, Some(max) if max < 0) {
        return Err(ValidationError::negative("max_redemptions"));
    }

    Ok(())
}

fn check_finite_non_negative(value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::invalid_format("value", "must be a finite number"));
    }

    if value < 0.0 {
        return Err(ValidationError::negative("value"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Error Types
//!
//! Domain-specific error types for coupon-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  coupon-core errors (this file)                                        │
//! │  ├── CoreError        - Strict-mode evaluation failures                │
//! │  └── ValidationError  - Malformed prices / coupon records              │
//! │                                                                         │
//! │  coupon-store errors (separate crate)                                  │
//! │  └── StoreError       - Lookup, redemption and seeding failures        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → HTTP layer           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ineligibility Is Not an Error
//! An expired, inactive or exhausted coupon is an ordinary runtime state and
//! is reported through [`crate::engine::IneligibleReason`]. Only malformed
//! input (a caller bug) ends up here.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors surfaced by the strict evaluation API.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The coupon carries a type tag the engine does not know.
    ///
    /// ## When This Occurs
    /// Only from [`crate::types::DiscountKind::try_from_tag`]. The engine
    /// itself treats unknown tags as ineligible, not as an error.
    #[error("Unrecognized discount type: {0}")]
    UnrecognizedDiscountType(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a price or coupon record does not have the shape the engine
/// requires. These always point at the caller or at bad stored data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., fractional cents, bad characters in a code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::MustBeNonNegative`].
    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::MustBeNonNegative {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

//! # Store Error Types
//!
//! Error types for store, catalog and pricing operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  ValidationError / CoreError (coupon-core)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds lookup and redemption failures        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP layer maps to status codes                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An ineligible coupon is NOT a `StoreError`; it comes back inside the
//! [`crate::pricing::Quote`].

use coupon_core::{CoreError, ValidationError};
use thiserror::Error;

/// Store and pricing errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A coupon with this code already exists.
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The coupon hit `max_redemptions` before this redemption.
    #[error("Coupon {code} has no redemptions left")]
    Exhausted { code: String },

    /// Compare-and-increment lost a race.
    ///
    /// ## When This Occurs
    /// Another redemption landed between reading the coupon and writing the
    /// new count. The caller re-reads and re-evaluates.
    #[error("Coupon {code} changed concurrently: expected count {expected}, found {actual}")]
    Conflict {
        code: String,
        expected: i64,
        actual: i64,
    },

    /// Program slug has no price in the catalog.
    #[error("No list price for program: {0}")]
    UnknownProgram(String),

    /// Seed file could not be applied.
    #[error("Seed failed: {0}")]
    Seed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Creates a NotFound error for a coupon code.
    pub fn coupon_not_found(code: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: "Coupon".to_string(),
            id: code.into(),
        }
    }

    /// Creates a Duplicate error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        StoreError::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Returns true if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if a retry after re-reading may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

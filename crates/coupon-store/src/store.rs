//! # Coupon Store
//!
//! In-memory coupon records keyed by normalized code. Stands in for the
//! coupons table when no database is wired up, and owns the one mutation the
//! engine must never perform: bumping `redeemed_count`.
//!
//! ## Redemption Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two checkouts, one redemption left (max 3, count 2)                    │
//! │                                                                         │
//! │  A: read count=2 ──► evaluate: eligible ──► CAS(expected=2) ──► OK, 3   │
//! │  B: read count=2 ──► evaluate: eligible ──► CAS(expected=2) ──► Conflict│
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │  B: re-read count=3 ──► evaluate: Exhausted ──► no discount             │
//! │                                                                         │
//! │  The check and the increment happen under one write lock, so the cap   │
//! │  can never be overrun.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use coupon_core::validation::{
    normalize_coupon_code, validate_amount_value, validate_percent_value,
    validate_program_slug, validate_redemption_counts,
};
use coupon_core::{Coupon, DiscountKind, NewCoupon, ValidationError};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Shared handle to the coupon records. Clones share the same map.
///
/// ## Usage
/// ```rust,ignore
/// let store = CouponStore::new();
/// store.insert(new_coupon).await?;
///
/// let snapshot = store.get("welcome25").await?; // codes are case-insensitive
/// store.compare_and_increment("WELCOME25", snapshot.redeemed_count).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CouponStore {
    coupons: Arc<RwLock<HashMap<String, Coupon>>>,
}

impl CouponStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        CouponStore::default()
    }

    /// Creates a coupon.
    ///
    /// ## Validation
    /// - code is normalized (trimmed, upper-cased) and must be unique
    /// - type must be `amount` or `percent`, value in range for that type
    /// - program slugs must be well-formed
    /// - `ends_at` must not be before `starts_at`
    ///
    /// The store assigns `id`, `created_at` and `redeemed_count = 0`.
    pub async fn insert(&self, new: NewCoupon) -> StoreResult<Coupon> {
        let code = normalize_coupon_code(&new.code)?;
        let kind = DiscountKind::try_from_tag(new.discount_type.trim())?;
        match kind {
            DiscountKind::Amount => {
                validate_amount_value(new.value)?;
            }
            DiscountKind::Percent => {
                validate_percent_value(new.value)?;
            }
        }
        validate_redemption_counts(new.max_redemptions, 0)?;
        for slug in new.allowed_programs.iter().flatten() {
            validate_program_slug(slug)?;
        }
        if let (Some(starts_at), Some(ends_at)) = (new.starts_at, new.ends_at) {
            if ends_at < starts_at {
                return Err(ValidationError::invalid_format(
                    "ends_at",
                    "must not be before starts_at",
                )
                .into());
            }
        }

        let coupon = Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.clone(),
            discount_type: Some(kind.as_str().to_string()),
            value: Some(new.value),
            active: new.active,
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            max_redemptions: new.max_redemptions,
            redeemed_count: 0,
            allowed_programs: new.allowed_programs,
            created_at: Some(Utc::now()),
        };

        let mut coupons = self.coupons.write().await;
        if coupons.contains_key(&code) {
            return Err(StoreError::duplicate("code", code));
        }
        coupons.insert(code.clone(), coupon.clone());

        info!(code = %code, kind = kind.as_str(), value = new.value, "Coupon created");
        Ok(coupon)
    }

    /// Returns a snapshot of the coupon, or `None` if no such code exists.
    pub async fn find(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let code = normalize_coupon_code(code)?;
        let found = self.coupons.read().await.get(&code).cloned();
        if found.is_none() {
            debug!(code = %code, "Coupon lookup miss");
        }
        Ok(found)
    }

    /// Returns a snapshot of the coupon.
    pub async fn get(&self, code: &str) -> StoreResult<Coupon> {
        self.find(code)
            .await?
            .ok_or_else(|| StoreError::coupon_not_found(code.trim().to_ascii_uppercase()))
    }

    /// All coupons, ordered by code.
    pub async fn list(&self) -> Vec<Coupon> {
        let mut all: Vec<Coupon> = self.coupons.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }

    /// Number of stored coupons.
    pub async fn len(&self) -> usize {
        self.coupons.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.coupons.read().await.is_empty()
    }

    /// Switches a coupon on or off.
    pub async fn set_active(&self, code: &str, active: bool) -> StoreResult<Coupon> {
        let code = normalize_coupon_code(code)?;
        let mut coupons = self.coupons.write().await;
        let coupon = coupons
            .get_mut(&code)
            .ok_or_else(|| StoreError::coupon_not_found(&code))?;
        coupon.active = active;

        info!(code = %code, active, "Coupon activation changed");
        Ok(coupon.clone())
    }

    /// Removes a coupon and returns the removed record.
    pub async fn delete(&self, code: &str) -> StoreResult<Coupon> {
        let code = normalize_coupon_code(code)?;
        let removed = self
            .coupons
            .write()
            .await
            .remove(&code)
            .ok_or_else(|| StoreError::coupon_not_found(&code))?;

        info!(code = %code, "Coupon deleted");
        Ok(removed)
    }

    /// Records one redemption if nobody else has redeemed since the caller's
    /// snapshot.
    ///
    /// ## Atomicity
    /// Under a single write lock:
    /// 1. `redeemed_count` must equal `expected_count`, else `Conflict`
    /// 2. `redeemed_count` must be below `max_redemptions`, else `Exhausted`
    /// 3. `redeemed_count += 1`
    ///
    /// Returns the updated record.
    pub async fn compare_and_increment(
        &self,
        code: &str,
        expected_count: i64,
    ) -> StoreResult<Coupon> {
        let code = normalize_coupon_code(code)?;
        let mut coupons = self.coupons.write().await;
        let coupon = coupons
            .get_mut(&code)
            .ok_or_else(|| StoreError::coupon_not_found(&code))?;

        if coupon.redeemed_count != expected_count {
            warn!(
                code = %code,
                expected = expected_count,
                actual = coupon.redeemed_count,
                "Redemption conflict"
            );
            return Err(StoreError::Conflict {
                code,
                expected: expected_count,
                actual: coupon.redeemed_count,
            });
        }

        if matches!(coupon.max_redemptions, Some(max) if coupon.redeemed_count >= max) {
            return Err(StoreError::Exhausted { code });
        }

        coupon.redeemed_count += 1;
        info!(
            code = %code,
            redeemed_count = coupon.redeemed_count,
            max_redemptions = ?coupon.max_redemptions,
            "Coupon redeemed"
        );
        Ok(coupon.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Seed Data
//!
//! Loads programs and coupons from a JSON file into a fresh store.
//!
//! ## File Format
//! ```json
//! {
//!   "programs": { "cpr-ems": 12500, "business": 495000 },
//!   "coupons": [
//!     { "code": "WELCOME25", "type": "percent", "value": 25,
//!       "allowed_programs": ["cpr-ems"] },
//!     { "code": "SAVE50", "type": "amount", "value": 5000,
//!       "max_redemptions": 100, "ends_at": "2026-12-31T23:59:59Z" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use coupon_core::NewCoupon;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::ProgramCatalog;
use crate::error::{StoreError, StoreResult};
use crate::store::CouponStore;

/// Contents of a seed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub programs: ProgramCatalog,
    #[serde(default)]
    pub coupons: Vec<NewCoupon>,
}

impl SeedData {
    /// Parses seed data from a JSON string.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let seed: SeedData = serde_json::from_str(json)?;
        seed.programs.validate()?;
        Ok(seed)
    }

    /// Reads and parses a seed file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let seed = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            programs = seed.programs.len(),
            coupons = seed.coupons.len(),
            "Seed file loaded"
        );
        Ok(seed)
    }

    /// Inserts every coupon into `store` and hands back the catalog.
    ///
    /// Stops at the first coupon that fails validation; coupons inserted
    /// before it stay in the store.
    pub async fn apply(self, store: &CouponStore) -> StoreResult<ProgramCatalog> {
        for coupon in self.coupons {
            let code = coupon.code.clone();
            store
                .insert(coupon)
                .await
                .map_err(|err| StoreError::Seed(format!("coupon {code}: {err}")))?;
        }
        Ok(self.programs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # coupon-store: Coupon Store & Pricing Service
//!
//! The collaborator the pure engine leans on: it keeps coupon records, owns
//! redemption bookkeeping and turns "code + program" into a priced quote.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Coupon Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (preview / checkout / payment hook)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   coupon-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ CouponPricer  │───►│  CouponStore  │    │ ProgramCatalog│  │   │
//! │  │   │ (pricing.rs)  │    │  (store.rs)   │    │ (catalog.rs) │   │   │
//! │  │   │ quote/redeem  │    │ RwLock<Map>   │    │ slug → cents │   │   │
//! │  │   └───────┬───────┘    │ CAS increment │    └──────────────┘   │   │
//! │  │           │            └───────────────┘                       │   │
//! │  └───────────┼─────────────────────────────────────────────────────┘   │
//! │              ▼                                                          │
//! │        coupon-core::evaluate (pure)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - In-memory coupon records and compare-and-increment
//! - [`catalog`] - Program list prices
//! - [`pricing`] - Quotes and redemptions
//! - [`seed`] - JSON seed file loading
//! - [`config`] - Environment configuration
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coupon_store::{CouponPricer, StoreConfig};
//!
//! let pricer = CouponPricer::from_config(&StoreConfig::load()?).await?;
//! let quote = pricer.quote_program(Some("welcome25"), "cpr-ems").await?;
//! let charge = quote.final_cents();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod pricing;
pub mod seed;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::ProgramCatalog;
pub use config::{ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use pricing::{CouponPricer, Quote};
pub use seed::SeedData;
pub use store::CouponStore;

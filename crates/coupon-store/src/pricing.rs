//! # Coupon Pricer
//!
//! Glues the store, the program catalog and the pure engine together.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Program card                 Checkout                Payment hook      │
//! │  ────────────                 ────────                ────────────      │
//! │  quote_program(code, slug)    quote(code, cents, ..)  redeem(code, ..)  │
//! │       │                            │                       │            │
//! │       ▼                            ▼                       ▼            │
//! │  snapshot ──► evaluate       snapshot ──► evaluate   snapshot ──►       │
//! │       │                            │                 evaluate ──►       │
//! │       ▼                            ▼                 compare_and_       │
//! │  CouponPreview               final price +           increment          │
//! │                              DiscountMetadata        (retry on conflict)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Quotes never mutate. Only [`CouponPricer::redeem`] bumps the counter, and
//! only for a coupon that evaluated as applied against the same snapshot.

use coupon_core::{
    evaluate, Coupon, CouponPreview, DiscountMetadata, Evaluation, IneligibleReason,
    PricingContext,
};
use tracing::{debug, info, warn};

use crate::catalog::ProgramCatalog;
use crate::config::{StoreConfig, DEFAULT_MAX_REDEEM_RETRIES};
use crate::error::{StoreError, StoreResult};
use crate::seed::SeedData;
use crate::store::CouponStore;

// =============================================================================
// Quote
// =============================================================================

/// The result of pricing one program with one (optional) coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Code as entered, if any.
    pub code: Option<String>,
    pub program_slug: Option<String>,
    pub list_cents: i64,
    /// The coupon snapshot that was evaluated. After a redemption this is
    /// the updated record.
    pub coupon: Option<Coupon>,
    pub evaluation: Evaluation,
    /// Whether this quote consumed a redemption.
    pub redeemed: bool,
}

impl Quote {
    /// Price to charge; the full list price when the coupon does not apply.
    pub fn final_cents(&self) -> i64 {
        self.evaluation.final_cents(self.list_cents)
    }

    /// Front-end preview payload.
    pub fn preview(&self) -> CouponPreview {
        CouponPreview::from_evaluation(&self.evaluation, self.coupon.as_ref())
    }

    /// Checkout metadata, only when the price actually changed.
    pub fn metadata(&self) -> Option<DiscountMetadata> {
        self.evaluation.applied().and_then(|applied| applied.metadata())
    }
}

// =============================================================================
// Pricer
// =============================================================================

/// Prices programs with coupons and records redemptions.
///
/// ## Usage
/// ```rust,ignore
/// let pricer = CouponPricer::from_config(&StoreConfig::load()?).await?;
///
/// let quote = pricer.quote_program(Some("welcome25"), "cpr-ems").await?;
/// println!("{}", serde_json::to_string(&quote.preview())?);
///
/// // after payment succeeds
/// pricer.redeem("WELCOME25", quote.list_cents, Some("cpr-ems")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CouponPricer {
    store: CouponStore,
    catalog: ProgramCatalog,
    max_redeem_retries: u32,
}

impl CouponPricer {
    pub fn new(store: CouponStore, catalog: ProgramCatalog) -> Self {
        CouponPricer {
            store,
            catalog,
            max_redeem_retries: DEFAULT_MAX_REDEEM_RETRIES,
        }
    }

    /// Sets how many times a redemption retries after a conflict.
    pub fn max_redeem_retries(mut self, retries: u32) -> Self {
        self.max_redeem_retries = retries;
        self
    }

    /// Builds a pricer from configuration, loading the seed file if set.
    pub async fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let store = CouponStore::new();
        let catalog = match &config.seed_file {
            Some(path) => SeedData::load(path)?.apply(&store).await?,
            None => ProgramCatalog::new(),
        };

        info!(
            coupons = store.len().await,
            programs = catalog.len(),
            "Coupon pricer ready"
        );
        Ok(CouponPricer::new(store, catalog).max_redeem_retries(config.max_redeem_retries))
    }

    pub fn store(&self) -> &CouponStore {
        &self.store
    }

    pub fn catalog(&self) -> &ProgramCatalog {
        &self.catalog
    }

    /// Quotes a price at the current time.
    pub async fn quote(
        &self,
        code: Option<&str>,
        list_cents: i64,
        program_slug: Option<&str>,
    ) -> StoreResult<Quote> {
        self.quote_in(&context(program_slug), code, list_cents).await
    }

    /// Quotes a program at its catalog price.
    pub async fn quote_program(
        &self,
        code: Option<&str>,
        program_slug: &str,
    ) -> StoreResult<Quote> {
        let list = self.catalog.price(program_slug)?;
        self.quote(code, list.cents(), Some(program_slug)).await
    }

    /// Quotes a price in an explicit context (fixed clock, program).
    ///
    /// ## Lookup Rules
    /// - no code, or a blank one → `NoCoupon`
    /// - a code that is malformed or not stored → `UnknownCode`
    pub async fn quote_in(
        &self,
        ctx: &PricingContext,
        code: Option<&str>,
        list_cents: i64,
    ) -> StoreResult<Quote> {
        let code = code.map(str::trim).filter(|c| !c.is_empty());

        let coupon = match code {
            Some(raw) => match self.store.find(raw).await {
                Ok(found) => found,
                Err(StoreError::Validation(_)) => None,
                Err(err) => return Err(err),
            },
            None => None,
        };

        let evaluation = match (code, &coupon) {
            (Some(raw), None) => Evaluation::Ineligible(IneligibleReason::UnknownCode {
                code: raw.to_ascii_uppercase(),
            }),
            _ => evaluate(list_cents, coupon.as_ref(), ctx),
        };

        debug!(
            code = ?code,
            program = ?ctx.program(),
            list_cents,
            discounted_cents = ?evaluation.discounted_cents(),
            reason = ?evaluation.ineligible_reason(),
            "Coupon quoted"
        );

        Ok(Quote {
            code: code.map(str::to_string),
            program_slug: ctx.program_slug.clone(),
            list_cents,
            coupon,
            evaluation,
            redeemed: false,
        })
    }

    /// Evaluates and, if the coupon applies, records one redemption.
    ///
    /// ## Algorithm
    /// 1. Snapshot + evaluate (same as [`CouponPricer::quote`])
    /// 2. Not applied → return the quote untouched, nothing recorded
    /// 3. Applied → `compare_and_increment` keyed on the snapshot's count
    /// 4. Conflict → re-read and start over, up to `max_redeem_retries` times
    /// 5. Still conflicting → full-price quote with `RedemptionContended`,
    ///    nothing recorded
    pub async fn redeem(
        &self,
        code: &str,
        list_cents: i64,
        program_slug: Option<&str>,
    ) -> StoreResult<Quote> {
        self.redeem_in(&context(program_slug), code, list_cents).await
    }

    /// [`CouponPricer::redeem`] in an explicit context.
    pub async fn redeem_in(
        &self,
        ctx: &PricingContext,
        code: &str,
        list_cents: i64,
    ) -> StoreResult<Quote> {
        let mut retries = 0;

        loop {
            let quote = self.quote_in(ctx, Some(code), list_cents).await?;

            let (stored_code, expected) = match (&quote.coupon, quote.evaluation.is_applied()) {
                (Some(snapshot), true) => (snapshot.code.clone(), snapshot.redeemed_count),
                _ => return Ok(quote),
            };

            match self.store.compare_and_increment(&stored_code, expected).await {
                Ok(updated) => {
                    return Ok(Quote {
                        coupon: Some(updated),
                        redeemed: true,
                        ..quote
                    });
                }
                Err(StoreError::Conflict { .. }) if retries < self.max_redeem_retries => {
                    retries += 1;
                    debug!(code = %stored_code, retries, "Retrying redemption");
                }
                Err(StoreError::Conflict { .. }) => {
                    warn!(
                        code = %stored_code,
                        retries,
                        "Redemption contended, charging list price"
                    );
                    return Ok(Quote {
                        evaluation: Evaluation::Ineligible(IneligibleReason::RedemptionContended),
                        ..quote
                    });
                }
                Err(err) => {
                    warn!(code = %stored_code, retries, error = %err, "Redemption failed");
                    return Err(err);
                }
            }
        }
    }
}

fn context(program_slug: Option<&str>) -> PricingContext {
    let ctx = PricingContext::now();
    match program_slug {
        Some(slug) => ctx.for_program(slug),
        None => ctx,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

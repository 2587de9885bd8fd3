//! # Coupon Preview
//!
//! Prices a program or a raw list price with a coupon code and prints the
//! preview payload the checkout front-end would receive.
//!
//! ## Usage
//! ```bash
//! # Preview against a seeded catalog price
//! cargo run -p coupon-store --bin coupon-preview -- \
//!     --seed ./seed.json --code welcome25 --program cpr-ems
//!
//! # Preview against an explicit price
//! cargo run -p coupon-store --bin coupon-preview -- \
//!     --seed ./seed.json --code SAVE50 --price 12500
//!
//! # Record a redemption as the payment hook would
//! cargo run -p coupon-store --bin coupon-preview -- \
//!     --seed ./seed.json --code SAVE50 --price 12500 --redeem
//! ```
//!
//! `COUPON_SEED_FILE`, `COUPON_MAX_REDEEM_RETRIES` and `COUPON_LOG` are read
//! from the environment; `--seed` overrides `COUPON_SEED_FILE`. Logs go to
//! stderr so stdout stays plain JSON.

use std::env;

use coupon_store::{CouponPricer, StoreConfig};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut seed: Option<String> = None;
    let mut code: Option<String> = None;
    let mut program: Option<String> = None;
    let mut price: Option<i64> = None;
    let mut redeem = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" | "-s" => {
                if i + 1 < args.len() {
                    seed = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--code" | "-c" => {
                if i + 1 < args.len() {
                    code = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--program" | "-p" => {
                if i + 1 < args.len() {
                    program = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--price" => {
                if i + 1 < args.len() {
                    price = Some(args[i + 1].parse()?);
                    i += 1;
                }
            }
            "--redeem" => redeem = true,
            "--help" | "-h" => {
                println!("Coupon Preview");
                println!();
                println!("Usage: coupon-preview [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --seed <PATH>      Seed file (overrides COUPON_SEED_FILE)");
                println!("  -c, --code <CODE>      Coupon code to apply");
                println!("  -p, --program <SLUG>   Program slug (catalog price unless --price)");
                println!("      --price <CENTS>    Explicit list price in cents");
                println!("      --redeem           Record a redemption if the coupon applies");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => return Err(format!("Unknown argument: {other}").into()),
        }
        i += 1;
    }

    let mut config = StoreConfig::load()?;
    if let Some(path) = seed {
        config = config.with_seed_file(path);
    }

    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let pricer = CouponPricer::from_config(&config).await?;

    let list_cents = match (price, program.as_deref()) {
        (Some(cents), _) => cents,
        (None, Some(slug)) => pricer.catalog().price(slug)?.cents(),
        (None, None) => return Err("either --program or --price is required".into()),
    };

    let quote = match (redeem, code.as_deref()) {
        (true, Some(code)) => pricer.redeem(code, list_cents, program.as_deref()).await?,
        (true, None) => return Err("--redeem requires --code".into()),
        (false, code) => pricer.quote(code, list_cents, program.as_deref()).await?,
    };

    info!(
        list_cents,
        final_cents = quote.final_cents(),
        redeemed = quote.redeemed,
        "Quote computed"
    );

    let output = json!({
        "list_cents": quote.list_cents,
        "final_cents": quote.final_cents(),
        "redeemed": quote.redeemed,
        "preview": quote.preview(),
        "metadata": quote.metadata(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

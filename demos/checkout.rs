//! Checkout Example
//!
//! This example fills a cart from a fixture, optionally runs the promotional events, and prints
//! the pricing and points summary.
//!
//! Use `-f` to load a cart fixture by name
//! Use `-p` to load a policy file
//! Use `-d` to evaluate on a given date
//! Use `-s` to seed the promotion timers and fire each one once

use std::io;

use anyhow::Result;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use tracing::warn;

use cartwheel::{
    cart::Cart,
    config::PolicyConfig,
    engine::{CartEngine, today},
    fixtures::Fixture,
    observability::init_subscriber,
    summary::{write_stock_report, write_summary},
    utils::ExampleCheckoutArgs,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    init_subscriber(&args.logging)?;

    let config = match &args.policy {
        Some(path) => PolicyConfig::load(path)?,
        None => PolicyConfig::default(),
    };

    let engine = CartEngine::new(config);

    let mut fixture = Fixture::from_set(&args.fixture)?;
    let mut catalog = fixture.take_catalog()?;

    engine.config().check_catalog(&catalog)?;

    let date = args.date.or(fixture.date()).unwrap_or_else(today);

    let mut cart = Cart::new();

    for line in fixture.lines() {
        if line.units() == 0 {
            warn!(product = %line.product_id, quantity = line.quantity, "skipping empty line");

            continue;
        }

        if let Err(err) = cart.add_units(&mut catalog, &line.product_id, line.units()) {
            println!("Could not add {} x{}: {err}", line.product_id, line.units());
        }
    }

    if let Some(seed) = args.seed {
        let mut rng = StdRng::seed_from_u64(seed);
        let schedule = engine.config().schedule;

        println!(
            "Flash sale after {:?}, recommendation after {:?}",
            schedule.flash_sale.initial_delay(&mut rng),
            schedule.recommendation.initial_delay(&mut rng),
        );

        if let Some(event) = engine.start_flash_sale(&mut catalog, &mut rng)? {
            println!("{event}");
        }

        if let Some(event) = engine.start_recommendation(&mut catalog, &cart)? {
            println!("{event}");
        }
    }

    let checkout = engine.checkout(cart.lines(), &catalog, date)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    println!("\nCheckout on {date} ({:?})", date.weekday());

    write_summary(&mut handle, cart.lines(), &catalog, &checkout)?;
    write_stock_report(&mut handle, &engine.stock_report(&catalog))?;

    Ok(())
}

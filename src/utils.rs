//! Utils

use std::path::PathBuf;

use clap::Parser;
use jiff::civil::Date;

use crate::observability::LoggingConfig;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Cart fixture to check out; it names the products fixture it uses
    #[clap(short, long, default_value = "scenario-b")]
    pub fixture: String,

    /// Policy file overriding the default discount and points rules
    #[clap(short, long)]
    pub policy: Option<PathBuf>,

    /// Evaluation date (YYYY-MM-DD); defaults to the fixture's date, then today
    #[clap(short, long)]
    pub date: Option<Date>,

    /// Seed for the promotion timers; no promotions run without one
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Logging
    #[command(flatten)]
    pub logging: LoggingConfig,
}

//! Cart Fixtures

use serde::Deserialize;

use crate::cart::CartLine;

/// Catalog used when a cart fixture doesn't name one.
pub const DEFAULT_CATALOG: &str = "default";

/// Cart fixture file
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Products fixture the cart refers to
    #[serde(default = "default_catalog")]
    pub catalog: String,

    /// Evaluation date for the cart, if it depends on one
    #[serde(default)]
    pub date: Option<jiff::civil::Date>,

    /// Cart lines
    #[serde(default)]
    pub items: Vec<CartLine>,
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

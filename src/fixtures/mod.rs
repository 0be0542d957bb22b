//! Fixtures

use std::{fs, path::PathBuf};

use jiff::civil::Date;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::CartLine,
    catalog::{Catalog, CatalogError},
    fixtures::{carts::CartFixture, products::ProductsFixture},
    products::Product,
};

pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Catalog rejected a product
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog built from the loaded products
    catalog: Option<Catalog<'a>>,

    /// Cart lines, as written in the fixture
    lines: Vec<CartLine>,

    /// Evaluation date named by the cart fixture
    date: Option<Date>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: None,
            lines: Vec::new(),
            date: None,
        }
    }

    /// Load products from a YAML fixture file, appending them to the catalog.
    ///
    /// The first product loaded fixes the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a product has a different
    /// currency or a duplicate id.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for product_fixture in fixture.products {
            // Parse to get currency first (before creating Product)
            let (_minor_units, currency) = products::parse_price(&product_fixture.price)?;

            let product: Product<'a> = product_fixture.try_into()?;

            self.catalog
                .get_or_insert_with(|| Catalog::new(currency))
                .insert(product)?;
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file, replacing any loaded before.
    ///
    /// Lines are kept as written; stale ids and bad quantities are left for the engine to skip.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture = self.read_cart(name)?;

        self.lines = fixture.items;
        self.date = fixture.date;

        Ok(self)
    }

    /// Load a cart fixture together with the products fixture it names.
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        let cart = fixture.read_cart(name)?;

        fixture.load_products(&cart.catalog)?;
        fixture.lines = cart.items;
        fixture.date = cart.date;

        Ok(fixture)
    }

    fn read_cart(&self, name: &str) -> Result<CartFixture, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    /// Get a product by its catalog id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.catalog
            .as_ref()
            .and_then(|catalog| catalog.get_product_by_id(&id.into()))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// The loaded catalog
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn catalog(&self) -> Result<&Catalog<'a>, FixtureError> {
        self.catalog.as_ref().ok_or(FixtureError::NoCurrency)
    }

    /// Take the loaded catalog, leaving the fixture without one.
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn take_catalog(&mut self) -> Result<Catalog<'a>, FixtureError> {
        self.catalog.take().ok_or(FixtureError::NoCurrency)
    }

    /// The loaded cart lines
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// The date the cart fixture asks to be evaluated on
    pub fn date(&self) -> Option<Date> {
        self.date
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.catalog().map(Catalog::currency)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use rusty_money::iso::KRW;
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::catalog::{KEYBOARD, LAPTOP_POUCH};

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    #[test]
    fn fixture_loads_default_products() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_products("default")?;

        let catalog = fixture.catalog()?;

        assert_eq!(catalog.len(), 5);
        assert_eq!(fixture.currency()?, KRW);

        let keyboard = fixture.product(KEYBOARD)?;

        assert_eq!(keyboard.price().to_minor_units(), 10_000);
        assert_eq!(keyboard.stock(), 50);
        assert!(fixture.product(LAPTOP_POUCH)?.is_sold_out());

        Ok(())
    }

    #[test]
    fn default_products_match_canonical_catalog() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_products("default")?;

        let canonical = Catalog::canonical();

        let loaded: Vec<(&str, i64, u32)> = fixture
            .catalog()?
            .iter()
            .map(|p| (p.id().as_str(), p.price().to_minor_units(), p.stock()))
            .collect();

        let expected: Vec<(&str, i64, u32)> = canonical
            .iter()
            .map(|p| (p.id().as_str(), p.price().to_minor_units(), p.stock()))
            .collect();

        assert_eq!(loaded, expected);

        Ok(())
    }

    #[test]
    fn fixture_from_set_loads_cart_and_named_catalog() -> TestResult {
        let fixture = Fixture::from_set("scenario-a")?;

        assert_eq!(fixture.lines(), &[CartLine::new(KEYBOARD, 10)]);
        assert_eq!(fixture.catalog()?.len(), 5);
        assert_eq!(fixture.date(), Some(jiff::civil::date(2024, 10, 2)));

        Ok(())
    }

    #[test]
    fn fixture_product_not_found_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.product("nonexistent");

        assert!(matches!(result, Err(FixtureError::ProductNotFound(_))));
    }

    #[test]
    fn fixture_no_currency_returns_error() {
        let fixture = Fixture::new();
        let result = fixture.currency();

        assert!(matches!(result, Err(FixtureError::NoCurrency)));
    }

    #[test]
    fn fixture_load_products_rejects_currency_mismatch() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "krw_set",
            "products:\n  - id: a\n    name: Apple\n    price: 1000 KRW\n",
        )?;

        write_fixture(
            dir.path(),
            "products",
            "gbp_set",
            "products:\n  - id: b\n    name: Banana\n    price: 1.00 GBP\n",
        )?;

        let mut fixture = Fixture::with_base_path(dir.path());

        fixture.load_products("krw_set")?;

        let result = fixture.load_products("gbp_set");

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::CurrencyMismatch(..)))
        ));

        Ok(())
    }

    #[test]
    fn fixture_load_products_rejects_duplicate_ids() -> TestResult {
        let dir = TempDir::new()?;

        write_fixture(
            dir.path(),
            "products",
            "dupes",
            "products:\n  - id: a\n    name: Apple\n    price: 1000 KRW\n  - id: a\n    name: Again\n    price: 2000 KRW\n",
        )?;

        let result = Fixture::with_base_path(dir.path()).load_products("dupes").map(|_| ());

        assert!(matches!(
            result,
            Err(FixtureError::Catalog(CatalogError::DuplicateProduct(_)))
        ));

        Ok(())
    }

    #[test]
    fn fixture_missing_file_is_io_error() {
        let result = Fixture::with_base_path("./does-not-exist").load_cart("nothing").map(|_| ());

        assert!(matches!(result, Err(FixtureError::Io(_))));
    }

    #[test]
    fn take_catalog_leaves_fixture_empty() -> TestResult {
        let mut fixture = Fixture::new();

        fixture.load_products("default")?;

        let catalog = fixture.take_catalog()?;

        assert_eq!(catalog.len(), 5);
        assert!(matches!(fixture.catalog(), Err(FixtureError::NoCurrency)));

        Ok(())
    }

    #[test]
    fn fixture_default_matches_new() {
        let fixture = Fixture::default();

        assert_eq!(fixture.base_path, PathBuf::from("./fixtures"));
        assert!(fixture.lines.is_empty());
        assert!(fixture.catalog.is_none());
    }
}

//! Catalog
//!
//! The product catalog provider: products stored in a [`SlotMap`] and looked up by their stable
//! [`ProductId`]. Pricing reads it; the cart and the promotion events mutate it.

use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, KRW},
};
use slotmap::SlotMap;
use thiserror::Error;

use crate::products::{Product, ProductId, ProductKey};

pub mod stock;

/// Keyboard product id
pub const KEYBOARD: &str = "p1";

/// Mouse product id
pub const MOUSE: &str = "p2";

/// Monitor arm product id
pub const MONITOR_ARM: &str = "p3";

/// Laptop pouch product id
pub const LAPTOP_POUCH: &str = "p4";

/// Speaker product id
pub const SPEAKER: &str = "p5";

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A product's currency differs from the catalog currency (product, product currency, catalog currency).
    #[error("Product {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// Two products share an id.
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(ProductId),
}

/// Product catalog
#[derive(Debug, Clone)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    keys: FxHashMap<ProductId, ProductKey>,
    currency: &'static Currency,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            currency,
        }
    }

    /// Create a catalog from a list of products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a currency mismatch or a duplicate id.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(currency);

        for product in products {
            catalog.insert(product)?;
        }

        Ok(catalog)
    }

    /// The canonical five-product catalog, priced in KRW.
    #[must_use]
    pub fn canonical() -> Self {
        let entries = [
            (KEYBOARD, "Bug-free keyboard", 10_000, 50),
            (MOUSE, "Productivity mouse", 20_000, 30),
            (MONITOR_ARM, "Posture monitor arm", 30_000, 20),
            (LAPTOP_POUCH, "Laptop pouch", 15_000, 0),
            (SPEAKER, "Lo-fi speaker", 25_000, 10),
        ];

        let mut catalog = Self::new(KRW);

        for (id, name, price, stock) in entries {
            catalog.push(Product::new(id, name, Money::from_minor(price, KRW), stock));
        }

        catalog
    }

    /// Add a product to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] on a currency mismatch or a duplicate id.
    pub fn insert(&mut self, product: Product<'a>) -> Result<(), CatalogError> {
        let product_currency = product.price().currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id().clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if self.keys.contains_key(product.id()) {
            return Err(CatalogError::DuplicateProduct(product.id().clone()));
        }

        self.push(product);

        Ok(())
    }

    fn push(&mut self, product: Product<'a>) {
        let id = product.id().clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);
    }

    /// Look up a product by its catalog id.
    pub fn get_product_by_id(&self, id: &ProductId) -> Option<&Product<'a>> {
        self.keys.get(id).and_then(|key| self.products.get(*key))
    }

    /// Look up a product by its catalog id, mutably.
    pub fn get_product_by_id_mut(&mut self, id: &ProductId) -> Option<&mut Product<'a>> {
        let key = *self.keys.get(id)?;

        self.products.get_mut(key)
    }

    /// Iterate over products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product<'a>> {
        // Products are never removed, so slot order is insertion order.
        self.products.values()
    }

    /// Iterate over products in catalog order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Product<'a>> {
        self.products.values_mut()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every product is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

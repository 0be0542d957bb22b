//! Cart
//!
//! The cart store the UI keeps in sync with what the shopper sees. Mutations move stock in and
//! out of the catalog; pricing only ever sees a snapshot of the lines.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    products::{ProductError, ProductId},
};

/// Errors raised by cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product id is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Stock could not be moved for the product.
    #[error("Stock error for product {product}: {source}")]
    Stock {
        /// Product id
        product: ProductId,

        /// Underlying stock error
        #[source]
        source: ProductError,
    },
}

/// A product and quantity, as supplied by the caller.
///
/// Quantities are signed so that caller mistakes can be represented; anything below one unit
/// counts as an empty line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CartLine {
    /// Product id
    #[serde(rename = "product")]
    pub product_id: ProductId,

    /// Quantity
    pub quantity: i64,
}

impl CartLine {
    /// Create a cart line.
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// Quantity as a unit count; negative quantities count as zero.
    pub fn units(&self) -> u32 {
        u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX)
    }
}

/// Cart
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    last_added: Option<ProductId>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of a product, taking it out of stock.
    ///
    /// Returns the new line quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product is unknown or sold out.
    pub fn add(&mut self, catalog: &mut Catalog<'_>, product: &ProductId) -> Result<u32, CartError> {
        let quantity = self.adjust(catalog, product, 1)?;

        self.last_added = Some(product.clone());

        Ok(quantity)
    }

    /// Add `quantity` units of a product at once, taking them out of stock.
    ///
    /// Either every unit is added or none is. Returns the new line quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product is unknown or lacks the stock for every unit.
    pub fn add_units(
        &mut self,
        catalog: &mut Catalog<'_>,
        product: &ProductId,
        quantity: u32,
    ) -> Result<u32, CartError> {
        if quantity == 0 {
            return Ok(self.quantity_of(product));
        }

        let quantity = self.adjust(catalog, product, i64::from(quantity))?;

        self.last_added = Some(product.clone());

        Ok(quantity)
    }

    /// Change a line's quantity by `delta` units, moving stock to match.
    ///
    /// A line that reaches zero is removed. Returns the new line quantity.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product is unknown, has no line to reduce, or lacks the stock
    /// for an increase. The cart and catalog are unchanged on error.
    pub fn change_quantity(
        &mut self,
        catalog: &mut Catalog<'_>,
        product: &ProductId,
        delta: i64,
    ) -> Result<u32, CartError> {
        let current = self.quantity_of(product);

        if current == 0 && delta < 0 {
            return Err(CartError::NotInCart(product.clone()));
        }

        self.adjust(catalog, product, delta)
    }

    /// Remove a line, returning all of its units to stock.
    ///
    /// Returns the number of units released.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the product has no line in the cart.
    pub fn remove(
        &mut self,
        catalog: &mut Catalog<'_>,
        product: &ProductId,
    ) -> Result<u32, CartError> {
        let quantity = self.quantity_of(product);

        if quantity == 0 {
            return Err(CartError::NotInCart(product.clone()));
        }

        self.adjust(catalog, product, -i64::from(quantity))?;

        Ok(quantity)
    }

    fn adjust(
        &mut self,
        catalog: &mut Catalog<'_>,
        product: &ProductId,
        delta: i64,
    ) -> Result<u32, CartError> {
        let stock_error = |source| CartError::Stock {
            product: product.clone(),
            source,
        };

        let current = self.quantity_of(product);

        let entry = catalog
            .get_product_by_id_mut(product)
            .ok_or_else(|| CartError::UnknownProduct(product.clone()))?;

        let units = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);

        let next = if delta >= 0 {
            entry.reserve(units).map_err(stock_error)?;
            current.saturating_add(units)
        } else {
            // Never release more than the line holds.
            let units = units.min(current);
            entry.release(units).map_err(stock_error)?;
            current - units
        };

        debug!(%product, from = current, to = next, "cart quantity changed");

        self.set_quantity(product, next);

        Ok(next)
    }

    fn set_quantity(&mut self, product: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.lines.retain(|line| &line.product_id != product);

            return;
        }

        match self
            .lines
            .iter_mut()
            .find(|line| &line.product_id == product)
        {
            Some(line) => line.quantity = i64::from(quantity),
            None => self
                .lines
                .push(CartLine::new(product.clone(), i64::from(quantity))),
        }
    }

    /// Units of a product in the cart.
    pub fn quantity_of(&self, product: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| &line.product_id == product)
            .map_or(0, CartLine::units)
    }

    /// Whether the cart has a line for the product.
    pub fn contains(&self, product: &ProductId) -> bool {
        self.quantity_of(product) > 0
    }

    /// The lines, in the order products were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// An owned copy of the lines to hand to the pricing engine.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// The product most recently added with [`Cart::add`].
    pub fn last_added(&self) -> Option<&ProductId> {
        self.last_added.as_ref()
    }

    /// Units across every line.
    pub fn total_quantity(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.units()))
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

//! Products

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use slotmap::new_key_type;
use thiserror::Error;

use crate::discounts::{DiscountError, discounted_minor};

new_key_type! {
    /// Catalog slot key
    pub(crate) struct ProductKey;
}

/// Stable catalog identifier for a product (e.g. `p1`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new product id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors raised when moving stock in or out of a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProductError {
    /// Not enough stock remains to reserve the requested units.
    #[error("requested {requested} units but only {available} remain")]
    InsufficientStock {
        /// Units requested
        requested: u32,
        /// Units remaining
        available: u32,
    },

    /// Releasing stock would overflow the stock counter.
    #[error("stock counter overflow")]
    StockOverflow,
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    id: ProductId,
    name: String,
    price: Money<'a, Currency>,
    original_price: Money<'a, Currency>,
    stock: u32,
    on_flash_sale: bool,
    on_recommended_sale: bool,
}

impl<'a> Product<'a> {
    /// Create a product at its reference price with no active promotions.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money<'a, Currency>,
        stock: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            original_price: price,
            stock,
            on_flash_sale: false,
            on_recommended_sale: false,
        }
    }

    /// Catalog identifier
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current sellable unit price, including any active promotion.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }

    /// Reference price set when the product was loaded.
    pub fn original_price(&self) -> &Money<'a, Currency> {
        &self.original_price
    }

    /// Remaining sellable units.
    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Whether a flash sale is active.
    pub fn on_flash_sale(&self) -> bool {
        self.on_flash_sale
    }

    /// Whether a recommendation discount is active.
    pub fn on_recommended_sale(&self) -> bool {
        self.on_recommended_sale
    }

    /// Whether both promotions are active at the same time.
    pub fn on_combo_sale(&self) -> bool {
        self.on_flash_sale && self.on_recommended_sale
    }

    /// Whether the product is out of stock.
    pub fn is_sold_out(&self) -> bool {
        self.stock == 0
    }

    /// Take `quantity` units out of stock.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InsufficientStock`] if fewer than `quantity` units remain; stock is
    /// left untouched in that case.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), ProductError> {
        self.stock = self
            .stock
            .checked_sub(quantity)
            .ok_or(ProductError::InsufficientStock {
                requested: quantity,
                available: self.stock,
            })?;

        Ok(())
    }

    /// Put `quantity` units back into stock.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::StockOverflow`] if the stock counter would overflow.
    pub fn release(&mut self, quantity: u32) -> Result<(), ProductError> {
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or(ProductError::StockOverflow)?;

        Ok(())
    }

    /// Start a flash sale: `rate` comes off the current unit price.
    ///
    /// A product already recommended ends up at the compounded combo price, whichever promotion
    /// started first.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discounted price cannot be represented.
    pub fn apply_flash_sale(&mut self, rate: &Percentage) -> Result<(), DiscountError> {
        if self.on_flash_sale {
            return Ok(());
        }

        let minor = discounted_minor(rate, self.price.to_minor_units())?;

        self.price = Money::from_minor(minor, self.price.currency());
        self.on_flash_sale = true;

        Ok(())
    }

    /// Start a recommendation discount on top of the current unit price.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the discounted price cannot be represented.
    pub fn apply_recommendation(&mut self, rate: &Percentage) -> Result<(), DiscountError> {
        let minor = discounted_minor(rate, self.price.to_minor_units())?;

        self.price = Money::from_minor(minor, self.price.currency());
        self.on_recommended_sale = true;

        Ok(())
    }

    /// End all promotions and restore the original price.
    pub fn clear_promotions(&mut self) {
        self.price = self.original_price;
        self.on_flash_sale = false;
        self.on_recommended_sale = false;
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use super::*;

    fn keyboard<'a>() -> Product<'a> {
        Product::new("p1", "Keyboard", Money::from_minor(10_000, KRW), 3)
    }

    fn percent(value: i64, scale: u32) -> Percentage {
        Percentage::from(Decimal::new(value, scale))
    }

    #[test]
    fn new_product_starts_at_original_price() {
        let product = keyboard();

        assert_eq!(product.price(), product.original_price());
        assert!(!product.on_flash_sale());
        assert!(!product.on_recommended_sale());
    }

    #[test]
    fn reserve_takes_stock() -> TestResult {
        let mut product = keyboard();

        product.reserve(2)?;

        assert_eq!(product.stock(), 1);

        Ok(())
    }

    #[test]
    fn reserve_rejects_more_than_available() {
        let mut product = keyboard();

        let result = product.reserve(4);

        assert_eq!(
            result,
            Err(ProductError::InsufficientStock {
                requested: 4,
                available: 3
            })
        );
        assert_eq!(product.stock(), 3);
    }

    #[test]
    fn release_returns_stock() -> TestResult {
        let mut product = keyboard();

        product.reserve(3)?;
        assert!(product.is_sold_out());

        product.release(2)?;
        assert_eq!(product.stock(), 2);

        Ok(())
    }

    #[test]
    fn flash_sale_discounts_from_original_price() -> TestResult {
        let mut product = keyboard();

        product.apply_flash_sale(&percent(20, 2))?;

        assert_eq!(product.price(), &Money::from_minor(8_000, KRW));
        assert!(product.on_flash_sale());

        Ok(())
    }

    #[test]
    fn recommendation_compounds_on_current_price() -> TestResult {
        let mut product = keyboard();

        product.apply_flash_sale(&percent(20, 2))?;
        product.apply_recommendation(&percent(5, 2))?;

        assert_eq!(product.price(), &Money::from_minor(7_600, KRW));
        assert!(product.on_combo_sale());

        Ok(())
    }

    #[test]
    fn flash_sale_compounds_on_recommended_price() -> TestResult {
        let mut product = keyboard();

        product.apply_recommendation(&percent(5, 2))?;
        product.apply_flash_sale(&percent(20, 2))?;

        assert_eq!(product.price(), &Money::from_minor(7_600, KRW));
        assert!(product.on_combo_sale());

        Ok(())
    }

    #[test]
    fn repeated_flash_sale_does_not_discount_twice() -> TestResult {
        let mut product = keyboard();

        product.apply_flash_sale(&percent(20, 2))?;
        product.apply_flash_sale(&percent(20, 2))?;

        assert_eq!(product.price(), &Money::from_minor(8_000, KRW));

        Ok(())
    }

    #[test]
    fn clear_promotions_restores_original_price() -> TestResult {
        let mut product = keyboard();

        product.apply_recommendation(&percent(5, 2))?;
        product.clear_promotions();

        assert_eq!(product.price(), &Money::from_minor(10_000, KRW));
        assert!(!product.on_recommended_sale());

        Ok(())
    }

    #[test]
    fn product_id_displays_raw_id() {
        assert_eq!(ProductId::from("p4").to_string(), "p4");
    }
}

//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId},
};

/// Products fixture file
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Products, in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product from YAML fixtures
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Catalog id (e.g. "p1")
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Price string (e.g. "10000 KRW" or "2.50 GBP")
    pub price: String,

    /// Units in stock
    #[serde(default)]
    pub stock: u32,
}

impl<'a> TryFrom<ProductFixture> for Product<'a> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            fixture.id,
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.stock,
        ))
    }
}

/// Parse a price string such as `"10000 KRW"` into minor units and currency.
///
/// # Errors
///
/// Returns an error if the amount is malformed, has more decimal places than the currency
/// allows, or the currency code is unknown.
pub fn parse_price(price: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = price.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(price.to_string()));
    };

    let currency = iso::find(&code.to_uppercase())
        .ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount: Decimal = amount
        .replace(',', "")
        .parse()
        .map_err(|_err| FixtureError::InvalidPrice(price.to_string()))?;

    let minor = amount
        .checked_mul(Decimal::from(10_i64.pow(currency.exponent)))
        .filter(|minor| minor.fract().is_zero())
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(price.to_string()))?;

    Ok((minor, currency))
}

/// Parse a rate written as a percentage (`"10%"`) or a fraction (`"0.1"`).
///
/// # Errors
///
/// Returns an error if the value is malformed or outside 0% to 100%.
pub fn parse_percentage(value: &str) -> Result<decimal_percentage::Percentage, FixtureError> {
    let invalid = || FixtureError::InvalidPercentage(value.to_string());

    let trimmed = value.trim();

    let fraction = match trimmed.strip_suffix('%') {
        Some(points) => {
            points
                .trim()
                .parse::<Decimal>()
                .map_err(|_err| invalid())?
                / Decimal::ONE_HUNDRED
        }
        None => trimmed.parse::<Decimal>().map_err(|_err| invalid())?,
    };

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(invalid());
    }

    Ok(decimal_percentage::Percentage::from(fraction))
}

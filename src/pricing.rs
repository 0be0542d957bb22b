//! Prices
//!
//! Resolves a cart snapshot against the catalog and totals it.

use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::CartLine,
    catalog::Catalog,
    products::{Product, ProductId},
};

/// Errors that can occur while calculating total price.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total does not fit in minor units.
    #[error("line total overflowed for product {0}")]
    Overflow(ProductId),

    /// The sum of the line totals does not fit in minor units.
    #[error("subtotal overflowed")]
    SubtotalOverflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A cart line joined with its current catalog product.
#[derive(Debug, Clone)]
pub struct PricedLine<'c, 'a> {
    product: &'c Product<'a>,
    quantity: u32,
    line_total: Money<'a, Currency>,
}

impl<'c, 'a> PricedLine<'c, 'a> {
    /// The catalog product
    pub fn product(&self) -> &'c Product<'a> {
        self.product
    }

    /// Units on the line
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Current unit price times quantity
    pub fn line_total(&self) -> &Money<'a, Currency> {
        &self.line_total
    }
}

/// Current unit price times quantity.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] if the total does not fit in minor units.
pub fn line_total<'a>(
    product: &Product<'a>,
    quantity: u32,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    let minor = product
        .price()
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or_else(|| TotalPriceError::Overflow(product.id().clone()))?;

    Ok(Money::from_minor(minor, product.price().currency()))
}

/// Join cart lines with the catalog, taking a fresh read of every product.
///
/// Lines for unknown products and lines with no units are skipped. Repeated product ids are
/// merged into the first line for that product.
///
/// # Errors
///
/// Returns a [`TotalPriceError`] if a line total overflows.
pub fn resolve_lines<'c, 'a>(
    lines: &[CartLine],
    catalog: &'c Catalog<'a>,
) -> Result<SmallVec<[PricedLine<'c, 'a>; 8]>, TotalPriceError> {
    let mut merged: SmallVec<[(&'c Product<'a>, u32); 8]> = SmallVec::new();

    for line in lines {
        let quantity = line.units();

        if quantity == 0 {
            continue;
        }

        let Some(product) = catalog.get_product_by_id(&line.product_id) else {
            warn!(product = %line.product_id, "skipping cart line for unknown product");

            continue;
        };

        match merged.iter_mut().find(|(p, _)| p.id() == product.id()) {
            Some((_, existing)) => *existing = existing.saturating_add(quantity),
            None => merged.push((product, quantity)),
        }
    }

    merged
        .into_iter()
        .map(|(product, quantity)| -> Result<PricedLine<'c, 'a>, TotalPriceError> {
            Ok(PricedLine {
                product,
                quantity,
                line_total: line_total(product, quantity)?,
            })
        })
        .collect()
}

/// Sum of line totals.
///
/// # Errors
///
/// Returns a [`TotalPriceError`] on a currency mismatch or if the sum overflows minor units.
pub fn subtotal<'a>(
    lines: &[PricedLine<'_, 'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, TotalPriceError> {
    lines
        .iter()
        .try_fold(0i64, |acc, line| {
            acc.checked_add(line.line_total().to_minor_units())
        })
        .ok_or(TotalPriceError::SubtotalOverflow)?;

    let total = lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(*line.line_total())
        })?;

    Ok(total)
}

/// Units across every line.
pub fn total_quantity(lines: &[PricedLine<'_, '_>]) -> u32 {
    lines
        .iter()
        .fold(0, |acc, line| acc.saturating_add(line.quantity()))
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rust_decimal::Decimal;
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::catalog::{KEYBOARD, MOUSE};

    use super::*;

    #[test]
    fn resolve_lines_prices_each_line() -> TestResult {
        let catalog = Catalog::canonical();
        let lines = [CartLine::new(KEYBOARD, 2), CartLine::new(MOUSE, 3)];

        let priced = resolve_lines(&lines, &catalog)?;

        assert_eq!(priced.len(), 2);
        assert_eq!(subtotal(&priced, KRW)?, Money::from_minor(80_000, KRW));
        assert_eq!(total_quantity(&priced), 5);

        Ok(())
    }

    #[test]
    fn resolve_lines_skips_unknown_products_and_empty_lines() -> TestResult {
        let catalog = Catalog::canonical();
        let lines = [
            CartLine::new("p99", 4),
            CartLine::new(KEYBOARD, 0),
            CartLine::new(MOUSE, -2),
            CartLine::new(MOUSE, 1),
        ];

        let priced = resolve_lines(&lines, &catalog)?;

        assert_eq!(priced.len(), 1);
        assert_eq!(subtotal(&priced, KRW)?, Money::from_minor(20_000, KRW));

        Ok(())
    }

    #[test]
    fn resolve_lines_merges_repeated_products() -> TestResult {
        let catalog = Catalog::canonical();
        let lines = [CartLine::new(KEYBOARD, 6), CartLine::new(KEYBOARD, 4)];

        let priced = resolve_lines(&lines, &catalog)?;

        assert_eq!(priced.len(), 1);
        assert_eq!(priced.first().map(PricedLine::quantity), Some(10));

        Ok(())
    }

    #[test]
    fn subtotal_rejects_overflow() -> TestResult {
        let mut catalog = Catalog::new(KRW);

        for id in ["a", "b"] {
            let price = Money::from_minor(i64::MAX / 2 + 1, KRW);

            catalog.insert(Product::new(id, "Gold bar", price, 1))?;
        }

        let priced = resolve_lines(&[CartLine::new("a", 1), CartLine::new("b", 1)], &catalog)?;

        assert_eq!(subtotal(&priced, KRW), Err(TotalPriceError::SubtotalOverflow));

        Ok(())
    }

    #[test]
    fn subtotal_of_nothing_is_zero() -> TestResult {
        assert_eq!(subtotal(&[], KRW)?, Money::from_minor(0, KRW));

        Ok(())
    }

    #[test]
    fn line_total_uses_current_price() -> TestResult {
        let mut catalog = Catalog::canonical();
        let keyboard = catalog
            .get_product_by_id_mut(&KEYBOARD.into())
            .ok_or("expected keyboard")?;

        keyboard.apply_flash_sale(&Percentage::from(Decimal::new(20, 2)))?;

        assert_eq!(line_total(keyboard, 3)?, Money::from_minor(24_000, KRW));

        Ok(())
    }
}

//! Promotions
//!
//! Timed promotional events that change catalog prices. Activation mutates the chosen product
//! and hands back a [`PromotionEvent`] for the caller to present; nothing here talks to the
//! shopper directly.

use std::fmt;

use decimal_percentage::Percentage;
use rand::{Rng, seq::SliceRandom};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    discounts::{DiscountError, percent_points, rules::EventRates},
    products::{Product, ProductId},
};

pub mod schedule;

pub use schedule::{PromotionSchedule, PromotionTimer};

/// Errors raised while starting or ending a promotion.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// The product id is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The promotional price could not be calculated.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Something the shopper should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionEvent<'a> {
    /// A flash sale started on a product.
    FlashSale {
        /// Product id
        product: ProductId,

        /// Product display name
        name: String,

        /// Rate taken off the original price
        rate: Percentage,

        /// New unit price
        price: Money<'a, Currency>,
    },

    /// A product is being recommended at a discount.
    Recommendation {
        /// Product id
        product: ProductId,

        /// Product display name
        name: String,

        /// Rate taken off the current price
        rate: Percentage,

        /// New unit price
        price: Money<'a, Currency>,
    },

    /// A product's promotions ended and its price was restored.
    Ended {
        /// Product id
        product: ProductId,

        /// Product display name
        name: String,
    },
}

impl PromotionEvent<'_> {
    /// The product the event is about.
    pub fn product(&self) -> &ProductId {
        match self {
            PromotionEvent::FlashSale { product, .. }
            | PromotionEvent::Recommendation { product, .. }
            | PromotionEvent::Ended { product, .. } => product,
        }
    }
}

impl fmt::Display for PromotionEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromotionEvent::FlashSale { name, rate, .. } => {
                write!(f, "Flash sale! {name} is {}% off", percent_points(rate))
            }
            PromotionEvent::Recommendation { name, rate, .. } => write!(
                f,
                "How about {name}? Buy it now for an extra {}% off",
                percent_points(rate)
            ),
            PromotionEvent::Ended { name, .. } => write!(f, "Promotions on {name} have ended"),
        }
    }
}

/// Start a flash sale on a random product that is in stock and not already on flash sale.
///
/// Returns `None` when no product is eligible.
///
/// # Errors
///
/// Returns a [`PromotionError`] if the sale price cannot be calculated.
pub fn start_flash_sale<'a, R: Rng + ?Sized>(
    catalog: &mut Catalog<'a>,
    rng: &mut R,
    rates: &EventRates,
) -> Result<Option<PromotionEvent<'a>>, PromotionError> {
    let eligible: SmallVec<[ProductId; 8]> = catalog
        .iter()
        .filter(|product| !product.is_sold_out() && !product.on_flash_sale())
        .map(|product| product.id().clone())
        .collect();

    let Some(id) = eligible.choose(rng) else {
        debug!("no product eligible for a flash sale");

        return Ok(None);
    };

    let product = product_mut(catalog, id)?;

    product.apply_flash_sale(&rates.flash)?;

    debug!(product = %id, price = product.price().to_minor_units(), "flash sale started");

    Ok(Some(PromotionEvent::FlashSale {
        product: id.clone(),
        name: product.name().to_string(),
        rate: rates.flash,
        price: *product.price(),
    }))
}

/// Recommend the first product, in catalog order, that is in stock, not already recommended and
/// not the product most recently added to the cart.
///
/// Nothing is recommended until something has been added.
///
/// # Errors
///
/// Returns a [`PromotionError`] if the recommended price cannot be calculated.
pub fn start_recommendation<'a>(
    catalog: &mut Catalog<'a>,
    last_added: Option<&ProductId>,
    rates: &EventRates,
) -> Result<Option<PromotionEvent<'a>>, PromotionError> {
    let Some(last_added) = last_added else {
        return Ok(None);
    };

    let Some(id) = catalog
        .iter()
        .find(|product| {
            product.id() != last_added && !product.is_sold_out() && !product.on_recommended_sale()
        })
        .map(|product| product.id().clone())
    else {
        debug!(%last_added, "no product eligible for a recommendation");

        return Ok(None);
    };

    let product = product_mut(catalog, &id)?;

    product.apply_recommendation(&rates.recommend)?;

    debug!(product = %id, price = product.price().to_minor_units(), "recommendation started");

    Ok(Some(PromotionEvent::Recommendation {
        name: product.name().to_string(),
        rate: rates.recommend,
        price: *product.price(),
        product: id,
    }))
}

/// Restore a product's original price and clear its promotions.
///
/// # Errors
///
/// Returns [`PromotionError::UnknownProduct`] if the id is not in the catalog.
pub fn end_promotion<'a>(
    catalog: &mut Catalog<'a>,
    id: &ProductId,
) -> Result<PromotionEvent<'a>, PromotionError> {
    let product = product_mut(catalog, id)?;

    product.clear_promotions();

    Ok(ended(product))
}

/// End every active promotion in the catalog.
///
/// Returns one event per product whose promotions ended.
pub fn end_promotions<'a>(catalog: &mut Catalog<'a>) -> Vec<PromotionEvent<'a>> {
    catalog
        .iter_mut()
        .filter(|product| product.on_flash_sale() || product.on_recommended_sale())
        .map(|product| {
            product.clear_promotions();

            ended(product)
        })
        .collect()
}

fn ended<'a>(product: &Product<'_>) -> PromotionEvent<'a> {
    PromotionEvent::Ended {
        product: product.id().clone(),
        name: product.name().to_string(),
    }
}

fn product_mut<'c, 'a>(
    catalog: &'c mut Catalog<'a>,
    id: &ProductId,
) -> Result<&'c mut Product<'a>, PromotionError> {
    catalog
        .get_product_by_id_mut(id)
        .ok_or_else(|| PromotionError::UnknownProduct(id.clone()))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::catalog::{KEYBOARD, LAPTOP_POUCH, MOUSE};

    use super::*;

    #[test]
    fn flash_sale_never_picks_sold_out_products() -> TestResult {
        let rates = EventRates::default();

        for seed in 0..32 {
            let mut catalog = Catalog::canonical();
            let mut rng = StdRng::seed_from_u64(seed);

            let event = start_flash_sale(&mut catalog, &mut rng, &rates)?
                .ok_or("expected a flash sale")?;

            assert_ne!(event.product().as_str(), LAPTOP_POUCH);

            let product = catalog
                .get_product_by_id(event.product())
                .ok_or("expected product")?;

            assert!(product.on_flash_sale());
            assert_eq!(
                product.price().to_minor_units() * 5,
                product.original_price().to_minor_units() * 4
            );
        }

        Ok(())
    }

    #[test]
    fn flash_sale_skips_products_already_on_sale() -> TestResult {
        let mut catalog = Catalog::canonical();
        let mut rng = StdRng::seed_from_u64(7);
        let rates = EventRates::default();

        let mut started = Vec::new();

        while let Some(event) = start_flash_sale(&mut catalog, &mut rng, &rates)? {
            started.push(event.product().clone());
        }

        started.sort();

        assert_eq!(started.len(), 4);
        assert!(started.windows(2).all(|pair| pair.first() != pair.get(1)));

        Ok(())
    }

    #[test]
    fn recommendation_requires_last_added() -> TestResult {
        let mut catalog = Catalog::canonical();

        let event = start_recommendation(&mut catalog, None, &EventRates::default())?;

        assert_eq!(event, None);

        Ok(())
    }

    #[test]
    fn recommendation_skips_last_added_product() -> TestResult {
        let mut catalog = Catalog::canonical();

        let event =
            start_recommendation(&mut catalog, Some(&KEYBOARD.into()), &EventRates::default())?
                .ok_or("expected a recommendation")?;

        assert_eq!(
            event,
            PromotionEvent::Recommendation {
                product: MOUSE.into(),
                name: "Productivity mouse".to_string(),
                rate: EventRates::default().recommend,
                price: Money::from_minor(19_000, KRW),
            }
        );
        assert_eq!(
            event.to_string(),
            "How about Productivity mouse? Buy it now for an extra 5% off"
        );

        Ok(())
    }

    #[test]
    fn recommendation_compounds_on_flash_sale_price() -> TestResult {
        let mut catalog = Catalog::canonical();
        let rates = EventRates::default();

        catalog
            .get_product_by_id_mut(&MOUSE.into())
            .ok_or("expected mouse")?
            .apply_flash_sale(&rates.flash)?;

        start_recommendation(&mut catalog, Some(&KEYBOARD.into()), &rates)?;

        let mouse = catalog
            .get_product_by_id(&MOUSE.into())
            .ok_or("expected mouse")?;

        assert!(mouse.on_combo_sale());
        assert_eq!(mouse.price(), &Money::from_minor(15_200, KRW));

        Ok(())
    }

    #[test]
    fn flash_sale_after_recommendation_reaches_combo_price() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        let mut rng = StdRng::seed_from_u64(3);
        let rates = EventRates::default();

        catalog.insert(Product::new("a", "Desk lamp", Money::from_minor(10_000, KRW), 5))?;

        start_recommendation(&mut catalog, Some(&"b".into()), &rates)?
            .ok_or("expected a recommendation")?;

        let event = start_flash_sale(&mut catalog, &mut rng, &rates)?
            .ok_or("expected a flash sale")?;

        // 10,000 * 0.95 * 0.8
        assert_eq!(
            event,
            PromotionEvent::FlashSale {
                product: "a".into(),
                name: "Desk lamp".to_string(),
                rate: rates.flash,
                price: Money::from_minor(7_600, KRW),
            }
        );

        let lamp = catalog.get_product_by_id(&"a".into()).ok_or("expected lamp")?;

        assert!(lamp.on_combo_sale());

        Ok(())
    }

    #[test]
    fn end_promotions_restores_prices() -> TestResult {
        let mut catalog = Catalog::canonical();
        let mut rng = StdRng::seed_from_u64(1);
        let rates = EventRates::default();

        start_flash_sale(&mut catalog, &mut rng, &rates)?;
        start_recommendation(&mut catalog, Some(&KEYBOARD.into()), &rates)?;

        let ended = end_promotions(&mut catalog);

        assert!(!ended.is_empty());
        assert!(
            catalog
                .iter()
                .all(|product| product.price() == product.original_price()
                    && !product.on_flash_sale()
                    && !product.on_recommended_sale())
        );
        assert!(end_promotions(&mut catalog).is_empty());

        Ok(())
    }

    #[test]
    fn end_promotion_rejects_unknown_product() {
        let mut catalog = Catalog::canonical();

        let result = end_promotion(&mut catalog, &"p99".into());

        assert!(matches!(result, Err(PromotionError::UnknownProduct(_))));
    }
}

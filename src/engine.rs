//! Cart engine
//!
//! The entry point the UI layer calls after every cart change: price the cart, then work out
//! the points it earns.

use jiff::{Zoned, civil::Date};
use rand::Rng;
use rusty_money::{Money, iso::Currency};

use crate::{
    cart::{Cart, CartLine},
    catalog::{Catalog, stock::StockReport},
    config::PolicyConfig,
    discounts::DiscountError,
    optimizer::{PricingResult, apply_discount_policies},
    points::{PointsResult, get_total_points},
    promotions::{self, PromotionError, PromotionEvent},
};

/// Pricing and points for one cart snapshot.
#[derive(Debug, Clone)]
pub struct Checkout<'a> {
    /// Amounts and applied discounts
    pub pricing: PricingResult<'a>,

    /// Points earned on the final amount
    pub points: PointsResult,
}

/// Cart engine
#[derive(Debug, Clone, Default)]
pub struct CartEngine {
    config: PolicyConfig,
}

impl CartEngine {
    /// Create an engine with the given policies.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// The policies in use.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Price a cart snapshot on `date`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if money arithmetic overflows.
    #[tracing::instrument(
        name = "engine.calculate_cart_pricing",
        skip(self, lines, catalog),
        fields(lines = lines.len()),
        err
    )]
    pub fn calculate_cart_pricing<'a>(
        &self,
        lines: &[CartLine],
        catalog: &Catalog<'a>,
        date: Date,
    ) -> Result<PricingResult<'a>, DiscountError> {
        apply_discount_policies(lines, catalog, date, &self.config.discounts)
    }

    /// Points earned by a cart snapshot paying `final_amount` on `date`.
    pub fn calculate_loyalty_points(
        &self,
        lines: &[CartLine],
        catalog: &Catalog<'_>,
        final_amount: &Money<'_, Currency>,
        date: Date,
    ) -> PointsResult {
        get_total_points(lines, catalog, final_amount, date, &self.config.points)
    }

    /// Price a cart snapshot and work out its points in one call.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if money arithmetic overflows.
    pub fn checkout<'a>(
        &self,
        lines: &[CartLine],
        catalog: &Catalog<'a>,
        date: Date,
    ) -> Result<Checkout<'a>, DiscountError> {
        let pricing = self.calculate_cart_pricing(lines, catalog, date)?;
        let points =
            self.calculate_loyalty_points(lines, catalog, &pricing.final_amount(), date);

        Ok(Checkout { pricing, points })
    }

    /// Low-stock and sold-out products.
    pub fn stock_report(&self, catalog: &Catalog<'_>) -> StockReport {
        catalog.stock_report(self.config.low_stock_threshold)
    }

    /// Start a flash sale at the configured rate.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] if the sale price cannot be calculated.
    pub fn start_flash_sale<'a, R: Rng + ?Sized>(
        &self,
        catalog: &mut Catalog<'a>,
        rng: &mut R,
    ) -> Result<Option<PromotionEvent<'a>>, PromotionError> {
        promotions::start_flash_sale(catalog, rng, &self.config.discounts.events)
    }

    /// Recommend something other than the cart's most recent addition, at the configured rate.
    ///
    /// # Errors
    ///
    /// Returns a [`PromotionError`] if the recommended price cannot be calculated.
    pub fn start_recommendation<'a>(
        &self,
        catalog: &mut Catalog<'a>,
        cart: &Cart,
    ) -> Result<Option<PromotionEvent<'a>>, PromotionError> {
        promotions::start_recommendation(catalog, cart.last_added(), &self.config.discounts.events)
    }
}

/// Today's date in the system time zone.
pub fn today() -> Date {
    Zoned::now().date()
}

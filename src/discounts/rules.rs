//! Discount rules
//!
//! Individual (per-line), bulk (whole cart) and special-day (weekday) discount policies.

use decimal_percentage::Percentage;
use jiff::civil::{Date, Weekday};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;

use crate::{
    catalog::{KEYBOARD, LAPTOP_POUCH, MONITOR_ARM, MOUSE, SPEAKER},
    discounts::{DiscountCandidate, DiscountKind, fraction, no_discount},
    products::ProductId,
};

/// Line quantity at which individual discounts start.
pub const INDIVIDUAL_THRESHOLD: u32 = 10;

/// Cart quantity at which the bulk discount applies.
pub const BULK_THRESHOLD: u32 = 30;

/// Per-product discount rates applied once a line reaches the quantity threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualRateTable {
    threshold: u32,
    rates: FxHashMap<ProductId, Percentage>,
}

impl IndividualRateTable {
    /// Create a rate table.
    pub fn new(threshold: u32, rates: impl IntoIterator<Item = (ProductId, Percentage)>) -> Self {
        Self {
            threshold,
            rates: rates.into_iter().collect(),
        }
    }

    /// Line quantity at which discounts start.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Discount rate for a line; zero below the threshold or for products without a rate.
    pub fn individual_discount_rate(&self, product: &ProductId, quantity: u32) -> Percentage {
        if quantity < self.threshold {
            return no_discount();
        }

        self.rates.get(product).copied().unwrap_or_else(no_discount)
    }
}

impl Default for IndividualRateTable {
    fn default() -> Self {
        Self::new(
            INDIVIDUAL_THRESHOLD,
            [
                (KEYBOARD.into(), Percentage::from(Decimal::new(10, 2))),
                (MOUSE.into(), Percentage::from(Decimal::new(15, 2))),
                (MONITOR_ARM.into(), Percentage::from(Decimal::new(20, 2))),
                (LAPTOP_POUCH.into(), Percentage::from(Decimal::new(5, 2))),
                (SPEAKER.into(), Percentage::from(Decimal::new(25, 2))),
            ],
        )
    }
}

/// Cart-wide discount once total quantity reaches a threshold.
///
/// When eligible it replaces every individual discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkRule {
    /// Total quantity at which the rule applies.
    pub threshold: u32,

    /// Discount rate on the subtotal.
    pub rate: Percentage,
}

impl BulkRule {
    /// Evaluate the rule against the cart's total quantity.
    pub fn bulk_discount(&self, total_quantity: u32) -> DiscountCandidate {
        DiscountCandidate::for_cart(
            DiscountKind::Bulk,
            self.rate,
            total_quantity >= self.threshold,
        )
    }
}

impl Default for BulkRule {
    fn default() -> Self {
        Self {
            threshold: BULK_THRESHOLD,
            rate: Percentage::from(Decimal::new(25, 2)),
        }
    }
}

/// Extra discount on one day of the week, applied last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecialDayRule {
    /// Day the discount applies on.
    pub weekday: Weekday,

    /// Discount rate on the already-discounted amount.
    pub rate: Percentage,
}

impl SpecialDayRule {
    /// Whether `date` falls on the special day.
    pub fn is_special_day(&self, date: Date) -> bool {
        date.weekday() == self.weekday
    }

    /// Evaluate the rule against the evaluation date.
    pub fn special_day_discount(&self, date: Date) -> DiscountCandidate {
        DiscountCandidate::for_cart(
            DiscountKind::SpecialDay,
            self.rate,
            self.is_special_day(date),
        )
    }
}

impl Default for SpecialDayRule {
    fn default() -> Self {
        Self {
            weekday: Weekday::Tuesday,
            rate: Percentage::from(Decimal::new(10, 2)),
        }
    }
}

/// Rates the promotional events use when they change a product's price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRates {
    /// Flash sale rate, taken off the original price.
    pub flash: Percentage,

    /// Recommendation rate, taken off the current price.
    pub recommend: Percentage,
}

impl EventRates {
    /// Nominal rate reported for a product carrying both promotions.
    ///
    /// This is the sum of the two rates, not the compounded rate actually in the price.
    pub fn combo(&self) -> Percentage {
        Percentage::from(fraction(&self.flash) + fraction(&self.recommend))
    }
}

impl Default for EventRates {
    fn default() -> Self {
        Self {
            flash: Percentage::from(Decimal::new(20, 2)),
            recommend: Percentage::from(Decimal::new(5, 2)),
        }
    }
}

/// Every discount policy the optimizer evaluates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountPolicy {
    /// Per-line rates
    pub individual: IndividualRateTable,

    /// Whole-cart quantity rule
    pub bulk: BulkRule,

    /// Weekday rule
    pub special_day: SpecialDayRule,

    /// Promotional event rates
    pub events: EventRates,
}

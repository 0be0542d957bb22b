//! Discounts
//!
//! The closed set of discount kinds the optimizer knows about, the rules that decide when each
//! one is eligible, and the shared percentage arithmetic.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::MoneyError;
use thiserror::Error;

use crate::{pricing::TotalPriceError, products::ProductId};

pub mod events;
pub mod rules;

/// Errors specific to discount calculations.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A cart amount does not fit in minor units.
    #[error("cart amount overflowed")]
    Overflow,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from subtotal calculation.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

/// Kind of discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscountKind {
    /// Per-line quantity discount.
    Individual,

    /// Cart-wide quantity discount.
    Bulk,

    /// Weekday discount on the whole cart.
    SpecialDay,

    /// Flash sale on a single product.
    Flash,

    /// Recommendation discount on a single product.
    Recommend,

    /// Flash sale and recommendation on the same product.
    Combo,
}

impl DiscountKind {
    /// Whether the discount is already part of the product's unit price.
    ///
    /// These are listed in results for display but never applied by the optimizer.
    pub const fn is_priced_in(self) -> bool {
        match self {
            DiscountKind::Flash | DiscountKind::Recommend | DiscountKind::Combo => true,
            DiscountKind::Individual | DiscountKind::Bulk | DiscountKind::SpecialDay => false,
        }
    }

    /// Short label for the discount kind.
    pub const fn label(self) -> &'static str {
        match self {
            DiscountKind::Individual => "individual",
            DiscountKind::Bulk => "bulk",
            DiscountKind::SpecialDay => "special day",
            DiscountKind::Flash => "flash sale",
            DiscountKind::Recommend => "recommendation",
            DiscountKind::Combo => "flash + recommendation",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a discount applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// A single product line.
    Product(ProductId),

    /// Every line in the cart.
    WholeCart,
}

/// A discount considered for the current cart.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountCandidate {
    /// Discount kind
    pub kind: DiscountKind,

    /// Fractional rate, between 0 and 1.
    pub rate: Percentage,

    /// Whether the rule matched the cart.
    pub eligible: bool,

    /// Product or whole cart.
    pub scope: Scope,
}

impl DiscountCandidate {
    /// Create an eligible product-scoped candidate.
    pub fn for_product(kind: DiscountKind, product: ProductId, rate: Percentage) -> Self {
        Self {
            kind,
            rate,
            eligible: true,
            scope: Scope::Product(product),
        }
    }

    /// Create a cart-wide candidate.
    pub fn for_cart(kind: DiscountKind, rate: Percentage, eligible: bool) -> Self {
        Self {
            kind,
            rate,
            eligible,
            scope: Scope::WholeCart,
        }
    }

    /// The product this candidate targets, if it is product-scoped.
    pub fn product(&self) -> Option<&ProductId> {
        match &self.scope {
            Scope::Product(product) => Some(product),
            Scope::WholeCart => None,
        }
    }
}

/// Whether two discounts may both appear in one pricing result.
///
/// Individual and bulk discounts never combine. Two product-scoped discounts of overlapping
/// kinds only combine when they target different products; a flash sale and a recommendation
/// on the same product are reported as a single combo instead.
pub fn can_combine(a: &DiscountCandidate, b: &DiscountCandidate) -> bool {
    use DiscountKind::{Bulk, Combo, Flash, Individual, Recommend, SpecialDay};

    let distinct = a.scope != b.scope;

    match (a.kind, b.kind) {
        (Individual, Bulk) | (Bulk, Individual) | (Bulk, Bulk) | (SpecialDay, SpecialDay) => false,
        (Individual | Bulk, SpecialDay)
        | (SpecialDay, Individual | Bulk)
        | (Individual | Bulk | SpecialDay, Flash | Recommend | Combo)
        | (Flash | Recommend | Combo, Individual | Bulk | SpecialDay) => true,
        (Individual, Individual)
        | (Flash | Recommend | Combo, Flash | Recommend | Combo) => distinct,
    }
}

/// A zero rate.
pub fn no_discount() -> Percentage {
    Percentage::from(Decimal::ZERO)
}

/// The percentage as a plain decimal fraction.
pub fn fraction(percent: &Percentage) -> Decimal {
    // decimal_percentage doesn't expose the inner Decimal
    *percent * Decimal::ONE
}

/// Whether the rate is greater than zero.
pub fn is_positive(percent: &Percentage) -> bool {
    fraction(percent) > Decimal::ZERO
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    fraction(percent)
        .checked_mul(Decimal::from(minor))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Price in minor units after taking `percent` off, rounded to the nearest minor unit.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn discounted_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    Decimal::ONE
        .checked_sub(fraction(percent))
        .and_then(|remaining| remaining.checked_mul(Decimal::from(minor)))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// `part / whole` as a percentage; zero when `whole` is zero.
pub fn ratio(part: i64, whole: i64) -> Percentage {
    if whole == 0 {
        return no_discount();
    }

    Percentage::from(Decimal::from(part) / Decimal::from(whole))
}

/// Converts a fractional percentage to percent points for display.
pub fn percent_points(percent: &Percentage) -> Decimal {
    (fraction(percent) * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .normalize()
}

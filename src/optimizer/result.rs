//! Pricing result

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;

use crate::discounts::{DiscountCandidate, DiscountKind, no_discount, ratio};

/// Outcome of pricing a cart.
#[derive(Debug, Clone)]
pub struct PricingResult<'a> {
    subtotal: Money<'a, Currency>,
    final_amount: Money<'a, Currency>,
    total_quantity: u32,
    applied_discounts: SmallVec<[DiscountCandidate; 4]>,
}

impl<'a> PricingResult<'a> {
    /// Create a pricing result.
    #[must_use]
    pub fn new(
        subtotal: Money<'a, Currency>,
        final_amount: Money<'a, Currency>,
        total_quantity: u32,
        applied_discounts: SmallVec<[DiscountCandidate; 4]>,
    ) -> Self {
        Self {
            subtotal,
            final_amount,
            total_quantity,
            applied_discounts,
        }
    }

    /// The all-zero result for an empty cart.
    #[must_use]
    pub fn empty(currency: &'a Currency) -> Self {
        Self::new(
            Money::from_minor(0, currency),
            Money::from_minor(0, currency),
            0,
            SmallVec::new(),
        )
    }

    /// Sum of line totals before any discount.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Amount charged after discounts.
    #[must_use]
    pub fn final_amount(&self) -> Money<'a, Currency> {
        self.final_amount
    }

    /// Units across every priced line.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Discounts in the order they were applied.
    ///
    /// Flash, recommendation and combo entries describe prices that already carry the
    /// discount; they were not applied again.
    #[must_use]
    pub fn applied_discounts(&self) -> &[DiscountCandidate] {
        &self.applied_discounts
    }

    /// Whether a discount of `kind` was applied.
    #[must_use]
    pub fn has_discount(&self, kind: DiscountKind) -> bool {
        self.applied_discounts
            .iter()
            .any(|discount| discount.kind == kind)
    }

    /// Whether the special-day discount was applied.
    ///
    /// False for an empty cart even on the special day.
    #[must_use]
    pub fn is_special_day_applied(&self) -> bool {
        self.has_discount(DiscountKind::SpecialDay)
    }

    /// Subtotal minus final amount.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn total_savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.subtotal.sub(self.final_amount)
    }

    /// Savings as a fraction of the subtotal; zero when the subtotal is zero.
    #[must_use]
    pub fn discount_rate(&self) -> Percentage {
        let subtotal_minor = self.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return no_discount();
        }

        ratio(
            subtotal_minor - self.final_amount.to_minor_units(),
            subtotal_minor,
        )
    }
}

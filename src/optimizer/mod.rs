//! Discount optimizer
//!
//! Picks the discount combination for a cart and computes the amount charged:
//!
//! 1. Subtotal from current unit prices, which already carry any flash sale or recommendation.
//! 2. Bulk discount on the subtotal when the cart is large enough, otherwise individual discounts
//!    on each line that reaches its threshold. Never both.
//! 3. Flash, recommendation and combo entries are listed for display only.
//! 4. Special-day discount on whatever remains, if anything remains.

use jiff::civil::Date;
use rusty_money::Money;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    cart::CartLine,
    catalog::Catalog,
    discounts::{
        DiscountCandidate, DiscountError, DiscountKind, can_combine, events::event_discount,
        is_positive, percent_of_minor, rules::DiscountPolicy,
    },
    pricing::{PricedLine, resolve_lines, subtotal, total_quantity},
};

pub mod result;

pub use result::PricingResult;

/// Price a cart snapshot against the catalog on `date`.
///
/// Lines for unknown products and lines with no units contribute nothing.
///
/// # Errors
///
/// Returns a [`DiscountError`] if money arithmetic overflows or mixes currencies.
pub fn apply_discount_policies<'a>(
    lines: &[CartLine],
    catalog: &Catalog<'a>,
    date: Date,
    policy: &DiscountPolicy,
) -> Result<PricingResult<'a>, DiscountError> {
    let currency = catalog.currency();
    let priced = resolve_lines(lines, catalog)?;

    if priced.is_empty() {
        return Ok(PricingResult::empty(currency));
    }

    let subtotal = subtotal(&priced, currency)?;
    let total_quantity = total_quantity(&priced);

    let mut applied: SmallVec<[DiscountCandidate; 4]> = SmallVec::new();

    let bulk = policy.bulk.bulk_discount(total_quantity);

    let mut amount = if bulk.eligible {
        let discount = percent_of_minor(&bulk.rate, subtotal.to_minor_units())?;

        debug!(total_quantity, discount, "bulk discount replaces individual discounts");

        applied.push(bulk);

        subtotal
            .to_minor_units()
            .checked_sub(discount)
            .ok_or(DiscountError::Overflow)?
    } else {
        apply_individual_discounts(&priced, policy, &mut applied)?
    };

    applied.extend(
        priced
            .iter()
            .filter_map(|line| event_discount(line.product(), &policy.events)),
    );

    let special_day = policy.special_day.special_day_discount(date);

    if special_day.eligible && amount > 0 {
        let discount = percent_of_minor(&special_day.rate, amount)?;

        trace!(amount, discount, "special day discount");

        amount = amount.checked_sub(discount).ok_or(DiscountError::Overflow)?;
        applied.push(special_day);
    }

    debug_assert!(
        is_valid_combination(&applied),
        "optimizer produced an invalid discount combination: {applied:?}"
    );

    let final_amount = Money::from_minor(amount.max(0), currency);

    debug!(
        subtotal = subtotal.to_minor_units(),
        final_amount = final_amount.to_minor_units(),
        discounts = applied.len(),
        "priced cart"
    );

    Ok(PricingResult::new(
        subtotal,
        final_amount,
        total_quantity,
        applied,
    ))
}

/// Sum the lines, taking each line's individual discount off its total.
fn apply_individual_discounts(
    priced: &[PricedLine<'_, '_>],
    policy: &DiscountPolicy,
    applied: &mut SmallVec<[DiscountCandidate; 4]>,
) -> Result<i64, DiscountError> {
    priced.iter().try_fold(0i64, |amount, line| {
        let product = line.product();
        let line_minor = line.line_total().to_minor_units();
        let rate = policy
            .individual
            .individual_discount_rate(product.id(), line.quantity());

        if !is_positive(&rate) {
            return amount.checked_add(line_minor).ok_or(DiscountError::Overflow);
        }

        let discount = percent_of_minor(&rate, line_minor)?;

        trace!(product = %product.id(), line_minor, discount, "individual discount");

        applied.push(DiscountCandidate::for_product(
            DiscountKind::Individual,
            product.id().clone(),
            rate,
        ));

        line_minor
            .checked_sub(discount)
            .and_then(|discounted| amount.checked_add(discounted))
            .ok_or(DiscountError::Overflow)
    })
}

/// Whether every pair of applied discounts may appear together.
fn is_valid_combination(applied: &[DiscountCandidate]) -> bool {
    applied.iter().enumerate().all(|(idx, a)| {
        applied
            .iter()
            .skip(idx + 1)
            .all(|b| can_combine(a, b))
    })
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use rusty_money::iso::KRW;
    use testresult::TestResult;

    use crate::{
        catalog::{KEYBOARD, MONITOR_ARM, MOUSE, SPEAKER},
        discounts::{Scope, no_discount},
        pricing::TotalPriceError,
    };

    use super::*;

    const WEDNESDAY: (i16, i8, i8) = (2024, 10, 2);
    const TUESDAY: (i16, i8, i8) = (2024, 10, 1);

    fn on((year, month, day): (i16, i8, i8)) -> Date {
        date(year, month, day)
    }

    fn price(
        lines: &[CartLine],
        day: (i16, i8, i8),
    ) -> Result<PricingResult<'static>, DiscountError> {
        let catalog = Catalog::canonical();

        apply_discount_policies(lines, &catalog, on(day), &DiscountPolicy::default())
    }

    #[test]
    fn empty_cart_prices_to_zero() -> TestResult {
        let result = price(&[], TUESDAY)?;

        assert_eq!(result.final_amount(), Money::from_minor(0, KRW));
        assert!(result.applied_discounts().is_empty());
        assert!(!result.is_special_day_applied());

        Ok(())
    }

    #[test]
    fn cart_of_stale_lines_prices_to_zero() -> TestResult {
        let result = price(&[CartLine::new("p99", 3), CartLine::new(KEYBOARD, -1)], TUESDAY)?;

        assert_eq!(result.subtotal(), Money::from_minor(0, KRW));
        assert_eq!(result.discount_rate(), no_discount());

        Ok(())
    }

    #[test]
    fn individual_discount_applies_per_line() -> TestResult {
        let lines = [CartLine::new(KEYBOARD, 10), CartLine::new(MOUSE, 10)];

        let result = price(&lines, WEDNESDAY)?;

        // 100,000 - 10% + 200,000 - 15%
        assert_eq!(result.subtotal(), Money::from_minor(300_000, KRW));
        assert_eq!(result.final_amount(), Money::from_minor(260_000, KRW));

        let scopes: Vec<&Scope> = result
            .applied_discounts()
            .iter()
            .map(|discount| &discount.scope)
            .collect();

        assert_eq!(
            scopes,
            vec![
                &Scope::Product(KEYBOARD.into()),
                &Scope::Product(MOUSE.into())
            ]
        );

        Ok(())
    }

    #[test]
    fn lines_below_threshold_pay_full_price() -> TestResult {
        let lines = [CartLine::new(KEYBOARD, 10), CartLine::new(SPEAKER, 9)];

        let result = price(&lines, WEDNESDAY)?;

        assert_eq!(result.final_amount(), Money::from_minor(90_000 + 225_000, KRW));
        assert_eq!(result.applied_discounts().len(), 1);

        Ok(())
    }

    #[test]
    fn bulk_discount_replaces_individual_discounts() -> TestResult {
        let lines = [CartLine::new(KEYBOARD, 20), CartLine::new(MONITOR_ARM, 10)];

        let result = price(&lines, WEDNESDAY)?;

        assert_eq!(result.subtotal(), Money::from_minor(500_000, KRW));
        assert_eq!(result.final_amount(), Money::from_minor(375_000, KRW));
        assert!(result.has_discount(DiscountKind::Bulk));
        assert!(!result.has_discount(DiscountKind::Individual));

        Ok(())
    }

    #[test]
    fn special_day_applies_last_on_tuesday() -> TestResult {
        let lines = [CartLine::new(KEYBOARD, 30)];

        let result = price(&lines, TUESDAY)?;

        // 300,000 * 0.75 * 0.9
        assert_eq!(result.final_amount(), Money::from_minor(202_500, KRW));

        let kinds: Vec<DiscountKind> = result
            .applied_discounts()
            .iter()
            .map(|discount| discount.kind)
            .collect();

        assert_eq!(kinds, vec![DiscountKind::Bulk, DiscountKind::SpecialDay]);

        Ok(())
    }

    #[test]
    fn special_day_skipped_when_nothing_to_discount() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        catalog.insert(crate::products::Product::new(
            "gift",
            "Free sticker",
            Money::from_minor(0, KRW),
            10,
        ))?;

        let result = apply_discount_policies(
            &[CartLine::new("gift", 2)],
            &catalog,
            on(TUESDAY),
            &DiscountPolicy::default(),
        )?;

        assert_eq!(result.final_amount(), Money::from_minor(0, KRW));
        assert!(!result.is_special_day_applied());
        assert_eq!(result.discount_rate(), no_discount());

        Ok(())
    }

    #[test]
    fn overflowing_cart_is_an_error() -> TestResult {
        let mut catalog = Catalog::new(KRW);
        let mut lines = Vec::new();

        for id in ["a", "b", "c", "d", "e"] {
            catalog.insert(crate::products::Product::new(
                id,
                "Gold bar",
                Money::from_minor(2_000_000_000_000_000_000, KRW),
                1,
            ))?;
            lines.push(CartLine::new(id, 1));
        }

        let result = apply_discount_policies(
            &lines,
            &catalog,
            on(WEDNESDAY),
            &DiscountPolicy::default(),
        );

        assert!(matches!(
            result,
            Err(DiscountError::TotalPrice(TotalPriceError::SubtotalOverflow))
        ));

        Ok(())
    }

    #[test]
    fn event_discounts_are_listed_but_not_reapplied() -> TestResult {
        let mut catalog = Catalog::canonical();
        let policy = DiscountPolicy::default();

        let mouse = catalog
            .get_product_by_id_mut(&MOUSE.into())
            .ok_or("expected mouse")?;

        mouse.apply_flash_sale(&policy.events.flash)?;
        mouse.apply_recommendation(&policy.events.recommend)?;

        let result = apply_discount_policies(
            &[CartLine::new(MOUSE, 2)],
            &catalog,
            on(WEDNESDAY),
            &policy,
        )?;

        // 20,000 * 0.8 * 0.95 = 15,200 per unit, nothing further taken off.
        assert_eq!(result.subtotal(), Money::from_minor(30_400, KRW));
        assert_eq!(result.final_amount(), Money::from_minor(30_400, KRW));

        let combo = result
            .applied_discounts()
            .first()
            .ok_or("expected combo entry")?;

        assert_eq!(combo.kind, DiscountKind::Combo);
        assert_eq!(combo.rate, Percentage::from(Decimal::new(25, 2)));

        Ok(())
    }

    #[test]
    fn event_discounts_stack_under_bulk_without_double_counting() -> TestResult {
        let mut catalog = Catalog::canonical();
        let policy = DiscountPolicy::default();

        catalog
            .get_product_by_id_mut(&KEYBOARD.into())
            .ok_or("expected keyboard")?
            .apply_flash_sale(&policy.events.flash)?;

        let result = apply_discount_policies(
            &[CartLine::new(KEYBOARD, 30)],
            &catalog,
            on(WEDNESDAY),
            &policy,
        )?;

        // 8,000 * 30 = 240,000, then 25% bulk only.
        assert_eq!(result.final_amount(), Money::from_minor(180_000, KRW));
        assert!(result.has_discount(DiscountKind::Flash));

        Ok(())
    }

    #[test]
    fn valid_combination_rejects_bulk_with_individual() {
        let bulk = DiscountCandidate::for_cart(
            DiscountKind::Bulk,
            Percentage::from(Decimal::new(25, 2)),
            true,
        );
        let individual = DiscountCandidate::for_product(
            DiscountKind::Individual,
            KEYBOARD.into(),
            Percentage::from(Decimal::new(10, 2)),
        );

        assert!(!is_valid_combination(&[bulk, individual]));
    }
}

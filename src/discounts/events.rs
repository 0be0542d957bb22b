//! Event discounts
//!
//! Flash sales and recommendations change a product's unit price directly, so they never reach
//! the optimizer's arithmetic. These candidates only describe them.

use crate::{
    discounts::{DiscountCandidate, DiscountKind, rules::EventRates},
    products::Product,
};

/// Describe the promotional discount currently priced into `product`, if any.
///
/// A product with both flags set is reported once, as a combo at the nominal combined rate.
pub fn event_discount(product: &Product<'_>, rates: &EventRates) -> Option<DiscountCandidate> {
    let (kind, rate) = match (product.on_flash_sale(), product.on_recommended_sale()) {
        (true, true) => (DiscountKind::Combo, rates.combo()),
        (true, false) => (DiscountKind::Flash, rates.flash),
        (false, true) => (DiscountKind::Recommend, rates.recommend),
        (false, false) => return None,
    };

    Some(DiscountCandidate::for_product(
        kind,
        product.id().clone(),
        rate,
    ))
}

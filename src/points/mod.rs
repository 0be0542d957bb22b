//! Loyalty points
//!
//! Points are earned in a fixed order: base points from the amount paid, the special-day
//! multiplier, set bonuses, then the quantity tier. Each step that contributes adds a message to
//! the breakdown.

use std::fmt;

use jiff::civil::{Date, Weekday};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{cart::CartLine, catalog::Catalog, config::weekday_name, products::ProductId};

pub mod rules;

pub use rules::{PointsPolicy, QuantityTier, SetBonus};

/// One line of the points breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointsMessage {
    /// Points earned from the amount paid.
    Base {
        /// Points
        points: u64,
    },

    /// Base points multiplied on the special day.
    SpecialDayMultiplier {
        /// Day of the week
        weekday: Weekday,

        /// Multiplier applied
        multiplier: u64,
    },

    /// A product set was completed.
    SetBonus {
        /// Set name
        name: String,

        /// Points
        points: u64,
    },

    /// A quantity tier was reached.
    QuantityBonus {
        /// Tier threshold
        min_quantity: u32,

        /// Points
        points: u64,
    },
}

impl PointsMessage {
    /// Points this message adds on top of what came before.
    ///
    /// The multiplier message reports zero; its effect is already in the total.
    pub fn bonus_points(&self) -> u64 {
        match self {
            PointsMessage::Base { points }
            | PointsMessage::SetBonus { points, .. }
            | PointsMessage::QuantityBonus { points, .. } => *points,
            PointsMessage::SpecialDayMultiplier { .. } => 0,
        }
    }
}

impl fmt::Display for PointsMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointsMessage::Base { points } => write!(f, "Base: {points}p"),
            PointsMessage::SpecialDayMultiplier {
                weekday,
                multiplier,
            } => write!(f, "{} x{multiplier}", weekday_name(*weekday)),
            PointsMessage::SetBonus { name, points } => write!(f, "{name} +{points}p"),
            PointsMessage::QuantityBonus {
                min_quantity,
                points,
            } => write!(f, "Bulk purchase ({min_quantity}+ units) +{points}p"),
        }
    }
}

/// Points earned by a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsResult {
    /// Points from the amount paid, before the multiplier or any bonus.
    pub base_points: u64,

    /// Total points earned.
    pub final_points: u64,

    /// Breakdown in the order the points were earned.
    pub messages: SmallVec<[PointsMessage; 5]>,
}

impl PointsResult {
    /// Breakdown lines rendered for display.
    pub fn breakdown(&self) -> Vec<String> {
        self.messages.iter().map(ToString::to_string).collect()
    }
}

/// Calculate the points earned by a cart paying `final_amount` on `date`.
///
/// Lines for unknown products and lines with no units are ignored. A cart with nothing left
/// earns no points, whatever amount is passed in.
#[tracing::instrument(
    name = "points.get_total_points",
    skip_all,
    fields(final_amount = final_amount.to_minor_units(), date = %date)
)]
pub fn get_total_points(
    lines: &[CartLine],
    catalog: &Catalog<'_>,
    final_amount: &Money<'_, Currency>,
    date: Date,
    policy: &PointsPolicy,
) -> PointsResult {
    let counted: SmallVec<[(&ProductId, u32); 8]> = lines
        .iter()
        .filter(|line| line.units() > 0)
        .filter(|line| catalog.get_product_by_id(&line.product_id).is_some())
        .map(|line| (&line.product_id, line.units()))
        .collect();

    if counted.is_empty() {
        return PointsResult::default();
    }

    let mut messages = SmallVec::new();

    let base_points = base_points(final_amount.to_minor_units(), policy.base_unit);

    if base_points > 0 {
        messages.push(PointsMessage::Base {
            points: base_points,
        });
    }

    let mut points = base_points;

    if date.weekday() == policy.special_day && base_points > 0 && policy.multiplier != 1 {
        points = base_points.saturating_mul(policy.multiplier);

        messages.push(PointsMessage::SpecialDayMultiplier {
            weekday: policy.special_day,
            multiplier: policy.multiplier,
        });
    }

    let contains = |id: &ProductId| counted.iter().any(|(product, _)| *product == id);

    for set in &policy.set_bonuses {
        if set.points > 0 && set.is_satisfied_by(contains) {
            trace!(set = %set.name, points = set.points, "set bonus");

            points = points.saturating_add(set.points);

            messages.push(PointsMessage::SetBonus {
                name: set.name.clone(),
                points: set.points,
            });
        }
    }

    let total_quantity = counted
        .iter()
        .fold(0u32, |acc, (_, quantity)| acc.saturating_add(*quantity));

    if let Some(tier) = policy.quantity_tier(total_quantity)
        && tier.points > 0
    {
        points = points.saturating_add(tier.points);

        messages.push(PointsMessage::QuantityBonus {
            min_quantity: tier.min_quantity,
            points: tier.points,
        });
    }

    debug!(base_points, final_points = points, total_quantity, "earned points");

    PointsResult {
        base_points,
        final_points: points,
        messages,
    }
}

/// Whole base units in `amount`; nothing for a non-positive amount or unit.
fn base_points(amount: i64, base_unit: i64) -> u64 {
    if amount <= 0 || base_unit <= 0 {
        return 0;
    }

    u64::try_from(amount / base_unit).unwrap_or(0)
}

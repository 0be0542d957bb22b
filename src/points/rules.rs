//! Points rules

use jiff::civil::Weekday;
use smallvec::{SmallVec, smallvec};

use crate::{
    catalog::{KEYBOARD, MONITOR_ARM, MOUSE},
    products::ProductId,
};

/// Minor units of spend per base point.
pub const BASE_UNIT: i64 = 1_000;

/// Bonus for carrying every product in a set, regardless of quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetBonus {
    /// Display name of the set.
    pub name: String,

    /// Products that must all be in the cart.
    pub products: SmallVec<[ProductId; 4]>,

    /// Points awarded.
    pub points: u64,
}

impl SetBonus {
    /// Create a set bonus.
    pub fn new(
        name: impl Into<String>,
        products: impl IntoIterator<Item = ProductId>,
        points: u64,
    ) -> Self {
        Self {
            name: name.into(),
            products: products.into_iter().collect(),
            points,
        }
    }

    /// Whether `contains` holds for every product in the set.
    ///
    /// An empty set never matches.
    pub fn is_satisfied_by(&self, contains: impl Fn(&ProductId) -> bool) -> bool {
        !self.products.is_empty() && self.products.iter().all(contains)
    }
}

/// Bonus for buying at least `min_quantity` units in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityTier {
    /// Total units needed.
    pub min_quantity: u32,

    /// Points awarded.
    pub points: u64,
}

/// Loyalty points policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsPolicy {
    /// Minor units of spend per base point.
    pub base_unit: i64,

    /// Day on which base points are multiplied.
    pub special_day: Weekday,

    /// Multiplier that replaces base points on the special day.
    pub multiplier: u64,

    /// Set bonuses; every satisfied set is awarded.
    pub set_bonuses: Vec<SetBonus>,

    /// Quantity tiers; only the highest reached tier is awarded.
    pub quantity_tiers: SmallVec<[QuantityTier; 4]>,
}

impl PointsPolicy {
    /// The highest tier reached by `total_quantity`, if any.
    pub fn quantity_tier(&self, total_quantity: u32) -> Option<&QuantityTier> {
        self.quantity_tiers
            .iter()
            .filter(|tier| total_quantity >= tier.min_quantity)
            .max_by_key(|tier| tier.min_quantity)
    }
}

impl Default for PointsPolicy {
    fn default() -> Self {
        Self {
            base_unit: BASE_UNIT,
            special_day: Weekday::Tuesday,
            multiplier: 2,
            set_bonuses: vec![
                SetBonus::new("Keyboard + mouse set", [KEYBOARD.into(), MOUSE.into()], 50),
                SetBonus::new(
                    "Full set",
                    [KEYBOARD.into(), MOUSE.into(), MONITOR_ARM.into()],
                    100,
                ),
            ],
            quantity_tiers: smallvec![
                QuantityTier {
                    min_quantity: 10,
                    points: 20,
                },
                QuantityTier {
                    min_quantity: 20,
                    points: 50,
                },
                QuantityTier {
                    min_quantity: 30,
                    points: 100,
                },
            ],
        }
    }
}

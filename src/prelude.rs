//! Cartwheel prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{
        Catalog, CatalogError,
        stock::{StockAlert, StockReport, StockStatus},
    },
    config::{ConfigError, PolicyConfig},
    discounts::{
        DiscountCandidate, DiscountError, DiscountKind, Scope, can_combine,
        rules::{BulkRule, DiscountPolicy, EventRates, IndividualRateTable, SpecialDayRule},
    },
    engine::{CartEngine, Checkout},
    optimizer::{PricingResult, apply_discount_policies},
    points::{PointsMessage, PointsPolicy, PointsResult, get_total_points},
    products::{Product, ProductError, ProductId},
    promotions::{
        PromotionError, PromotionEvent, PromotionSchedule, PromotionTimer, end_promotion,
        end_promotions, start_flash_sale, start_recommendation,
    },
};

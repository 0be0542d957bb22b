//! Cartwheel
//!
//! Cartwheel is a shopping-cart discount and loyalty-points engine: it turns a cart snapshot and
//! a date into the amount charged, the discounts that produced it and the points it earns.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod discounts;
pub mod engine;
pub mod fixtures;
pub mod observability;
pub mod optimizer;
pub mod points;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod summary;
pub mod utils;

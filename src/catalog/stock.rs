//! Stock status
//!
//! Low-stock and sold-out reporting for the catalog.

use smallvec::SmallVec;

use crate::{catalog::Catalog, products::ProductId};

/// Remaining stock below which a product is reported as running low.
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Stock state worth surfacing to a shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    /// Some units remain, but fewer than the threshold.
    LowStock(u32),

    /// No units remain.
    SoldOut,
}

/// A product with a notable stock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAlert {
    /// Product id
    pub product: ProductId,

    /// Product display name
    pub name: String,

    /// Stock state
    pub status: StockStatus,
}

/// Stock summary across the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockReport {
    /// Products that are running low or sold out, in catalog order.
    pub alerts: SmallVec<[StockAlert; 5]>,

    /// Units remaining across every product.
    pub total_stock: u64,
}

impl StockReport {
    /// Whether the total remaining stock is below `threshold`.
    pub fn is_total_low(&self, threshold: u64) -> bool {
        self.total_stock < threshold
    }
}

impl Catalog<'_> {
    /// Report products with fewer than `low_stock_threshold` units left.
    pub fn stock_report(&self, low_stock_threshold: u32) -> StockReport {
        let alerts = self
            .iter()
            .filter_map(|product| {
                let status = match product.stock() {
                    0 => StockStatus::SoldOut,
                    stock if stock < low_stock_threshold => StockStatus::LowStock(stock),
                    _ => return None,
                };

                Some(StockAlert {
                    product: product.id().clone(),
                    name: product.name().to_string(),
                    status,
                })
            })
            .collect();

        let total_stock = self.iter().map(|product| u64::from(product.stock())).sum();

        StockReport {
            alerts,
            total_stock,
        }
    }
}

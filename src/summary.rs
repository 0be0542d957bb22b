//! Summary
//!
//! Terminal rendering of a checkout for the demo.

use std::io;

use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLine,
    catalog::{
        Catalog,
        stock::{StockReport, StockStatus},
    },
    discounts::{DiscountCandidate, DiscountKind, Scope, percent_points},
    engine::Checkout,
    pricing::{TotalPriceError, resolve_lines},
    products::Product,
};

/// Errors that can occur when writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error pricing the cart lines.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the cart table, the applied discounts and the points breakdown.
///
/// # Errors
///
/// Returns an error if the lines cannot be priced or the output cannot be written.
pub fn write_summary(
    mut out: impl io::Write,
    lines: &[CartLine],
    catalog: &Catalog<'_>,
    checkout: &Checkout<'_>,
) -> Result<(), SummaryError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Unit Price", "Line Total", "Promotion"]);

    for line in resolve_lines(lines, catalog)? {
        builder.push_record([
            line.product().name().to_string(),
            line.quantity().to_string(),
            line.product().price().to_string(),
            line.line_total().to_string(),
            promotion_label(line.product()).to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)?;

    let pricing = &checkout.pricing;

    writeln!(out, " Subtotal: {}", pricing.subtotal()).map_err(|_err| SummaryError::IO)?;

    for discount in pricing.applied_discounts() {
        writeln!(out, "   {}", discount_line(discount, catalog)).map_err(|_err| SummaryError::IO)?;
    }

    writeln!(out, " \x1b[1mTotal:\x1b[0m {}", pricing.final_amount())
        .map_err(|_err| SummaryError::IO)?;

    writeln!(
        out,
        " Savings: ({}%) {}",
        percent_points(&pricing.discount_rate()),
        pricing.total_savings()?
    )
    .map_err(|_err| SummaryError::IO)?;

    if pricing.is_special_day_applied() {
        writeln!(out, " Special day discount applied!").map_err(|_err| SummaryError::IO)?;
    }

    writeln!(out, " Points: {}p", checkout.points.final_points).map_err(|_err| SummaryError::IO)?;

    for message in &checkout.points.messages {
        writeln!(out, "   {message}").map_err(|_err| SummaryError::IO)?;
    }

    writeln!(out).map_err(|_err| SummaryError::IO)
}

/// Write one line per product running low or sold out.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_stock_report(mut out: impl io::Write, report: &StockReport) -> Result<(), SummaryError> {
    for alert in &report.alerts {
        let status = match alert.status {
            StockStatus::LowStock(remaining) => format!("low stock ({remaining} left)"),
            StockStatus::SoldOut => "sold out".to_string(),
        };

        writeln!(out, " {}: {status}", alert.name).map_err(|_err| SummaryError::IO)?;
    }

    writeln!(out, " Total stock: {}", report.total_stock).map_err(|_err| SummaryError::IO)
}

fn promotion_label(product: &Product<'_>) -> &'static str {
    match (product.on_flash_sale(), product.on_recommended_sale()) {
        (true, true) => DiscountKind::Combo.label(),
        (true, false) => DiscountKind::Flash.label(),
        (false, true) => DiscountKind::Recommend.label(),
        (false, false) => "",
    }
}

fn discount_line(discount: &DiscountCandidate, catalog: &Catalog<'_>) -> String {
    let rate = percent_points(&discount.rate);

    let line = match &discount.scope {
        Scope::WholeCart => format!("{} -{rate}%", discount.kind),
        Scope::Product(id) => {
            let name = catalog
                .get_product_by_id(id)
                .map_or(id.as_str(), Product::name);

            format!("{} ({name}) -{rate}%", discount.kind)
        }
    };

    if discount.kind.is_priced_in() {
        format!("{line}, in unit price")
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use crate::{
        catalog::{KEYBOARD, MOUSE, stock::LOW_STOCK_THRESHOLD},
        engine::CartEngine,
    };

    use super::*;

    #[test]
    fn write_summary_renders_lines_discounts_and_points() -> TestResult {
        let catalog = Catalog::canonical();
        let lines = [CartLine::new(KEYBOARD, 10), CartLine::new(MOUSE, 1)];
        let checkout = CartEngine::default().checkout(&lines, &catalog, date(2024, 10, 1))?;

        let mut out = Vec::new();
        write_summary(&mut out, &lines, &catalog, &checkout)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Bug-free keyboard"));
        assert!(output.contains("Productivity mouse"));
        assert!(output.contains("individual (Bug-free keyboard) -10%"));
        assert!(output.contains("special day -10%"));
        assert!(output.contains("Special day discount applied!"));
        assert!(output.contains("Subtotal:"));
        assert!(output.contains("Keyboard + mouse set +50p"));

        Ok(())
    }

    #[test]
    fn write_summary_marks_promoted_products() -> TestResult {
        let mut catalog = Catalog::canonical();

        catalog
            .get_product_by_id_mut(&MOUSE.into())
            .ok_or("expected mouse")?
            .apply_flash_sale(&crate::discounts::rules::EventRates::default().flash)?;

        let lines = [CartLine::new(MOUSE, 1)];
        let checkout = CartEngine::default().checkout(&lines, &catalog, date(2024, 10, 2))?;

        let mut out = Vec::new();
        write_summary(&mut out, &lines, &catalog, &checkout)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("flash sale (Productivity mouse) -20%, in unit price"));
        assert!(!output.contains("individual"));

        Ok(())
    }

    #[test]
    fn write_stock_report_lists_alerts() -> TestResult {
        let report = Catalog::canonical().stock_report(LOW_STOCK_THRESHOLD);

        let mut out = Vec::new();
        write_stock_report(&mut out, &report)?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Laptop pouch: sold out"));
        assert!(output.contains("Total stock: 110"));

        Ok(())
    }
}

use tracing::warn;

use crate::model::{aggregate_results, ExtractionResult, Row};
use crate::parsing::header::detect_columns;
use crate::parsing::values::{line_quantity, order_quantity};
use crate::rules::catalog::ProductCatalog;

/// Catch-all parser for vendor order sheets with unknown layouts.
///
/// Columns are found from the header text; product and option text are
/// joined and matched against the generic patterns, first match per row.
pub fn parse(rows: &[Row], catalog: &ProductCatalog) -> Vec<ExtractionResult> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let cols = detect_columns(header);
    let Some(product_col) = cols.product.as_deref() else {
        warn!(channel = "제네릭", "no product name column found, skipping file");
        return Vec::new();
    };

    let patterns = &catalog.generic;
    let mut results = Vec::new();

    for row in data {
        let product_text = row.text(product_col);
        let option_text = cols
            .option
            .as_deref()
            .map(|c| row.text(c))
            .unwrap_or_default();
        if product_text.is_empty() && option_text.is_empty() {
            continue;
        }

        let order_qty = cols
            .quantity
            .as_deref()
            .map(|c| order_quantity(row, c))
            .unwrap_or(1);

        let combined = format!("{product_text} {option_text}");
        if let Some(rule) = patterns.find(&combined) {
            let pack = patterns.pack_count(rule, &combined);
            results.push(ExtractionResult::new(
                rule.product.clone(),
                line_quantity(pack, order_qty),
            ));
        }
    }

    aggregate_results(results)
}

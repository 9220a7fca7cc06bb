use crate::model::{aggregate_results, ExtractionResult, Row};
use crate::parsing::header::expect_header;
use crate::parsing::values::{line_quantity, order_quantity};
use crate::rules::catalog::ProductCatalog;

// Layout: A=date, B=order no, C=vendor, D=product name, E=quantity
const PRODUCT: &str = "D";
const QUANTITY: &str = "E";

/// 아이원 purchase orders: the pack size is part of the product name
/// ("국내산 현미 뻥튀기 쌀과자 70gx5팩").
pub fn parse(rows: &[Row], catalog: &ProductCatalog) -> Vec<ExtractionResult> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    if !expect_header("아이원", header, &[(PRODUCT, "상품명")]) {
        return Vec::new();
    }

    let patterns = &catalog.iwon;
    let mut results = Vec::new();

    for row in data {
        let product_name = row.text(PRODUCT);
        if product_name.is_empty() {
            continue;
        }
        let order_qty = order_quantity(row, QUANTITY);

        if let Some(rule) = patterns.find(&product_name) {
            let pack = patterns.pack_count(rule, &product_name);
            results.push(ExtractionResult::new(
                rule.product.clone(),
                line_quantity(pack, order_qty),
            ));
        }
    }

    aggregate_results(results)
}

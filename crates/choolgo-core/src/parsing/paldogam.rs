use crate::model::{aggregate_results, ExtractionResult, Row};
use crate::parsing::header::expect_header;
use crate::parsing::values::{line_quantity, order_quantity};
use crate::rules::catalog::ProductCatalog;

// Layout: J=product name, L=option name, N=quantity
const PRODUCT: &str = "J";
const OPTION: &str = "L";
const QUANTITY: &str = "N";

pub fn parse(rows: &[Row], catalog: &ProductCatalog) -> Vec<ExtractionResult> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    if !expect_header("팔도감", header, &[(PRODUCT, "상품명"), (OPTION, "옵션")]) {
        return Vec::new();
    }

    let patterns = &catalog.paldogam;
    let mut results = Vec::new();

    for row in data {
        let option = row.text(OPTION);
        if option.is_empty() {
            continue;
        }
        let order_qty = order_quantity(row, QUANTITY);

        if let Some(rule) = patterns.find(&option) {
            let pack = patterns.pack_count(rule, &option);
            results.push(ExtractionResult::new(
                rule.product.clone(),
                line_quantity(pack, order_qty),
            ));
        }
    }

    aggregate_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::test_support::*;

    fn header() -> Row {
        row(&[("C", "수령인"), ("J", "상품명"), ("L", "옵션명"), ("N", "수량")])
    }

    #[test]
    fn test_option_pack_count() {
        let rows = vec![
            header(),
            row(&[("J", "현미누룽지"), ("L", "현미누룽지 6봉"), ("N", "2")]),
            row(&[("J", "현미누룽지"), ("L", "누룽지 낱개"), ("N", "1")]),
        ];
        let results = parse(&rows, &catalog());
        assert_eq!(results, vec![ExtractionResult::new("@온도감 현미누룽지", 13)]);
    }

    #[test]
    fn test_requires_both_header_cells() {
        let rows = vec![
            row(&[("J", "상품명"), ("L", "수량")]),
            row(&[("L", "누룽지 6봉")]),
        ];
        assert!(parse(&rows, &catalog()).is_empty());
    }
}

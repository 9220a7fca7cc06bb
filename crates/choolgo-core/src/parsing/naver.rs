use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;

use crate::model::{aggregate_results, ExtractionResult, Row};
use crate::parsing::assorted::distribute;
use crate::parsing::header::expect_header;
use crate::parsing::values::{line_quantity, order_quantity};
use crate::rules::catalog::{resolve_type, ProductCatalog};

// Layout: A=recipient, D=product name, E=option info, F=quantity
const PRODUCT: &str = "D";
const OPTION: &str = "E";
const QUANTITY: &str = "F";

/// "선물세트2호(종합12봉)"
static GIFT_SET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"선물세트\d*호\((\S+?)(\d+)봉\)").expect("valid gift set regex"));

/// "선택1.: ★현미누룽지 4봉", repeated within one cell.
static CHOICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"선택\d+\.\s*[:：]?\s*★?(\S+?누룽지|뻥튀기|서리태)\s*(\d+)\s*봉")
        .expect("valid choice regex")
});

/// "종류: 강황누룽지 1봉"
static KIND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"종류\s*[:：]?\s*(\S+?누룽지|뻥튀기|서리태)\s*(\d+)\s*봉").expect("valid kind regex")
});

/// Smart Store exports (both 직택배 and 팔도감 folders).
///
/// Option cells are tried as gift set, then multi-choice, then single kind,
/// then the catalog's plain patterns.
pub fn parse(rows: &[Row], catalog: &ProductCatalog) -> Vec<ExtractionResult> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    if !expect_header("네이버", header, &[(PRODUCT, "상품명"), (OPTION, "옵션")]) {
        return Vec::new();
    }

    let mut results = Vec::new();

    for row in data {
        let option = row.text(OPTION);
        if option.is_empty() {
            continue;
        }
        let order_qty = order_quantity(row, QUANTITY);

        if let Some(c) = GIFT_SET.captures(&option) {
            let kind = &c[1];
            let qty = line_quantity(count(&c, 2), order_qty);
            if kind == "종합" {
                results.extend(distribute(qty, &catalog.assorted));
            } else if let Some(product) = resolve(catalog, kind) {
                results.push(ExtractionResult::new(product, qty));
            }
            continue;
        }

        let mut has_choice = false;
        for c in CHOICE.captures_iter(&option) {
            has_choice = true;
            if let Some(product) = resolve(catalog, &c[1]) {
                results.push(ExtractionResult::new(
                    product,
                    line_quantity(count(&c, 2), order_qty),
                ));
            }
        }
        if has_choice {
            continue;
        }

        if let Some(c) = KIND.captures(&option) {
            if let Some(product) = resolve(catalog, &c[1]) {
                results.push(ExtractionResult::new(
                    product,
                    line_quantity(count(&c, 2), order_qty),
                ));
            }
            continue;
        }

        let patterns = &catalog.naver;
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

fn resolve<'a>(catalog: &'a ProductCatalog, kind: &str) -> Option<&'a str> {
    let product = resolve_type(&catalog.naver_types, kind);
    if product.is_none() {
        warn!(channel = "네이버", kind, "product type mapping failed, dropping");
    }
    product
}

fn count(c: &Captures<'_>, group: usize) -> u32 {
    c.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

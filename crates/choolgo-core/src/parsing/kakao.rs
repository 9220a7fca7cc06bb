use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::warn;

use crate::model::{aggregate_results, ExtractionResult, Row};
use crate::parsing::assorted::distribute;
use crate::parsing::header::expect_header;
use crate::parsing::normalize::clean_option;
use crate::parsing::values::{line_quantity, order_quantity};
use crate::rules::catalog::{resolve_type, ProductCatalog};

// Layout: E=product, F=option, G=quantity
const OPTION: &str = "F";
const QUANTITY: &str = "G";

/// "현미누룽지5봉+귀리누룽지 5봉 추가 증정": main type/count, bonus type/count.
static BONUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(\d+)봉\s*\+\s*(.+?)\s*(\d+)\s*봉\s*추가\s*증정$")
        .expect("valid bonus regex")
});

static PUFFED_RICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"현미뻥튀기쌀과자(\d+)봉").expect("valid puffed rice regex"));

static BLACK_BEAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"서리태\s*(\d+)봉").expect("valid black bean regex"));

static NURUNGJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(현미|귀리|강황|검정깨|코코넛|종합)누룽지\s*(\d+)봉").expect("valid nurungji regex")
});

pub fn parse(rows: &[Row], catalog: &ProductCatalog) -> Vec<ExtractionResult> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    if !expect_header("카카오", header, &[(OPTION, "옵션")]) {
        return Vec::new();
    }

    let mut results = Vec::new();

    for row in data {
        let option = row.text(OPTION);
        if option.is_empty() {
            continue;
        }
        let order_qty = order_quantity(row, QUANTITY);
        let cleaned = clean_option(&option);

        if let Some(c) = BONUS.captures(&cleaned) {
            let main_qty = line_quantity(count(&c, 2), order_qty);
            let bonus_qty = line_quantity(count(&c, 4), order_qty);
            add_from_type(&mut results, c[1].trim(), main_qty, catalog);
            add_from_type(&mut results, c[3].trim(), bonus_qty, catalog);
            continue;
        }

        if let Some(c) = PUFFED_RICE.captures(&cleaned) {
            add_from_type(&mut results, "현미뻥튀기", line_quantity(count(&c, 1), order_qty), catalog);
            continue;
        }

        if let Some(c) = BLACK_BEAN.captures(&cleaned) {
            add_from_type(&mut results, "서리태", line_quantity(count(&c, 1), order_qty), catalog);
            continue;
        }

        if let Some(c) = NURUNGJI.captures(&cleaned) {
            let kind = format!("{}누룽지", &c[1]);
            add_from_type(&mut results, &kind, line_quantity(count(&c, 2), order_qty), catalog);
        }
    }

    aggregate_results(results)
}

/// Resolve a type phrase to a product; "종합" spreads over the assorted list.
fn add_from_type(
    results: &mut Vec<ExtractionResult>,
    kind: &str,
    quantity: u32,
    catalog: &ProductCatalog,
) {
    if let Some(product) = resolve_type(&catalog.kakao_types, kind) {
        results.push(ExtractionResult::new(product, quantity));
        return;
    }

    if kind.contains("종합") {
        results.extend(distribute(quantity, &catalog.assorted));
        return;
    }

    warn!(channel = "카카오", kind, quantity, "product type mapping failed, dropping");
}

fn count(c: &Captures<'_>, group: usize) -> u32 {
    c.get(group)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

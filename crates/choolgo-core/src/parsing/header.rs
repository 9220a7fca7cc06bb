use tracing::warn;

use crate::model::Row;

/// True when the header cell at `column` contains `keyword`.
pub fn header_contains(header: &Row, column: &str, keyword: &str) -> bool {
    header.text(column).contains(keyword)
}

/// Check every `(column, keyword)` pair; log a header mismatch on failure.
pub fn expect_header(channel: &str, header: &Row, checks: &[(&str, &str)]) -> bool {
    for (column, keyword) in checks {
        if !header_contains(header, column, keyword) {
            warn!(
                channel,
                column,
                keyword,
                actual = %header.text(column),
                "header mismatch, skipping file"
            );
            return false;
        }
    }
    true
}

/// Product/option/quantity columns discovered from a generic header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectedColumns {
    pub product: Option<String>,
    pub option: Option<String>,
    pub quantity: Option<String>,
}

/// Scan header cells in column order.
///
/// The product column is the last one naming a product (상품명 / 품목명);
/// option and quantity take the first match. A cell claimed as the product
/// column is not considered for the others.
pub fn detect_columns(header: &Row) -> DetectedColumns {
    let mut cols = DetectedColumns::default();

    for (label, cell) in header.iter() {
        let s = cell.to_string();
        let s = s.trim();
        if s.contains("상품명") || s == "품목명" {
            cols.product = Some(label.to_string());
        } else if s.contains("옵션") && cols.option.is_none() {
            cols.option = Some(label.to_string());
        } else if is_quantity_header(s) && cols.quantity.is_none() {
            cols.quantity = Some(label.to_string());
        }
    }

    cols
}

fn is_quantity_header(s: &str) -> bool {
    s == "수량" || s.contains("내품수량") || s.contains("수량(")
}

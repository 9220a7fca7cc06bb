use tracing::{debug, info, warn};

use crate::channel::ChannelId;
use crate::model::{Row, ShippingRow};
use crate::parsing::header::header_contains;
use crate::parsing::values::positive_or_one;
use crate::shipping::column_maps::{auto_detect_columns, column_map_for, ColumnMap, ColumnMapping};

/// Rows scanned for a header when auto-detecting.
const AUTO_DETECT_SCAN_ROWS: usize = 5;

/// Extract shipping-label rows from one file's rows.
///
/// `file_name` picks the vendor layout inside the generic channel. The
/// channel label of the returned rows is left empty for the caller to fill.
pub fn extract_shipping_rows(rows: &[Row], channel: ChannelId, file_name: &str) -> Vec<ShippingRow> {
    if rows.len() < 2 {
        return Vec::new();
    }

    let (map, data_start) = match column_map_for(channel, file_name) {
        ColumnMapping::Fixed(map) => {
            let start = if map.skip_rows > 0 { map.skip_rows } else { 1 };
            (map, start)
        }
        ColumnMapping::AutoDetect => {
            let found = rows
                .iter()
                .take(AUTO_DETECT_SCAN_ROWS)
                .enumerate()
                .find_map(|(i, row)| auto_detect_columns(row).map(|map| (map, i + 1)));
            match found {
                Some((map, start)) => {
                    info!(
                        file = file_name,
                        header_row = start,
                        recipient = %map.recipient_name,
                        "auto-detected shipping columns"
                    );
                    (map, start)
                }
                None => {
                    warn!(file = file_name, "auto-detect failed: no recipient column");
                    return Vec::new();
                }
            }
        }
    };

    if let Some(ref check) = map.header_check {
        if !header_contains(&rows[0], &check.column, &check.keyword) {
            warn!(
                file = file_name,
                column = %check.column,
                keyword = %check.keyword,
                actual = %rows[0].text(&check.column),
                "shipping header mismatch, skipping file"
            );
            return Vec::new();
        }
    }

    let out: Vec<ShippingRow> = rows
        .iter()
        .skip(data_start)
        .filter_map(|row| shipping_row(row, &map))
        .collect();

    debug!(file = file_name, rows = out.len(), "extracted shipping rows");
    out
}

fn shipping_row(row: &Row, map: &ColumnMap) -> Option<ShippingRow> {
    let recipient_name = row.text(&map.recipient_name);
    if recipient_name.is_empty() {
        return None;
    }

    let field = |col: &Option<String>| col.as_deref().map(|c| row.text(c)).unwrap_or_default();

    let product_name = map
        .product_name
        .iter()
        .map(|c| row.text(c))
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let quantity = map
        .quantity
        .as_deref()
        .map(|c| positive_or_one(&row.text(c)))
        .unwrap_or(1);

    Some(ShippingRow {
        recipient_name,
        phone: format_phone(&field(&map.phone)),
        postal_code: field(&map.postal_code),
        address: field(&map.address),
        message: field(&map.message),
        product_name,
        quantity,
        channel: String::new(),
        parts: Vec::new(),
    })
}

/// Re-hyphenate a phone number from its digits.
///
/// 11 digits group 3-4-4, Seoul's 10-digit "02" numbers 2-4-4, other 10
/// digit numbers 3-3-4. Anything else comes back as bare digits.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 if digits.starts_with("02") => {
            format!("02-{}-{}", &digits[2..6], &digits[6..])
        }
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => digits,
    }
}

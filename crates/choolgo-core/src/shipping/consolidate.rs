use serde::Serialize;
use std::collections::HashMap;

use crate::model::ShippingRow;
use crate::rules::schema::NameMapping;

/// Joins "name qty" entries in a combined product description.
pub const PART_SEPARATOR: &str = ", ";
const MESSAGE_SEPARATOR: &str = " / ";
const CHANNEL_SEPARATOR: &str = "/";

/// Short name of the first mapping whose pattern occurs in `original`.
/// `mappings` must already be ordered by descending priority.
pub fn apply_name_mapping<'a>(original: &'a str, mappings: &'a [NameMapping]) -> &'a str {
    if original.is_empty() {
        return original;
    }
    mappings
        .iter()
        .find(|m| original.contains(m.pattern.as_str()))
        .map(|m| m.short_name.as_str())
        .unwrap_or(original)
}

/// Merge rows addressed to the same recipient (name + phone + address).
///
/// Groups come out in first-seen order. Each keeps the first row's
/// name, phone, postal code and address; products are renamed through
/// `mappings` and summed per short name.
pub fn consolidate_shipping(rows: &[ShippingRow], mappings: &[NameMapping]) -> Vec<ShippingRow> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<&ShippingRow>> = Vec::new();

    for row in rows {
        let key = row.recipient_key();
        match index.get(&key) {
            Some(&i) => groups[i].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }

    groups
        .into_iter()
        .map(|group| merge_group(&group, mappings))
        .collect()
}

fn merge_group(group: &[&ShippingRow], mappings: &[NameMapping]) -> ShippingRow {
    let first = group[0];

    let mut products: Vec<(String, u32)> = Vec::new();
    for row in group {
        for (short, qty) in product_parts(row, mappings) {
            match products.iter_mut().find(|(n, _)| n.as_str() == short) {
                Some((_, total)) => *total = total.saturating_add(qty),
                None => products.push((short.to_string(), qty)),
            }
        }
    }

    let quantity = products.iter().fold(0u32, |acc, (_, q)| acc.saturating_add(*q));
    let product_name = products
        .iter()
        .map(|(name, qty)| format!("{name} {qty}"))
        .collect::<Vec<_>>()
        .join(PART_SEPARATOR);

    ShippingRow {
        recipient_name: first.recipient_name.clone(),
        phone: first.phone.clone(),
        postal_code: first.postal_code.clone(),
        address: first.address.clone(),
        message: distinct_joined(group.iter().map(|r| r.message.as_str()), MESSAGE_SEPARATOR),
        product_name,
        quantity,
        channel: distinct_joined(group.iter().map(|r| r.channel.as_str()), CHANNEL_SEPARATOR),
        parts: products,
    }
}

/// Short names and counts carried by one row. Rows that were already
/// consolidated contribute their breakdown as is; any other row is a single
/// product whose whole description goes through the mappings.
fn product_parts<'a>(row: &'a ShippingRow, mappings: &'a [NameMapping]) -> Vec<(&'a str, u32)> {
    if row.parts.is_empty() {
        vec![(apply_name_mapping(&row.product_name, mappings), row.quantity.max(1))]
    } else {
        row.parts.iter().map(|(name, qty)| (name.as_str(), *qty)).collect()
    }
}

fn distinct_joined<'a>(values: impl Iterator<Item = &'a str>, separator: &str) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for v in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !seen.contains(&v) {
            seen.push(v);
        }
    }
    seen.join(separator)
}

/// A product text that no name mapping rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedProduct {
    pub original_name: String,
    pub count: usize,
}

/// Product texts left unmapped, most frequent first.
pub fn find_unmapped_products(rows: &[ShippingRow], mappings: &[NameMapping]) -> Vec<UnmappedProduct> {
    let mut out: Vec<UnmappedProduct> = Vec::new();

    for row in rows {
        let original = row.product_name.as_str();
        if original.is_empty() || mappings.iter().any(|m| original.contains(m.pattern.as_str())) {
            continue;
        }
        match out.iter_mut().find(|u| u.original_name == original) {
            Some(u) => u.count += 1,
            None => out.push(UnmappedProduct {
                original_name: original.to_string(),
                count: 1,
            }),
        }
    }

    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pattern: &str, short_name: &str) -> NameMapping {
        NameMapping {
            pattern: pattern.to_string(),
            short_name: short_name.to_string(),
            priority: 0,
        }
    }

    fn ship(name: &str, product: &str, qty: u32) -> ShippingRow {
        ShippingRow {
            recipient_name: name.to_string(),
            phone: "010-1111-2222".to_string(),
            postal_code: "12345".to_string(),
            address: "서울시 중구 1".to_string(),
            product_name: product.to_string(),
            quantity: qty,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_mapping_wins() {
        let mappings = vec![mapping("현미뻥튀기", "현미뻥"), mapping("뻥튀기", "뻥")];
        assert_eq!(apply_name_mapping("우리곡간 현미뻥튀기 5봉", &mappings), "현미뻥");
        assert_eq!(apply_name_mapping("서리태", &mappings), "서리태");
        assert_eq!(apply_name_mapping("", &mappings), "");
    }

    #[test]
    fn test_merge_same_recipient() {
        let rows = vec![ship("홍길동", "A", 5), ship("홍길동", "B", 3)];
        let out = consolidate_shipping(&rows, &[mapping("A", "Apple")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].product_name, "Apple 5, B 3");
        assert_eq!(out[0].quantity, 8);
    }

    #[test]
    fn test_same_short_name_sums() {
        let rows = vec![
            ship("홍길동", "현미뻥튀기 5봉", 2),
            ship("홍길동", "현미뻥튀기 10봉", 1),
        ];
        let out = consolidate_shipping(&rows, &[mapping("현미뻥튀기", "현미뻥")]);
        assert_eq!(out[0].product_name, "현미뻥 3");
        assert_eq!(out[0].quantity, 3);
    }

    #[test]
    fn test_messages_and_channels_deduplicated() {
        let mut a = ship("홍길동", "A", 1);
        a.message = " 문 앞 ".to_string();
        a.channel = "카카오".to_string();
        let mut b = ship("홍길동", "B", 1);
        b.message = "문 앞".to_string();
        b.channel = "팔도감".to_string();
        let mut c = ship("홍길동", "C", 1);
        c.message = "경비실".to_string();
        c.channel = "카카오".to_string();

        let out = consolidate_shipping(&[a, b, c], &[]);
        assert_eq!(out[0].message, "문 앞 / 경비실");
        assert_eq!(out[0].channel, "카카오/팔도감");
    }

    #[test]
    fn test_first_postal_code_wins() {
        let a = ship("홍길동", "A", 1);
        let mut b = ship("홍길동", "B", 1);
        b.postal_code = "99999".to_string();
        let out = consolidate_shipping(&[a, b], &[]);
        assert_eq!(out[0].postal_code, "12345");
    }

    #[test]
    fn test_differently_formatted_phones_not_merged() {
        let a = ship("홍길동", "A", 1);
        let mut b = ship("홍길동", "A", 1);
        b.phone = "01011112222".to_string();
        assert_eq!(consolidate_shipping(&[a, b], &[]).len(), 2);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let rows = vec![ship("을", "A", 1), ship("갑", "A", 1), ship("을", "B", 1)];
        let out = consolidate_shipping(&rows, &[]);
        let names: Vec<&str> = out.iter().map(|r| r.recipient_name.as_str()).collect();
        assert_eq!(names, vec!["을", "갑"]);
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let mappings = vec![mapping("A", "Apple")];
        let rows = vec![
            ship("홍길동", "A", 5),
            ship("홍길동", "B", 3),
            ship("김영희", "현미누룽지 세트", 2),
            ship("박철수", "", 1),
        ];
        let once = consolidate_shipping(&rows, &mappings);
        let twice = consolidate_shipping(&once, &mappings);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_trailing_number_stays_part_of_product_text() {
        let out = consolidate_shipping(&[ship("홍길동", "선물세트 2", 2)], &[mapping("세트 2", "X")]);
        assert_eq!(out[0].product_name, "X 2");

        let rows = vec![ship("홍길동", "누룽지 2", 2), ship("홍길동", "누룽지", 3)];
        let out = consolidate_shipping(&rows, &[]);
        assert_eq!(out[0].product_name, "누룽지 2 2, 누룽지 3");
        assert_eq!(out[0].quantity, 5);
    }

    #[test]
    fn test_reconsolidation_does_not_remap_short_names() {
        let mappings = vec![mapping("A", "Apple"), mapping("pp", "Other")];
        let once = consolidate_shipping(&[ship("홍길동", "A", 5)], &mappings);
        let twice = consolidate_shipping(&once, &mappings);
        assert_eq!(twice[0].product_name, "Apple 5");
    }

    #[test]
    fn test_unmapped_products_by_count() {
        let rows = vec![
            ship("a", "서리태", 1),
            ship("b", "현미뻥튀기", 1),
            ship("c", "검정깨", 1),
            ship("d", "검정깨", 1),
            ship("e", "", 1),
        ];
        let unmapped = find_unmapped_products(&rows, &[mapping("뻥튀기", "뻥")]);
        assert_eq!(
            unmapped,
            vec![
                UnmappedProduct { original_name: "검정깨".into(), count: 2 },
                UnmappedProduct { original_name: "서리태".into(), count: 1 },
            ]
        );
    }
}

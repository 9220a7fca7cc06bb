use crate::model::Row;

/// Leading integer of a cell's text, the way hand-typed order sheets hold
/// quantities: surrounding whitespace and a sign are allowed, trailing text
/// is ignored ("3개" -> 3). `None` when no digits lead the text.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Positive integer from text, or 1 when missing, non-numeric or non-positive.
pub fn positive_or_one(s: &str) -> u32 {
    parse_leading_int(s)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1)
}

/// Order quantity from a row's quantity column (default 1).
pub fn order_quantity(row: &Row, column: &str) -> u32 {
    positive_or_one(&row.text(column))
}

/// Units for one extracted line: count x order quantity, never below 1.
pub fn line_quantity(count: u32, order_qty: u32) -> u32 {
    count.saturating_mul(order_qty).max(1)
}

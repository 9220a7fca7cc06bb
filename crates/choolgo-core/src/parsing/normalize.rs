use regex::Regex;
use std::sync::LazyLock;

static OPTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^옵션\s*-\s*").expect("valid option prefix regex"));

static PRICE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d[\d,]*원\)").expect("valid price tag regex"));

/// Strip the "옵션 - " prefix and the first "(12,900원)" price tag from an
/// option cell.
pub fn clean_option(option: &str) -> String {
    let without_prefix = OPTION_PREFIX.replace(option, "");
    PRICE_TAG.replace(&without_prefix, "").trim().to_string()
}

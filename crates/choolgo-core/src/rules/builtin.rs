use crate::error::ChoolgoError;
use crate::rules::catalog::ProductCatalog;
use crate::rules::parse_catalog_str;

const DEFAULT_CATALOG_JSON: &str = include_str!("../../../../rules/product-catalog.json");

/// Name of the embedded catalog, for listings.
pub const BUILTIN_NAME: &str = "default";

/// Load and compile the embedded product catalog.
pub fn load_builtin() -> Result<ProductCatalog, ChoolgoError> {
    let def = parse_catalog_str(DEFAULT_CATALOG_JSON)?;
    ProductCatalog::compile(&def)
}

/// Raw JSON of the embedded catalog (for `catalog show`).
pub fn builtin_json() -> &'static str {
    DEFAULT_CATALOG_JSON
}

pub mod builtin;
pub mod catalog;
pub mod schema;

use crate::error::ChoolgoError;
use catalog::ProductCatalog;
use schema::{CatalogDef, NameMapping, PatternSetDef};
use std::path::Path;

/// Load, validate and compile a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<ProductCatalog, ChoolgoError> {
    let content = std::fs::read_to_string(path).map_err(|e| ChoolgoError::CatalogLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let def: CatalogDef =
        serde_json::from_str(&content).map_err(|e| ChoolgoError::CatalogLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_catalog(&def)?;
    ProductCatalog::compile(&def)
}

/// Parse a catalog definition from a JSON string (no file path context).
pub fn parse_catalog_str(json: &str) -> Result<CatalogDef, ChoolgoError> {
    let def: CatalogDef = serde_json::from_str(json)?;
    validate_catalog(&def)?;
    Ok(def)
}

/// Validate that a catalog is well-formed.
pub fn validate_catalog(def: &CatalogDef) -> Result<(), ChoolgoError> {
    if def.assorted.is_empty() {
        return Err(ChoolgoError::CatalogInvalid(
            "assorted product list must not be empty".into(),
        ));
    }

    if def.assorted.iter().any(|p| p.trim().is_empty()) {
        return Err(ChoolgoError::CatalogInvalid(
            "assorted product names must not be empty".into(),
        ));
    }

    for (channel, set) in [
        ("generic", &def.generic),
        ("iwon", &def.iwon),
        ("naver", &def.naver),
        ("paldogam", &def.paldogam),
    ] {
        validate_pattern_set(channel, set)?;
    }

    for (channel, aliases) in [("kakao", &def.kakao_types), ("naver", &def.naver_types)] {
        if aliases.is_empty() {
            return Err(ChoolgoError::CatalogInvalid(format!(
                "{channel} type aliases must not be empty"
            )));
        }
        if let Some(a) = aliases
            .iter()
            .find(|a| a.keyword.is_empty() || a.product.is_empty())
        {
            return Err(ChoolgoError::CatalogInvalid(format!(
                "{channel} type alias '{}' has an empty keyword or product",
                a.keyword
            )));
        }
    }

    Ok(())
}

fn validate_pattern_set(channel: &str, set: &PatternSetDef) -> Result<(), ChoolgoError> {
    if set.rules.is_empty() {
        return Err(ChoolgoError::CatalogInvalid(format!(
            "{channel} rules must not be empty"
        )));
    }

    for rule in &set.rules {
        if rule.pattern.is_empty() {
            return Err(ChoolgoError::CatalogInvalid(format!(
                "{channel} rule for '{}' has an empty pattern",
                rule.product
            )));
        }
        if rule.product.trim().is_empty() {
            return Err(ChoolgoError::CatalogInvalid(format!(
                "{channel} rule '{}' has no product",
                rule.pattern
            )));
        }
    }

    Ok(())
}

/// Load name mappings from a JSON array, ordered by descending priority.
pub fn load_name_mappings(path: &Path) -> Result<Vec<NameMapping>, ChoolgoError> {
    let content = std::fs::read_to_string(path).map_err(|e| ChoolgoError::MappingsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_name_mappings(&content).map_err(|e| ChoolgoError::MappingsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse name mappings, dropping entries without a pattern. Equal priorities
/// keep their file order.
pub fn parse_name_mappings(json: &str) -> Result<Vec<NameMapping>, ChoolgoError> {
    let mut mappings: Vec<NameMapping> = serde_json::from_str(json)?;
    mappings.retain(|m| !m.pattern.is_empty());
    mappings.sort_by(|a, b| b.priority.cmp(&a.priority));
    Ok(mappings)
}

pub mod catalog;
pub mod detect;
pub mod mappings;
pub mod parse;
pub mod process;

use choolgo_core::error::ChoolgoError;
use choolgo_core::rules::builtin::load_builtin;
use choolgo_core::rules::catalog::ProductCatalog;
use choolgo_core::rules::load_catalog;
use std::path::Path;

/// A custom catalog file, or the built-in one.
pub fn catalog_or_builtin(path: Option<&Path>) -> Result<ProductCatalog, ChoolgoError> {
    match path {
        Some(p) => load_catalog(p),
        None => load_builtin(),
    }
}

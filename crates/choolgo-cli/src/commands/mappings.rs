use choolgo_core::error::ChoolgoError;
use choolgo_core::extraction::xlsx::CalamineReader;
use choolgo_core::rules::load_name_mappings;
use choolgo_core::shipping::find_unmapped_products;
use std::path::{Path, PathBuf};

use crate::commands::catalog_or_builtin;
use crate::output;

pub fn check(files: &[PathBuf], mappings: &Path) -> Result<(), ChoolgoError> {
    let mappings = load_name_mappings(mappings)?;
    let catalog = catalog_or_builtin(None)?;
    let reader = CalamineReader::new();

    let mut rows = Vec::new();
    for file in files {
        match choolgo_core::parse_file(file, &reader, &catalog)? {
            Some(parsed) => rows.extend(parsed.shipping),
            None => eprintln!("{}: not an order file, skipped", file.display()),
        }
    }

    let unmapped = find_unmapped_products(&rows, &mappings);
    output::table::print_unmapped(&unmapped, rows.len());
    Ok(())
}

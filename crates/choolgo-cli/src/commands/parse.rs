use choolgo_core::error::ChoolgoError;
use choolgo_core::extraction::xlsx::CalamineReader;
use std::path::Path;

use crate::commands::catalog_or_builtin;
use crate::output;

pub fn run(input_file: &Path, catalog: Option<&Path>, output_format: &str) -> Result<(), ChoolgoError> {
    let catalog = catalog_or_builtin(catalog)?;
    let reader = CalamineReader::new();

    let Some(parsed) = choolgo_core::parse_file(input_file, &reader, &catalog)? else {
        eprintln!("{}: not an order file", input_file.display());
        return Ok(());
    };

    match output_format {
        "json" => output::json::print(&parsed)?,
        _ => println!("{}", output::table::format_parsed(&parsed)),
    }

    Ok(())
}

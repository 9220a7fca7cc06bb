pub mod channel;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ledger;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod rules;
pub mod shipping;
pub mod stock;

use serde::Serialize;
use std::path::{Path, PathBuf};

use channel::filename::FilenameClassifier;
use channel::{file_name, ChannelClassifier, ChannelId};
use error::ChoolgoError;
use extraction::SheetReader;
use model::{ExtractionResult, ShippingRow};
use rules::catalog::ProductCatalog;

/// Everything extracted from one order file, before consolidation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub path: PathBuf,
    pub channel: ChannelId,
    pub channel_name: String,
    pub results: Vec<ExtractionResult>,
    pub shipping: Vec<ShippingRow>,
}

/// Main API entry point: detect the channel of one file, read it and
/// extract both stock deductions and shipping rows.
///
/// Files outside the folder layout are classified by file name. Returns
/// `Ok(None)` for files that are not order files (including Excel lock
/// files). An unreadable spreadsheet yields empty results.
pub fn parse_file(
    path: &Path,
    reader: &dyn SheetReader,
    catalog: &ProductCatalog,
) -> Result<Option<ParsedFile>, ChoolgoError> {
    let classifier = FilenameClassifier::new(ChannelClassifier::standard()?)?;
    let Some(rule) = classifier.detect(path) else {
        return Ok(None);
    };

    let rows = reader.read_rows(path).unwrap_or_default();
    let results = parsing::parse_rows(rule.parser, &rows, catalog);
    let mut shipping = shipping::extract_shipping_rows(&rows, rule.id, &file_name(path));
    for row in &mut shipping {
        row.channel = rule.name.clone();
    }

    Ok(Some(ParsedFile {
        path: path.to_path_buf(),
        channel: rule.id,
        channel_name: rule.name.clone(),
        results,
        shipping,
    }))
}

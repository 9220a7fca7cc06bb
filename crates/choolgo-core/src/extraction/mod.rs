pub mod xlsx;

use std::path::Path;

use crate::model::Row;

/// Trait for spreadsheet reading backends.
pub trait SheetReader: Send + Sync {
    /// Non-blank rows of the first worksheet, keyed by column label.
    ///
    /// Returns `None` when the file cannot be read (corrupt, encrypted with
    /// an unknown password, not a spreadsheet). Callers treat that as a file
    /// with zero rows.
    fn read_rows(&self, path: &Path) -> Option<Vec<Row>>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

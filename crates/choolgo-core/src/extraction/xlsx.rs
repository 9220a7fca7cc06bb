use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ChoolgoError;
use crate::extraction::SheetReader;
use crate::model::{Cell, ColumnLabel, Row};

/// Reads `.xlsx` / `.xls` workbooks with calamine.
#[derive(Debug, Clone, Default)]
pub struct CalamineReader;

impl CalamineReader {
    pub fn new() -> Self {
        CalamineReader
    }

    /// Like `read_rows`, but reports why a file could not be read.
    pub fn try_read_rows(&self, path: &Path) -> Result<Vec<Row>, ChoolgoError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| ChoolgoError::Spreadsheet {
            path: path.to_path_buf(),
            reason: format!("failed to open workbook: {e}"),
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ChoolgoError::Spreadsheet {
                path: path.to_path_buf(),
                reason: "workbook has no sheets".into(),
            })?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ChoolgoError::Spreadsheet {
                path: path.to_path_buf(),
                reason: format!("failed to read sheet '{sheet_name}': {e}"),
            })?;

        Ok(range_to_rows(&range))
    }
}

impl SheetReader for CalamineReader {
    fn read_rows(&self, path: &Path) -> Option<Vec<Row>> {
        match self.try_read_rows(path) {
            Ok(rows) => {
                debug!(path = %path.display(), rows = rows.len(), "read spreadsheet");
                Some(rows)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable spreadsheet");
                None
            }
        }
    }

    fn backend_name(&self) -> &str {
        "calamine"
    }
}

/// Convert a worksheet range into labelled rows, dropping blank rows.
pub fn range_to_rows(range: &Range<Data>) -> Vec<Row> {
    // The used range may not start at column A
    let col_offset = range.start().map(|(_, c)| c as usize).unwrap_or(0);

    range
        .rows()
        .filter_map(|cells| {
            let mut row = Row::new();
            for (i, cell) in cells.iter().enumerate() {
                if let Some(value) = convert_cell(cell) {
                    row.insert(ColumnLabel::from_index(col_offset + i), value);
                }
            }
            (!row.is_empty()).then_some(row)
        })
        .collect()
}

fn convert_cell(cell: &Data) -> Option<Cell> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Cell::Text(s.clone())),
        Data::Float(f) => Some(Cell::Number(*f)),
        Data::Int(i) => Some(Cell::Number(*i as f64)),
        Data::Bool(b) => Some(Cell::Text(b.to_string())),
        _ => Some(Cell::Text(format!("{cell}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_reads_rows_with_column_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "상품명").unwrap();
        sheet.write_string(0, 2, "수량").unwrap();
        // row 1 left blank on purpose
        sheet.write_string(2, 1, "서리태 2봉").unwrap();
        sheet.write_number(2, 2, 3.0).unwrap();
        workbook.save(&path).unwrap();

        let rows = CalamineReader::new().read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("B"), "상품명");
        assert_eq!(rows[1].text("B"), "서리태 2봉");
        assert_eq!(rows[1].text("C"), "3");
        assert!(rows[1].get("A").is_none());
    }

    #[test]
    fn test_unreadable_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        assert!(CalamineReader::new().read_rows(&path).is_none());
        assert!(matches!(
            CalamineReader::new().try_read_rows(&path),
            Err(ChoolgoError::Spreadsheet { .. })
        ));
    }
}

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::channel::EXCEL_LOCK_PREFIX;
use crate::error::ChoolgoError;
use crate::extraction::xlsx::CalamineReader;
use crate::model::{Row, ShippingRow, KEY_SEPARATOR};
use crate::parsing::values::positive_or_one;

/// Courier upload form columns, in order.
pub const HEADERS: [&str; 10] = [
    "받는분성명",
    "받는분전화번호",
    "받는분우편번호",
    "받는분주소(전체, 분할)",
    "배송메세지1",
    "품목명",
    "내품수량",
    "운송장",
    "택배사",
    "채널",
];

const COLUMN_WIDTHS: [f64; 10] = [10.0, 15.0, 8.0, 50.0, 25.0, 40.0, 8.0, 15.0, 10.0, 14.0];

pub const SHEET_NAME: &str = "직택";
const FILE_SUFFIX: &str = "_택배양식.xlsx";

/// One line of the courier form. Invoice and courier are filled in later
/// by the carrier's system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourierRow {
    #[serde(flatten)]
    pub shipping: ShippingRow,
    #[serde(default)]
    pub invoice: String,
    #[serde(default)]
    pub courier: String,
}

impl From<ShippingRow> for CourierRow {
    fn from(shipping: ShippingRow) -> Self {
        CourierRow {
            shipping,
            ..Default::default()
        }
    }
}

impl CourierRow {
    fn from_sheet_row(row: &Row) -> Self {
        CourierRow {
            shipping: ShippingRow {
                recipient_name: row.text("A"),
                phone: row.text("B"),
                postal_code: row.text("C"),
                address: row.text("D"),
                message: row.text("E"),
                product_name: row.text("F"),
                quantity: positive_or_one(&row.text("G")),
                channel: row.text("J"),
                parts: Vec::new(),
            },
            invoice: row.text("H"),
            courier: row.text("I"),
        }
    }
}

/// Recipient-level identity (name|phone|address) of a consolidated row.
pub fn recipient_fingerprint(row: &ShippingRow) -> String {
    [
        row.recipient_name.as_str(),
        row.phone.as_str(),
        row.address.as_str(),
    ]
    .join(KEY_SEPARATOR)
}

/// Append `incoming` to `existing`, skipping rows whose fingerprint is
/// already present. Returns the number of rows added.
pub fn merge_rows(existing: &mut Vec<CourierRow>, incoming: Vec<CourierRow>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|r| r.shipping.fingerprint()).collect();
    let mut added = 0;
    for row in incoming {
        if seen.insert(row.shipping.fingerprint()) {
            existing.push(row);
            added += 1;
        }
    }
    added
}

/// What an append did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum AppendOutcome {
    Written { path: PathBuf, added: usize, total: usize },
    /// Every row was already in the form; the file was left untouched.
    AllDuplicates { path: PathBuf },
    /// The form is open in Excel; rows were parked in the pending file.
    Deferred { pending_path: PathBuf, rows: usize },
}

/// Writes the daily courier form `MMDD_택배양식.xlsx`.
#[derive(Debug, Clone)]
pub struct CourierWriter {
    dir: PathBuf,
}

impl CourierWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn output_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}{FILE_SUFFIX}", date.format("%m%d")))
    }

    pub fn pending_path(&self, date: NaiveDate) -> PathBuf {
        self.output_path(date).with_extension("pending.json")
    }

    /// True when Excel's `~$` lock file sits next to the form.
    pub fn is_locked(&self, date: NaiveDate) -> bool {
        let path = self.output_path(date);
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        self.dir.join(format!("{EXCEL_LOCK_PREFIX}{name}")).exists()
    }

    /// Append rows to the form for `date`, deduplicating by fingerprint.
    pub fn append(&self, date: NaiveDate, rows: &[ShippingRow]) -> Result<AppendOutcome, ChoolgoError> {
        let path = self.output_path(date);
        let pending_path = self.pending_path(date);
        let incoming: Vec<CourierRow> = rows.iter().cloned().map(CourierRow::from).collect();

        if self.is_locked(date) {
            // A damaged pending file is left alone rather than overwritten
            let mut pending = read_pending(&pending_path)?;
            let count = incoming.len();
            pending.extend(incoming);
            write_pending(&pending_path, &pending)?;
            info!(
                pending = %pending_path.display(),
                rows = count,
                "courier form is open, rows parked in pending file"
            );
            return Ok(AppendOutcome::Deferred {
                pending_path,
                rows: count,
            });
        }

        let mut batch = Vec::new();
        if pending_path.exists() {
            match read_pending(&pending_path) {
                Ok(pending) => {
                    info!(rows = pending.len(), "merging pending courier rows");
                    batch.extend(pending);
                    std::fs::remove_file(&pending_path)?;
                }
                Err(e) => warn!(pending = %pending_path.display(), error = %e, "unreadable pending file"),
            }
        }
        batch.extend(incoming);

        let mut all = read_existing_rows(&path)?;
        let added = merge_rows(&mut all, batch);
        if added == 0 {
            info!(path = %path.display(), "no new courier rows (all duplicates)");
            return Ok(AppendOutcome::AllDuplicates { path });
        }

        std::fs::create_dir_all(&self.dir)?;
        write_form(&path, &all).map_err(|e| ChoolgoError::CourierWrite {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!(path = %path.display(), added, total = all.len(), "courier form updated");
        Ok(AppendOutcome::Written {
            path,
            added,
            total: all.len(),
        })
    }
}

/// Data rows of an existing form (header skipped). Missing file = no rows.
pub fn read_existing_rows(path: &Path) -> Result<Vec<CourierRow>, ChoolgoError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let rows = CalamineReader::new()
        .try_read_rows(path)
        .map_err(|e| ChoolgoError::CourierWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(rows.iter().skip(1).map(CourierRow::from_sheet_row).collect())
}

fn read_pending(path: &Path) -> Result<Vec<CourierRow>, ChoolgoError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ChoolgoError::CourierWrite {
        path: path.to_path_buf(),
        reason: format!("unreadable pending file: {e}"),
    })
}

fn write_pending(path: &Path, rows: &[CourierRow]) -> Result<(), ChoolgoError> {
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn write_form(path: &Path, rows: &[CourierRow]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        sheet.set_column_width(col as u16, width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let s = &row.shipping;
        for (col, value) in [
            &s.recipient_name,
            &s.phone,
            &s.postal_code,
            &s.address,
            &s.message,
            &s.product_name,
        ]
        .into_iter()
        .enumerate()
        {
            sheet.write_string(r, col as u16, value.as_str())?;
        }
        sheet.write_number(r, 6, s.quantity)?;
        sheet.write_string(r, 7, row.invoice.as_str())?;
        sheet.write_string(r, 8, row.courier.as_str())?;
        sheet.write_string(r, 9, s.channel.as_str())?;
    }

    workbook.save(path)?;
    Ok(())
}

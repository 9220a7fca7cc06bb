use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::channel::filename::FilenameClassifier;
use crate::channel::{file_name, ChannelClassifier, ChannelRule};
use crate::config::PipelineConfig;
use crate::error::ChoolgoError;
use crate::extraction::SheetReader;
use crate::ledger::ProcessedLedger;
use crate::model::{ExtractionResult, ShippingRow};
use crate::parsing::parse_rows;
use crate::rules::catalog::ProductCatalog;
use crate::rules::schema::NameMapping;
use crate::shipping::consolidate::UnmappedProduct;
use crate::shipping::{
    consolidate_shipping, extract_shipping_rows, find_unmapped_products, AppendOutcome,
    CourierWriter,
};
use crate::stock::StockSink;

const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    NotSpreadsheet,
    AlreadyProcessed,
    BeforeStartDate,
    NoChannel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileStatus {
    Processed,
    Skipped { reason: SkipReason },
    /// Stock deduction failed; shipping rows were still extracted.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    pub path: PathBuf,
    pub channel: Option<String>,
    #[serde(flatten)]
    pub status: FileStatus,
    pub results: Vec<ExtractionResult>,
    pub shipping_rows: usize,
}

impl FileOutcome {
    fn skipped(path: &Path, reason: SkipReason) -> Self {
        FileOutcome {
            path: path.to_path_buf(),
            channel: None,
            status: FileStatus::Skipped { reason },
            results: Vec::new(),
            shipping_rows: 0,
        }
    }
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    /// Consolidated shipping rows, one per recipient.
    pub shipping: Vec<ShippingRow>,
    pub unmapped: Vec<UnmappedProduct>,
    /// `None` in dry-run mode or when there was nothing to write.
    pub courier: Option<AppendOutcome>,
    /// Set when the courier form could not be written. Stock and the
    /// ledger are already settled by then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_error: Option<String>,
}

impl BatchReport {
    pub fn count(&self, pred: impl Fn(&FileStatus) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.status)).count()
    }
}

/// Runs order files through parsing, stock deduction and shipping
/// extraction one at a time, then consolidates shipping once per batch.
pub struct BatchProcessor<'a> {
    config: PipelineConfig,
    catalog: &'a ProductCatalog,
    reader: &'a dyn SheetReader,
    classifier: FilenameClassifier,
    mappings: Vec<NameMapping>,
    force: bool,
    filename_fallback: bool,
    today: NaiveDate,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        config: PipelineConfig,
        catalog: &'a ProductCatalog,
        reader: &'a dyn SheetReader,
    ) -> Result<Self, ChoolgoError> {
        Ok(Self {
            config,
            catalog,
            reader,
            classifier: FilenameClassifier::new(ChannelClassifier::standard()?)?,
            mappings: Vec::new(),
            force: false,
            filename_fallback: false,
            today: Local::now().date_naive(),
        })
    }

    /// Name mappings, already ordered by descending priority.
    pub fn with_mappings(mut self, mappings: Vec<NameMapping>) -> Self {
        self.mappings = mappings;
        self
    }

    /// Reprocess files the ledger already lists.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Classify files outside the folder layout by file name.
    pub fn filename_fallback(mut self, enabled: bool) -> Self {
        self.filename_fallback = enabled;
        self
    }

    /// Date used to name the courier form.
    pub fn today(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }

    fn detect(&self, path: &Path) -> Option<&ChannelRule> {
        if self.filename_fallback {
            self.classifier.detect(path)
        } else {
            self.classifier.paths().detect_channel(path)
        }
    }

    pub fn run(&self, paths: &[PathBuf], sink: &mut dyn StockSink) -> Result<BatchReport, ChoolgoError> {
        let mut ledger = ProcessedLedger::load(&self.config.ledger_path)?;
        info!(
            files = paths.len(),
            known = ledger.len(),
            backend = self.reader.backend_name(),
            dry_run = self.config.dry_run,
            "batch started"
        );
        let mut report = BatchReport::default();
        let mut shipping = Vec::new();

        for path in paths {
            let outcome = self.process_file(path, &mut ledger, sink, &mut shipping);
            let settled = matches!(outcome.status, FileStatus::Processed | FileStatus::Failed { .. });
            report.files.push(outcome);
            // Deductions for this file are done; persist before touching the next one
            if settled && !self.config.dry_run {
                ledger.save(&self.config.ledger_path)?;
            }
        }

        report.unmapped = find_unmapped_products(&shipping, &self.mappings);
        report.shipping = consolidate_shipping(&shipping, &self.mappings);
        info!(
            files = paths.len(),
            rows = shipping.len(),
            recipients = report.shipping.len(),
            "batch consolidated"
        );

        if !self.config.dry_run && !report.shipping.is_empty() {
            let writer = CourierWriter::new(&self.config.output_dir);
            match writer.append(self.today, &report.shipping) {
                Ok(outcome) => report.courier = Some(outcome),
                Err(e) => {
                    error!(error = %e, "courier form not written");
                    report.courier_error = Some(e.to_string());
                }
            }
        }

        Ok(report)
    }

    fn process_file(
        &self,
        path: &Path,
        ledger: &mut ProcessedLedger,
        sink: &mut dyn StockSink,
        shipping: &mut Vec<ShippingRow>,
    ) -> FileOutcome {
        if !is_spreadsheet(path) {
            return FileOutcome::skipped(path, SkipReason::NotSpreadsheet);
        }

        let key = ledger_key(path);
        if ledger.is_processed(&key) && !self.force {
            debug!(path = %path.display(), "already processed");
            return FileOutcome::skipped(path, SkipReason::AlreadyProcessed);
        }

        if let Some(start) = self.config.start_date {
            if !modified_on_or_after(path, start) {
                debug!(path = %path.display(), %start, "before start date");
                return FileOutcome::skipped(path, SkipReason::BeforeStartDate);
            }
        }

        let Some(rule) = self.detect(path) else {
            debug!(path = %path.display(), "no channel matched");
            return FileOutcome::skipped(path, SkipReason::NoChannel);
        };

        let name = file_name(path);
        info!(file = %name, channel = %rule.name, parser = rule.parser.label(), "processing");

        let rows = self.reader.read_rows(path).unwrap_or_default();
        let results = parse_rows(rule.parser, &rows, self.catalog);
        for r in &results {
            info!(product = %r.product, quantity = r.quantity, "extracted");
        }

        let status = match deduct_all(sink, &results, &rule.name) {
            Ok(()) => {
                ledger.record_success(&key, &rule.name, &results, Utc::now());
                FileStatus::Processed
            }
            Err(e) => {
                error!(file = %name, error = %e, "stock deduction failed");
                ledger.record_failure(&key, &rule.name, &e.to_string(), Utc::now());
                FileStatus::Failed { error: e.to_string() }
            }
        };

        // Shipping runs whether or not deduction succeeded
        let mut rows_out = extract_shipping_rows(&rows, rule.id, &name);
        for row in &mut rows_out {
            row.channel = rule.name.clone();
        }
        let shipping_rows = rows_out.len();
        shipping.extend(rows_out);

        FileOutcome {
            path: path.to_path_buf(),
            channel: Some(rule.name.clone()),
            status,
            results,
            shipping_rows,
        }
    }
}

fn deduct_all(
    sink: &mut dyn StockSink,
    results: &[ExtractionResult],
    channel: &str,
) -> Result<(), ChoolgoError> {
    for r in results {
        sink.deduct(&r.product, r.quantity, channel)?;
    }
    Ok(())
}

/// `.xlsx` / `.xls`, case-insensitive.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.contains(&e.as_str()))
}

/// Absolute path string identifying a file in the ledger.
pub fn ledger_key(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

/// Unreadable metadata counts as too old.
fn modified_on_or_after(path: &Path, start: NaiveDate) -> bool {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => {
            let modified: DateTime<Local> = modified.into();
            modified.date_naive() >= start
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read modification time");
            false
        }
    }
}

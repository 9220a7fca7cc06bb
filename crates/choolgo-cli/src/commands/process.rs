use choolgo_core::config::{parse_date, PipelineConfig};
use choolgo_core::error::ChoolgoError;
use choolgo_core::extraction::xlsx::CalamineReader;
use choolgo_core::pipeline::{is_spreadsheet, BatchProcessor};
use choolgo_core::rules::load_name_mappings;
use choolgo_core::stock::{DryRunSink, StockSink, TallySink};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::commands::catalog_or_builtin;
use crate::output;

/// Order folders under the root. 팔도감/네이버 sits one level deeper.
const ORDER_FOLDERS: [&str; 3] = ["직택배", "카카오", "팔도감"];
const SCAN_DEPTH: usize = 2;

pub struct ProcessArgs {
    pub files: Vec<PathBuf>,
    pub mappings: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
    pub start_date: Option<String>,
    pub dry_run: bool,
    pub force: bool,
    pub by_filename: bool,
    pub output: String,
}

pub fn run(args: ProcessArgs) -> Result<(), ChoolgoError> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(dir) = args.dir {
        if args.out_dir.is_none() && std::env::var_os("CHOOLGO_OUTPUT_DIR").is_none() {
            config.output_dir = dir.clone();
        }
        config.choolgo_dir = dir;
    }
    if let Some(out_dir) = args.out_dir {
        config.output_dir = out_dir;
    }
    if let Some(ledger) = args.ledger {
        config.ledger_path = ledger;
    }
    if let Some(date) = args.start_date {
        config.start_date = Some(parse_date("--start-date", &date)?);
    }
    config.dry_run |= args.dry_run;

    let catalog = catalog_or_builtin(args.catalog.as_deref())?;
    let mappings = match args.mappings {
        Some(ref path) => load_name_mappings(path)?,
        None => Vec::new(),
    };

    let files = if args.files.is_empty() {
        collect_order_files(&config.choolgo_dir)
    } else {
        args.files
    };
    info!(files = files.len(), dry_run = config.dry_run, "starting batch");

    let dry_run = config.dry_run;
    let reader = CalamineReader::new();
    let processor = BatchProcessor::new(config, &catalog, &reader)?
        .with_mappings(mappings)
        .force(args.force)
        .filename_fallback(args.by_filename);

    let mut tally = TallySink::new();
    let mut dry = DryRunSink;
    let sink: &mut dyn StockSink = if dry_run { &mut dry } else { &mut tally };
    let report = processor.run(&files, sink)?;

    match args.output.as_str() {
        "json" => output::json::print(&report)?,
        _ => {
            output::table::print_report(&report);
            if !dry_run {
                output::table::print_totals(tally.totals());
            }
        }
    }

    Ok(())
}

/// Spreadsheets under the order folders of `root`, sorted by path.
/// Hidden entries are skipped; unreadable ones are logged and skipped.
fn collect_order_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for folder in ORDER_FOLDERS {
        let dir = root.join(folder);
        if !dir.is_dir() {
            continue;
        }
        let walker = WalkDir::new(&dir)
            .max_depth(SCAN_DEPTH)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_spreadsheet(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "cannot read order folder entry"),
            }
        }
    }
    files.sort();
    files
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "choolgo",
    version,
    about = "Order spreadsheet ingestion: stock deduction and courier forms"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which channel each file belongs to
    Detect {
        /// Order files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Fall back to file-name keywords outside the folder layout
        #[arg(long)]
        by_filename: bool,
    },
    /// Parse one order file without deducting stock or writing anything
    Parse {
        /// Path to an .xlsx/.xls order file
        input_file: PathBuf,

        /// Custom product catalog (JSON)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Process a batch: deduct stock, consolidate shipping, write the courier form
    Process {
        /// Order files (default: everything under the order folders)
        files: Vec<PathBuf>,

        /// Product name mappings (JSON array of {pattern, shortName, priority})
        #[arg(short, long, value_name = "FILE")]
        mappings: Option<PathBuf>,

        /// Custom product catalog (JSON)
        #[arg(short, long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Order root folder [env: CHOOLGO_DIR]
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Courier form output folder [env: CHOOLGO_OUTPUT_DIR]
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Processed-file ledger [env: CHOOLGO_LEDGER]
        #[arg(long, value_name = "FILE")]
        ledger: Option<PathBuf>,

        /// Ignore files modified before this date, YYYY-MM-DD [env: START_DATE]
        #[arg(long, value_name = "DATE")]
        start_date: Option<String>,

        /// Parse only: no deduction, no courier form, no ledger [env: CHOOLGO_DRY_RUN]
        #[arg(long)]
        dry_run: bool,

        /// Reprocess files already in the ledger
        #[arg(long)]
        force: bool,

        /// Classify files outside the folder layout by file name
        #[arg(long)]
        by_filename: bool,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate product catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Check product name mappings against order files
    Mappings {
        #[command(subcommand)]
        action: MappingsAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Summarize the built-in catalog
    List,
    /// Print the built-in catalog JSON
    Show,
    /// Validate a custom catalog file
    Validate {
        /// Path to JSON catalog file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum MappingsAction {
    /// List product texts no mapping rewrites
    Check {
        /// Order files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Product name mappings (JSON)
        #[arg(short, long, value_name = "FILE")]
        mappings: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect { paths, by_filename } => commands::detect::run(&paths, by_filename),
        Commands::Parse {
            input_file,
            catalog,
            output,
        } => commands::parse::run(&input_file, catalog.as_deref(), &output),
        Commands::Process {
            files,
            mappings,
            catalog,
            dir,
            out_dir,
            ledger,
            start_date,
            dry_run,
            force,
            by_filename,
            output,
        } => commands::process::run(commands::process::ProcessArgs {
            files,
            mappings,
            catalog,
            dir,
            out_dir,
            ledger,
            start_date,
            dry_run,
            force,
            by_filename,
            output,
        }),
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(),
            CatalogAction::Show => commands::catalog::show(),
            CatalogAction::Validate { file } => commands::catalog::validate(&file),
        },
        Commands::Mappings { action } => match action {
            MappingsAction::Check { files, mappings } => commands::mappings::check(&files, &mappings),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

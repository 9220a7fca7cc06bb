use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChoolgoError {
    #[error("failed to read spreadsheet {path}: {reason}")]
    Spreadsheet { path: PathBuf, reason: String },

    #[error("failed to load catalog from {path}: {reason}")]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("invalid catalog: {0}")]
    CatalogInvalid(String),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to load name mappings from {path}: {reason}")]
    MappingsLoad { path: PathBuf, reason: String },

    #[error("failed to write courier form {path}: {reason}")]
    CourierWrite { path: PathBuf, reason: String },

    #[error("processed ledger error at {path}: {reason}")]
    Ledger { path: PathBuf, reason: String },

    #[error("stock deduction failed for '{product}': {reason}")]
    StockDeduction { product: String, reason: String },

    #[error("invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

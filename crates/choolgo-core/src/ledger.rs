use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ChoolgoError;
use crate::model::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntry {
    pub channel: String,
    pub processed_at: DateTime<Utc>,
    pub items: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ExtractionResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    pub channel: String,
    pub failed_at: DateTime<Utc>,
    pub error: String,
}

/// Files already applied to stock, keyed by absolute path.
///
/// Failed files are kept separately and are retried on the next run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedLedger {
    #[serde(default)]
    processed: BTreeMap<String, ProcessedEntry>,
    #[serde(default)]
    failures: BTreeMap<String, FailedEntry>,
}

impl ProcessedLedger {
    /// Load the ledger; a missing file is an empty ledger.
    pub fn load(path: &Path) -> Result<Self, ChoolgoError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ChoolgoError::Ledger {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ChoolgoError::Ledger {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ChoolgoError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json).map_err(|e| ChoolgoError::Ledger {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn is_processed(&self, key: &str) -> bool {
        self.processed.contains_key(key)
    }

    pub fn entry(&self, key: &str) -> Option<&ProcessedEntry> {
        self.processed.get(key)
    }

    pub fn failure(&self, key: &str) -> Option<&FailedEntry> {
        self.failures.get(key)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }

    /// Mark a file processed, clearing any earlier failure.
    pub fn record_success(
        &mut self,
        key: &str,
        channel: &str,
        details: &[ExtractionResult],
        at: DateTime<Utc>,
    ) {
        self.failures.remove(key);
        self.processed.insert(
            key.to_string(),
            ProcessedEntry {
                channel: channel.to_string(),
                processed_at: at,
                items: details.len(),
                details: details.to_vec(),
            },
        );
    }

    pub fn record_failure(&mut self, key: &str, channel: &str, error: &str, at: DateTime<Utc>) {
        self.failures.insert(
            key.to_string(),
            FailedEntry {
                channel: channel.to_string(),
                failed_at: at,
                error: error.to_string(),
            },
        );
    }
}

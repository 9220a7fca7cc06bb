use chrono::NaiveDate;
use std::path::PathBuf;

use crate::error::ChoolgoError;

/// Settings for a batch run. CLI flags override these after loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Root holding the 카카오/, 팔도감/, 직택배/ order folders.
    pub choolgo_dir: PathBuf,
    /// Where the daily courier form is written.
    pub output_dir: PathBuf,
    pub ledger_path: PathBuf,
    /// Files last modified before this date are ignored.
    pub start_date: Option<NaiveDate>,
    /// Parse and extract only: no stock deduction, no form, no ledger writes.
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            choolgo_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            ledger_path: PathBuf::from("processed.json"),
            start_date: None,
            dry_run: false,
        }
    }
}

impl PipelineConfig {
    /// Build config from `CHOOLGO_DIR`, `CHOOLGO_OUTPUT_DIR`, `CHOOLGO_LEDGER`,
    /// `START_DATE` (YYYY-MM-DD) and `CHOOLGO_DRY_RUN`.
    pub fn from_env() -> Result<Self, ChoolgoError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChoolgoError> {
        let defaults = Self::default();

        let choolgo_dir = lookup("CHOOLGO_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.choolgo_dir);

        // The form lands next to the order folders unless told otherwise
        let output_dir = lookup("CHOOLGO_OUTPUT_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| choolgo_dir.clone());

        let ledger_path = lookup("CHOOLGO_LEDGER")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.ledger_path);

        let start_date = lookup("START_DATE")
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_date("START_DATE", &s))
            .transpose()?;

        let dry_run = lookup("CHOOLGO_DRY_RUN")
            .map(|s| parse_flag("CHOOLGO_DRY_RUN", &s))
            .transpose()?
            .unwrap_or(defaults.dry_run);

        Ok(Self {
            choolgo_dir,
            output_dir,
            ledger_path,
            start_date,
            dry_run,
        })
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(key: &str, value: &str) -> Result<NaiveDate, ChoolgoError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| ChoolgoError::Config {
        key: key.to_string(),
        message: format!("expected YYYY-MM-DD, got '{value}': {e}"),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ChoolgoError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ChoolgoError::Config {
            key: key.to_string(),
            message: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<PipelineConfig, ChoolgoError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_output_dir_follows_choolgo_dir() {
        let c = config(&[("CHOOLGO_DIR", "/data/07_CJ")]).unwrap();
        assert_eq!(c.output_dir, PathBuf::from("/data/07_CJ"));

        let c = config(&[("CHOOLGO_DIR", "/data/07_CJ"), ("CHOOLGO_OUTPUT_DIR", "/out")]).unwrap();
        assert_eq!(c.output_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_start_date_and_dry_run() {
        let c = config(&[("START_DATE", "2026-02-08"), ("CHOOLGO_DRY_RUN", "true")]).unwrap();
        assert_eq!(c.start_date, NaiveDate::from_ymd_opt(2026, 2, 8));
        assert!(c.dry_run);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            config(&[("START_DATE", "08/02/2026")]),
            Err(ChoolgoError::Config { .. })
        ));
        assert!(matches!(
            config(&[("CHOOLGO_DRY_RUN", "maybe")]),
            Err(ChoolgoError::Config { .. })
        ));
    }
}

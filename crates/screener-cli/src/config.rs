use anyhow::{Context, Result};
use metric_resolver::resolver::{DEFAULT_MAX_ROW_VALUES, DEFAULT_METADATA_TABLE, DEFAULT_UNNAMED_SENTINEL};
use metric_resolver::ResolverOptions;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_RULES_FILE: &str = "saved_rules.json";
pub const DEFAULT_HEADER_MARKER: &str = "Narration";

/// Shell settings, read from the environment (and `.env`) and overridden by flags
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    pub rules_file: PathBuf,
    pub catalog_file: Option<PathBuf>,
    pub max_row_values: usize,
    pub metadata_table: String,
    pub header_marker: String,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from(DEFAULT_RULES_FILE),
            catalog_file: None,
            max_row_values: DEFAULT_MAX_ROW_VALUES,
            metadata_table: DEFAULT_METADATA_TABLE.to_string(),
            header_marker: DEFAULT_HEADER_MARKER.to_string(),
        }
    }
}

impl ScreenerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            rules_file: lookup("SCREENER_RULES_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.rules_file),
            catalog_file: lookup("SCREENER_CATALOG_FILE").map(PathBuf::from),
            max_row_values: lookup("SCREENER_MAX_ROW_VALUES")
                .unwrap_or_else(|| DEFAULT_MAX_ROW_VALUES.to_string())
                .parse()
                .context("SCREENER_MAX_ROW_VALUES must be a non-negative integer")?,
            metadata_table: lookup("SCREENER_METADATA_TABLE").unwrap_or(defaults.metadata_table),
            header_marker: lookup("SCREENER_HEADER_MARKER").unwrap_or(defaults.header_marker),
        })
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            max_row_values: self.max_row_values,
            metadata_table: self.metadata_table.clone(),
            unnamed_sentinel: DEFAULT_UNNAMED_SENTINEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_env_empty() {
        let config = ScreenerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.rules_file, PathBuf::from("saved_rules.json"));
        assert_eq!(config.resolver_options(), ResolverOptions::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("SCREENER_RULES_FILE", "/tmp/rules.json"),
            ("SCREENER_MAX_ROW_VALUES", "10"),
            ("SCREENER_METADATA_TABLE", "Meta"),
        ]
        .into_iter()
        .collect();
        let config = ScreenerConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.rules_file, PathBuf::from("/tmp/rules.json"));
        assert_eq!(config.max_row_values, 10);
        assert_eq!(config.resolver_options().metadata_table, "Meta");
        assert_eq!(config.header_marker, "Narration");
    }

    #[test]
    fn test_bad_number_is_error() {
        let result = ScreenerConfig::from_lookup(|k| {
            (k == "SCREENER_MAX_ROW_VALUES").then(|| "five".to_string())
        });
        assert!(result.is_err());
    }
}

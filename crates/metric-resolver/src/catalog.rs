use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::defs::builtin_aliases;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid alias pattern {pattern:?} for {metric}: {source}")]
    InvalidPattern {
        metric: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Duplicate metric in alias catalog: {0}")]
    DuplicateMetric(String),

    #[error("Metric {0} has no alias patterns")]
    NoPatterns(String),

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized form of one catalog entry, as edited offline by the shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasEntryDef {
    pub metric: String,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AliasEntry {
    metric: String,
    patterns: Vec<Regex>,
}

impl AliasEntry {
    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Whether any pattern occurs in the (already normalized) label.
    pub fn matches(&self, label: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(label))
    }
}

/// Canonical metric names with their alias patterns, in declaration order.
///
/// Read-only once built; safe to share across threads.
#[derive(Debug, Clone)]
pub struct AliasCatalog {
    entries: Vec<AliasEntry>,
}

impl AliasCatalog {
    pub fn from_entries<I, M, P>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (M, Vec<P>)>,
        M: Into<String>,
        P: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut compiled = Vec::new();

        for (metric, patterns) in entries {
            let metric = metric.into();
            if !seen.insert(metric.clone()) {
                return Err(CatalogError::DuplicateMetric(metric));
            }
            if patterns.is_empty() {
                return Err(CatalogError::NoPatterns(metric));
            }
            let patterns = patterns
                .iter()
                .map(|p| compile_pattern(&metric, p.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push(AliasEntry { metric, patterns });
        }

        Ok(Self { entries: compiled })
    }

    /// Catalog from a JSON array of `{"metric": ..., "patterns": [...]}` objects.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let defs: Vec<AliasEntryDef> = serde_json::from_str(json)?;
        Self::from_entries(defs.into_iter().map(|d| (d.metric, d.patterns)))
    }

    /// The built-in catalog, compiled on first use.
    pub fn builtin() -> &'static AliasCatalog {
        static BUILTIN: OnceLock<AliasCatalog> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            AliasCatalog::from_entries(
                builtin_aliases()
                    .iter()
                    .map(|def| (def.metric, def.patterns.to_vec())),
            )
            .expect("built-in alias patterns must compile")
        })
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.metric.as_str())
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.entries.iter().any(|e| e.metric == metric)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First metric in declaration order whose patterns match `label`.
    pub fn match_label(&self, label: &str) -> Option<&str> {
        let normalized = normalize_label(label);
        self.entries
            .iter()
            .find(|e| e.matches(&normalized))
            .map(AliasEntry::metric)
    }

    /// Canonical name for a user-authored metric key such as a rule key:
    /// the exact catalog name, then a case-insensitive match, then the first
    /// alias match.
    pub fn canonical_name(&self, key: &str) -> Option<&str> {
        let key = key.trim();
        self.metric_names()
            .find(|m| *m == key)
            .or_else(|| self.metric_names().find(|m| m.eq_ignore_ascii_case(key)))
            .or_else(|| self.match_label(key))
    }
}

fn compile_pattern(metric: &str, pattern: &str) -> Result<Regex, CatalogError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| CatalogError::InvalidPattern {
            metric: metric.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::*;

    #[test]
    fn test_builtin_catalog_compiles() {
        let catalog = AliasCatalog::builtin();
        assert!(catalog.len() >= 15);
        assert!(catalog.contains(RETURN_ON_EQUITY));
        assert!(catalog.contains(PRICE_TO_EARNING));
    }

    #[test]
    fn test_match_label_common_spellings() {
        let catalog = AliasCatalog::builtin();
        assert_eq!(catalog.match_label("  Return on Equity %"), Some(RETURN_ON_EQUITY));
        assert_eq!(catalog.match_label("ROE"), Some(RETURN_ON_EQUITY));
        assert_eq!(catalog.match_label("ROCE"), Some(RETURN_ON_CAPITAL_EMPLOYED));
        assert_eq!(catalog.match_label("Debt / Equity"), Some(DEBT_TO_EQUITY));
        assert_eq!(catalog.match_label("P/E"), Some(PRICE_TO_EARNING));
        assert_eq!(catalog.match_label("PEG Ratio"), Some(PEG_RATIO));
        assert_eq!(catalog.match_label("Sales Growth 3Years"), Some(SALES_GROWTH));
        assert_eq!(catalog.match_label("Sales +"), Some(REVENUE));
        assert_eq!(catalog.match_label("Promoters"), Some(PROMOTER_HOLDING));
        assert_eq!(catalog.match_label("Face Value"), None);
        assert_eq!(catalog.match_label("Net Profit +"), Some(NET_PROFIT));
        assert_eq!(catalog.match_label("Net profit margin"), None);
        assert_eq!(catalog.match_label("Sales Growth 5Years"), Some(SALES_GROWTH));
    }

    #[test]
    fn test_canonical_name_for_rule_keys() {
        let catalog = AliasCatalog::builtin();
        assert_eq!(catalog.canonical_name("Return on equity"), Some(RETURN_ON_EQUITY));
        assert_eq!(catalog.canonical_name("Debt to Equity"), Some(DEBT_TO_EQUITY));
        assert_eq!(catalog.canonical_name("ROE"), Some(RETURN_ON_EQUITY));
        assert_eq!(catalog.canonical_name("P/E"), Some(PRICE_TO_EARNING));
        assert_eq!(catalog.canonical_name("P/B"), Some(PRICE_TO_BOOK_VALUE));
        assert_eq!(catalog.canonical_name("Book to bill"), None);
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let result = AliasCatalog::from_entries(vec![("ROE", vec!["roe"]), ("ROE", vec!["equity"])]);
        assert!(matches!(result, Err(CatalogError::DuplicateMetric(m)) if m == "ROE"));
    }

    #[test]
    fn test_invalid_pattern_is_hard_failure() {
        let result = AliasCatalog::from_entries(vec![("ROE", vec!["(roe"])]);
        assert!(matches!(result, Err(CatalogError::InvalidPattern { .. })));
    }

    #[test]
    fn test_from_json_keeps_declaration_order() {
        let json = r#"[
            {"metric": "Equity", "patterns": ["equity"]},
            {"metric": "Debt to equity", "patterns": ["debt"]}
        ]"#;
        let catalog = AliasCatalog::from_json(json).unwrap();
        let names: Vec<&str> = catalog.metric_names().collect();
        assert_eq!(names, vec!["Equity", "Debt to equity"]);
        // Ambiguous label: first declared metric wins
        assert_eq!(catalog.match_label("Debt to equity"), Some("Equity"));
    }
}

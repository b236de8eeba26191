use analysis_core::DEFAULT_RULE_WEIGHT;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid weight {weight} for {metric}: must be between 0 and 100")]
    InvalidWeight { metric: String, weight: u8 },

    #[error("Rule keyed by an empty metric name")]
    EmptyMetricName,

    #[error("Invalid rule configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A rule as stored in the configuration record, before parsing.
///
/// Serialized either as the bare rule text (`"> 15"`) or, when weighted or
/// disabled, as `{"rule": "> 15", "weight": 40, "enabled": false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RuleEntryRepr", into = "RuleEntryRepr")]
pub struct RuleEntry {
    pub rule: String,
    pub weight: u8,
    pub enabled: bool,
}

impl RuleEntry {
    pub fn new(rule: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            weight: DEFAULT_RULE_WEIGHT,
            enabled: true,
        }
    }

    pub fn weighted(rule: impl Into<String>, weight: u8) -> Self {
        Self {
            weight,
            ..Self::new(rule)
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RuleEntryRepr {
    Text(String),
    Detailed {
        rule: String,
        #[serde(default = "default_weight")]
        weight: u8,
        #[serde(default = "default_enabled")]
        enabled: bool,
    },
}

fn default_weight() -> u8 {
    DEFAULT_RULE_WEIGHT
}

fn default_enabled() -> bool {
    true
}

impl From<RuleEntryRepr> for RuleEntry {
    fn from(repr: RuleEntryRepr) -> Self {
        match repr {
            RuleEntryRepr::Text(rule) => RuleEntry::new(rule),
            RuleEntryRepr::Detailed {
                rule,
                weight,
                enabled,
            } => RuleEntry {
                rule,
                weight,
                enabled,
            },
        }
    }
}

impl From<RuleEntry> for RuleEntryRepr {
    fn from(entry: RuleEntry) -> Self {
        if entry.weight == DEFAULT_RULE_WEIGHT && entry.enabled {
            RuleEntryRepr::Text(entry.rule)
        } else {
            RuleEntryRepr::Detailed {
                rule: entry.rule,
                weight: entry.weight,
                enabled: entry.enabled,
            }
        }
    }
}

/// Rules keyed by metric name, in the order they were authored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    entries: Vec<(String, RuleEntry)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the rule for `metric`. A replaced rule keeps its position.
    pub fn insert(&mut self, metric: impl Into<String>, entry: RuleEntry) {
        let metric = metric.into();
        match self.entries.iter_mut().find(|(m, _)| *m == metric) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((metric, entry)),
        }
    }

    pub fn with(mut self, metric: impl Into<String>, entry: RuleEntry) -> Self {
        self.insert(metric, entry);
        self
    }

    pub fn get(&self, metric: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|(m, _)| m == metric).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleEntry)> {
        self.entries.iter().map(|(m, e)| (m.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: Into<String>, E: Into<String>> FromIterator<(M, E)> for RuleSet {
    fn from_iter<T: IntoIterator<Item = (M, E)>>(iter: T) -> Self {
        let mut set = RuleSet::new();
        for (metric, rule) in iter {
            set.insert(metric, RuleEntry::new(rule));
        }
        set
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (metric, entry) in &self.entries {
            map.serialize_entry(metric, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleSetVisitor;

        impl<'de> Visitor<'de> for RuleSetVisitor {
            type Value = RuleSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of metric names to rules")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RuleSet, A::Error> {
                let mut set = RuleSet::new();
                while let Some((metric, entry)) = access.next_entry::<String, RuleEntry>()? {
                    set.insert(metric, entry);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(RuleSetVisitor)
    }
}

/// The persisted rule configuration record.
///
/// Loading and saving the file belongs to the calling shell; this type only
/// handles the JSON shape and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default)]
    pub buy_rules: RuleSet,
    #[serde(default)]
    pub valuation_rules: RuleSet,
    /// Metrics to skip during evaluation and in the missing-metric report
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omit: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            buy_rules: [("Return on equity", "> 15"), ("Debt to equity", "< 1")]
                .into_iter()
                .collect(),
            valuation_rules: [("Price to Earning", "< 20"), ("Price to book value", "< 3")]
                .into_iter()
                .collect(),
            omit: Vec::new(),
        }
    }
}

impl RuleConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (metric, entry) in self.buy_rules.iter().chain(self.valuation_rules.iter()) {
            if metric.trim().is_empty() {
                return Err(ConfigError::EmptyMetricName);
            }
            if entry.weight > 100 {
                return Err(ConfigError::InvalidWeight {
                    metric: metric.to_string(),
                    weight: entry.weight,
                });
            }
        }
        Ok(())
    }

    pub fn is_omitted(&self, metric: &str) -> bool {
        self.omit.iter().any(|m| m.eq_ignore_ascii_case(metric))
    }
}

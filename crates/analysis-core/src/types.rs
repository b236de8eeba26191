use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder tokens that OCR and spreadsheet exports use for "no value"
const EMPTY_TOKENS: &[&str] = &["-", "--", "—"];

/// A single scalar cell from a spreadsheet, OCR line or pasted table.
///
/// `Empty` is distinct from `Number(0.0)`: blank cells are dropped during
/// resolution, zeros are kept.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Classify a raw string token as empty, numeric or text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || EMPTY_TOKENS.contains(&trimmed) {
            return Cell::Empty;
        }
        match parse_numeric(trimmed) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(n) => n.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.to_number().is_some()
    }

    /// Numeric value of the cell, accepting numeric text such as `"1,234.5"` or `"18%"`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => parse_numeric(s),
        }
    }

    /// Text used when the cell acts as a row or column label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n.to_string()),
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Parse numeric text, tolerating thousands separators and a trailing percent sign.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Rectangular tabular data handed over by a source collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    /// Sheet or file name, used to locate the metadata table
    #[serde(default)]
    pub name: Option<String>,
    /// Genuine column names (e.g. fiscal year labels), when the source has them
    #[serde(default)]
    pub header: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: None,
            header: None,
            rows,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .map_or(false, |n| n.trim().eq_ignore_ascii_case(name.trim()))
    }

    /// Header cell for column `idx`, if present and non-blank.
    pub fn header_at(&self, idx: usize) -> Option<&str> {
        self.header
            .as_ref()
            .and_then(|h| h.get(idx))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Promote the first row whose leading cell equals `marker` to the header,
    /// dropping it and every row above it.
    ///
    /// Screener-style exports put a banner above a `Narration` row holding the
    /// fiscal year labels. Returns `false` when no such row exists.
    pub fn promote_header_row(&mut self, marker: &str) -> bool {
        let position = self.rows.iter().position(|row| {
            row.first()
                .and_then(Cell::as_label)
                .map_or(false, |label| label.eq_ignore_ascii_case(marker.trim()))
        });
        match position {
            Some(idx) => {
                let header_row = self.rows.remove(idx);
                self.header = Some(header_row.iter().map(|c| c.to_string()).collect());
                self.rows.drain(..idx);
                true
            }
            None => false,
        }
    }

    /// Promote the first row to the header when it is made of text only.
    pub fn promote_leading_text_row(&mut self) -> bool {
        let all_text = self.rows.first().map_or(false, |row| {
            row.len() >= 2
                && row.first().map_or(false, |c| !c.is_empty())
                && row
                    .iter()
                    .all(|c| matches!(c, Cell::Text(_) | Cell::Empty) && !c.is_numeric())
        });
        if !all_text {
            return false;
        }
        let header_row = self.rows.remove(0);
        self.header = Some(header_row.iter().map(|c| c.to_string()).collect());
        true
    }
}

/// Ordered observations of one metric, oldest first.
///
/// `years` and `values` always have the same length; the constructors are the
/// only way to build a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSeries {
    years: Vec<String>,
    values: Vec<Cell>,
}

impl MetricSeries {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Cell)>,
    {
        let (years, values) = pairs.into_iter().unzip();
        Self { years, values }
    }

    /// Label values with ordinal placeholders ("Year 1", "Year 2", ...).
    pub fn with_ordinal_years(values: Vec<Cell>) -> Self {
        let years = (1..=values.len()).map(ordinal_year).collect();
        Self { years, values }
    }

    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Chronologically last value
    pub fn latest(&self) -> Option<&Cell> {
        self.values.last()
    }
}

pub fn ordinal_year(position: usize) -> String {
    format!("Year {}", position)
}

/// Resolved metrics keyed by canonical name. Absent keys are unresolved metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricTable {
    series: BTreeMap<String, MetricSeries>,
}

impl MetricTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the metric is already resolved. Returns whether it was inserted.
    pub fn insert_if_absent(&mut self, metric: &str, series: MetricSeries) -> bool {
        if self.series.contains_key(metric) {
            return false;
        }
        self.series.insert(metric.to_string(), series);
        true
    }

    pub fn get(&self, metric: &str) -> Option<&MetricSeries> {
        self.series.get(metric)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.series.contains_key(metric)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Names from `vocabulary` that are not resolved, in vocabulary order.
    pub fn missing_from<'a, I>(&self, vocabulary: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        vocabulary
            .into_iter()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect()
    }

    /// Fold `other` into `self`, keeping existing entries on conflict.
    pub fn merge_first_wins(mut self, other: MetricTable) -> Self {
        for (name, series) in other.series {
            self.series.entry(name).or_insert(series);
        }
        self
    }
}

/// Observed value of a metric at evaluation time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observed {
    Value(f64),
    /// No table resolved the metric
    Missing,
    /// Resolved, but the latest value is not numeric
    NotAvailable,
}

impl Observed {
    pub fn from_series(series: Option<&MetricSeries>) -> Self {
        match series {
            None => Observed::Missing,
            Some(s) => match s.latest().and_then(Cell::to_number) {
                Some(v) => Observed::Value(v),
                None => Observed::NotAvailable,
            },
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Observed::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Value(v) => write!(f, "{}", v),
            Observed::Missing => write!(f, "Missing"),
            Observed::NotAvailable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Observed {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Observed::Value(v) => serializer.serialize_f64(*v),
            Observed::Missing => serializer.serialize_str("Missing"),
            Observed::NotAvailable => serializer.serialize_str("N/A"),
        }
    }
}

/// Comparison operator of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Operator::Gt => lhs > rhs,
            Operator::Lt => lhs < rhs,
            Operator::Ge => lhs >= rhs,
            Operator::Le => lhs <= rhs,
            Operator::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub const DEFAULT_RULE_WEIGHT: u8 = 100;

/// Parsed comparison rule. Only meaningful next to the metric name it is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub operator: Operator,
    pub threshold: f64,
    pub weight: u8, // 0 to 100
    pub enabled: bool,
}

impl Rule {
    pub fn new(operator: Operator, threshold: f64) -> Self {
        Self {
            operator,
            threshold,
            weight: DEFAULT_RULE_WEIGHT,
            enabled: true,
        }
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operator, self.threshold)
    }
}

/// One report row of an evaluation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub metric: String,
    pub observed: Observed,
    /// Rule as authored by the user
    pub rule_text: String,
    /// `None` when the rule text could not be parsed
    pub rule: Option<Rule>,
    pub weight: u8,
    pub enabled: bool,
    pub passed: bool,
}

/// Aggregated score of one rule set
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreReport {
    pub percentage: u8, // 0 to 100
    pub results: Vec<EvaluationResult>,
}

impl ScoreReport {
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.enabled && r.passed).count()
    }

    pub fn scored_count(&self) -> usize {
        self.results.iter().filter(|r| r.enabled).count()
    }
}

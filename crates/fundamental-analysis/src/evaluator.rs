use analysis_core::{EvaluationResult, MetricTable, Observed, Rule};
use metric_resolver::AliasCatalog;
use tracing::{debug, warn};

use crate::config::{RuleConfig, RuleSet};
use crate::parser::parse_rule;

/// Compare `value` against a parsed rule. NaN fails every rule.
pub fn evaluate(value: f64, rule: &Rule) -> bool {
    !value.is_nan() && rule.operator.apply(value, rule.threshold)
}

/// Parse and evaluate in one step; unparseable rules fail closed.
pub fn evaluate_text(value: f64, rule_text: &str) -> bool {
    parse_rule(rule_text).map_or(false, |rule| evaluate(value, &rule))
}

/// Evaluate every rule of `rules` against the latest value of its metric.
///
/// Rule keys may be aliases (`"ROE"`, `"P/E"`, `"Debt to Equity"`); they are
/// mapped to canonical names through `catalog` before the lookup. Produces
/// exactly one result per enabled rule whose metric is not omitted by
/// `config`. Disabled rules are left out entirely.
pub fn evaluate_rule_set(
    metrics: &MetricTable,
    rules: &RuleSet,
    config: &RuleConfig,
    catalog: &AliasCatalog,
) -> Vec<EvaluationResult> {
    rules
        .iter()
        .filter(|(_, entry)| entry.enabled)
        .map(|(metric, entry)| (metric, lookup_key(metrics, catalog, metric), entry))
        .filter(|(metric, key, _)| !config.is_omitted(metric) && !config.is_omitted(key))
        .map(|(metric, key, entry)| {
            let observed = Observed::from_series(metrics.get(key));
            let rule = match parse_rule(&entry.rule) {
                Ok(rule) => Some(rule.with_weight(entry.weight)),
                Err(e) => {
                    warn!(metric, rule = %entry.rule, error = %e, "Rule could not be parsed; counting it as failed");
                    None
                }
            };

            let passed = match (observed, rule) {
                (Observed::Value(v), Some(rule)) => evaluate(v, &rule),
                _ => false,
            };

            debug!(metric, canonical = key, observed = %observed, rule = %entry.rule, passed, "Evaluated rule");

            EvaluationResult {
                metric: metric.to_string(),
                observed,
                rule_text: entry.rule.clone(),
                rule,
                weight: entry.weight,
                enabled: true,
                passed,
            }
        })
        .collect()
}

/// Metric table key for a rule key: the key itself when it names a resolved
/// metric, otherwise its canonical catalog name.
fn lookup_key<'a>(metrics: &MetricTable, catalog: &'a AliasCatalog, rule_key: &'a str) -> &'a str {
    if metrics.contains(rule_key) {
        return rule_key;
    }
    catalog.canonical_name(rule_key).unwrap_or(rule_key)
}

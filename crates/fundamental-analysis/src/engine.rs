use analysis_core::{MetricTable, RawTable, ScoreReport, TableSource};
use chrono::{DateTime, Utc};
use metric_resolver::{AliasCatalog, MetricResolver, ResolverOptions};
use serde::Serialize;
use tracing::info;

use crate::config::RuleConfig;
use crate::evaluator::evaluate_rule_set;
use crate::scoring::aggregate;

/// The two rule sets; identical mechanics, different report labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleKind {
    Buy,
    Valuation,
}

impl RuleKind {
    pub fn title(&self) -> &'static str {
        match self {
            RuleKind::Buy => "Buy Signal Match",
            RuleKind::Valuation => "Valuation Check",
        }
    }

    /// Verdict shown next to one result row
    pub fn verdict_label(&self, passed: bool) -> &'static str {
        match (self, passed) {
            (RuleKind::Buy, true) => "Pass",
            (RuleKind::Buy, false) => "Fail",
            (RuleKind::Valuation, true) => "Undervalued",
            (RuleKind::Valuation, false) => "Overvalued",
        }
    }
}

/// Full outcome of screening one company's data
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub entity: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub metrics: MetricTable,
    /// Catalog metrics that no table resolved, in catalog order
    pub missing: Vec<String>,
    pub buy: ScoreReport,
    pub valuation: ScoreReport,
}

impl ScreeningReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn score(&self, kind: RuleKind) -> &ScoreReport {
        match kind {
            RuleKind::Buy => &self.buy,
            RuleKind::Valuation => &self.valuation,
        }
    }
}

/// Resolves metrics from raw tables and scores them against a rule configuration.
pub struct FundamentalScreener<'c> {
    resolver: MetricResolver<'c>,
}

impl FundamentalScreener<'static> {
    pub fn with_builtin_catalog() -> Self {
        Self::new(AliasCatalog::builtin(), ResolverOptions::default())
    }
}

impl<'c> FundamentalScreener<'c> {
    pub fn new(catalog: &'c AliasCatalog, options: ResolverOptions) -> Self {
        Self {
            resolver: MetricResolver::new(catalog, options),
        }
    }

    pub fn resolver(&self) -> &MetricResolver<'c> {
        &self.resolver
    }

    pub fn screen(&self, tables: &[RawTable], rules: &RuleConfig) -> ScreeningReport {
        let resolution = self.resolver.resolve(tables);

        let missing: Vec<String> = resolution
            .metrics
            .missing_from(self.resolver.catalog().metric_names())
            .into_iter()
            .filter(|m| !rules.is_omitted(m))
            .collect();

        let (buy, valuation) = self.evaluate(&resolution.metrics, rules);

        info!(
            entity = resolution.entity.as_deref().unwrap_or("unknown"),
            resolved = resolution.metrics.len(),
            missing = missing.len(),
            buy_score = buy.percentage,
            valuation_score = valuation.percentage,
            "Screening complete"
        );

        ScreeningReport {
            entity: resolution.entity,
            timestamp: Utc::now(),
            metrics: resolution.metrics,
            missing,
            buy,
            valuation,
        }
    }

    /// Load tables from every source in order, then screen them together.
    pub fn screen_sources(
        &self,
        sources: &[Box<dyn TableSource>],
        rules: &RuleConfig,
    ) -> Result<ScreeningReport, analysis_core::SourceError> {
        let mut tables = Vec::new();
        for source in sources {
            let loaded = source.load_tables()?;
            info!(source = %source.describe(), tables = loaded.len(), "Loaded tables");
            tables.extend(loaded);
        }
        Ok(self.screen(&tables, rules))
    }

    /// Score both rule sets against already resolved metrics.
    pub fn evaluate(&self, metrics: &MetricTable, rules: &RuleConfig) -> (ScoreReport, ScoreReport) {
        let catalog = self.resolver.catalog();
        let buy = aggregate(evaluate_rule_set(metrics, &rules.buy_rules, rules, catalog));
        let valuation = aggregate(evaluate_rule_set(metrics, &rules.valuation_rules, rules, catalog));
        (buy, valuation)
    }
}

impl Default for FundamentalScreener<'static> {
    fn default() -> Self {
        Self::with_builtin_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuleEntry, RuleSet};
    use analysis_core::{Cell, Observed};

    fn scenario_tables() -> Vec<RawTable> {
        vec![RawTable::new(vec![
            vec![
                Cell::from("Return on equity"),
                Cell::from(10.0),
                Cell::from(12.0),
                Cell::from(18.0),
            ],
            vec![Cell::from("Debt to equity"), Cell::from(0.8)],
        ])]
    }

    fn buy_only(rules: RuleSet) -> RuleConfig {
        RuleConfig {
            buy_rules: rules,
            valuation_rules: RuleSet::new(),
            omit: vec![],
        }
    }

    #[test]
    fn test_end_to_end_all_pass() {
        let screener = FundamentalScreener::with_builtin_catalog();
        let rules = buy_only(
            [("Return on equity", "> 15"), ("Debt to equity", "< 1")]
                .into_iter()
                .collect(),
        );
        let report = screener.screen(&scenario_tables(), &rules);

        let roe = report.metrics.get("Return on equity").unwrap();
        assert_eq!(roe.years(), &["Year 1", "Year 2", "Year 3"]);
        assert_eq!(
            roe.values(),
            &[Cell::Number(10.0), Cell::Number(12.0), Cell::Number(18.0)]
        );
        let d2e = report.metrics.get("Debt to equity").unwrap();
        assert_eq!(d2e.years(), &["Year 1"]);
        assert_eq!(d2e.values(), &[Cell::Number(0.8)]);

        assert_eq!(report.buy.results.len(), 2);
        assert!(report.buy.results.iter().all(|r| r.passed));
        assert_eq!(report.buy.percentage, 100);
        assert_eq!(report.valuation.percentage, 0);
        assert!(report.valuation.results.is_empty());
    }

    #[test]
    fn test_missing_metric_halves_score() {
        let screener = FundamentalScreener::with_builtin_catalog();
        let rules = buy_only(
            [("Return on equity", "> 15"), ("Price to Earning", "< 20")]
                .into_iter()
                .collect(),
        );
        let report = screener.screen(&scenario_tables(), &rules);

        let pe = &report.buy.results[1];
        assert_eq!(pe.metric, "Price to Earning");
        assert_eq!(pe.observed, Observed::Missing);
        assert!(!pe.passed);
        assert_eq!(report.buy.percentage, 50);
        assert!(report.missing.contains(&"Price to Earning".to_string()));
        assert!(!report.is_complete());
    }

    #[test]
    fn test_omitted_metrics_leave_missing_list() {
        let screener = FundamentalScreener::with_builtin_catalog();
        let mut rules = buy_only(RuleSet::new().with("EPS", RuleEntry::new("> 0")));
        rules.omit = vec!["EPS".to_string()];
        let report = screener.screen(&scenario_tables(), &rules);

        assert!(!report.missing.contains(&"EPS".to_string()));
        assert!(report.buy.results.is_empty());
        assert_eq!(report.buy.percentage, 0);
    }

    #[test]
    fn test_screen_sources_concatenates_in_order() {
        let screener = FundamentalScreener::with_builtin_catalog();
        let first: Box<dyn TableSource> = Box::new(scenario_tables());
        let second: Box<dyn TableSource> = Box::new(vec![RawTable::new(vec![vec![
            Cell::from("ROE"),
            Cell::from(5.0),
        ]])]);
        let report = screener
            .screen_sources(&[first, second], &RuleConfig::default())
            .unwrap();
        assert_eq!(
            report.metrics.get("Return on equity").and_then(|s| s.latest()),
            Some(&Cell::Number(18.0))
        );
        // Default buy rules: ROE > 15 and D/E < 1 both pass
        assert_eq!(report.buy.percentage, 100);
        // Default valuation rules reference metrics absent from the tables
        assert_eq!(report.valuation.percentage, 0);
        assert!(report
            .valuation
            .results
            .iter()
            .all(|r| r.observed == Observed::Missing));
    }

    #[test]
    fn test_rules_file_keyed_by_short_names() {
        let rules = RuleConfig::from_json(
            r#"{
                "buy_rules": {"ROE": "> 15", "Debt to Equity": "< 1"},
                "valuation_rules": {"P/E": "< 20", "P/B": "< 3"}
            }"#,
        )
        .unwrap();
        let mut tables = scenario_tables();
        tables.push(RawTable::new(vec![
            vec![Cell::from("P/E"), Cell::from(18.0)],
            vec![Cell::from("P/B"), Cell::from(4.2)],
        ]));

        let report = FundamentalScreener::with_builtin_catalog().screen(&tables, &rules);

        assert_eq!(report.buy.results[0].metric, "ROE");
        assert_eq!(report.buy.results[0].observed, Observed::Value(18.0));
        assert_eq!(report.buy.results[1].observed, Observed::Value(0.8));
        assert_eq!(report.buy.percentage, 100);
        assert_eq!(report.valuation.results[0].observed, Observed::Value(18.0));
        assert!(report.valuation.results[0].passed);
        assert!(!report.valuation.results[1].passed);
        assert_eq!(report.valuation.percentage, 50);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(RuleKind::Valuation.verdict_label(true), "Undervalued");
        assert_eq!(RuleKind::Valuation.verdict_label(false), "Overvalued");
        assert_eq!(RuleKind::Buy.verdict_label(true), "Pass");
    }
}

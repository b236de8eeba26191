use analysis_core::{EvaluationResult, DEFAULT_RULE_WEIGHT};
use fundamental_analysis::{RuleKind, ScreeningReport};
use std::fmt::Write;

/// Human-readable screening report, one section per rule set.
pub fn render_text(report: &ScreeningReport) -> String {
    let mut out = String::new();

    let entity = report.entity.as_deref().unwrap_or("Unknown company");
    let _ = writeln!(out, "Company: {}", entity);
    let _ = writeln!(out, "Screened at: {}", report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out);

    if report.is_complete() {
        let _ = writeln!(out, "All required metrics found.");
    } else {
        let _ = writeln!(out, "Missing key metrics: {}", report.missing.join(", "));
    }

    for kind in [RuleKind::Buy, RuleKind::Valuation] {
        let score = report.score(kind);
        let _ = writeln!(out);
        let _ = writeln!(out, "{}: {}%", kind.title(), score.percentage);
        if score.results.is_empty() {
            let _ = writeln!(out, "  (no rules)");
        }
        for result in &score.results {
            let _ = writeln!(out, "  {}", render_row(kind, result));
        }
    }

    out
}

fn render_row(kind: RuleKind, result: &EvaluationResult) -> String {
    let mut line = match kind {
        RuleKind::Buy => format!(
            "{} {}: Latest = {}, Rule = {}",
            if result.passed { "✅" } else { "❌" },
            result.metric,
            result.observed,
            result.rule_text
        ),
        RuleKind::Valuation => format!(
            "{}: {} → {}",
            result.metric,
            result.observed,
            kind.verdict_label(result.passed)
        ),
    };

    if result.rule.is_none() {
        line.push_str(" (unparseable rule)");
    }
    if result.weight != DEFAULT_RULE_WEIGHT {
        let _ = write!(line, " (weight {})", result.weight);
    }
    line
}

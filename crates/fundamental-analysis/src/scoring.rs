use analysis_core::{EvaluationResult, ScoreReport, DEFAULT_RULE_WEIGHT};

/// Weighted pass percentage over the enabled results.
///
/// `round(100 * passed weight / total weight)`, or 0 when the total weight is
/// 0. Missing and N/A results count against the score; disabled results are
/// left out of both sums.
pub fn aggregate(results: Vec<EvaluationResult>) -> ScoreReport {
    let (passed_weight, total_weight) = results
        .iter()
        .filter(|r| r.enabled)
        .fold((0u64, 0u64), |(passed, total), r| {
            let weight = u64::from(r.weight);
            (if r.passed { passed + weight } else { passed }, total + weight)
        });

    let percentage = if total_weight > 0 {
        ((passed_weight as f64 / total_weight as f64) * 100.0).round() as u8
    } else {
        0
    };

    ScoreReport { percentage, results }
}

/// Plain pass count percentage: the weighted formula with every weight at 100.
pub fn aggregate_unweighted(results: Vec<EvaluationResult>) -> ScoreReport {
    let uniform: Vec<EvaluationResult> = results
        .iter()
        .cloned()
        .map(|r| EvaluationResult {
            weight: DEFAULT_RULE_WEIGHT,
            ..r
        })
        .collect();
    let percentage = aggregate(uniform).percentage;
    ScoreReport { percentage, results }
}

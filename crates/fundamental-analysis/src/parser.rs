use analysis_core::{Operator, Rule};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleParseError {
    #[error("Empty rule")]
    Empty,

    #[error("Rule {0:?} does not start with one of >=, <=, ==, >, <")]
    MissingOperator(String),

    #[error("Rule {0:?} has no threshold")]
    MissingThreshold(String),

    #[error("Invalid threshold {0:?}")]
    InvalidThreshold(String),
}

/// Two-character operators come first so `>=` is never read as `>` followed by `=15`.
const OPERATOR_TOKENS: [(&str, Operator); 5] = [
    (">=", Operator::Ge),
    ("<=", Operator::Le),
    ("==", Operator::Eq),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

/// Split the leading operator token off `text`.
fn split_operator(text: &str) -> Option<(Operator, &str)> {
    OPERATOR_TOKENS
        .iter()
        .find_map(|(token, op)| text.strip_prefix(token).map(|rest| (*op, rest)))
}

/// Parse a user-authored rule such as `"> 15"` or `">=15"`.
///
/// The returned rule carries the default weight and is enabled.
pub fn parse_rule(text: &str) -> Result<Rule, RuleParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RuleParseError::Empty);
    }

    let (operator, rest) =
        split_operator(trimmed).ok_or_else(|| RuleParseError::MissingOperator(trimmed.to_string()))?;

    let literal = rest.trim();
    if literal.is_empty() {
        return Err(RuleParseError::MissingThreshold(trimmed.to_string()));
    }

    let threshold: f64 = literal
        .parse()
        .map_err(|_| RuleParseError::InvalidThreshold(literal.to_string()))?;
    if !threshold.is_finite() {
        return Err(RuleParseError::InvalidThreshold(literal.to_string()));
    }

    Ok(Rule::new(operator, threshold))
}

/// Newtype so `"> 15".parse::<ParsedRule>()` works at call sites that prefer `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRule(pub Rule);

impl FromStr for ParsedRule {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule(s).map(ParsedRule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_spaced_and_unspaced() {
        let rule = parse_rule("> 15").unwrap();
        assert_eq!(rule.operator, Operator::Gt);
        assert_eq!(rule.threshold, 15.0);
        assert_eq!(rule.weight, 100);
        assert!(rule.enabled);

        let rule = parse_rule(">=15").unwrap();
        assert_eq!(rule.operator, Operator::Ge);
        assert_eq!(rule.threshold, 15.0);

        let rule = parse_rule("   <= -0.5  ").unwrap();
        assert_eq!(rule.operator, Operator::Le);
        assert_eq!(rule.threshold, -0.5);

        assert_eq!(parse_rule("==1").unwrap().operator, Operator::Eq);
        assert_eq!(parse_rule("<1").unwrap().operator, Operator::Lt);
    }

    #[test]
    fn test_parse_failures_are_structured() {
        assert_eq!(parse_rule(""), Err(RuleParseError::Empty));
        assert_eq!(
            parse_rule("bogus"),
            Err(RuleParseError::MissingOperator("bogus".to_string()))
        );
        assert_eq!(
            parse_rule(">="),
            Err(RuleParseError::MissingThreshold(">=".to_string()))
        );
        assert_eq!(
            parse_rule("> abc"),
            Err(RuleParseError::InvalidThreshold("abc".to_string()))
        );
        assert!(matches!(parse_rule("< inf"), Err(RuleParseError::InvalidThreshold(_))));
        // A single `=` is not an operator
        assert!(matches!(parse_rule("= 5"), Err(RuleParseError::MissingOperator(_))));
        // `=>` is not accepted either: `>` is missing from the front
        assert!(matches!(parse_rule("=> 5"), Err(RuleParseError::MissingOperator(_))));
    }

    #[test]
    fn test_from_str() {
        let ParsedRule(rule) = "< 20".parse().unwrap();
        assert_eq!(rule.operator, Operator::Lt);
        assert_eq!(rule.threshold, 20.0);
    }

    #[test]
    fn test_fractional_thresholds() {
        assert_relative_eq!(parse_rule("< 0.35").unwrap().threshold, 0.35, epsilon = 1e-12);
        assert_relative_eq!(parse_rule(">= 1e-2").unwrap().threshold, 0.01, epsilon = 1e-12);
        assert_relative_eq!(parse_rule("> .5").unwrap().threshold, 0.5, epsilon = 1e-12);
    }
}

//! Rule evaluation and scoring for resolved fundamental metrics.

pub mod config;
pub mod engine;
pub mod evaluator;
pub mod parser;
pub mod scoring;

pub use config::{ConfigError, RuleConfig, RuleEntry, RuleSet};
pub use engine::{FundamentalScreener, RuleKind, ScreeningReport};
pub use evaluator::{evaluate, evaluate_rule_set, evaluate_text};
pub use parser::{parse_rule, ParsedRule, RuleParseError};
pub use scoring::{aggregate, aggregate_unweighted};

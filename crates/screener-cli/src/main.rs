//! screener: score a company's fundamentals against saved buy and valuation rules.
//!
//! Usage:
//!   screener run "Data Sheet.csv" "Profit & Loss.csv"
//!   screener run --json peers.json ocr.txt
//!   pbpaste | screener run -
//!   screener rules init
//!   screener rules show --rules my_rules.json

mod config;
mod loaders;
mod report;
mod rules_store;

use anyhow::{bail, Context, Result};
use fundamental_analysis::{FundamentalScreener, RuleConfig};
use metric_resolver::AliasCatalog;
use std::path::PathBuf;

use crate::config::ScreenerConfig;
use crate::loaders::source_for_path;
use crate::report::render_text;
use crate::rules_store::{load_catalog, load_rules, save_rules};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Run { inputs: Vec<String> },
    RulesInit,
    RulesShow,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    command: Command,
    rules_file: Option<PathBuf>,
    catalog_file: Option<PathBuf>,
    max_row_values: Option<usize>,
    json: bool,
    force: bool,
}

impl CliArgs {
    fn apply_overrides(&self, config: &mut ScreenerConfig) {
        if let Some(path) = &self.rules_file {
            config.rules_file = path.clone();
        }
        if let Some(path) = &self.catalog_file {
            config.catalog_file = Some(path.clone());
        }
        if let Some(n) = self.max_row_values {
            config.max_row_values = n;
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let mut config = ScreenerConfig::from_env()?;
    cli.apply_overrides(&mut config);

    match &cli.command {
        Command::Run { inputs } => run(&config, inputs, cli.json),
        Command::RulesInit => rules_init(&config, cli.force),
        Command::RulesShow => rules_show(&config),
        Command::Help => {
            print_usage();
            Ok(())
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("screener=info,fundamental_analysis=info,metric_resolver=warn")
    });
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut cli = CliArgs {
        command: Command::Help,
        rules_file: None,
        catalog_file: None,
        max_row_values: None,
        json: false,
        force: false,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--rules" => cli.rules_file = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--catalog" => cli.catalog_file = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--max-row-values" => {
                let raw = flag_value(&mut iter, arg)?;
                cli.max_row_values = Some(
                    raw.parse()
                        .with_context(|| format!("--max-row-values expects a number, got '{}'", raw))?,
                );
            }
            "--json" => cli.json = true,
            "--force" => cli.force = true,
            "-h" | "--help" => return Ok(cli),
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    cli.command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("run") => {
            let inputs: Vec<String> = positional.collect();
            if inputs.is_empty() {
                bail!("run needs at least one input file (.csv, .json, .txt or -)");
            }
            Command::Run { inputs }
        }
        Some("rules") => match positional.next().as_deref() {
            Some("init") => Command::RulesInit,
            Some("show") => Command::RulesShow,
            Some(other) => bail!("unknown rules command '{}'", other),
            None => bail!("rules needs a subcommand: init or show"),
        },
        Some(other) => bail!("unknown command '{}'", other),
    };
    Ok(cli)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .with_context(|| format!("{} expects a value", flag))
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  screener run [OPTIONS] <INPUT>...   Screen tables from .csv, .json or .txt files (- reads stdin)");
    eprintln!("  screener rules init [--force]       Write the default rules file");
    eprintln!("  screener rules show                 Print the active rules");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rules PATH           Rules file (default: $SCREENER_RULES_FILE or saved_rules.json)");
    eprintln!("  --catalog PATH         Alias catalog JSON replacing the built-in one");
    eprintln!("  --max-row-values N     Cells kept from a headerless row (default: 5)");
    eprintln!("  --json                 Print the report as JSON");
}

fn run(config: &ScreenerConfig, inputs: &[String], json: bool) -> Result<()> {
    let rules = load_rules(&config.rules_file)?;
    let custom_catalog = config.catalog_file.as_deref().map(load_catalog).transpose()?;
    let catalog = custom_catalog.as_ref().unwrap_or(AliasCatalog::builtin());
    let screener = FundamentalScreener::new(catalog, config.resolver_options());

    let sources = inputs
        .iter()
        .map(|input| source_for_path(input, &config.header_marker))
        .collect::<Result<Vec<_>, _>>()?;
    let report = screener
        .screen_sources(&sources, &rules)
        .context("Failed to load input tables")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}

fn rules_init(config: &ScreenerConfig, force: bool) -> Result<()> {
    if config.rules_file.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            config.rules_file.display()
        );
    }
    save_rules(&config.rules_file, &RuleConfig::default())?;
    println!("Wrote default rules to {}", config.rules_file.display());
    Ok(())
}

fn rules_show(config: &ScreenerConfig) -> Result<()> {
    let rules = load_rules(&config.rules_file)?;
    println!("{}", rules.to_json_pretty()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = parse_args(&args(&[
            "run",
            "--json",
            "--rules",
            "mine.json",
            "Data Sheet.csv",
            "ocr.txt",
            "--max-row-values",
            "8",
        ]))
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Run {
                inputs: args(&["Data Sheet.csv", "ocr.txt"])
            }
        );
        assert!(cli.json);
        assert_eq!(cli.rules_file, Some(PathBuf::from("mine.json")));
        assert_eq!(cli.max_row_values, Some(8));
    }

    #[test]
    fn test_parse_rules_subcommands() {
        assert_eq!(parse_args(&args(&["rules", "init"])).unwrap().command, Command::RulesInit);
        assert_eq!(parse_args(&args(&["rules", "show"])).unwrap().command, Command::RulesShow);
        assert!(parse_args(&args(&["rules"])).is_err());
        assert!(parse_args(&args(&["rules", "edit"])).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["run"])).is_err());
        assert!(parse_args(&args(&["run", "a.csv", "--rules"])).is_err());
        assert!(parse_args(&args(&["run", "a.csv", "--max-row-values", "many"])).is_err());
        assert!(parse_args(&args(&["run", "a.csv", "--verbose"])).is_err());
        assert!(parse_args(&args(&["screen"])).is_err());
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse_args(&[]).unwrap().command, Command::Help);
        assert_eq!(parse_args(&args(&["--help"])).unwrap().command, Command::Help);
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let cli = parse_args(&args(&["run", "x.csv", "--catalog", "aliases.json"])).unwrap();
        let mut config = ScreenerConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.catalog_file, Some(PathBuf::from("aliases.json")));
        assert_eq!(config.rules_file, PathBuf::from("saved_rules.json"));
    }
}

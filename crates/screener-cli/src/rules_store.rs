use anyhow::{Context, Result};
use fundamental_analysis::RuleConfig;
use metric_resolver::AliasCatalog;
use std::path::Path;
use tracing::info;

/// Load the saved rule configuration, falling back to the defaults when the
/// file does not exist yet.
pub fn load_rules(path: &Path) -> Result<RuleConfig> {
    if !path.exists() {
        info!(path = %path.display(), "No saved rules; using defaults");
        return Ok(RuleConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let config = RuleConfig::from_json(&contents)
        .with_context(|| format!("Invalid rules file {}", path.display()))?;
    info!(
        path = %path.display(),
        buy_rules = config.buy_rules.len(),
        valuation_rules = config.valuation_rules.len(),
        "Loaded rules"
    );
    Ok(config)
}

pub fn save_rules(path: &Path, config: &RuleConfig) -> Result<()> {
    config.validate()?;
    let json = config.to_json_pretty()?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write rules file {}", path.display()))?;
    info!(path = %path.display(), "Saved rules");
    Ok(())
}

pub fn load_catalog(path: &Path) -> Result<AliasCatalog> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read alias catalog {}", path.display()))?;
    let catalog = AliasCatalog::from_json(&contents)
        .with_context(|| format!("Invalid alias catalog {}", path.display()))?;
    info!(path = %path.display(), metrics = catalog.len(), "Loaded alias catalog");
    Ok(catalog)
}

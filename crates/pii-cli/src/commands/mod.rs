pub mod init;
pub mod redact;
pub mod rules;
pub mod scan;
pub mod serve;

use anyhow::{Context, Result};
use pii_config::Config;
use pii_security::RuleSet;
use std::path::Path;

/// Explicit config files must exist; the default one is created on first use
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Rules from `path`, or the built-in set
pub fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    match path {
        Some(path) => RuleSet::load(path)
            .with_context(|| format!("Failed to load rules from {}", path.display())),
        None => Ok(RuleSet::default()),
    }
}

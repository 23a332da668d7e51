use anyhow::Result;
use pii_config::Config;
use pii_security::RuleSet;
use std::path::Path;

pub fn handle(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    let (config, rules_path) = write_defaults(&config_path)?;

    println!("✓ Created {}", config_path.display());
    println!("✓ Created {}", rules_path.display());
    println!("  Output file: {}", config.output.path.display());
    println!("  Run 'pii-sanitizer serve' to start the service");

    Ok(())
}

/// Write the default config and a `rules.json` beside it
pub fn write_defaults(config_path: &Path) -> Result<(Config, std::path::PathBuf)> {
    let dir = config_path.parent().unwrap_or(Path::new("."));
    let rules_path = dir.join("rules.json");

    let mut config = Config::default();
    config.rules.path = Some(rules_path.clone());
    config.save(config_path)?;

    std::fs::write(&rules_path, RuleSet::default().to_json_pretty()?)?;

    Ok((config, rules_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_defaults_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pii").join("config.toml");

        let (_, rules_path) = write_defaults(&config_path).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.rules.path.as_deref(), Some(rules_path.as_path()));

        let rules = RuleSet::load(&rules_path).unwrap();
        assert_eq!(rules, RuleSet::default());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();

        assert!(handle(Some(config_path.as_path()), false).is_err());
        assert!(handle(Some(config_path.as_path()), true).is_ok());
    }
}

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Diagnostics go to stderr so `redact` output stays clean
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if cli.log_json {
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

    let config_path = cli.config.as_deref();

    match cli.command {
        cli::Commands::Serve {
            host,
            port,
            output,
            rules,
            format,
            dry_run,
        } => {
            let mut config = commands::load_config(config_path)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(output) = output {
                config.output.path = output;
            }
            if let Some(format) = format {
                config.output.format = format.into();
            }
            if rules.is_some() {
                config.rules.path = rules;
            }
            commands::serve::handle(config, dry_run).await
        }
        cli::Commands::Redact { file, rules, stats } => {
            let config = commands::load_config(config_path)?;
            let rules = commands::load_rules(rules.as_deref().or(config.rules.path.as_deref()))?;
            commands::redact::handle(&rules, file.as_deref(), stats)
        }
        cli::Commands::Scan {
            input,
            output,
            rules,
        } => {
            let config = commands::load_config(config_path)?;
            let rules = commands::load_rules(rules.as_deref().or(config.rules.path.as_deref()))?;
            commands::scan::handle(&rules, &input, &output)
        }
        cli::Commands::Init { force } => commands::init::handle(config_path, force),
        cli::Commands::Rules { rules, json } => {
            let config = commands::load_config(config_path)?;
            let rules = commands::load_rules(rules.as_deref().or(config.rules.path.as_deref()))?;
            commands::rules::handle(&rules, json)
        }
    }
}

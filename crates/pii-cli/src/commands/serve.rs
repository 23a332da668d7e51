use anyhow::{Context, Result};
use pii_config::Config;
use pii_engine::Sanitizer;
use pii_server::{SanitizerServer, ServeOptions};
use pii_sink::{FileSink, LineSink, MemorySink};
use std::sync::Arc;
use tracing::info;

pub async fn handle(config: Config, dry_run: bool) -> Result<()> {
    config.validate()?;
    let rules = super::load_rules(config.rules.path.as_deref())?;

    let sink: Arc<dyn LineSink> = if dry_run {
        info!("Dry run: sanitized lines will not be written");
        Arc::new(MemorySink::new())
    } else {
        let sink = FileSink::open(&config.output.path, config.output.sync_every_write)
            .await
            .with_context(|| {
                format!("Cannot open output file {}", config.output.path.display())
            })?;
        Arc::new(sink)
    };

    let sanitizer = Arc::new(Sanitizer::new(&rules, sink, config.output.format)?);
    info!(
        "Loaded {} text patterns, {} field rules, {} combination rules",
        sanitizer.redactor().pattern_names().len(),
        rules.standalone_pii_patterns.len(),
        rules.combinatorial_pii_sets.len()
    );

    let server = Arc::new(SanitizerServer {
        sanitizer,
        max_line_bytes: config.server.max_line_bytes,
        dry_run,
    });

    println!(
        "Starting PII sanitizer on {}:{}",
        config.server.host, config.server.port
    );
    server
        .serve(ServeOptions {
            host: config.server.host,
            port: config.server.port,
            max_body_bytes: config.server.max_body_bytes,
            allow_any_origin: config.server.allow_any_origin,
        })
        .await
}

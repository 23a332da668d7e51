//! Batch scanning of CSV files holding one JSON record per row

use anyhow::{Context, Result};
use pii_core::ScanOutcome;
use pii_engine::Sanitizer;
use pii_security::RuleSet;
use pii_sink::MemorySink;
use serde::Deserialize;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

const PARSE_ERROR_REASON: &str = "Data parsing error";

#[derive(Debug, Deserialize)]
struct InputRow {
    record_id: String,
    #[serde(default)]
    data_json: Option<String>,
}

pub fn handle(rules: &RuleSet, input: &Path, output: &Path) -> Result<()> {
    // Scanning is pure; the sink is never written to
    let sanitizer = Sanitizer::new(rules, Arc::new(MemorySink::new()), Default::default())?;

    println!("Starting PII scan on '{}'...", input.display());

    let reader = std::fs::File::open(input)
        .with_context(|| format!("The file '{}' was not found", input.display()))?;
    let writer = std::fs::File::create(output)
        .with_context(|| format!("Cannot create '{}'", output.display()))?;

    let count = scan_csv(&sanitizer, reader, writer)?;

    println!("Scan complete. Processed {} records.", count);
    println!("Sanitized output saved to '{}'.", output.display());
    Ok(())
}

/// Scan every row of `input`, writing one result row per input row.
/// Returns the number of rows that parsed as JSON objects.
pub fn scan_csv(sanitizer: &Sanitizer, input: impl Read, output: impl Write) -> Result<usize> {
    let mut reader = csv::Reader::from_reader(input);
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "record_id",
        "redacted_data_json",
        "is_pii",
        "confidence_score",
        "reason",
    ])?;

    let mut count = 0;
    for (index, row) in reader.deserialize::<InputRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed CSV row {}", index + 1))?;
        let raw = row.data_json.unwrap_or_else(|| "{}".to_string());

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(record)) => {
                let outcome = sanitizer.scan_record(&record);
                write_outcome(&mut writer, &row.record_id, &outcome)?;
                count += 1;
            }
            _ => {
                writer.write_record([
                    row.record_id.as_str(),
                    raw.as_str(),
                    "false",
                    "0.0",
                    PARSE_ERROR_REASON,
                ])?;
            }
        }
    }

    writer.flush()?;
    Ok(count)
}

fn write_outcome<W: Write>(
    writer: &mut csv::Writer<W>,
    record_id: &str,
    outcome: &ScanOutcome,
) -> Result<()> {
    let record_json = serde_json::to_string(&outcome.record)?;
    writer.write_record([
        record_id,
        record_json.as_str(),
        if outcome.is_pii { "true" } else { "false" },
        format!("{:?}", outcome.confidence).as_str(),
        outcome.reason.as_str(),
    ])?;
    Ok(())
}

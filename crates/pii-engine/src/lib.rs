use std::collections::BTreeSet;
use std::sync::Arc;

use pii_core::scan::NO_PII_REASON;
use pii_core::{CoreError, LogLine, OutputFormat, SanitizedLine, ScanOutcome};
use pii_security::{RecordScanner, Redactor, RuleError, RuleSet};
use pii_sink::{LineSink, SinkError};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Rules(#[from] RuleError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Redact-then-append pipeline shared by the HTTP server and the CLI
pub struct Sanitizer {
    redactor: Arc<Redactor>,
    scanner: Arc<RecordScanner>,
    sink: Arc<dyn LineSink>,
    format: OutputFormat,
}

impl Sanitizer {
    pub fn new(rules: &RuleSet, sink: Arc<dyn LineSink>, format: OutputFormat) -> Result<Self> {
        Ok(Self {
            redactor: Arc::new(Redactor::with_custom(&rules.text_patterns)?),
            scanner: Arc::new(RecordScanner::new(rules)?),
            sink,
            format,
        })
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn sink(&self) -> &Arc<dyn LineSink> {
        &self.sink
    }

    /// Redact a line without writing it
    pub fn sanitize(&self, line: &LogLine) -> SanitizedLine {
        let (text, findings) = self.redactor.redact(&line.text);
        let sanitized = SanitizedLine::from_line(line, text, findings);
        debug!(
            id = %sanitized.id,
            redactions = sanitized.redaction_count(),
            "Sanitized log line"
        );
        sanitized
    }

    /// Redact a line and append it to the sink
    pub async fn ingest(&self, line: LogLine) -> Result<SanitizedLine> {
        let mut out = self.ingest_batch(vec![line]).await?;
        // ingest_batch returns exactly one entry per input line
        Ok(out.remove(0))
    }

    /// Redact all lines, then append them with a single sink call
    pub async fn ingest_batch(&self, lines: Vec<LogLine>) -> Result<Vec<SanitizedLine>> {
        let sanitized: Vec<SanitizedLine> = lines.iter().map(|l| self.sanitize(l)).collect();
        let rendered = sanitized
            .iter()
            .map(|s| s.render(self.format))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        self.append(&rendered).await?;
        Ok(sanitized)
    }

    /// Scan a structured record and redact free text left in unmatched string values.
    ///
    /// Free-text hits are listed in `reason` as `found text pii [..]`; the
    /// confidence score comes from the field rules alone.
    pub fn scan_record(&self, record: &Map<String, Value>) -> ScanOutcome {
        let mut outcome = self.scanner.scan(record);
        let mut kinds = BTreeSet::new();

        for (key, value) in outcome.record.iter_mut() {
            // Values already replaced by the scanner are left alone
            if record.get(key) != Some(&*value) {
                continue;
            }
            self.redact_value(value, &mut kinds);
        }

        if !kinds.is_empty() {
            let entry = format!(
                "found text pii [{}]",
                kinds.into_iter().collect::<Vec<_>>().join("+")
            );
            if outcome.reason == NO_PII_REASON {
                outcome.reason = entry;
            } else {
                outcome.reason = format!("{}, {}", outcome.reason, entry);
            }
        }

        outcome
    }

    fn redact_value(&self, value: &mut Value, kinds: &mut BTreeSet<String>) {
        match value {
            Value::String(s) => {
                let (redacted, findings) = self.redactor.redact(s);
                if !findings.is_empty() {
                    *s = redacted;
                    kinds.extend(findings.into_iter().map(|f| f.kind));
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.redact_value(v, kinds)),
            Value::Object(map) => map.values_mut().for_each(|v| self.redact_value(v, kinds)),
            _ => {}
        }
    }

    /// Scan a record and append the masked record as one JSON line
    pub async fn ingest_record(&self, record: Value) -> Result<ScanOutcome> {
        let Value::Object(record) = record else {
            return Err(CoreError::NotAnObject.into());
        };

        let outcome = self.scan_record(&record);
        let line = serde_json::to_string(&outcome.record).map_err(CoreError::from)?;
        self.append(&[line]).await?;

        debug!(is_pii = outcome.is_pii, confidence = outcome.confidence, "Scanned record");
        Ok(outcome)
    }

    async fn append(&self, lines: &[String]) -> Result<()> {
        if let Err(e) = self.sink.append(lines).await {
            warn!("Failed to append to {}: {}", self.sink.describe(), e);
            return Err(e.into());
        }
        Ok(())
    }
}

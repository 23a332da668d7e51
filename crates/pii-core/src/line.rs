//! Log line domain model

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::{CoreError, Finding, Result};

/// A raw log line as received from a sending application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    pub text: String,
}

impl LogLine {
    /// Validate and wrap a single line.
    ///
    /// One trailing `\n` or `\r\n` is stripped. Blank lines, lines with
    /// embedded newlines and lines longer than `max_bytes` are rejected.
    pub fn new(text: &str, source: Option<String>, max_bytes: usize) -> Result<Self> {
        let text = strip_line_ending(text);

        if text.trim().is_empty() {
            return Err(CoreError::EmptyLine);
        }
        if text.contains(['\n', '\r']) {
            return Err(CoreError::EmbeddedNewline);
        }
        if text.len() > max_bytes {
            return Err(CoreError::LineTooLong {
                len: text.len(),
                max: max_bytes,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            source,
            received_at: OffsetDateTime::now_utc(),
            text: text.to_string(),
        })
    }

    /// Split a multi-line body into log lines, skipping blank lines.
    ///
    /// Fails if no non-blank line is present or any line exceeds `max_bytes`.
    pub fn split_batch(body: &str, source: Option<String>, max_bytes: usize) -> Result<Vec<Self>> {
        let lines = body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Self::new(l, source.clone(), max_bytes))
            .collect::<Result<Vec<_>>>()?;

        if lines.is_empty() {
            return Err(CoreError::EmptyLine);
        }
        Ok(lines)
    }
}

fn strip_line_ending(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// How sanitized lines are written to the output file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `<rfc3339 timestamp> <sanitized text>`
    #[default]
    Plain,
    /// One JSON object per line
    Json,
}

/// A log line after redaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedLine {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub received_at: OffsetDateTime,
    pub text: String,
    pub findings: Vec<Finding>,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    id: &'a Uuid,
    received_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    message: &'a str,
    redactions: &'a [Finding],
}

impl SanitizedLine {
    pub fn from_line(line: &LogLine, text: String, findings: Vec<Finding>) -> Self {
        Self {
            id: line.id,
            source: line.source.clone(),
            received_at: line.received_at,
            text,
            findings,
        }
    }

    /// Total number of replacements made in this line
    pub fn redaction_count(&self) -> usize {
        self.findings.iter().map(|f| f.count).sum()
    }

    /// Render the line as it is written to the output file (no trailing newline)
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        let timestamp = self.received_at.format(&Rfc3339)?;

        match format {
            OutputFormat::Plain => Ok(format!("{} {}", timestamp, self.text)),
            OutputFormat::Json => {
                let line = JsonLine {
                    id: &self.id,
                    received_at: timestamp,
                    source: self.source.as_deref(),
                    message: &self.text,
                    redactions: &self.findings,
                };
                Ok(serde_json::to_string(&line)?)
            }
        }
    }
}

use anyhow::{Context, Result};
use pii_security::{Redactor, RuleSet};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub fn handle(rules: &RuleSet, file: Option<&Path>, stats: bool) -> Result<()> {
    let redactor = Redactor::with_custom(&rules.text_patterns)?;

    let input: Box<dyn BufRead> = match file {
        Some(path) => Box::new(BufReader::new(
            std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(std::io::stdin().lock()),
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let totals = redact_stream(&redactor, input, &mut out)?;
    out.flush()?;

    if stats {
        if totals.is_empty() {
            eprintln!("No PII found.");
        }
        for (kind, count) in &totals {
            eprintln!("  {}: {}", kind, count);
        }
    }

    Ok(())
}

/// Redact every line of `input` into `out`, returning counts per PII kind
pub fn redact_stream(
    redactor: &Redactor,
    mut input: impl BufRead,
    mut out: impl Write,
) -> Result<BTreeMap<String, usize>> {
    let mut totals = BTreeMap::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).context("Failed to read input")? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        // Invalid UTF-8 is replaced rather than ending the run mid-output
        let line = String::from_utf8_lossy(&buf);
        let (redacted, findings) = redactor.redact(&line);
        for finding in findings {
            *totals.entry(finding.kind).or_insert(0) += finding.count;
        }
        writeln!(out, "{}", redacted)?;
    }

    Ok(totals)
}

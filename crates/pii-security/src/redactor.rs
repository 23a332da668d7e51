use pii_core::Finding;
use regex::{Captures, Regex};

use crate::rules::{RuleError, TextPatternDef, compile};

struct TextPattern {
    name: String,
    regex: Regex,
    /// Extra check on each match; a rejected match is left untouched
    validator: Option<fn(&str) -> bool>,
}

/// Redaction engine for free-text log lines
pub struct Redactor {
    patterns: Vec<TextPattern>,
}

impl Redactor {
    pub fn new() -> Self {
        let mut redactor = Self {
            patterns: Vec::new(),
        };

        // Order matters - more specific first
        redactor.builtin("PRIVATE_KEY", r"-----BEGIN[A-Z ]*PRIVATE KEY-----", None);
        redactor.builtin("AWS_ACCESS_KEY", r"AKIA[0-9A-Z]{16}", None);
        redactor.builtin("GITHUB_TOKEN", r"gh[ps]_[a-zA-Z0-9]{36,}", None);
        redactor.builtin(
            "JWT",
            r"eyJ[a-zA-Z0-9_-]+\.eyJ[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+",
            None,
        );
        redactor.builtin("BEARER_TOKEN", r"(?i)bearer\s+([a-zA-Z0-9_.\-]{20,})", None);
        redactor.builtin(
            "API_KEY",
            r#"(?i)(api[_-]?key|apikey)['"\s:=]+([a-zA-Z0-9_-]{20,})"#,
            None,
        );
        redactor.builtin(
            "EMAIL",
            r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}",
            None,
        );
        redactor.builtin("CREDIT_CARD", r"\b(?:\d[ -]?){12,18}\d\b", Some(luhn_valid));
        redactor.builtin("SSN", r"\b\d{3}-\d{2}-\d{4}\b", None);
        redactor.builtin(
            "IPV4",
            r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b",
            None,
        );
        redactor.builtin(
            "PHONE",
            r"(?:\+\d{1,3}[ .-]?)?(?:\(\d{3}\)\s?|\b\d{3}[ .-])\d{3}[ .-]\d{4}\b|\+\d{10,14}\b",
            None,
        );

        redactor
    }

    /// Built-in patterns followed by the given custom ones
    pub fn with_custom(custom: &[TextPatternDef]) -> Result<Self, RuleError> {
        let mut redactor = Self::new();
        for def in custom {
            redactor.patterns.push(TextPattern {
                name: def.name.clone(),
                regex: compile(&def.name, &def.regex)?,
                validator: None,
            });
        }
        Ok(redactor)
    }

    fn builtin(&mut self, name: &str, pattern: &str, validator: Option<fn(&str) -> bool>) {
        self.patterns.push(TextPattern {
            name: name.to_string(),
            regex: Regex::new(pattern).expect("built-in pattern must compile"),
            validator,
        });
    }

    /// Names of all active patterns, in application order
    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    /// Redact PII from a line
    pub fn redact(&self, content: &str) -> (String, Vec<Finding>) {
        let mut result = content.to_string();
        let mut findings = Vec::new();

        for pattern in &self.patterns {
            let replacement = format!("[REDACTED:{}]", pattern.name);
            let mut count = 0;

            let replaced = pattern.regex.replace_all(&result, |caps: &Captures<'_>| {
                let matched = &caps[0];
                match pattern.validator {
                    Some(is_valid) if !is_valid(matched) => {
                        replace_valid_runs(matched, is_valid, &replacement, &mut count)
                    }
                    _ => {
                        count += 1;
                        replacement.clone()
                    }
                }
            });

            if count > 0 {
                result = replaced.into_owned();
                findings.push(Finding::new(pattern.name.clone(), count));
            }
        }

        (result, findings)
    }
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the valid runs inside a candidate the validator rejected as a whole.
///
/// A greedy match can swallow a neighbouring number ("4111... 100"), so the
/// candidate is split into separator-delimited digit groups and every
/// contiguous run of groups is tried, longest first from each start.
fn replace_valid_runs(
    candidate: &str,
    is_valid: fn(&str) -> bool,
    replacement: &str,
    count: &mut usize,
) -> String {
    let groups = digit_groups(candidate);
    let mut out = String::with_capacity(candidate.len());
    let mut copied = 0;
    let mut start = 0;

    while start < groups.len() {
        let hit = (start..groups.len())
            .rev()
            .find(|&end| is_valid(&candidate[groups[start].0..groups[end].1]));

        match hit {
            Some(end) => {
                out.push_str(&candidate[copied..groups[start].0]);
                out.push_str(replacement);
                copied = groups[end].1;
                *count += 1;
                start = end + 1;
            }
            None => start += 1,
        }
    }

    out.push_str(&candidate[copied..]);
    out
}

/// Byte spans of each run of ASCII digits
fn digit_groups(candidate: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in candidate.char_indices() {
        match (c.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, candidate.len()));
    }

    spans
}

/// Luhn checksum over the digits of `candidate`, ignoring separators
pub fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

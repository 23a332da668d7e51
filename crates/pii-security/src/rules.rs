//! Rule file model
//!
//! A rule set is loaded from JSON (or TOML when the file ends in `.toml`):
//!
//! ```json
//! {
//!   "standalone_pii_patterns": {
//!     "phone": { "regex": "\\d{10}", "base_score": 0.9, "redactor": "mask_numeric" }
//!   },
//!   "combinatorial_pii_sets": {
//!     "identity": { "keys": ["name", "email", "address"], "base_score": 0.3 }
//!   },
//!   "redaction_placeholders": { "name": "mask_string", "address": "[REDACTED_ADDRESS]" },
//!   "text_patterns": [ { "name": "EMPLOYEE_ID", "regex": "EMP-\\d{6}" } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MaskKind;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse rule file: {0}")]
    Parse(String),

    #[error("Invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid score {score} in rule '{rule}'")]
    InvalidScore { rule: String, score: f64 },

    #[error("Rule '{0}' has no keys")]
    EmptyCombo(String),
}

/// A key whose value alone identifies a person when it fully matches `regex`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandaloneRule {
    pub regex: String,
    pub base_score: f64,
    pub redactor: MaskKind,
}

/// Keys that identify a person only when two or more appear together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboRule {
    pub keys: Vec<String>,
    pub base_score: f64,
}

/// Extra free-text pattern; matches become `[REDACTED:<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPatternDef {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub standalone_pii_patterns: BTreeMap<String, StandaloneRule>,

    #[serde(default)]
    pub combinatorial_pii_sets: BTreeMap<String, ComboRule>,

    /// Key -> mask name or literal replacement, applied to combo matches
    #[serde(default)]
    pub redaction_placeholders: BTreeMap<String, String>,

    #[serde(default)]
    pub text_patterns: Vec<TextPatternDef>,
}

impl Default for RuleSet {
    fn default() -> Self {
        let standalone = [
            ("aadhar", r"\d{4}\s?\d{4}\s?\d{4}", 1.0, MaskKind::MaskNumeric),
            ("credit_card", r"\d{13,19}", 1.0, MaskKind::MaskNumeric),
            ("passport", r"[A-Z]\d{7}", 0.9, MaskKind::MaskString),
            ("phone", r"\d{10}", 0.9, MaskKind::MaskNumeric),
            ("ssn", r"\d{3}-\d{2}-\d{4}", 1.0, MaskKind::MaskNumeric),
            ("upi_id", r"[\w.\-]+@[a-zA-Z]+", 0.8, MaskKind::MaskEmail),
        ]
        .into_iter()
        .map(|(name, regex, base_score, redactor)| {
            (
                name.to_string(),
                StandaloneRule {
                    regex: regex.to_string(),
                    base_score,
                    redactor,
                },
            )
        })
        .collect();

        let mut combinatorial = BTreeMap::new();
        combinatorial.insert(
            "identity".to_string(),
            ComboRule {
                keys: ["name", "email", "address", "ip_address", "device_id", "pin_code"]
                    .iter()
                    .map(|k| k.to_string())
                    .collect(),
                base_score: 0.3,
            },
        );

        let placeholders = [
            ("name", "mask_string"),
            ("email", "mask_email"),
            ("address", "[REDACTED_ADDRESS]"),
            ("ip_address", "[REDACTED_IP]"),
            ("device_id", "[REDACTED_DEVICE_ID]"),
            ("pin_code", "mask_numeric"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            standalone_pii_patterns: standalone,
            combinatorial_pii_sets: combinatorial,
            redaction_placeholders: placeholders,
            text_patterns: Vec::new(),
        }
    }
}

impl RuleSet {
    /// Load and validate a rule file. `.toml` files are parsed as TOML,
    /// everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let rules = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json_str(content: &str) -> Result<Self, RuleError> {
        serde_json::from_str(content).map_err(|e| RuleError::Parse(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, RuleError> {
        toml::from_str(content).map_err(|e| RuleError::Parse(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, RuleError> {
        serde_json::to_string_pretty(self).map_err(|e| RuleError::Parse(e.to_string()))
    }

    /// Check every regex compiles and every score is a finite, non-negative number
    pub fn validate(&self) -> Result<(), RuleError> {
        for (name, rule) in &self.standalone_pii_patterns {
            check_score(name, rule.base_score)?;
            compile(name, &rule.regex)?;
        }

        for (name, rule) in &self.combinatorial_pii_sets {
            check_score(name, rule.base_score)?;
            if rule.keys.is_empty() {
                return Err(RuleError::EmptyCombo(name.clone()));
            }
        }

        for def in &self.text_patterns {
            compile(&def.name, &def.regex)?;
        }

        Ok(())
    }
}

fn check_score(rule: &str, score: f64) -> Result<(), RuleError> {
    if score.is_finite() && score >= 0.0 {
        Ok(())
    } else {
        Err(RuleError::InvalidScore {
            rule: rule.to_string(),
            score,
        })
    }
}

pub(crate) fn compile(rule: &str, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        rule: rule.to_string(),
        source,
    })
}

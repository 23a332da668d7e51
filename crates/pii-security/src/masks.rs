//! Value masking functions used by structured record scanning

use serde::{Deserialize, Serialize};
use serde_json::Value;

const SHORT_MASK: &str = "****";

/// Named masking strategy, referenced from rule files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    MaskString,
    MaskEmail,
    MaskNumeric,
}

impl MaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            MaskKind::MaskString => "mask_string",
            MaskKind::MaskEmail => "mask_email",
            MaskKind::MaskNumeric => "mask_numeric",
        }
    }

    /// Look up a mask by its rule-file name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mask_string" => Some(MaskKind::MaskString),
            "mask_email" => Some(MaskKind::MaskEmail),
            "mask_numeric" => Some(MaskKind::MaskNumeric),
            _ => None,
        }
    }

    /// Mask a JSON value.
    ///
    /// Non-string values are masked through their JSON text, except for
    /// `mask_string` which collapses them to `****`.
    pub fn apply(&self, value: &Value) -> String {
        match (self, value) {
            (MaskKind::MaskString, Value::String(s)) => mask_string(s),
            (MaskKind::MaskString, _) => SHORT_MASK.to_string(),
            (MaskKind::MaskEmail, Value::String(s)) => mask_email(s),
            (MaskKind::MaskEmail, other) => mask_string(&other.to_string()),
            (MaskKind::MaskNumeric, Value::String(s)) => mask_numeric(s),
            (MaskKind::MaskNumeric, other) => mask_numeric(&other.to_string()),
        }
    }
}

/// Keep the first and last two characters, replace the rest with `X`.
/// Values shorter than five characters become `****`.
pub fn mask_string(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 5 {
        return SHORT_MASK.to_string();
    }

    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}{}{}", head, "X".repeat(chars.len() - 4), tail)
}

/// Mask the local part of an address, keep the domain
pub fn mask_email(mail: &str) -> String {
    match mail.split_once('@') {
        Some((user, domain)) => format!("{}@{}", mask_string(user), domain),
        None => mask_string(mail),
    }
}

pub fn mask_numeric(num: &str) -> String {
    mask_string(num)
}

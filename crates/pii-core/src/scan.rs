//! Result of scanning a structured (JSON object) record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const NO_PII_REASON: &str = "No PII detected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    /// Copy of the input record with PII values masked
    pub record: Map<String, Value>,
    pub is_pii: bool,
    /// Clamped to `[0.0, 1.0]`, two decimal places
    pub confidence: f64,
    pub reason: String,
}

impl ScanOutcome {
    /// Outcome for a record where nothing matched
    pub fn clean(record: Map<String, Value>) -> Self {
        Self {
            record,
            is_pii: false,
            confidence: 0.0,
            reason: NO_PII_REASON.to_string(),
        }
    }
}

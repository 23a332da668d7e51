//! Rule-driven scanning of structured (JSON object) records

use std::collections::BTreeSet;

use pii_core::ScanOutcome;
use regex::Regex;
use serde_json::{Map, Value};

use crate::rules::{RuleError, RuleSet, compile};
use crate::MaskKind;

/// Records scoring above this are flagged as PII
const PII_THRESHOLD: f64 = 0.5;

struct CompiledStandalone {
    key: String,
    /// Anchored so only whole values match
    regex: Regex,
    base_score: f64,
    mask: MaskKind,
}

struct CompiledCombo {
    keys: Vec<String>,
    base_score: f64,
}

enum Placeholder {
    Mask(MaskKind),
    Literal(String),
}

pub struct RecordScanner {
    standalone: Vec<CompiledStandalone>,
    combos: Vec<CompiledCombo>,
    placeholders: Vec<(String, Placeholder)>,
}

impl RecordScanner {
    pub fn new(rules: &RuleSet) -> Result<Self, RuleError> {
        rules.validate()?;

        let standalone = rules
            .standalone_pii_patterns
            .iter()
            .map(|(key, rule)| {
                Ok(CompiledStandalone {
                    key: key.clone(),
                    regex: compile(key, &format!("^(?:{})$", rule.regex))?,
                    base_score: rule.base_score,
                    mask: rule.redactor,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;

        let combos = rules
            .combinatorial_pii_sets
            .values()
            .map(|rule| CompiledCombo {
                keys: rule.keys.clone(),
                base_score: rule.base_score,
            })
            .collect();

        let placeholders = rules
            .redaction_placeholders
            .iter()
            .map(|(key, value)| {
                let placeholder = match MaskKind::from_name(value) {
                    Some(mask) => Placeholder::Mask(mask),
                    None => Placeholder::Literal(value.clone()),
                };
                (key.clone(), placeholder)
            })
            .collect();

        Ok(Self {
            standalone,
            combos,
            placeholders,
        })
    }

    fn placeholder(&self, key: &str) -> Option<&Placeholder> {
        self.placeholders
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, p)| p)
    }

    /// Score a record and return a masked copy
    pub fn scan(&self, record: &Map<String, Value>) -> ScanOutcome {
        let mut safe = record.clone();
        let mut score = 0.0;
        let mut reasons = Vec::new();

        for rule in &self.standalone {
            if let Some(Value::String(value)) = record.get(&rule.key)
                && rule.regex.is_match(value)
            {
                score += rule.base_score;
                reasons.push(format!("found solo pii [{}]", rule.key));
                safe.insert(rule.key.clone(), Value::String(rule.mask.apply(&record[&rule.key])));
            }
        }

        let mut combo_keys = BTreeSet::new();
        for combo in &self.combos {
            let present: Vec<&str> = combo
                .keys
                .iter()
                .filter(|k| record.contains_key(k.as_str()))
                .map(String::as_str)
                .collect();

            if present.len() >= 2 {
                score += combo.base_score * present.len() as f64;
                reasons.push(format!("found combo pii [{}]", present.join("+")));
                combo_keys.extend(present);
            }
        }

        for key in combo_keys {
            let Some(original) = record.get(key) else {
                continue;
            };
            match self.placeholder(key) {
                Some(Placeholder::Mask(mask)) => {
                    safe.insert(key.to_string(), Value::String(mask.apply(original)));
                }
                Some(Placeholder::Literal(text)) => {
                    safe.insert(key.to_string(), Value::String(text.clone()));
                }
                None => {}
            }
        }

        if reasons.is_empty() {
            return ScanOutcome::clean(safe);
        }

        let confidence = round2(score.min(1.0));
        ScanOutcome {
            record: safe,
            is_pii: confidence > PII_THRESHOLD,
            confidence,
            reason: reasons.join(", "),
        }
    }
}

/// Two decimal places, ties to even
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pii_core::scan::NO_PII_REASON;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn scanner() -> RecordScanner {
        RecordScanner::new(&RuleSet::default()).unwrap()
    }

    #[test]
    fn test_standalone_phone() {
        let outcome = scanner().scan(&object(json!({
            "phone": "9876543210",
            "order_value": 1299
        })));

        assert!(outcome.is_pii);
        assert_eq!(outcome.confidence, 0.9);
        assert_eq!(outcome.reason, "found solo pii [phone]");
        assert_eq!(outcome.record["phone"], "98XXXXXX10");
        assert_eq!(outcome.record["order_value"], 1299);
    }

    #[test]
    fn test_standalone_requires_full_match() {
        let outcome = scanner().scan(&object(json!({ "phone": "98765432101234x" })));
        assert!(!outcome.is_pii);
        assert_eq!(outcome.record["phone"], "98765432101234x");
        assert_eq!(outcome.reason, NO_PII_REASON);
    }

    #[test]
    fn test_standalone_ignores_non_string_values() {
        let outcome = scanner().scan(&object(json!({ "phone": 9876543210u64 })));
        assert!(!outcome.is_pii);
        assert_eq!(outcome.confidence, 0.0);
        assert_eq!(outcome.record["phone"], 9876543210u64);
    }

    #[test]
    fn test_combo_masks_and_placeholders() {
        let outcome = scanner().scan(&object(json!({
            "name": "Rahul Sharma",
            "email": "rahul.sharma@gmail.com",
            "address": "12 MG Road, Pune",
            "city": "Pune"
        })));

        assert!(outcome.is_pii);
        assert_eq!(outcome.confidence, 0.9);
        assert_eq!(outcome.reason, "found combo pii [name+email+address]");
        assert_eq!(outcome.record["name"], "RaXXXXXXXXma");
        assert_eq!(outcome.record["email"], "raXXXXXXXXma@gmail.com");
        assert_eq!(outcome.record["address"], "[REDACTED_ADDRESS]");
        assert_eq!(outcome.record["city"], "Pune");
    }

    #[test]
    fn test_single_combo_key_is_not_pii() {
        let outcome = scanner().scan(&object(json!({ "name": "Rahul Sharma", "city": "Pune" })));
        assert!(!outcome.is_pii);
        assert_eq!(outcome.record["name"], "Rahul Sharma");
        assert_eq!(outcome.reason, NO_PII_REASON);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let outcome = scanner().scan(&object(json!({
            "phone": "9876543210",
            "aadhar": "1234 5678 9012",
            "name": "Asha Rao",
            "pin_code": 411001
        })));

        assert_eq!(outcome.confidence, 1.0);
        assert!(outcome.is_pii);
        assert_eq!(
            outcome.reason,
            "found solo pii [aadhar], found solo pii [phone], found combo pii [name+pin_code]"
        );
        assert_eq!(outcome.record["pin_code"], "41XX01");
    }

    #[test]
    fn test_low_score_combo_below_threshold() {
        let rules = RuleSet::from_json_str(
            r#"{
                "combinatorial_pii_sets": { "weak": { "keys": ["city", "state"], "base_score": 0.2 } },
                "redaction_placeholders": { "city": "[CITY]" }
            }"#,
        )
        .unwrap();
        let scanner = RecordScanner::new(&rules).unwrap();

        let outcome = scanner.scan(&object(json!({ "city": "Pune", "state": "MH" })));
        assert!(!outcome.is_pii);
        assert_eq!(outcome.confidence, 0.4);
        assert_eq!(outcome.reason, "found combo pii [city+state]");
        assert_eq!(outcome.record["city"], "[CITY]");
        assert_eq!(outcome.record["state"], "MH");
    }

    #[test]
    fn test_confidence_rounds_half_to_even() {
        let rules = RuleSet::from_json_str(
            r#"{
                "standalone_pii_patterns": {
                    "badge": { "regex": "B\\d{4}", "base_score": 0.125, "redactor": "mask_string" }
                }
            }"#,
        )
        .unwrap();
        let scanner = RecordScanner::new(&rules).unwrap();

        let outcome = scanner.scan(&object(json!({ "badge": "B1234" })));
        assert_eq!(outcome.confidence, 0.12);
        assert!(!outcome.is_pii);
        assert_eq!(outcome.record["badge"], "B1X34");

        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(0.9), 0.9);
    }

    #[test]
    fn test_empty_record() {
        let outcome = scanner().scan(&Map::new());
        assert_eq!(outcome, ScanOutcome::clean(Map::new()));
    }
}

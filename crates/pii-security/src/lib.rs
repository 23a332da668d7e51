//! PII redaction engines
//!
//! - [`Redactor`]: pattern-based redaction of free-text log lines
//! - [`RecordScanner`]: rule-driven scanning and masking of JSON records
//! - [`RuleSet`]: the serializable rule file both engines are built from

pub mod masks;
pub mod redactor;
pub mod rules;
pub mod scanner;

pub use masks::{MaskKind, mask_email, mask_numeric, mask_string};
pub use redactor::{Redactor, luhn_valid};
pub use rules::{ComboRule, RuleError, RuleSet, StandaloneRule, TextPatternDef};
pub use scanner::RecordScanner;

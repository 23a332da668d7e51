//! Core domain models for the PII sanitizer
//!
//! This crate contains:
//! - Log line models (raw and sanitized)
//! - Redaction findings and structured scan outcomes
//! - Output line formatting

pub mod error;
pub mod finding;
pub mod line;
pub mod scan;

pub use error::{CoreError, Result};
pub use finding::Finding;
pub use line::{LogLine, OutputFormat, SanitizedLine};
pub use scan::ScanOutcome;

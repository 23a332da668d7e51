use serde::{Deserialize, Serialize};

/// One kind of PII found in a line, with how many times it was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: String,
    pub count: usize,
}

impl Finding {
    pub fn new(kind: impl Into<String>, count: usize) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }
}

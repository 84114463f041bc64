//! Recoverable problems found while decoding.
//!
//! A warning never stops the parse. The affected field, directory or block
//! is skipped and decoding carries on with the rest of the file.

use std::fmt;

use serde::Serialize;
use tracing::warn;

/// A single recoverable problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Absolute offset into the raw buffer where the problem was found
    pub offset: u64,

    /// Human-readable description
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:06X}] {}", self.offset, self.message)
    }
}

/// Ordered list of warnings collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    pub warnings: Vec<Warning>,
}

impl ParseDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and emit it through `tracing`.
    pub fn warn(&mut self, offset: u64, message: impl Into<String>) {
        let message = message.into();
        warn!(offset, "{}", message);
        self.warnings.push(Warning { offset, message });
    }

    /// True when nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.warnings.iter()
    }

    /// Whether any warning message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.warnings.iter().any(|w| w.message.contains(needle))
    }
}

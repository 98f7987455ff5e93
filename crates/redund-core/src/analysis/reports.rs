//! Report structs for repetition analysis.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for
//! use in both CLI JSON output and MCP tool responses.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A sentence or phrase that recurs on at least two distinct lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Repetition {
    /// Display text, taken from the first occurrence.
    pub text: String,
    /// Number of distinct lines the text appears on.
    pub count: usize,
    /// Those line numbers, ascending.
    pub lines: Vec<usize>,
}

/// Repeated sentences and phrases found in one text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RepetitionReport {
    /// Whole sentences that recur.
    pub sentences: Vec<Repetition>,
    /// Multi-word phrases that recur.
    pub phrases: Vec<Repetition>,
    /// `sentences.len() + phrases.len()`.
    pub total_repeated: usize,
}

impl RepetitionReport {
    /// Build a report, computing the total.
    pub fn new(sentences: Vec<Repetition>, phrases: Vec<Repetition>) -> Self {
        let total_repeated = sentences.len() + phrases.len();
        Self {
            sentences,
            phrases,
            total_repeated,
        }
    }

    /// Returns `true` when nothing repeats.
    pub fn is_clean(&self) -> bool {
        self.total_repeated == 0
    }
}

//! Repetition analysis.
//!
//! The pipeline is normalize → split into sentences → record sentences and
//! their word windows → keep whatever shows up on more than one line.
//! [`analyze`] is the plain entry point; [`analyze_bounded`] adds the input
//! size guard used by the CLI and MCP server.

pub mod occurrences;
pub mod repeated;
pub mod reports;

pub use occurrences::{OccurrenceKey, OccurrenceMap, OccurrenceRecord};
pub use repeated::{DetectorSettings, RepetitionDetector, analyze_repetitions};
pub use reports::{Repetition, RepetitionReport};

use crate::error::{AnalysisError, AnalysisResult};
use crate::text::NormalizedText;

/// Default maximum input size, in characters (5 Mi).
pub const DEFAULT_MAX_INPUT_CHARS: usize = 5 * 1024 * 1024;

/// Analyze raw text with the default thresholds.
///
/// Never fails: empty or whitespace-only input yields an empty report.
pub fn analyze(text: &str) -> RepetitionReport {
    analyze_with(text, &DetectorSettings::default())
}

/// Analyze raw text with custom thresholds.
#[tracing::instrument(skip(text, settings), fields(text_len = text.len()))]
pub fn analyze_with(text: &str, settings: &DetectorSettings) -> RepetitionReport {
    let normalized = NormalizedText::new(text);
    let report = RepetitionDetector::new(*settings).detect(&normalized);
    tracing::debug!(
        sentences = report.sentences.len(),
        phrases = report.phrases.len(),
        "repetition analysis complete"
    );
    report
}

/// Analyze raw text, refusing inputs longer than `max_chars` characters.
///
/// `None` disables the limit.
pub fn analyze_bounded(
    text: &str,
    settings: &DetectorSettings,
    max_chars: Option<usize>,
) -> AnalysisResult<RepetitionReport> {
    check_input_size(text, max_chars)?;
    Ok(analyze_with(text, settings))
}

/// Validate that `text` is within `max_chars` characters.
pub fn check_input_size(text: &str, max_chars: Option<usize>) -> AnalysisResult<()> {
    let Some(limit) = max_chars else {
        return Ok(());
    };
    // Byte length bounds the char count from above; skip counting when it fits.
    if text.len() <= limit {
        return Ok(());
    }
    let chars = text.chars().count();
    if chars > limit {
        tracing::warn!(chars, limit, "input exceeds character limit");
        return Err(AnalysisError::ResourceLimitExceeded { chars, limit });
    }
    Ok(())
}

//! Repeated sentence and phrase detection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::occurrences::OccurrenceMap;
use super::reports::RepetitionReport;
use crate::text::NormalizedText;

/// Thresholds that keep short, common wording out of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DetectorSettings {
    /// Sentences with fewer words are ignored entirely.
    pub min_sentence_words: usize,
    /// Smallest phrase window, in words.
    pub min_phrase_words: usize,
    /// Largest phrase window, in words.
    pub max_phrase_words: usize,
    /// Phrases shorter than this many characters are ignored.
    pub min_phrase_chars: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            min_sentence_words: 5,
            min_phrase_words: 3,
            max_phrase_words: 8,
            min_phrase_chars: 12,
        }
    }
}

/// Finds sentences and phrases that recur on different lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepetitionDetector {
    settings: DetectorSettings,
}

impl RepetitionDetector {
    /// Create a detector with the given thresholds.
    pub const fn new(settings: DetectorSettings) -> Self {
        Self { settings }
    }

    /// The thresholds in use.
    pub const fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Scan `text` and report everything that appears on two or more lines.
    ///
    /// Each eligible sentence is recorded whole, and every contiguous window
    /// of its words (within the phrase size bounds) is recorded as a phrase.
    /// Repeats within a single line do not count.
    #[tracing::instrument(skip_all, fields(text_len = text.as_str().len()))]
    pub fn detect(&self, text: &NormalizedText) -> RepetitionReport {
        let mut sentences = OccurrenceMap::new();
        let mut phrases = OccurrenceMap::new();

        let min_window = self.settings.min_phrase_words.max(1);

        for sentence in text.sentences() {
            let tokens = sentence.tokens();
            if tokens.len() < self.settings.min_sentence_words {
                continue;
            }

            sentences.record(sentence.text, sentence.line);

            let max_window = self.settings.max_phrase_words.min(tokens.len());
            for size in min_window..=max_window {
                for window in tokens.windows(size) {
                    let phrase = window.join(" ");
                    if phrase.chars().count() < self.settings.min_phrase_chars {
                        continue;
                    }
                    phrases.record(&phrase, sentence.line);
                }
            }
        }

        tracing::debug!(
            sentence_keys = sentences.len(),
            phrase_keys = phrases.len(),
            "occurrences collected"
        );

        RepetitionReport::new(sentences.into_repetitions(), phrases.into_repetitions())
    }
}

/// Find repeated sentences and phrases using the default thresholds.
pub fn analyze_repetitions(text: &NormalizedText) -> RepetitionReport {
    RepetitionDetector::default().detect(text)
}

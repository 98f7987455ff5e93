//! Batch analysis over inline text, files and named documents.
//!
//! Each input is extracted and analyzed on its own. A failure is attached
//! to that input's [`BatchItem`] and the batch moves on; the aggregate
//! total only counts inputs that succeeded.

use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::{self, DetectorSettings, RepetitionReport};
use crate::error::{AnalysisError, AnalysisResult, ExtractError};
use crate::extract::{self, SourceKind};

/// Source label used for inline text.
pub const INLINE_SOURCE: &str = "Inline text";

/// Something to analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    /// Text passed directly, treated as plain text.
    Inline {
        /// The text itself.
        text: String,
    },
    /// A file on disk; the extension selects the extractor.
    File {
        /// Path to the file.
        path: Utf8PathBuf,
    },
    /// Named in-memory content; the name's extension selects the extractor.
    Document {
        /// File name used for the report and format detection.
        name: String,
        /// Raw document content.
        content: String,
    },
}

impl BatchInput {
    /// Inline text input.
    pub fn inline<S: Into<String>>(text: S) -> Self {
        Self::Inline { text: text.into() }
    }

    /// File input.
    pub fn file<P: AsRef<Utf8Path>>(path: P) -> Self {
        Self::File {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Named document input.
    pub fn document<N: Into<String>, C: Into<String>>(name: N, content: C) -> Self {
        Self::Document {
            name: name.into(),
            content: content.into(),
        }
    }

    /// The label reported as `source`.
    pub fn source(&self) -> String {
        match self {
            Self::Inline { .. } => INLINE_SOURCE.to_string(),
            Self::File { path } => path.to_string(),
            Self::Document { name, .. } => name.clone(),
        }
    }

    /// The label reported as `kind`.
    ///
    /// `"text"` for inline input, otherwise the lowercased extension, even
    /// when it is unsupported.
    pub fn kind(&self) -> String {
        match self {
            Self::Inline { .. } => SourceKind::Text.as_str().to_string(),
            Self::File { path } => extract::extension_label(path),
            Self::Document { name, .. } => extract::extension_label(Utf8Path::new(name)),
        }
    }

    fn is_blank_inline(&self) -> bool {
        matches!(self, Self::Inline { text } if text.trim().is_empty())
    }

    fn load(&self, max_chars: Option<usize>) -> Result<String, ExtractError> {
        match self {
            Self::Inline { text } => Ok(text.clone()),
            Self::File { path } => extract::read_source(path, max_chars),
            Self::Document { name, content } => {
                let kind = SourceKind::from_path(Utf8Path::new(name))?;
                extract::extract_bytes(kind, content.as_bytes())
            }
        }
    }
}

/// Limits and thresholds for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Detector thresholds.
    pub settings: DetectorSettings,
    /// Maximum characters per input; `None` disables the check.
    pub max_input_chars: Option<usize>,
}

/// Outcome for a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BatchItem {
    /// Where the text came from (file path, document name, or "Inline text").
    pub source: String,
    /// Format label (extension without dot, or "text").
    pub kind: String,
    /// The analysis, when extraction and analysis succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<RepetitionReport>,
    /// Why this input could not be analyzed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    /// Number of repetitions found, zero on error.
    pub fn total_repeated(&self) -> usize {
        self.analysis.as_ref().map_or(0, |a| a.total_repeated)
    }

    /// Whether this input failed.
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Results for every input plus the aggregate count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BatchReport {
    /// Sum of `total_repeated` over inputs that were analyzed.
    pub total_repetitions: usize,
    /// One entry per input, in input order.
    pub results: Vec<BatchItem>,
}

impl BatchReport {
    /// Assemble a report from finished items.
    pub fn from_items(results: Vec<BatchItem>) -> Self {
        let total_repetitions = results.iter().map(BatchItem::total_repeated).sum();
        Self {
            total_repetitions,
            results,
        }
    }

    /// Number of inputs that failed.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|item| item.is_error()).count()
    }
}

/// Extract and analyze one input, capturing any failure in the item.
#[tracing::instrument(skip_all, fields(source = %input.source()))]
pub fn analyze_input(input: &BatchInput, options: &BatchOptions) -> BatchItem {
    let outcome = input
        .load(options.max_input_chars)
        .map_err(|e| e.to_string())
        .and_then(|text| {
            analysis::analyze_bounded(&text, &options.settings, options.max_input_chars)
                .map_err(|e| e.to_string())
        });

    let (analysis, error) = match outcome {
        Ok(report) => (Some(report), None),
        Err(message) => {
            tracing::warn!(error = %message, "input failed");
            (None, Some(message))
        }
    };

    BatchItem {
        source: input.source(),
        kind: input.kind(),
        analysis,
        error,
    }
}

/// Analyze every input in order.
///
/// Blank inline text is skipped. Fails only when there is nothing to
/// analyze at all.
#[tracing::instrument(skip_all)]
pub fn analyze_batch<I>(inputs: I, options: &BatchOptions) -> AnalysisResult<BatchReport>
where
    I: IntoIterator<Item = BatchInput>,
{
    let inputs = prepare_inputs(inputs)?;
    let results = inputs
        .iter()
        .map(|input| analyze_input(input, options))
        .collect();
    let report = BatchReport::from_items(results);
    tracing::debug!(
        inputs = report.results.len(),
        errors = report.error_count(),
        total_repetitions = report.total_repetitions,
        "batch complete"
    );
    Ok(report)
}

/// Drop blank inline text and reject an empty batch.
pub fn prepare_inputs<I>(inputs: I) -> AnalysisResult<Vec<BatchInput>>
where
    I: IntoIterator<Item = BatchInput>,
{
    let inputs: Vec<BatchInput> = inputs
        .into_iter()
        .filter(|input| !input.is_blank_inline())
        .collect();
    if inputs.is_empty() {
        return Err(AnalysisError::NoInputs);
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REPEATS: &str = "The cat sat on the old wooden mat quietly.\n\
                           Something else happened here today.\n\
                           The cat sat on the old wooden mat quietly.";

    fn utf8_path(tmp: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().join(name)).unwrap()
    }

    #[test]
    fn empty_batch_is_an_error() {
        let err = analyze_batch(Vec::new(), &BatchOptions::default()).unwrap_err();
        assert_eq!(err, AnalysisError::NoInputs);
    }

    #[test]
    fn blank_inline_text_alone_is_an_error() {
        let err = analyze_batch([BatchInput::inline("  \n ")], &BatchOptions::default());
        assert!(err.is_err());
    }

    #[test]
    fn inline_text_is_labeled() {
        let report = analyze_batch([BatchInput::inline(REPEATS)], &BatchOptions::default()).unwrap();
        assert_eq!(report.results.len(), 1);
        let item = &report.results[0];
        assert_eq!(item.source, INLINE_SOURCE);
        assert_eq!(item.kind, "text");
        assert_eq!(item.total_repeated(), 24);
        assert_eq!(report.total_repetitions, 24);
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let tmp = TempDir::new().unwrap();
        let good = utf8_path(&tmp, "good.txt");
        std::fs::write(&good, REPEATS).unwrap();
        let unsupported = utf8_path(&tmp, "slides.pptx");
        std::fs::write(&unsupported, "binary").unwrap();
        let missing = utf8_path(&tmp, "missing.txt");

        let report = analyze_batch(
            [
                BatchInput::file(&unsupported),
                BatchInput::file(&missing),
                BatchInput::file(&good),
            ],
            &BatchOptions::default(),
        )
        .unwrap();

        assert_eq!(report.results.len(), 3);
        assert_eq!(report.error_count(), 2);

        assert_eq!(report.results[0].kind, "pptx");
        assert!(
            report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("unsupported file type")
        );
        assert!(report.results[1].analysis.is_none());
        assert!(report.results[2].error.is_none());
        assert_eq!(report.total_repetitions, 24);
    }

    #[test]
    fn totals_sum_across_inputs() {
        let report = analyze_batch(
            [
                BatchInput::inline(REPEATS),
                BatchInput::document("notes.md", format!("# Notes\n\n{REPEATS}")),
            ],
            &BatchOptions::default(),
        )
        .unwrap();
        assert_eq!(report.results[1].source, "notes.md");
        assert_eq!(report.results[1].kind, "md");
        assert_eq!(report.total_repetitions, 48);
    }

    #[test]
    fn oversized_input_fails_only_that_item() {
        let options = BatchOptions {
            max_input_chars: Some(60),
            ..BatchOptions::default()
        };
        let report = analyze_batch(
            [
                BatchInput::inline(REPEATS),
                BatchInput::inline("Short text here."),
            ],
            &options,
        )
        .unwrap();
        assert!(
            report.results[0]
                .error
                .as_deref()
                .unwrap()
                .contains("input too large")
        );
        assert!(report.results[1].analysis.is_some());
        assert_eq!(report.total_repetitions, 0);
    }

    #[test]
    fn error_items_serialize_without_analysis() {
        let item = analyze_input(
            &BatchInput::document("deck.key", "whatever"),
            &BatchOptions::default(),
        );
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["source"], "deck.key");
        assert_eq!(json["kind"], "key");
        assert!(json.get("analysis").is_none());
        assert!(json["error"].is_string());
    }
}

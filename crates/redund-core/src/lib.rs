//! Core library for redund.
//!
//! Finds sentences and short phrases that recur across different lines of a
//! text. This crate holds the detection engine, source extraction, batch
//! handling and configuration used by the `redund` CLI and MCP server.
//!
//! # Modules
//!
//! - [`text`] - Normalization, sentence splitting and tokenization
//! - [`analysis`] - Repetition detection and reports
//! - [`extract`] - Reading text, markdown and HTML sources
//! - [`markdown`] - Markdown to line-preserving plain text
//! - [`batch`] - Analyzing several inputs in one run
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//!
//! # Quick Start
//!
//! ```
//! let report = redund_core::analyze(
//!     "The cat sat on the old wooden mat quietly.\n\
//!      Something else happened here today.\n\
//!      The cat sat on the old wooden mat quietly.",
//! );
//!
//! assert_eq!(report.sentences.len(), 1);
//! assert_eq!(report.sentences[0].lines, vec![1, 3]);
//! ```
#![deny(unsafe_code)]

pub mod analysis;
pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod markdown;
pub mod text;

pub use analysis::{
    DEFAULT_MAX_INPUT_CHARS, DetectorSettings, Repetition, RepetitionDetector, RepetitionReport,
    analyze, analyze_bounded, analyze_with,
};
pub use batch::{BatchInput, BatchItem, BatchOptions, BatchReport, analyze_batch};
pub use config::{Config, ConfigLoader, ConfigSources, LogLevel};
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, ConfigResult, ExtractError, ExtractResult,
};
pub use extract::SourceKind;
pub use text::NormalizedText;

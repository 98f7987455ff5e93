//! Error types for redund-core.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during repetition analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The input is larger than the configured character limit.
    #[error("input too large: {chars} characters (limit: {limit} characters)")]
    ResourceLimitExceeded {
        /// Character count of the rejected input.
        chars: usize,
        /// The limit that was exceeded.
        limit: usize,
    },

    /// A batch was started with nothing to analyze.
    #[error("provide at least one file or inline text")]
    NoInputs,
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Errors raised while turning a source file into analyzable text.
///
/// These are always reported against a single input; a batch keeps going.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The file extension is not one we know how to read.
    #[error("unsupported file type: {extension:?}")]
    UnsupportedFormat {
        /// Lowercased extension without the dot (empty if none).
        extension: String,
    },

    /// The file contents are not valid UTF-8.
    #[error("file is not valid UTF-8 text")]
    InvalidUtf8,

    /// The container or markup of a binary or rich format is broken.
    #[error("could not read {format} document: {message}")]
    Malformed {
        /// Format label, such as `docx` or `rtf`.
        format: &'static str,
        /// Parser error text.
        message: String,
    },

    /// The file has no content at all.
    #[error("file is empty")]
    EmptyFile,

    /// The file cannot possibly fit within the character limit.
    #[error("input too large: {bytes} bytes (limit: {limit} characters)")]
    TooLarge {
        /// Size of the file on disk.
        bytes: u64,
        /// The character limit in force.
        limit: usize,
    },

    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Result type alias using [`ExtractError`].
pub type ExtractResult<T> = Result<T, ExtractError>;

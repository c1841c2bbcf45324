//! Error types for ccbook.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for
//! structured error handling. Errors compose via `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`ConvertError`] - One session's conversion failed; no artifact produced
//!   - [`ReconstructError`] - The session log could not be read
//!     - [`InputError`] - File missing or I/O failure
//!   - [`RenderError`] - The artifact could not be written
//! - [`ParseError`] - One JSONL line is unusable
//!
//! # Error Recovery Strategy
//!
//! Parse errors are **non-fatal**: the malformed line is logged and skipped,
//! and the rest of the log is converted. Unresolved sub-agent references are
//! not errors at all; the card is rendered without a link. Input and render
//! errors fail the affected session only. Batch callers report them and move
//! on to the next session.

use std::path::PathBuf;
use thiserror::Error;

/// A single session's conversion failed.
///
/// Returned from [`crate::pipeline::convert`]. The caller decides whether to
/// continue with other sessions.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The session log could not be read.
    #[error("Failed to reconstruct session: {0}")]
    Reconstruct(#[from] ReconstructError),

    /// The artifact could not be written to the destination.
    #[error("Failed to render session: {0}")]
    Render(#[from] RenderError),
}

/// Failure to reconstruct a conversation from a log source.
#[derive(Debug, Error)]
pub enum ReconstructError {
    /// The whole log is unreadable. Malformed individual lines never produce
    /// this error.
    #[error("Log source unreadable: {0}")]
    SourceUnreadable(#[from] InputError),
}

/// Errors encountered when reading a log file.
///
/// # Recovery Patterns
///
/// - **FileNotFound**: report the path; other sessions continue
/// - **Io**: permission or disk errors; other sessions continue
#[derive(Debug, Error)]
pub enum InputError {
    /// The log file does not exist at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use ccbook::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.jsonl")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.jsonl"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Generic I/O error reading from the file or listing a directory.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors encountered when parsing one JSONL line.
///
/// All variants carry the 1-based line number; users need to know which
/// line of the log is broken.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A log line contains syntactically invalid JSON, or JSON that does not
    /// have the shape of a record (for example a missing `type`).
    ///
    /// # Examples
    ///
    /// ```
    /// use ccbook::model::error::ParseError;
    ///
    /// let err = ParseError::InvalidJson {
    ///     line: 42,
    ///     message: "expected value at line 1 column 1".to_string()
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("Invalid JSON at line {line}: {message}")]
    InvalidJson {
        /// 1-based line number.
        line: usize,
        /// Message extracted from `serde_json::Error`.
        message: String,
    },

    /// A user or assistant record lacks a field it cannot be rendered without.
    #[error("Missing required field '{field}' at line {line}")]
    MissingField {
        /// 1-based line number.
        line: usize,
        /// JSON key that was expected.
        field: &'static str,
    },

    /// The `timestamp` field exists but is not RFC 3339.
    #[error("Invalid timestamp '{raw}' at line {line}")]
    InvalidTimestamp {
        /// 1-based line number.
        line: usize,
        /// The raw value, kept for diagnostics.
        raw: String,
    },
}

/// Errors encountered when writing artifacts.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The destination (or a sub-agent directory) could not be created.
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        /// Directory that failed to be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing or renaming the artifact failed. Nothing is left at `path`.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// Final artifact path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Every candidate file name is taken by other sessions.
    #[error("Too many filename collisions for {stem}")]
    NameCollision {
        /// Base name that collided.
        stem: String,
    },
}

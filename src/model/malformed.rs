//! Diagnostic for JSONL lines that could not be decoded.

use crate::model::SessionId;
use std::fmt;

/// Longest slice of the offending line kept for diagnostics, in characters.
pub const EXCERPT_MAX_CHARS: usize = 200;

/// A log line skipped during parsing.
///
/// Skipping is never fatal; the diagnostic points at the line and keeps a
/// short excerpt of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    line_number: usize,
    reason: String,
    excerpt: String,
    session_id: Option<SessionId>,
}

impl MalformedRecord {
    /// Record that `line` (1-indexed `line_number`) failed with `reason`.
    ///
    /// `session_id` is whatever could be salvaged from a partial decode.
    pub fn new(
        line_number: usize,
        line: &str,
        reason: impl Into<String>,
        session_id: Option<SessionId>,
    ) -> Self {
        let excerpt = match line.char_indices().nth(EXCERPT_MAX_CHARS) {
            Some((cut, _)) => line[..cut].to_string(),
            None => line.to_string(),
        };
        Self {
            line_number,
            reason: reason.into(),
            excerpt,
            session_id,
        }
    }

    /// 1-based line number in the source log.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Why the line was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Start of the offending line.
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    /// Session id recovered from the line, if any.
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.reason)
    }
}

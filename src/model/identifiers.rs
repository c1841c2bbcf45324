//! Core identifier newtypes with smart constructors.
//!
//! All identifiers validate at construction time. Raw constructors are
//! never exported - use smart constructors only.

use std::fmt;

/// Session identifier shared by every record of one conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

/// Placeholder used when a log names no session.
const UNKNOWN_SESSION_ID: &str = "unknown-session";

impl SessionId {
    /// Placeholder for records and logs that carry no session id.
    pub fn unknown() -> Self {
        Self(UNKNOWN_SESSION_ID.to_string())
    }

    /// Smart constructor: validates non-empty session ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sub-agent identifier (e.g., "a7b2877").
///
/// Agent ids become file names of child logs and child artifacts, so only
/// `[A-Za-z0-9_-]` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(String);

impl AgentId {
    /// Smart constructor: validates a non-empty, path-safe agent ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidAgentId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidAgentId::Empty);
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(InvalidAgentId::UnsafeCharacters(raw));
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tool invocation identifier for linking tool_use to tool_result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolUseId(String);

impl ToolUseId {
    /// Smart constructor: validates non-empty tool use ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidToolUseId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidToolUseId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolUseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier shared by all physical records of one streamed response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Smart constructor: validates non-empty correlation ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidCorrelationId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidCorrelationId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

#[allow(missing_docs)]
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidSessionId {
    #[error("Session ID cannot be empty")]
    Empty,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidAgentId {
    #[error("Agent ID cannot be empty")]
    Empty,
    #[error("Agent ID contains characters outside [A-Za-z0-9_-]: {0:?}")]
    UnsafeCharacters(String),
}

#[allow(missing_docs)]
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidToolUseId {
    #[error("Tool Use ID cannot be empty")]
    Empty,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidCorrelationId {
    #[error("Correlation ID cannot be empty")]
    Empty,
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    // ===== SessionId Tests =====

    #[test]
    fn session_id_accepts_valid_string() {
        let id = SessionId::new("session-12345");
        assert!(id.is_ok(), "Valid session ID should be accepted");
    }

    #[test]
    fn session_id_rejects_empty_string() {
        let id = SessionId::new("");
        assert!(
            matches!(id, Err(InvalidSessionId::Empty)),
            "Empty string should return InvalidSessionId::Empty"
        );
    }

    #[test]
    fn session_id_display_returns_inner_string() {
        let id = SessionId::new("6f1c2d").expect("valid session id");
        assert_eq!(id.to_string(), "6f1c2d");
        assert_eq!(id.as_str(), "6f1c2d");
    }

    // ===== AgentId Tests =====

    #[test]
    fn agent_id_accepts_hex_and_dashes() {
        assert!(AgentId::new("a7b2877").is_ok());
        assert!(AgentId::new("agent_01-x").is_ok());
    }

    #[test]
    fn agent_id_rejects_empty_string() {
        assert!(matches!(AgentId::new(""), Err(InvalidAgentId::Empty)));
    }

    #[test]
    fn agent_id_rejects_path_traversal() {
        for raw in ["../etc", "a/b", "a b", "a.b", "agent\0"] {
            assert!(
                matches!(AgentId::new(raw), Err(InvalidAgentId::UnsafeCharacters(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    // ===== ToolUseId / CorrelationId Tests =====

    #[test]
    fn tool_use_id_rejects_empty_string() {
        assert!(matches!(ToolUseId::new(""), Err(InvalidToolUseId::Empty)));
        assert_eq!(
            ToolUseId::new("toolu_01").expect("valid").as_str(),
            "toolu_01"
        );
    }

    #[test]
    fn correlation_id_rejects_empty_string() {
        assert!(matches!(
            CorrelationId::new(""),
            Err(InvalidCorrelationId::Empty)
        ));
        assert_eq!(CorrelationId::new("req_1").expect("valid").to_string(), "req_1");
    }
}

//! Event records representing parsed JSONL lines.
//!
//! EventRecord is the unit the parser produces. All fields are validated at
//! construction time and never mutated afterwards.

use crate::model::{AgentId, ContentBlock, CorrelationId, Role, SessionId};
use chrono::{DateTime, Utc};

// ===== RecordKind =====

/// Kind of a record - exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Something the user sent (prompts, tool results)
    User,
    /// Something the assistant generated
    Assistant,
    /// Anything else: summaries, system notices, progress, snapshots
    Meta,
}

// ===== EventRecord =====

/// A parsed record from a conversation log.
/// Invariant: All fields validated at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    kind: RecordKind,
    session_id: SessionId,
    agent_id: Option<AgentId>,
    timestamp: Option<DateTime<Utc>>,
    correlation_id: Option<CorrelationId>,
    role: Role,
    content: Vec<ContentBlock>,
    line_number: usize,
}

impl EventRecord {
    /// Create a new record.
    ///
    /// Intended for the parser and tests; use `parser::parse_record` to build
    /// records from JSONL.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: RecordKind,
        session_id: SessionId,
        agent_id: Option<AgentId>,
        timestamp: Option<DateTime<Utc>>,
        correlation_id: Option<CorrelationId>,
        role: Role,
        content: Vec<ContentBlock>,
        line_number: usize,
    ) -> Self {
        Self {
            kind,
            session_id,
            agent_id,
            timestamp,
            correlation_id,
            role,
            content,
            line_number,
        }
    }

    // ===== Accessors (read-only) =====

    /// Get the record kind.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Get the session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Get the sub-agent ID if the record came from a sub-agent log.
    pub fn agent_id(&self) -> Option<&AgentId> {
        self.agent_id.as_ref()
    }

    /// Get the timestamp if present.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Get the ID shared by fragments of one streamed response.
    pub fn correlation_id(&self) -> Option<&CorrelationId> {
        self.correlation_id.as_ref()
    }

    /// Get the message author.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Get the content blocks in record order.
    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    /// 1-based line number in the source log.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Consume the record, yielding its content blocks.
    pub fn into_content(self) -> Vec<ContentBlock> {
        self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(kind: RecordKind, correlation: Option<&str>) -> EventRecord {
        EventRecord::new(
            kind,
            SessionId::new("s1").expect("valid session id"),
            None,
            Some("2026-02-07T10:00:00Z".parse().expect("valid timestamp")),
            correlation.map(|c| CorrelationId::new(c).expect("valid correlation id")),
            Role::Assistant,
            vec![ContentBlock::Text {
                text: "Hi".to_string(),
            }],
            3,
        )
    }

    #[test]
    fn record_exposes_constructor_fields() {
        let record = make_record(RecordKind::Assistant, Some("r1"));

        assert_eq!(record.kind(), RecordKind::Assistant);
        assert_eq!(record.session_id().as_str(), "s1");
        assert!(record.agent_id().is_none());
        assert_eq!(record.correlation_id().map(|c| c.as_str()), Some("r1"));
        assert_eq!(record.role(), Role::Assistant);
        assert_eq!(record.line_number(), 3);
        assert_eq!(record.content().len(), 1);
    }

    #[test]
    fn into_content_yields_blocks_in_order() {
        let record = make_record(RecordKind::User, None);
        let blocks = record.into_content();
        assert_eq!(
            blocks,
            vec![ContentBlock::Text {
                text: "Hi".to_string()
            }]
        );
    }
}

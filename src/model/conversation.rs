//! Reconstructed conversation types.
//!
//! A Conversation is built fresh by the reconstructor and consumed by the
//! resolver and renderer. Nothing here is shared between sessions.

use crate::model::{AgentId, Role, SessionId};
use chrono::{DateTime, Utc};
use std::fmt;

// ===== RenderableBlock =====

/// A block that survives reconstruction and is shown in a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableBlock {
    /// Markdown text
    Text(String),
    /// Collapsed reasoning
    Thinking(String),
    /// Question/answer interaction
    Decision(DecisionCard),
    /// Index into [`Conversation::sub_agents`]
    SubAgent(usize),
}

// ===== DecisionCard =====

/// A presented question and, once answered, the chosen option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionCard {
    /// Question text
    pub question: String,
    /// Option labels in presentation order
    pub options: Vec<String>,
    /// Index of the chosen option; `None` while unresolved or when the
    /// answer matches no option
    pub selected_index: Option<usize>,
    /// Raw answer text, if a response was observed
    pub answer: Option<String>,
}

impl DecisionCard {
    /// Create an unresolved card.
    pub fn open(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            question: question.into(),
            options,
            selected_index: None,
            answer: None,
        }
    }

    /// Whether a response has been attached.
    pub fn is_resolved(&self) -> bool {
        self.answer.is_some()
    }

    /// Attach a response, selecting the option whose label equals it.
    pub fn resolve(&mut self, answer: &str) {
        let wanted = answer.trim();
        self.selected_index = self.options.iter().position(|o| o.trim() == wanted);
        self.answer = Some(answer.to_string());
    }
}

// ===== SubAgentCard =====

/// Placeholder for a nested conversation spawned from a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubAgentCard {
    /// Sub-agent identifier
    pub ref_id: AgentId,
    /// Final report of the sub-agent
    pub summary: String,
    /// Set once the resolver located the child log
    pub child_session_id: Option<SessionId>,
    /// Task description given when spawning
    pub description: Option<String>,
    /// Sub-agent type given when spawning
    pub agent_type: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: Option<u64>,
    /// Number of tool calls the sub-agent made
    pub tool_use_count: Option<u64>,
}

impl SubAgentCard {
    /// Create an unresolved card.
    pub fn new(ref_id: AgentId, summary: impl Into<String>) -> Self {
        Self {
            ref_id,
            summary: summary.into(),
            child_session_id: None,
            description: None,
            agent_type: None,
            duration_ms: None,
            tool_use_count: None,
        }
    }

    /// Whether the resolver linked a child conversation.
    pub fn is_resolved(&self) -> bool {
        self.child_session_id.is_some()
    }
}

// ===== Turn =====

/// One rendered conversational unit, attributable to exactly one role.
/// Invariant: blocks keep their relative source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    timestamp: Option<DateTime<Utc>>,
    blocks: Vec<RenderableBlock>,
}

impl Turn {
    /// Create an empty turn.
    pub fn new(role: Role, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            role,
            timestamp,
            blocks: Vec::new(),
        }
    }

    /// Author of every block in the turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Timestamp of the first record of the turn.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Blocks in log order.
    pub fn blocks(&self) -> &[RenderableBlock] {
        &self.blocks
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<RenderableBlock> {
        &mut self.blocks
    }

    /// Whether nothing visible survived filtering.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Fill in the timestamp if the first record had none.
    pub(crate) fn backfill_timestamp(&mut self, timestamp: Option<DateTime<Utc>>) {
        if self.timestamp.is_none() {
            self.timestamp = timestamp;
        }
    }

    /// Append text, joining it to a directly preceding text block.
    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(RenderableBlock::Text(existing)) = self.blocks.last_mut() {
            existing.push_str("\n\n");
            existing.push_str(text);
        } else {
            self.blocks.push(RenderableBlock::Text(text.to_string()));
        }
    }

    /// Number of thinking blocks in this turn.
    pub fn thinking_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, RenderableBlock::Thinking(_)))
            .count()
    }
}

// ===== ConversationKey =====

/// Identity of one conversation log: a session, optionally narrowed to one
/// sub-agent within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationKey {
    /// Session the log belongs to
    pub session_id: SessionId,
    /// Sub-agent that wrote the log, `None` for the main conversation
    pub agent_id: Option<AgentId>,
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.agent_id {
            Some(agent) => write!(f, "{}/{}", self.session_id, agent),
            None => write!(f, "{}", self.session_id),
        }
    }
}

// ===== Conversation =====

/// Reconstruction output: ordered turns plus the sub-agent cards they
/// reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    session_id: SessionId,
    agent_id: Option<AgentId>,
    started_at: Option<DateTime<Utc>>,
    turns: Vec<Turn>,
    sub_agents: Vec<SubAgentCard>,
}

impl Conversation {
    /// Assemble a conversation.
    pub fn new(
        session_id: SessionId,
        agent_id: Option<AgentId>,
        started_at: Option<DateTime<Utc>>,
        turns: Vec<Turn>,
        sub_agents: Vec<SubAgentCard>,
    ) -> Self {
        Self {
            session_id,
            agent_id,
            started_at,
            turns,
            sub_agents,
        }
    }

    /// Session the log belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Sub-agent id; `None` for a top-level session.
    pub fn agent_id(&self) -> Option<&AgentId> {
        self.agent_id.as_ref()
    }

    /// Identity used for cycle detection.
    pub fn key(&self) -> ConversationKey {
        ConversationKey {
            session_id: self.session_id.clone(),
            agent_id: self.agent_id.clone(),
        }
    }

    /// First timestamp observed in the log.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Turns in log order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Sub-agent cards, indexed by [`RenderableBlock::SubAgent`].
    pub fn sub_agents(&self) -> &[SubAgentCard] {
        &self.sub_agents
    }

    pub(crate) fn sub_agents_mut(&mut self) -> &mut [SubAgentCard] {
        &mut self.sub_agents
    }

    /// Whether no turn survived reconstruction.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total thinking blocks across all turns.
    pub fn thinking_count(&self) -> usize {
        self.turns.iter().map(Turn::thinking_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_card_resolve_selects_matching_option() {
        let mut card = DecisionCard::open(
            "Which database?",
            vec!["Postgres".to_string(), "SQLite".to_string()],
        );
        assert!(!card.is_resolved());

        card.resolve("SQLite");

        assert!(card.is_resolved());
        assert_eq!(card.selected_index, Some(1));
        assert_eq!(card.answer.as_deref(), Some("SQLite"));
    }

    #[test]
    fn decision_card_free_text_answer_has_no_index() {
        let mut card = DecisionCard::open("Name?", vec!["foo".to_string()]);
        card.resolve("something else");
        assert!(card.is_resolved());
        assert_eq!(card.selected_index, None);
    }

    #[test]
    fn push_text_joins_adjacent_text_only() {
        let mut turn = Turn::new(Role::Assistant, None);
        turn.push_text("one");
        turn.push_text("two");
        turn.blocks_mut()
            .push(RenderableBlock::Thinking("hmm".to_string()));
        turn.push_text("three");

        assert_eq!(
            turn.blocks(),
            &[
                RenderableBlock::Text("one\n\ntwo".to_string()),
                RenderableBlock::Thinking("hmm".to_string()),
                RenderableBlock::Text("three".to_string()),
            ]
        );
        assert_eq!(turn.thinking_count(), 1);
    }

    #[test]
    fn backfill_timestamp_keeps_existing_value() {
        let first: DateTime<Utc> = "2026-02-07T10:00:00Z".parse().expect("valid");
        let later: DateTime<Utc> = "2026-02-07T11:00:00Z".parse().expect("valid");

        let mut turn = Turn::new(Role::User, None);
        turn.backfill_timestamp(Some(first));
        turn.backfill_timestamp(Some(later));

        assert_eq!(turn.timestamp(), Some(first));
    }

    #[test]
    fn conversation_key_display_includes_agent() {
        let key = ConversationKey {
            session_id: SessionId::new("s1").expect("valid"),
            agent_id: Some(AgentId::new("a1").expect("valid")),
        };
        assert_eq!(key.to_string(), "s1/a1");
    }
}

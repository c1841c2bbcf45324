//! Turn reconstruction.
//!
//! Groups parsed records into the turns of a [`Conversation`]:
//! - stream fragments of one assistant response are merged by correlation id
//! - tool plumbing and meta records are filtered out
//! - choice questions become decision cards, resolved by later answers
//! - sub-agent reports become placeholder cards for the resolver
//!
//! Records are processed in a single forward pass, in file order.

use crate::model::{
    AgentId, ChoiceResponse, ContentBlock, Conversation, CorrelationId, DecisionCard,
    EventRecord, MalformedRecord, ReconstructError, RecordKind, RenderableBlock, Role,
    SessionId, SubAgentCard, SubagentRef, ToolCall, ToolUseId, Turn,
};
use crate::parser::{parse_records, ParseResult, TASK_TOOL};
use crate::source::LogSource;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

// CLI echo written into the log as user text
const COMMAND_ECHO_PREFIXES: [&str; 2] = ["<command-", "<local-command-"];

/// Output of reconstructing one log.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The reconstructed conversation
    pub conversation: Conversation,
    /// Lines that were skipped, in file order
    pub malformed: Vec<MalformedRecord>,
}

/// Read and reconstruct a log source.
///
/// # Errors
///
/// Returns `ReconstructError::SourceUnreadable` if the file cannot be read.
/// Malformed lines never fail reconstruction.
pub fn reconstruct(source: &LogSource) -> Result<Reconstruction, ReconstructError> {
    let bytes = source.read()?;
    Ok(reconstruct_bytes(&bytes, source.session_hint()))
}

/// Reconstruct a conversation from raw JSONL bytes.
///
/// `session_hint` names the session when no record carries a session id.
pub fn reconstruct_bytes(bytes: &[u8], session_hint: &str) -> Reconstruction {
    let mut records = Vec::new();
    let mut malformed = Vec::new();
    for result in parse_records(bytes) {
        match result {
            ParseResult::Valid(record) => records.push(*record),
            ParseResult::Malformed(m) => malformed.push(m),
        }
    }

    Reconstruction {
        conversation: reconstruct_records(records, session_hint),
        malformed,
    }
}

/// Build a conversation from parsed records.
pub fn reconstruct_records(
    records: impl IntoIterator<Item = EventRecord>,
    session_hint: &str,
) -> Conversation {
    let mut builder = ConversationBuilder::default();
    for record in records {
        builder.push(record);
    }
    builder.finish(session_hint)
}

// ===== Builder =====

/// Position of a decision card that has not been answered yet.
#[derive(Debug)]
struct OpenDecision {
    turn: usize,
    block: usize,
    request_id: Option<ToolUseId>,
    question: String,
}

/// Spawn details from a `Task` invocation, used to enrich sub-agent cards.
#[derive(Debug, Default)]
struct TaskSpawn {
    description: Option<String>,
    agent_type: Option<String>,
}

#[derive(Debug, Default)]
struct ConversationBuilder {
    session_id: Option<SessionId>,
    agent_id: Option<AgentId>,
    started_at: Option<DateTime<Utc>>,
    turns: Vec<Turn>,
    sub_agents: Vec<SubAgentCard>,
    /// Assistant turn still accepting fragments, with its correlation id
    open_run: Option<(usize, CorrelationId)>,
    last_assistant_turn: Option<usize>,
    open_decisions: Vec<OpenDecision>,
    task_spawns: HashMap<ToolUseId, TaskSpawn>,
}

impl ConversationBuilder {
    fn push(&mut self, record: EventRecord) {
        if record.kind() == RecordKind::Meta {
            return;
        }

        if self.session_id.is_none() {
            self.session_id = Some(record.session_id().clone());
            self.agent_id = record.agent_id().cloned();
        }
        if self.started_at.is_none() {
            self.started_at = record.timestamp();
        }

        match record.kind() {
            RecordKind::Assistant => self.push_assistant(record),
            RecordKind::User => self.push_user(record),
            RecordKind::Meta => {}
        }
    }

    fn push_assistant(&mut self, record: EventRecord) {
        let timestamp = record.timestamp();
        let correlation = record.correlation_id().cloned();
        let line = record.line_number();

        let turn_idx = match (&self.open_run, &correlation) {
            (Some((idx, open)), Some(current)) if open == current => {
                let idx = *idx;
                self.turns[idx].backfill_timestamp(timestamp);
                idx
            }
            _ => {
                self.turns.push(Turn::new(Role::Assistant, timestamp));
                self.turns.len() - 1
            }
        };
        self.open_run = correlation.map(|c| (turn_idx, c));
        self.last_assistant_turn = Some(turn_idx);

        for block in record.into_content() {
            self.push_block(turn_idx, block, line);
        }
    }

    fn push_user(&mut self, record: EventRecord) {
        // Any user record ends the assistant run, visible or not
        self.open_run = None;

        let timestamp = record.timestamp();
        let line = record.line_number();
        let mut own_turn: Option<usize> = None;

        for block in record.into_content() {
            match block {
                ContentBlock::Text { ref text } if is_command_echo(text) => {
                    debug!(line, "Dropping command echo");
                }
                ContentBlock::Text { ref text } | ContentBlock::Thinking { thinking: ref text }
                    if text.trim().is_empty() => {}
                ContentBlock::Text { .. }
                | ContentBlock::Thinking { .. }
                | ContentBlock::ChoiceRequest(_) => {
                    let idx = self.user_turn(&mut own_turn, timestamp);
                    self.push_block(idx, block, line);
                }
                ContentBlock::SubagentRef(sub) => {
                    let idx = match self.last_assistant_turn {
                        Some(idx) => idx,
                        None => self.user_turn(&mut own_turn, timestamp),
                    };
                    self.attach_sub_agent(idx, sub);
                }
                ContentBlock::ChoiceResponse(response) => self.resolve_decision(response, line),
                ContentBlock::ToolUse(call) => self.note_tool_use(&call),
                ContentBlock::ToolResult { .. } => {}
            }
        }
    }

    /// Index of the user turn for the current record, created on demand.
    fn user_turn(&mut self, own_turn: &mut Option<usize>, timestamp: Option<DateTime<Utc>>) -> usize {
        *own_turn.get_or_insert_with(|| {
            self.turns.push(Turn::new(Role::User, timestamp));
            self.turns.len() - 1
        })
    }

    fn push_block(&mut self, turn_idx: usize, block: ContentBlock, line: usize) {
        match block {
            ContentBlock::Text { text } => {
                if !text.trim().is_empty() {
                    self.turns[turn_idx].push_text(&text);
                }
            }
            ContentBlock::Thinking { thinking } => {
                if !thinking.trim().is_empty() {
                    debug!(line, chars = thinking.len(), "Extracted thinking block");
                    self.turns[turn_idx]
                        .blocks_mut()
                        .push(RenderableBlock::Thinking(thinking));
                }
            }
            ContentBlock::ChoiceRequest(request) => {
                let blocks = self.turns[turn_idx].blocks_mut();
                let block = blocks.len();
                blocks.push(RenderableBlock::Decision(DecisionCard::open(
                    request.question.clone(),
                    request.options,
                )));
                self.open_decisions.push(OpenDecision {
                    turn: turn_idx,
                    block,
                    request_id: request.request_id,
                    question: request.question,
                });
            }
            ContentBlock::ChoiceResponse(response) => self.resolve_decision(response, line),
            ContentBlock::SubagentRef(sub) => self.attach_sub_agent(turn_idx, sub),
            ContentBlock::ToolUse(call) => self.note_tool_use(&call),
            ContentBlock::ToolResult { .. } => {}
        }
    }

    /// Remember spawn details of sub-agent invocations.
    fn note_tool_use(&mut self, call: &ToolCall) {
        if call.name() == TASK_TOOL {
            self.task_spawns.insert(
                call.id().clone(),
                TaskSpawn {
                    description: call.input_str("description").map(str::to_string),
                    agent_type: call.input_str("subagent_type").map(str::to_string),
                },
            );
        }
    }

    /// Answer the first open decision compatible with `response`.
    fn resolve_decision(&mut self, response: ChoiceResponse, line: usize) {
        let position = self
            .open_decisions
            .iter()
            .position(|open| response.answers(open.request_id.as_ref(), &open.question));

        let Some(position) = position else {
            debug!(line, answer = %response.answer, "Discarding answer without an open question");
            return;
        };

        let open = self.open_decisions.remove(position);
        if let Some(RenderableBlock::Decision(card)) =
            self.turns[open.turn].blocks_mut().get_mut(open.block)
        {
            card.resolve(&response.answer);
        }
    }

    fn attach_sub_agent(&mut self, turn_idx: usize, sub: SubagentRef) {
        let mut card = SubAgentCard::new(sub.ref_id, sub.summary);
        card.duration_ms = sub.duration_ms;
        card.tool_use_count = sub.tool_use_count;
        if let Some(spawn) = sub
            .tool_use_id
            .as_ref()
            .and_then(|id| self.task_spawns.remove(id))
        {
            card.description = spawn.description;
            card.agent_type = spawn.agent_type;
        }

        self.sub_agents.push(card);
        let index = self.sub_agents.len() - 1;
        self.turns[turn_idx]
            .blocks_mut()
            .push(RenderableBlock::SubAgent(index));
    }

    fn finish(self, session_hint: &str) -> Conversation {
        let session_id = self
            .session_id
            .or_else(|| SessionId::new(session_hint).ok())
            .unwrap_or_else(SessionId::unknown);

        debug!(
            session = %session_id,
            turns = self.turns.len(),
            sub_agents = self.sub_agents.len(),
            unanswered = self.open_decisions.len(),
            "Reconstructed conversation"
        );

        Conversation::new(
            session_id,
            self.agent_id,
            self.started_at,
            self.turns,
            self.sub_agents,
        )
    }
}

fn is_command_echo(text: &str) -> bool {
    let trimmed = text.trim_start();
    COMMAND_ECHO_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

#[cfg(test)]
#[path = "reconstruct_tests.rs"]
mod tests;

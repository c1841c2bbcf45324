//! Content block types carried by event records.
//!
//! The parser keeps every block kind it recognizes; deciding what is visible
//! happens later in reconstruction.

use crate::model::{AgentId, ToolUseId};

// ===== Role =====

/// Message role in a conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Message authored by the user
    User,
    /// Message authored by the assistant
    Assistant,
}

impl Role {
    /// Lowercase name, used for CSS classes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Capitalized name, used for card headers.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

// ===== ContentBlock =====

/// Individual content block within a record.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Markdown text visible to the user
    Text {
        /// Markdown content
        text: String,
    },
    /// Extended thinking block
    Thinking {
        /// Reasoning content
        thinking: String,
    },
    /// Tool invocation by the assistant
    ToolUse(ToolCall),
    /// Result returned from a tool execution
    ToolResult {
        /// ID linking this result to the originating tool_use
        tool_use_id: ToolUseId,
        /// Flattened tool output
        content: String,
        /// Whether the tool execution failed
        is_error: bool,
    },
    /// A question with options presented to the user
    ChoiceRequest(ChoiceRequest),
    /// The user's answer to a presented question
    ChoiceResponse(ChoiceResponse),
    /// Completion report of a spawned sub-agent
    SubagentRef(SubagentRef),
}

impl ContentBlock {
    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContentBlock::Text { .. } => "text",
            ContentBlock::Thinking { .. } => "thinking",
            ContentBlock::ToolUse(_) => "tool_use",
            ContentBlock::ToolResult { .. } => "tool_result",
            ContentBlock::ChoiceRequest(_) => "choice_request",
            ContentBlock::ChoiceResponse(_) => "choice_response",
            ContentBlock::SubagentRef(_) => "subagent_ref",
        }
    }
}

// ===== ToolCall =====

/// Tool invocation recorded in a log.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    id: ToolUseId,
    name: String,
    input: serde_json::Value,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: ToolUseId, name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id,
            name: name.into(),
            input,
        }
    }

    /// Unique identifier linking this call to its result
    pub fn id(&self) -> &ToolUseId {
        &self.id
    }

    /// Tool name as written in the log
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool-specific input parameters
    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    /// String field of the input object, if present.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(|v| v.as_str())
    }
}

// ===== Choice interaction =====

/// One question presented to the user with a fixed list of options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRequest {
    /// Tool invocation that presented the question, when known
    pub request_id: Option<ToolUseId>,
    /// Question text
    pub question: String,
    /// Option labels in presentation order
    pub options: Vec<String>,
}

/// The user's answer to a presented question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResponse {
    /// Tool invocation being answered, when known
    pub request_id: Option<ToolUseId>,
    /// Question being answered, when the log names it
    pub question: Option<String>,
    /// Answer text (normally one of the option labels)
    pub answer: String,
}

impl ChoiceResponse {
    /// Whether this response may answer `request`.
    ///
    /// Keys that are absent on either side do not constrain the match.
    pub fn is_compatible_with(&self, request: &ChoiceRequest) -> bool {
        self.answers(request.request_id.as_ref(), &request.question)
    }

    /// Whether this response may answer the question `question` presented
    /// by the invocation `request_id`.
    pub fn answers(&self, request_id: Option<&ToolUseId>, question: &str) -> bool {
        let id_matches = match (&self.request_id, request_id) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        };
        let question_matches = match &self.question {
            Some(q) => q.trim() == question.trim(),
            None => true,
        };
        id_matches && question_matches
    }
}

// ===== Sub-agent reference =====

/// Completion report of a sub-agent spawned from this conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubagentRef {
    /// Identifier of the sub-agent (names its log file)
    pub ref_id: AgentId,
    /// Tool invocation that spawned the sub-agent
    pub tool_use_id: Option<ToolUseId>,
    /// Final report text of the sub-agent
    pub summary: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: Option<u64>,
    /// Number of tool calls the sub-agent made
    pub tool_use_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: Option<&str>, question: &str) -> ChoiceRequest {
        ChoiceRequest {
            request_id: id.map(|s| ToolUseId::new(s).expect("valid id")),
            question: question.to_string(),
            options: vec!["A".to_string(), "B".to_string()],
        }
    }

    fn response(id: Option<&str>, question: Option<&str>) -> ChoiceResponse {
        ChoiceResponse {
            request_id: id.map(|s| ToolUseId::new(s).expect("valid id")),
            question: question.map(str::to_string),
            answer: "A".to_string(),
        }
    }

    #[test]
    fn response_without_keys_matches_any_request() {
        assert!(response(None, None).is_compatible_with(&request(Some("t1"), "Pick?")));
    }

    #[test]
    fn response_with_other_request_id_does_not_match() {
        assert!(!response(Some("t2"), None).is_compatible_with(&request(Some("t1"), "Pick?")));
    }

    #[test]
    fn response_question_is_compared_trimmed() {
        assert!(response(Some("t1"), Some(" Pick? ")).is_compatible_with(&request(Some("t1"), "Pick?")));
        assert!(!response(Some("t1"), Some("Other?")).is_compatible_with(&request(Some("t1"), "Pick?")));
    }

    #[test]
    fn tool_call_input_str_reads_string_fields() {
        let call = ToolCall::new(
            ToolUseId::new("t1").expect("valid id"),
            "Task",
            serde_json::json!({"description": "Explore", "count": 3}),
        );
        assert_eq!(call.input_str("description"), Some("Explore"));
        assert_eq!(call.input_str("count"), None);
        assert_eq!(call.input_str("missing"), None);
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.label(), "Assistant");
    }
}

//! JSONL parser for Claude Code session logs.
//!
//! Turns JSONL lines into validated [`EventRecord`]s without touching the
//! filesystem. Every block kind the format carries is
//! preserved; deciding what is visible is left to reconstruction.

use crate::model::{
    AgentId, ChoiceRequest, ChoiceResponse, ContentBlock, CorrelationId, EventRecord,
    MalformedRecord, ParseError, RecordKind, Role, SessionId, SubagentRef, ToolCall, ToolUseId,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

// Record type string constants
const RECORD_TYPE_USER: &str = "user";
const RECORD_TYPE_ASSISTANT: &str = "assistant";

// Role string constants
const ROLE_USER: &str = "user";
const ROLE_ASSISTANT: &str = "assistant";

/// Tool whose invocation presents multiple-choice questions to the user.
pub const ASK_USER_QUESTION_TOOL: &str = "AskUserQuestion";

/// Tool whose invocation spawns a sub-agent.
pub const TASK_TOOL: &str = "Task";

// Lines of a sub-agent report that only repeat the agent id
const AGENT_ID_LINE_PREFIX: &str = "agentId:";

/// Raw JSON structure for deserializing log records.
///
/// `message` stays untyped until the record kind is known, so incidental
/// records with unusual payloads never fail the line.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(rename = "type")]
    record_type: String,
    #[serde(default, rename = "sessionId", alias = "session_id")]
    session_id: Option<String>,
    #[serde(default, rename = "agentId")]
    agent_id: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, rename = "requestId")]
    request_id: Option<String>,
    #[serde(default, rename = "isMeta")]
    is_meta: Option<bool>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default, rename = "toolUseResult")]
    tool_use_result: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    content: Option<RawMessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMessageContent {
    Text(String),
    Blocks(Vec<RawContentBlock>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    // image, redacted_thinking, document, ...
    #[serde(other)]
    Unknown,
}

/// Outcome of decoding one line; a bad line never stops the stream.
#[derive(Debug, Clone)]
pub enum ParseResult {
    /// Successfully parsed a valid record.
    Valid(Box<EventRecord>),
    /// The line was skipped.
    Malformed(MalformedRecord),
}

/// Decode one line, reporting failure as data.
///
/// Unlike [`parse_record`], this function never returns an error. A line
/// that cannot be parsed is reported as a [`MalformedRecord`] and logged at
/// warn level.
///
/// # Arguments
///
/// * `raw` - The raw JSONL line to parse
/// * `line_number` - The line number (1-indexed) for error reporting
pub fn parse_record_graceful(raw: &str, line_number: usize) -> ParseResult {
    match parse_record(raw, line_number) {
        Ok(record) => ParseResult::Valid(Box::new(record)),
        Err(parse_error) => {
            warn!(line = line_number, error = %parse_error, "Skipping malformed log line");
            let session_id = extract_session_id_best_effort(raw);
            ParseResult::Malformed(MalformedRecord::new(
                line_number,
                raw,
                parse_error.to_string(),
                session_id,
            ))
        }
    }
}

/// Attempt to extract the session id from a line that failed to parse.
fn extract_session_id_best_effort(raw: &str) -> Option<SessionId> {
    #[derive(Deserialize)]
    struct PartialRecord {
        #[serde(default, rename = "sessionId", alias = "session_id")]
        session_id: Option<String>,
    }

    serde_json::from_str::<PartialRecord>(raw)
        .ok()
        .and_then(|partial| partial.session_id)
        .and_then(|id| SessionId::new(id).ok())
}

/// Parse a single JSONL line into an [`EventRecord`].
///
/// # Errors
///
/// Returns `ParseError` if:
/// - JSON is malformed or has no `type`
/// - A user or assistant record lacks `sessionId` or `message`
/// - The timestamp is present but not RFC 3339
/// - An id field is present but empty or unsafe
pub fn parse_record(raw: &str, line_number: usize) -> Result<EventRecord, ParseError> {
    let raw_record: RawRecord =
        serde_json::from_str(raw).map_err(|e| ParseError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    let kind = parse_record_kind(&raw_record);

    let session_id = match (&raw_record.session_id, kind) {
        (Some(id), _) if !id.is_empty() => {
            SessionId::new(id.as_str()).map_err(|_| ParseError::MissingField {
                line: line_number,
                field: "sessionId",
            })?
        }
        (_, RecordKind::Meta) => SessionId::unknown(),
        _ => {
            return Err(ParseError::MissingField {
                line: line_number,
                field: "sessionId",
            })
        }
    };

    let agent_id = match &raw_record.agent_id {
        Some(id) if !id.is_empty() => {
            Some(
                AgentId::new(id.as_str()).map_err(|_| ParseError::MissingField {
                    line: line_number,
                    field: "agentId",
                })?,
            )
        }
        _ => None,
    };

    let timestamp: Option<DateTime<Utc>> = match &raw_record.timestamp {
        Some(ts) => Some(ts.parse().map_err(|_| ParseError::InvalidTimestamp {
            line: line_number,
            raw: ts.clone(),
        })?),
        None => None,
    };

    // Meta records keep their identity but no content
    if kind == RecordKind::Meta {
        return Ok(EventRecord::new(
            kind,
            session_id,
            agent_id,
            timestamp,
            None,
            Role::Assistant,
            Vec::new(),
            line_number,
        ));
    }

    let raw_message = raw_record.message.ok_or(ParseError::MissingField {
        line: line_number,
        field: "message",
    })?;
    let message: RawMessage =
        serde_json::from_value(raw_message).map_err(|e| ParseError::InvalidJson {
            line: line_number,
            message: e.to_string(),
        })?;

    let correlation_id = raw_record
        .request_id
        .as_deref()
        .or(message.id.as_deref())
        .filter(|id| !id.is_empty())
        .and_then(|id| CorrelationId::new(id).ok());

    let role = match message.role.as_deref() {
        Some(ROLE_USER) => Role::User,
        Some(ROLE_ASSISTANT) => Role::Assistant,
        _ if kind == RecordKind::User => Role::User,
        _ => Role::Assistant,
    };

    let mut content = match message.content {
        Some(RawMessageContent::Text(text)) => vec![ContentBlock::Text { text }],
        Some(RawMessageContent::Blocks(blocks)) => {
            let mut parsed = Vec::with_capacity(blocks.len());
            for block in blocks {
                parse_content_block(block, line_number, &mut parsed)?;
            }
            parsed
        }
        None => Vec::new(),
    };

    if let Some(result) = raw_record.tool_use_result.as_ref() {
        interpret_tool_use_result(&mut content, result);
    }

    Ok(EventRecord::new(
        kind,
        session_id,
        agent_id,
        timestamp,
        correlation_id,
        role,
        content,
        line_number,
    ))
}

/// Map `type` and `isMeta` onto a record kind.
fn parse_record_kind(raw: &RawRecord) -> RecordKind {
    if raw.is_meta.unwrap_or(false) {
        return RecordKind::Meta;
    }
    match raw.record_type.as_str() {
        RECORD_TYPE_USER => RecordKind::User,
        RECORD_TYPE_ASSISTANT => RecordKind::Assistant,
        _ => RecordKind::Meta,
    }
}

/// Parse a raw content block, appending zero or more blocks to `out`.
fn parse_content_block(
    raw: RawContentBlock,
    line_number: usize,
    out: &mut Vec<ContentBlock>,
) -> Result<(), ParseError> {
    match raw {
        RawContentBlock::Text { text } => out.push(ContentBlock::Text { text }),
        RawContentBlock::Thinking { thinking } => out.push(ContentBlock::Thinking { thinking }),
        RawContentBlock::ToolUse { id, name, input } => {
            let tool_use_id = ToolUseId::new(id).map_err(|_| ParseError::MissingField {
                line: line_number,
                field: "tool_use.id",
            })?;
            if name == ASK_USER_QUESTION_TOOL {
                let requests = parse_choice_requests(&tool_use_id, &input);
                if !requests.is_empty() {
                    out.extend(requests.into_iter().map(ContentBlock::ChoiceRequest));
                    return Ok(());
                }
            }
            out.push(ContentBlock::ToolUse(ToolCall::new(tool_use_id, name, input)));
        }
        RawContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            let id = ToolUseId::new(tool_use_id).map_err(|_| ParseError::MissingField {
                line: line_number,
                field: "tool_result.tool_use_id",
            })?;
            out.push(ContentBlock::ToolResult {
                tool_use_id: id,
                content: flatten_result_text(&content, false),
                is_error: is_error.unwrap_or(false),
            });
        }
        RawContentBlock::Unknown => {}
    }
    Ok(())
}

/// Expand `AskUserQuestion` input into one request per question.
fn parse_choice_requests(tool_use_id: &ToolUseId, input: &Value) -> Vec<ChoiceRequest> {
    let Some(questions) = input.get("questions").and_then(Value::as_array) else {
        return Vec::new();
    };

    questions
        .iter()
        .filter_map(|q| {
            let question = q.get("question").and_then(Value::as_str)?;
            let options: Vec<String> = q
                .get("options")
                .and_then(Value::as_array)
                .map(|opts| {
                    opts.iter()
                        .filter_map(|o| match o {
                            Value::String(label) => Some(label.clone()),
                            other => other.get("label").and_then(Value::as_str).map(str::to_string),
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(ChoiceRequest {
                request_id: Some(tool_use_id.clone()),
                question: question.to_string(),
                options,
            })
        })
        .collect()
}

/// Reinterpret the first tool result of a record using the record-level
/// `toolUseResult` metadata.
///
/// A result carrying `agentId` becomes a sub-agent reference; one carrying
/// `answers` becomes choice responses. Anything else is left as is.
fn interpret_tool_use_result(content: &mut Vec<ContentBlock>, result: &Value) {
    let Some(position) = content
        .iter()
        .position(|b| matches!(b, ContentBlock::ToolResult { .. }))
    else {
        return;
    };
    let ContentBlock::ToolResult { tool_use_id, .. } = &content[position] else {
        return;
    };
    let tool_use_id = tool_use_id.clone();

    if let Some(agent_id) = result.get("agentId").and_then(Value::as_str) {
        match AgentId::new(agent_id) {
            Ok(ref_id) => {
                let summary = result
                    .get("content")
                    .map(|c| flatten_result_text(c, true))
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| match &content[position] {
                        ContentBlock::ToolResult { content, .. } => strip_agent_id_lines(content),
                        _ => String::new(),
                    });
                content[position] = ContentBlock::SubagentRef(SubagentRef {
                    ref_id,
                    tool_use_id: Some(tool_use_id),
                    summary,
                    duration_ms: result.get("totalDurationMs").and_then(Value::as_u64),
                    tool_use_count: result.get("totalToolUseCount").and_then(Value::as_u64),
                });
            }
            Err(e) => {
                warn!(agent_id, error = %e, "Ignoring sub-agent reference with unsafe id");
            }
        }
        return;
    }

    if let Some(answers) = result.get("answers").and_then(Value::as_object) {
        let responses: Vec<ContentBlock> = answers
            .iter()
            .map(|(question, answer)| {
                ContentBlock::ChoiceResponse(ChoiceResponse {
                    request_id: Some(tool_use_id.clone()),
                    question: Some(question.clone()),
                    answer: answer_text(answer),
                })
            })
            .collect();
        if !responses.is_empty() {
            content.splice(position..=position, responses);
        }
    }
}

/// Render an answer value as text; multi-select answers are comma-joined.
fn answer_text(answer: &Value) -> String {
    match answer {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(answer_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten tool result content (a string or an array of parts) to text.
///
/// With `skip_agent_id_lines`, parts and lines that only repeat the
/// sub-agent id are dropped.
fn flatten_result_text(content: &Value, skip_agent_id_lines: bool) -> String {
    match content {
        Value::String(text) if skip_agent_id_lines => strip_agent_id_lines(text),
        Value::String(text) => text.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .filter(|t| !(skip_agent_id_lines && t.starts_with(AGENT_ID_LINE_PREFIX)))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn strip_agent_id_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.starts_with(AGENT_ID_LINE_PREFIX))
        .collect::<Vec<_>>()
        .join("\n")
}

// ===== Streaming =====

/// Lazy iterator over the records of a JSONL byte buffer.
///
/// Each line is parsed on demand. Blank lines are skipped without a
/// diagnostic. The iterator is `Clone`, so the same input can be re-parsed
/// from the start and yields identical output.
#[derive(Debug, Clone)]
pub struct Records<'a> {
    remaining: &'a [u8],
    line_number: usize,
}

/// Parse a JSONL byte buffer lazily.
pub fn parse_records(bytes: &[u8]) -> Records<'_> {
    Records {
        remaining: bytes,
        line_number: 0,
    }
}

impl Iterator for Records<'_> {
    type Item = ParseResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining.is_empty() {
                return None;
            }
            let (line, rest) = match self.remaining.iter().position(|&b| b == b'\n') {
                Some(idx) => (&self.remaining[..idx], &self.remaining[idx + 1..]),
                None => (self.remaining, &self.remaining[self.remaining.len()..]),
            };
            self.remaining = rest;
            self.line_number += 1;

            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            return Some(match std::str::from_utf8(line) {
                Ok(text) => parse_record_graceful(text, self.line_number),
                Err(e) => {
                    warn!(line = self.line_number, error = %e, "Skipping non UTF-8 log line");
                    ParseResult::Malformed(MalformedRecord::new(
                        self.line_number,
                        &String::from_utf8_lossy(line),
                        format!("Invalid UTF-8 at line {}: {}", self.line_number, e),
                        None,
                    ))
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(raw: &str) -> EventRecord {
        parse_record(raw, 1).expect("record should parse")
    }

    // ===== Successful Parsing Tests =====

    #[test]
    fn parse_record_minimal_user_message() {
        let raw = r#"{"type":"user","message":{"role":"user","content":"Hello"},"sessionId":"session-123","timestamp":"2026-02-07T10:00:00Z"}"#;
        let record = parse_ok(raw);

        assert_eq!(record.kind(), RecordKind::User);
        assert_eq!(record.session_id().as_str(), "session-123");
        assert_eq!(record.role(), Role::User);
        assert!(record.agent_id().is_none());
        assert_eq!(
            record.content(),
            &[ContentBlock::Text {
                text: "Hello".to_string()
            }]
        );
        assert_eq!(
            record.timestamp(),
            Some("2026-02-07T10:00:00Z".parse().expect("valid"))
        );
    }

    #[test]
    fn parse_record_accepts_snake_case_session_id() {
        let raw = r#"{"type":"user","message":{"role":"user","content":"Hi"},"session_id":"s-snake"}"#;
        assert_eq!(parse_ok(raw).session_id().as_str(), "s-snake");
    }

    #[test]
    fn parse_record_correlation_prefers_request_id() {
        let raw = r#"{"type":"assistant","requestId":"req_1","sessionId":"s1","message":{"id":"msg_1","role":"assistant","content":[{"type":"text","text":"Hi"}]}}"#;
        let record = parse_ok(raw);
        assert_eq!(record.correlation_id().map(|c| c.as_str()), Some("req_1"));
    }

    #[test]
    fn parse_record_correlation_falls_back_to_message_id() {
        let raw = r#"{"type":"assistant","sessionId":"s1","message":{"id":"msg_1","role":"assistant","content":[{"type":"text","text":"Hi"}]}}"#;
        let record = parse_ok(raw);
        assert_eq!(record.correlation_id().map(|c| c.as_str()), Some("msg_1"));
    }

    #[test]
    fn parse_record_keeps_block_order_and_drops_unknown_blocks() {
        let raw = r#"{"type":"assistant","sessionId":"s1","message":{"role":"assistant","content":[
            {"type":"thinking","thinking":"Let me see"},
            {"type":"image","source":{"type":"base64","data":"AAAA"}},
            {"type":"text","text":"Answer"},
            {"type":"tool_use","id":"toolu_1","name":"Read","input":{"file_path":"/a"}}
        ]}}"#
            .replace('\n', "");
        let record = parse_ok(&raw);
        let kinds: Vec<&str> = record.content().iter().map(ContentBlock::kind_name).collect();
        assert_eq!(kinds, vec!["thinking", "text", "tool_use"]);
    }

    #[test]
    fn parse_record_meta_kinds() {
        let summary = r#"{"type":"summary","summary":"Chat about Rust","leafUuid":"u1"}"#;
        let record = parse_ok(summary);
        assert_eq!(record.kind(), RecordKind::Meta);
        assert_eq!(record.session_id(), &SessionId::unknown());

        let flagged = r#"{"type":"user","isMeta":true,"sessionId":"s1","message":{"role":"user","content":"<caveat>"}}"#;
        assert_eq!(parse_ok(flagged).kind(), RecordKind::Meta);

        let progress = r#"{"type":"progress","sessionId":"s1","message":"not an object"}"#;
        assert_eq!(parse_ok(progress).kind(), RecordKind::Meta);
    }

    #[test]
    fn parse_record_ask_user_question_becomes_choice_requests() {
        let raw = r#"{"type":"assistant","sessionId":"s1","message":{"role":"assistant","content":[{"type":"tool_use","id":"toolu_q","name":"AskUserQuestion","input":{"questions":[{"question":"Which DB?","header":"DB","options":[{"label":"Postgres","description":"big"},{"label":"SQLite","description":"small"}],"multiSelect":false},{"question":"Tabs?","options":[{"label":"Yes"},{"label":"No"}]}]}}]}}"#;
        let record = parse_ok(raw);

        assert_eq!(record.content().len(), 2);
        match &record.content()[0] {
            ContentBlock::ChoiceRequest(req) => {
                assert_eq!(req.question, "Which DB?");
                assert_eq!(req.options, vec!["Postgres", "SQLite"]);
                assert_eq!(req.request_id.as_ref().map(|id| id.as_str()), Some("toolu_q"));
            }
            other => panic!("expected choice request, got {:?}", other),
        }
    }

    #[test]
    fn parse_record_answers_become_choice_responses() {
        let raw = r#"{"type":"user","sessionId":"s1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_q","content":"User has answered"}]},"toolUseResult":{"questions":[],"answers":{"Which DB?":"SQLite"}}}"#;
        let record = parse_ok(raw);

        assert_eq!(
            record.content(),
            &[ContentBlock::ChoiceResponse(ChoiceResponse {
                request_id: Some(ToolUseId::new("toolu_q").expect("valid")),
                question: Some("Which DB?".to_string()),
                answer: "SQLite".to_string(),
            })]
        );
    }

    #[test]
    fn parse_record_agent_result_becomes_subagent_ref() {
        let raw = r#"{"type":"user","sessionId":"s1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_t","content":[{"type":"text","text":"Found 3 files"},{"type":"text","text":"agentId: a7b2877"}]}]},"toolUseResult":{"status":"completed","agentId":"a7b2877","totalDurationMs":1234,"totalToolUseCount":5}}"#;
        let record = parse_ok(raw);

        match &record.content()[0] {
            ContentBlock::SubagentRef(sub) => {
                assert_eq!(sub.ref_id.as_str(), "a7b2877");
                assert_eq!(sub.summary, "Found 3 files");
                assert_eq!(sub.duration_ms, Some(1234));
                assert_eq!(sub.tool_use_count, Some(5));
                assert_eq!(sub.tool_use_id.as_ref().map(|id| id.as_str()), Some("toolu_t"));
            }
            other => panic!("expected sub-agent ref, got {:?}", other),
        }
    }

    #[test]
    fn parse_record_unsafe_agent_id_stays_tool_result() {
        let raw = r#"{"type":"user","sessionId":"s1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_t","content":"done"}]},"toolUseResult":{"agentId":"../../etc"}}"#;
        let record = parse_ok(raw);
        assert_eq!(record.content()[0].kind_name(), "tool_result");
    }

    #[test]
    fn parse_record_only_first_tool_result_is_interpreted() {
        let raw = r#"{"type":"user","sessionId":"s1","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"t1","content":"one"},{"type":"tool_result","tool_use_id":"t2","content":"two"}]},"toolUseResult":{"agentId":"abc"}}"#;
        let record = parse_ok(raw);
        let kinds: Vec<&str> = record.content().iter().map(ContentBlock::kind_name).collect();
        assert_eq!(kinds, vec!["subagent_ref", "tool_result"]);
    }

    // ===== Error Handling Tests =====

    #[test]
    fn parse_record_malformed_json() {
        let result = parse_record("{not json", 7);
        assert!(matches!(result, Err(ParseError::InvalidJson { line: 7, .. })));
    }

    #[test]
    fn parse_record_missing_session_id() {
        let raw = r#"{"type":"user","message":{"role":"user","content":"Hi"}}"#;
        assert_eq!(
            parse_record(raw, 3),
            Err(ParseError::MissingField {
                line: 3,
                field: "sessionId"
            })
        );
    }

    #[test]
    fn parse_record_missing_message() {
        let raw = r#"{"type":"assistant","sessionId":"s1"}"#;
        assert_eq!(
            parse_record(raw, 2),
            Err(ParseError::MissingField {
                line: 2,
                field: "message"
            })
        );
    }

    #[test]
    fn parse_record_missing_timestamp_is_none() {
        let raw = r#"{"type":"user","sessionId":"s1","message":{"role":"user","content":"Hi"}}"#;
        assert!(parse_ok(raw).timestamp().is_none());
    }

    #[test]
    fn parse_record_invalid_timestamp() {
        let raw = r#"{"type":"user","sessionId":"s1","timestamp":"yesterday","message":{"role":"user","content":"Hi"}}"#;
        assert_eq!(
            parse_record(raw, 4),
            Err(ParseError::InvalidTimestamp {
                line: 4,
                raw: "yesterday".to_string()
            })
        );
    }

    #[test]
    fn parse_record_empty_tool_use_id() {
        let raw = r#"{"type":"assistant","sessionId":"s1","message":{"role":"assistant","content":[{"type":"tool_use","id":"","name":"Read","input":{}}]}}"#;
        assert!(matches!(
            parse_record(raw, 1),
            Err(ParseError::MissingField {
                field: "tool_use.id",
                ..
            })
        ));
    }

    #[test]
    fn parse_record_graceful_returns_malformed_with_session() {
        let raw = r#"{"type":"user","sessionId":"s9","timestamp":"bad","message":{"role":"user","content":"Hi"}}"#;
        match parse_record_graceful(raw, 5) {
            ParseResult::Malformed(m) => {
                assert_eq!(m.line_number(), 5);
                assert_eq!(m.excerpt(), raw);
                assert!(m.reason().contains("Invalid timestamp"));
                assert_eq!(m.session_id().map(|s| s.as_str()), Some("s9"));
            }
            ParseResult::Valid(_) => panic!("expected malformed"),
        }
    }

    // ===== Streaming Tests =====

    #[test]
    fn records_skip_blank_lines_and_number_lines_from_one() {
        let input = b"\n{\"type\":\"user\",\"sessionId\":\"s1\",\"message\":{\"role\":\"user\",\"content\":\"Hi\"}}\r\n   \ngarbage\n";
        let results: Vec<ParseResult> = parse_records(input).collect();

        assert_eq!(results.len(), 2);
        match &results[0] {
            ParseResult::Valid(record) => assert_eq!(record.line_number(), 2),
            ParseResult::Malformed(m) => panic!("unexpected malformed: {:?}", m),
        }
        match &results[1] {
            ParseResult::Malformed(m) => assert_eq!(m.line_number(), 4),
            ParseResult::Valid(_) => panic!("expected malformed"),
        }
    }

    #[test]
    fn records_handle_missing_trailing_newline() {
        let input = br#"{"type":"user","sessionId":"s1","message":{"role":"user","content":"Hi"}}"#;
        assert_eq!(parse_records(input).count(), 1);
    }

    #[test]
    fn records_report_invalid_utf8() {
        let input = b"\xff\xfe\n";
        let results: Vec<ParseResult> = parse_records(input).collect();
        assert!(matches!(&results[0], ParseResult::Malformed(m) if m.line_number() == 1));
    }

    #[test]
    fn records_are_restartable() {
        let input = b"{\"type\":\"user\",\"sessionId\":\"s1\",\"message\":{\"role\":\"user\",\"content\":\"Hi\"}}\nnope\n";
        let records = parse_records(input);
        let first: Vec<String> = records.clone().map(|r| format!("{:?}", r)).collect();
        let second: Vec<String> = records.map(|r| format!("{:?}", r)).collect();
        assert_eq!(first, second);
    }
}

//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod content;
pub mod conversation;
pub mod error;
pub mod event_record;
pub mod identifiers;
pub mod malformed;

// Re-export for convenience
pub use content::{ChoiceRequest, ChoiceResponse, ContentBlock, Role, SubagentRef, ToolCall};
pub use conversation::{
    Conversation, ConversationKey, DecisionCard, RenderableBlock, SubAgentCard, Turn,
};
pub use error::{ConvertError, InputError, ParseError, ReconstructError, RenderError};
pub use event_record::{EventRecord, RecordKind};
pub use identifiers::{
    AgentId, CorrelationId, InvalidAgentId, InvalidCorrelationId, InvalidSessionId,
    InvalidToolUseId, SessionId, ToolUseId,
};
pub use malformed::MalformedRecord;

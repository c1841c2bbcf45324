//! Sub-agent resolution.
//!
//! Locates the child log behind every sub-agent card and reconstructs it,
//! recursively. Cycles are detected with the set of conversations on the
//! active resolution path; siblings may each resolve a shared descendant.

use crate::model::{AgentId, Conversation, ConversationKey, SessionId};
use crate::reconstruct::reconstruct;
use crate::source::{LogSource, SUBAGENT_LOG_PREFIX};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

// ===== SessionIndex =====

/// Lookup capability for child logs.
pub trait SessionIndex {
    /// Find the log of sub-agent `ref_id` spawned by session `session_id`.
    fn locate(&self, ref_id: &AgentId, session_id: &SessionId) -> Option<LogSource>;
}

/// Looks up sub-agent logs inside a Claude Code project directory.
///
/// Tried in order:
/// 1. `<project>/<session>/subagents/agent-<ref>.jsonl`
/// 2. `<project>/agent-<ref>.jsonl` (older layout)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIndex {
    project_dir: PathBuf,
}

impl ProjectIndex {
    /// Create an index over `project_dir`.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Directory searched for child logs.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    fn candidates(&self, ref_id: &AgentId, session_id: &SessionId) -> Vec<PathBuf> {
        let file_name = format!("{}{}.jsonl", SUBAGENT_LOG_PREFIX, ref_id);
        let mut candidates = Vec::with_capacity(2);
        if is_single_component(session_id.as_str()) {
            candidates.push(
                self.project_dir
                    .join(session_id.as_str())
                    .join("subagents")
                    .join(&file_name),
            );
        } else {
            debug!(session = %session_id, "Session id is not a plain directory name");
        }
        candidates.push(self.project_dir.join(file_name));
        candidates
    }
}

/// Whether `name` joins onto a directory as exactly one child entry.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

impl SessionIndex for ProjectIndex {
    fn locate(&self, ref_id: &AgentId, session_id: &SessionId) -> Option<LogSource> {
        self.candidates(ref_id, session_id)
            .into_iter()
            .filter(|path| path.is_file())
            .find_map(|path| LogSource::from_path(path).ok())
    }
}

// ===== Resolution output =====

/// A conversation together with its resolved sub-agent conversations.
#[derive(Debug, Clone)]
pub struct ResolvedConversation {
    /// The conversation; resolved cards carry `child_session_id`
    pub conversation: Conversation,
    /// Child conversations keyed by sub-agent id
    pub children: BTreeMap<AgentId, ResolvedConversation>,
}

impl ResolvedConversation {
    /// Wrap a conversation with no resolved children.
    pub fn leaf(conversation: Conversation) -> Self {
        Self {
            conversation,
            children: BTreeMap::new(),
        }
    }

    /// Number of conversations in this tree, including this one.
    pub fn conversation_count(&self) -> usize {
        1 + self
            .children
            .values()
            .map(ResolvedConversation::conversation_count)
            .sum::<usize>()
    }
}

/// Why a sub-agent card could not be linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The index has no log for the reference
    NotFound,
    /// The reference points back to a conversation on the active path
    Cycle,
    /// The child log exists but could not be read
    Unreadable(String),
    /// The child log has no turns
    Empty,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NotFound => f.write_str("transcript not found"),
            UnresolvedReason::Cycle => f.write_str("reference cycle"),
            UnresolvedReason::Unreadable(cause) => write!(f, "unreadable: {}", cause),
            UnresolvedReason::Empty => f.write_str("transcript is empty"),
        }
    }
}

/// A sub-agent card left without a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Sub-agent id from the card
    pub ref_id: AgentId,
    /// Conversation holding the card
    pub parent: ConversationKey,
    /// Why the card stays unlinked
    pub reason: UnresolvedReason,
}

/// Output of [`resolve`].
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved conversation tree
    pub resolved: ResolvedConversation,
    /// Every reference that could not be linked, in discovery order
    pub unresolved: Vec<UnresolvedReference>,
}

// ===== Resolution =====

/// Resolve the sub-agent cards of `conversation`, recursively.
///
/// Never fails: references that cannot be linked are reported in
/// [`Resolution::unresolved`] and their cards keep only the summary.
pub fn resolve(conversation: Conversation, index: &impl SessionIndex) -> Resolution {
    let mut resolver = Resolver {
        index,
        active: HashSet::new(),
        unresolved: Vec::new(),
    };
    let key = conversation.key();
    let resolved = resolver.resolve_with_key(conversation, key);
    Resolution {
        resolved,
        unresolved: resolver.unresolved,
    }
}

struct Resolver<'a, I> {
    index: &'a I,
    active: HashSet<ConversationKey>,
    unresolved: Vec<UnresolvedReference>,
}

impl<I: SessionIndex> Resolver<'_, I> {
    fn resolve_with_key(
        &mut self,
        mut conversation: Conversation,
        key: ConversationKey,
    ) -> ResolvedConversation {
        self.active.insert(key.clone());
        let mut children: BTreeMap<AgentId, ResolvedConversation> = BTreeMap::new();

        for i in 0..conversation.sub_agents().len() {
            let ref_id = conversation.sub_agents()[i].ref_id.clone();

            if let Some(existing) = children.get(&ref_id) {
                conversation.sub_agents_mut()[i].child_session_id =
                    Some(existing.conversation.session_id().clone());
                continue;
            }

            match self.resolve_child(&key, &ref_id) {
                Ok(child) => {
                    conversation.sub_agents_mut()[i].child_session_id =
                        Some(child.conversation.session_id().clone());
                    children.insert(ref_id, child);
                }
                Err(reason) => {
                    warn!(parent = %key, ref_id = %ref_id, %reason, "Sub-agent left unlinked");
                    self.unresolved.push(UnresolvedReference {
                        ref_id,
                        parent: key.clone(),
                        reason,
                    });
                }
            }
        }

        self.active.remove(&key);
        ResolvedConversation {
            conversation,
            children,
        }
    }

    fn resolve_child(
        &mut self,
        parent: &ConversationKey,
        ref_id: &AgentId,
    ) -> Result<ResolvedConversation, UnresolvedReason> {
        let child_key = ConversationKey {
            session_id: parent.session_id.clone(),
            agent_id: Some(ref_id.clone()),
        };
        if self.active.contains(&child_key) {
            return Err(UnresolvedReason::Cycle);
        }

        let source = self
            .index
            .locate(ref_id, &parent.session_id)
            .ok_or(UnresolvedReason::NotFound)?;
        debug!(ref_id = %ref_id, path = %source.path().display(), "Resolving sub-agent");

        let reconstruction =
            reconstruct(&source).map_err(|e| UnresolvedReason::Unreadable(e.to_string()))?;
        if reconstruction.conversation.is_empty() {
            return Err(UnresolvedReason::Empty);
        }

        Ok(self.resolve_with_key(reconstruction.conversation, child_key))
    }
}

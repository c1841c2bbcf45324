//! End-to-end conversion of one session: reconstruct → resolve → render.
//!
//! Sessions are independent. A batch keeps going when one session fails
//! and reports every outcome.

use crate::model::{ConvertError, MalformedRecord, SessionId};
use crate::reconstruct::reconstruct;
use crate::render::{render, ArtifactPaths, RenderOptions};
use crate::resolver::{resolve, SessionIndex, UnresolvedReference};
use crate::source::LogSource;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of converting one session.
#[derive(Debug)]
pub struct ConversionReport {
    /// Session the artifacts belong to
    pub session_id: SessionId,
    /// Files written
    pub artifacts: ArtifactPaths,
    /// Lines of the top-level log that were skipped
    pub malformed: Vec<MalformedRecord>,
    /// Sub-agent cards rendered without a link
    pub unresolved: Vec<UnresolvedReference>,
    /// Turns in the top-level conversation
    pub turn_count: usize,
    /// Conversations rendered, the top-level one included
    pub conversation_count: usize,
}

/// Result for one source of a batch.
#[derive(Debug)]
pub struct BatchItem {
    /// Log that was converted
    pub source: PathBuf,
    /// Its conversion outcome
    pub result: Result<ConversionReport, ConvertError>,
}

/// Convert one log into HTML artifacts under `destination`.
///
/// # Errors
///
/// Fails only when the log is unreadable or an artifact cannot be
/// written. Malformed lines and unresolved sub-agents are reported in the
/// returned [`ConversionReport`].
pub fn convert(
    source: &LogSource,
    index: &impl SessionIndex,
    destination: &Path,
    options: &RenderOptions,
) -> Result<ConversionReport, ConvertError> {
    let reconstruction = reconstruct(source)?;
    let conversation = reconstruction.conversation;
    let session_id = conversation.session_id().clone();
    let turn_count = conversation.turns().len();
    let thinking_count = conversation.thinking_count();
    let sub_agent_count = conversation.sub_agents().len();

    let resolution = resolve(conversation, index);
    let conversation_count = resolution.resolved.conversation_count();
    let artifacts = render(&resolution.resolved, destination, options)?;

    info!(
        session = %session_id,
        source = %source.path().display(),
        artifact = %artifacts.primary.display(),
        turns = turn_count,
        thinking = thinking_count,
        sub_agents = sub_agent_count,
        malformed = reconstruction.malformed.len(),
        unresolved = resolution.unresolved.len(),
        "Converted session"
    );

    Ok(ConversionReport {
        session_id,
        artifacts,
        malformed: reconstruction.malformed,
        unresolved: resolution.unresolved,
        turn_count,
        conversation_count,
    })
}

/// Convert each source in order, continuing past failures.
pub fn convert_batch<'a>(
    sources: impl IntoIterator<Item = &'a LogSource>,
    index: &impl SessionIndex,
    destination: &Path,
    options: &RenderOptions,
) -> Vec<BatchItem> {
    sources
        .into_iter()
        .map(|source| {
            let result = convert(source, index, destination, options);
            if let Err(e) = &result {
                warn!(source = %source.path().display(), error = %e, "Session conversion failed");
            }
            BatchItem {
                source: source.path().to_path_buf(),
                result,
            }
        })
        .collect()
}

//! Renderer: ResolvedConversation → HTML artifacts on disk.
//!
//! One self-contained document per conversation. Sub-agent documents live
//! in a directory named after the parent's file stem:
//!
//! ```text
//! <dest>/<stem>.html
//! <dest>/<stem>/<refId>.html
//! <dest>/<stem>/<refId>/<grandchildRefId>.html
//! ```

pub mod highlighter;
pub mod html;
pub mod markdown;
pub mod styles;
pub mod writer;

use crate::model::{AgentId, Conversation, RenderError};
use crate::render::highlighter::{SyntaxHighlighter, DEFAULT_THEME};
use crate::render::html::{render_document, DocumentContext};
use crate::render::writer::{artifact_path, choose_stem, ensure_dir, prune_stale_artifacts, write_atomic};
use crate::resolver::ResolvedConversation;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default cut-off for sub-agent summaries on cards.
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 500;

const STEM_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Presentation settings shared by every document of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Syntax theme name; unknown names fall back to the default theme
    pub theme: String,
    /// Sub-agent summaries longer than this many characters are cut
    pub summary_max_chars: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

/// Files written by one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// The top-level conversation's document
    pub primary: PathBuf,
    /// Sub-agent documents, depth-first in sub-agent id order
    pub children: Vec<PathBuf>,
}

impl ArtifactPaths {
    /// Every written file, primary first.
    pub fn all(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.children.iter().map(PathBuf::as_path))
    }
}

/// Render a conversation tree into `destination`.
///
/// The destination is created if absent. Children are written before
/// their parent so a visible link never points at a missing file.
///
/// # Errors
///
/// Returns `RenderError` if a directory or file cannot be written, or if
/// no free name exists for the primary document.
pub fn render(
    resolved: &ResolvedConversation,
    destination: &Path,
    options: &RenderOptions,
) -> Result<ArtifactPaths, RenderError> {
    ensure_dir(destination)?;

    let conversation = &resolved.conversation;
    let stem = choose_stem(destination, &base_stem(conversation), conversation.session_id())?;

    let highlighter = SyntaxHighlighter::new(&options.theme);
    let theme_css = highlighter.stylesheet();
    let shared = Shared {
        highlighter: &highlighter,
        theme_css: &theme_css,
        summary_max_chars: options.summary_max_chars,
    };

    let mut children = Vec::new();
    let primary = render_tree(resolved, destination, &stem, None, &shared, &mut children)?;
    Ok(ArtifactPaths { primary, children })
}

/// File stem for a conversation before collision handling.
///
/// The UTC start time, or `session-<id>` when the log has no timestamp.
pub fn base_stem(conversation: &Conversation) -> String {
    match conversation.started_at() {
        Some(ts) => ts.format(STEM_TIME_FORMAT).to_string(),
        None => format!("session-{}", file_safe(conversation.session_id().as_str())),
    }
}

/// Replace characters that are unsafe in file names.
fn file_safe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

struct Shared<'a> {
    highlighter: &'a SyntaxHighlighter,
    theme_css: &'a str,
    summary_max_chars: usize,
}

fn render_tree(
    node: &ResolvedConversation,
    dir: &Path,
    stem: &str,
    back_link: Option<&str>,
    shared: &Shared<'_>,
    written: &mut Vec<PathBuf>,
) -> Result<PathBuf, RenderError> {
    let child_dir = dir.join(stem);
    if !node.children.is_empty() {
        ensure_dir(&child_dir)?;
        let back = format!("../{}.html", stem);
        for (ref_id, child) in &node.children {
            let path = render_tree(child, &child_dir, ref_id.as_str(), Some(&back), shared, written)?;
            written.push(path);
        }
    }
    // Sub-agents dropped since an earlier render
    if child_dir.is_dir() {
        let keep: BTreeSet<&str> = node.children.keys().map(AgentId::as_str).collect();
        prune_stale_artifacts(&child_dir, &keep, node.conversation.session_id());
    }

    let ctx = DocumentContext {
        child_dir: stem,
        back_link,
        highlighter: shared.highlighter,
        theme_css: shared.theme_css,
        summary_max_chars: shared.summary_max_chars,
    };
    let document = render_document(node, &ctx);
    let path = artifact_path(dir, stem);
    write_atomic(&path, document.as_bytes())?;

    let conversation = &node.conversation;
    info!(
        path = %path.display(),
        turns = conversation.turns().len(),
        thinking = conversation.thinking_count(),
        sub_agents = conversation.sub_agents().len(),
        "Wrote artifact"
    );
    Ok(path)
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;

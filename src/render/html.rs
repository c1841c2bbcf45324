//! HTML document assembly.
//!
//! Every string taken from the log passes through [`escape_html`] or the
//! markdown renderer before it is embedded. Output depends only on the
//! conversation and the render settings, never on the clock.

use crate::model::{Conversation, DecisionCard, RenderableBlock, SubAgentCard, Turn};
use crate::render::highlighter::SyntaxHighlighter;
use crate::render::markdown::render_markdown;
use crate::render::styles::BASE_CSS;
use crate::resolver::ResolvedConversation;
use chrono::{DateTime, Utc};

/// Name of the meta tag carrying the session id.
pub const SESSION_META_NAME: &str = "ccbook-session-id";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const TRUNCATION_MARKER: &str = "...";

/// Escape the five markup-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// The meta line identifying the session an artifact belongs to.
pub fn session_meta_line(session_id: &str) -> String {
    format!(
        "<meta name=\"{}\" content=\"{}\">",
        SESSION_META_NAME,
        escape_html(session_id)
    )
}

/// Placement of one document within the artifact tree.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    /// Directory of this document's children, relative to the document
    pub child_dir: &'a str,
    /// Link to the parent artifact, for sub-agent documents
    pub back_link: Option<&'a str>,
    /// Highlighter for fenced code
    pub highlighter: &'a SyntaxHighlighter,
    /// Theme stylesheet, inlined after the base styles
    pub theme_css: &'a str,
    /// Sub-agent summaries longer than this are cut
    pub summary_max_chars: usize,
}

/// Render one conversation of the tree as a complete HTML document.
pub fn render_document(node: &ResolvedConversation, ctx: &DocumentContext<'_>) -> String {
    let conversation = &node.conversation;
    let mut out = String::with_capacity(16 * 1024);

    push_head(&mut out, conversation, ctx);

    out.push_str("<body>\n<div class=\"container\">\n");
    push_header(&mut out, conversation, ctx);

    out.push_str("<main>\n");
    if conversation.is_empty() {
        out.push_str("<p class=\"empty-session\">No messages in this session.</p>\n");
    }
    for (i, turn) in conversation.turns().iter().enumerate() {
        push_turn(&mut out, i + 1, turn, node, ctx);
    }
    out.push_str("</main>\n</div>\n</body>\n</html>\n");
    out
}

// ===== Document frame =====

fn push_head(out: &mut String, conversation: &Conversation, ctx: &DocumentContext<'_>) {
    let session = escape_html(conversation.session_id().as_str());
    let title = match conversation.agent_id() {
        Some(agent) => format!("Sub-agent {} ({})", escape_html(agent.as_str()), session),
        None => format!("Session {}", session),
    };

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&session_meta_line(conversation.session_id().as_str()));
    out.push('\n');
    if let Some(agent) = conversation.agent_id() {
        out.push_str(&format!(
            "<meta name=\"ccbook-agent-id\" content=\"{}\">\n",
            escape_html(agent.as_str())
        ));
    }
    out.push_str(&format!("<title>{}</title>\n", title));
    out.push_str("<style>\n");
    out.push_str(BASE_CSS);
    out.push_str(ctx.theme_css);
    out.push_str("</style>\n</head>\n");
}

fn push_header(out: &mut String, conversation: &Conversation, ctx: &DocumentContext<'_>) {
    out.push_str("<header class=\"session-header\">\n");
    if let Some(back) = ctx.back_link {
        out.push_str(&format!(
            "<a class=\"back-link\" href=\"{}\">&larr; Back to parent conversation</a>\n",
            escape_html(back)
        ));
    }

    let heading = match conversation.agent_id() {
        Some(agent) => format!("Sub-agent {}", escape_html(agent.as_str())),
        None => "Session transcript".to_string(),
    };
    out.push_str(&format!("<h1>{}</h1>\n", heading));

    let date = conversation
        .started_at()
        .map(format_timestamp)
        .unwrap_or_else(|| "Unknown date".to_string());
    out.push_str(&format!(
        "<div class=\"session-meta\"><span class=\"session-id\">{}</span><span class=\"session-date\">{}</span></div>\n",
        escape_html(conversation.session_id().as_str()),
        date
    ));
    out.push_str("</header>\n");
}

// ===== Turns =====

fn push_turn(
    out: &mut String,
    number: usize,
    turn: &Turn,
    node: &ResolvedConversation,
    ctx: &DocumentContext<'_>,
) {
    let role = turn.role();
    out.push_str(&format!(
        "<article class=\"turn turn-{}\" id=\"turn-{}\">\n",
        role.as_str(),
        number
    ));
    out.push_str(&format!(
        "<div class=\"turn-meta\"><span class=\"turn-role\">{}</span>",
        role.label()
    ));
    if let Some(ts) = turn.timestamp() {
        out.push_str(&format!(
            "<span class=\"turn-timestamp\">{}</span>",
            format_timestamp(ts)
        ));
    }
    out.push_str("</div>\n<div class=\"turn-content\">\n");

    for block in turn.blocks() {
        match block {
            RenderableBlock::Text(text) => out.push_str(&render_markdown(text, ctx.highlighter)),
            RenderableBlock::Thinking(thinking) => {
                out.push_str(&render_thinking(thinking, ctx.highlighter))
            }
            RenderableBlock::Decision(card) => out.push_str(&render_decision(card)),
            RenderableBlock::SubAgent(index) => {
                if let Some(card) = node.conversation.sub_agents().get(*index) {
                    let href = node
                        .children
                        .contains_key(&card.ref_id)
                        .then(|| format!("{}/{}.html", ctx.child_dir, card.ref_id));
                    out.push_str(&render_sub_agent(card, href.as_deref(), ctx.summary_max_chars));
                }
            }
        }
    }

    out.push_str("</div>\n</article>\n");
}

fn render_thinking(thinking: &str, highlighter: &SyntaxHighlighter) -> String {
    format!(
        "<details class=\"thinking-block\">\n<summary>Thinking</summary>\n<div class=\"thinking-content\">\n{}</div>\n</details>\n",
        render_markdown(thinking, highlighter)
    )
}

fn render_decision(card: &DecisionCard) -> String {
    let mut out = String::from("<div class=\"choice-card\">\n");
    out.push_str(&format!(
        "<div class=\"choice-question\">{}</div>\n",
        escape_html(&card.question)
    ));

    if !card.options.is_empty() {
        out.push_str("<ul class=\"choice-options\">\n");
        for (i, option) in card.options.iter().enumerate() {
            if card.selected_index == Some(i) {
                out.push_str(&format!(
                    "<li class=\"choice-option choice-selected\">&#10003; {}</li>\n",
                    escape_html(option)
                ));
            } else {
                out.push_str(&format!(
                    "<li class=\"choice-option\">{}</li>\n",
                    escape_html(option)
                ));
            }
        }
        out.push_str("</ul>\n");
    }

    match (&card.answer, card.selected_index) {
        (Some(answer), None) => out.push_str(&format!(
            "<div class=\"choice-answer\">Answer: {}</div>\n",
            escape_html(answer)
        )),
        (None, _) => out.push_str("<div class=\"choice-pending\">No answer recorded</div>\n"),
        (Some(_), Some(_)) => {}
    }

    out.push_str("</div>\n");
    out
}

fn render_sub_agent(card: &SubAgentCard, href: Option<&str>, summary_max_chars: usize) -> String {
    let mut out = String::from("<div class=\"sub-agent-card\">\n<div class=\"sub-agent-header\">");
    out.push_str(&format!(
        "<span class=\"sub-agent-type\">{}</span>",
        escape_html(card.agent_type.as_deref().unwrap_or("Sub-agent"))
    ));
    if let Some(description) = &card.description {
        out.push_str(&format!(
            " <span class=\"sub-agent-description\">{}</span>",
            escape_html(description)
        ));
    }
    out.push_str("</div>\n");

    let mut meta = Vec::new();
    if let Some(ms) = card.duration_ms {
        meta.push(format!("Duration: {:.1}s", ms as f64 / 1000.0));
    }
    if let Some(count) = card.tool_use_count {
        meta.push(format!("Tool uses: {}", count));
    }
    if !meta.is_empty() {
        out.push_str(&format!(
            "<div class=\"sub-agent-meta\">{}</div>\n",
            meta.join(" &bull; ")
        ));
    }

    if !card.summary.trim().is_empty() {
        out.push_str(&format!(
            "<div class=\"sub-agent-summary\">{}</div>\n",
            escape_html(&truncate_chars(&card.summary, summary_max_chars))
        ));
    }

    match href {
        Some(href) => out.push_str(&format!(
            "<a class=\"sub-agent-link\" href=\"{}\">View transcript &rarr;</a>\n",
            escape_html(href)
        )),
        None => out.push_str("<span class=\"sub-agent-broken-link\">Transcript not available</span>\n"),
    }

    out.push_str("</div>\n");
    out
}

// ===== Helpers =====

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format(DATE_FORMAT).to_string()
}

/// Cut `text` to `max` characters, marking the cut with `...`.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

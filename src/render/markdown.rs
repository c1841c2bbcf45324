//! Markdown rendering for turn text and thinking blocks.
//!
//! pulldown-cmark parses the text; its event stream is rewritten before it
//! reaches the HTML writer:
//! - raw HTML in the source is demoted to text, so it is escaped
//! - links with unsafe schemes point to `#`
//! - images become plain links, so nothing loads externally
//! - fenced code goes through the syntax highlighter

use crate::render::highlighter::SyntaxHighlighter;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Render markdown to an HTML fragment.
pub fn render_markdown(markdown: &str, highlighter: &SyntaxHighlighter) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut state = RewriteState::new(highlighter);
    let events: Vec<Event<'_>> = parser.filter_map(|event| state.rewrite(event)).collect();

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Event rewriter; buffers fenced code until its end tag.
struct RewriteState<'h> {
    highlighter: &'h SyntaxHighlighter,
    code: Option<(Option<String>, String)>,
}

impl<'h> RewriteState<'h> {
    fn new(highlighter: &'h SyntaxHighlighter) -> Self {
        Self {
            highlighter,
            code: None,
        }
    }

    fn rewrite<'a>(&mut self, event: Event<'a>) -> Option<Event<'a>> {
        if let Some((_, buffer)) = self.code.as_mut() {
            return match event {
                Event::Text(text) => {
                    buffer.push_str(&text);
                    None
                }
                Event::End(TagEnd::CodeBlock) => {
                    let (language, code) = self.code.take()?;
                    let block = self.highlighter.highlight_block(&code, language.as_deref());
                    // Highlighter output is already escaped
                    Some(Event::Html(CowStr::from(block)))
                }
                _ => None,
            };
        }

        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
                None
            }
            Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Some(Event::Start(Tag::Link {
                link_type,
                dest_url: sanitize_url(dest_url),
                title,
                id,
            })),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Some(Event::Start(Tag::Link {
                link_type,
                dest_url: sanitize_url(dest_url),
                title,
                id,
            })),
            Event::End(TagEnd::Image) => Some(Event::End(TagEnd::Link)),
            other => Some(other),
        }
    }
}

/// Replace URLs with schemes other than http, https and mailto by `#`.
/// Relative URLs and fragments are kept.
fn sanitize_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

fn is_safe_url(url: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let cleaned: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    match cleaned.find(':') {
        Some(colon) => {
            let scheme = &cleaned[..colon];
            if scheme.contains(['/', '?', '#']) {
                // The colon belongs to a path, query or fragment
                return true;
            }
            SAFE_SCHEMES
                .iter()
                .any(|safe| scheme.eq_ignore_ascii_case(safe))
        }
        None => true,
    }
}

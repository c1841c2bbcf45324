//! Page stylesheet.
//!
//! Inlined into every artifact ahead of the theme rules for highlighted
//! code. Colors for `.hl-*` token classes come from the theme, not from here.

/// Base rules for layout, cards and disclosure widgets.
pub const BASE_CSS: &str = r#"* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.6;
    color: #202124;
    background: #f8f9fa;
    padding: 20px;
}
.container {
    max-width: 900px;
    margin: 0 auto;
    background: #ffffff;
    padding: 40px;
    border-radius: 8px;
    box-shadow: 0 1px 3px rgba(60, 64, 67, 0.15), 0 4px 8px rgba(60, 64, 67, 0.08);
}
.session-header { border-bottom: 2px solid #e8eaed; padding-bottom: 20px; margin-bottom: 40px; }
.session-header h1 { font-size: 28px; font-weight: 500; margin-bottom: 8px; }
.session-meta { font-size: 14px; color: #5f6368; display: flex; gap: 16px; }
.session-id { font-family: Monaco, Menlo, Consolas, monospace; background: #f1f3f4; padding: 2px 6px; border-radius: 3px; }
.back-link { display: inline-block; margin-bottom: 12px; font-size: 14px; color: #1a73e8; text-decoration: none; }
.back-link:hover { text-decoration: underline; }
.empty-session { color: #5f6368; font-style: italic; }

.turn { margin-bottom: 24px; padding: 20px; border-radius: 8px; border-left: 4px solid; }
.turn-user { background: #e8f0fe; border-left-color: #1a73e8; }
.turn-assistant { background: #f8f9fa; border-left-color: #34a853; }
.turn-meta { font-size: 12px; color: #5f6368; margin-bottom: 12px; display: flex; gap: 12px; }
.turn-role { font-weight: 600; text-transform: uppercase; letter-spacing: 0.5px; }
.turn-content { font-size: 15px; overflow-wrap: break-word; }

.turn-content p, .thinking-content p { margin-bottom: 12px; }
.turn-content p:last-child, .thinking-content p:last-child { margin-bottom: 0; }
.turn-content h1, .turn-content h2, .turn-content h3,
.thinking-content h1, .thinking-content h2, .thinking-content h3 { margin: 16px 0 8px; font-weight: 600; }
.turn-content ul, .turn-content ol, .thinking-content ul, .thinking-content ol { margin: 12px 0; padding-left: 24px; }
.turn-content li, .thinking-content li { margin-bottom: 4px; }
.turn-content blockquote, .thinking-content blockquote { border-left: 3px solid #dadce0; padding-left: 12px; color: #5f6368; }
.turn-content table, .thinking-content table { border-collapse: collapse; margin: 12px 0; }
.turn-content th, .turn-content td, .thinking-content th, .thinking-content td { border: 1px solid #dadce0; padding: 4px 8px; }
.turn-content code, .thinking-content code {
    font-family: Monaco, Menlo, Consolas, monospace;
    background: rgba(0, 0, 0, 0.05);
    padding: 2px 4px;
    border-radius: 3px;
    font-size: 0.9em;
}
.hl-code { background: #202124; color: #f8f9fa; }
pre.hl-code { padding: 16px; border-radius: 6px; margin: 12px 0; overflow-x: auto; }
pre.hl-code code { background: transparent; color: inherit; padding: 0; font-size: 0.85em; }

.thinking-block { margin-top: 16px; border: 1px solid #dadce0; border-radius: 6px; background: #fefefe; }
.thinking-block summary { padding: 10px 14px; cursor: pointer; font-weight: 500; font-size: 13px; color: #5f6368; }
.thinking-content { padding: 14px; font-size: 13px; border-top: 1px solid #e8eaed; color: #3c4043; background: #fafafa; }

.choice-card { margin-top: 16px; padding: 16px; border: 2px solid #f9ab00; border-radius: 8px; background: #fef7e0; }
.choice-question { font-weight: 600; margin-bottom: 10px; }
.choice-options { list-style: none; padding-left: 0; }
.choice-option { padding: 6px 10px; margin-bottom: 4px; border-radius: 4px; background: #ffffff; border: 1px solid #e8eaed; }
.choice-selected { border-color: #34a853; background: #e6f4ea; font-weight: 600; }
.choice-answer { margin-top: 8px; font-style: italic; }
.choice-pending { margin-top: 8px; color: #5f6368; font-size: 13px; }

.sub-agent-card { margin-top: 16px; padding: 16px; border: 1px solid #c5cae9; border-radius: 8px; background: #f3f4fd; }
.sub-agent-header { margin-bottom: 6px; }
.sub-agent-type { font-weight: 600; color: #3949ab; }
.sub-agent-description { color: #3c4043; }
.sub-agent-meta { font-size: 12px; color: #5f6368; margin-bottom: 8px; }
.sub-agent-summary { font-size: 14px; white-space: pre-wrap; margin-bottom: 8px; }
.sub-agent-link { color: #1a73e8; text-decoration: none; font-weight: 500; }
.sub-agent-link:hover { text-decoration: underline; }
.sub-agent-broken-link { color: #9aa0a6; font-style: italic; }
"#;

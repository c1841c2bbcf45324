//! Syntax highlighting with configurable themes using syntect + two-face.
//!
//! Code blocks are emitted as class-based HTML; the selected theme is turned
//! into a stylesheet that is inlined once per document, so artifacts carry
//! no external references.
//!
//! # Theme Support
//!
//! Built-in themes (from two-face):
//! - `gruvbox-dark` / `gruvbox-light` - Warm retro groove colors
//! - `base16-ocean-dark` - Ocean-inspired colors (default)
//! - `solarized-dark` / `solarized-light` - Precision colors
//! - `monokai` - Sublime Text classic
//! - `nord` - Arctic, north-bluish colors
//! - `dracula` - Dark theme for vampires
//! - And many more (see [`theme_names`])

use crate::render::html::escape_html;
use std::sync::LazyLock;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

/// Selectable themes, by configuration name.
#[allow(deprecated)]
const THEMES: &[(&str, EmbeddedThemeName)] = &[
    ("ansi", EmbeddedThemeName::Ansi),
    ("base16", EmbeddedThemeName::Base16),
    ("base16-256", EmbeddedThemeName::Base16_256),
    ("base16-eighties-dark", EmbeddedThemeName::Base16EightiesDark),
    ("base16-mocha-dark", EmbeddedThemeName::Base16MochaDark),
    ("base16-ocean-dark", EmbeddedThemeName::Base16OceanDark),
    ("base16-ocean-light", EmbeddedThemeName::Base16OceanLight),
    ("coldark-cold", EmbeddedThemeName::ColdarkCold),
    ("coldark-dark", EmbeddedThemeName::ColdarkDark),
    ("dark-neon", EmbeddedThemeName::DarkNeon),
    ("dracula", EmbeddedThemeName::Dracula),
    ("github", EmbeddedThemeName::Github),
    ("gruvbox-dark", EmbeddedThemeName::GruvboxDark),
    ("gruvbox-light", EmbeddedThemeName::GruvboxLight),
    ("inspired-github", EmbeddedThemeName::InspiredGithub),
    ("leet", EmbeddedThemeName::Leet),
    ("monokai", EmbeddedThemeName::MonokaiExtended),
    ("monokai-bright", EmbeddedThemeName::MonokaiExtendedBright),
    ("monokai-light", EmbeddedThemeName::MonokaiExtendedLight),
    ("monokai-origin", EmbeddedThemeName::MonokaiExtendedOrigin),
    ("nord", EmbeddedThemeName::Nord),
    ("one-half-dark", EmbeddedThemeName::OneHalfDark),
    ("one-half-light", EmbeddedThemeName::OneHalfLight),
    ("solarized-dark", EmbeddedThemeName::SolarizedDark),
    ("solarized-light", EmbeddedThemeName::SolarizedLight),
    ("sublime-snazzy", EmbeddedThemeName::SublimeSnazzy),
    ("two-dark", EmbeddedThemeName::TwoDark),
    ("visual-studio-dark-plus", EmbeddedThemeName::VisualStudioDarkPlus),
    ("zenburn", EmbeddedThemeName::Zenburn),
];

/// Default theme name.
pub const DEFAULT_THEME: &str = "base16-ocean-dark";

/// Class prefix for highlighted tokens; keeps theme rules away from page rules.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

static THEME_SET: LazyLock<EmbeddedLazyThemeSet> = LazyLock::new(two_face::theme::extra);

/// Syntax definitions, loaded on first highlighted block.
static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(two_face::syntax::extra_newlines);

/// Names accepted for the `theme` setting, in display order.
pub fn theme_names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|(name, _)| *name)
}

fn embedded_theme(name: &str) -> Option<EmbeddedThemeName> {
    THEMES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, theme)| *theme)
}

/// Check if a theme name is valid.
pub fn is_valid_theme(name: &str) -> bool {
    embedded_theme(name).is_some()
}

/// Syntax highlighter with configurable theme.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    theme_name: EmbeddedThemeName,
}

impl SyntaxHighlighter {
    /// Create a new highlighter with the specified theme.
    ///
    /// If the theme name is invalid, falls back to the default theme.
    pub fn new(theme_name: &str) -> Self {
        let theme_name = embedded_theme(theme_name).unwrap_or_else(|| {
            warn!(theme = theme_name, fallback = DEFAULT_THEME, "Unknown theme");
            EmbeddedThemeName::Base16OceanDark
        });
        Self { theme_name }
    }

    /// Stylesheet for the highlighted token classes.
    ///
    /// Returns an empty string if the theme cannot be expressed as CSS;
    /// code then renders uncolored.
    pub fn stylesheet(&self) -> String {
        let theme = THEME_SET.get(self.theme_name);
        match css_for_theme_with_class_style(theme, CLASS_STYLE) {
            Ok(css) => css,
            Err(e) => {
                warn!(error = %e, "Cannot build theme stylesheet");
                String::new()
            }
        }
    }

    /// Render a code block as `<pre class="hl-code">` markup.
    ///
    /// # Arguments
    /// * `code` - The source code to highlight
    /// * `language` - Optional language hint (e.g., "rust", "python")
    ///
    /// Unknown languages and highlighting failures produce escaped plain
    /// code inside the same wrapper.
    pub fn highlight_block(&self, code: &str, language: Option<&str>) -> String {
        let body = language
            .filter(|lang| !lang.is_empty())
            .and_then(|lang| highlight_classed(code, lang))
            .unwrap_or_else(|| escape_html(code));

        match language.filter(|lang| !lang.is_empty()) {
            Some(lang) => format!(
                "<pre class=\"hl-code\"><code class=\"language-{}\">{}</code></pre>\n",
                escape_html(lang),
                body
            ),
            None => format!("<pre class=\"hl-code\"><code>{}</code></pre>\n", body),
        }
    }
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

/// Class-annotated HTML for `code`, or `None` when the language is unknown
/// or highlighting fails.
fn highlight_classed(code: &str, language: &str) -> Option<String> {
    let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            debug!(language, error = %e, "Highlighting failed, using plain code");
            return None;
        }
    }
    Some(generator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_themes_are_recognized() {
        assert!(theme_names().count() > 20);
        assert!(theme_names().all(is_valid_theme));
        assert!(is_valid_theme(DEFAULT_THEME));
    }

    #[test]
    fn invalid_theme_is_rejected() {
        assert!(!is_valid_theme("not-a-real-theme"));
    }

    #[test]
    fn invalid_theme_falls_back_to_default_stylesheet() {
        let fallback = SyntaxHighlighter::new("invalid-theme").stylesheet();
        let default = SyntaxHighlighter::default().stylesheet();
        assert_eq!(fallback, default);
    }

    #[test]
    fn stylesheet_targets_prefixed_classes() {
        let css = SyntaxHighlighter::new("gruvbox-dark").stylesheet();
        assert!(css.contains(".hl-"), "expected prefixed selectors, got: {}", css);
    }

    #[test]
    fn known_language_produces_classed_spans() {
        let html = SyntaxHighlighter::default().highlight_block("fn main() {}\n", Some("rust"));
        assert!(html.starts_with("<pre class=\"hl-code\"><code class=\"language-rust\">"));
        assert!(html.contains("<span class=\"hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn unknown_language_is_escaped_plain_code() {
        let html = SyntaxHighlighter::default()
            .highlight_block("<script>alert(1)</script>", Some("no-such-lang"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<span"));
    }

    #[test]
    fn no_language_is_escaped_plain_code() {
        let html = SyntaxHighlighter::default().highlight_block("a < b && c", None);
        assert_eq!(
            html,
            "<pre class=\"hl-code\"><code>a &lt; b &amp;&amp; c</code></pre>\n"
        );
    }

    #[test]
    fn highlighted_code_escapes_markup() {
        let html = SyntaxHighlighter::default()
            .highlight_block("let s = \"<b>\";\n", Some("rust"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;"));
    }
}

//! Lightweight message formatting
//!
//! Replies carry a tiny markdown subset. [`to_markup`] rewrites it into tag
//! markup with four ordered substitutions; [`to_lines`] turns that markup into
//! styled terminal lines.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use std::sync::LazyLock;

use super::styles::Theme;

// Bold runs first: `**x**` would otherwise be read as two empty italics
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.*?)`").unwrap());

const LINE_BREAK: &str = "<br>";

/// Rewrite `**bold**`, `*italic*`, `` `code` `` and newlines into markup.
/// Existing angle brackets are escaped so content cannot inject tags.
pub fn to_markup(content: &str) -> String {
    let escaped = content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");

    let bold = BOLD.replace_all(&escaped, "<strong>$1</strong>");
    let italic = ITALIC.replace_all(&bold, "<em>$1</em>");
    let code = CODE.replace_all(&italic, "<code>$1</code>");
    code.replace('\n', LINE_BREAK)
}

#[derive(Debug, Default, Clone, Copy)]
struct Emphasis {
    bold: bool,
    italic: bool,
    code: bool,
}

impl Emphasis {
    fn style(&self, base: Style, theme: &Theme) -> Style {
        let mut style = if self.code { theme.code_style() } else { base };
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    /// Apply `tag` if it is one we know, returning its length
    fn apply(&mut self, rest: &str) -> Option<usize> {
        const TAGS: &[(&str, fn(&mut Emphasis))] = &[
            ("<strong>", |e| e.bold = true),
            ("</strong>", |e| e.bold = false),
            ("<em>", |e| e.italic = true),
            ("</em>", |e| e.italic = false),
            ("<code>", |e| e.code = true),
            ("</code>", |e| e.code = false),
        ];

        TAGS.iter().find(|(tag, _)| rest.starts_with(tag)).map(|(tag, set)| {
            set(self);
            tag.len()
        })
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Render markup produced by [`to_markup`] into styled lines
pub fn to_lines(markup: &str, base: Style, theme: &Theme) -> Vec<Line<'static>> {
    let mut emphasis = Emphasis::default();

    markup
        .split(LINE_BREAK)
        .map(|segment| {
            let mut spans = Vec::new();
            let mut rest = segment;
            let mut text = String::new();

            while let Some(pos) = rest.find('<') {
                text.push_str(&rest[..pos]);
                rest = &rest[pos..];

                let before = emphasis;
                match emphasis.apply(rest) {
                    Some(len) => {
                        if !text.is_empty() {
                            spans.push(Span::styled(unescape(&text), before.style(base, theme)));
                            text.clear();
                        }
                        rest = &rest[len..];
                    }
                    None => {
                        text.push('<');
                        rest = &rest[1..];
                    }
                }
            }
            text.push_str(rest);
            if !text.is_empty() {
                spans.push(Span::styled(unescape(&text), emphasis.style(base, theme)));
            }

            Line::from(spans)
        })
        .collect()
}

/// Convenience: format raw message content straight into lines
pub fn format_message(content: &str, base: Style, theme: &Theme) -> Vec<Line<'static>> {
    to_lines(&to_markup(content), base, theme)
}

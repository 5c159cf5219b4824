//! Markdown rendering

use pulldown_cmark::{html, Options, Parser};

/// Marker separating a hand-picked excerpt from the rest of a post
pub const MORE_MARKER: &str = "<!-- more -->";

/// Renders post bodies to HTML the way the site generator hands them to helpers
pub struct MarkdownRenderer {
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        // YAML metadata blocks stay off, front-matter is stripped beforehand
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        Self { options }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Split a body at the `<!-- more -->` marker.
    ///
    /// Returns the text before the marker (if the marker exists) and the
    /// body with the marker removed.
    pub fn split_excerpt(body: &str) -> (Option<&str>, String) {
        match body.find(MORE_MARKER) {
            Some(pos) => {
                let head = body[..pos].trim();
                let tail = body[pos + MORE_MARKER.len()..].trim();
                (Some(head), format!("{}\n\n{}", head, tail))
            }
            None => (None, body.to_string()),
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

//! HTML minification
//!
//! A light cleanup pass runs first (line-break whitespace next to block
//! tags, empty attributes), then [`minify_html`] does the real work including
//! inline `<script>` and `<style>` blocks.

use lazy_static::lazy_static;
use minify_html::{minify, Cfg};
use regex::Regex;
use std::ops::Range;

use super::TextMinifier;
use crate::config::HtmlConfig;

lazy_static! {
    /// Elements whose contents must not be touched by the cleanup pass
    static ref RAW_BLOCK: Regex = Regex::new(
        r"(?is)<pre\b.*?</pre\s*>|<textarea\b.*?</textarea\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>"
    )
    .unwrap();

    /// Whitespace containing a line break, sitting between two tags
    static ref BREAK_BETWEEN_TAGS: Regex = Regex::new(r">[ \t\r]*\n\s*<").unwrap();

    /// A start tag, quoted attribute values may contain `>`
    static ref START_TAG: Regex = Regex::new(r#"<[a-zA-Z](?:[^>"']|"[^"]*"|'[^']*')*>"#).unwrap();

    static ref EMPTY_ATTRIBUTE: Regex =
        Regex::new(r#"(?i)\s+(?:class|id|style|title|lang|dir|on[a-z]+)\s*=\s*(?:""|'')"#).unwrap();
}

/// Minifies HTML documents
pub struct HtmlMinifier {
    collapse_whitespace: bool,
    remove_empty_attributes: bool,
    cfg: Cfg,
}

impl HtmlMinifier {
    pub fn new(config: &HtmlConfig) -> Self {
        let cfg = Cfg {
            keep_comments: !config.remove_comments,
            minify_js: config.minify_js,
            minify_css: config.minify_css,
            do_not_minify_doctype: true,
            ensure_spec_compliant_unquoted_attribute_values: true,
            keep_closing_tags: true,
            keep_html_and_head_opening_tags: true,
            ..Cfg::default()
        };

        Self {
            collapse_whitespace: config.collapse_whitespace,
            remove_empty_attributes: config.remove_empty_attributes,
            cfg,
        }
    }

    /// Cleanup pass; raw blocks keep their contents
    fn clean(&self, source: &str) -> String {
        let mut out = if self.remove_empty_attributes {
            strip_empty_attributes(source)
        } else {
            source.to_string()
        };

        if self.collapse_whitespace {
            out = collapse_breaks(&out).trim().to_string();
        }
        out
    }
}

/// Elements whose surrounding whitespace never renders
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "li", "link", "main", "meta", "nav", "ol", "p", "pre",
    "script", "section", "style", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr",
    "ul",
];

fn strip_empty_attributes(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for block in RAW_BLOCK.find_iter(source) {
        out.push_str(&strip_in_tags(&source[last..block.start()]));
        out.push_str(block.as_str());
        last = block.end();
    }
    out.push_str(&strip_in_tags(&source[last..]));
    out
}

/// Empty attributes are only removed inside start tags, never from text
fn strip_in_tags(html: &str) -> String {
    START_TAG
        .replace_all(html, |caps: &regex::Captures| {
            EMPTY_ATTRIBUTE.replace_all(&caps[0], "").into_owned()
        })
        .into_owned()
}

/// Lowercased name of the tag starting at `tag` (`<div ...>`, `</div>`, `<!-- ...`)
fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '!')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn is_block(name: &str) -> bool {
    name.starts_with('!') || BLOCK_TAGS.contains(&name)
}

fn collapse_breaks(source: &str) -> String {
    let raw: Vec<Range<usize>> = RAW_BLOCK.find_iter(source).map(|m| m.range()).collect();
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for m in BREAK_BETWEEN_TAGS.find_iter(source) {
        // Matches straddling a block edge only consume whitespace outside it
        if raw.iter().any(|r| r.start <= m.start() && m.end() <= r.end) {
            continue;
        }
        // Inline neighbours keep their separating space
        let before = source[..m.start()].rfind('<').map(|i| tag_name(&source[i..]));
        let after = tag_name(&source[m.end() - 1..]);
        if !before.is_some_and(|b| is_block(&b)) && !is_block(&after) {
            continue;
        }

        out.push_str(&source[last..m.start()]);
        out.push_str("><");
        last = m.end();
    }
    out.push_str(&source[last..]);
    out
}

impl Default for HtmlMinifier {
    fn default() -> Self {
        Self::new(&HtmlConfig::default())
    }
}

impl TextMinifier for HtmlMinifier {
    fn minify(&self, source: &str) -> Result<String, String> {
        let cleaned = self.clean(source);
        let minified = minify(cleaned.as_bytes(), &self.cfg);
        String::from_utf8(minified).map_err(|_| "minification produced invalid UTF-8".to_string())
    }
}

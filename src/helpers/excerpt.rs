//! Excerpt helper
//!
//! Derives the preview shown for a post in listing views:
//!
//! ```ignore
//! <%- excerpt(post) %>
//! ```

use serde_json::Value;

use super::HelperError;
use crate::content::Post;

/// Name the helper is registered under
pub const NAME: &str = "excerpt";

/// Get the excerpt of a post.
///
/// A non-empty precomputed excerpt is returned verbatim. Otherwise the
/// content is cut just before its second line break. Content with fewer
/// than two line breaks has no excerpt.
pub fn excerpt(post: &Post) -> Option<&str> {
    derive(post.excerpt.as_deref(), &post.content)
}

/// Core of [`excerpt`], working on borrowed fields
pub fn derive<'a>(precomputed: Option<&'a str>, content: &'a str) -> Option<&'a str> {
    if let Some(e) = precomputed.filter(|e| !e.is_empty()) {
        return Some(e);
    }

    // No tag stripping or truncation: markup passes through untouched
    let cut = content.match_indices('\n').nth(1).map(|(pos, _)| pos)?;
    Some(&content[..cut])
}

/// Template-facing form of the helper.
///
/// Takes a post object and returns a string, or the number `0` when the post
/// has no excerpt so that templates testing the result for falsiness keep
/// working.
pub fn helper(args: &[Value]) -> Result<Value, HelperError> {
    let post = args
        .first()
        .and_then(Value::as_object)
        .ok_or_else(|| HelperError::invalid(NAME, "expected a post object"))?;

    let precomputed = post.get("excerpt").and_then(Value::as_str);
    if let Some(e) = precomputed.filter(|e| !e.is_empty()) {
        return Ok(Value::String(e.to_string()));
    }

    let content = post
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| HelperError::invalid(NAME, "post has neither excerpt nor string content"))?;

    Ok(match derive(None, content) {
        Some(e) => Value::String(e.to_string()),
        None => Value::from(0),
    })
}

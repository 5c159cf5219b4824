//! Post model

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A blog post as seen by template helpers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Precomputed excerpt (front-matter or text before `<!-- more -->`)
    pub excerpt: Option<String>,

    /// Rendered HTML body
    pub content: String,

    /// Source file path (relative to the source dir)
    pub source: String,

    /// Full source file path
    #[serde(skip)]
    pub full_source: PathBuf,

    /// Whether the post is published
    pub published: bool,
}

impl Default for Post {
    fn default() -> Self {
        Self {
            title: String::new(),
            excerpt: None,
            content: String::new(),
            source: String::new(),
            full_source: PathBuf::new(),
            published: true,
        }
    }
}

impl Post {
    /// Create a post from a body, with no precomputed excerpt
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Attach a precomputed excerpt
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }
}

//! Content loader - loads posts from the source directory

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post};

/// Loads posts from `<source_dir>/_posts`
pub struct PostLoader {
    source_dir: PathBuf,
    renderer: MarkdownRenderer,
}

impl PostLoader {
    pub fn new<P: AsRef<Path>>(source_dir: P) -> Self {
        Self {
            source_dir: source_dir.as_ref().to_path_buf(),
            renderer: MarkdownRenderer::new(),
        }
    }

    /// Load every published post, sorted by source path
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.source_dir.join("_posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            match self.load_post(path) {
                Ok(post) if post.published => posts.push(post),
                Ok(post) => tracing::debug!("Skipping unpublished post {}", post.source),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        posts.sort_by(|a, b| a.source.cmp(&b.source));
        Ok(posts)
    }

    /// Load a single post from a markdown file
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let raw = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        let title = fm.title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let source = path
            .strip_prefix(&self.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let (head, full) = MarkdownRenderer::split_excerpt(body);

        // Front-matter excerpt wins over the `<!-- more -->` split
        let excerpt = fm
            .excerpt
            .or_else(|| head.map(|h| self.renderer.render(h)));

        let mut post = Post::new(title, self.renderer.render(&full));
        post.excerpt = excerpt;
        post.source = source;
        post.full_source = path.to_path_buf();
        post.published = fm.published;

        Ok(post)
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

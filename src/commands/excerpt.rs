//! Print post excerpts through the template helper

use anyhow::Result;
use serde_json::{json, Value};
use std::path::Path;

use crate::content::loader::PostLoader;
use crate::content::Post;
use crate::helpers::{excerpt, HelperRegistry};
use crate::Pipeline;

/// Print the excerpt of one post, or of every post when `path` is `None`
pub fn run(pipeline: &Pipeline, path: Option<&Path>, as_json: bool) -> Result<()> {
    let loader = PostLoader::new(&pipeline.source_dir);
    let posts = match path {
        Some(path) => {
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                pipeline.base_dir.join(path)
            };
            vec![loader.load_post(&path)?]
        }
        None => loader.load_posts()?,
    };

    if posts.is_empty() {
        tracing::warn!("No posts found under {:?}", pipeline.source_dir.join("_posts"));
        return Ok(());
    }

    let helpers = HelperRegistry::new();
    for post in &posts {
        let value = render(&helpers, post)?;
        if as_json {
            let line = json!({
                "source": post.source,
                "title": post.title,
                "excerpt": value,
            });
            println!("{}", serde_json::to_string(&line)?);
        } else {
            println!("== {} ({})", post.title, post.source);
            match value {
                Value::String(text) => println!("{}\n", text),
                _ => println!("(no excerpt)\n"),
            }
        }
    }

    Ok(())
}

/// Call the registered `excerpt` helper the way a template would
pub fn render(helpers: &HelperRegistry, post: &Post) -> Result<Value> {
    let arg = serde_json::to_value(post)?;
    Ok(helpers.call(excerpt::NAME, &[arg])?)
}

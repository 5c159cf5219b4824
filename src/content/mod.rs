//! Content module - loads posts so helpers can be previewed against real data

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::FrontMatter;
pub use markdown::{MarkdownRenderer, MORE_MARKER};
pub use post::Post;

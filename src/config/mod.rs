//! Configuration module

mod pipeline;

pub use pipeline::PipelineConfig;
pub use pipeline::{CssConfig, HtmlConfig, ImagesConfig, JsConfig, TaskConfig, WatchConfig};
pub use pipeline::CONFIG_FILES;

//! Pipeline configuration (pipeline.yml / pipeline.toml)

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names probed in the base directory, in order
pub const CONFIG_FILES: [&str; 3] = ["pipeline.yml", "pipeline.yaml", "pipeline.toml"];

/// Main pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Output directory of the site generator
    pub public_dir: String,

    /// Shell command run by the `cb` task
    pub generate: String,

    /// Shell command run by the `default` task after minification
    pub deploy: String,

    #[serde(default)]
    pub html: HtmlConfig,
    #[serde(default)]
    pub css: CssConfig,
    #[serde(default)]
    pub js: JsConfig,
    #[serde(default)]
    pub images: ImagesConfig,

    /// Extra shell tasks, keyed by task name
    #[serde(default)]
    pub tasks: IndexMap<String, TaskConfig>,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            public_dir: "public".to_string(),
            generate: "hexo clean && hexo g".to_string(),
            deploy: "hexo d".to_string(),
            html: HtmlConfig::default(),
            css: CssConfig::default(),
            js: JsConfig::default(),
            images: ImagesConfig::default(),
            tasks: IndexMap::new(),
            watch: WatchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a file, picking the format by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let config: PipelineConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)?,
            Some("yml") | Some("yaml") => serde_yaml::from_str(&content)?,
            _ => bail!("Unsupported config format: {:?}", path),
        };

        tracing::debug!("Loaded pipeline config from {:?}", path);
        Ok(config)
    }

    /// Find the first config file present in `base_dir`
    pub fn locate<P: AsRef<Path>>(base_dir: P) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| base_dir.as_ref().join(name))
            .find(|p| p.exists())
    }

    /// Render this config as YAML (used by `init`)
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// HTML minification options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Glob patterns relative to the public dir
    pub patterns: Vec<String>,
    /// Strip whitespace between tags before minifying
    pub collapse_whitespace: bool,
    pub remove_comments: bool,
    /// Drop `class=""`, `id=""` and similar empty attributes
    pub remove_empty_attributes: bool,
    pub minify_js: bool,
    pub minify_css: bool,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["**/*.html".to_string()],
            collapse_whitespace: true,
            remove_comments: true,
            remove_empty_attributes: true,
            minify_js: true,
            minify_css: true,
        }
    }
}

/// CSS minification options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssConfig {
    pub patterns: Vec<String>,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["**/*.css".to_string()],
        }
    }
}

/// JavaScript minification options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsConfig {
    pub patterns: Vec<String>,
    /// Rename local bindings
    pub mangle: bool,
}

impl Default for JsConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["**/*.js".to_string()],
            mangle: true,
        }
    }
}

/// Image optimization options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Source directory, relative to the public dir
    pub source: String,
    /// Destination directory, relative to the public dir
    pub dest: String,
    /// PNG effort, 0 (fastest) to 7 (smallest)
    pub optimization_level: u8,
    /// Re-encode JPEGs at this quality; left untouched when unset
    pub jpeg_quality: Option<u8>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            source: "css/images".to_string(),
            dest: "uploads".to_string(),
            optimization_level: 5,
            jpeg_quality: None,
        }
    }
}

impl ImagesConfig {
    /// Optimization level clamped to the supported range
    pub fn level(&self) -> u8 {
        self.optimization_level.min(7)
    }
}

/// A user-declared shell task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub deps: Vec<String>,
    pub run: Option<String>,
}

/// Watch mode options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Paths relative to the base dir
    pub paths: Vec<String>,
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                "source".to_string(),
                "themes".to_string(),
                "_config.yml".to_string(),
            ],
            debounce_ms: 500,
        }
    }
}

//! hexo-pipeline: build, minify and deploy a Hexo site
//!
//! This crate runs the post-generation pipeline of a Hexo blog as a graph of
//! named tasks (generate, minify HTML/CSS/JS/images, deploy) and provides the
//! `excerpt` template helper.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod minify;
pub mod shell;
pub mod tasks;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use config::PipelineConfig;
use tasks::{RunSummary, TaskError, TaskRegistry};

/// A site and the pipeline configured for it
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline configuration
    pub config: PipelineConfig,
    /// Where the config was loaded from, if anywhere
    pub config_path: Option<PathBuf>,
    /// Base directory of the Hexo site
    pub base_dir: PathBuf,
    /// Markdown sources
    pub source_dir: PathBuf,
    /// Generated output
    pub public_dir: PathBuf,
    /// Built-in and configured tasks
    pub registry: TaskRegistry,
}

impl Pipeline {
    /// Open the site in `base_dir`, using its pipeline config if one exists
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        match PipelineConfig::locate(base_dir) {
            Some(path) => Self::with_config_file(base_dir, path),
            None => Ok(Self::with_config(base_dir, PipelineConfig::default())),
        }
    }

    /// Open the site in `base_dir` with an explicit config file
    pub fn with_config_file<P: AsRef<Path>, C: AsRef<Path>>(base_dir: P, config_path: C) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = if config_path.as_ref().is_absolute() {
            config_path.as_ref().to_path_buf()
        } else {
            base_dir.join(config_path)
        };

        let config = PipelineConfig::load(&config_path)?;
        let mut pipeline = Self::with_config(base_dir, config);
        pipeline.config_path = Some(config_path);
        Ok(pipeline)
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: PipelineConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let source_dir = base_dir.join("source");
        let registry = TaskRegistry::from_config(&config);

        Self {
            config,
            config_path: None,
            base_dir,
            source_dir,
            public_dir,
            registry,
        }
    }

    /// Run the named tasks and everything they depend on
    pub async fn run<S: AsRef<str>>(&self, tasks: &[S]) -> Result<RunSummary, TaskError> {
        tasks::runner::run(self, tasks).await
    }

    /// The waves `run` would execute, without executing them
    pub fn plan<S: AsRef<str>>(&self, tasks: &[S]) -> Result<Vec<Vec<String>>, TaskError> {
        tasks::runner::plan(self, tasks)
    }

    /// Delete the public directory; returns whether anything was removed
    pub fn clean(&self) -> Result<bool> {
        if !self.public_dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.public_dir)?;
        tracing::info!("Deleted: {:?}", self.public_dir);
        Ok(true)
    }
}

//! Minification of generated assets
//!
//! Each submodule wraps a third-party minifier; this module owns file
//! discovery, parallel rewriting and the byte accounting shared by all of
//! them.

pub mod css;
pub mod html;
pub mod images;
pub mod js;

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use css::CssMinifier;
pub use html::HtmlMinifier;
pub use images::ImageOptimizer;
pub use js::JsMinifier;

use crate::config::PipelineConfig;

/// Errors from a minification pass
#[derive(Debug, Error)]
pub enum MinifyError {
    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to minify {path:?}: {message}")]
    Transform { path: PathBuf, message: String },
}

impl MinifyError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The built-in minification passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifyKind {
    Html,
    Css,
    Js,
    Images,
}

impl MinifyKind {
    /// Run this pass over `public_dir`
    pub fn run(self, public_dir: &Path, config: &PipelineConfig) -> Result<MinifyReport, MinifyError> {
        match self {
            MinifyKind::Html => minify_files(
                public_dir,
                &config.html.patterns,
                &HtmlMinifier::new(&config.html),
            ),
            MinifyKind::Css => minify_files(public_dir, &config.css.patterns, &CssMinifier),
            MinifyKind::Js => minify_files(
                public_dir,
                &config.js.patterns,
                &JsMinifier::new(&config.js),
            ),
            MinifyKind::Images => ImageOptimizer::new(&config.images).run(
                &public_dir.join(&config.images.source),
                &public_dir.join(&config.images.dest),
            ),
        }
    }
}

/// A minifier over text assets
pub trait TextMinifier: Sync {
    /// Minify one file's contents
    fn minify(&self, source: &str) -> Result<String, String>;
}

/// Size accounting for one minification pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinifyReport {
    pub files: usize,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl MinifyReport {
    pub fn file(bytes_in: usize, bytes_out: usize) -> Self {
        Self {
            files: 1,
            bytes_in: bytes_in as u64,
            bytes_out: bytes_out as u64,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            files: self.files + other.files,
            bytes_in: self.bytes_in + other.bytes_in,
            bytes_out: self.bytes_out + other.bytes_out,
        }
    }

    /// Bytes removed (zero if output grew)
    pub fn saved(&self) -> u64 {
        self.bytes_in.saturating_sub(self.bytes_out)
    }

    /// Saved bytes as a percentage of the input
    pub fn saved_percent(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.saved() as f64 * 100.0 / self.bytes_in as f64
        }
    }
}

impl fmt::Display for MinifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} -> {} bytes (saved {:.1}%)",
            self.files,
            self.bytes_in,
            self.bytes_out,
            self.saved_percent()
        )
    }
}

/// Collect files under `root` matching any of `patterns`, sorted and deduplicated
pub fn collect_files(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, MinifyError> {
    let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let full = format!("{}/{}", escaped_root, pattern.trim_start_matches('/'));
        let entries = glob::glob(&full).map_err(|source| MinifyError::Pattern {
            pattern: pattern.clone(),
            source,
        })?;

        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                MinifyError::io(&path, e.into_error())
            })?;
            if path.is_file() {
                files.insert(path);
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Minify every matching file under `root` in place
pub fn minify_files<M: TextMinifier>(
    root: &Path,
    patterns: &[String],
    minifier: &M,
) -> Result<MinifyReport, MinifyError> {
    let files = collect_files(root, patterns)?;
    tracing::debug!("Minifying {} files under {:?}", files.len(), root);

    files
        .par_iter()
        .map(|path| minify_file(path, minifier))
        .try_reduce(MinifyReport::default, |a, b| Ok(a.merge(b)))
}

fn minify_file<M: TextMinifier>(path: &Path, minifier: &M) -> Result<MinifyReport, MinifyError> {
    let source = fs::read_to_string(path).map_err(|e| MinifyError::io(path, e))?;

    let output = minifier
        .minify(&source)
        .map_err(|message| MinifyError::Transform {
            path: path.to_path_buf(),
            message,
        })?;

    if output != source {
        fs::write(path, &output).map_err(|e| MinifyError::io(path, e))?;
    }

    tracing::debug!("{:?}: {} -> {} bytes", path, source.len(), output.len());
    Ok(MinifyReport::file(source.len(), output.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Trim;

    impl TextMinifier for Trim {
        fn minify(&self, source: &str) -> Result<String, String> {
            if source.contains("bad") {
                return Err("bad input".to_string());
            }
            Ok(source.split_whitespace().collect())
        }
    }

    fn write(root: &Path, name: &str, content: &str) {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_files_recursive_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.css", "");
        write(dir.path(), "nested/deep/b.css", "");
        write(dir.path(), "c.js", "");

        let patterns = vec!["**/*.css".to_string(), "nested/**/*.css".to_string()];
        let files = collect_files(dir.path(), &patterns).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("a.css"),
                dir.path().join("nested/deep/b.css")
            ]
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let err = collect_files(dir.path(), &["[".to_string()]).unwrap_err();
        assert!(matches!(err, MinifyError::Pattern { .. }));
    }

    #[test]
    fn test_minify_files_rewrites_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "one.txt", "a b c");
        write(dir.path(), "sub/two.txt", "d  e");

        let report = minify_files(dir.path(), &["**/*.txt".to_string()], &Trim).unwrap();
        assert_eq!(report, MinifyReport { files: 2, bytes_in: 9, bytes_out: 5 });
        assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "abc");
        assert_eq!(fs::read_to_string(dir.path().join("sub/two.txt")).unwrap(), "de");
    }

    #[test]
    fn test_failure_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.txt", "bad");

        let err = minify_files(dir.path(), &["*.txt".to_string()], &Trim).unwrap_err();
        match err {
            MinifyError::Transform { path, message } => {
                assert!(path.ends_with("bad.txt"));
                assert_eq!(message, "bad input");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_report_percent() {
        let report = MinifyReport::file(200, 150).merge(MinifyReport::file(0, 0));
        assert_eq!(report.files, 2);
        assert_eq!(report.saved(), 50);
        assert!((report.saved_percent() - 25.0).abs() < f64::EPSILON);
        assert_eq!(MinifyReport::default().saved_percent(), 0.0);
    }

    #[test]
    fn test_kind_dispatch_uses_config_patterns() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "keep/a.css", "a { color: #ff0000; }");
        write(dir.path(), "skip/b.css", "b { color: #ff0000; }");

        let mut config = PipelineConfig::default();
        config.css.patterns = vec!["keep/*.css".to_string()];

        let report = MinifyKind::Css.run(dir.path(), &config).unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(fs::read_to_string(dir.path().join("keep/a.css")).unwrap(), "a{color:red}");
        assert_eq!(
            fs::read_to_string(dir.path().join("skip/b.css")).unwrap(),
            "b { color: #ff0000; }"
        );
    }
}

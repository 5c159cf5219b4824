//! Write a default pipeline config

use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{PipelineConfig, CONFIG_FILES};

const HEADER: &str = "# hexo-pipeline configuration
## Every key is optional; missing keys fall back to the values below.
## Extra tasks go under `tasks:` as `name: { deps: [...], run: \"command\" }`.

";

/// Write `pipeline.yml` with the default settings into `target_dir`
pub fn init_config(target_dir: &Path) -> Result<PathBuf> {
    if let Some(existing) = PipelineConfig::locate(target_dir) {
        bail!("Config already exists: {:?}", existing);
    }

    fs::create_dir_all(target_dir)?;
    let path = target_dir.join(CONFIG_FILES[0]);
    let body = PipelineConfig::default().to_yaml()?;
    fs::write(&path, format!("{}{}", HEADER, body))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_config(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("pipeline.yml"));

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.public_dir, "public");
        assert_eq!(config.images.dest, "uploads");

        // A second init refuses to overwrite
        assert!(init_config(dir.path()).is_err());
    }
}

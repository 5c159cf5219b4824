//! Clean the public directory

use anyhow::Result;

use crate::Pipeline;

/// Delete the generated site, leaving sources alone
pub fn run(pipeline: &Pipeline) -> Result<()> {
    if !pipeline.clean()? {
        tracing::info!("Nothing to clean at {:?}", pipeline.public_dir);
    }
    Ok(())
}

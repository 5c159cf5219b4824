//! Shell command execution for generator and deploy tasks

use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Errors from running a shell command
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {code:?}")]
    Failed { command: String, code: Option<i32> },
}

/// Run a command line through the platform shell in `cwd`.
///
/// Stdio is inherited so generator and deploy output reaches the console.
/// Dropping the returned future kills the child.
pub async fn run(command: &str, cwd: &Path) -> Result<(), ShellError> {
    tracing::info!("$ {}", command);

    let status = shell_command(command)
        .current_dir(cwd)
        .kill_on_drop(true)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| ShellError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(ShellError::Failed {
            command: command.to_string(),
            code: status.code(),
        })
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

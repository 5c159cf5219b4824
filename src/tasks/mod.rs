//! Task orchestration
//!
//! Tasks are declared in a [`TaskRegistry`], resolved into a [`TaskGraph`]
//! for the requested names, and executed wave by wave by the [`runner`].

pub mod graph;
pub mod registry;
pub mod runner;

use thiserror::Error;

use crate::minify::MinifyError;
use crate::shell::ShellError;

pub use graph::TaskGraph;
pub use registry::{Task, TaskAction, TaskRegistry};
pub use runner::{RunSummary, TaskOutcome};

/// Errors from resolving or running tasks
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("task {task} depends on unknown task {dep}")]
    UnknownDependency { task: String, dep: String },

    #[error("dependency cycle involving task {0}")]
    Cycle(String),

    #[error("task {task} failed: {source}")]
    Failed {
        task: String,
        #[source]
        source: ActionError,
    },
}

/// Errors raised by a single task's action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error(transparent)]
    Minify(#[from] MinifyError),

    #[error("task aborted: {0}")]
    Aborted(String),
}

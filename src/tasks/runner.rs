//! Wave-by-wave task execution

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;

use super::{ActionError, TaskAction, TaskError, TaskGraph};
use crate::minify::MinifyReport;
use crate::shell;
use crate::Pipeline;

/// Result of one finished task
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub name: String,
    pub elapsed: Duration,
    /// Present for minification tasks
    pub report: Option<MinifyReport>,
}

/// Everything that ran, in completion order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub outcomes: Vec<TaskOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn ran(&self, name: &str) -> bool {
        self.outcomes.iter().any(|o| o.name == name)
    }

    /// Byte accounting across all minification tasks
    pub fn minified(&self) -> MinifyReport {
        self.outcomes
            .iter()
            .filter_map(|o| o.report)
            .fold(MinifyReport::default(), MinifyReport::merge)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tasks in {:.2}s",
            self.outcomes.len(),
            self.elapsed.as_secs_f64()
        )?;
        let minified = self.minified();
        if minified.files > 0 {
            write!(f, ", minified {}", minified)?;
        }
        Ok(())
    }
}

/// Resolve `requested` and return the waves that would run
pub fn plan<S: AsRef<str>>(
    pipeline: &Pipeline,
    requested: &[S],
) -> Result<Vec<Vec<String>>, TaskError> {
    Ok(TaskGraph::resolve(&pipeline.registry, requested)?.waves())
}

/// Run `requested` and their dependencies.
///
/// Tasks of one wave run concurrently. The first failure aborts the rest of
/// its wave and no later wave starts.
pub async fn run<S: AsRef<str>>(
    pipeline: &Pipeline,
    requested: &[S],
) -> Result<RunSummary, TaskError> {
    let start = Instant::now();
    let waves = plan(pipeline, requested)?;
    let shared = Arc::new(pipeline.clone());
    let mut outcomes = Vec::new();

    for (i, wave) in waves.into_iter().enumerate() {
        tracing::debug!("Wave {}: {}", i + 1, wave.join(", "));
        let mut set = JoinSet::new();

        for name in &wave {
            let task = shared
                .registry
                .get(name)
                .cloned()
                .ok_or_else(|| TaskError::UnknownTask(name.clone()))?;
            let pipeline = Arc::clone(&shared);

            set.spawn(async move {
                let started = Instant::now();
                tracing::info!("Starting '{}'...", task.name);
                let result = execute(pipeline, task.action).await;
                (task.name, started.elapsed(), result)
            });
        }

        while let Some(joined) = set.join_next().await {
            let (name, elapsed, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    set.abort_all();
                    return Err(TaskError::Failed {
                        task: wave.join(", "),
                        source: ActionError::Aborted(e.to_string()),
                    });
                }
            };

            match result {
                Ok(report) => {
                    tracing::info!(
                        "Finished '{}' after {:.2}s",
                        name,
                        elapsed.as_secs_f64()
                    );
                    if let Some(report) = &report {
                        tracing::info!("'{}': {}", name, report);
                    }
                    outcomes.push(TaskOutcome {
                        name,
                        elapsed,
                        report,
                    });
                }
                Err(source) => {
                    tracing::error!("'{}' errored after {:.2}s", name, elapsed.as_secs_f64());
                    set.abort_all();
                    return Err(TaskError::Failed { task: name, source });
                }
            }
        }
    }

    Ok(RunSummary {
        outcomes,
        elapsed: start.elapsed(),
    })
}

async fn execute(
    pipeline: Arc<Pipeline>,
    action: TaskAction,
) -> Result<Option<MinifyReport>, ActionError> {
    match action {
        TaskAction::None => Ok(None),
        TaskAction::Shell(command) => {
            shell::run(&command, &pipeline.base_dir).await?;
            Ok(None)
        }
        TaskAction::Minify(kind) => {
            let report = tokio::task::spawn_blocking(move || {
                kind.run(&pipeline.public_dir, &pipeline.config)
            })
            .await
            .map_err(|e| ActionError::Aborted(e.to_string()))??;
            Ok(Some(report))
        }
    }
}

//! Run pipeline tasks

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::tasks::TaskGraph;
use crate::Pipeline;

/// Run the given tasks once
pub async fn run(pipeline: &Pipeline, tasks: &[String], dry_run: bool) -> Result<()> {
    if dry_run {
        print_plan(pipeline, tasks)?;
        return Ok(());
    }

    tracing::info!("Running: {}", tasks.join(", "));
    let summary = pipeline.run(tasks).await?;
    tracing::info!("Done: {}", summary);

    Ok(())
}

/// Print the waves that would run
pub fn print_plan(pipeline: &Pipeline, tasks: &[String]) -> Result<()> {
    let graph = TaskGraph::resolve(&pipeline.registry, tasks)?;
    let waves = graph.waves();

    println!(
        "Plan for {} ({} tasks in {} waves):",
        tasks.join(", "),
        graph.len(),
        waves.len()
    );
    for (i, wave) in waves.iter().enumerate() {
        println!("  {}. {}", i + 1, wave.join(", "));
        for name in wave {
            if let Some(task) = pipeline.registry.get(name) {
                let deps = graph.dependencies(name);
                if deps.is_empty() {
                    println!("       {:<16} {}", name, task.action);
                } else {
                    println!("       {:<16} {} <- [{}]", name, task.action, deps.join(", "));
                }
            }
        }
    }

    Ok(())
}

/// Run the given tasks, then again whenever a watched path changes
pub async fn watch(pipeline: &Pipeline, tasks: &[String]) -> Result<()> {
    // Bad task names fail up front, later build failures are only logged
    pipeline.plan(tasks)?;
    run_logged(pipeline, tasks).await;

    let (tx, mut rx) = mpsc::unbounded_channel::<DebounceEventResult>();
    let debounce = Duration::from_millis(pipeline.config.watch.debounce_ms);
    let mut debouncer = new_debouncer(debounce, move |res| {
        let _ = tx.send(res);
    })?;

    let mut watched = 0;
    for rel in &pipeline.config.watch.paths {
        let path = pipeline.base_dir.join(rel);
        if !path.exists() {
            tracing::debug!("Not watching missing path {:?}", path);
            continue;
        }
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(&path, mode)?;
        tracing::debug!("Watching: {:?}", path);
        watched += 1;
    }

    if watched == 0 {
        anyhow::bail!(
            "None of the watch paths exist: {}",
            pipeline.config.watch.paths.join(", ")
        );
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    while let Some(res) = rx.recv().await {
        match res {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .map(|e| e.path.as_path())
                    .filter(|p| is_relevant(p))
                    .collect();

                if changed.is_empty() {
                    continue;
                }
                for path in &changed {
                    tracing::info!("File changed: {}", path.display());
                }

                run_logged(pipeline, tasks).await;
            }
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
            }
        }
    }

    Ok(())
}

async fn run_logged(pipeline: &Pipeline, tasks: &[String]) {
    match pipeline.run(tasks).await {
        Ok(summary) => tracing::info!("Done: {}", summary),
        Err(e) => tracing::error!("Run failed: {:#}", anyhow::Error::from(e)),
    }
}

/// Editor droppings and VCS internals do not trigger a rebuild
fn is_relevant(path: &Path) -> bool {
    let ignored_dir = path
        .components()
        .any(|c| matches!(c.as_os_str().to_str(), Some(".git" | "node_modules")));
    if ignored_dir {
        return false;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    name != ".DS_Store" && !name.ends_with('~') && !name.ends_with(".swp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[test]
    fn test_is_relevant() {
        assert!(is_relevant(Path::new("source/_posts/hello.md")));
        assert!(is_relevant(Path::new("_config.yml")));
        assert!(!is_relevant(Path::new("source/.git/index")));
        assert!(!is_relevant(Path::new("source/_posts/hello.md~")));
        assert!(!is_relevant(Path::new("source/_posts/.hello.md.swp")));
        assert!(!is_relevant(Path::new("themes/next/node_modules/x.js")));
        assert!(!is_relevant(Path::new("source/images/.DS_Store")));
    }

    #[test]
    fn test_git_lookalikes_are_relevant() {
        assert!(is_relevant(Path::new(".github/workflows/deploy.yml")));
        assert!(is_relevant(Path::new("source/.gitkeep")));
        assert!(is_relevant(Path::new(".gitignore")));
        assert!(is_relevant(Path::new("source/_posts/my.github.io.md")));
    }

    #[tokio::test]
    async fn test_dry_run_executes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            generate: "touch generated.txt".to_string(),
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::with_config(dir.path(), config);

        run(&pipeline, &["default".to_string()], true).await.unwrap();
        assert!(!dir.path().join("generated.txt").exists());
    }

    #[tokio::test]
    async fn test_watch_rejects_unknown_task() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = Pipeline::with_config(dir.path(), PipelineConfig::default());
        assert!(watch(&pipeline, &["nope".to_string()]).await.is_err());
    }
}

//! List pipeline tasks

use anyhow::Result;

use crate::Pipeline;

/// Print every task with its dependencies and action
pub fn run(pipeline: &Pipeline) -> Result<()> {
    println!("Tasks ({}):", pipeline.registry.len());
    for line in lines(pipeline) {
        println!("  {}", line);
    }
    Ok(())
}

fn lines(pipeline: &Pipeline) -> Vec<String> {
    let width = pipeline
        .registry
        .iter()
        .map(|t| t.name.len())
        .max()
        .unwrap_or(0);

    pipeline
        .registry
        .iter()
        .map(|task| {
            let deps = if task.deps.is_empty() {
                String::new()
            } else {
                format!(" <- [{}]", task.deps.join(", "))
            };
            format!("{:<width$}  {}{}", task.name, task.action, deps, width = width)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineConfig, TaskConfig};

    #[test]
    fn test_lines_in_declaration_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.tasks.insert(
            "lint".to_string(),
            TaskConfig {
                deps: vec![],
                run: Some("npm run lint".to_string()),
            },
        );
        let pipeline = Pipeline::with_config(dir.path(), config);

        let lines = lines(&pipeline);
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("cb "));
        assert!(lines[0].ends_with("$ hexo clean && hexo g"));
        assert!(lines[5].starts_with("mini "));
        assert!(lines[5].contains("<- [minify-html, minify-css, minify-js, minify-images]"));
        assert!(lines[7].starts_with("lint "));
        assert!(lines[7].ends_with("$ npm run lint"));
    }
}

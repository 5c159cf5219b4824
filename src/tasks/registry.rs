//! Task declarations

use indexmap::IndexMap;
use std::fmt;

use crate::config::PipelineConfig;
use crate::minify::MinifyKind;

/// What a task does once its dependencies are done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    /// Aggregate task, only pulls in its dependencies
    None,
    /// Run a command line through the shell
    Shell(String),
    /// Run a minification pass over the public dir
    Minify(MinifyKind),
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskAction::None => write!(f, "-"),
            TaskAction::Shell(cmd) => write!(f, "$ {}", cmd),
            TaskAction::Minify(kind) => write!(f, "minify {:?}", kind),
        }
    }
}

/// A named build step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub deps: Vec<String>,
    pub action: TaskAction,
}

impl Task {
    pub fn new(name: &str, deps: &[&str], action: TaskAction) -> Self {
        Self {
            name: name.to_string(),
            deps: deps.iter().map(|d| d.to_string()).collect(),
            action,
        }
    }
}

/// Named tasks in declaration order
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<String, Task>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock pipeline: generate, minify everything, deploy
    pub fn builtin(config: &PipelineConfig) -> Self {
        let mut registry = Self::new();
        let minifiers = ["minify-html", "minify-css", "minify-js", "minify-images"];

        registry.register(Task::new("cb", &[], TaskAction::Shell(config.generate.clone())));
        registry.register(Task::new("minify-html", &["cb"], TaskAction::Minify(MinifyKind::Html)));
        registry.register(Task::new("minify-css", &["cb"], TaskAction::Minify(MinifyKind::Css)));
        registry.register(Task::new("minify-js", &["cb"], TaskAction::Minify(MinifyKind::Js)));
        registry.register(Task::new(
            "minify-images",
            &["cb"],
            TaskAction::Minify(MinifyKind::Images),
        ));
        registry.register(Task::new("mini", &minifiers, TaskAction::None));

        let mut default_deps = vec!["cb"];
        default_deps.extend(minifiers);
        registry.register(Task::new(
            "default",
            &default_deps,
            TaskAction::Shell(config.deploy.clone()),
        ));

        registry
    }

    /// Built-in tasks plus those declared in the config's `tasks` section
    pub fn from_config(config: &PipelineConfig) -> Self {
        let mut registry = Self::builtin(config);

        for (name, declared) in &config.tasks {
            let action = match &declared.run {
                Some(cmd) => TaskAction::Shell(cmd.clone()),
                None => TaskAction::None,
            };
            registry.register(Task {
                name: name.clone(),
                deps: declared.deps.clone(),
                action,
            });
        }

        registry
    }

    /// Register a task, replacing any task with the same name in place
    pub fn register(&mut self, task: Task) {
        if let Some(old) = self.tasks.get_mut(&task.name) {
            tracing::debug!("Overriding task {}", task.name);
            *old = task;
        } else {
            self.tasks.insert(task.name.clone(), task);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Declaration position, used to order tasks that could run together
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tasks.get_index_of(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskConfig;

    #[test]
    fn test_builtin_tasks() {
        let registry = TaskRegistry::builtin(&PipelineConfig::default());
        let names: Vec<_> = registry.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["cb", "minify-html", "minify-css", "minify-js", "minify-images", "mini", "default"]
        );

        let cb = registry.get("cb").unwrap();
        assert_eq!(cb.action, TaskAction::Shell("hexo clean && hexo g".to_string()));
        assert!(cb.deps.is_empty());

        let default = registry.get("default").unwrap();
        assert_eq!(default.action, TaskAction::Shell("hexo d".to_string()));
        assert_eq!(
            default.deps,
            vec!["cb", "minify-html", "minify-css", "minify-js", "minify-images"]
        );

        let mini = registry.get("mini").unwrap();
        assert_eq!(mini.action, TaskAction::None);
        assert_eq!(mini.deps.len(), 4);
    }

    #[test]
    fn test_config_tasks_extend_and_override() {
        let mut config = PipelineConfig::default();
        config.tasks.insert(
            "cb".to_string(),
            TaskConfig {
                deps: vec![],
                run: Some("hexo g".to_string()),
            },
        );
        config.tasks.insert(
            "publish".to_string(),
            TaskConfig {
                deps: vec!["default".to_string()],
                run: None,
            },
        );

        let registry = TaskRegistry::from_config(&config);
        assert_eq!(registry.len(), 8);
        assert_eq!(registry.position("cb"), Some(0));
        assert_eq!(
            registry.get("cb").unwrap().action,
            TaskAction::Shell("hexo g".to_string())
        );
        assert_eq!(registry.position("publish"), Some(7));
        assert_eq!(registry.get("publish").unwrap().action, TaskAction::None);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(TaskAction::Shell("hexo d".into()).to_string(), "$ hexo d");
        assert_eq!(TaskAction::Minify(MinifyKind::Css).to_string(), "minify Css");
        assert_eq!(TaskAction::None.to_string(), "-");
    }
}

//! Dependency graph for a task run.
//!
//! Resolving a set of requested task names pulls in their transitive
//! dependencies and builds a DAG with edges from each dependency to its
//! dependent. The graph is then split into waves: every task in a wave has
//! all of its dependencies in earlier waves, so a wave can run concurrently.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::{TaskError, TaskRegistry};

#[derive(Debug, Clone)]
struct Node {
    name: String,
    /// Declaration order in the registry
    rank: usize,
}

/// The tasks needed for one run, with their dependency edges
#[derive(Debug)]
pub struct TaskGraph {
    graph: DiGraph<Node, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl TaskGraph {
    /// Build the graph for `requested` and everything it depends on
    pub fn resolve<S: AsRef<str>>(
        registry: &TaskRegistry,
        requested: &[S],
    ) -> Result<Self, TaskError> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
        let mut pending: Vec<String> = Vec::new();

        for name in requested {
            let name = name.as_ref();
            if registry.get(name).is_none() {
                return Err(TaskError::UnknownTask(name.to_string()));
            }
            pending.push(name.to_string());
        }

        // First pass: collect the closure as nodes
        while let Some(name) = pending.pop() {
            if nodes.contains_key(&name) {
                continue;
            }
            let task = registry
                .get(&name)
                .ok_or_else(|| TaskError::UnknownTask(name.clone()))?;
            let rank = registry.position(&name).unwrap_or(usize::MAX);

            let idx = graph.add_node(Node {
                name: name.clone(),
                rank,
            });
            nodes.insert(name.clone(), idx);

            for dep in &task.deps {
                if registry.get(dep).is_none() {
                    return Err(TaskError::UnknownDependency {
                        task: name.clone(),
                        dep: dep.clone(),
                    });
                }
                pending.push(dep.clone());
            }
        }

        // Second pass: edges from dependency to dependent
        for (name, &idx) in &nodes {
            if let Some(task) = registry.get(name) {
                for dep in &task.deps {
                    graph.update_edge(nodes[dep], idx, ());
                }
            }
        }

        toposort(&graph, None)
            .map_err(|cycle| TaskError::Cycle(graph[cycle.node_id()].name.clone()))?;

        Ok(Self { graph, nodes })
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of a task within this graph
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(name) else {
            return Vec::new();
        };
        let mut deps: Vec<&Node> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|i| &self.graph[i])
            .collect();
        deps.sort_by_key(|n| n.rank);
        deps.into_iter().map(|n| n.name.as_str()).collect()
    }

    /// Tasks grouped into waves that can each run concurrently.
    ///
    /// Within a wave, tasks keep registry declaration order.
    pub fn waves(&self) -> Vec<Vec<String>> {
        let mut in_degree: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| {
                let deps = self.graph.neighbors_directed(idx, Direction::Incoming).count();
                (idx, deps)
            })
            .collect();

        let mut ready: Vec<NodeIndex> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&idx, _)| idx)
            .collect();
        let mut waves = Vec::new();

        while !ready.is_empty() {
            ready.sort_by_key(|&idx| (self.graph[idx].rank, self.graph[idx].name.clone()));

            let mut next = Vec::new();
            for &idx in &ready {
                for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                    if let Some(deg) = in_degree.get_mut(&dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            next.push(dependent);
                        }
                    }
                }
            }

            waves.push(
                ready
                    .iter()
                    .map(|&idx| self.graph[idx].name.clone())
                    .collect(),
            );
            ready = next;
        }

        waves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::tasks::{Task, TaskAction};

    fn builtin() -> TaskRegistry {
        TaskRegistry::builtin(&PipelineConfig::default())
    }

    #[test]
    fn test_default_pipeline_waves() {
        let graph = TaskGraph::resolve(&builtin(), &["default"]).unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(
            graph.waves(),
            vec![
                vec!["cb".to_string()],
                vec![
                    "minify-html".to_string(),
                    "minify-css".to_string(),
                    "minify-js".to_string(),
                    "minify-images".to_string()
                ],
                vec!["default".to_string()],
            ]
        );
    }

    #[test]
    fn test_single_minifier_pulls_in_generate() {
        let graph = TaskGraph::resolve(&builtin(), &["minify-css"]).unwrap();
        assert_eq!(graph.waves().concat(), vec!["cb", "minify-css"]);
        assert_eq!(graph.dependencies("minify-css"), vec!["cb"]);
    }

    #[test]
    fn test_mini_and_default_share_nodes() {
        let graph = TaskGraph::resolve(&builtin(), &["mini", "default"]).unwrap();
        assert_eq!(graph.len(), 7);
        let waves = graph.waves();
        assert_eq!(waves.len(), 3);
        assert_eq!(waves[2], vec!["mini", "default"]);
    }

    #[test]
    fn test_diamond_runs_shared_dependency_once() {
        let mut registry = TaskRegistry::new();
        registry.register(Task::new("base", &[], TaskAction::None));
        registry.register(Task::new("left", &["base"], TaskAction::None));
        registry.register(Task::new("right", &["base"], TaskAction::None));
        registry.register(Task::new("top", &["right", "left", "base"], TaskAction::None));

        let graph = TaskGraph::resolve(&registry, &["top"]).unwrap();
        assert_eq!(graph.waves().concat(), vec!["base", "left", "right", "top"]);
        assert_eq!(graph.dependencies("top"), vec!["base", "left", "right"]);
    }

    #[test]
    fn test_unknown_task() {
        let err = TaskGraph::resolve(&builtin(), &["deploy"]).unwrap_err();
        assert!(matches!(err, TaskError::UnknownTask(name) if name == "deploy"));
    }

    #[test]
    fn test_unknown_dependency() {
        let mut registry = builtin();
        registry.register(Task::new("publish", &["upload"], TaskAction::None));

        let err = TaskGraph::resolve(&registry, &["publish"]).unwrap_err();
        assert!(matches!(
            err,
            TaskError::UnknownDependency { ref task, ref dep } if task == "publish" && dep == "upload"
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let mut registry = TaskRegistry::new();
        registry.register(Task::new("a", &["b"], TaskAction::None));
        registry.register(Task::new("b", &["c"], TaskAction::None));
        registry.register(Task::new("c", &["a"], TaskAction::None));

        let err = TaskGraph::resolve(&registry, &["a"]).unwrap_err();
        assert!(matches!(err, TaskError::Cycle(_)));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let mut registry = TaskRegistry::new();
        registry.register(Task::new("loop", &["loop"], TaskAction::None));
        assert!(matches!(
            TaskGraph::resolve(&registry, &["loop"]),
            Err(TaskError::Cycle(name)) if name == "loop"
        ));
    }

    #[test]
    fn test_empty_request() {
        let graph = TaskGraph::resolve::<&str>(&builtin(), &[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.waves().is_empty());
    }
}

use std::collections::{HashMap, HashSet};

use crate::dependency::DependencyError;

/// Directed graph of `consumer -> provider` edges.
///
/// Nodes keep their insertion order, which makes the topological sort
/// deterministic: nodes with no dependencies come out in the order they were
/// added.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Label used in cycle errors (partition or unit name)
    scope: String,
    /// Nodes in insertion order
    nodes: Vec<String>,
    /// Membership index for `nodes`
    index: HashSet<String>,
    /// Edges in the graph (node -> nodes it depends on), in insertion order
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Create a new dependency graph
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            ..Self::default()
        }
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: &str) {
        if self.index.insert(node.to_string()) {
            self.nodes.push(node.to_string());
        }
    }

    /// Add an edge `consumer -> provider`.
    ///
    /// Edges to nodes outside the graph are ignored at sort time, so callers
    /// may add every declared edge and only the in-scope ones take effect.
    pub fn add_edge(&mut self, consumer: &str, provider: &str) {
        let deps = self.edges.entry(consumer.to_string()).or_default();
        if !deps.iter().any(|d| d == provider) {
            deps.push(provider.to_string());
        }
    }

    /// Check if the graph contains a node
    pub fn contains(&self, node: &str) -> bool {
        self.index.contains(node)
    }

    /// In-scope dependencies of a node, in insertion order
    pub fn dependencies_of(&self, node: &str) -> Vec<String> {
        self.edges
            .get(node)
            .map(|deps| deps.iter().filter(|d| self.contains(d)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Providers before consumers.
    pub fn topological_sort(&self) -> Result<Vec<String>, DependencyError> {
        let mut result = Vec::with_capacity(self.nodes.len());
        let mut visited = HashSet::new();
        let mut visiting: Vec<String> = Vec::new();

        for node in &self.nodes {
            self.visit(node, &mut visited, &mut visiting, &mut result)?;
        }
        Ok(result)
    }

    fn visit(
        &self,
        node: &str,
        visited: &mut HashSet<String>,
        visiting: &mut Vec<String>,
        result: &mut Vec<String>,
    ) -> Result<(), DependencyError> {
        if visited.contains(node) {
            return Ok(());
        }
        if let Some(position) = visiting.iter().position(|n| n == node) {
            let mut members: Vec<String> = visiting[position..].to_vec();
            members.push(node.to_string());
            return Err(DependencyError::CyclicDependency {
                scope: self.scope.clone(),
                members,
            });
        }

        visiting.push(node.to_string());
        for dep in self.dependencies_of(node) {
            self.visit(&dep, visited, visiting, result)?;
        }
        visiting.pop();

        visited.insert(node.to_string());
        result.push(node.to_string());
        Ok(())
    }

    /// Check if the graph contains cycles
    pub fn has_cycles(&self) -> bool {
        self.topological_sort().is_err()
    }
}

//! # Tessera Dependency Resolver
//!
//! Computes the activation order of components inside a partition, and of
//! sibling partitions, from their declared wiring.
//!
//! Startup order puts providers before consumers; shutdown order is the
//! exact reverse. Cycles are reported with the members of the offending path.
pub mod graph;

use thiserror::Error;

use crate::assembly::profile::{ComponentProfile, PartitionProfile};

pub use graph::DependencyGraph;

/// Errors raised while ordering a dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// The path in `members` starts and ends with the same node.
    #[error("Cyclic dependency in '{scope}': {}", .members.join(" -> "))]
    CyclicDependency { scope: String, members: Vec<String> },
}

impl DependencyError {
    /// Nodes taking part in the cycle, without the repeated closing node.
    pub fn cycle_members(&self) -> &[String] {
        match self {
            DependencyError::CyclicDependency { members, .. } => {
                &members[..members.len().saturating_sub(1)]
            }
        }
    }
}

fn finish(graph: &DependencyGraph, for_startup: bool) -> Result<Vec<String>, DependencyError> {
    let mut order = graph.topological_sort()?;
    if !for_startup {
        order.reverse();
    }
    Ok(order)
}

/// Build the graph of components in one partition.
pub fn component_graph(scope: &str, components: &[ComponentProfile]) -> DependencyGraph {
    let mut graph = DependencyGraph::new(scope);
    for component in components {
        graph.add_node(component.name());
    }
    for component in components {
        for directive in &component.metadata.directives {
            graph.add_edge(component.name(), &directive.provider_name);
        }
    }
    graph
}

/// Build the graph of sibling partitions from their `depends` edges.
pub fn partition_graph(scope: &str, partitions: &[PartitionProfile]) -> DependencyGraph {
    let mut graph = DependencyGraph::new(scope);
    for partition in partitions {
        graph.add_node(partition.name());
    }
    for partition in partitions {
        for dependency in &partition.depends {
            graph.add_edge(partition.name(), dependency);
        }
    }
    graph
}

/// Order component names for startup (`true`) or shutdown (`false`).
///
/// Only providers present in `components` create edges.
pub fn order(components: &[ComponentProfile], for_startup: bool) -> Result<Vec<String>, DependencyError> {
    order_in("components", components, for_startup)
}

/// Same as [`order`], naming `scope` in cycle errors.
pub fn order_in(
    scope: &str,
    components: &[ComponentProfile],
    for_startup: bool,
) -> Result<Vec<String>, DependencyError> {
    finish(&component_graph(scope, components), for_startup)
}

/// Order sibling partitions by their `depends` edges.
pub fn order_partitions(
    scope: &str,
    partitions: &[PartitionProfile],
    for_startup: bool,
) -> Result<Vec<String>, DependencyError> {
    finish(&partition_graph(scope, partitions), for_startup)
}

//! Facility visiting order.
//!
//! Facilities form a graph with an edge from each prerequisite facility to
//! the facility that reads it. The visiting order is a topological order of
//! that graph; among facilities that are ready at the same time, the one
//! with the earlier stage wins, then the one declared first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::facility::{FacilitySpec, Stage};
use crate::resolver::errors::CatalogError;

/// Build the prerequisite graph. Node weights are indices into `facilities`.
///
/// Unknown facilities must have been rejected beforehand; edges to them are
/// skipped here.
pub fn prerequisite_graph(facilities: &[FacilitySpec]) -> DiGraph<usize, ()> {
    let mut graph = DiGraph::with_capacity(facilities.len(), facilities.len());
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for (index, facility) in facilities.iter().enumerate() {
        nodes.insert(facility.id, graph.add_node(index));
    }

    for facility in facilities {
        let to = nodes[facility.id];
        for dep in facility.dependencies() {
            if let Some(&from) = nodes.get(dep) {
                if !graph.contains_edge(from, to) {
                    graph.add_edge(from, to, ());
                }
            }
        }
    }

    graph
}

/// Compute the visiting order as indices into `facilities`.
pub fn visiting_order(facilities: &[FacilitySpec]) -> Result<Vec<usize>, CatalogError> {
    let graph = prerequisite_graph(facilities);

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let key = |n: NodeIndex| -> Reverse<(Stage, usize)> {
        let index = graph[n];
        Reverse((facilities[index].stage, index))
    };

    let mut ready: BinaryHeap<(Reverse<(Stage, usize)>, NodeIndex)> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(|n| (key(n), n))
        .collect();

    let mut order = Vec::with_capacity(facilities.len());
    while let Some((_, node)) = ready.pop() {
        order.push(graph[node]);
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            let degree = &mut in_degree[next.index()];
            *degree -= 1;
            if *degree == 0 {
                ready.push((key(next), next));
            }
        }
    }

    if order.len() < facilities.len() {
        return Err(CatalogError::CycleDetected {
            facilities: find_cycle(&graph, facilities),
        });
    }

    Ok(order)
}

/// Names of one strongly connected component with more than one member,
/// closed back onto its first element for display.
fn find_cycle(graph: &DiGraph<usize, ()>, facilities: &[FacilitySpec]) -> Vec<String> {
    let component = tarjan_scc(graph)
        .into_iter()
        .find(|scc| scc.len() > 1 || scc.iter().any(|&n| graph.contains_edge(n, n)))
        .unwrap_or_default();

    let mut names: Vec<String> = component
        .iter()
        .rev()
        .map(|&n| facilities[graph[n]].id.to_string())
        .collect();
    if let Some(first) = names.first().cloned() {
        names.push(first);
    }
    names
}

/// Facilities whose prerequisites read `facility`, directly or transitively.
pub fn downstream_of(facilities: &[FacilitySpec], facility: &str) -> Vec<usize> {
    let graph = prerequisite_graph(facilities);
    let Some(start) = graph.node_indices().find(|&n| facilities[graph[n]].id == facility) else {
        return Vec::new();
    };

    let mut seen = vec![false; graph.node_count()];
    let mut stack = vec![start];
    let mut out = Vec::new();
    while let Some(node) = stack.pop() {
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            if !seen[next.index()] {
                seen[next.index()] = true;
                out.push(graph[next]);
                stack.push(next);
            }
        }
    }
    out.sort_unstable();
    out
}

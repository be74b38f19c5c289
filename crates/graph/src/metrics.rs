//! Structural metrics over a directed graph snapshot.
//!
//! Conventions:
//! - density and degrees count edges with multiplicity, self-loops included
//! - reciprocity counts every non-loop edge whose reverse exists; a mutual
//!   pair contributes 2, self-loops only enter the denominator
//! - transitivity and clustering use the undirected simple view, so
//!   direction, multiplicity and self-loops do not affect them
//! - `weakly_connected` counts weak components that carry at least one
//!   edge; `strongly_connected` counts every SCC, singletons included
//! - every ratio with a zero denominator is reported as 0

use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyIndex;
use crate::graph::DirectedGraph;
use crate::tarjan::strongly_connected_components;

/// Scalar statistics derived from one graph snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub density: f64,
    pub avg_in_degree: f64,
    pub avg_out_degree: f64,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Weak components with at least one edge
    pub weakly_connected: usize,
    /// Number of strongly connected components
    pub strongly_connected: usize,
    /// Size of the largest strongly connected component
    pub strongly_connected_nodes: usize,
    pub transitivity: f64,
    pub reciprocity: f64,
    pub avg_clustering: f64,
}

/// Compute every metric for `graph`.
///
/// # Examples
///
/// ```
/// use netmotif_graph::{DirectedGraph, compute_metrics};
///
/// let graph = DirectedGraph::from_parts(
///     ["a", "b"].map(String::from),
///     [("a", "b"), ("b", "a")].map(|(s, t)| (s.to_string(), t.to_string())),
/// ).unwrap();
///
/// let report = compute_metrics(&graph);
/// assert_eq!(report.reciprocity, 1.0);
/// assert_eq!(report.strongly_connected_nodes, 2);
/// ```
#[must_use]
pub fn compute_metrics(graph: &DirectedGraph) -> MetricsReport {
    compute_metrics_with_index(&AdjacencyIndex::build(graph))
}

/// Compute every metric from a prebuilt adjacency index.
#[must_use]
pub fn compute_metrics_with_index(index: &AdjacencyIndex) -> MetricsReport {
    let n = index.node_count();
    let m = index.edge_count();

    let sccs = strongly_connected_components(index);
    let triangles = TriangleStats::collect(index);

    MetricsReport {
        num_nodes: n,
        num_edges: m,
        density: density(n, m),
        avg_in_degree: ratio(m as f64, n as f64),
        avg_out_degree: ratio(m as f64, n as f64),
        max_in_degree: (0..n).map(|v| index.in_degree(v)).max().unwrap_or(0),
        max_out_degree: (0..n).map(|v| index.out_degree(v)).max().unwrap_or(0),
        weakly_connected: weak_component_count(index),
        strongly_connected: sccs.len(),
        strongly_connected_nodes: sccs.iter().map(Vec::len).max().unwrap_or(0),
        transitivity: triangles.transitivity(),
        reciprocity: reciprocity(index),
        avg_clustering: triangles.average_clustering(n),
    }
}

/// `m / (n (n - 1))`, or 0 when `n < 2`.
#[must_use]
pub fn density(n: usize, m: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    m as f64 / (n as f64 * (n as f64 - 1.0))
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Count weak components containing at least one edge.
fn weak_component_count(index: &AdjacencyIndex) -> usize {
    let mut seen = vec![false; index.node_count()];
    let mut queue = Vec::new();
    let mut components = 0_usize;

    for start in 0..index.node_count() {
        if !index.has_incident_edge(start) || !mark(&mut seen, start) {
            continue;
        }
        components = components.saturating_add(1);
        queue.push(start);

        while let Some(node) = queue.pop() {
            for &next in index.neighbors(node) {
                if mark(&mut seen, next) {
                    queue.push(next);
                }
            }
        }
    }

    components
}

/// Mark `node` as seen; false if it already was or is out of range.
fn mark(seen: &mut [bool], node: usize) -> bool {
    match seen.get_mut(node) {
        Some(flag) if !*flag => {
            *flag = true;
            true
        }
        _ => false,
    }
}

fn reciprocity(index: &AdjacencyIndex) -> f64 {
    let reciprocated = (0..index.node_count())
        .flat_map(|source| {
            index
                .out_neighbors(source)
                .iter()
                .map(move |&target| (source, target))
        })
        .filter(|&(source, target)| source != target && index.has_arc(target, source))
        .count();

    ratio(reciprocated as f64, index.edge_count() as f64)
}

/// Per-node triangle counts over the undirected simple view.
struct TriangleStats {
    /// Triangles through each node
    per_node: Vec<u64>,
    /// Neighbor pairs through each node, `C(d, 2)`
    pairs: Vec<u64>,
}

impl TriangleStats {
    fn collect(index: &AdjacencyIndex) -> Self {
        let (per_node, pairs) = (0..index.node_count())
            .map(|node| {
                let neighbors = index.neighbors(node);
                let degree = neighbors.len() as u64;
                let pairs = degree.saturating_mul(degree.saturating_sub(1)) / 2;
                let closed = neighbors
                    .iter()
                    .enumerate()
                    .map(|(i, &a)| {
                        neighbors
                            .iter()
                            .skip(i.saturating_add(1))
                            .filter(|&&b| index.is_adjacent(a, b))
                            .count() as u64
                    })
                    .sum::<u64>();
                (closed, pairs)
            })
            .unzip();

        Self { per_node, pairs }
    }

    /// `3 * triangles / connected triples`; each triangle is seen once per corner.
    fn transitivity(&self) -> f64 {
        let closed: u64 = self.per_node.iter().sum();
        let triples: u64 = self.pairs.iter().sum();
        ratio(closed as f64, triples as f64)
    }

    /// Mean local clustering over all nodes; degree < 2 contributes 0.
    fn average_clustering(&self, n: usize) -> f64 {
        let total: f64 = self
            .per_node
            .iter()
            .zip(&self.pairs)
            .map(|(&triangles, &pairs)| ratio(triangles as f64, pairs as f64))
            .sum();
        ratio(total, n as f64)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]
    #![allow(clippy::float_cmp)]

    use super::*;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> DirectedGraph {
        DirectedGraph::from_parts(
            nodes.iter().map(|s| (*s).to_string()),
            edges
                .iter()
                .map(|(a, b)| ((*a).to_string(), (*b).to_string())),
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_empty_graph_defaults_to_zero() {
        let report = compute_metrics(&DirectedGraph::new());
        assert_eq!(report, MetricsReport::default());
    }

    #[test]
    fn test_single_node_defaults_to_zero() {
        let report = compute_metrics(&graph(&["a"], &[]));
        assert_eq!(report.num_nodes, 1);
        assert_eq!(report.density, 0.0);
        assert_eq!(report.avg_in_degree, 0.0);
        assert_eq!(report.weakly_connected, 0);
        assert_eq!(report.strongly_connected, 1);
        assert_eq!(report.strongly_connected_nodes, 1);
    }

    #[test]
    fn test_four_node_scenario() {
        let report = compute_metrics(&graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("A", "C")],
        ));

        assert_eq!(report.num_nodes, 4);
        assert_eq!(report.num_edges, 4);
        assert_eq!(report.reciprocity, 0.5);
        assert_eq!(report.weakly_connected, 1);
        assert_eq!(report.strongly_connected, 2);
        assert_eq!(report.strongly_connected_nodes, 3);
        assert_eq!(report.density, 4.0 / 12.0);
        assert_eq!(report.avg_in_degree, 1.0);
        assert_eq!(report.max_out_degree, 2);
        assert_eq!(report.max_in_degree, 2);
        // The undirected view is a triangle plus an isolated node
        assert_eq!(report.transitivity, 1.0);
        assert!(approx(report.avg_clustering, 0.75));
    }

    #[test]
    fn test_two_disjoint_two_cycles() {
        let report = compute_metrics(&graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "C")],
        ));

        assert_eq!(report.weakly_connected, 2);
        assert_eq!(report.strongly_connected, 2);
        assert_eq!(report.strongly_connected_nodes, 2);
        assert_eq!(report.reciprocity, 1.0);
        assert_eq!(report.transitivity, 0.0);
    }

    #[test]
    fn test_density_counts_multiplicity() {
        let simple = compute_metrics(&graph(&["a", "b"], &[("a", "b")]));
        assert_eq!(simple.density, 0.5);

        let multi = compute_metrics(&graph(
            &["a", "b"],
            &[("a", "b"), ("a", "b"), ("b", "a"), ("a", "a")],
        ));
        assert_eq!(multi.num_edges, 4);
        assert_eq!(multi.density, 2.0);
    }

    #[test]
    fn test_reciprocity_with_parallel_edges() {
        // a->b twice, b->a once, c->a once: three reciprocated edges of four
        let report = compute_metrics(&graph(
            &["a", "b", "c"],
            &[("a", "b"), ("a", "b"), ("b", "a"), ("c", "a")],
        ));
        assert_eq!(report.reciprocity, 0.75);
    }

    #[test]
    fn test_reciprocity_ignores_self_loops_in_numerator() {
        let report = compute_metrics(&graph(&["a", "b"], &[("a", "a"), ("a", "b")]));
        assert_eq!(report.reciprocity, 0.0);
    }

    #[test]
    fn test_self_loop_does_not_change_triangle_metrics() {
        let edges = [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")];
        let base = compute_metrics(&graph(&["a", "b", "c", "d"], &edges));

        let mut looped: Vec<_> = edges.to_vec();
        looped.push(("c", "c"));
        let with_loop = compute_metrics(&graph(&["a", "b", "c", "d"], &looped));

        assert_eq!(base.transitivity, with_loop.transitivity);
        assert_eq!(base.avg_clustering, with_loop.avg_clustering);
        assert_eq!(with_loop.max_in_degree, 2);
    }

    #[test]
    fn test_transitivity_of_open_star() {
        // Center with three leaves: 3 connected triples, no triangles
        let report = compute_metrics(&graph(
            &["c", "x", "y", "z"],
            &[("c", "x"), ("c", "y"), ("z", "c")],
        ));
        assert_eq!(report.transitivity, 0.0);
        assert_eq!(report.avg_clustering, 0.0);
        assert_eq!(report.weakly_connected, 1);
    }

    #[test]
    fn test_transitivity_of_triangle_with_tail() {
        // Triangle a,b,c plus c-d: 1 triangle, triples = 1 + 1 + 3 + 0 = 5
        let report = compute_metrics(&graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")],
        ));
        assert!(approx(report.transitivity, 3.0 / 5.0));
        // Local: a=1, b=1, c=1/3, d=0
        assert!(approx(report.avg_clustering, (1.0 + 1.0 + 1.0 / 3.0) / 4.0));
    }

    #[test]
    fn test_isolated_self_loop_forms_weak_component() {
        let report = compute_metrics(&graph(&["a", "b"], &[("a", "a")]));
        assert_eq!(report.weakly_connected, 1);
    }

    #[test]
    fn test_density_helper() {
        assert_eq!(density(0, 0), 0.0);
        assert_eq!(density(1, 3), 0.0);
        assert_eq!(density(3, 6), 1.0);
    }
}

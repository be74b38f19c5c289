//! Adjacency index built once per analysis call.
//!
//! Holds node positions only; the graph itself is never copied.

use crate::graph::DirectedGraph;

/// Per-node neighbor lists over node positions.
///
/// * `successors` / `predecessors` keep multiplicity and edge insertion order.
/// * `arc_sets` is the sorted, deduplicated successor set without self-loops.
/// * `neighbor_sets` is the sorted undirected simple view: parallel,
///   reciprocal and self-loop edges collapsed or removed.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyIndex {
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    arc_sets: Vec<Vec<usize>>,
    neighbor_sets: Vec<Vec<usize>>,
    edge_count: usize,
    self_loops: usize,
}

impl AdjacencyIndex {
    /// Build the index from a graph snapshot.
    #[must_use]
    pub fn build(graph: &DirectedGraph) -> Self {
        let n = graph.node_count();
        let mut successors = vec![Vec::new(); n];
        let mut predecessors = vec![Vec::new(); n];
        let mut arc_sets = vec![Vec::new(); n];
        let mut neighbor_sets = vec![Vec::new(); n];
        let mut self_loops = 0_usize;

        for (source, target) in graph.edge_positions() {
            push_at(&mut successors, source, target);
            push_at(&mut predecessors, target, source);

            if source == target {
                self_loops = self_loops.saturating_add(1);
                continue;
            }
            push_at(&mut arc_sets, source, target);
            push_at(&mut neighbor_sets, source, target);
            push_at(&mut neighbor_sets, target, source);
        }

        for list in arc_sets.iter_mut().chain(neighbor_sets.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            successors,
            predecessors,
            arc_sets,
            neighbor_sets,
            edge_count: graph.edge_count(),
            self_loops,
        }
    }

    /// Number of nodes covered by the index
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of edges, counted with multiplicity
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of self-loop edges, counted with multiplicity
    #[must_use]
    pub const fn self_loop_count(&self) -> usize {
        self.self_loops
    }

    /// Out-neighbors of `node`, with multiplicity
    #[must_use]
    pub fn out_neighbors(&self, node: usize) -> &[usize] {
        self.successors.get(node).map_or(&[], Vec::as_slice)
    }

    /// In-neighbors of `node`, with multiplicity
    #[must_use]
    pub fn in_neighbors(&self, node: usize) -> &[usize] {
        self.predecessors.get(node).map_or(&[], Vec::as_slice)
    }

    /// Undirected simple neighbors of `node`, sorted
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &[usize] {
        self.neighbor_sets.get(node).map_or(&[], Vec::as_slice)
    }

    /// Out-degree with multiplicity (a self-loop counts once)
    #[must_use]
    pub fn out_degree(&self, node: usize) -> usize {
        self.out_neighbors(node).len()
    }

    /// In-degree with multiplicity (a self-loop counts once)
    #[must_use]
    pub fn in_degree(&self, node: usize) -> usize {
        self.in_neighbors(node).len()
    }

    /// Whether at least one edge `source -> target` exists (self-loops excluded)
    #[must_use]
    pub fn has_arc(&self, source: usize, target: usize) -> bool {
        self.arc_sets
            .get(source)
            .is_some_and(|set| set.binary_search(&target).is_ok())
    }

    /// Whether `a` and `b` are joined in either direction (self-loops excluded)
    #[must_use]
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbor_sets
            .get(a)
            .is_some_and(|set| set.binary_search(&b).is_ok())
    }

    /// Whether `node` has any incident edge, self-loops included
    #[must_use]
    pub fn has_incident_edge(&self, node: usize) -> bool {
        self.out_degree(node) > 0 || self.in_degree(node) > 0
    }
}

fn push_at(lists: &mut [Vec<usize>], at: usize, value: usize) {
    if let Some(list) = lists.get_mut(at) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

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

    #[test]
    fn test_directed_views_keep_multiplicity() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "b"), ("c", "a")]);
        let index = AdjacencyIndex::build(&g);

        assert_eq!(index.out_neighbors(0), &[1, 1]);
        assert_eq!(index.in_neighbors(1), &[0, 0]);
        assert_eq!(index.in_neighbors(0), &[2]);
        assert_eq!(index.edge_count(), 3);
    }

    #[test]
    fn test_undirected_view_collapses_reciprocal_and_loops() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a"), ("a", "a")]);
        let index = AdjacencyIndex::build(&g);

        assert_eq!(index.neighbors(0), &[1]);
        assert_eq!(index.neighbors(1), &[0]);
        assert_eq!(index.self_loop_count(), 1);
        assert!(!index.has_arc(0, 0));
        assert!(index.has_arc(0, 1));
        assert!(index.has_arc(1, 0));
    }

    #[test]
    fn test_self_loop_counts_toward_degrees() {
        let g = graph(&["a"], &[("a", "a")]);
        let index = AdjacencyIndex::build(&g);

        assert_eq!(index.out_degree(0), 1);
        assert_eq!(index.in_degree(0), 1);
        assert!(index.has_incident_edge(0));
        assert!(index.neighbors(0).is_empty());
    }

    #[test]
    fn test_out_of_range_positions_are_empty() {
        let index = AdjacencyIndex::build(&DirectedGraph::new());
        assert!(index.out_neighbors(5).is_empty());
        assert!(!index.has_arc(5, 6));
        assert!(!index.is_adjacent(0, 1));
    }
}

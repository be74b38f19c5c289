//! Tarjan's Strongly Connected Components (SCC) algorithm
//!
//! An SCC is a maximal node set where every node can reach every other
//! node following edge direction.
//!
//! # Algorithm Overview
//!
//! Tarjan's algorithm uses DFS with two key values per node:
//! - `index`: Discovery order (0, 1, 2, ...)
//! - `low_link`: Smallest index reachable from this node
//!
//! A node is a root of an SCC when its `low_link` equals its `index`.
//!
//! The DFS runs on an explicit frame stack so that long paths in large
//! graphs cannot exhaust the thread stack. Roots are tried in node
//! position order and successors in edge insertion order, so the output
//! is fully determined by the input.
//!
//! # Complexity
//!
//! - Time: O(V + E) where V = vertices, E = edges
//! - Space: O(V) for the stacks and per-node state

use crate::adjacency::AdjacencyIndex;

/// Index assigned to a node during DFS
type DiscoveryIndex = usize;

/// Low-link value for a node
type LowLink = usize;

/// One suspended DFS call: the node and the next successor slot to explore
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    cursor: usize,
}

/// Tarjan SCC algorithm state
#[derive(Debug)]
struct TarjanState {
    /// Next discovery index to assign
    next_index: DiscoveryIndex,
    /// Discovery index per node position, `None` while unvisited
    indices: Vec<Option<DiscoveryIndex>>,
    /// Low-link value per node position
    low_links: Vec<LowLink>,
    /// Stack of nodes currently being explored
    stack: Vec<usize>,
    /// Track which nodes are on the stack
    on_stack: Vec<bool>,
    /// Completed components, in completion order
    components: Vec<Vec<usize>>,
}

impl TarjanState {
    fn new(node_count: usize) -> Self {
        Self {
            next_index: 0,
            indices: vec![None; node_count],
            low_links: vec![0; node_count],
            stack: Vec::new(),
            on_stack: vec![false; node_count],
            components: Vec::new(),
        }
    }

    fn is_visited(&self, node: usize) -> bool {
        self.indices.get(node).is_some_and(Option::is_some)
    }

    fn discovery_index(&self, node: usize) -> DiscoveryIndex {
        self.indices.get(node).copied().flatten().unwrap_or(usize::MAX)
    }

    /// Assign discovery index and low-link, push onto the SCC stack
    fn discover(&mut self, node: usize) {
        let index = self.next_index;
        self.next_index = self.next_index.saturating_add(1);
        if let Some(slot) = self.indices.get_mut(node) {
            *slot = Some(index);
        }
        if let Some(low) = self.low_links.get_mut(node) {
            *low = index;
        }
        self.stack.push(node);
        self.set_on_stack(node, true);
    }

    fn low_link(&self, node: usize) -> LowLink {
        self.low_links.get(node).copied().unwrap_or(usize::MAX)
    }

    fn lower_link(&mut self, node: usize, candidate: LowLink) {
        if let Some(low) = self.low_links.get_mut(node) {
            *low = (*low).min(candidate);
        }
    }

    fn is_on_stack(&self, node: usize) -> bool {
        self.on_stack.get(node).copied().unwrap_or(false)
    }

    fn set_on_stack(&mut self, node: usize, value: bool) {
        if let Some(flag) = self.on_stack.get_mut(node) {
            *flag = value;
        }
    }

    /// Pop nodes from stack until we reach the given node
    fn pop_component(&mut self, root: usize) {
        let mut component = Vec::new();

        while let Some(top) = self.stack.pop() {
            self.set_on_stack(top, false);
            component.push(top);

            if top == root {
                break;
            }
        }

        self.components.push(component);
    }

    /// Run the DFS rooted at `root`
    fn visit(&mut self, index: &AdjacencyIndex, root: usize) {
        self.discover(root);
        let mut frames = vec![Frame {
            node: root,
            cursor: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let node = frame.node;

            if let Some(&next) = index.out_neighbors(node).get(frame.cursor) {
                frame.cursor = frame.cursor.saturating_add(1);

                if !self.is_visited(next) {
                    self.discover(next);
                    frames.push(Frame {
                        node: next,
                        cursor: 0,
                    });
                } else if self.is_on_stack(next) {
                    // Back edge to node on stack
                    let next_index = self.discovery_index(next);
                    self.lower_link(node, next_index);
                }
                // Cross edges to already processed nodes are ignored
                continue;
            }

            // All successors explored: return to the caller frame
            frames.pop();
            let node_low = self.low_link(node);
            if let Some(parent) = frames.last() {
                self.lower_link(parent.node, node_low);
            }

            if node_low == self.discovery_index(node) {
                self.pop_component(node);
            }
        }
    }
}

/// Find all strongly connected components.
///
/// Returns components as lists of node positions. Every node belongs to
/// exactly one component; isolated nodes form singleton components.
#[must_use]
pub fn strongly_connected_components(index: &AdjacencyIndex) -> Vec<Vec<usize>> {
    let mut state = TarjanState::new(index.node_count());

    for node in 0..index.node_count() {
        if !state.is_visited(node) {
            state.visit(index, node);
        }
    }

    state.components
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;
    use crate::graph::DirectedGraph;

    fn index_from_edges(n: usize, edges: &[(usize, usize)]) -> AdjacencyIndex {
        let mut graph = DirectedGraph::with_numbered_nodes(n);
        for &(a, b) in edges {
            graph.add_edge_between(a, b).unwrap();
        }
        AdjacencyIndex::build(&graph)
    }

    fn sorted(mut sccs: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        for scc in &mut sccs {
            scc.sort_unstable();
        }
        sccs.sort();
        sccs
    }

    #[test]
    fn test_tarjan_scc_empty_graph() {
        let sccs = strongly_connected_components(&index_from_edges(0, &[]));
        assert!(sccs.is_empty());
    }

    #[test]
    fn test_tarjan_scc_single_node() {
        let sccs = strongly_connected_components(&index_from_edges(1, &[]));
        assert_eq!(sccs, vec![vec![0]]);
    }

    #[test]
    fn test_tarjan_scc_two_node_cycle() {
        let sccs = strongly_connected_components(&index_from_edges(2, &[(0, 1), (1, 0)]));
        assert_eq!(sorted(sccs), vec![vec![0, 1]]);
    }

    #[test]
    fn test_tarjan_scc_chain_returns_singletons() {
        let sccs =
            strongly_connected_components(&index_from_edges(4, &[(0, 1), (1, 2), (2, 3)]));
        assert_eq!(sccs.len(), 4);
        assert!(sccs.iter().all(|scc| scc.len() == 1));
        // Completion order of a chain is deepest first
        assert_eq!(sccs[0], vec![3]);
    }

    #[test]
    fn test_tarjan_scc_two_cycles_joined_by_bridge() {
        // 0<->1 -> 2<->3
        let sccs = strongly_connected_components(&index_from_edges(
            4,
            &[(0, 1), (1, 0), (1, 2), (2, 3), (3, 2)],
        ));
        assert_eq!(sorted(sccs), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn test_tarjan_scc_nested_cycles() {
        // 0->1->2->0 and 2->3->4->2 share node 2
        let sccs = strongly_connected_components(&index_from_edges(
            6,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2), (4, 5)],
        ));
        assert_eq!(sorted(sccs), vec![vec![0, 1, 2, 3, 4], vec![5]]);
    }

    #[test]
    fn test_tarjan_scc_self_loop_is_singleton() {
        let sccs = strongly_connected_components(&index_from_edges(2, &[(0, 0), (0, 1)]));
        assert_eq!(sorted(sccs), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_tarjan_scc_long_path_does_not_recurse() {
        let n = 200_000;
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).chain([(n - 1, 0)]).collect();
        let sccs = strongly_connected_components(&index_from_edges(n, &edges));
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].len(), n);
    }

    #[test]
    fn test_tarjan_scc_is_deterministic() {
        let edges = [(0, 1), (1, 2), (2, 0), (3, 4), (4, 3), (5, 5)];
        let first = strongly_connected_components(&index_from_edges(6, &edges));
        let second = strongly_connected_components(&index_from_edges(6, &edges));
        assert_eq!(first, second);
    }
}

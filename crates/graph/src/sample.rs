//! Built-in sample dataset.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::DirectedGraph;

pub const SAMPLE_NODE_COUNT: usize = 20;
pub const SAMPLE_EDGE_DRAWS: usize = 50;

/// Sample graph: nodes `Node0..Node19` and 50 uniform endpoint draws with
/// self-loops dropped. Parallel edges are kept.
///
/// # Examples
///
/// ```
/// use netmotif_graph::sample_graph;
///
/// let graph = sample_graph(Some(1));
/// assert_eq!(graph.node_count(), 20);
/// assert!(graph.edge_count() <= 50);
/// ```
#[must_use]
pub fn sample_graph(seed: Option<u64>) -> DirectedGraph {
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut graph = DirectedGraph::new();
    for i in 0..SAMPLE_NODE_COUNT {
        graph.ensure_node(&format!("Node{i}"));
    }

    for _ in 0..SAMPLE_EDGE_DRAWS {
        let source = rng.gen_range(0..SAMPLE_NODE_COUNT);
        let target = rng.gen_range(0..SAMPLE_NODE_COUNT);
        if source != target {
            // Both positions are below the node count
            let _ = graph.add_edge_between(source, target);
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;
    use crate::graph::GraphData;

    #[test]
    fn test_sample_has_named_nodes_and_no_loops() {
        let graph = sample_graph(Some(17));
        assert_eq!(graph.node_id(0).map(String::as_str), Some("Node0"));
        assert_eq!(graph.node_id(19).map(String::as_str), Some("Node19"));
        assert!(graph.edge_positions().all(|(s, t)| s != t));
        assert!(graph.edge_count() <= SAMPLE_EDGE_DRAWS);
    }

    #[test]
    fn test_seeded_sample_is_reproducible() {
        assert_eq!(
            GraphData::from(&sample_graph(Some(3))),
            GraphData::from(&sample_graph(Some(3)))
        );
    }
}

//! Plain-text edge lists: one `source target` pair per line.
//!
//! Text after `#` is a comment and blank lines are skipped. A line with a
//! single token declares an isolated node; columns past the second are
//! ignored. Nodes are created in order of first appearance.

use std::fmt::Write as _;

use netmotif_core::{Error, Result};

use crate::graph::DirectedGraph;

/// Parse an edge list.
///
/// # Errors
///
/// Returns [`Error::EdgeListParse`] with the 1-based line number when a
/// node id contains a control character.
///
/// # Examples
///
/// ```
/// use netmotif_graph::parse_edge_list;
///
/// let graph = parse_edge_list("a b\nb c # trailing comment\n\nd\n").unwrap();
/// assert_eq!(graph.node_count(), 4);
/// assert_eq!(graph.edge_count(), 2);
/// ```
pub fn parse_edge_list(text: &str) -> Result<DirectedGraph> {
    let mut graph = DirectedGraph::new();

    for (number, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default();
        let mut tokens = line.split_whitespace();

        let Some(source) = tokens.next() else {
            continue;
        };
        if source.chars().any(char::is_control) {
            return Err(Error::edge_list_parse(
                number.saturating_add(1),
                "control character in node id",
            ));
        }

        let source = graph.ensure_node(source);
        if let Some(target) = tokens.next() {
            if target.chars().any(char::is_control) {
                return Err(Error::edge_list_parse(
                    number.saturating_add(1),
                    "control character in node id",
                ));
            }
            let target = graph.ensure_node(target);
            graph.add_edge_between(source, target)?;
        }
    }

    Ok(graph)
}

/// Serialize a graph as an edge list.
///
/// Nodes without incident edges are written as single-token lines so that
/// parsing the output restores the node set.
///
/// # Errors
///
/// Returns [`Error::UnwritableNodeId`] for the first id that would not
/// parse back as itself: empty ids and ids containing whitespace, `#` or
/// control characters.
pub fn write_edge_list(graph: &DirectedGraph) -> Result<String> {
    if let Some((id, reason)) = graph
        .nodes()
        .find_map(|id| unwritable_reason(id).map(|reason| (id, reason)))
    {
        return Err(Error::unwritable_node_id(id.as_str(), reason));
    }

    let mut touched = vec![false; graph.node_count()];
    let mut out = String::new();

    for (source, target) in graph.edge_positions() {
        for position in [source, target] {
            if let Some(flag) = touched.get_mut(position) {
                *flag = true;
            }
        }
        if let (Some(s), Some(t)) = (graph.node_id(source), graph.node_id(target)) {
            let _ = writeln!(out, "{s} {t}");
        }
    }

    for (id, &seen) in graph.nodes().zip(&touched) {
        if !seen {
            let _ = writeln!(out, "{id}");
        }
    }

    Ok(out)
}

fn unwritable_reason(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("empty id")
    } else if id.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if id.contains('#') {
        Some("contains '#'")
    } else if id.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blank_lines() {
        let graph = parse_edge_list("# header\n\n  a b  \n\tb\tc\n# done\n").unwrap();
        let edges: Vec<_> = graph
            .edges()
            .map(|(s, t)| (s.as_str(), t.as_str()))
            .collect();
        assert_eq!(edges, vec![("a", "b"), ("b", "c")]);
    }

    #[test]
    fn test_parse_ignores_extra_columns() {
        let graph = parse_edge_list("a b {'weight': 3}\n").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_parse_keeps_loops_and_parallel_edges() {
        let graph = parse_edge_list("a a\na b\na b\n").unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_single_token_declares_isolated_node() {
        let graph = parse_edge_list("a b\nz\n").unwrap();
        assert!(graph.contains_node("z"));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_parse_rejects_control_characters() {
        let result = parse_edge_list("a b\nc\u{7}d e\n");
        assert!(matches!(result, Err(Error::EdgeListParse { line: 2, .. })));
    }

    #[test]
    fn test_empty_input_is_empty_graph() {
        assert!(parse_edge_list("").unwrap().is_empty());
        assert!(parse_edge_list("# only comments\n").unwrap().is_empty());
    }

    #[test]
    fn test_write_then_parse_preserves_edges_and_isolated_nodes() {
        let original = parse_edge_list("x y\ny x\ny y\nlonely\n").unwrap();
        let text = write_edge_list(&original).unwrap();
        assert_eq!(text, "x y\ny x\ny y\nlonely\n");

        let parsed = parse_edge_list(&text).unwrap();
        let before: Vec<_> = original.edges().collect();
        let after: Vec<_> = parsed.edges().collect();
        assert_eq!(before, after);
        assert_eq!(parsed.node_count(), 3);
    }

    #[test]
    fn test_write_rejects_ids_that_would_not_parse_back() {
        for id in ["two words", "tag#1", "", "tab\there"] {
            let no_edges: Vec<(String, String)> = Vec::new();
            let graph =
                DirectedGraph::from_parts([id.to_string(), "b".to_string()], no_edges).unwrap();
            let result = write_edge_list(&graph);
            assert!(
                matches!(result, Err(Error::UnwritableNodeId { .. })),
                "id {id:?} was written"
            );
            assert!(result.unwrap_err().is_validation());
        }
    }
}

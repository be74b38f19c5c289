//! Triad census: classify every unordered triple of distinct nodes into
//! one of the 16 directed triad isomorphism classes.
//!
//! A triad's induced subgraph is a 6-bit pattern, one bit per possible arc
//! between local positions 0, 1 and 2 (see [`ARCS`]). A 64-entry lookup
//! table, derived from the class templates under all 6 relabelings, maps
//! each pattern to its class id.
//!
//! Counting uses the Batagelj-Mrvar sweep: connected triads are visited
//! once through their lowest-positioned dyad, triads with a single
//! connected dyad are counted arithmetically, and the empty class is the
//! remainder of `C(n, 3)`. Edge multiplicity and self-loops do not affect
//! the census.

use std::sync::LazyLock;

use itertools::Itertools;
use serde::Serialize;

use crate::adjacency::AdjacencyIndex;
use crate::graph::DirectedGraph;

/// Number of directed triad isomorphism classes
pub const TRIAD_CLASS_COUNT: usize = 16;

/// Arc slots of a triad pattern: bit `k` is set when `ARCS[k]` is present.
pub const ARCS: [(usize, usize); 6] = [(0, 1), (1, 0), (0, 2), (2, 0), (1, 2), (2, 1)];

/// Pattern bit of each arc slot in [`ARCS`].
const ARC_BITS: [u8; 6] = [1, 2, 4, 8, 16, 32];

const PERMUTATIONS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

const UNCLASSIFIED: u8 = u8::MAX;

/// A triad isomorphism class and its template over the labels `A, B, C`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriadClass {
    pub id: usize,
    /// Holland-Leinhardt MAN code
    pub code: &'static str,
    pub edges: &'static [(char, char)],
}

/// All 16 classes, indexed by id.
pub const TRIAD_CLASSES: [TriadClass; TRIAD_CLASS_COUNT] = [
    TriadClass { id: 0, code: "003", edges: &[] },
    TriadClass { id: 1, code: "012", edges: &[('A', 'B')] },
    TriadClass { id: 2, code: "102", edges: &[('A', 'B'), ('B', 'A')] },
    TriadClass { id: 3, code: "021D", edges: &[('B', 'A'), ('B', 'C')] },
    TriadClass { id: 4, code: "021C", edges: &[('B', 'A'), ('C', 'B')] },
    TriadClass { id: 5, code: "021U", edges: &[('A', 'B'), ('C', 'B')] },
    TriadClass { id: 6, code: "111U", edges: &[('A', 'B'), ('B', 'A'), ('B', 'C')] },
    TriadClass { id: 7, code: "111D", edges: &[('A', 'B'), ('B', 'A'), ('C', 'B')] },
    TriadClass {
        id: 8,
        code: "201",
        edges: &[('A', 'B'), ('B', 'A'), ('B', 'C'), ('C', 'B')],
    },
    TriadClass { id: 9, code: "030C", edges: &[('A', 'B'), ('B', 'C'), ('C', 'A')] },
    TriadClass { id: 10, code: "030T", edges: &[('A', 'B'), ('B', 'C'), ('A', 'C')] },
    TriadClass {
        id: 11,
        code: "120D",
        edges: &[('B', 'A'), ('B', 'C'), ('C', 'A'), ('A', 'C')],
    },
    TriadClass {
        id: 12,
        code: "120U",
        edges: &[('A', 'B'), ('C', 'B'), ('C', 'A'), ('A', 'C')],
    },
    TriadClass {
        id: 13,
        code: "120C",
        edges: &[('A', 'B'), ('B', 'C'), ('C', 'B'), ('C', 'A')],
    },
    TriadClass {
        id: 14,
        code: "210",
        edges: &[('A', 'B'), ('B', 'C'), ('C', 'B'), ('C', 'A'), ('A', 'C')],
    },
    TriadClass {
        id: 15,
        code: "300",
        edges: &[('A', 'B'), ('B', 'A'), ('B', 'C'), ('C', 'B'), ('C', 'A'), ('A', 'C')],
    },
];

/// Class ids of the two single-dyad classes
const ASYMMETRIC_DYAD: usize = 1;
const MUTUAL_DYAD: usize = 2;

struct TriadTables {
    /// pattern -> class id
    lookup: [u8; 64],
    /// class id -> template pattern under each permutation
    embeddings: [[u8; 6]; TRIAD_CLASS_COUNT],
}

impl TriadTables {
    fn build() -> Self {
        let mut lookup = [UNCLASSIFIED; 64];
        let mut embeddings = [[0u8; 6]; TRIAD_CLASS_COUNT];

        for (class, class_embeddings) in TRIAD_CLASSES.iter().zip(embeddings.iter_mut()) {
            for (permutation, embedding) in PERMUTATIONS.iter().zip(class_embeddings.iter_mut()) {
                let pattern = template_pattern(class, permutation);
                *embedding = pattern;
                if let Some(entry) = lookup.get_mut(usize::from(pattern)) {
                    *entry = class.id as u8;
                }
            }
        }

        Self { lookup, embeddings }
    }
}

static TABLES: LazyLock<TriadTables> = LazyLock::new(TriadTables::build);

const fn label_position(label: char) -> usize {
    match label {
        'A' => 0,
        'B' => 1,
        _ => 2,
    }
}

/// Bit for the arc `source -> target` between local positions.
#[must_use]
pub fn arc_bit(source: usize, target: usize) -> u8 {
    ARCS.iter()
        .zip(ARC_BITS)
        .find(|&(&arc, _)| arc == (source, target))
        .map_or(0, |(_, bit)| bit)
}

fn template_pattern(class: &TriadClass, permutation: &[usize; 3]) -> u8 {
    let relabel = |label: char| permutation.get(label_position(label)).copied();
    class.edges.iter().fold(0, |pattern, &(source, target)| {
        match (relabel(source), relabel(target)) {
            (Some(s), Some(t)) => pattern | arc_bit(s, t),
            _ => pattern,
        }
    })
}

/// Class id of a 6-bit triad pattern.
#[must_use]
pub fn classify_pattern(pattern: u8) -> usize {
    TABLES
        .lookup
        .get(usize::from(pattern & 0x3F))
        .map_or(0, |&class_id| usize::from(class_id))
}

/// Template patterns of a class under the 6 relabelings.
#[must_use]
pub fn class_embeddings(class_id: usize) -> Option<&'static [u8; 6]> {
    TABLES.embeddings.get(class_id)
}

/// Local arcs `(source, target)` present in a pattern, in [`ARCS`] order.
pub fn pattern_arcs(pattern: u8) -> impl Iterator<Item = (usize, usize)> {
    ARCS.iter()
        .zip(ARC_BITS)
        .filter(move |&(_, bit)| pattern & bit != 0)
        .map(|(&arc, _)| arc)
}

/// Induced pattern of the triple `(a, b, c)` mapped to local positions 0, 1, 2.
#[must_use]
pub fn triple_pattern(index: &AdjacencyIndex, triple: [usize; 3]) -> u8 {
    pattern_of(triple, |source, target| index.has_arc(source, target))
}

/// Pattern of `triple` under an arbitrary arc predicate over node positions.
#[must_use]
pub fn pattern_of<F>(triple: [usize; 3], has_arc: F) -> u8
where
    F: Fn(usize, usize) -> bool,
{
    ARCS.iter()
        .zip(ARC_BITS)
        .filter(|&(&(s, t), _)| match (triple.get(s), triple.get(t)) {
            (Some(&source), Some(&target)) => has_arc(source, target),
            _ => false,
        })
        .fold(0, |pattern, (_, bit)| pattern | bit)
}

/// `C(n, 3)`, saturating at `u64::MAX`.
#[must_use]
pub fn choose3(n: usize) -> u64 {
    if n < 3 {
        return 0;
    }
    let n = n as u128;
    n.checked_mul(n.saturating_sub(1))
        .and_then(|pairs| pairs.checked_mul(n.saturating_sub(2)))
        .and_then(|ordered| u64::try_from(ordered / 6).ok())
        .unwrap_or(u64::MAX)
}

/// Occurrence counts per triad class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriadCensus {
    counts: [u64; TRIAD_CLASS_COUNT],
    total: u64,
}

/// One census row as exposed on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotifCount {
    pub id: usize,
    pub code: &'static str,
    pub count: u64,
    pub probability: f64,
    pub edges: Vec<[char; 2]>,
}

impl TriadCensus {
    /// Build a census from raw counts; the total is their sum.
    #[must_use]
    pub fn from_counts(counts: [u64; TRIAD_CLASS_COUNT]) -> Self {
        let total = counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
        Self { counts, total }
    }

    #[must_use]
    pub const fn counts(&self) -> &[u64; TRIAD_CLASS_COUNT] {
        &self.counts
    }

    /// Count for one class id (0 for unknown ids)
    #[must_use]
    pub fn count(&self, class_id: usize) -> u64 {
        self.counts.get(class_id).copied().unwrap_or(0)
    }

    /// Number of triples examined
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// `count / total`, 0 when the census is empty
    #[must_use]
    pub fn probability(&self, class_id: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(class_id) as f64 / self.total as f64
    }

    #[must_use]
    pub fn probabilities(&self) -> [f64; TRIAD_CLASS_COUNT] {
        std::array::from_fn(|class_id| self.probability(class_id))
    }

    /// Rows for every class in id order
    pub fn entries(&self) -> impl Iterator<Item = MotifCount> + '_ {
        TRIAD_CLASSES.iter().map(|class| MotifCount {
            id: class.id,
            code: class.code,
            count: self.count(class.id),
            probability: self.probability(class.id),
            edges: class.edges.iter().map(|&(s, t)| [s, t]).collect(),
        })
    }
}

/// Compute the triad census of `graph`.
///
/// # Examples
///
/// ```
/// use netmotif_graph::{DirectedGraph, triad_census};
///
/// let graph = DirectedGraph::from_parts(
///     ["a", "b", "c"].map(String::from),
///     [("a".to_string(), "b".to_string())],
/// ).unwrap();
///
/// let census = triad_census(&graph);
/// assert_eq!(census.total(), 1);
/// assert_eq!(census.count(1), 1); // 012
/// ```
#[must_use]
pub fn triad_census(graph: &DirectedGraph) -> TriadCensus {
    triad_census_with_index(&AdjacencyIndex::build(graph))
}

/// Compute the triad census from a prebuilt adjacency index.
#[must_use]
pub fn triad_census_with_index(index: &AdjacencyIndex) -> TriadCensus {
    let n = index.node_count();
    let total = choose3(n);
    let mut counts = [0u64; TRIAD_CLASS_COUNT];
    if total == 0 {
        return TriadCensus::from_counts(counts);
    }

    let mut union = Vec::new();
    for v in 0..n {
        let v_neighbors = index.neighbors(v);

        for &u in v_neighbors.iter().filter(|&&u| u > v) {
            merge_neighborhoods(v_neighbors, index.neighbors(u), v, u, &mut union);

            // Triads where only the dyad (v, u) is connected
            let dyad = if index.has_arc(v, u) && index.has_arc(u, v) {
                MUTUAL_DYAD
            } else {
                ASYMMETRIC_DYAD
            };
            let isolated_thirds = n.saturating_sub(union.len().saturating_add(2)) as u64;
            add_count(&mut counts, dyad, isolated_thirds);

            for &w in &union {
                if u < w || (v < w && w < u && !index.is_adjacent(v, w)) {
                    let class_id = classify_pattern(triple_pattern(index, [v, u, w]));
                    add_count(&mut counts, class_id, 1);
                }
            }
        }
    }

    let connected = counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c));
    add_count(&mut counts, 0, total.saturating_sub(connected));
    TriadCensus::from_counts(counts)
}

/// Census by enumerating every triple; O(n^3), used for verification.
#[must_use]
pub fn triad_census_exhaustive(index: &AdjacencyIndex) -> TriadCensus {
    let mut counts = [0u64; TRIAD_CLASS_COUNT];
    for (a, b, c) in (0..index.node_count()).tuple_combinations() {
        let class_id = classify_pattern(triple_pattern(index, [a, b, c]));
        add_count(&mut counts, class_id, 1);
    }
    TriadCensus::from_counts(counts)
}

fn add_count(counts: &mut [u64; TRIAD_CLASS_COUNT], class_id: usize, by: u64) {
    if let Some(count) = counts.get_mut(class_id) {
        *count = count.saturating_add(by);
    }
}

/// Sorted union of two sorted neighbor lists, without `v` and `u`.
fn merge_neighborhoods(left: &[usize], right: &[usize], v: usize, u: usize, out: &mut Vec<usize>) {
    out.clear();
    out.extend(
        left.iter()
            .merge(right.iter())
            .dedup()
            .copied()
            .filter(|&w| w != v && w != u),
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;

    fn index_from_edges(n: usize, edges: &[(usize, usize)]) -> AdjacencyIndex {
        let mut graph = DirectedGraph::with_numbered_nodes(n);
        for &(a, b) in edges {
            graph.add_edge_between(a, b).unwrap();
        }
        AdjacencyIndex::build(&graph)
    }

    #[test]
    fn test_lookup_covers_every_pattern() {
        for pattern in 0u8..64 {
            assert!(
                classify_pattern(pattern) < TRIAD_CLASS_COUNT,
                "pattern {pattern:#08b} unclassified"
            );
        }
    }

    #[test]
    fn test_every_template_maps_to_its_own_class_under_all_relabelings() {
        for class in &TRIAD_CLASSES {
            let embeddings = class_embeddings(class.id).unwrap();
            for &pattern in embeddings {
                assert_eq!(classify_pattern(pattern), class.id, "class {}", class.code);
                assert_eq!(pattern.count_ones() as usize, class.edges.len());
            }
        }
    }

    #[test]
    fn test_class_sizes_partition_all_patterns() {
        // Orbit sizes of the 16 classes add up to 2^6
        let mut sizes = [0usize; TRIAD_CLASS_COUNT];
        for pattern in 0u8..64 {
            sizes[classify_pattern(pattern)] += 1;
        }
        assert_eq!(sizes.iter().sum::<usize>(), 64);
        assert_eq!(sizes[0], 1);
        assert_eq!(sizes[15], 1);
        assert_eq!(sizes[1], 6);
        assert_eq!(sizes[9], 2);
    }

    #[test]
    fn test_pattern_arcs_roundtrip_bits() {
        let pattern = arc_bit(0, 1) | arc_bit(2, 1);
        let arcs: Vec<_> = pattern_arcs(pattern).collect();
        assert_eq!(arcs, vec![(0, 1), (2, 1)]);
        assert_eq!(classify_pattern(pattern), 5); // 021U
    }

    #[test]
    fn test_census_of_small_graphs_is_empty() {
        for n in 0..3 {
            let census = triad_census_with_index(&index_from_edges(n, &[]));
            assert_eq!(census.total(), 0);
            assert!(census.counts().iter().all(|&c| c == 0));
            assert_eq!(census.probability(0), 0.0);
        }
    }

    #[test]
    fn test_census_of_edgeless_graph() {
        let census = triad_census_with_index(&index_from_edges(5, &[]));
        assert_eq!(census.total(), 10);
        assert_eq!(census.count(0), 10);
    }

    #[test]
    fn test_census_of_single_templates() {
        for class in &TRIAD_CLASSES {
            let edges: Vec<_> = class
                .edges
                .iter()
                .map(|&(s, t)| (label_position(s), label_position(t)))
                .collect();
            let census = triad_census_with_index(&index_from_edges(3, &edges));
            assert_eq!(census.total(), 1);
            assert_eq!(census.count(class.id), 1, "template {}", class.code);
        }
    }

    #[test]
    fn test_census_counts_one_dyad_triads_arithmetically() {
        // 0->1 among 5 nodes: three triads of class 012, the rest empty
        let census = triad_census_with_index(&index_from_edges(5, &[(0, 1)]));
        assert_eq!(census.count(1), 3);
        assert_eq!(census.count(0), 7);
        assert_eq!(census.total(), 10);
    }

    #[test]
    fn test_census_ignores_loops_and_multiplicity() {
        let plain = triad_census_with_index(&index_from_edges(4, &[(0, 1), (1, 2)]));
        let noisy = triad_census_with_index(&index_from_edges(
            4,
            &[(0, 1), (0, 1), (1, 2), (2, 2), (3, 3)],
        ));
        assert_eq!(plain, noisy);
    }

    #[test]
    fn test_fast_census_matches_exhaustive() {
        let edges = [
            (0, 1),
            (1, 0),
            (1, 2),
            (2, 3),
            (3, 1),
            (4, 0),
            (4, 2),
            (5, 4),
            (2, 5),
            (5, 2),
            (6, 6),
        ];
        let index = index_from_edges(8, &edges);
        assert_eq!(
            triad_census_with_index(&index),
            triad_census_exhaustive(&index)
        );
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let index = index_from_edges(6, &[(0, 1), (1, 2), (2, 0), (3, 4)]);
        let census = triad_census_with_index(&index);
        let sum: f64 = census.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(census.entries().count(), TRIAD_CLASS_COUNT);
    }

    #[test]
    fn test_choose3() {
        assert_eq!(choose3(2), 0);
        assert_eq!(choose3(3), 1);
        assert_eq!(choose3(20), 1140);
        assert_eq!(choose3(usize::MAX), u64::MAX);
    }

    #[test]
    fn test_pattern_of_ignores_positions_outside_the_triple() {
        let pattern = pattern_of([7, 8, 9], |s, t| (s, t) == (7, 9) || (s, t) == (1, 2));
        assert_eq!(pattern, arc_bit(0, 2));
    }
}

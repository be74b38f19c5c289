//! # Netmotif Graph
//!
//! Directed graph model and the analysis engine built on it: structural
//! metrics, the 16-class triad census and random graph generation.
//!
//! Every computation takes a graph snapshot by reference and builds its
//! own [`AdjacencyIndex`]; nothing here holds shared state.

#![forbid(unsafe_code)]

pub use netmotif_core::{Error, Result};

pub mod adjacency;
pub mod edgelist;
pub mod generator;
pub mod graph;
pub mod metrics;
pub mod sample;
pub mod tarjan;
pub mod triad;

pub use adjacency::AdjacencyIndex;
pub use edgelist::{parse_edge_list, write_edge_list};
pub use generator::{
    GenerationStrategy, GeneratorConfig, GraphGenerator, ParallelEdgePolicy, Progress,
    ProgressObserver, SelfLoopPolicy, Silent,
};
pub use graph::{DirectedGraph, EdgeData, GraphData, NodeData, NodeId};
pub use metrics::{MetricsReport, compute_metrics, compute_metrics_with_index};
pub use sample::sample_graph;
pub use tarjan::strongly_connected_components;
pub use triad::{
    MotifCount, TRIAD_CLASS_COUNT, TRIAD_CLASSES, TriadCensus, TriadClass, choose3, triad_census,
    triad_census_exhaustive, triad_census_with_index,
};

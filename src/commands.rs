//! CLI command handlers.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use netmotif_graph::{
    DirectedGraph, GeneratorConfig, GraphData, GraphGenerator, MetricsReport, MotifCount, Progress,
    compute_metrics, parse_edge_list, triad_census, write_edge_list,
};
use serde::Serialize;
use tokio::signal;
use tracing::{debug, error, info};

use crate::cli::{Commands, OutputFormat, StrategyArg};

/// Metrics and census of one graph, as printed by `analyze`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub metrics: MetricsReport,
    pub total_motifs: u64,
    pub motifs: Vec<MotifCount>,
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands) -> Result<()> {
    match command {
        Commands::Serve { config, bind } => cmd_serve(config, bind).await,
        Commands::Analyze { input } => cmd_analyze(&input),
        Commands::Census { input } => cmd_census(&input),
        Commands::Generate {
            input,
            output,
            seed,
            strategy,
            format,
        } => cmd_generate(&input, output.as_deref(), seed, strategy, format),
    }
}

async fn cmd_serve(config: Option<PathBuf>, bind: Option<String>) -> Result<()> {
    let mut config = match &config {
        Some(path) => netmotif_web::Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => netmotif_web::Config::default(),
    }
    .with_env_overrides();
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }

    info!("Netmotif API starting on {}", config.server.bind_address);
    tokio::select! {
        result = netmotif_web::serve(config) => result.context("server failed"),
        () = wait_for_shutdown() => {
            info!("Netmotif stopped");
            Ok(())
        }
    }
}

fn cmd_analyze(input: &Path) -> Result<()> {
    let graph = load_graph(input)?;
    let report = analyze(&graph);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_census(input: &Path) -> Result<()> {
    let graph = load_graph(input)?;
    let census = triad_census(&graph);
    for row in census.entries() {
        println!("{:>2} {:<5} {:>12} {:.6}", row.id, row.code, row.count, row.probability);
    }
    println!("total {}", census.total());
    Ok(())
}

fn cmd_generate(
    input: &Path,
    output: Option<&Path>,
    seed: Option<u64>,
    strategy: StrategyArg,
    format: OutputFormat,
) -> Result<()> {
    let original = load_graph(input)?;
    let config = GeneratorConfig::default()
        .with_seed(seed)
        .with_strategy(strategy.into());
    let generator = GraphGenerator::new(config);

    let mut observer = |progress: Progress| -> ControlFlow<()> {
        debug!(current = progress.current, total = progress.total, "Generating");
        ControlFlow::Continue(())
    };
    let generated = generator
        .generate(&original, &mut observer)
        .context("generation failed")?;
    let text = render(&generated, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(
                nodes = generated.node_count(),
                edges = generated.edge_count(),
                "Wrote {}",
                path.display()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Read and parse an edge-list file.
pub fn load_graph(path: &Path) -> Result<DirectedGraph> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_edge_list(&text).with_context(|| format!("invalid edge list {}", path.display()))
}

pub fn analyze(graph: &DirectedGraph) -> AnalysisReport {
    let census = triad_census(graph);
    AnalysisReport {
        metrics: compute_metrics(graph),
        total_motifs: census.total(),
        motifs: census.entries().collect(),
    }
}

/// Serialize a graph in the requested output format.
pub fn render(graph: &DirectedGraph, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => Ok(write_edge_list(graph)?),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&GraphData::from(graph))?),
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn wait_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(err) => {
            error!("Failed to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    #![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

    use super::*;
    use std::io::Write;

    fn edge_list_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_analyze_four_node_graph() {
        let file = edge_list_file("A B\nB C\nC A\nA C\nD\n");
        let graph = load_graph(file.path()).unwrap();
        let report = analyze(&graph);

        assert_eq!(report.metrics.num_nodes, 4);
        assert_eq!(report.metrics.num_edges, 4);
        assert_eq!(report.total_motifs, 4);
        assert_eq!(report.motifs.len(), 16);
    }

    #[test]
    fn test_load_graph_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        let err = load_graph(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn test_generate_writes_output_file() {
        let file = edge_list_file("a b\nb c\nc a\n");
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");

        cmd_generate(
            file.path(),
            Some(&out),
            Some(9),
            StrategyArg::Uniform,
            OutputFormat::Txt,
        )
        .unwrap();

        let generated = load_graph(&out).unwrap();
        assert_eq!(generated.node_count(), 3);
        assert_eq!(generated.edge_count(), 3);
    }

    #[test]
    fn test_render_json_round_trips_wire_format() {
        let graph = parse_edge_list("x y\n").unwrap();
        let json = render(&graph, OutputFormat::Json).unwrap();
        let data: GraphData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, GraphData::from(&graph));
    }
}

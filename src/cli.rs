//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use netmotif_graph::GenerationStrategy;

/// Netmotif - directed graph metrics, triad census and motif-aware generation
#[derive(Parser, Debug)]
#[command(name = "netmotif")]
#[command(version)]
#[command(about = "Directed graph metrics, triad census and random graph generation")]
#[command(
    long_about = "Netmotif analyzes directed graphs given as edge lists: structural metrics, the 16-class triad census, and random graphs that keep the size or the motif profile of an input. `serve` runs the HTTP/WebSocket API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve {
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to bind, overriding the configuration
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Print structural metrics and the triad census of an edge list
    Analyze {
        /// Edge-list file
        input: PathBuf,
    },

    /// Print only the triad census of an edge list
    Census {
        /// Edge-list file
        input: PathBuf,
    },

    /// Generate a random graph shaped like an edge list
    Generate {
        /// Edge-list file describing the original graph
        input: PathBuf,

        /// Write the generated graph here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Generation strategy
        #[arg(long, value_enum, default_value_t = StrategyArg::Uniform)]
        strategy: StrategyArg,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Txt)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyArg {
    Uniform,
    Multiplet,
}

impl From<StrategyArg> for GenerationStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Uniform => Self::Uniform,
            StrategyArg::Multiplet => Self::Multiplet,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Edge list
    Txt,
    /// `{nodes, edges}` JSON
    Json,
}

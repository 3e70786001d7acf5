// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pathyard CLI - analysis bench for directed weighted graphs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pathyard::report::Palette;
use std::io::IsTerminal;
use std::str::FromStr;

mod commands;

use commands::all_paths::EnumerationArgs;
use commands::config::ConfigAction;
use commands::generate::GraphFormat;
use commands::{GraphArgs, Output};

#[derive(Parser)]
#[command(name = "pathyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "PATHYARD_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random graph and print or save it
    Generate {
        #[command(flatten)]
        graph: GraphArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = GraphFormat::Summary)]
        format: GraphFormat,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Compute connectivity and robustness metrics
    Metrics {
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Run and cross-check the five shortest-path algorithms
    Paths {
        #[command(flatten)]
        graph: GraphArgs,

        /// Source node
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Target node
        #[arg(long)]
        to: usize,

        /// Exit with an error when the algorithms disagree
        #[arg(long)]
        strict: bool,
    },

    /// Enumerate simple paths up to a hop bound
    AllPaths {
        #[command(flatten)]
        graph: GraphArgs,

        /// Source node
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Target node
        #[arg(long)]
        to: usize,

        /// Maximum hop count
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Stop after this many paths
        #[arg(long)]
        limit: Option<usize>,

        /// Time budget in milliseconds (0 for none)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Also print every path
        #[arg(long)]
        list: bool,
    },

    /// Run metrics, shortest paths and enumeration concurrently
    Analyze {
        #[command(flatten)]
        graph: GraphArgs,

        /// Source node
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Target node
        #[arg(long)]
        to: usize,

        /// Maximum hop count of the enumeration
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Stop the enumeration after this many paths
        #[arg(long)]
        limit: Option<usize>,

        /// Enumeration time budget in milliseconds (0 for none)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = pathyard::config::load(cli.config.as_deref())?;

    // Initialize logging
    let configured = tracing::Level::from_str(&config.log_level).unwrap_or(tracing::Level::INFO);
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => configured,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    let output = Output {
        json: cli.json,
        palette: Palette::new(!cli.no_color && std::io::stdout().is_terminal()),
    };

    // Execute command
    match cli.command {
        Commands::Generate { graph, format, output: path } => {
            commands::generate::run(&config, &graph, format, path, output)
        }
        Commands::Metrics { graph } => commands::metrics::run(&config, &graph, output),
        Commands::Paths { graph, from, to, strict } => {
            commands::paths::run(&config, &graph, from, to, strict, output)
        }
        Commands::AllPaths { graph, from, to, max_depth, limit, timeout_ms, list } => {
            let args = EnumerationArgs { max_depth, limit, timeout_ms };
            commands::all_paths::run(&config, &graph, from, to, &args, list, output).await
        }
        Commands::Analyze { graph, from, to, max_depth, limit, timeout_ms } => {
            let args = EnumerationArgs { max_depth, limit, timeout_ms };
            commands::analyze::run(&config, &graph, from, to, &args, output).await
        }
        Commands::Config { action } => {
            commands::config::run(action, &config, cli.config.as_deref())
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}

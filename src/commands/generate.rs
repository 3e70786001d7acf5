// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Generate command - builds a seeded random digraph and prints or saves it

use super::{GraphArgs, Output};
use anyhow::{Context, Result};
use clap::ValueEnum;
use pathyard::config::Config;
use pathyard::report::{self, GraphExport};
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// Rendering of a generated graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GraphFormat {
    /// Summary line only
    #[default]
    Summary,
    /// Summary plus every edge
    Edges,
    /// Graphviz DOT
    Dot,
    /// JSON edge list
    Json,
}

/// Run the generate command
pub fn run(
    config: &Config,
    graph_args: &GraphArgs,
    format: GraphFormat,
    output_path: Option<PathBuf>,
    output: Output,
) -> Result<()> {
    let graph = graph_args.build(config)?;
    let format = if output.json { GraphFormat::Json } else { format };

    let content = match format {
        GraphFormat::Summary => format!("{}\n", report::render_summary(&graph.summary())),
        GraphFormat::Edges => report::render_edges(&graph),
        GraphFormat::Dot => report::render_dot(&graph),
        GraphFormat::Json => format!("{}\n", report::to_json(&GraphExport::new(&graph))?),
    };

    match output_path {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote graph to {}", path.display());
            println!("Wrote {} ({})", path.display(), graph.fingerprint());
        }
        None => print!("{content}"),
    }
    Ok(())
}

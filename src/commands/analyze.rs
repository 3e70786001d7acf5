// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Analyze command - metrics, shortest paths and enumeration in one concurrent run

use super::all_paths::EnumerationArgs;
use super::{GraphArgs, Output};
use anyhow::{Context, Result};
use pathyard::analysis::{self, AnalysisRequest};
use pathyard::config::Config;
use pathyard::report;
use pathyard::types::NodeId;
use std::sync::Arc;
use tracing::info;

/// Run the analyze command
pub async fn run(
    config: &Config,
    graph_args: &GraphArgs,
    source: NodeId,
    target: NodeId,
    args: &EnumerationArgs,
    output: Output,
) -> Result<()> {
    let graph = Arc::new(graph_args.build(config)?);
    let max_depth = args.max_depth(config);

    let request = AnalysisRequest {
        path_limit: args.path_limit(config),
        timeout: args.timeout(config),
        metrics: config.metrics.clone(),
        ..AnalysisRequest::new(source, target, max_depth)
    };
    let outcome = analysis::run(graph, request)
        .await
        .context("Analysis failed")?;
    info!("Analysis finished in {} ms", outcome.elapsed_ms);

    output.emit(&outcome, || {
        report::render_analysis(
            &outcome,
            max_depth,
            config.paths.relative_tolerance,
            output.palette,
        )
    })
}

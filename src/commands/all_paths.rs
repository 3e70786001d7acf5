// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! All-paths command - enumerates depth-bounded simple paths

use super::{GraphArgs, Output};
use anyhow::{Context, Result};
use pathyard::all_paths::AllPathsQuery;
use pathyard::analysis::{self, Enumeration};
use pathyard::config::Config;
use pathyard::report;
use pathyard::types::{GraphSummary, NodeId, Path};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Enumeration flags; unset values fall back to the `[all_paths]` config
#[derive(Debug, Clone, Default)]
pub struct EnumerationArgs {
    /// Maximum hop count
    pub max_depth: Option<usize>,
    /// Stop after this many paths
    pub limit: Option<usize>,
    /// Time budget in milliseconds, 0 for none
    pub timeout_ms: Option<u64>,
}

impl EnumerationArgs {
    pub(crate) fn max_depth(&self, config: &Config) -> usize {
        self.max_depth.unwrap_or(config.all_paths.max_depth)
    }

    pub(crate) fn path_limit(&self, config: &Config) -> Option<usize> {
        self.limit.or(config.all_paths.path_limit)
    }

    pub(crate) fn timeout(&self, config: &Config) -> Option<Duration> {
        match self.timeout_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => config.all_paths.timeout(),
        }
    }
}

#[derive(Serialize)]
struct AllPathsOutput<'a> {
    graph: GraphSummary,
    source: NodeId,
    target: NodeId,
    max_depth: usize,
    #[serde(flatten)]
    enumeration: &'a Enumeration,
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<Vec<Path>>,
}

/// Run the all-paths command
pub async fn run(
    config: &Config,
    graph_args: &GraphArgs,
    source: NodeId,
    target: NodeId,
    args: &EnumerationArgs,
    list: bool,
    output: Output,
) -> Result<()> {
    let graph = Arc::new(graph_args.build(config)?);
    let mut query = AllPathsQuery::new(source, target, args.max_depth(config));
    query.path_limit = args.path_limit(config);
    info!(
        "Enumerating simple paths {} -> {} up to {} hops",
        source, target, query.max_depth
    );

    let budget = args.timeout(config);
    let (enumeration, paths) = if list {
        analysis::enumerate_paths(Arc::clone(&graph), query, budget).await
    } else {
        analysis::enumerate(Arc::clone(&graph), query, budget)
            .await
            .map(|enumeration| (enumeration, None))
    }
    .context("Enumeration failed")?;

    let payload = AllPathsOutput {
        graph: graph.summary(),
        source,
        target,
        max_depth: query.max_depth,
        enumeration: &enumeration,
        paths,
    };
    output.emit(&payload, || {
        let mut text = format!(
            "{}\n\n{}",
            report::render_summary(&payload.graph),
            report::render_all_paths(enumeration.stats(), query.max_depth, output.palette)
        );
        if let Enumeration::TimedOut { budget_ms, .. } = &enumeration {
            text.push_str(&format!(
                "  timed out after {budget_ms} ms, statistics are partial\n"
            ));
        }
        for path in payload.paths.iter().flatten() {
            let nodes: Vec<String> = path.nodes.iter().map(ToString::to_string).collect();
            text.push_str(&format!("  {:.6}  {}\n", path.cost, nodes.join(" -> ")));
        }
        text
    })
}

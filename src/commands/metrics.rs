// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Metrics command - runs the connectivity and robustness battery

use super::{GraphArgs, Output};
use anyhow::Result;
use pathyard::config::Config;
use pathyard::metrics::{self, Metric};
use pathyard::report;
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct MetricsOutput<'a> {
    graph: pathyard::types::GraphSummary,
    #[serde(flatten)]
    report: &'a metrics::MetricsReport,
}

/// Run the metrics command
pub fn run(config: &Config, graph_args: &GraphArgs, output: Output) -> Result<()> {
    let graph = graph_args.build(config)?;
    info!("Computing {} metrics", Metric::ALL.len());

    let battery = metrics::compute(&graph, &config.metrics);
    let unavailable = battery.unavailable_count();
    if unavailable > 0 {
        info!(unavailable, "some metrics are undefined for this graph");
    }

    let payload = MetricsOutput {
        graph: graph.summary(),
        report: &battery,
    };
    output.emit(&payload, || {
        format!(
            "{}\n\n{}",
            report::render_summary(&payload.graph),
            report::render_metrics(&battery, output.palette)
        )
    })
}

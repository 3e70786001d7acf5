// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Paths command - runs all five shortest-path algorithms and cross-checks them

use super::{GraphArgs, Output};
use anyhow::{bail, Context, Result};
use pathyard::config::Config;
use pathyard::paths::{self, SuiteReport};
use pathyard::report;
use pathyard::types::{GraphSummary, NodeId};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct PathsOutput<'a> {
    graph: GraphSummary,
    #[serde(flatten)]
    suite: &'a SuiteReport,
    agreement: Agreement,
}

#[derive(Serialize)]
struct Agreement {
    agree: bool,
    cost: Option<f64>,
    error: Option<String>,
}

/// Run the paths command
///
/// Fails when the algorithms disagree and `strict` is set.
pub fn run(
    config: &Config,
    graph_args: &GraphArgs,
    source: NodeId,
    target: NodeId,
    strict: bool,
    output: Output,
) -> Result<()> {
    let graph = graph_args.build(config)?;
    info!("Shortest paths {} -> {}", source, target);

    let suite = paths::run_suite(&graph, source, target).context("Invalid query")?;
    let tolerance = config.paths.relative_tolerance;
    let verdict = suite.verify_agreement(tolerance);
    if let Err(e) = &verdict {
        warn!(error = %e, "algorithms do not agree");
    }

    let agreement = match &verdict {
        Ok(cost) => Agreement {
            agree: true,
            cost: cost.is_finite().then_some(*cost),
            error: None,
        },
        Err(e) => Agreement {
            agree: false,
            cost: None,
            error: Some(e.to_string()),
        },
    };
    let payload = PathsOutput {
        graph: graph.summary(),
        suite: &suite,
        agreement,
    };
    output.emit(&payload, || {
        format!(
            "{}\n\n{}",
            report::render_summary(&payload.graph),
            report::render_suite(&suite, tolerance, output.palette)
        )
    })?;

    if strict {
        if let Err(e) = verdict {
            bail!("Shortest-path cross-check failed: {e}");
        }
    }
    Ok(())
}

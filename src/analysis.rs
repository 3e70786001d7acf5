// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Concurrent analysis runner
//!
//! The metrics battery, each shortest-path algorithm and the simple-path
//! enumeration only read the graph, so they run as independent blocking
//! tasks sharing one `Arc<WeightedDigraph>`. The enumeration is the only
//! unbounded piece of work; it is raced against a timeout and cancelled
//! through its [`CancelToken`] when the timeout fires.

use crate::all_paths::{
    analyze_with_cancel, list_with_cancel, AllPathsQuery, AllPathsStats, CancelToken,
};
use crate::error::{AllPathsError, AnalysisError};
use crate::graph::WeightedDigraph;
use crate::metrics::{self, MetricsConfig, MetricsReport};
use crate::paths::{log_outcome, Algorithm, SuiteReport};
use crate::types::{GraphSummary, NodeId, Path};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{spawn_blocking, JoinSet};
use tracing::{info, warn};

/// One full analysis of a single `(source, target)` query
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Query source
    pub source: NodeId,
    /// Query target
    pub target: NodeId,
    /// Hop bound of the simple-path enumeration
    pub max_depth: usize,
    /// Optional cap on enumerated paths
    pub path_limit: Option<usize>,
    /// Time budget of the enumeration, `None` for no limit
    pub timeout: Option<Duration>,
    /// Parameters of the metrics battery
    pub metrics: MetricsConfig,
}

impl AnalysisRequest {
    /// Request with default metrics parameters and no limits
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, max_depth: usize) -> Self {
        Self {
            source,
            target,
            max_depth,
            path_limit: None,
            timeout: None,
            metrics: MetricsConfig::default(),
        }
    }

    fn query(&self) -> AllPathsQuery {
        AllPathsQuery {
            source: self.source,
            target: self.target,
            max_depth: self.max_depth,
            path_limit: self.path_limit,
        }
    }
}

/// How the enumeration ended
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Enumeration {
    /// The search finished (or stopped at its path limit)
    Complete {
        /// Final statistics
        stats: AllPathsStats,
    },
    /// The time budget ran out; statistics cover the paths seen so far
    TimedOut {
        /// Statistics gathered before cancellation
        partial: AllPathsStats,
        /// Budget that was exceeded, in milliseconds
        budget_ms: u64,
    },
}

impl Enumeration {
    /// Statistics, complete or partial
    #[must_use]
    pub fn stats(&self) -> &AllPathsStats {
        match self {
            Self::Complete { stats } => stats,
            Self::TimedOut { partial, .. } => partial,
        }
    }
}

/// Everything one analysis produced
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Identity of the analysed graph
    pub graph: GraphSummary,
    /// Metrics battery
    pub metrics: MetricsReport,
    /// Five-way shortest-path results
    pub paths: SuiteReport,
    /// Simple-path enumeration
    pub all_paths: Enumeration,
    /// Wall-clock time of the whole run
    pub elapsed_ms: u64,
}

/// Run metrics, shortest paths and enumeration concurrently
///
/// # Errors
/// `Graph` for an out-of-range source or target (checked before any task
/// starts), `Join` if a worker panicked.
pub async fn run(
    graph: Arc<WeightedDigraph>,
    request: AnalysisRequest,
) -> Result<AnalysisReport, AnalysisError> {
    graph.check_node(request.source)?;
    graph.check_node(request.target)?;
    let started = Instant::now();
    info!(
        source = request.source,
        target = request.target,
        max_depth = request.max_depth,
        "starting analysis"
    );

    let metrics_task = {
        let graph = Arc::clone(&graph);
        let config = request.metrics.clone();
        spawn_blocking(move || metrics::compute(&graph, &config))
    };

    let mut path_tasks = JoinSet::new();
    for algorithm in Algorithm::ALL {
        let graph = Arc::clone(&graph);
        let (source, target) = (request.source, request.target);
        path_tasks.spawn_blocking(move || {
            let outcome = algorithm.run(&graph, source, target);
            log_outcome(algorithm, &outcome);
            (algorithm, outcome)
        });
    }

    let all_paths = enumerate(Arc::clone(&graph), request.query(), request.timeout).await?;

    let mut results = BTreeMap::new();
    while let Some(joined) = path_tasks.join_next().await {
        let (algorithm, outcome) = joined?;
        results.insert(algorithm, outcome);
    }
    let metrics = metrics_task.await?;

    let elapsed_ms = millis(started.elapsed());
    info!(elapsed_ms, "analysis complete");
    Ok(AnalysisReport {
        graph: graph.summary(),
        metrics,
        paths: SuiteReport {
            source: request.source,
            target: request.target,
            results,
        },
        all_paths,
        elapsed_ms,
    })
}

/// Run the enumeration on the blocking pool, cancelling it when `budget`
/// elapses
///
/// # Errors
/// `Graph` for out-of-range nodes, `Join` if the worker panicked.
pub async fn enumerate(
    graph: Arc<WeightedDigraph>,
    query: AllPathsQuery,
    budget: Option<Duration>,
) -> Result<Enumeration, AnalysisError> {
    let outcome = race(budget, move |cancel| {
        analyze_with_cancel(&graph, &query, cancel)
    })
    .await?;
    settle(outcome, budget)
}

/// [`enumerate`] that also returns the paths, gathered by the same timed
/// search. Paths are `None` when the budget ran out.
///
/// # Errors
/// `Graph` for out-of-range nodes, `Join` if the worker panicked.
pub async fn enumerate_paths(
    graph: Arc<WeightedDigraph>,
    query: AllPathsQuery,
    budget: Option<Duration>,
) -> Result<(Enumeration, Option<Vec<Path>>), AnalysisError> {
    let outcome = race(budget, move |cancel| {
        list_with_cancel(&graph, &query, cancel)
    })
    .await?;
    match outcome {
        Ok((stats, paths)) => Ok((Enumeration::Complete { stats }, Some(paths))),
        Err(e) => settle(Err(e), budget).map(|enumeration| (enumeration, None)),
    }
}

/// Run `work` on the blocking pool and trip its token once `budget` elapses
async fn race<T, F>(
    budget: Option<Duration>,
    work: F,
) -> Result<Result<T, AllPathsError>, AnalysisError>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> Result<T, AllPathsError> + Send + 'static,
{
    let cancel = CancelToken::new();
    let mut task = {
        let cancel = cancel.clone();
        spawn_blocking(move || work(&cancel))
    };

    let outcome = match budget {
        None => task.await?,
        Some(budget) => match tokio::time::timeout(budget, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                warn!(budget_ms = millis(budget), "enumeration timed out, cancelling");
                cancel.cancel();
                task.await?
            }
        },
    };
    Ok(outcome)
}

fn settle(
    outcome: Result<AllPathsStats, AllPathsError>,
    budget: Option<Duration>,
) -> Result<Enumeration, AnalysisError> {
    match outcome {
        Ok(stats) => Ok(Enumeration::Complete { stats }),
        Err(AllPathsError::Cancelled { partial }) => Ok(Enumeration::TimedOut {
            partial,
            budget_ms: budget.map_or(0, millis),
        }),
        Err(e) => Err(e.into()),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Depth-bounded enumeration of simple paths between two nodes
//!
//! The number of simple paths grows combinatorially with `max_depth` and
//! graph density, so every search is bounded by depth, can be capped by a
//! path limit and can be cancelled from another thread through a
//! [`CancelToken`].

use crate::error::AllPathsError;
use crate::graph::WeightedDigraph;
use crate::types::{NodeId, Path};
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How often (in DFS steps) the cancel flag is polled
const CANCEL_POLL_INTERVAL: u64 = 256;

/// Parameters of one enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllPathsQuery {
    /// First node of every path
    pub source: NodeId,
    /// Last node of every path
    pub target: NodeId,
    /// Maximum hop count
    pub max_depth: usize,
    /// Stop after this many paths
    pub path_limit: Option<usize>,
}

impl AllPathsQuery {
    /// Unlimited query for paths of at most `max_depth` hops
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, max_depth: usize) -> Self {
        Self {
            source,
            target,
            max_depth,
            path_limit: None,
        }
    }

    /// Cap the number of enumerated paths
    #[must_use]
    pub fn with_path_limit(mut self, limit: usize) -> Self {
        self.path_limit = Some(limit);
        self
    }
}

/// Aggregate statistics over the enumerated paths.
///
/// Averages are `None` when no path was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllPathsStats {
    /// Number of simple paths found
    pub n_paths: usize,
    /// Mean hop count
    pub avg_hops: Option<f64>,
    /// Mean total path weight
    pub avg_total_weight: Option<f64>,
    /// Mean of each path's weight divided by its hop count
    pub avg_weight_per_hop: Option<f64>,
    /// The path limit stopped the search before it was exhausted
    pub truncated: bool,
}

/// Shared flag that asks a running enumeration to stop.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, untripped token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Running sums, folded into [`AllPathsStats`] at the end
#[derive(Debug, Default)]
struct Accumulator {
    n_paths: usize,
    hops: f64,
    weight: f64,
    weight_per_hop: f64,
}

impl Accumulator {
    fn record(&mut self, hops: usize, weight: f64) {
        self.n_paths += 1;
        self.hops += hops as f64;
        self.weight += weight;
        self.weight_per_hop += weight / hops as f64;
    }

    fn finish(&self, truncated: bool) -> AllPathsStats {
        let mean = |sum: f64| (self.n_paths > 0).then(|| sum / self.n_paths as f64);
        AllPathsStats {
            n_paths: self.n_paths,
            avg_hops: mean(self.hops),
            avg_total_weight: mean(self.weight),
            avg_weight_per_hop: mean(self.weight_per_hop),
            truncated,
        }
    }
}

/// How a search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Exhausted,
    Stopped,
    Cancelled,
}

/// Enumerate and summarise every simple path of `query`
///
/// # Errors
/// `Graph` for out-of-range nodes.
pub fn analyze(graph: &WeightedDigraph, query: &AllPathsQuery) -> Result<AllPathsStats, AllPathsError> {
    analyze_with_cancel(graph, query, &CancelToken::new())
}

/// [`analyze`] with a caller-held cancel token
///
/// # Errors
/// `Graph` for out-of-range nodes, `Cancelled` (with the statistics gathered
/// so far) when `cancel` was tripped before the search finished.
pub fn analyze_with_cancel(
    graph: &WeightedDigraph,
    query: &AllPathsQuery,
    cancel: &CancelToken,
) -> Result<AllPathsStats, AllPathsError> {
    summarise(graph, query, cancel, None)
}

/// Statistics and the paths they were computed from, in one cancellable
/// search. Paths come in DFS order (successors by ascending id).
///
/// # Errors
/// As [`analyze_with_cancel`]; the paths seen before cancellation are dropped.
pub fn list_with_cancel(
    graph: &WeightedDigraph,
    query: &AllPathsQuery,
    cancel: &CancelToken,
) -> Result<(AllPathsStats, Vec<Path>), AllPathsError> {
    let mut paths = Vec::new();
    let stats = summarise(graph, query, cancel, Some(&mut paths))?;
    Ok((stats, paths))
}

/// Materialise the paths themselves, in DFS order (successors by ascending id)
///
/// # Errors
/// `Graph` for out-of-range nodes.
pub fn collect_paths(graph: &WeightedDigraph, query: &AllPathsQuery) -> Result<Vec<Path>, AllPathsError> {
    list_with_cancel(graph, query, &CancelToken::new()).map(|(_, paths)| paths)
}

fn summarise(
    graph: &WeightedDigraph,
    query: &AllPathsQuery,
    cancel: &CancelToken,
    mut sink: Option<&mut Vec<Path>>,
) -> Result<AllPathsStats, AllPathsError> {
    let mut acc = Accumulator::default();
    let outcome = search(graph, query, cancel, |path, weight| {
        acc.record(path.len() - 1, weight);
        if let Some(paths) = sink.as_mut() {
            paths.push(Path {
                nodes: path.to_vec(),
                cost: weight,
            });
        }
        limit_reached(query, acc.n_paths)
    })?;

    let stats = acc.finish(outcome == Outcome::Stopped);
    debug!(
        source = query.source,
        target = query.target,
        max_depth = query.max_depth,
        n_paths = stats.n_paths,
        ?outcome,
        "all simple paths"
    );
    match outcome {
        Outcome::Cancelled => Err(AllPathsError::Cancelled { partial: stats }),
        Outcome::Exhausted | Outcome::Stopped => Ok(stats),
    }
}

fn limit_reached(query: &AllPathsQuery, found: usize) -> ControlFlow<()> {
    match query.path_limit {
        Some(limit) if found >= limit => ControlFlow::Break(()),
        _ => ControlFlow::Continue(()),
    }
}

/// Iterative DFS over simple paths of at most `max_depth` hops.
///
/// `visit` receives each complete path and its weight; `Break` stops the
/// search. The target is never expanded, so every reported path ends there.
/// `cancel` is only polled inside the loop; a search that runs to the end
/// is `Exhausted` even if the token was tripped meanwhile.
fn search<F>(
    graph: &WeightedDigraph,
    query: &AllPathsQuery,
    cancel: &CancelToken,
    mut visit: F,
) -> Result<Outcome, AllPathsError>
where
    F: FnMut(&[NodeId], f64) -> ControlFlow<()>,
{
    let AllPathsQuery {
        source,
        target,
        max_depth,
        path_limit,
    } = *query;
    graph.check_node(source)?;
    graph.check_node(target)?;

    if source == target || max_depth == 0 || path_limit == Some(0) {
        return Ok(Outcome::Exhausted);
    }

    let mut on_path = vec![false; graph.node_count()];
    let mut path = vec![source];
    let mut cost = vec![0.0];
    let mut cursor = vec![0_usize];
    on_path[source] = true;

    let mut steps: u64 = 0;
    while let Some(&node) = path.last() {
        steps += 1;
        if steps % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let depth = path.len() - 1;
        let successors = graph.successors(node);
        let next = cursor[depth];

        if depth >= max_depth || next >= successors.len() {
            path.pop();
            cost.pop();
            cursor.pop();
            on_path[node] = false;
            continue;
        }

        cursor[depth] += 1;
        let (neighbor, weight) = successors[next];
        if on_path[neighbor] {
            continue;
        }

        let reached = cost[depth] + weight;
        if neighbor == target {
            path.push(target);
            let flow = visit(&path, reached);
            path.pop();
            if flow.is_break() {
                return Ok(Outcome::Stopped);
            }
            continue;
        }

        path.push(neighbor);
        cost.push(reached);
        cursor.push(0);
        on_path[neighbor] = true;
    }

    Ok(Outcome::Exhausted)
}

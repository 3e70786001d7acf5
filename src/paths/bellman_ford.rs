// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bellman-Ford on the petgraph backing

use super::{walk_predecessors, Algorithm, ShortestPath};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use petgraph::algo::bellman_ford as petgraph_bellman_ford;

/// Minimum-cost path from `source` to `target`, negative weights allowed
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeCycle` when a negative cycle
/// is reachable from `source` (even if it does not lie on a path to `target`).
pub fn bellman_ford(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<ShortestPath, PathError> {
    graph.check_node(source)?;
    graph.check_node(target)?;

    let paths = petgraph_bellman_ford(graph.as_petgraph(), WeightedDigraph::index(source))
        .map_err(|_| PathError::NegativeCycle { from: source })?;

    let cost = paths.distances[target];
    if cost.is_infinite() {
        return Ok(ShortestPath::unreachable());
    }

    let path = walk_predecessors(
        |v| paths.predecessors[v].map(|ix| ix.index()),
        source,
        target,
        graph.node_count(),
        Algorithm::BellmanFord,
    )?;
    Ok(ShortestPath::found(path, cost))
}

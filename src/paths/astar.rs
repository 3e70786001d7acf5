// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! A* through petgraph's generic implementation

use super::{reject_negative_weights, Algorithm, ShortestPath};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use petgraph::algo::astar;

/// A* with a heuristic that always returns 0, which makes it a uniform-cost
/// search equivalent to Dijkstra
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeWeight` if any edge is negative.
pub fn astar_zero_heuristic(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<ShortestPath, PathError> {
    astar_with_heuristic(graph, source, target, |_| 0.0)
}

/// A* with a caller-provided admissible heuristic (estimated remaining cost
/// from a node to `target`)
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeWeight` if any edge is negative.
pub fn astar_with_heuristic<H>(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
    heuristic: H,
) -> Result<ShortestPath, PathError>
where
    H: Fn(NodeId) -> f64,
{
    graph.check_node(source)?;
    graph.check_node(target)?;
    reject_negative_weights(graph, Algorithm::AStar)?;

    let goal = WeightedDigraph::index(target);
    let found = astar(
        graph.as_petgraph(),
        WeightedDigraph::index(source),
        |node| node == goal,
        |edge| *edge.weight(),
        |node| heuristic(node.index()),
    );

    Ok(match found {
        Some((cost, nodes)) => {
            ShortestPath::found(nodes.into_iter().map(|ix| ix.index()).collect(), cost)
        }
        None => ShortestPath::unreachable(),
    })
}

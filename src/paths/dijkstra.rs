// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Dijkstra with a binary heap and predecessor tracking

use super::{reject_negative_weights, walk_predecessors, Algorithm, HeapEntry, ShortestPath};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use std::collections::BinaryHeap;

/// Minimum-cost path from `source` to `target`
///
/// Stops as soon as `target` is settled.
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeWeight` if any edge is negative.
pub fn dijkstra(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<ShortestPath, PathError> {
    graph.check_node(source)?;
    graph.check_node(target)?;
    reject_negative_weights(graph, Algorithm::Dijkstra)?;

    if source == target {
        return Ok(ShortestPath::found(vec![source], 0.0));
    }

    let n = graph.node_count();
    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<NodeId>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut heap = BinaryHeap::new();

    distance[source] = 0.0;
    heap.push(HeapEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(HeapEntry { cost, node }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;

        if node == target {
            break;
        }

        for &(next, weight) in graph.successors(node) {
            let candidate = cost + weight;
            if candidate < distance[next] {
                distance[next] = candidate;
                predecessor[next] = Some(node);
                heap.push(HeapEntry {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }

    if distance[target].is_infinite() {
        return Ok(ShortestPath::unreachable());
    }

    let path = walk_predecessors(|v| predecessor[v], source, target, n, Algorithm::Dijkstra)?;
    Ok(ShortestPath::found(path, distance[target]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_cheaper_longer_route() {
        let graph =
            WeightedDigraph::from_edges(3, [(0, 1, 0.2), (1, 2, 0.3), (0, 2, 0.9)]).unwrap();
        let found = dijkstra(&graph, 0, 2).unwrap();

        assert_eq!(found.path, Some(vec![0, 1, 2]));
        assert!((found.cost - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unreachable_target() {
        let graph = WeightedDigraph::from_edges(3, [(1, 0, 0.2)]).unwrap();
        let found = dijkstra(&graph, 0, 2).unwrap();

        assert_eq!(found, ShortestPath::unreachable());
        assert_eq!(found.hop_count(), None);
    }

    #[test]
    fn test_rejects_negative_weight() {
        let graph = WeightedDigraph::from_edges(3, [(0, 1, 0.2), (1, 2, -0.3)]).unwrap();
        assert!(matches!(
            dijkstra(&graph, 0, 2),
            Err(PathError::NegativeWeight { from: 1, to: 2, .. })
        ));
    }
}

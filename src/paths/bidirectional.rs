// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Bidirectional Dijkstra: a forward search over successors and a backward
//! search over predecessors, meeting in the middle

use super::{reject_negative_weights, walk_predecessors, Algorithm, HeapEntry, ShortestPath};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use std::collections::BinaryHeap;

const FORWARD: usize = 0;
const BACKWARD: usize = 1;

/// One direction of the search
struct Frontier {
    distance: Vec<f64>,
    /// Forward: predecessor towards the source. Backward: successor towards the target.
    link: Vec<Option<NodeId>>,
    settled: Vec<bool>,
    heap: BinaryHeap<HeapEntry>,
}

impl Frontier {
    fn new(n: usize, start: NodeId) -> Self {
        let mut distance = vec![f64::INFINITY; n];
        distance[start] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry {
            cost: 0.0,
            node: start,
        });
        Self {
            distance,
            link: vec![None; n],
            settled: vec![false; n],
            heap,
        }
    }

    /// Smallest tentative cost still queued, `+inf` when exhausted
    fn top(&self) -> f64 {
        self.heap.peek().map_or(f64::INFINITY, |entry| entry.cost)
    }
}

/// Minimum-cost path from `source` to `target`, searching from both ends
///
/// The two searches alternate strictly. Every relaxation that reaches a node
/// already labelled by the other side proposes a meeting point; the search
/// stops once the two heap tops together cannot beat the best meeting.
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeWeight` if any edge is negative.
pub fn bidirectional_dijkstra(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<ShortestPath, PathError> {
    graph.check_node(source)?;
    graph.check_node(target)?;
    reject_negative_weights(graph, Algorithm::BidirectionalDijkstra)?;

    if source == target {
        return Ok(ShortestPath::found(vec![source], 0.0));
    }

    let n = graph.node_count();
    let mut sides = [Frontier::new(n, source), Frontier::new(n, target)];
    let mut best = f64::INFINITY;
    let mut meet: Option<NodeId> = None;
    let mut side = FORWARD;

    loop {
        // An exhausted side has top `+inf`, which also ends the search
        if sides[FORWARD].top() + sides[BACKWARD].top() >= best {
            break;
        }
        if sides[side].heap.is_empty() {
            side = 1 - side;
        }

        let other = 1 - side;
        let Some(HeapEntry { cost, node }) = sides[side].heap.pop() else {
            break;
        };
        if sides[side].settled[node] {
            side = other;
            continue;
        }
        sides[side].settled[node] = true;

        let neighbours = if side == FORWARD {
            graph.successors(node)
        } else {
            graph.predecessors(node)
        };
        for &(next, weight) in neighbours {
            let candidate = cost + weight;
            if candidate < sides[side].distance[next] {
                sides[side].distance[next] = candidate;
                sides[side].link[next] = Some(node);
                sides[side].heap.push(HeapEntry {
                    cost: candidate,
                    node: next,
                });
            }
            let across = sides[other].distance[next];
            if across.is_finite() {
                let total = sides[side].distance[next] + across;
                if total < best {
                    best = total;
                    meet = Some(next);
                }
            }
        }

        side = other;
    }

    let Some(meet) = meet else {
        return Ok(ShortestPath::unreachable());
    };

    let [forward, backward] = &sides;
    let mut path = walk_predecessors(
        |v| forward.link[v],
        source,
        meet,
        n,
        Algorithm::BidirectionalDijkstra,
    )?;
    // Backward links point one hop closer to the target
    let mut current = meet;
    while current != target {
        if path.len() > n {
            return Err(PathError::AlgorithmFailed {
                algorithm: Algorithm::BidirectionalDijkstra.name(),
                reason: "successor chain does not lead to the target".into(),
            });
        }
        current = backward.link[current].ok_or_else(|| PathError::AlgorithmFailed {
            algorithm: Algorithm::BidirectionalDijkstra.name(),
            reason: "successor chain does not lead to the target".into(),
        })?;
        path.push(current);
    }

    Ok(ShortestPath::found(path, best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::dijkstra;

    #[test]
    fn test_meets_in_the_middle() {
        let graph = WeightedDigraph::from_edges(
            5,
            [(0, 1, 0.2), (1, 2, 0.2), (2, 3, 0.2), (3, 4, 0.2), (0, 4, 1.0)],
        )
        .unwrap();
        let found = bidirectional_dijkstra(&graph, 0, 4).unwrap();

        assert_eq!(found.path, Some(vec![0, 1, 2, 3, 4]));
        assert!((found.cost - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_direct_edge_wins_when_cheaper() {
        let graph =
            WeightedDigraph::from_edges(3, [(0, 1, 0.6), (1, 2, 0.6), (0, 2, 0.5)]).unwrap();
        let found = bidirectional_dijkstra(&graph, 0, 2).unwrap();

        assert_eq!(found.path, Some(vec![0, 2]));
        assert!((found.cost - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_respects_edge_direction() {
        let graph = WeightedDigraph::from_edges(3, [(1, 0, 0.1), (2, 1, 0.1)]).unwrap();
        assert_eq!(
            bidirectional_dijkstra(&graph, 0, 2).unwrap(),
            ShortestPath::unreachable()
        );
        let back = bidirectional_dijkstra(&graph, 2, 0).unwrap();
        assert_eq!(back.path, Some(vec![2, 1, 0]));
    }

    #[test]
    fn test_agrees_with_dijkstra_on_denser_graph() {
        let edges = [
            (0, 1, 0.7),
            (0, 2, 0.2),
            (2, 1, 0.3),
            (1, 3, 0.1),
            (2, 4, 0.9),
            (3, 4, 0.2),
            (4, 5, 0.4),
            (3, 5, 0.8),
            (5, 0, 0.1),
        ];
        let graph = WeightedDigraph::from_edges(6, edges).unwrap();

        for s in graph.nodes() {
            for t in graph.nodes() {
                let a = dijkstra(&graph, s, t).unwrap();
                let b = bidirectional_dijkstra(&graph, s, t).unwrap();
                assert!(
                    (a.cost - b.cost).abs() < 1e-12 || (a.cost.is_infinite() && b.cost.is_infinite()),
                    "{s} -> {t}: {} vs {}",
                    a.cost,
                    b.cost
                );
            }
        }
    }
}

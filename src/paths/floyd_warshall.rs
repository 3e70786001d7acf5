// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Floyd-Warshall all-pairs distances with predecessor reconstruction

use super::{walk_predecessors, Algorithm, ShortestPath};
use crate::error::PathError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use tracing::debug;

/// All-pairs distance and predecessor tables, row-major `n × n`
#[derive(Debug, Clone)]
pub struct AllPairs {
    n: usize,
    distance: Vec<f64>,
    /// `predecessor[s][v]` is the node before `v` on the best `s -> v` path
    predecessor: Vec<Option<NodeId>>,
}

impl AllPairs {
    /// Run Floyd-Warshall over the whole graph, O(n³)
    #[must_use]
    pub fn compute(graph: &WeightedDigraph) -> Self {
        let n = graph.node_count();
        let mut distance = vec![f64::INFINITY; n * n];
        let mut predecessor = vec![None; n * n];

        for v in 0..n {
            distance[v * n + v] = 0.0;
        }
        for edge in graph.edges() {
            let cell = edge.source * n + edge.target;
            distance[cell] = edge.weight;
            predecessor[cell] = Some(edge.source);
        }

        for k in 0..n {
            for i in 0..n {
                let through = distance[i * n + k];
                if through.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = through + distance[k * n + j];
                    if candidate < distance[i * n + j] {
                        distance[i * n + j] = candidate;
                        predecessor[i * n + j] = predecessor[k * n + j];
                    }
                }
            }
        }

        debug!(nodes = n, "floyd-warshall tables computed");
        Self {
            n,
            distance,
            predecessor,
        }
    }

    /// Number of nodes covered by the tables
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.n
    }

    /// Shortest distance `source -> target`, `+inf` when unreachable
    #[must_use]
    pub fn distance(&self, source: NodeId, target: NodeId) -> f64 {
        self.distance[source * self.n + target]
    }

    /// Check whether a node on a negative cycle is reachable from `source`
    #[must_use]
    pub fn negative_cycle_from(&self, source: NodeId) -> bool {
        (0..self.n).any(|k| self.distance(source, k).is_finite() && self.distance(k, k) < 0.0)
    }

    /// Reconstruct the best `source -> target` path
    ///
    /// # Errors
    /// `NodeOutOfRange` for unknown nodes, `NegativeCycle` when a negative
    /// cycle is reachable from `source`.
    pub fn path(&self, source: NodeId, target: NodeId) -> Result<ShortestPath, PathError> {
        for node in [source, target] {
            if node >= self.n {
                return Err(crate::error::GraphError::NodeOutOfRange {
                    node,
                    nodes: self.n,
                }
                .into());
            }
        }
        if self.negative_cycle_from(source) {
            return Err(PathError::NegativeCycle { from: source });
        }
        if source == target {
            return Ok(ShortestPath::found(vec![source], 0.0));
        }

        let cost = self.distance(source, target);
        // Reachability is decided here, never by the predecessor walk
        if cost.is_infinite() {
            return Ok(ShortestPath::unreachable());
        }

        let row = source * self.n;
        let path = walk_predecessors(
            |v| self.predecessor[row + v],
            source,
            target,
            self.n,
            Algorithm::FloydWarshall,
        )?;
        Ok(ShortestPath::found(path, cost))
    }
}

/// Single-pair query answered from the all-pairs tables
///
/// # Errors
/// `NodeOutOfRange` for unknown nodes, `NegativeCycle` when a negative cycle
/// is reachable from `source`.
pub fn floyd_warshall(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<ShortestPath, PathError> {
    graph.check_node(source)?;
    graph.check_node(target)?;
    AllPairs::compute(graph).path(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> WeightedDigraph {
        WeightedDigraph::from_edges(3, [(0, 1, 0.3), (1, 2, 0.3), (0, 2, 0.9), (2, 0, 0.1)])
            .unwrap()
    }

    #[test]
    fn test_all_pairs_distances() {
        let tables = AllPairs::compute(&triangle());

        assert!((tables.distance(0, 2) - 0.6).abs() < 1e-12);
        assert!((tables.distance(2, 1) - 0.4).abs() < 1e-12);
        assert!((tables.distance(1, 0) - 0.4).abs() < 1e-12);
        assert_eq!(tables.distance(1, 1), 0.0);
    }

    #[test]
    fn test_reconstructs_path() {
        let found = floyd_warshall(&triangle(), 1, 0).unwrap();
        assert_eq!(found.path, Some(vec![1, 2, 0]));
    }

    #[test]
    fn test_same_node_terminates_immediately() {
        let found = floyd_warshall(&triangle(), 2, 2).unwrap();
        assert_eq!(found.path, Some(vec![2]));
        assert_eq!(found.cost, 0.0);
    }

    #[test]
    fn test_unreachable_target_is_guarded() {
        let graph = WeightedDigraph::from_edges(3, [(0, 1, 0.5), (1, 0, 0.5)]).unwrap();
        let found = floyd_warshall(&graph, 0, 2).unwrap();
        assert_eq!(found, ShortestPath::unreachable());
    }

    #[test]
    fn test_negative_cycle_only_when_reachable() {
        let graph =
            WeightedDigraph::from_edges(4, [(0, 1, 0.5), (2, 3, -1.0), (3, 2, 0.5)]).unwrap();
        let tables = AllPairs::compute(&graph);

        assert!(tables.path(0, 1).is_ok());
        assert_eq!(tables.path(2, 3), Err(PathError::NegativeCycle { from: 2 }));
    }
}

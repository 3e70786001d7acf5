// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Single-pair shortest paths, computed five ways and cross-checked
//!
//! | Algorithm | Complexity | Negative weights |
//! |-----------|------------|------------------|
//! | Dijkstra | O((n + m) log n) | rejected |
//! | Bellman-Ford | O(n·m) | allowed, negative cycles signalled |
//! | A* (zero heuristic) | O((n + m) log n) | rejected |
//! | Floyd-Warshall | O(n³) | allowed, negative cycles signalled |
//! | Bidirectional Dijkstra | O((n + m) log n) | rejected |
//!
//! Tie-break: when several paths share the minimum cost, Dijkstra and the
//! bidirectional search settle the lower node id first among equal tentative
//! costs and only replace a predecessor on a strictly smaller cost. Bellman-Ford,
//! A* and Floyd-Warshall keep whichever predecessor their relaxation order finds
//! first, so equal-cost paths may differ between algorithms. Costs never do.

mod astar;
mod bellman_ford;
mod bidirectional;
mod dijkstra;
mod floyd_warshall;

pub use astar::{astar_with_heuristic, astar_zero_heuristic};
pub use bellman_ford::bellman_ford;
pub use bidirectional::bidirectional_dijkstra;
pub use dijkstra::dijkstra;
pub use floyd_warshall::{floyd_warshall, AllPairs};

use crate::error::{GraphError, PathError};
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Default relative tolerance for comparing costs across algorithms
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-9;

/// The five shortest-path algorithms of the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Binary-heap Dijkstra
    Dijkstra,
    /// Bellman-Ford (petgraph)
    BellmanFord,
    /// Generic A* (petgraph) with the zero heuristic
    AStar,
    /// All-pairs Floyd-Warshall with predecessor reconstruction
    FloydWarshall,
    /// Dijkstra expanding from both ends
    BidirectionalDijkstra,
}

impl Algorithm {
    /// Every algorithm, in reporting order
    pub const ALL: [Self; 5] = [
        Self::Dijkstra,
        Self::BellmanFord,
        Self::AStar,
        Self::FloydWarshall,
        Self::BidirectionalDijkstra,
    ];

    /// Stable name used in reports
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::BellmanFord => "bellman_ford",
            Self::AStar => "a_star",
            Self::FloydWarshall => "floyd_warshall",
            Self::BidirectionalDijkstra => "bidirectional_dijkstra",
        }
    }

    /// Run this algorithm for one `(source, target)` pair
    ///
    /// # Errors
    /// Out-of-range nodes, negative weights (Dijkstra family) or negative
    /// cycles (Bellman-Ford, Floyd-Warshall).
    pub fn run(
        self,
        graph: &WeightedDigraph,
        source: NodeId,
        target: NodeId,
    ) -> Result<ShortestPath, PathError> {
        match self {
            Self::Dijkstra => dijkstra(graph, source, target),
            Self::BellmanFord => bellman_ford(graph, source, target),
            Self::AStar => astar_zero_heuristic(graph, source, target),
            Self::FloydWarshall => floyd_warshall(graph, source, target),
            Self::BidirectionalDijkstra => bidirectional_dijkstra(graph, source, target),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of one algorithm: a minimum-cost path, or no path at infinite cost
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Node sequence from source to target, `None` when unreachable
    pub path: Option<Vec<NodeId>>,
    /// Total weight, `+inf` when unreachable
    pub cost: f64,
}

impl ShortestPath {
    /// A path that was found
    #[must_use]
    pub fn found(path: Vec<NodeId>, cost: f64) -> Self {
        Self {
            path: Some(path),
            cost,
        }
    }

    /// The "no path" outcome
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            path: None,
            cost: f64::INFINITY,
        }
    }

    /// Check whether a path exists
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.path.is_some()
    }

    /// Number of edges on the path
    #[must_use]
    pub fn hop_count(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }
}

impl Serialize for ShortestPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ShortestPath", 3)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("cost", &self.cost.is_finite().then_some(self.cost))?;
        state.serialize_field("hop_count", &self.hop_count())?;
        state.end()
    }
}

/// Outcome of all five algorithms for one query
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Query source
    pub source: NodeId,
    /// Query target
    pub target: NodeId,
    /// Per-algorithm outcome
    pub results: BTreeMap<Algorithm, Result<ShortestPath, PathError>>,
}

impl SuiteReport {
    /// Outcome of a single algorithm
    #[must_use]
    pub fn get(&self, algorithm: Algorithm) -> Option<&Result<ShortestPath, PathError>> {
        self.results.get(&algorithm)
    }

    /// Check that every algorithm succeeded and reported the same cost
    ///
    /// Returns the agreed cost, `+inf` when all agree there is no path.
    ///
    /// # Errors
    /// `AlgorithmFailed` for the first failing algorithm, `CostMismatch` for
    /// the first cost outside `relative_tolerance` of Dijkstra's.
    pub fn verify_agreement(&self, relative_tolerance: f64) -> Result<f64, PathError> {
        let mut reference: Option<f64> = None;

        for (algorithm, outcome) in &self.results {
            let found = outcome.as_ref().map_err(|e| PathError::AlgorithmFailed {
                algorithm: algorithm.name(),
                reason: e.to_string(),
            })?;

            match reference {
                None => reference = Some(found.cost),
                Some(expected) if !costs_agree(expected, found.cost, relative_tolerance) => {
                    return Err(PathError::CostMismatch {
                        algorithm: algorithm.name(),
                        expected,
                        actual: found.cost,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(reference.unwrap_or(f64::INFINITY))
    }
}

impl Serialize for SuiteReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Failure {
            error: String,
        }

        struct Results<'a>(&'a BTreeMap<Algorithm, Result<ShortestPath, PathError>>);

        impl Serialize for Results<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (algorithm, outcome) in self.0 {
                    match outcome {
                        Ok(path) => map.serialize_entry(algorithm.name(), path)?,
                        Err(e) => map.serialize_entry(
                            algorithm.name(),
                            &Failure {
                                error: e.to_string(),
                            },
                        )?,
                    }
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("SuiteReport", 3)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("results", &Results(&self.results))?;
        state.end()
    }
}

/// Run every algorithm of the suite on one query
///
/// # Errors
/// `NodeOutOfRange` for an invalid source or target, checked before any
/// algorithm runs. Per-algorithm failures are kept inside the report.
pub fn run_suite(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
) -> Result<SuiteReport, GraphError> {
    graph.check_node(source)?;
    graph.check_node(target)?;

    let results = Algorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let outcome = algorithm.run(graph, source, target);
            log_outcome(algorithm, &outcome);
            (algorithm, outcome)
        })
        .collect();

    Ok(SuiteReport {
        source,
        target,
        results,
    })
}

pub(crate) fn log_outcome(algorithm: Algorithm, outcome: &Result<ShortestPath, PathError>) {
    match outcome {
        Ok(found) => debug!(%algorithm, cost = found.cost, hops = ?found.hop_count(), "shortest path"),
        Err(e) => warn!(%algorithm, error = %e, "shortest path failed"),
    }
}

/// Equality within a relative tolerance; two infinities agree
#[must_use]
pub fn costs_agree(a: f64, b: f64, relative_tolerance: f64) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    (a - b).abs() <= relative_tolerance * a.abs().max(b.abs())
}

/// Sum of edge weights along `path`, `None` if a hop is not an edge
#[must_use]
pub fn path_cost(graph: &WeightedDigraph, path: &[NodeId]) -> Option<f64> {
    path.windows(2)
        .map(|pair| graph.edge_weight(pair[0], pair[1]))
        .sum()
}

/// Min-heap entry ordered by cost, then by node id
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct HeapEntry {
    pub(crate) cost: f64,
    pub(crate) node: NodeId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the smallest cost, then the smallest id
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fail fast for algorithms that assume non-negative weights
pub(crate) fn reject_negative_weights(
    graph: &WeightedDigraph,
    algorithm: Algorithm,
) -> Result<(), PathError> {
    match graph.negative_edge() {
        Some(edge) => Err(PathError::NegativeWeight {
            algorithm: algorithm.name(),
            from: edge.source,
            to: edge.target,
            weight: edge.weight,
        }),
        None => Ok(()),
    }
}

/// Walk predecessor links from `target` back to `source`.
/// Bounded by the node count so a corrupt chain cannot loop.
pub(crate) fn walk_predecessors(
    predecessor: impl Fn(NodeId) -> Option<NodeId>,
    source: NodeId,
    target: NodeId,
    node_count: usize,
    algorithm: Algorithm,
) -> Result<Vec<NodeId>, PathError> {
    let mut path = vec![target];
    let mut current = target;

    while current != source {
        if path.len() > node_count {
            return Err(broken_chain(algorithm));
        }
        current = predecessor(current).ok_or_else(|| broken_chain(algorithm))?;
        path.push(current);
    }

    path.reverse();
    Ok(path)
}

fn broken_chain(algorithm: Algorithm) -> PathError {
    PathError::AlgorithmFailed {
        algorithm: algorithm.name(),
        reason: "predecessor chain does not lead back to the source".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    /// Two equal-cost routes 0-1-3 and 0-2-3, plus a dearer direct edge
    fn diamond() -> WeightedDigraph {
        WeightedDigraph::from_edges(
            4,
            [(0, 1, 0.5), (0, 2, 0.5), (1, 3, 0.5), (2, 3, 0.5), (0, 3, 1.5)],
        )
        .unwrap()
    }

    #[test]
    fn test_heap_pops_cheapest_then_lowest_id() {
        let mut heap = BinaryHeap::new();
        heap.push(HeapEntry { cost: 2.0, node: 0 });
        heap.push(HeapEntry { cost: 1.0, node: 5 });
        heap.push(HeapEntry { cost: 1.0, node: 3 });

        assert_eq!(heap.pop().unwrap().node, 3);
        assert_eq!(heap.pop().unwrap().node, 5);
        assert_eq!(heap.pop().unwrap().node, 0);
    }

    #[test]
    fn test_suite_agrees_on_tied_paths() {
        let graph = diamond();
        let report = run_suite(&graph, 0, 3).unwrap();

        assert_eq!(report.results.len(), 5);
        let cost = report.verify_agreement(DEFAULT_RELATIVE_TOLERANCE).unwrap();
        assert!((cost - 1.0).abs() < 1e-12);

        for outcome in report.results.values() {
            let found = outcome.as_ref().unwrap();
            let path = found.path.as_ref().unwrap();
            assert_eq!(found.hop_count(), Some(2));
            assert_eq!(path_cost(&graph, path), Some(found.cost));
        }
    }

    #[test]
    fn test_dijkstra_tie_break_prefers_lower_id() {
        let found = dijkstra(&diamond(), 0, 3).unwrap();
        assert_eq!(found.path, Some(vec![0, 1, 3]));
    }

    #[test]
    fn test_run_suite_rejects_bad_nodes() {
        let graph = diamond();
        assert!(matches!(
            run_suite(&graph, 0, 9),
            Err(GraphError::NodeOutOfRange { node: 9, .. })
        ));
    }

    #[test]
    fn test_source_equals_target() {
        let graph = diamond();
        let report = run_suite(&graph, 2, 2).unwrap();
        for outcome in report.results.values() {
            let found = outcome.as_ref().unwrap();
            assert_eq!(found.path, Some(vec![2]));
            assert_eq!(found.cost, 0.0);
            assert_eq!(found.hop_count(), Some(0));
        }
    }

    #[test]
    fn test_costs_agree() {
        assert!(costs_agree(1.0, 1.0 + 1e-12, 1e-9));
        assert!(!costs_agree(1.0, 1.001, 1e-9));
        assert!(costs_agree(f64::INFINITY, f64::INFINITY, 1e-9));
        assert!(!costs_agree(f64::INFINITY, 3.0, 1e-9));
        assert!(costs_agree(0.0, 0.0, 1e-9));
    }

    #[test]
    fn test_verify_agreement_reports_mismatch() {
        let mut report = run_suite(&diamond(), 0, 3).unwrap();
        report
            .results
            .insert(Algorithm::AStar, Ok(ShortestPath::found(vec![0, 3], 1.5)));

        assert!(matches!(
            report.verify_agreement(DEFAULT_RELATIVE_TOLERANCE),
            Err(PathError::CostMismatch { algorithm: "a_star", .. })
        ));
    }

    #[test]
    fn test_shortest_path_json_shape() {
        let none = serde_json::to_value(ShortestPath::unreachable()).unwrap();
        assert_eq!(none["path"], serde_json::Value::Null);
        assert_eq!(none["cost"], serde_json::Value::Null);
        assert_eq!(none["hop_count"], serde_json::Value::Null);

        let some = serde_json::to_value(ShortestPath::found(vec![0, 1], 0.5)).unwrap();
        assert_eq!(some["hop_count"], 1);
        assert_eq!(some["cost"], 0.5);
    }

    #[test]
    fn test_suite_report_json_keys() {
        let report = run_suite(&diamond(), 0, 3).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        for algorithm in Algorithm::ALL {
            assert!(json["results"].get(algorithm.name()).is_some());
        }
    }
}

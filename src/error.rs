// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Error types for graph construction, path search and metrics

use crate::types::NodeId;
use thiserror::Error;

/// Configuration and construction errors. These are fatal at call time and
/// are raised before any computation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A node id outside `[0, N)`
    #[error("node {node} is out of range for a graph with {nodes} nodes")]
    NodeOutOfRange {
        /// Offending node id
        node: NodeId,
        /// Node count of the graph
        nodes: usize,
    },

    /// An edge from a node to itself
    #[error("self-loop on node {0} is not allowed")]
    SelfLoop(NodeId),

    /// A second edge for an ordered pair that already has one
    #[error("duplicate edge {from} -> {to}")]
    DuplicateEdge {
        /// Edge source
        from: NodeId,
        /// Edge target
        to: NodeId,
    },

    /// NaN or infinite weight
    #[error("edge {from} -> {to} has non-finite weight {weight}")]
    InvalidWeight {
        /// Edge source
        from: NodeId,
        /// Edge target
        to: NodeId,
        /// Rejected weight
        weight: f64,
    },

    /// `degree_max` larger than `N - 1`
    #[error("degree_max {degree_max} exceeds N-1 = {limit}")]
    DegreeExceedsNodes {
        /// Requested maximum out-degree
        degree_max: usize,
        /// Largest admissible out-degree
        limit: usize,
    },

    /// `degree_min > degree_max`
    #[error("degree_min {degree_min} is larger than degree_max {degree_max}")]
    InvalidDegreeRange {
        /// Requested minimum out-degree
        degree_min: usize,
        /// Requested maximum out-degree
        degree_max: usize,
    },

    /// Weight range that is not `0 <= low < high` with finite bounds
    #[error("invalid weight range ({low}, {high}]")]
    InvalidWeightRange {
        /// Lower (exclusive) bound
        low: f64,
        /// Upper (inclusive) bound
        high: f64,
    },

    /// More rounding digits than an `f64` weight can hold
    #[error("precision {precision} exceeds the maximum of {max} digits")]
    InvalidPrecision {
        /// Requested decimal digits
        precision: u32,
        /// Largest supported value
        max: u32,
    },
}

/// Errors raised by the shortest-path algorithms.
///
/// An unreachable target is not an error; it is reported as a
/// [`ShortestPath`](crate::paths::ShortestPath) with infinite cost.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    /// Invalid query (bad node id)
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A negative-weight cycle is reachable from the source
    #[error("negative cycle reachable from node {from}")]
    NegativeCycle {
        /// Query source
        from: NodeId,
    },

    /// The algorithm needs non-negative weights
    #[error("{algorithm} requires non-negative weights, edge {from} -> {to} has {weight}")]
    NegativeWeight {
        /// Algorithm that refused the graph
        algorithm: &'static str,
        /// Edge source
        from: NodeId,
        /// Edge target
        to: NodeId,
        /// Offending weight
        weight: f64,
    },

    /// Two algorithms disagree on the minimum cost
    #[error("{algorithm} reported cost {actual}, expected {expected}")]
    CostMismatch {
        /// Algorithm whose cost differs from the reference
        algorithm: &'static str,
        /// Reference cost
        expected: f64,
        /// Reported cost
        actual: f64,
    },

    /// An algorithm failed, so agreement cannot be checked
    #[error("{algorithm} failed: {reason}")]
    AlgorithmFailed {
        /// Failing algorithm
        algorithm: &'static str,
        /// Failure description
        reason: String,
    },
}

/// Why a single metric could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricError {
    /// The graph has no nodes
    #[error("graph is empty")]
    EmptyGraph,

    /// The graph is not (weakly) connected
    #[error("graph is disconnected")]
    Disconnected,

    /// Not enough nodes for the metric to be defined
    #[error("needs at least {needed} nodes, found {found}")]
    TooFewNodes {
        /// Minimum node count
        needed: usize,
        /// Actual node count
        found: usize,
    },

    /// Not enough edges for the metric to be defined
    #[error("needs at least {needed} edges, found {found}")]
    TooFewEdges {
        /// Minimum edge count
        needed: usize,
        /// Actual edge count
        found: usize,
    },

    /// A correlation over a constant sequence
    #[error("zero variance in {0}")]
    ZeroVariance(&'static str),

    /// Power iteration did not converge
    #[error("did not converge within {iterations} iterations")]
    NotConverged {
        /// Iteration cap that was reached
        iterations: usize,
    },

    /// Invalid algorithm parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The computation produced NaN or an infinity
    #[error("result is not finite")]
    NonFinite,
}

/// Errors raised by the simple-path enumeration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllPathsError {
    /// Invalid query (bad node id)
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The caller cancelled the search
    #[error("enumeration cancelled after {} paths", partial.n_paths)]
    Cancelled {
        /// Statistics gathered before cancellation
        partial: crate::all_paths::AllPathsStats,
    },
}

/// Errors raised by the concurrent analysis runner.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid query
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Enumeration failed for a reason other than the timeout
    #[error(transparent)]
    AllPaths(#[from] AllPathsError),

    /// A worker task panicked or was aborted
    #[error("analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

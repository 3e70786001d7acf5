// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Pathyard library - analysis engine for directed weighted graphs
//!
//! This crate builds seeded random digraphs and analyses them with a fail-soft
//! battery of robustness metrics, five cross-checked shortest-path algorithms
//! and a depth-bounded enumeration of simple paths.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod all_paths;
pub mod analysis;
pub mod config;
pub mod error;
pub mod generator;
pub mod graph;
pub mod metrics;
pub mod paths;
pub mod report;

/// Core data types shared by every component
pub mod types {
    use serde::{Deserialize, Serialize};

    /// Node identifier in `[0, N)`
    pub type NodeId = usize;

    // =========================================================================
    // Edge
    // =========================================================================

    /// Directed, weighted edge
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Edge {
        /// Tail of the edge
        pub source: NodeId,
        /// Head of the edge
        pub target: NodeId,
        /// Traversal cost
        pub weight: f64,
    }

    impl Edge {
        /// Create a new edge
        #[must_use]
        pub fn new(source: NodeId, target: NodeId, weight: f64) -> Self {
            Self { source, target, weight }
        }
    }

    impl From<(NodeId, NodeId, f64)> for Edge {
        fn from((source, target, weight): (NodeId, NodeId, f64)) -> Self {
            Self::new(source, target, weight)
        }
    }

    // =========================================================================
    // Path
    // =========================================================================

    /// A walk through the graph with its accumulated weight
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Path {
        /// Visited nodes, source first
        pub nodes: Vec<NodeId>,
        /// Sum of traversed edge weights
        pub cost: f64,
    }

    impl Path {
        /// Number of traversed edges
        #[must_use]
        pub fn hop_count(&self) -> usize {
            self.nodes.len().saturating_sub(1)
        }

        /// First node of the path
        #[must_use]
        pub fn source(&self) -> Option<NodeId> {
            self.nodes.first().copied()
        }

        /// Last node of the path
        #[must_use]
        pub fn target(&self) -> Option<NodeId> {
            self.nodes.last().copied()
        }
    }

    // =========================================================================
    // Graph summary
    // =========================================================================

    /// Identity card of a graph, attached to every report
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GraphSummary {
        /// Number of nodes
        pub nodes: usize,
        /// Number of edges
        pub edges: usize,
        /// Content hash of the edge list: graph:<hex>
        pub fingerprint: String,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::all_paths::{AllPathsQuery, AllPathsStats, CancelToken};
    pub use crate::error::{AllPathsError, GraphError, MetricError, PathError};
    pub use crate::generator::GeneratorConfig;
    pub use crate::graph::{GraphBuilder, WeightedDigraph};
    pub use crate::metrics::{Metric, MetricValue, MetricsConfig, MetricsReport};
    pub use crate::paths::{Algorithm, ShortestPath, SuiteReport};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}

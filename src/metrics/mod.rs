// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Connectivity and robustness metrics
//!
//! Every metric is computed independently. A metric that cannot be computed
//! on a given graph (too small, disconnected, no convergence) is recorded as
//! [`MetricValue::Unavailable`] and never stops the rest of the battery, so a
//! [`MetricsReport`] always holds a value for every [`Metric`].

pub mod centrality;
pub mod community;
pub mod connectivity;
pub mod structure;

use crate::error::MetricError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

// =============================================================================
// Metric names
// =============================================================================

/// Every statistic the battery reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// `|E| / (N(N-1))` from the adjacency count
    AdjacencyDensity,
    /// Directed graph density, 0 for graphs with fewer than two nodes
    DirectedDensity,
    /// Mean in-degree
    AvgInDegree,
    /// Mean out-degree
    AvgOutDegree,
    /// Number of strongly connected components
    SccCount,
    /// Size of the largest strongly connected component
    LargestSccSize,
    /// Number of weakly connected components
    WeakComponentCount,
    /// Mean hop distance inside the largest strongly connected component
    AvgShortestPathLength,
    /// Global clustering coefficient of the undirected projection
    Transitivity,
    /// Mean normalized betweenness
    AvgBetweenness,
    /// Mean directed closeness
    AvgCloseness,
    /// Standard deviation of eigenvector centrality
    EigenvectorStd,
    /// Shannon entropy (bits) of the PageRank distribution
    PagerankEntropy,
    /// Out-degree/in-degree assortativity over edges
    DegreeAssortativity,
    /// Minimum vertex cut
    NodeConnectivity,
    /// Standard deviation of Katz centrality
    KatzStd,
    /// Number of Louvain communities
    CommunityCount,
    /// Size of the largest Louvain community
    LargestCommunitySize,
    /// Modularity of the Louvain partition
    Modularity,
}

impl Metric {
    /// Every metric, in reporting order
    pub const ALL: [Self; 19] = [
        Self::AdjacencyDensity,
        Self::DirectedDensity,
        Self::AvgInDegree,
        Self::AvgOutDegree,
        Self::SccCount,
        Self::LargestSccSize,
        Self::WeakComponentCount,
        Self::AvgShortestPathLength,
        Self::Transitivity,
        Self::AvgBetweenness,
        Self::AvgCloseness,
        Self::EigenvectorStd,
        Self::PagerankEntropy,
        Self::DegreeAssortativity,
        Self::NodeConnectivity,
        Self::KatzStd,
        Self::CommunityCount,
        Self::LargestCommunitySize,
        Self::Modularity,
    ];

    /// Stable name used in reports and on the command line
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AdjacencyDensity => "adjacency_density",
            Self::DirectedDensity => "directed_density",
            Self::AvgInDegree => "avg_in_degree",
            Self::AvgOutDegree => "avg_out_degree",
            Self::SccCount => "scc_count",
            Self::LargestSccSize => "largest_scc_size",
            Self::WeakComponentCount => "weak_component_count",
            Self::AvgShortestPathLength => "avg_shortest_path_length",
            Self::Transitivity => "transitivity",
            Self::AvgBetweenness => "avg_betweenness",
            Self::AvgCloseness => "avg_closeness",
            Self::EigenvectorStd => "eigenvector_std",
            Self::PagerankEntropy => "pagerank_entropy",
            Self::DegreeAssortativity => "degree_assortativity",
            Self::NodeConnectivity => "node_connectivity",
            Self::KatzStd => "katz_std",
            Self::CommunityCount => "community_count",
            Self::LargestCommunitySize => "largest_community_size",
            Self::Modularity => "modularity",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| MetricError::InvalidParameter(format!("unknown metric '{s}'")))
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// =============================================================================
// Values
// =============================================================================

/// Outcome of one metric
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Real-valued statistic
    Number(f64),
    /// Integer statistic (counts and sizes)
    Count(usize),
    /// The metric is undefined on this graph
    Unavailable(MetricError),
}

impl MetricValue {
    /// Numeric view of an available value
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(x) => Some(*x),
            Self::Count(n) => Some(*n as f64),
            Self::Unavailable(_) => None,
        }
    }

    /// Check whether the metric was computed
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

impl From<f64> for MetricValue {
    fn from(x: f64) -> Self {
        Self::Number(x)
    }
}

impl From<usize> for MetricValue {
    fn from(n: usize) -> Self {
        Self::Count(n)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{x:.6}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Unavailable(reason) => write!(f, "unavailable ({reason})"),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(x) => serializer.serialize_f64(*x),
            Self::Count(n) => serializer.serialize_u64(*n as u64),
            Self::Unavailable(reason) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("unavailable", &reason.to_string())?;
                map.end()
            }
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Parameters of the iterative and seeded metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// PageRank damping factor
    pub pagerank_alpha: f64,
    /// PageRank iteration cap
    pub pagerank_max_iter: usize,
    /// PageRank per-node convergence tolerance
    pub pagerank_tol: f64,
    /// Katz attenuation factor
    pub katz_alpha: f64,
    /// Katz bias
    pub katz_beta: f64,
    /// Katz iteration cap
    pub katz_max_iter: usize,
    /// Katz per-node convergence tolerance
    pub katz_tol: f64,
    /// Eigenvector iteration cap
    pub eigenvector_max_iter: usize,
    /// Eigenvector per-node convergence tolerance
    pub eigenvector_tol: f64,
    /// Seed of the Louvain node shuffle
    pub louvain_seed: u64,
    /// Louvain resolution (`1.0` is classic modularity)
    pub louvain_resolution: f64,
    /// Minimum modularity gain for Louvain to start another level
    pub louvain_threshold: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            pagerank_alpha: 0.85,
            pagerank_max_iter: 100,
            pagerank_tol: 1e-6,
            katz_alpha: 0.1,
            katz_beta: 1.0,
            katz_max_iter: 1000,
            katz_tol: 1e-6,
            eigenvector_max_iter: 100,
            eigenvector_tol: 1e-6,
            louvain_seed: 42,
            louvain_resolution: 1.0,
            louvain_threshold: 1e-7,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Complete result set of one battery run
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    values: BTreeMap<Metric, MetricValue>,
    communities: Option<Vec<Vec<NodeId>>>,
}

impl MetricsReport {
    /// Value of one metric
    #[must_use]
    pub fn get(&self, metric: Metric) -> &MetricValue {
        static MISSING: MetricValue = MetricValue::Unavailable(MetricError::EmptyGraph);
        // Every key is inserted by `compute`
        self.values.get(&metric).unwrap_or(&MISSING)
    }

    /// All metrics in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricValue)> {
        self.values.iter().map(|(m, v)| (*m, v))
    }

    /// Louvain partition, when community detection succeeded
    #[must_use]
    pub fn communities(&self) -> Option<&[Vec<NodeId>]> {
        self.communities.as_deref()
    }

    /// Number of metrics that could not be computed
    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.values.values().filter(|v| !v.is_available()).count()
    }
}

impl Serialize for MetricsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("metrics", &self.values)?;
        map.serialize_entry("communities", &self.communities)?;
        map.end()
    }
}

/// The single place where per-metric failures become `Unavailable`
#[derive(Default)]
struct Battery {
    values: BTreeMap<Metric, MetricValue>,
}

impl Battery {
    fn record<T: Into<MetricValue>>(&mut self, metric: Metric, outcome: Result<T, MetricError>) {
        let value = match outcome.map(Into::into) {
            Ok(MetricValue::Number(x)) if !x.is_finite() => MetricValue::Unavailable(MetricError::NonFinite),
            Ok(value) => value,
            Err(e) => MetricValue::Unavailable(e),
        };
        match &value {
            MetricValue::Unavailable(reason) => warn!(%metric, %reason, "metric unavailable"),
            available => debug!(%metric, value = %available, "metric computed"),
        }
        self.values.insert(metric, value);
    }
}

/// Run the whole battery
#[must_use]
pub fn compute(graph: &WeightedDigraph, config: &MetricsConfig) -> MetricsReport {
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "computing metrics"
    );
    let mut battery = Battery::default();
    let projection = graph.undirected_projection();

    battery.record(Metric::AdjacencyDensity, structure::adjacency_density(graph));
    battery.record(Metric::DirectedDensity, Ok(structure::directed_density(graph)));
    battery.record(Metric::AvgInDegree, structure::average_in_degree(graph));
    battery.record(Metric::AvgOutDegree, structure::average_out_degree(graph));

    let components = structure::strongly_connected_components(graph);
    battery.record(Metric::SccCount, Ok(components.len()));
    let largest = components.first();
    battery.record(
        Metric::LargestSccSize,
        largest.map(Vec::len).ok_or(MetricError::EmptyGraph),
    );
    battery.record(
        Metric::WeakComponentCount,
        Ok(structure::weak_component_count(graph)),
    );
    battery.record(
        Metric::AvgShortestPathLength,
        largest
            .ok_or(MetricError::EmptyGraph)
            .and_then(|members| graph.induced_subgraph(members).map_err(|_| MetricError::EmptyGraph))
            .and_then(|core| structure::average_shortest_path_length(&core)),
    );
    battery.record(Metric::Transitivity, Ok(structure::transitivity(&projection)));

    battery.record(
        Metric::AvgBetweenness,
        mean(&centrality::betweenness(graph)),
    );
    battery.record(Metric::AvgCloseness, mean(&centrality::closeness(graph)));
    battery.record(
        Metric::EigenvectorStd,
        centrality::eigenvector(
            &projection,
            config.eigenvector_max_iter,
            config.eigenvector_tol,
        )
        .and_then(|scores| population_std(&scores)),
    );
    battery.record(
        Metric::PagerankEntropy,
        centrality::pagerank(
            graph,
            config.pagerank_alpha,
            config.pagerank_max_iter,
            config.pagerank_tol,
        )
        .map(|p| centrality::shannon_entropy(&p)),
    );
    battery.record(
        Metric::DegreeAssortativity,
        structure::degree_assortativity(graph),
    );
    battery.record(
        Metric::NodeConnectivity,
        connectivity::node_connectivity(graph),
    );
    battery.record(
        Metric::KatzStd,
        centrality::katz(
            graph,
            config.katz_alpha,
            config.katz_beta,
            config.katz_max_iter,
            config.katz_tol,
        )
        .and_then(|scores| population_std(&scores)),
    );

    let partition = community::louvain(
        &projection,
        config.louvain_seed,
        config.louvain_resolution,
        config.louvain_threshold,
    );
    battery.record(
        Metric::CommunityCount,
        partition.as_ref().map(Vec::len).map_err(Clone::clone),
    );
    battery.record(
        Metric::LargestCommunitySize,
        partition
            .as_ref()
            .map_err(Clone::clone)
            .map(|p| p.iter().map(Vec::len).max().unwrap_or(0)),
    );
    battery.record(
        Metric::Modularity,
        partition
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|p| community::modularity(&projection, p, config.louvain_resolution)),
    );

    let report = MetricsReport {
        values: battery.values,
        communities: partition.ok(),
    };
    info!(
        unavailable = report.unavailable_count(),
        "metrics complete"
    );
    report
}

/// Arithmetic mean
///
/// # Errors
/// `EmptyGraph` for an empty slice.
pub fn mean(values: &[f64]) -> Result<f64, MetricError> {
    if values.is_empty() {
        return Err(MetricError::EmptyGraph);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
///
/// # Errors
/// `EmptyGraph` for an empty slice.
pub fn population_std(values: &[f64]) -> Result<f64, MetricError> {
    let mu = mean(values)?;
    let variance = values.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

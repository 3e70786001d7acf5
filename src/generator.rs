// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Random digraph generation with bounded out-degree

use crate::error::GraphError;
use crate::graph::{GraphBuilder, WeightedDigraph};
use crate::types::NodeId;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most decimal digits a generated weight is rounded to
pub const MAX_PRECISION: u32 = 15;

/// Parameters of the random graph generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of nodes `N`
    pub nodes: usize,
    /// Smallest out-degree drawn for a node
    pub degree_min: usize,
    /// Largest out-degree drawn for a node, at most `N - 1`
    pub degree_max: usize,
    /// Weights are drawn from `(weight_min, weight_max]`
    pub weight_min: f64,
    /// Upper (inclusive) weight bound
    pub weight_max: f64,
    /// Decimal digits kept after rounding a weight
    pub precision: u32,
    /// Seed of the random source
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            nodes: 50,
            degree_min: 2,
            degree_max: 5,
            weight_min: 0.1,
            weight_max: 1.0,
            precision: 3,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    /// Config for `nodes` nodes with out-degrees in `[degree_min, degree_max]`
    #[must_use]
    pub fn new(nodes: usize, degree_min: usize, degree_max: usize, seed: u64) -> Self {
        Self {
            nodes,
            degree_min,
            degree_max,
            seed,
            ..Self::default()
        }
    }

    /// Check the configuration before any drawing happens
    ///
    /// # Errors
    /// `DegreeExceedsNodes`, `InvalidDegreeRange`, `InvalidWeightRange` or
    /// `InvalidPrecision`.
    pub fn validate(&self) -> Result<(), GraphError> {
        let limit = self.nodes.saturating_sub(1);
        if self.degree_max > limit {
            return Err(GraphError::DegreeExceedsNodes {
                degree_max: self.degree_max,
                limit,
            });
        }
        if self.degree_min > self.degree_max {
            return Err(GraphError::InvalidDegreeRange {
                degree_min: self.degree_min,
                degree_max: self.degree_max,
            });
        }
        let (low, high) = (self.weight_min, self.weight_max);
        if !(low.is_finite() && high.is_finite() && low >= 0.0 && low < high) {
            return Err(GraphError::InvalidWeightRange { low, high });
        }
        if self.precision > MAX_PRECISION {
            return Err(GraphError::InvalidPrecision {
                precision: self.precision,
                max: MAX_PRECISION,
            });
        }
        Ok(())
    }
}

/// Generate a graph from the config's own seed
///
/// # Errors
/// Configuration errors from [`GeneratorConfig::validate`].
pub fn generate(config: &GeneratorConfig) -> Result<WeightedDigraph, GraphError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    generate_with_rng(config, &mut rng)
}

/// Generate a graph drawing from a caller-supplied random source.
/// `config.seed` is ignored.
///
/// # Errors
/// Configuration errors from [`GeneratorConfig::validate`].
pub fn generate_with_rng<R: Rng>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<WeightedDigraph, GraphError> {
    config.validate()?;

    let n = config.nodes;
    let scale = 10f64.powi(i32::try_from(config.precision).unwrap_or(0));
    let smallest = 1.0 / scale;
    let mut builder = GraphBuilder::new(n);

    for u in 0..n {
        let k = rng.gen_range(config.degree_min..=config.degree_max);
        let candidates: Vec<NodeId> = (0..n).filter(|&v| v != u).collect();

        let targets: Vec<NodeId> = candidates.choose_multiple(rng, k).copied().collect();

        for v in targets {
            let weight = draw_weight(rng, config.weight_min, config.weight_max);
            // Rounding must not push a weight to zero
            let weight = ((weight * scale).round() / scale).max(smallest);
            builder.add_edge(u, v, weight)?;
        }
    }

    let graph = builder.build();
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        seed = config.seed,
        "generated graph"
    );
    Ok(graph)
}

/// Uniform draw from `(low, high]`
fn draw_weight<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    // gen::<f64>() is in [0, 1)
    high - rng.gen::<f64>() * (high - low)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod all_paths;
pub mod analyze;
pub mod completions;
pub mod config;
pub mod generate;
pub mod metrics;
pub mod paths;

use anyhow::{Context, Result};
use clap::Args;
use pathyard::config::Config;
use pathyard::generator::{self, GeneratorConfig};
use pathyard::graph::WeightedDigraph;
use pathyard::report::{self, Palette};
use serde::Serialize;
use tracing::info;

/// Generator flags shared by every command that analyses a graph
#[derive(Debug, Clone, Default, Args)]
pub struct GraphArgs {
    /// Number of nodes
    #[arg(short = 'n', long)]
    pub nodes: Option<usize>,

    /// Minimum out-degree per node
    #[arg(long)]
    pub degree_min: Option<usize>,

    /// Maximum out-degree per node
    #[arg(long)]
    pub degree_max: Option<usize>,

    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl GraphArgs {
    /// Configured generator parameters with the flags applied on top
    #[must_use]
    pub fn resolve(&self, base: &GeneratorConfig) -> GeneratorConfig {
        GeneratorConfig {
            nodes: self.nodes.unwrap_or(base.nodes),
            degree_min: self.degree_min.unwrap_or(base.degree_min),
            degree_max: self.degree_max.unwrap_or(base.degree_max),
            seed: self.seed.unwrap_or(base.seed),
            ..base.clone()
        }
    }

    /// Generate the graph described by the config and flags
    pub fn build(&self, config: &Config) -> Result<WeightedDigraph> {
        let params = self.resolve(&config.generator);
        let graph = generator::generate(&params).context("Invalid generator configuration")?;
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            seed = params.seed,
            "generated graph"
        );
        Ok(graph)
    }
}

/// Where and how results are printed
#[derive(Debug, Clone, Copy)]
pub struct Output {
    /// Emit JSON instead of text
    pub json: bool,
    /// Text styling
    pub palette: Palette,
}

impl Output {
    /// Print `data` as JSON, or the text produced by `text`
    pub fn emit<T: Serialize>(&self, data: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", report::to_json(data)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let base = GeneratorConfig::default();
        let args = GraphArgs {
            nodes: Some(8),
            seed: Some(3),
            ..GraphArgs::default()
        };
        let resolved = args.resolve(&base);

        assert_eq!(resolved.nodes, 8);
        assert_eq!(resolved.seed, 3);
        assert_eq!(resolved.degree_max, base.degree_max);
        assert_eq!(resolved.precision, base.precision);
    }

    #[test]
    fn test_invalid_flags_fail_generation() {
        let args = GraphArgs {
            nodes: Some(3),
            degree_max: Some(5),
            ..GraphArgs::default()
        };
        assert!(args.build(&Config::default()).is_err());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Concrete scenarios on the chain 0 -> 1 -> 2 -> 3 -> 4 with weights 0.5

use pathyard::all_paths::{analyze, AllPathsQuery};
use pathyard::error::MetricError;
use pathyard::graph::WeightedDigraph;
use pathyard::metrics::{self, Metric, MetricValue, MetricsConfig};
use pathyard::paths::{run_suite, Algorithm, DEFAULT_RELATIVE_TOLERANCE};

fn chain() -> WeightedDigraph {
    WeightedDigraph::from_edges(5, (0..4usize).map(|u| (u, u + 1, 0.5))).unwrap()
}

#[test]
fn test_chain_shortest_path_from_every_algorithm() {
    let suite = run_suite(&chain(), 0, 4).unwrap();

    for algorithm in Algorithm::ALL {
        let found = suite.get(algorithm).unwrap().as_ref().unwrap();
        assert!((found.cost - 2.0).abs() < 1e-12, "{algorithm}: {}", found.cost);
        assert_eq!(found.hop_count(), Some(4), "{algorithm}");
        assert_eq!(found.path.as_deref(), Some(&[0, 1, 2, 3, 4][..]));
    }
    let agreed = suite.verify_agreement(DEFAULT_RELATIVE_TOLERANCE).unwrap();
    assert!((agreed - 2.0).abs() < 1e-12);
}

#[test]
fn test_chain_depth_three_finds_nothing() {
    let stats = analyze(&chain(), &AllPathsQuery::new(0, 4, 3)).unwrap();

    assert_eq!(stats.n_paths, 0);
    assert_eq!(stats.avg_hops, None);
    assert_eq!(stats.avg_total_weight, None);
    assert_eq!(stats.avg_weight_per_hop, None);
}

#[test]
fn test_chain_depth_four_finds_the_chain() {
    let stats = analyze(&chain(), &AllPathsQuery::new(0, 4, 4)).unwrap();

    assert_eq!(stats.n_paths, 1);
    assert_eq!(stats.avg_hops, Some(4.0));
    assert!((stats.avg_total_weight.unwrap() - 2.0).abs() < 1e-12);
    assert!((stats.avg_weight_per_hop.unwrap() - 0.5).abs() < 1e-12);
    assert!(!stats.truncated);
}

#[test]
fn test_isolated_target() {
    let isolated = chain().isolate(4).unwrap();
    let suite = run_suite(&isolated, 0, 4).unwrap();

    for algorithm in Algorithm::ALL {
        let found = suite.get(algorithm).unwrap().as_ref().unwrap();
        assert!(found.path.is_none(), "{algorithm} still reaches node 4");
        assert!(found.cost.is_infinite());
    }

    let report = metrics::compute(&isolated, &MetricsConfig::default());
    assert_eq!(
        report.get(Metric::NodeConnectivity),
        &MetricValue::Unavailable(MetricError::Disconnected)
    );
}

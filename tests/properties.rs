// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Property-based tests over randomly generated graphs.
//!
//! - The simple-path count matches petgraph's independent enumeration
//! - All shortest-path algorithms agree
//! - No enumerated path is cheaper than the shortest path

use pathyard::all_paths::{analyze, collect_paths, AllPathsQuery};
use pathyard::generator::{generate, GeneratorConfig};
use pathyard::graph::WeightedDigraph;
use pathyard::paths::{run_suite, Algorithm, DEFAULT_RELATIVE_TOLERANCE};
use petgraph::algo::all_simple_paths;
use proptest::prelude::*;

/// Small generated graphs, parameters always valid
fn arb_config(max_nodes: usize) -> impl Strategy<Value = GeneratorConfig> {
    (2..=max_nodes)
        .prop_flat_map(|nodes| (Just(nodes), 0..nodes, any::<u64>()))
        .prop_flat_map(|(nodes, degree_max, seed)| {
            (Just(nodes), 0..=degree_max, Just(degree_max), Just(seed))
        })
        .prop_map(|(nodes, degree_min, degree_max, seed)| {
            GeneratorConfig::new(nodes, degree_min, degree_max, seed)
        })
}

fn petgraph_count(graph: &WeightedDigraph, source: usize, target: usize, max_depth: usize) -> usize {
    all_simple_paths::<Vec<_>, _>(
        graph.as_petgraph(),
        WeightedDigraph::index(source),
        WeightedDigraph::index(target),
        0,
        Some(max_depth - 1),
    )
    .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn path_count_matches_petgraph(
        config in arb_config(8),
        source in 0usize..8,
        target in 0usize..8,
        max_depth in 1usize..8,
    ) {
        let graph = generate(&config).unwrap();
        let n = graph.node_count();
        let (source, target) = (source % n, target % n);
        prop_assume!(source != target);

        let stats = analyze(&graph, &AllPathsQuery::new(source, target, max_depth)).unwrap();
        let expected = petgraph_count(&graph, source, target, max_depth);
        prop_assert_eq!(
            stats.n_paths, expected,
            "{} -> {} within {} hops on {:?}", source, target, max_depth, config
        );
    }

    #[test]
    fn algorithms_agree(config in arb_config(20), source in 0usize..20, target in 0usize..20) {
        let graph = generate(&config).unwrap();
        let n = graph.node_count();
        let suite = run_suite(&graph, source % n, target % n).unwrap();

        let agreed = suite.verify_agreement(DEFAULT_RELATIVE_TOLERANCE);
        prop_assert!(agreed.is_ok(), "{:?} on {:?}", agreed, config);
        for algorithm in Algorithm::ALL {
            let found = suite.get(algorithm).unwrap().as_ref().unwrap();
            prop_assert_eq!(found.path.is_some(), found.cost.is_finite());
        }
    }

    #[test]
    fn no_enumerated_path_beats_shortest(
        config in arb_config(8),
        source in 0usize..8,
        target in 0usize..8,
    ) {
        let graph = generate(&config).unwrap();
        let n = graph.node_count();
        let (source, target) = (source % n, target % n);
        prop_assume!(source != target);

        let shortest = run_suite(&graph, source, target)
            .unwrap()
            .verify_agreement(DEFAULT_RELATIVE_TOLERANCE)
            .unwrap();
        let paths = collect_paths(&graph, &AllPathsQuery::new(source, target, n - 1)).unwrap();

        // Every simple path fits in N-1 hops, so the optimum is among them
        let cheapest = paths.iter().map(|p| p.cost).fold(f64::INFINITY, f64::min);
        if paths.is_empty() {
            prop_assert!(shortest.is_infinite());
        } else {
            prop_assert!((cheapest - shortest).abs() <= 1e-9 * shortest.max(1.0));
        }
    }
}

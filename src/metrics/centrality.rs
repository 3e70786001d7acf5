// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Centrality measures: betweenness, closeness, eigenvector, PageRank, Katz

use super::structure::bfs_distances;
use crate::error::MetricError;
use crate::graph::{UndirectedProjection, WeightedDigraph};
use std::collections::VecDeque;
use tracing::debug;

/// Normalized betweenness of every node (Brandes, unweighted, directed)
///
/// Scores are scaled by `1 / ((n-1)(n-2))` when `n > 2`.
#[must_use]
pub fn betweenness(graph: &WeightedDigraph) -> Vec<f64> {
    let n = graph.node_count();
    let mut scores = vec![0.0; n];

    for source in graph.nodes() {
        // Nodes in order of non-decreasing distance from `source`
        let mut order = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut sigma = vec![0.0_f64; n];
        let mut distance: Vec<Option<usize>> = vec![None; n];
        sigma[source] = 1.0;
        distance[source] = Some(0);

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            order.push(v);
            let dv = distance[v].unwrap_or_default();
            for &(w, _) in graph.successors(v) {
                if distance[w].is_none() {
                    distance[w] = Some(dv + 1);
                    queue.push_back(w);
                }
                if distance[w] == Some(dv + 1) {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        let mut delta = vec![0.0; n];
        while let Some(w) = order.pop() {
            for &v in &predecessors[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                scores[w] += delta[w];
            }
        }
    }

    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut scores {
            *score *= scale;
        }
    }
    scores
}

/// Directed closeness of every node, computed from incoming distances
///
/// A node reached by `r - 1` others at total distance `d` scores
/// `((r - 1) / d) * ((r - 1) / (n - 1))`, so nodes reached by few others are
/// scaled down rather than excluded.
#[must_use]
pub fn closeness(graph: &WeightedDigraph) -> Vec<f64> {
    let n = graph.node_count();
    graph
        .nodes()
        .map(|u| {
            let reached: Vec<usize> = bfs_distances(graph, u, WeightedDigraph::predecessors)
                .into_iter()
                .flatten()
                .collect();
            let total: usize = reached.iter().sum();
            if total == 0 || n < 2 {
                return 0.0;
            }
            let others = (reached.len() - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}

/// Eigenvector centrality of the undirected projection, by power iteration
/// on `A + I` with L2 normalization
///
/// # Errors
/// `EmptyGraph` without nodes, `NotConverged` when the summed change stays
/// above `n * tol` after `max_iter` iterations.
pub fn eigenvector(
    projection: &UndirectedProjection,
    max_iter: usize,
    tol: f64,
) -> Result<Vec<f64>, MetricError> {
    let n = projection.node_count();
    if n == 0 {
        return Err(MetricError::EmptyGraph);
    }

    let mut x = vec![1.0 / n as f64; n];
    for iteration in 1..=max_iter {
        let last = x.clone();
        for (u, &weight) in last.iter().enumerate() {
            for &(v, _) in projection.neighbors(u) {
                x[v] += weight;
            }
        }
        normalize_l2(&mut x);

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tol {
            debug!(iteration, "eigenvector centrality converged");
            return Ok(x);
        }
    }
    Err(MetricError::NotConverged {
        iterations: max_iter,
    })
}

/// Weighted PageRank with uniform teleportation; dangling nodes spread their
/// mass uniformly
///
/// # Errors
/// `EmptyGraph` without nodes, `InvalidParameter` for a damping factor outside
/// `[0, 1]` or a negative edge weight, `NotConverged` after `max_iter`.
pub fn pagerank(
    graph: &WeightedDigraph,
    alpha: f64,
    max_iter: usize,
    tol: f64,
) -> Result<Vec<f64>, MetricError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(MetricError::EmptyGraph);
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(MetricError::InvalidParameter(format!(
            "damping factor {alpha} outside [0, 1]"
        )));
    }
    if let Some(edge) = graph.negative_edge() {
        return Err(MetricError::InvalidParameter(format!(
            "negative weight on {} -> {}",
            edge.source, edge.target
        )));
    }

    let strength: Vec<f64> = graph
        .nodes()
        .map(|u| graph.successors(u).iter().map(|&(_, w)| w).sum())
        .collect();
    let uniform = 1.0 / n as f64;
    let mut x = vec![uniform; n];

    for iteration in 1..=max_iter {
        let last = std::mem::replace(&mut x, vec![0.0; n]);
        let mut dangling = 0.0;
        for u in graph.nodes() {
            if strength[u] > 0.0 {
                for &(v, w) in graph.successors(u) {
                    x[v] += alpha * last[u] * w / strength[u];
                }
            } else {
                dangling += last[u];
            }
        }
        let spread = alpha * dangling * uniform + (1.0 - alpha) * uniform;
        for value in &mut x {
            *value += spread;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tol {
            debug!(iteration, "pagerank converged");
            return Ok(x);
        }
    }
    Err(MetricError::NotConverged {
        iterations: max_iter,
    })
}

/// Shannon entropy in bits, with `0 log 0 = 0`. Never negative, so a point
/// mass gives `+0.0`.
#[must_use]
pub fn shannon_entropy(distribution: &[f64]) -> f64 {
    let sum = distribution
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>();
    (-sum).max(0.0)
}

/// Katz centrality, `x = alpha * Aᵀ x + beta`, L2-normalized
///
/// # Errors
/// `EmptyGraph` without nodes, `NotConverged` when the summed change stays
/// above `n * tol` after `max_iter` iterations (e.g. `alpha` at or above the
/// reciprocal of the largest eigenvalue).
pub fn katz(
    graph: &WeightedDigraph,
    alpha: f64,
    beta: f64,
    max_iter: usize,
    tol: f64,
) -> Result<Vec<f64>, MetricError> {
    let n = graph.node_count();
    if n == 0 {
        return Err(MetricError::EmptyGraph);
    }

    let mut x = vec![0.0; n];
    for iteration in 1..=max_iter {
        let last = std::mem::replace(&mut x, vec![0.0; n]);
        for u in graph.nodes() {
            for &(v, _) in graph.successors(u) {
                x[v] += last[u];
            }
        }
        for value in &mut x {
            *value = alpha * *value + beta;
        }

        let change: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if change < n as f64 * tol {
            debug!(iteration, "katz centrality converged");
            normalize_l2(&mut x);
            return Ok(x);
        }
    }
    Err(MetricError::NotConverged {
        iterations: max_iter,
    })
}

fn normalize_l2(x: &mut [f64]) {
    let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in x {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> WeightedDigraph {
        WeightedDigraph::from_edges(n, edges.iter().map(|&(u, v)| (u, v, 1.0))).unwrap()
    }

    #[test]
    fn test_betweenness_on_chain() {
        // 0 -> 1 -> 2: node 1 carries the single pair (0, 2)
        let scores = betweenness(&graph(3, &[(0, 1), (1, 2)]));
        assert_eq!(scores[0], 0.0);
        assert!((scores[1] - 0.5).abs() < 1e-12);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_betweenness_splits_equal_paths() {
        // Two shortest routes 0 -> 3, via 1 and via 2
        let scores = betweenness(&graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]));
        assert!((scores[1] - scores[2]).abs() < 1e-12);
        assert!((scores[1] - 0.5 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_closeness_uses_incoming_distance() {
        // Everyone points at 0
        let scores = closeness(&graph(4, &[(1, 0), (2, 0), (3, 0)]));
        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert_eq!(scores[1], 0.0);
    }

    #[test]
    fn test_closeness_scales_partial_reach() {
        // 1 -> 0 only: node 0 is reached by 1 of 2 others at distance 1
        let scores = closeness(&graph(3, &[(1, 0)]));
        assert!((scores[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_eigenvector_symmetric_on_cycle() {
        let projection = graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).undirected_projection();
        let scores = eigenvector(&projection, 100, 1e-6).unwrap();
        for s in &scores {
            assert!((s - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_eigenvector_hub_dominates_star() {
        let projection = graph(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).undirected_projection();
        let scores = eigenvector(&projection, 100, 1e-6).unwrap();
        assert!(scores[1..].iter().all(|&leaf| scores[0] > leaf));
    }

    #[test]
    fn test_eigenvector_reports_non_convergence() {
        let projection = graph(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).undirected_projection();
        assert_eq!(
            eigenvector(&projection, 1, 1e-12),
            Err(MetricError::NotConverged { iterations: 1 })
        );
    }

    #[test]
    fn test_pagerank_sums_to_one() {
        // Node 3 is dangling
        let g = WeightedDigraph::from_edges(
            4,
            [(0, 1, 0.2), (0, 2, 0.8), (1, 2, 0.5), (2, 0, 0.3), (2, 3, 0.1)],
        )
        .unwrap();
        let ranks = pagerank(&g, 0.85, 100, 1e-6).unwrap();
        let total: f64 = ranks.iter().sum();

        assert!((total - 1.0).abs() < 1e-6);
        // The heavier edge sends more mass to 2 than the lighter one sends to 1
        assert!(ranks[2] > ranks[1]);
    }

    #[test]
    fn test_pagerank_rejects_bad_damping() {
        assert!(matches!(
            pagerank(&graph(2, &[(0, 1)]), 1.5, 100, 1e-6),
            Err(MetricError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_entropy() {
        assert!((shannon_entropy(&[0.25; 4]) - 2.0).abs() < 1e-12);
        assert_eq!(shannon_entropy(&[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_point_mass_entropy_is_positive_zero() {
        for distribution in [&[1.0][..], &[0.0, 1.0, 0.0]] {
            let h = shannon_entropy(distribution);
            assert_eq!(h, 0.0);
            assert!(h.is_sign_positive(), "{h} for {distribution:?}");
        }
    }

    #[test]
    fn test_katz_uniform_on_cycle() {
        let scores = katz(&graph(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]), 0.1, 1.0, 1000, 1e-6).unwrap();
        for s in &scores {
            assert!((s - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_katz_diverges_past_spectral_radius() {
        // Complete digraph on 4 nodes has spectral radius 3
        let edges: Vec<(usize, usize)> = (0..4)
            .flat_map(|u| (0..4).filter(move |&v| v != u).map(move |v| (u, v)))
            .collect();
        assert!(matches!(
            katz(&graph(4, &edges), 0.5, 1.0, 1000, 1e-6),
            Err(MetricError::NotConverged { .. })
        ));
    }
}

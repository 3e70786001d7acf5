// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Density, degree, component, distance and mixing statistics

use crate::error::MetricError;
use crate::graph::{UndirectedProjection, WeightedDigraph};
use crate::types::NodeId;
use petgraph::algo::{connected_components, tarjan_scc};
use std::collections::VecDeque;

/// `|E| / (N(N-1))`, counting set entries of the adjacency structure
///
/// # Errors
/// `TooFewNodes` when `N < 2`.
pub fn adjacency_density(graph: &WeightedDigraph) -> Result<f64, MetricError> {
    let n = graph.node_count();
    if n < 2 {
        return Err(MetricError::TooFewNodes { needed: 2, found: n });
    }
    let entries: usize = graph.nodes().map(|u| graph.successors(u).len()).sum();
    Ok(entries as f64 / (n * (n - 1)) as f64)
}

/// Standard directed density, defined as 0 for fewer than two nodes
#[must_use]
pub fn directed_density(graph: &WeightedDigraph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    graph.edge_count() as f64 / (n * (n - 1)) as f64
}

/// Mean in-degree
///
/// # Errors
/// `EmptyGraph` when there are no nodes.
pub fn average_in_degree(graph: &WeightedDigraph) -> Result<f64, MetricError> {
    average(graph, WeightedDigraph::in_degree)
}

/// Mean out-degree
///
/// # Errors
/// `EmptyGraph` when there are no nodes.
pub fn average_out_degree(graph: &WeightedDigraph) -> Result<f64, MetricError> {
    average(graph, WeightedDigraph::out_degree)
}

fn average(
    graph: &WeightedDigraph,
    degree: fn(&WeightedDigraph, NodeId) -> usize,
) -> Result<f64, MetricError> {
    if graph.is_empty() {
        return Err(MetricError::EmptyGraph);
    }
    let total: usize = graph.nodes().map(|u| degree(graph, u)).sum();
    Ok(total as f64 / graph.node_count() as f64)
}

/// Strongly connected components, each sorted by node id, largest first
/// (ties broken by smallest member)
#[must_use]
pub fn strongly_connected_components(graph: &WeightedDigraph) -> Vec<Vec<NodeId>> {
    let mut components: Vec<Vec<NodeId>> = tarjan_scc(graph.as_petgraph())
        .into_iter()
        .map(|component| {
            let mut members: Vec<NodeId> = component.into_iter().map(|ix| ix.index()).collect();
            members.sort_unstable();
            members
        })
        .collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}

/// Number of weakly connected components
#[must_use]
pub fn weak_component_count(graph: &WeightedDigraph) -> usize {
    connected_components(graph.as_petgraph())
}

/// Hop distances from `source` following `next`, `None` when unreachable
pub(crate) fn bfs_distances<'g, F>(graph: &'g WeightedDigraph, source: NodeId, next: F) -> Vec<Option<usize>>
where
    F: Fn(&'g WeightedDigraph, NodeId) -> &'g [(NodeId, f64)],
{
    let mut distance = vec![None; graph.node_count()];
    distance[source] = Some(0);
    let mut queue = VecDeque::from([(source, 0)]);
    while let Some((u, d)) = queue.pop_front() {
        for &(v, _) in next(graph, u) {
            if distance[v].is_none() {
                distance[v] = Some(d + 1);
                queue.push_back((v, d + 1));
            }
        }
    }
    distance
}

/// Mean unweighted distance over all ordered pairs of distinct nodes
///
/// # Errors
/// `TooFewNodes` when `N < 2`, `Disconnected` when some pair is unreachable.
pub fn average_shortest_path_length(graph: &WeightedDigraph) -> Result<f64, MetricError> {
    let n = graph.node_count();
    if n < 2 {
        return Err(MetricError::TooFewNodes { needed: 2, found: n });
    }

    let mut total = 0_usize;
    for source in graph.nodes() {
        for d in bfs_distances(graph, source, WeightedDigraph::successors) {
            total += d.ok_or(MetricError::Disconnected)?;
        }
    }
    Ok(total as f64 / (n * (n - 1)) as f64)
}

/// Global clustering coefficient: closed ordered neighbor pairs over all
/// ordered neighbor pairs
#[must_use]
pub fn transitivity(projection: &UndirectedProjection) -> f64 {
    let mut closed = 0_usize;
    let mut triads = 0_usize;
    for u in 0..projection.node_count() {
        let neighbors = projection.neighbors(u);
        let d = neighbors.len();
        triads += d * d.saturating_sub(1);
        for (i, &(a, _)) in neighbors.iter().enumerate() {
            for &(b, _) in &neighbors[i + 1..] {
                if projection.has_edge(a, b) {
                    closed += 2;
                }
            }
        }
    }
    if closed == 0 {
        0.0
    } else {
        closed as f64 / triads as f64
    }
}

/// Pearson correlation between the out-degree of each edge's source and the
/// in-degree of its target
///
/// # Errors
/// `TooFewEdges` below two edges, `ZeroVariance` when either side is constant.
pub fn degree_assortativity(graph: &WeightedDigraph) -> Result<f64, MetricError> {
    let m = graph.edge_count();
    if m < 2 {
        return Err(MetricError::TooFewEdges { needed: 2, found: m });
    }

    let pairs: Vec<(f64, f64)> = graph
        .edges()
        .map(|e| {
            (
                graph.out_degree(e.source) as f64,
                graph.in_degree(e.target) as f64,
            )
        })
        .collect();
    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / count;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return Err(MetricError::ZeroVariance("degree"));
    }
    Ok(cov / (var_x * var_y).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> WeightedDigraph {
        WeightedDigraph::from_edges(n, edges.iter().map(|&(u, v)| (u, v, 1.0))).unwrap()
    }

    #[test]
    fn test_density() {
        let g = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!((adjacency_density(&g).unwrap() - 0.5).abs() < 1e-12);
        assert!((directed_density(&g) - 0.5).abs() < 1e-12);

        let single = graph(1, &[]);
        assert!(adjacency_density(&single).is_err());
        assert_eq!(directed_density(&single), 0.0);
    }

    #[test]
    fn test_average_degrees_match() {
        let g = graph(4, &[(0, 1), (0, 2), (0, 3), (1, 2)]);
        assert_eq!(average_in_degree(&g).unwrap(), 1.0);
        assert_eq!(average_out_degree(&g).unwrap(), 1.0);
    }

    #[test]
    fn test_scc_ordering() {
        // {0,1,2} cycle, {3,4} cycle, {5} alone
        let g = graph(6, &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 3), (4, 5)]);
        let components = strongly_connected_components(&g);

        assert_eq!(components, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);
        assert_eq!(weak_component_count(&g), 1);
    }

    #[test]
    fn test_weak_components() {
        let g = graph(5, &[(0, 1), (3, 2)]);
        assert_eq!(weak_component_count(&g), 3);
    }

    #[test]
    fn test_average_shortest_path_length() {
        let cycle = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        // Each node reaches the others at distances 1 and 2
        assert!((average_shortest_path_length(&cycle).unwrap() - 1.5).abs() < 1e-12);

        let chain = graph(3, &[(0, 1), (1, 2)]);
        assert_eq!(
            average_shortest_path_length(&chain),
            Err(MetricError::Disconnected)
        );
        assert!(matches!(
            average_shortest_path_length(&graph(1, &[])),
            Err(MetricError::TooFewNodes { needed: 2, found: 1 })
        ));
    }

    #[test]
    fn test_transitivity() {
        // One direction per pair still closes the triangle in the projection
        let triangle = graph(3, &[(0, 1), (1, 2), (2, 0)]);
        assert!((transitivity(&triangle.undirected_projection()) - 1.0).abs() < 1e-12);

        let star = graph(4, &[(0, 1), (0, 2), (0, 3)]);
        assert_eq!(transitivity(&star.undirected_projection()), 0.0);

        // Triangle 0-1-2 plus pendant 3 on node 0: 6 closed of 6 + 2 + 2 + 0
        let paw = graph(4, &[(0, 1), (1, 2), (2, 0), (0, 3)]);
        assert!((transitivity(&paw.undirected_projection()) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_assortativity_disassortative_star() {
        // Hub 0 points at leaves, leaves point back: high out-degree feeds low in-degree
        let g = graph(
            4,
            &[(0, 1), (0, 2), (0, 3), (1, 0), (2, 0), (3, 0), (1, 2)],
        );
        assert!(degree_assortativity(&g).unwrap() < 0.0);
    }

    #[test]
    fn test_assortativity_degenerate() {
        assert!(matches!(
            degree_assortativity(&graph(2, &[(0, 1)])),
            Err(MetricError::TooFewEdges { .. })
        ));
        assert!(matches!(
            degree_assortativity(&graph(3, &[(0, 1), (1, 2), (2, 0)])),
            Err(MetricError::ZeroVariance(_))
        ));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Louvain community detection and modularity on the undirected projection
//!
//! Each level moves nodes (visited in a seeded random order) to the
//! neighboring community with the largest modularity gain until no move
//! helps, then collapses communities into weighted super-nodes with
//! self-loops for their internal weight. Levels continue while modularity
//! improves by more than the threshold.

use crate::error::MetricError;
use crate::graph::UndirectedProjection;
use crate::types::NodeId;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::debug;

/// Weighted undirected graph of one Louvain level
#[derive(Debug, Clone)]
struct Level {
    /// Neighbors other than the node itself, with summed weights
    neighbors: Vec<Vec<(usize, f64)>>,
    /// Weight of the self-loop of each super-node
    self_loop: Vec<f64>,
    /// Original nodes merged into each super-node
    members: Vec<Vec<NodeId>>,
}

impl Level {
    fn from_projection(projection: &UndirectedProjection) -> Self {
        let n = projection.node_count();
        Self {
            neighbors: (0..n).map(|u| projection.neighbors(u).to_vec()).collect(),
            self_loop: vec![0.0; n],
            members: (0..n).map(|u| vec![u]).collect(),
        }
    }

    fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Weighted degree; a self-loop counts twice
    fn degree(&self, u: usize) -> f64 {
        self.neighbors[u].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.self_loop[u]
    }

    /// Total edge weight `m`, each edge once
    fn total_weight(&self) -> f64 {
        (0..self.len()).map(|u| self.degree(u)).sum::<f64>() / 2.0
    }

    /// Modularity of the partition `community[u]`
    fn modularity(&self, community: &[usize], resolution: f64) -> f64 {
        let m = self.total_weight();
        let mut internal: BTreeMap<usize, f64> = BTreeMap::new();
        let mut degree_sum: BTreeMap<usize, f64> = BTreeMap::new();

        for u in 0..self.len() {
            let c = community[u];
            *degree_sum.entry(c).or_default() += self.degree(u);
            *internal.entry(c).or_default() += self.self_loop[u];
            for &(v, w) in &self.neighbors[u] {
                if u < v && community[v] == c {
                    *internal.entry(c).or_default() += w;
                }
            }
        }

        degree_sum
            .iter()
            .map(|(c, &d)| {
                let l = internal.get(c).copied().unwrap_or(0.0);
                l / m - resolution * (d / (2.0 * m)).powi(2)
            })
            .sum()
    }

    /// Local moving phase. Returns each node's community (renumbered densely
    /// in order of first appearance) and whether any node moved.
    fn one_level(&self, m: f64, resolution: f64, rng: &mut ChaCha8Rng) -> (Vec<usize>, bool) {
        let n = self.len();
        let degrees: Vec<f64> = (0..n).map(|u| self.degree(u)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut total: Vec<f64> = degrees.clone();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let two_m_sq = 2.0 * m * m;
        let mut improved = false;
        loop {
            let mut moves = 0;
            for &u in &order {
                let current = community[u];
                let degree = degrees[u];

                // Edge weight from `u` into each neighboring community, in
                // neighbor order
                let mut links: Vec<(usize, f64)> = Vec::new();
                for &(v, w) in &self.neighbors[u] {
                    let c = community[v];
                    match links.iter_mut().find(|(k, _)| *k == c) {
                        Some((_, sum)) => *sum += w,
                        None => links.push((c, w)),
                    }
                }
                let own = links
                    .iter()
                    .find(|(k, _)| *k == current)
                    .map_or(0.0, |&(_, w)| w);

                total[current] -= degree;
                let remove_cost = -own / m + resolution * total[current] * degree / two_m_sq;
                let mut best = current;
                let mut best_gain = 0.0;
                for &(c, w) in &links {
                    let gain = remove_cost + w / m - resolution * total[c] * degree / two_m_sq;
                    if gain > best_gain {
                        best_gain = gain;
                        best = c;
                    }
                }
                total[best] += degree;

                if best != current {
                    community[u] = best;
                    moves += 1;
                    improved = true;
                }
            }
            if moves == 0 {
                break;
            }
        }

        (renumber(&community), improved)
    }

    /// Collapse every community into one super-node
    fn aggregate(&self, community: &[usize]) -> Self {
        let count = community.iter().copied().max().map_or(0, |c| c + 1);
        let mut weights: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); count];
        let mut self_loop = vec![0.0; count];
        let mut members: Vec<Vec<NodeId>> = vec![Vec::new(); count];

        for u in 0..self.len() {
            let cu = community[u];
            members[cu].extend_from_slice(&self.members[u]);
            self_loop[cu] += self.self_loop[u];
            for &(v, w) in &self.neighbors[u] {
                if u >= v {
                    continue;
                }
                let cv = community[v];
                if cu == cv {
                    self_loop[cu] += w;
                } else {
                    *weights[cu].entry(cv).or_default() += w;
                    *weights[cv].entry(cu).or_default() += w;
                }
            }
        }

        Self {
            neighbors: weights.into_iter().map(|row| row.into_iter().collect()).collect(),
            self_loop,
            members,
        }
    }
}

/// Map community labels to `0..k` in order of first appearance
fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut fresh: BTreeMap<usize, usize> = BTreeMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = fresh.len();
            *fresh.entry(label).or_insert(next)
        })
        .collect()
}

/// Louvain communities of the weighted undirected projection
///
/// Deterministic for a given `seed`. Each community is sorted, and
/// communities are ordered by their smallest member. A graph without edges
/// yields one singleton community per node.
///
/// # Errors
/// `EmptyGraph` without nodes, `InvalidParameter` for a non-positive
/// resolution.
pub fn louvain(
    projection: &UndirectedProjection,
    seed: u64,
    resolution: f64,
    threshold: f64,
) -> Result<Vec<Vec<NodeId>>, MetricError> {
    if projection.node_count() == 0 {
        return Err(MetricError::EmptyGraph);
    }
    if resolution <= 0.0 || !resolution.is_finite() {
        return Err(MetricError::InvalidParameter(format!(
            "resolution {resolution} must be positive"
        )));
    }

    let mut level = Level::from_projection(projection);
    let m = level.total_weight();
    if m <= 0.0 {
        return Ok(finish(level.members));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let singletons: Vec<usize> = (0..level.len()).collect();
    let mut quality = level.modularity(&singletons, resolution);
    let mut depth = 0;

    loop {
        let (community, improved) = level.one_level(m, resolution, &mut rng);
        if !improved {
            break;
        }
        let next_quality = level.modularity(&community, resolution);
        let next = level.aggregate(&community);
        depth += 1;
        debug!(depth, communities = next.len(), modularity = next_quality, "louvain level");
        level = next;
        if next_quality - quality <= threshold {
            break;
        }
        quality = next_quality;
    }

    Ok(finish(level.members))
}

fn finish(mut communities: Vec<Vec<NodeId>>) -> Vec<Vec<NodeId>> {
    communities.retain(|c| !c.is_empty());
    for community in &mut communities {
        community.sort_unstable();
    }
    communities.sort_by_key(|c| c[0]);
    communities
}

/// Modularity `Σ_c [L_c / m - γ (d_c / 2m)²]` of a partition of the projection
///
/// # Errors
/// `TooFewEdges` when the projection has no edge weight, `InvalidParameter`
/// when `communities` is not a partition of the nodes.
pub fn modularity(
    projection: &UndirectedProjection,
    communities: &[Vec<NodeId>],
    resolution: f64,
) -> Result<f64, MetricError> {
    let n = projection.node_count();
    let mut label = vec![None; n];
    for (c, community) in communities.iter().enumerate() {
        for &node in community {
            match label.get_mut(node) {
                Some(slot) if slot.is_none() => *slot = Some(c),
                _ => {
                    return Err(MetricError::InvalidParameter(format!(
                        "node {node} is unknown or assigned twice"
                    )))
                }
            }
        }
    }
    let label: Vec<usize> = label
        .into_iter()
        .enumerate()
        .map(|(node, c)| {
            c.ok_or_else(|| MetricError::InvalidParameter(format!("node {node} is unassigned")))
        })
        .collect::<Result<_, _>>()?;

    let level = Level::from_projection(projection);
    if level.total_weight() <= 0.0 {
        return Err(MetricError::TooFewEdges {
            needed: 1,
            found: projection.edge_count(),
        });
    }
    Ok(level.modularity(&label, resolution))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WeightedDigraph;

    /// Two 4-cliques joined by a single light edge
    fn barbell() -> UndirectedProjection {
        let mut edges = Vec::new();
        for block in [0, 4] {
            for u in block..block + 4 {
                for v in u + 1..block + 4 {
                    edges.push((u, v, 1.0));
                }
            }
        }
        edges.push((3, 4, 0.1));
        WeightedDigraph::from_edges(8, edges)
            .unwrap()
            .undirected_projection()
    }

    #[test]
    fn test_finds_the_two_cliques() {
        let communities = louvain(&barbell(), 42, 1.0, 1e-7).unwrap();
        assert_eq!(communities, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let projection = barbell();
        for seed in [1, 7, 99] {
            assert_eq!(
                louvain(&projection, seed, 1.0, 1e-7).unwrap(),
                louvain(&projection, seed, 1.0, 1e-7).unwrap()
            );
        }
    }

    #[test]
    fn test_edgeless_graph_gives_singletons() {
        let projection = WeightedDigraph::from_edges(3, Vec::<(usize, usize, f64)>::new())
            .unwrap()
            .undirected_projection();
        assert_eq!(
            louvain(&projection, 0, 1.0, 1e-7).unwrap(),
            vec![vec![0], vec![1], vec![2]]
        );
        assert!(matches!(
            modularity(&projection, &[vec![0], vec![1], vec![2]], 1.0),
            Err(MetricError::TooFewEdges { .. })
        ));
    }

    #[test]
    fn test_modularity_values() {
        let projection = barbell();
        let split = modularity(&projection, &[vec![0, 1, 2, 3], vec![4, 5, 6, 7]], 1.0).unwrap();
        let whole = modularity(&projection, &[(0..8).collect()], 1.0).unwrap();

        assert!(whole.abs() < 1e-12);
        assert!(split > 0.45 && split < 0.5);
    }

    #[test]
    fn test_modularity_rejects_non_partition() {
        let projection = barbell();
        assert!(modularity(&projection, &[vec![0, 1]], 1.0).is_err());
        assert!(modularity(&projection, &[(0..8).collect(), vec![3]], 1.0).is_err());
    }

    #[test]
    fn test_renumber_by_first_appearance() {
        assert_eq!(renumber(&[5, 5, 2, 9, 2]), vec![0, 0, 1, 2, 1]);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Vertex connectivity through unit-capacity max-flow on a split-node graph

use super::structure::weak_component_count;
use crate::error::MetricError;
use crate::graph::WeightedDigraph;
use crate::types::NodeId;
use std::collections::{BTreeSet, VecDeque};

/// Capacity of arcs that stand for original edges; never the bottleneck
const UNBOUNDED: usize = usize::MAX / 2;

/// Residual network with paired forward/backward arcs
struct FlowNetwork {
    head: Vec<usize>,
    capacity: Vec<usize>,
    outgoing: Vec<Vec<usize>>,
}

impl FlowNetwork {
    fn new(nodes: usize) -> Self {
        Self {
            head: Vec::new(),
            capacity: Vec::new(),
            outgoing: vec![Vec::new(); nodes],
        }
    }

    fn add_arc(&mut self, from: usize, to: usize, capacity: usize) {
        self.outgoing[from].push(self.head.len());
        self.head.push(to);
        self.capacity.push(capacity);
        self.outgoing[to].push(self.head.len());
        self.head.push(from);
        self.capacity.push(0);
    }

    /// Edmonds-Karp, stopping once the flow reaches `cutoff`
    fn max_flow(&mut self, source: usize, sink: usize, cutoff: usize) -> usize {
        let mut flow = 0;
        while flow < cutoff {
            let mut via: Vec<Option<usize>> = vec![None; self.outgoing.len()];
            let mut seen = vec![false; self.outgoing.len()];
            seen[source] = true;
            let mut queue = VecDeque::from([source]);

            while let Some(u) = queue.pop_front() {
                if u == sink {
                    break;
                }
                for &arc in &self.outgoing[u] {
                    let v = self.head[arc];
                    if !seen[v] && self.capacity[arc] > 0 {
                        seen[v] = true;
                        via[v] = Some(arc);
                        queue.push_back(v);
                    }
                }
            }
            if !seen[sink] {
                break;
            }

            let mut bottleneck = usize::MAX;
            let mut node = sink;
            while let Some(arc) = via[node] {
                bottleneck = bottleneck.min(self.capacity[arc]);
                node = self.head[arc ^ 1];
            }
            let mut node = sink;
            while let Some(arc) = via[node] {
                self.capacity[arc] -= bottleneck;
                self.capacity[arc ^ 1] += bottleneck;
                node = self.head[arc ^ 1];
            }
            flow = flow.saturating_add(bottleneck);
        }
        flow
    }
}

/// Number of internally disjoint `source -> target` paths, capped at `cutoff`.
///
/// Node `i` is split into `2i` (in) and `2i + 1` (out) joined by a unit arc,
/// so each intermediate node carries at most one path. `source` and `target`
/// must not be adjacent.
#[must_use]
pub fn local_node_connectivity(
    graph: &WeightedDigraph,
    source: NodeId,
    target: NodeId,
    cutoff: usize,
) -> usize {
    let mut network = FlowNetwork::new(2 * graph.node_count());
    for node in graph.nodes() {
        network.add_arc(2 * node, 2 * node + 1, 1);
    }
    for edge in graph.edges() {
        network.add_arc(2 * edge.source + 1, 2 * edge.target, UNBOUNDED);
    }
    network.max_flow(2 * source + 1, 2 * target, cutoff)
}

/// Minimum number of nodes whose removal disconnects the graph
///
/// Starts from the minimum in/out degree and refines it with local
/// connectivities around a minimum-degree node `v`: between `v` and every
/// non-neighbor in both directions, and between every ordered pair of
/// non-adjacent neighbors of `v`.
///
/// # Errors
/// `TooFewNodes` below two nodes, `Disconnected` when the graph is not weakly
/// connected.
pub fn node_connectivity(graph: &WeightedDigraph) -> Result<usize, MetricError> {
    let n = graph.node_count();
    if n < 2 {
        return Err(MetricError::TooFewNodes { needed: 2, found: n });
    }
    if weak_component_count(graph) > 1 {
        return Err(MetricError::Disconnected);
    }

    let min_in = graph.nodes().map(|u| graph.in_degree(u)).min().unwrap_or(0);
    let min_out = graph.nodes().map(|u| graph.out_degree(u)).min().unwrap_or(0);
    let mut k = min_in.min(min_out);

    let v = graph
        .nodes()
        .min_by_key(|&u| (graph.degree(u), u))
        .ok_or(MetricError::EmptyGraph)?;
    let neighbors: BTreeSet<NodeId> = graph
        .predecessors(v)
        .iter()
        .chain(graph.successors(v))
        .map(|&(u, _)| u)
        .collect();

    for w in graph.nodes().filter(|w| *w != v && !neighbors.contains(w)) {
        k = k.min(local_node_connectivity(graph, v, w, k));
        k = k.min(local_node_connectivity(graph, w, v, k));
    }
    for &x in &neighbors {
        for &y in &neighbors {
            if x != y && !graph.has_edge(x, y) {
                k = k.min(local_node_connectivity(graph, x, y, k));
            }
        }
    }
    Ok(k)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Graph data structures for the analysis engine

use crate::error::GraphError;
use crate::types::{Edge, GraphSummary, NodeId};
use petgraph::graph::{DiGraph, NodeIndex};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use std::ops::Range;

/// Collects edges and checks the graph invariants before freezing them into a
/// [`WeightedDigraph`]
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: usize,
    edges: BTreeMap<(NodeId, NodeId), f64>,
}

impl GraphBuilder {
    /// Start a graph over nodes `0..nodes`
    #[must_use]
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            edges: BTreeMap::new(),
        }
    }

    /// Add a directed edge
    ///
    /// # Errors
    /// Rejects out-of-range endpoints, self-loops, parallel edges and
    /// non-finite weights.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<&mut Self, GraphError> {
        for node in [source, target] {
            if node >= self.nodes {
                return Err(GraphError::NodeOutOfRange {
                    node,
                    nodes: self.nodes,
                });
            }
        }
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        if !weight.is_finite() {
            return Err(GraphError::InvalidWeight {
                from: source,
                to: target,
                weight,
            });
        }
        if self.edges.insert((source, target), weight).is_some() {
            return Err(GraphError::DuplicateEdge {
                from: source,
                to: target,
            });
        }
        Ok(self)
    }

    /// Number of edges added so far
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Freeze the graph
    #[must_use]
    pub fn build(self) -> WeightedDigraph {
        let mut graph = DiGraph::with_capacity(self.nodes, self.edges.len());
        let mut successors = vec![Vec::new(); self.nodes];
        let mut predecessors = vec![Vec::new(); self.nodes];

        for node in 0..self.nodes {
            graph.add_node(node);
        }

        // BTreeMap order keeps both adjacency lists sorted by neighbor id
        for (&(source, target), &weight) in &self.edges {
            graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), weight);
            successors[source].push((target, weight));
            predecessors[target].push((source, weight));
        }

        WeightedDigraph {
            graph,
            successors,
            predecessors,
        }
    }
}

/// Immutable directed weighted graph with petgraph backing for algorithms
#[derive(Debug, Clone)]
pub struct WeightedDigraph {
    /// The underlying directed graph, node weight = node id
    graph: DiGraph<NodeId, f64>,
    /// Outgoing edges per node, sorted by target
    successors: Vec<Vec<(NodeId, f64)>>,
    /// Incoming edges per node, sorted by source
    predecessors: Vec<Vec<(NodeId, f64)>>,
}

impl WeightedDigraph {
    /// Build a graph from an edge list
    ///
    /// # Errors
    /// Returns the first invariant violation found by [`GraphBuilder::add_edge`].
    pub fn from_edges<I, E>(nodes: usize, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Edge>,
    {
        let mut builder = GraphBuilder::new(nodes);
        for edge in edges {
            let edge = edge.into();
            builder.add_edge(edge.source, edge.target, edge.weight)?;
        }
        Ok(builder.build())
    }

    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Get edge count
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// All node ids
    #[must_use]
    pub fn nodes(&self) -> Range<NodeId> {
        0..self.node_count()
    }

    /// Check whether `node` belongs to the graph
    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        node < self.node_count()
    }

    /// Validate a node id coming from a query
    ///
    /// # Errors
    /// `NodeOutOfRange` when `node >= N`.
    pub fn check_node(&self, node: NodeId) -> Result<(), GraphError> {
        if self.contains_node(node) {
            Ok(())
        } else {
            Err(GraphError::NodeOutOfRange {
                node,
                nodes: self.node_count(),
            })
        }
    }

    /// Outgoing neighbors of `node` with edge weights, sorted by id
    #[must_use]
    pub fn successors(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.successors[node]
    }

    /// Incoming neighbors of `node` with edge weights, sorted by id
    #[must_use]
    pub fn predecessors(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.predecessors[node]
    }

    /// Number of outgoing edges
    #[must_use]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.successors[node].len()
    }

    /// Number of incoming edges
    #[must_use]
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.predecessors[node].len()
    }

    /// In-degree plus out-degree
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.in_degree(node) + self.out_degree(node)
    }

    /// Weight of the edge `source -> target`, if present
    #[must_use]
    pub fn edge_weight(&self, source: NodeId, target: NodeId) -> Option<f64> {
        let row = self.successors.get(source)?;
        row.binary_search_by_key(&target, |&(t, _)| t)
            .ok()
            .map(|i| row[i].1)
    }

    /// Check whether the edge `source -> target` exists
    #[must_use]
    pub fn has_edge(&self, source: NodeId, target: NodeId) -> bool {
        self.edge_weight(source, target).is_some()
    }

    /// All edges, ordered by `(source, target)`
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.successors.iter().enumerate().flat_map(|(source, row)| {
            row.iter()
                .map(move |&(target, weight)| Edge::new(source, target, weight))
        })
    }

    /// First edge with a negative weight, if any
    #[must_use]
    pub fn negative_edge(&self) -> Option<Edge> {
        self.edges().find(|e| e.weight < 0.0)
    }

    /// Nodes reachable from `source` (including itself), by BFS
    #[must_use]
    pub fn reachable_from(&self, source: NodeId) -> Vec<bool> {
        let mut seen = vec![false; self.node_count()];
        if !self.contains_node(source) {
            return seen;
        }
        seen[source] = true;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            for &(v, _) in self.successors(u) {
                if !seen[v] {
                    seen[v] = true;
                    queue.push_back(v);
                }
            }
        }
        seen
    }

    /// Check whether `target` can be reached from `source`
    #[must_use]
    pub fn is_reachable(&self, source: NodeId, target: NodeId) -> bool {
        self.contains_node(target) && self.reachable_from(source)[target]
    }

    /// Subgraph induced by `members`. Node `i` of the result is `members[i]`
    /// in this graph.
    ///
    /// # Errors
    /// `NodeOutOfRange` for unknown members.
    pub fn induced_subgraph(&self, members: &[NodeId]) -> Result<Self, GraphError> {
        let mut local = vec![None; self.node_count()];
        for (i, &node) in members.iter().enumerate() {
            self.check_node(node)?;
            local[node] = Some(i);
        }

        let mut builder = GraphBuilder::new(members.len());
        for (i, &node) in members.iter().enumerate() {
            for &(target, weight) in self.successors(node) {
                if let Some(j) = local[target] {
                    builder.add_edge(i, j, weight)?;
                }
            }
        }
        Ok(builder.build())
    }

    /// Copy of this graph with every edge touching `node` removed
    ///
    /// # Errors
    /// `NodeOutOfRange` for an unknown node.
    pub fn isolate(&self, node: NodeId) -> Result<Self, GraphError> {
        self.check_node(node)?;
        Self::from_edges(
            self.node_count(),
            self.edges().filter(|e| e.source != node && e.target != node),
        )
    }

    /// Undirected view: `u -- v` exists when either direction exists and
    /// carries the larger of the two weights
    #[must_use]
    pub fn undirected_projection(&self) -> UndirectedProjection {
        let mut merged: Vec<BTreeMap<NodeId, f64>> = vec![BTreeMap::new(); self.node_count()];
        for edge in self.edges() {
            for (a, b) in [(edge.source, edge.target), (edge.target, edge.source)] {
                merged[a]
                    .entry(b)
                    .and_modify(|w| *w = w.max(edge.weight))
                    .or_insert(edge.weight);
            }
        }

        let neighbors: Vec<Vec<(NodeId, f64)>> = merged
            .into_iter()
            .map(|row| row.into_iter().collect())
            .collect();
        let edge_count = neighbors.iter().map(Vec::len).sum::<usize>() / 2;

        UndirectedProjection {
            neighbors,
            edge_count,
        }
    }

    /// Borrow the petgraph representation
    #[must_use]
    pub fn as_petgraph(&self) -> &DiGraph<NodeId, f64> {
        &self.graph
    }

    /// petgraph index of a node id
    #[must_use]
    pub fn index(node: NodeId) -> NodeIndex {
        NodeIndex::new(node)
    }

    /// Deterministic content hash of the node count and sorted edge list
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.node_count() as u64).to_le_bytes());
        for edge in self.edges() {
            hasher.update((edge.source as u64).to_le_bytes());
            hasher.update((edge.target as u64).to_le_bytes());
            hasher.update(edge.weight.to_bits().to_le_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        format!("graph:{}", &hash[..16])
    }

    /// Size and fingerprint
    #[must_use]
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            fingerprint: self.fingerprint(),
        }
    }
}

/// Simple undirected graph derived from a [`WeightedDigraph`]
#[derive(Debug, Clone)]
pub struct UndirectedProjection {
    neighbors: Vec<Vec<(NodeId, f64)>>,
    edge_count: usize,
}

impl UndirectedProjection {
    /// Get node count
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Number of undirected edges
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Neighbors of `node` with weights, sorted by id
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        &self.neighbors[node]
    }

    /// Number of neighbors
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors[node].len()
    }

    /// Check whether `u -- v` exists
    #[must_use]
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.neighbors[u]
            .binary_search_by_key(&v, |&(n, _)| n)
            .is_ok()
    }

    /// Sum of edge weights, each undirected edge counted once
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.neighbors
            .iter()
            .enumerate()
            .flat_map(|(u, row)| row.iter().filter(move |&&(v, _)| u < v))
            .map(|&(_, w)| w)
            .sum()
    }
}

//! Induced-subgraph views over a base graph
//!
//! A `View` never copies entities. It holds an `Arc` to the model it was
//! derived from, so a view taken before a reload stays a valid snapshot of
//! the old generation for as long as it is held.

use super::edge::Edge;
use super::model::GraphModel;
use super::node::Node;
use super::types::{EdgeId, NodeId};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Node and edge id sets, both subsets of one base graph.
///
/// The edge set is always the induced set: every edge of the base graph
/// whose endpoints are both in the node set.
#[derive(Debug, Clone)]
pub struct View {
    graph: Arc<GraphModel>,
    node_ids: Vec<NodeId>,
    node_set: FxHashSet<NodeId>,
    edge_ids: Vec<EdgeId>,
}

impl View {
    /// View covering the whole base graph
    pub fn full(graph: Arc<GraphModel>) -> Self {
        let node_ids: Vec<NodeId> = graph.nodes().map(|n| n.id.clone()).collect();
        let edge_ids: Vec<EdgeId> = graph.edges().map(|e| e.id.clone()).collect();
        let node_set = node_ids.iter().cloned().collect();
        Self {
            graph,
            node_ids,
            node_set,
            edge_ids,
        }
    }

    /// Induced view over the given nodes.
    ///
    /// Ids unknown to the graph and repeated ids are ignored. Nodes and edges
    /// are ordered by base insertion order.
    pub fn induced(graph: Arc<GraphModel>, node_ids: impl IntoIterator<Item = NodeId>) -> Self {
        let node_set: FxHashSet<NodeId> = node_ids
            .into_iter()
            .filter(|id| graph.has_node(id))
            .collect();

        let mut ordered: Vec<NodeId> = node_set.iter().cloned().collect();
        ordered.sort_by_key(|id| graph.node_position(id));

        // Walking outgoing adjacency of member nodes visits each induced edge once
        let mut edge_ids: Vec<EdgeId> = ordered
            .iter()
            .flat_map(|id| graph.neighbors(id, super::types::Direction::Outgoing))
            .filter(|adj| node_set.contains(&adj.neighbor))
            .map(|adj| adj.edge_id.clone())
            .collect();
        edge_ids.sort_by_key(|id| graph.edge_position(id));

        Self {
            graph,
            node_ids: ordered,
            node_set,
            edge_ids,
        }
    }

    /// The base graph this view refers to
    pub fn graph(&self) -> &Arc<GraphModel> {
        &self.graph
    }

    /// Generation of the base graph
    pub fn generation(&self) -> u64 {
        self.graph.generation()
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_ids
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_ids
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_set.contains(id)
    }

    pub fn contains_edge(&self, id: &EdgeId) -> bool {
        self.graph
            .edge(id)
            .is_some_and(|edge| self.contains_node(&edge.source) && self.contains_node(&edge.target))
    }

    /// Member nodes in base insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_ids.iter().filter_map(|id| self.graph.node(id))
    }

    /// Member edges in base insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_ids.iter().filter_map(|id| self.graph.edge(id))
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }
}

//! Immutable in-memory graph snapshot
//!
//! A `GraphModel` is built once from fetched records and never edited
//! afterwards. Reloading builds a fresh model and swaps it in (see
//! `GraphSession`).

use super::edge::Edge;
use super::node::Node;
use super::property::{PropertyMap, PropertyValue};
use super::raw::{RawEdge, RawNode};
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Load options passed into `GraphModel::build`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Maximum number of nodes retained, first by fetch order
    pub limit: usize,
}

impl LoadConfig {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn unlimited() -> Self {
        Self { limit: usize::MAX }
    }
}

/// Why a record was left out of the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DropReason {
    /// An endpoint is not part of the model. `truncated` is set when the node
    /// was fetched but cut by the load limit.
    EndpointMissing { node_id: NodeId, truncated: bool },
    /// Another record with the same id was loaded first
    DuplicateId,
    /// Relationship type was empty
    EmptyType,
}

/// Non-fatal record of data dropped while building a model
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LoadWarning {
    #[error("Node limit {limit} reached, {dropped} fetched nodes were not loaded")]
    NodesTruncated { limit: usize, dropped: usize },

    #[error("Dropped node {node_id}: {reason:?}")]
    DroppedNode { node_id: NodeId, reason: DropReason },

    #[error("Dropped edge {edge_id}: {reason:?}")]
    DroppedEdge { edge_id: EdgeId, reason: DropReason },
}

impl LoadWarning {
    pub fn is_dropped_edge(&self) -> bool {
        matches!(self, LoadWarning::DroppedEdge { .. })
    }
}

/// One adjacency entry: the edge and the node on its far side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Adjacent {
    pub edge_id: EdgeId,
    pub neighbor: NodeId,
}

/// Immutable base graph with derived indices
///
/// Indices:
/// - nodes / edges: insertion-ordered id maps
/// - label_index: Label -> node ids (insertion order)
/// - edge_type_index: EdgeType -> edge ids (insertion order)
/// - property_index: property key -> node ids carrying it
/// - outgoing / incoming: NodeId -> adjacency list in edge insertion order
#[derive(Debug, Default)]
pub struct GraphModel {
    generation: u64,

    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,

    label_index: HashMap<Label, Vec<NodeId>>,
    edge_type_index: HashMap<EdgeType, Vec<EdgeId>>,

    property_index: BTreeMap<String, Vec<NodeId>>,
    edge_property_index: BTreeMap<String, Vec<EdgeId>>,

    outgoing: HashMap<NodeId, Vec<Adjacent>>,
    incoming: HashMap<NodeId, Vec<Adjacent>>,
}

impl GraphModel {
    /// An empty graph, used before the first load
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a model from fetched records.
    ///
    /// Never fails: records that would break the model's invariants are
    /// dropped and reported in the returned warnings.
    pub fn build(
        raw_nodes: impl IntoIterator<Item = RawNode>,
        raw_edges: impl IntoIterator<Item = RawEdge>,
        config: &LoadConfig,
    ) -> (Self, Vec<LoadWarning>) {
        let mut model = GraphModel::empty();
        let mut warnings = Vec::new();
        let mut truncated: FxHashSet<NodeId> = FxHashSet::default();

        for raw in raw_nodes {
            let node_id = NodeId::new(raw.id);
            if model.nodes.contains_key(&node_id) {
                warnings.push(LoadWarning::DroppedNode {
                    node_id,
                    reason: DropReason::DuplicateId,
                });
                continue;
            }
            if model.nodes.len() >= config.limit {
                truncated.insert(node_id);
                continue;
            }

            let labels = raw.labels.into_iter().map(Label::new).collect();
            let node = Node::new_with_properties(node_id, labels, convert_properties(raw.properties));
            model.insert_node(node);
        }

        if !truncated.is_empty() {
            warnings.push(LoadWarning::NodesTruncated {
                limit: config.limit,
                dropped: truncated.len(),
            });
        }

        for raw in raw_edges {
            let edge_id = EdgeId::new(raw.id);
            let source = NodeId::new(raw.source);
            let target = NodeId::new(raw.target);

            let rejection = if raw.edge_type.is_empty() {
                Some(DropReason::EmptyType)
            } else if model.edges.contains_key(&edge_id) {
                Some(DropReason::DuplicateId)
            } else {
                [&source, &target]
                    .into_iter()
                    .find(|endpoint| !model.nodes.contains_key(*endpoint))
                    .map(|endpoint| DropReason::EndpointMissing {
                        node_id: endpoint.clone(),
                        truncated: truncated.contains(endpoint),
                    })
            };

            if let Some(reason) = rejection {
                debug!("Dropping edge {}: {:?}", edge_id, reason);
                warnings.push(LoadWarning::DroppedEdge { edge_id, reason });
                continue;
            }

            let edge = Edge::new_with_properties(
                edge_id,
                source,
                target,
                raw.edge_type,
                convert_properties(raw.properties),
            );
            model.insert_edge(edge);
        }

        let dropped_edges = warnings.iter().filter(|w| w.is_dropped_edge()).count();
        if dropped_edges > 0 {
            warn!("Dropped {} edges while building graph model", dropped_edges);
        }
        info!(
            "Built graph model: {} nodes, {} edges, {} warnings",
            model.node_count(),
            model.edge_count(),
            warnings.len()
        );

        (model, warnings)
    }

    /// Stamp the generation number. Only called before the model is shared.
    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    fn insert_node(&mut self, node: Node) {
        let node_id = node.id.clone();
        for label in &node.labels {
            self.label_index
                .entry(label.clone())
                .or_default()
                .push(node_id.clone());
        }
        for key in node.properties.keys() {
            self.property_index
                .entry(key.clone())
                .or_default()
                .push(node_id.clone());
        }
        self.nodes.insert(node_id, node);
    }

    fn insert_edge(&mut self, edge: Edge) {
        let edge_id = edge.id.clone();

        self.outgoing
            .entry(edge.source.clone())
            .or_default()
            .push(Adjacent {
                edge_id: edge_id.clone(),
                neighbor: edge.target.clone(),
            });
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .push(Adjacent {
                edge_id: edge_id.clone(),
                neighbor: edge.source.clone(),
            });

        self.edge_type_index
            .entry(edge.edge_type.clone())
            .or_default()
            .push(edge_id.clone());
        for key in edge.properties.keys() {
            self.edge_property_index
                .entry(key.clone())
                .or_default()
                .push(edge_id.clone());
        }

        self.edges.insert(edge_id, edge);
    }

    /// Generation number assigned when the model was published
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Get a node by ID
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get an edge by ID
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Position of a node in insertion order
    pub fn node_position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Position of an edge in insertion order
    pub fn edge_position(&self, id: &EdgeId) -> Option<usize> {
        self.edges.get_index_of(id)
    }

    /// Ids of all nodes carrying a label, in insertion order
    pub fn nodes_by_label(&self, label: &Label) -> &[NodeId] {
        self.label_index.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ids of all edges of a type, in insertion order
    pub fn edges_by_type(&self, edge_type: &EdgeType) -> &[EdgeId] {
        self.edge_type_index
            .get(edge_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of all nodes that carry a property key, in insertion order
    pub fn nodes_with_property(&self, key: &str) -> &[NodeId] {
        self.property_index.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Ids of all edges that carry a property key, in insertion order
    pub fn edges_with_property(&self, key: &str) -> &[EdgeId] {
        self.edge_property_index
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Adjacent edges of a node.
    ///
    /// `Either` yields outgoing entries first, then incoming ones; a self-loop
    /// is yielded once.
    pub fn neighbors<'a>(
        &'a self,
        node_id: &NodeId,
        direction: Direction,
    ) -> impl Iterator<Item = &'a Adjacent> + 'a {
        let outgoing = match direction {
            Direction::Outgoing | Direction::Either => self.outgoing.get(node_id),
            Direction::Incoming => None,
        };
        let incoming = match direction {
            Direction::Incoming | Direction::Either => self.incoming.get(node_id),
            Direction::Outgoing => None,
        };

        let this = node_id.clone();
        outgoing.into_iter().flatten().chain(
            incoming
                .into_iter()
                .flatten()
                .filter(move |adj| direction != Direction::Either || adj.neighbor != this),
        )
    }

    /// Number of adjacent edges in a direction
    pub fn degree(&self, node_id: &NodeId, direction: Direction) -> usize {
        match direction {
            Direction::Outgoing => self.outgoing.get(node_id).map_or(0, Vec::len),
            Direction::Incoming => self.incoming.get(node_id).map_or(0, Vec::len),
            Direction::Either => self.neighbors(node_id, direction).count(),
        }
    }

    /// All node property keys, sorted
    pub fn property_keys(&self) -> impl Iterator<Item = &str> {
        self.property_index.keys().map(String::as_str)
    }

    /// All edge property keys, sorted
    pub fn edge_property_keys(&self) -> impl Iterator<Item = &str> {
        self.edge_property_index.keys().map(String::as_str)
    }

    /// Node property keys with at least one numeric value, sorted
    pub fn numeric_property_keys(&self) -> Vec<&str> {
        self.keys_where(|value| matches!(value, PropertyValue::Number(_)))
    }

    /// Node property keys with at least one string value, sorted
    pub fn text_property_keys(&self) -> Vec<&str> {
        self.keys_where(|value| matches!(value, PropertyValue::String(_)))
    }

    fn keys_where(&self, predicate: impl Fn(&PropertyValue) -> bool) -> Vec<&str> {
        self.property_index
            .iter()
            .filter(|(key, ids)| {
                ids.iter()
                    .filter_map(|id| self.nodes.get(id))
                    .filter_map(|node| node.get_property(key))
                    .any(&predicate)
            })
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// All labels, sorted
    pub fn labels(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.label_index.keys().collect();
        labels.sort();
        labels
    }

    /// All relationship types, sorted
    pub fn edge_types(&self) -> Vec<&EdgeType> {
        let mut types: Vec<&EdgeType> = self.edge_type_index.keys().collect();
        types.sort();
        types
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn convert_properties(raw: HashMap<String, serde_json::Value>) -> PropertyMap {
    raw.into_iter()
        .map(|(key, value)| (key, PropertyValue::from(value)))
        .collect()
}

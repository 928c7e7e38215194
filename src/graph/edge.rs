//! Edge implementation for the property graph snapshot

use super::property::{PropertyMap, PropertyValue};
use super::types::{Direction, EdgeId, EdgeType, NodeId};
use serde::{Deserialize, Serialize};

/// A directed edge in the property graph
///
/// Edges have:
/// - A unique ID
/// - A source node and a target node
/// - An edge type (relationship type)
/// - Properties (key-value pairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique identifier for this edge
    pub id: EdgeId,

    /// Source node (edge goes FROM this node)
    pub source: NodeId,

    /// Target node (edge goes TO this node)
    pub target: NodeId,

    /// Type of relationship (e.g., "ACTED_IN", "DIRECTED")
    pub edge_type: EdgeType,

    /// Properties associated with this edge
    pub properties: PropertyMap,
}

impl Edge {
    /// Create a new directed edge
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, edge_type: impl Into<EdgeType>) -> Self {
        Self::new_with_properties(id, source, target, edge_type, PropertyMap::new())
    }

    /// Create a new edge with properties
    pub fn new_with_properties(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
        properties: PropertyMap,
    ) -> Self {
        Edge {
            id,
            source,
            target,
            edge_type: edge_type.into(),
            properties,
        }
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Check if this edge connects two specific nodes (in either direction)
    pub fn connects(&self, node1: &NodeId, node2: &NodeId) -> bool {
        (self.source == *node1 && self.target == *node2)
            || (self.source == *node2 && self.target == *node1)
    }

    /// Check if this edge goes FROM a specific node
    pub fn starts_from(&self, node: &NodeId) -> bool {
        self.source == *node
    }

    /// Check if this edge goes TO a specific node
    pub fn ends_at(&self, node: &NodeId) -> bool {
        self.target == *node
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// The node on the far side of this edge when seen from `node` in `direction`
    pub fn neighbor_of(&self, node: &NodeId, direction: Direction) -> Option<&NodeId> {
        match direction {
            Direction::Outgoing => self.starts_from(node).then_some(&self.target),
            Direction::Incoming => self.ends_at(node).then_some(&self.source),
            Direction::Either => {
                if self.starts_from(node) {
                    Some(&self.target)
                } else if self.ends_at(node) {
                    Some(&self.source)
                } else {
                    None
                }
            }
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nid(id: u64) -> NodeId {
        NodeId::from(id)
    }

    #[test]
    fn test_create_edge() {
        let edge = Edge::new(EdgeId::from(10u64), nid(1), nid(2), "ACTED_IN");

        assert_eq!(edge.id, EdgeId::from(10u64));
        assert_eq!(edge.source, nid(1));
        assert_eq!(edge.target, nid(2));
        assert_eq!(edge.edge_type.as_str(), "ACTED_IN");
    }

    #[test]
    fn test_edge_direction() {
        let edge = Edge::new(EdgeId::from(2u64), nid(10), nid(20), "FOLLOWS");

        assert!(edge.starts_from(&nid(10)));
        assert!(edge.ends_at(&nid(20)));
        assert!(!edge.starts_from(&nid(20)));
        assert!(!edge.ends_at(&nid(10)));
        assert!(edge.connects(&nid(20), &nid(10)));
        assert!(!edge.connects(&nid(10), &nid(30)));
    }

    #[test]
    fn test_neighbor_of() {
        let edge = Edge::new(EdgeId::from(3u64), nid(1), nid(2), "KNOWS");

        assert_eq!(edge.neighbor_of(&nid(1), Direction::Outgoing), Some(&nid(2)));
        assert_eq!(edge.neighbor_of(&nid(1), Direction::Incoming), None);
        assert_eq!(edge.neighbor_of(&nid(2), Direction::Incoming), Some(&nid(1)));
        assert_eq!(edge.neighbor_of(&nid(2), Direction::Either), Some(&nid(1)));
        assert_eq!(edge.neighbor_of(&nid(9), Direction::Either), None);
    }

    #[test]
    fn test_edge_with_properties() {
        let mut props = PropertyMap::new();
        props.insert("roles".to_string(), PropertyValue::List(vec!["Neo".into()]));

        let edge = Edge::new_with_properties(EdgeId::from(4u64), nid(5), nid(6), "ACTED_IN", props);

        assert!(edge.has_property("roles"));
        assert_eq!(edge.get_property("roles").unwrap().as_list().unwrap().len(), 1);
        assert!(!edge.is_self_loop());
    }
}

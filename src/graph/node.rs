//! Node implementation for the property graph snapshot

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A node in the property graph
///
/// Nodes have:
/// - A unique ID
/// - One or more labels, kept in fetch order
/// - Properties (key-value pairs)
///
/// Nodes are never mutated once they are published in a `GraphModel`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Labels for this node (never empty once built by `GraphModel`)
    pub labels: IndexSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,
}

impl Node {
    /// Create a new node with a single label
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        let mut labels = IndexSet::new();
        labels.insert(label.into());

        Node {
            id,
            labels,
            properties: PropertyMap::new(),
        }
    }

    /// Create a new node with labels and properties
    ///
    /// Duplicate labels collapse; an empty label list gets the `Unknown` label.
    pub fn new_with_properties(id: NodeId, labels: Vec<Label>, properties: PropertyMap) -> Self {
        let mut label_set: IndexSet<Label> = labels.into_iter().collect();
        if label_set.is_empty() {
            label_set.insert(Label::new(Label::UNKNOWN));
        }

        Node {
            id,
            labels: label_set,
            properties,
        }
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// First label in fetch order
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.first()
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if property exists
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Get number of properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Get number of labels
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

//! Core graph model
//!
//! This module implements the property graph snapshot:
//! - Nodes with multiple labels and properties
//! - Directed, typed edges with properties
//! - An immutable, indexed base graph built from fetched records
//! - Induced-subgraph views that reference the base graph

pub mod edge;
pub mod model;
pub mod node;
pub mod property;
pub mod raw;
pub mod types;
pub mod view;

// Re-export main types
pub use edge::Edge;
pub use model::{Adjacent, DropReason, GraphModel, LoadConfig, LoadWarning};
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use raw::{RawEdge, RawGraph, RawNode};
pub use types::{Direction, EdgeId, EdgeType, Label, NodeId};
pub use view::View;

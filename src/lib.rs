//! Graph Explorer
//!
//! An in-memory property graph explorer. A bounded snapshot of nodes and
//! relationships is fetched once, indexed, and then searched, filtered,
//! pattern-matched and summarized without going back to the database.
//!
//! # Components
//!
//! - `graph`: property values, raw records, the immutable `GraphModel` and
//!   induced-subgraph `View`s
//! - `query`: `FilterEngine` (compound filters) and `SearchEngine` (text,
//!   property and pattern search)
//! - `algo`: `StatisticsEngine` and connected components
//! - `session`: `GraphSession`, the loaded graph with atomic-swap reload
//! - `config`: `ExplorerConfig`
//!
//! ## Example Usage
//!
//! ```rust
//! use graph_explorer::{ExplorerConfig, FilterClause, FilterSpec, GraphSession};
//! use graph_explorer::graph::{RawEdge, RawGraph, RawNode};
//!
//! let session = GraphSession::new(ExplorerConfig::default());
//! session.reload(RawGraph::new(
//!     vec![
//!         RawNode::new("1", &["Person"]).with_property("name", "Alice"),
//!         RawNode::new("2", &["Person"]).with_property("name", "Bob"),
//!     ],
//!     vec![RawEdge::new("10", "1", "2", "KNOWS")],
//! ));
//!
//! let view = session
//!     .filter(&FilterSpec::new().with(FilterClause::text("name", "ali")))
//!     .unwrap();
//! assert_eq!(view.node_count(), 1);
//! assert_eq!(session.statistics().edge_count, 1);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod query;
pub mod session;

// Re-export main types for convenience
pub use graph::{
    Direction, Edge, EdgeId, EdgeType, GraphModel, Label, LoadConfig, LoadWarning, Node, NodeId,
    PropertyMap, PropertyValue, View,
};

pub use query::{
    FilterClause, FilterEngine, FilterSpec, PatternResult, PatternSpec, QueryError, QueryResult,
    SearchEngine,
};

pub use algo::{GraphStatistics, StatisticsEngine};

pub use config::{ConfigError, ExplorerConfig};

pub use session::{FetchError, Fetcher, GraphSession, SessionError, StaticFetcher};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

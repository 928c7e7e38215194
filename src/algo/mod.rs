//! Graph analytics
//!
//! Aggregate statistics and connectivity over the base graph or any view.

pub mod community;
pub mod statistics;

pub use community::{weakly_connected_components, WccResult};
pub use statistics::{DegreeStats, GraphStatistics, PropertyStats, StatisticsEngine};

//! Aggregate statistics over the base graph or a view
//!
//! Every figure is exact and computed from the view's own node and edge sets.

use super::community::weakly_connected_components;
use crate::graph::{GraphModel, View};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Min, max and mean of one degree direction. All zero for an empty view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

impl DegreeStats {
    fn from_degrees(degrees: impl ExactSizeIterator<Item = usize>) -> Self {
        let count = degrees.len();
        if count == 0 {
            return Self::default();
        }
        let (mut min, mut max, mut total) = (usize::MAX, 0, 0usize);
        for d in degrees {
            min = min.min(d);
            max = max.max(d);
            total += d;
        }
        Self {
            min,
            max,
            mean: total as f64 / count as f64,
        }
    }
}

/// Range of a numeric node property across the view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropertyStats {
    pub min: f64,
    pub max: f64,
    /// Nodes carrying a numeric value for the property
    pub count: usize,
}

impl PropertyStats {
    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }
}

/// Summary record handed to rendering
///
/// `label_counts` counts a multi-labeled node once per label, so its sum may
/// exceed `node_count`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStatistics {
    pub generation: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub label_counts: BTreeMap<String, usize>,
    pub relationship_type_counts: BTreeMap<String, usize>,
    pub out_degree: DegreeStats,
    pub in_degree: DegreeStats,
    pub connected_components: usize,
    pub isolated_nodes: usize,
    /// Directed density `E / (N * (N - 1))`, zero below two nodes
    pub density: f64,
    pub property_stats: BTreeMap<String, PropertyStats>,
}

impl GraphStatistics {
    /// Sum over label buckets
    pub fn label_total(&self) -> usize {
        self.label_counts.values().sum()
    }

    /// One weakly connected component. An empty view is not connected.
    pub fn is_connected(&self) -> bool {
        self.connected_components == 1
    }
}

/// Statistics engine bound to one base graph
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    graph: Arc<GraphModel>,
}

impl StatisticsEngine {
    pub fn new(graph: Arc<GraphModel>) -> Self {
        Self { graph }
    }

    /// Statistics of the whole base graph
    pub fn graph_statistics(&self) -> GraphStatistics {
        Self::view_statistics(&View::full(self.graph.clone()))
    }

    /// Statistics of a view, measured against the graph the view was derived
    /// from. That may be an older generation than any engine's.
    pub fn view_statistics(view: &View) -> GraphStatistics {
        compute(view)
    }
}

fn compute(view: &View) -> GraphStatistics {
    let mut label_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut property_stats: BTreeMap<String, PropertyStats> = BTreeMap::new();

    for node in view.nodes() {
        for label in &node.labels {
            *label_counts.entry(label.as_str().to_string()).or_default() += 1;
        }
        for (key, value) in &node.properties {
            let Some(number) = value.as_number() else {
                continue;
            };
            property_stats
                .entry(key.clone())
                .or_insert(PropertyStats {
                    min: number,
                    max: number,
                    count: 0,
                })
                .observe(number);
        }
    }

    let mut relationship_type_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut out_degree: FxHashMap<&str, usize> = FxHashMap::default();
    let mut in_degree: FxHashMap<&str, usize> = FxHashMap::default();

    for edge in view.edges() {
        *relationship_type_counts
            .entry(edge.edge_type.as_str().to_string())
            .or_default() += 1;
        *out_degree.entry(edge.source.as_str()).or_default() += 1;
        *in_degree.entry(edge.target.as_str()).or_default() += 1;
    }

    let degree_of = |map: &FxHashMap<&str, usize>, id: &str| map.get(id).copied().unwrap_or(0);
    let isolated_nodes = view
        .node_ids()
        .iter()
        .filter(|id| degree_of(&out_degree, id.as_str()) + degree_of(&in_degree, id.as_str()) == 0)
        .count();

    let stats = GraphStatistics {
        generation: view.generation(),
        node_count: view.node_count(),
        edge_count: view.edge_count(),
        label_counts,
        relationship_type_counts,
        out_degree: DegreeStats::from_degrees(
            view.node_ids().iter().map(|id| degree_of(&out_degree, id.as_str())),
        ),
        in_degree: DegreeStats::from_degrees(
            view.node_ids().iter().map(|id| degree_of(&in_degree, id.as_str())),
        ),
        connected_components: weakly_connected_components(view).component_count(),
        isolated_nodes,
        density: density(view.node_count(), view.edge_count()),
        property_stats,
    };

    debug!(
        "Statistics: {} nodes, {} edges, {} components",
        stats.node_count, stats.edge_count, stats.connected_components
    );
    stats
}

fn density(nodes: usize, edges: usize) -> f64 {
    if nodes < 2 {
        return 0.0;
    }
    edges as f64 / (nodes as f64 * (nodes - 1) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LoadConfig, NodeId, RawEdge, RawNode};

    fn nid(id: u64) -> NodeId {
        NodeId::from(id)
    }

    fn engine() -> StatisticsEngine {
        let nodes = vec![
            RawNode::new("1", &["Person", "Actor"]).with_property("born", 1956),
            RawNode::new("2", &["Movie"]).with_property("released", 2000),
            RawNode::new("3", &["Movie"]).with_property("released", 1999),
            RawNode::new("4", &["Person"]).with_property("born", 1964),
            RawNode::new("5", &["Person"]).with_property("born", "unknown"),
        ];
        let edges = vec![
            RawEdge::new("10", "1", "2", "ACTED_IN"),
            RawEdge::new("11", "4", "3", "ACTED_IN"),
            RawEdge::new("12", "1", "4", "KNOWS"),
        ];
        let (model, _) = GraphModel::build(nodes, edges, &LoadConfig::unlimited());
        StatisticsEngine::new(Arc::new(model))
    }

    #[test]
    fn test_counts() {
        let stats = engine().graph_statistics();

        assert_eq!(stats.node_count, 5);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.label_counts["Person"], 3);
        assert_eq!(stats.label_counts["Actor"], 1);
        assert_eq!(stats.relationship_type_counts["ACTED_IN"], 2);
        assert_eq!(stats.label_total(), 6);
    }

    #[test]
    fn test_degrees_and_connectivity() {
        let stats = engine().graph_statistics();

        assert_eq!(stats.out_degree.max, 2);
        assert_eq!(stats.out_degree.min, 0);
        assert!((stats.out_degree.mean - 0.6).abs() < 1e-9);
        assert_eq!(stats.in_degree.max, 1);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.isolated_nodes, 1);
    }

    #[test]
    fn test_property_ranges_skip_non_numeric() {
        let stats = engine().graph_statistics();

        let born = stats.property_stats["born"];
        assert_eq!(born.count, 2);
        assert_eq!(born.min, 1956.0);
        assert_eq!(born.max, 1964.0);
        assert_eq!(stats.property_stats["released"].count, 2);
    }

    #[test]
    fn test_view_statistics() {
        let engine = engine();
        let view = View::induced(engine.graph.clone(), vec![nid(1), nid(2), nid(3)]);
        let stats = StatisticsEngine::view_statistics(&view);

        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.isolated_nodes, 1);
        assert!(!stats.relationship_type_counts.contains_key("KNOWS"));
    }

    #[test]
    fn test_empty_view() {
        let engine = engine();
        let view = View::induced(engine.graph.clone(), Vec::new());
        let stats = StatisticsEngine::view_statistics(&view);

        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.out_degree, DegreeStats::default());
        assert_eq!(stats.connected_components, 0);
    }

    #[test]
    fn test_density_and_connectivity() {
        let engine = engine();
        let stats = engine.graph_statistics();
        assert!((stats.density - 3.0 / 20.0).abs() < 1e-9);
        assert!(!stats.is_connected());

        let pair = View::induced(engine.graph.clone(), vec![nid(1), nid(2)]);
        let stats = StatisticsEngine::view_statistics(&pair);
        assert!((stats.density - 0.5).abs() < 1e-9);
        assert!(stats.is_connected());

        let single = View::induced(engine.graph.clone(), vec![nid(1)]);
        let stats = StatisticsEngine::view_statistics(&single);
        assert_eq!(stats.density, 0.0);
        assert!(stats.is_connected());

        let empty = View::induced(engine.graph.clone(), Vec::new());
        let stats = StatisticsEngine::view_statistics(&empty);
        assert_eq!(stats.density, 0.0);
        assert!(!stats.is_connected());
    }
}

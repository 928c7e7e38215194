//! Compound filters over the base graph
//!
//! A `FilterSpec` is a conjunction of clauses. Each clause kind covers one
//! filter category of the explorer UI; inside a category (e.g. several
//! selected labels) the choices are OR-ed, across clauses everything is
//! AND-ed. The result is an induced `View`.

use super::{QueryError, QueryResult};
use crate::graph::{Direction, EdgeId, EdgeType, GraphModel, Label, Node, NodeId, PropertyMap, View};
use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// How a text clause compares the stringified property value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextMatchMode {
    #[default]
    Contains,
    Equals,
    StartsWith,
    Regex,
}

/// One filter predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterClause {
    /// Node has at least one of the labels. An empty set matches nothing.
    Label { labels: Vec<Label> },

    /// Numeric property within bounds; `None` leaves that side open
    NumericRange {
        property: String,
        min: Option<f64>,
        max: Option<f64>,
        #[serde(default = "default_true")]
        min_inclusive: bool,
        #[serde(default = "default_true")]
        max_inclusive: bool,
    },

    /// Stringified property value matches `pattern`
    Text {
        property: String,
        pattern: String,
        #[serde(default)]
        case_sensitive: bool,
        #[serde(default)]
        mode: TextMatchMode,
    },

    /// Node has an adjacent edge of the type leading to a node with the label
    Relationship {
        #[serde(default)]
        direction: Direction,
        relationship_type: Option<EdgeType>,
        neighbor_label: Option<Label>,
    },

    /// Node degree within inclusive bounds
    Degree {
        #[serde(default)]
        direction: Direction,
        min: Option<usize>,
        max: Option<usize>,
    },
}

fn default_true() -> bool {
    true
}

impl FilterClause {
    pub fn labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        FilterClause::Label {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Inclusive numeric range
    pub fn numeric_range(property: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        FilterClause::NumericRange {
            property: property.into(),
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    /// Case-insensitive substring match
    pub fn text(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterClause::Text {
            property: property.into(),
            pattern: pattern.into(),
            case_sensitive: false,
            mode: TextMatchMode::Contains,
        }
    }

    pub fn relationship(
        direction: Direction,
        relationship_type: Option<&str>,
        neighbor_label: Option<&str>,
    ) -> Self {
        FilterClause::Relationship {
            direction,
            relationship_type: relationship_type.map(EdgeType::new),
            neighbor_label: neighbor_label.map(Label::new),
        }
    }

    pub fn degree(direction: Direction, min: Option<usize>, max: Option<usize>) -> Self {
        FilterClause::Degree { direction, min, max }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            FilterClause::Label { .. } => "label",
            FilterClause::NumericRange { .. } => "numeric_range",
            FilterClause::Text { .. } => "text",
            FilterClause::Relationship { .. } => "relationship",
            FilterClause::Degree { .. } => "degree",
        }
    }
}

/// Conjunction of filter clauses. Empty means "every node".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default)]
    pub clauses: Vec<FilterClause>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause
    pub fn with(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct NumericBounds {
    min: Option<f64>,
    max: Option<f64>,
    min_inclusive: bool,
    max_inclusive: bool,
}

impl NumericBounds {
    fn contains(&self, value: f64) -> bool {
        let above = match self.min {
            Some(min) if self.min_inclusive => value >= min,
            Some(min) => value > min,
            None => !value.is_nan(),
        };
        let below = match self.max {
            Some(max) if self.max_inclusive => value <= max,
            Some(max) => value < max,
            None => !value.is_nan(),
        };
        above && below
    }
}

#[derive(Debug)]
enum TextMatcher {
    Contains(String),
    Equals(String),
    StartsWith(String),
    Regex(Regex),
}

impl TextMatcher {
    fn is_match(&self, text: &str, case_sensitive: bool) -> bool {
        let folded;
        let text = if case_sensitive || matches!(self, TextMatcher::Regex(_)) {
            text
        } else {
            folded = text.to_lowercase();
            folded.as_str()
        };
        match self {
            TextMatcher::Contains(needle) => text.contains(needle.as_str()),
            TextMatcher::Equals(needle) => text == needle.as_str(),
            TextMatcher::StartsWith(needle) => text.starts_with(needle.as_str()),
            TextMatcher::Regex(re) => re.is_match(text),
        }
    }
}

/// A validated clause, ready to evaluate
#[derive(Debug)]
enum Predicate<'s> {
    Label(FxHashSet<&'s Label>),
    Numeric {
        property: &'s str,
        bounds: NumericBounds,
    },
    Text {
        property: &'s str,
        matcher: TextMatcher,
        case_sensitive: bool,
    },
    Relationship {
        direction: Direction,
        relationship_type: Option<&'s EdgeType>,
        neighbor_label: Option<&'s Label>,
    },
    Degree {
        direction: Direction,
        min: Option<usize>,
        max: Option<usize>,
    },
}

impl<'s> Predicate<'s> {
    fn compile(clause: &'s FilterClause) -> QueryResult<Self> {
        match clause {
            FilterClause::Label { labels } => Ok(Predicate::Label(labels.iter().collect())),

            FilterClause::NumericRange {
                property,
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                if min.is_some_and(f64::is_nan) || max.is_some_and(f64::is_nan) {
                    return Err(QueryError::NanBound {
                        property: property.clone(),
                    });
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(QueryError::InvalidRange {
                            property: property.clone(),
                            min: *lo,
                            max: *hi,
                        });
                    }
                }
                Ok(Predicate::Numeric {
                    property,
                    bounds: NumericBounds {
                        min: *min,
                        max: *max,
                        min_inclusive: *min_inclusive,
                        max_inclusive: *max_inclusive,
                    },
                })
            }

            FilterClause::Text {
                property,
                pattern,
                case_sensitive,
                mode,
            } => {
                let needle = if *case_sensitive {
                    pattern.clone()
                } else {
                    pattern.to_lowercase()
                };
                let matcher = match mode {
                    TextMatchMode::Contains => TextMatcher::Contains(needle),
                    TextMatchMode::Equals => TextMatcher::Equals(needle),
                    TextMatchMode::StartsWith => TextMatcher::StartsWith(needle),
                    TextMatchMode::Regex => {
                        let re = RegexBuilder::new(pattern)
                            .case_insensitive(!case_sensitive)
                            .build()
                            .map_err(|e| QueryError::InvalidRegex {
                                pattern: pattern.clone(),
                                message: e.to_string(),
                            })?;
                        TextMatcher::Regex(re)
                    }
                };
                Ok(Predicate::Text {
                    property,
                    matcher,
                    case_sensitive: *case_sensitive,
                })
            }

            FilterClause::Relationship {
                direction,
                relationship_type,
                neighbor_label,
            } => Ok(Predicate::Relationship {
                direction: *direction,
                relationship_type: relationship_type.as_ref(),
                neighbor_label: neighbor_label.as_ref(),
            }),

            FilterClause::Degree { direction, min, max } => {
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(QueryError::InvalidDegreeRange { min: *lo, max: *hi });
                    }
                }
                Ok(Predicate::Degree {
                    direction: *direction,
                    min: *min,
                    max: *max,
                })
            }
        }
    }

    /// Index-backed candidate set for this predicate, if it has one
    fn seed<'g>(&self, graph: &'g GraphModel) -> Option<Vec<&'g NodeId>> {
        match self {
            Predicate::Label(labels) => {
                let mut seen = FxHashSet::default();
                let mut ids = Vec::new();
                for label in labels {
                    for id in graph.nodes_by_label(label) {
                        if seen.insert(id) {
                            ids.push(id);
                        }
                    }
                }
                Some(ids)
            }
            Predicate::Numeric { property, .. } | Predicate::Text { property, .. } => {
                Some(graph.nodes_with_property(property).iter().collect())
            }
            Predicate::Relationship { .. } | Predicate::Degree { .. } => None,
        }
    }

    fn matches_properties(&self, properties: &PropertyMap) -> bool {
        match self {
            Predicate::Numeric { property, bounds } => properties
                .get(*property)
                .and_then(|value| value.as_number())
                .is_some_and(|n| bounds.contains(n)),
            Predicate::Text {
                property,
                matcher,
                case_sensitive,
            } => properties
                .get(*property)
                .and_then(|value| value.to_search_text())
                .is_some_and(|text| matcher.is_match(&text, *case_sensitive)),
            _ => false,
        }
    }

    fn matches_node(&self, graph: &GraphModel, node: &Node) -> bool {
        match self {
            Predicate::Label(labels) => node.labels.iter().any(|label| labels.contains(label)),
            Predicate::Numeric { .. } | Predicate::Text { .. } => {
                self.matches_properties(&node.properties)
            }
            Predicate::Relationship {
                direction,
                relationship_type,
                neighbor_label,
            } => graph.neighbors(&node.id, *direction).any(|adj| {
                let type_ok = relationship_type.map_or(true, |wanted| {
                    graph
                        .edge(&adj.edge_id)
                        .is_some_and(|edge| edge.edge_type == *wanted)
                });
                let label_ok = neighbor_label.map_or(true, |wanted| {
                    graph
                        .node(&adj.neighbor)
                        .is_some_and(|neighbor| neighbor.has_label(wanted))
                });
                type_ok && label_ok
            }),
            Predicate::Degree { direction, min, max } => {
                let degree = graph.degree(&node.id, *direction);
                min.map_or(true, |lo| degree >= lo) && max.map_or(true, |hi| degree <= hi)
            }
        }
    }
}

/// Evaluates filter specifications against one base graph
#[derive(Debug, Clone)]
pub struct FilterEngine {
    graph: Arc<GraphModel>,
}

impl FilterEngine {
    pub fn new(graph: Arc<GraphModel>) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Arc<GraphModel> {
        &self.graph
    }

    /// Apply a filter and return the induced view
    pub fn filter(&self, spec: &FilterSpec) -> QueryResult<View> {
        let ids = self.matching_nodes(spec)?;
        Ok(View::induced(Arc::clone(&self.graph), ids))
    }

    /// Ids of all nodes satisfying every clause, in base insertion order
    pub fn matching_nodes(&self, spec: &FilterSpec) -> QueryResult<Vec<NodeId>> {
        let predicates = spec
            .clauses
            .iter()
            .map(Predicate::compile)
            .collect::<QueryResult<Vec<_>>>()?;

        let graph = self.graph.as_ref();

        // Start from the smallest index-backed candidate set
        let seed = predicates
            .iter()
            .filter_map(|p| p.seed(graph))
            .min_by_key(Vec::len);

        let mut matched: Vec<&NodeId> = match seed {
            Some(candidates) => candidates
                .into_iter()
                .filter(|id| {
                    graph
                        .node(id)
                        .is_some_and(|node| predicates.iter().all(|p| p.matches_node(graph, node)))
                })
                .collect(),
            None => graph
                .nodes()
                .filter(|node| predicates.iter().all(|p| p.matches_node(graph, node)))
                .map(|node| &node.id)
                .collect(),
        };
        matched.sort_by_key(|id| graph.node_position(id));

        debug!(
            "Filter with {} clauses matched {} of {} nodes",
            predicates.len(),
            matched.len(),
            graph.node_count()
        );

        Ok(matched.into_iter().cloned().collect())
    }

    /// Edge ids whose properties satisfy a numeric range or text clause,
    /// in base insertion order
    pub fn matching_edges(&self, clause: &FilterClause) -> QueryResult<Vec<EdgeId>> {
        let property = match clause {
            FilterClause::NumericRange { property, .. } | FilterClause::Text { property, .. } => {
                property
            }
            other => return Err(QueryError::UnsupportedEdgeClause(other.kind_name())),
        };
        let predicate = Predicate::compile(clause)?;

        Ok(self
            .graph
            .edges_with_property(property)
            .iter()
            .filter(|id| {
                self.graph
                    .edge(id)
                    .is_some_and(|edge| predicate.matches_properties(&edge.properties))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LoadConfig, RawEdge, RawNode};

    fn nid(id: u64) -> NodeId {
        NodeId::from(id)
    }

    fn movie_engine() -> FilterEngine {
        let nodes = vec![
            RawNode::new("1", &["Person"]).with_property("name", "Keanu Reeves").with_property("born", 1964),
            RawNode::new("2", &["Person", "Director"]).with_property("name", "Lana Wachowski"),
            RawNode::new("3", &["Movie"]).with_property("title", "The Matrix").with_property("rating", 8.7),
            RawNode::new("4", &["Movie"]).with_property("title", "Johnny Mnemonic").with_property("rating", 5.6),
            RawNode::new("5", &["Movie"]).with_property("title", "Speed").with_property("rating", "n/a"),
        ];
        let edges = vec![
            RawEdge::new("10", "1", "3", "ACTED_IN").with_property("year", 1999),
            RawEdge::new("11", "1", "4", "ACTED_IN").with_property("year", 1995),
            RawEdge::new("12", "2", "3", "DIRECTED"),
            RawEdge::new("13", "1", "5", "ACTED_IN"),
        ];
        let (model, _) = GraphModel::build(nodes, edges, &LoadConfig::unlimited());
        FilterEngine::new(Arc::new(model))
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let engine = movie_engine();
        let view = engine.filter(&FilterSpec::new()).unwrap();
        assert_eq!(view.node_count(), 5);
        assert_eq!(view.edge_count(), 4);
    }

    #[test]
    fn test_label_clause_is_or_within() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::labels(["Director", "Movie"]));
        let ids = engine.matching_nodes(&spec).unwrap();
        assert_eq!(ids, vec![nid(2), nid(3), nid(4), nid(5)]);
    }

    #[test]
    fn test_empty_label_set_matches_nothing() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::labels(Vec::<&str>::new()));
        assert!(engine.matching_nodes(&spec).unwrap().is_empty());
    }

    #[test]
    fn test_numeric_range() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::NumericRange {
            property: "rating".to_string(),
            min: Some(8.0),
            max: None,
            min_inclusive: false,
            max_inclusive: true,
        });
        assert_eq!(engine.matching_nodes(&spec).unwrap(), vec![nid(3)]);

        let exclusive_max = FilterSpec::new().with(FilterClause::NumericRange {
            property: "rating".to_string(),
            min: Some(5.6),
            max: Some(8.7),
            min_inclusive: true,
            max_inclusive: false,
        });
        assert_eq!(engine.matching_nodes(&exclusive_max).unwrap(), vec![nid(4)]);
    }

    #[test]
    fn test_invalid_range_is_error() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::numeric_range("rating", Some(9.0), Some(1.0)));
        assert!(matches!(
            engine.matching_nodes(&spec),
            Err(QueryError::InvalidRange { .. })
        ));

        let nan = FilterSpec::new().with(FilterClause::numeric_range("rating", Some(f64::NAN), None));
        assert!(matches!(engine.matching_nodes(&nan), Err(QueryError::NanBound { .. })));
    }

    #[test]
    fn test_unknown_property_matches_nothing() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::numeric_range("budget", None, None));
        assert_eq!(engine.matching_nodes(&spec).unwrap(), Vec::<NodeId>::new());
    }

    #[test]
    fn test_text_modes() {
        let engine = movie_engine();

        let contains = FilterSpec::new().with(FilterClause::text("title", "MATRIX"));
        assert_eq!(engine.matching_nodes(&contains).unwrap(), vec![nid(3)]);

        let case_sensitive = FilterSpec::new().with(FilterClause::Text {
            property: "title".to_string(),
            pattern: "MATRIX".to_string(),
            case_sensitive: true,
            mode: TextMatchMode::Contains,
        });
        assert!(engine.matching_nodes(&case_sensitive).unwrap().is_empty());

        let starts_with = FilterSpec::new().with(FilterClause::Text {
            property: "title".to_string(),
            pattern: "johnny".to_string(),
            case_sensitive: false,
            mode: TextMatchMode::StartsWith,
        });
        assert_eq!(engine.matching_nodes(&starts_with).unwrap(), vec![nid(4)]);

        let equals = FilterSpec::new().with(FilterClause::Text {
            property: "title".to_string(),
            pattern: "speed".to_string(),
            case_sensitive: false,
            mode: TextMatchMode::Equals,
        });
        assert_eq!(engine.matching_nodes(&equals).unwrap(), vec![nid(5)]);

        let regex = FilterSpec::new().with(FilterClause::Text {
            property: "title".to_string(),
            pattern: "^the .*x$".to_string(),
            case_sensitive: false,
            mode: TextMatchMode::Regex,
        });
        assert_eq!(engine.matching_nodes(&regex).unwrap(), vec![nid(3)]);
    }

    #[test]
    fn test_text_on_numbers_uses_stringified_value() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::text("born", "196"));
        assert_eq!(engine.matching_nodes(&spec).unwrap(), vec![nid(1)]);
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::Text {
            property: "title".to_string(),
            pattern: "(unclosed".to_string(),
            case_sensitive: false,
            mode: TextMatchMode::Regex,
        });
        assert!(matches!(
            engine.matching_nodes(&spec),
            Err(QueryError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_relationship_clause() {
        let engine = movie_engine();

        let directors = FilterSpec::new().with(FilterClause::relationship(
            Direction::Outgoing,
            Some("DIRECTED"),
            None,
        ));
        assert_eq!(engine.matching_nodes(&directors).unwrap(), vec![nid(2)]);

        let directed_movies = FilterSpec::new().with(FilterClause::relationship(
            Direction::Incoming,
            None,
            Some("Director"),
        ));
        assert_eq!(engine.matching_nodes(&directed_movies).unwrap(), vec![nid(3)]);

        let any_link = FilterSpec::new().with(FilterClause::relationship(Direction::Either, None, None));
        assert_eq!(engine.matching_nodes(&any_link).unwrap().len(), 5);
    }

    #[test]
    fn test_degree_clause() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::degree(Direction::Either, Some(2), None));
        assert_eq!(engine.matching_nodes(&spec).unwrap(), vec![nid(1), nid(3)]);

        let bad = FilterSpec::new().with(FilterClause::degree(Direction::Either, Some(3), Some(1)));
        assert_eq!(
            engine.matching_nodes(&bad),
            Err(QueryError::InvalidDegreeRange { min: 3, max: 1 })
        );
    }

    #[test]
    fn test_clauses_combine_by_intersection() {
        let engine = movie_engine();
        let spec = FilterSpec::new()
            .with(FilterClause::labels(["Movie"]))
            .with(FilterClause::relationship(Direction::Incoming, Some("ACTED_IN"), Some("Person")))
            .with(FilterClause::numeric_range("rating", Some(5.0), None));
        assert_eq!(engine.matching_nodes(&spec).unwrap(), vec![nid(3), nid(4)]);

        let view = engine.filter(&spec).unwrap();
        assert_eq!(view.edge_count(), 0);
    }

    #[test]
    fn test_filtered_view_is_induced() {
        let engine = movie_engine();
        let spec = FilterSpec::new().with(FilterClause::labels(["Person", "Movie"]));
        let view = engine.filter(&spec).unwrap();

        assert_eq!(view.node_count(), 5);
        assert_eq!(view.edge_count(), 4);

        let only_keanu_and_matrix = engine
            .filter(&FilterSpec::new().with(FilterClause::text("name", "keanu")))
            .unwrap();
        assert_eq!(only_keanu_and_matrix.edge_count(), 0);
    }

    #[test]
    fn test_matching_edges() {
        let engine = movie_engine();
        let ids = engine
            .matching_edges(&FilterClause::numeric_range("year", Some(1998.0), None))
            .unwrap();
        assert_eq!(ids, vec![EdgeId::from(10u64)]);

        assert_eq!(
            engine.matching_edges(&FilterClause::labels(["Movie"])),
            Err(QueryError::UnsupportedEdgeClause("label"))
        );
    }

    #[test]
    fn test_spec_from_json() {
        let json = r#"{"clauses": [
            {"kind": "label", "labels": ["Movie"]},
            {"kind": "numeric_range", "property": "rating", "min": 8.0, "max": null, "min_inclusive": false},
            {"kind": "relationship", "direction": "incoming", "relationship_type": "ACTED_IN", "neighbor_label": null}
        ]}"#;
        let spec: FilterSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.clauses.len(), 3);

        let engine = movie_engine();
        assert_eq!(engine.matching_nodes(&spec).unwrap(), vec![nid(3)]);
    }
}

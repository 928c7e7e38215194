//! Text search, property search and structural pattern matching

use super::{QueryError, QueryResult};
use crate::graph::{Direction, EdgeId, EdgeType, GraphModel, Label, Node, NodeId, PropertyValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Search settings supplied by the configuration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Case sensitivity used by `text_search_default`
    pub case_sensitive: bool,
    /// Maximum number of edges a pattern search may examine
    pub pattern_budget: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            pattern_budget: usize::MAX,
        }
    }
}

/// How a text search hit matched. Exact hits rank first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MatchKind {
    /// A label or property equals the query
    Exact,
    /// A label or property contains the query
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub node_id: NodeId,
    pub kind: MatchKind,
}

/// Structural query: `(source:Label)-[:TYPE]->(target:Label)`
///
/// `None` is a wildcard. With `Direction::Incoming` the source role sits at
/// the edge's target end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub source_label: Option<Label>,
    pub relationship_type: Option<EdgeType>,
    #[serde(default = "outgoing")]
    pub direction: Direction,
    pub target_label: Option<Label>,
}

fn outgoing() -> Direction {
    Direction::Outgoing
}

impl PatternSpec {
    pub fn new(direction: Direction) -> Self {
        Self {
            source_label: None,
            relationship_type: None,
            direction,
            target_label: None,
        }
    }

    pub fn source(mut self, label: impl Into<Label>) -> Self {
        self.source_label = Some(label.into());
        self
    }

    pub fn relationship(mut self, edge_type: impl Into<EdgeType>) -> Self {
        self.relationship_type = Some(edge_type.into());
        self
    }

    pub fn target(mut self, label: impl Into<Label>) -> Self {
        self.target_label = Some(label.into());
        self
    }

    fn validate(&self) -> QueryResult<()> {
        if self.source_label.as_ref().is_some_and(|l| l.as_str().is_empty()) {
            return Err(QueryError::EmptyPatternComponent("source label"));
        }
        if self.target_label.as_ref().is_some_and(|l| l.as_str().is_empty()) {
            return Err(QueryError::EmptyPatternComponent("target label"));
        }
        if self
            .relationship_type
            .as_ref()
            .is_some_and(|t| t.as_str().is_empty())
        {
            return Err(QueryError::EmptyPatternComponent("relationship type"));
        }
        Ok(())
    }
}

/// One matched `(source, edge, target)` triple, in pattern role order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PatternMatch {
    pub source: NodeId,
    pub edge: EdgeId,
    pub target: NodeId,
}

/// Pattern search outcome. When `budget_exceeded` is set the matches are
/// only those found before the traversal stopped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternResult {
    pub matches: Vec<PatternMatch>,
    pub budget_exceeded: bool,
    pub edges_examined: usize,
}

impl PatternResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Search engine over one base graph
#[derive(Debug, Clone)]
pub struct SearchEngine {
    graph: Arc<GraphModel>,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(graph: Arc<GraphModel>, config: SearchConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &Arc<GraphModel> {
        &self.graph
    }

    /// Text search with the configured default case sensitivity
    pub fn text_search_default(&self, query: &str) -> Vec<NodeId> {
        self.text_search(query, self.config.case_sensitive)
    }

    /// Nodes whose labels or stringified property values contain `query`.
    ///
    /// Exact matches come first, then substring matches; ties are broken by
    /// ascending node id. An empty query matches nothing.
    pub fn text_search(&self, query: &str, case_sensitive: bool) -> Vec<NodeId> {
        self.text_search_hits(query, case_sensitive)
            .into_iter()
            .map(|hit| hit.node_id)
            .collect()
    }

    /// Like `text_search`, keeping the match kind of each hit
    pub fn text_search_hits(&self, query: &str, case_sensitive: bool) -> Vec<SearchHit> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = fold_case(query, case_sensitive);

        let mut hits: Vec<SearchHit> = self
            .graph
            .nodes()
            .filter_map(|node| {
                best_match(node, &needle, case_sensitive).map(|kind| SearchHit {
                    node_id: node.id.clone(),
                    kind,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.node_id.cmp(&b.node_id)));

        debug!("Text search '{}' matched {} nodes", query, hits.len());
        hits
    }

    /// Nodes whose `property` equals `value`, optionally restricted to a label.
    ///
    /// Equality is exact and type-strict: strings match case-sensitively and a
    /// number never equals a string. Null matches nothing. Results are in base
    /// insertion order.
    pub fn property_search(
        &self,
        property: &str,
        value: &PropertyValue,
        label: Option<&Label>,
    ) -> Vec<NodeId> {
        self.graph
            .nodes_with_property(property)
            .iter()
            .filter_map(|id| self.graph.node(id))
            .filter(|node| label.map_or(true, |l| node.has_label(l)))
            .filter(|node| {
                node.get_property(property)
                    .is_some_and(|actual| strictly_equal(actual, value))
            })
            .map(|node| node.id.clone())
            .collect()
    }

    /// `property_search` for raw search-box input; digit strings are searched
    /// as numbers
    pub fn property_search_input(
        &self,
        property: &str,
        input: &str,
        label: Option<&Label>,
    ) -> Vec<NodeId> {
        self.property_search(property, &PropertyValue::from_query_input(input), label)
    }

    /// Match every edge against a pattern, in edge insertion order.
    ///
    /// At most `pattern_budget` edges are examined; the result says whether
    /// the traversal stopped early.
    pub fn pattern_search(&self, pattern: &PatternSpec) -> QueryResult<PatternResult> {
        pattern.validate()?;

        let graph = self.graph.as_ref();
        let candidates: Box<dyn Iterator<Item = &EdgeId> + '_> = match &pattern.relationship_type {
            Some(edge_type) => Box::new(graph.edges_by_type(edge_type).iter()),
            None => Box::new(graph.edges().map(|edge| &edge.id)),
        };

        let role_matches = |node_id: &NodeId, wanted: &Option<Label>| match wanted {
            None => true,
            Some(label) => graph.node(node_id).is_some_and(|node| node.has_label(label)),
        };

        let mut result = PatternResult::default();
        for edge_id in candidates {
            if result.edges_examined >= self.config.pattern_budget {
                result.budget_exceeded = true;
                break;
            }
            result.edges_examined += 1;

            let Some(edge) = graph.edge(edge_id) else {
                continue;
            };

            let forward = matches!(pattern.direction, Direction::Outgoing | Direction::Either)
                && role_matches(&edge.source, &pattern.source_label)
                && role_matches(&edge.target, &pattern.target_label);
            let backward = matches!(pattern.direction, Direction::Incoming | Direction::Either)
                && role_matches(&edge.target, &pattern.source_label)
                && role_matches(&edge.source, &pattern.target_label);

            if forward {
                result.matches.push(PatternMatch {
                    source: edge.source.clone(),
                    edge: edge.id.clone(),
                    target: edge.target.clone(),
                });
            }
            // A self-loop read backwards is the same triple
            if backward && !(forward && edge.is_self_loop()) {
                result.matches.push(PatternMatch {
                    source: edge.target.clone(),
                    edge: edge.id.clone(),
                    target: edge.source.clone(),
                });
            }
        }

        if result.budget_exceeded {
            warn!(
                "Pattern search stopped after {} edges (budget {}), {} partial matches",
                result.edges_examined,
                self.config.pattern_budget,
                result.matches.len()
            );
        } else {
            debug!("Pattern search matched {} triples", result.matches.len());
        }

        Ok(result)
    }
}

fn fold_case(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Best match kind of a node against an already case-folded needle
fn best_match(node: &Node, needle: &str, case_sensitive: bool) -> Option<MatchKind> {
    let label_texts = node.labels.iter().map(|label| label.as_str().to_string());
    let property_texts = node
        .properties
        .values()
        .filter_map(PropertyValue::to_search_text);

    let mut best = None;
    for text in label_texts.chain(property_texts) {
        let text = fold_case(&text, case_sensitive);
        if text == needle {
            return Some(MatchKind::Exact);
        }
        if text.contains(needle) {
            best = Some(MatchKind::Substring);
        }
    }
    best
}

fn strictly_equal(actual: &PropertyValue, expected: &PropertyValue) -> bool {
    match (actual, expected) {
        (PropertyValue::Number(a), PropertyValue::Number(b)) => a == b,
        (PropertyValue::String(a), PropertyValue::String(b)) => a == b,
        (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => a == b,
        (PropertyValue::List(a), PropertyValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| strictly_equal(x, y))
        }
        _ => false,
    }
}

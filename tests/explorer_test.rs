use graph_explorer::graph::{
    Direction, DropReason, EdgeId, GraphModel, LoadConfig, LoadWarning, NodeId, RawEdge, RawGraph,
    RawNode, View,
};
use graph_explorer::query::{FilterClause, FilterEngine, FilterSpec, PatternMatch, PatternSpec, SearchConfig, SearchEngine};
use graph_explorer::StatisticsEngine;
use std::sync::Arc;

fn nid(id: &str) -> NodeId {
    NodeId::new(id)
}

fn movie_db() -> Arc<GraphModel> {
    let nodes = vec![
        RawNode::new("1", &["Person"]).with_property("name", "Tom Hanks"),
        RawNode::new("2", &["Movie"]).with_property("title", "Cast Away").with_property("rating", 7.8),
        RawNode::new("3", &["Movie"]).with_property("title", "The Matrix").with_property("rating", 8.7),
        RawNode::new("4", &["Person", "Director"]).with_property("name", "Lana Wachowski"),
        RawNode::new("5", &["Movie"]).with_property("title", "Cloud Atlas").with_property("rating", 8.0),
        RawNode::new("6", &["Book"]).with_property("title", "Cloud Atlas").with_property("rating", 9.1),
    ];
    let edges = vec![
        RawEdge::new("10", "1", "2", "ACTED_IN"),
        RawEdge::new("11", "1", "5", "ACTED_IN"),
        RawEdge::new("12", "4", "3", "DIRECTED"),
        RawEdge::new("13", "4", "5", "DIRECTED"),
        RawEdge::new("14", "5", "6", "BASED_ON"),
    ];
    let (model, warnings) = GraphModel::build(nodes, edges, &LoadConfig::unlimited());
    assert!(warnings.is_empty());
    Arc::new(model)
}

fn assert_induced(view: &View) {
    let graph = view.graph();
    let expected: Vec<&EdgeId> = graph
        .edges()
        .filter(|e| view.contains_node(&e.source) && view.contains_node(&e.target))
        .map(|e| &e.id)
        .collect();
    let actual: Vec<&EdgeId> = view.edge_ids().iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_empty_filter_is_identity() {
    let graph = movie_db();
    let view = FilterEngine::new(graph.clone()).filter(&FilterSpec::new()).unwrap();

    assert_eq!(view.node_count(), graph.node_count());
    assert_eq!(view.edge_count(), graph.edge_count());
}

#[test]
fn test_filter_results_are_induced() {
    let engine = FilterEngine::new(movie_db());
    let specs = vec![
        FilterSpec::new().with(FilterClause::labels(["Movie"])),
        FilterSpec::new().with(FilterClause::labels(["Person", "Movie"])),
        FilterSpec::new().with(FilterClause::text("title", "cloud")),
        FilterSpec::new().with(FilterClause::relationship(Direction::Incoming, Some("DIRECTED"), None)),
        FilterSpec::new().with(FilterClause::degree(Direction::Either, Some(2), None)),
    ];

    for spec in &specs {
        assert_induced(&engine.filter(spec).unwrap());
    }
}

#[test]
fn test_conjunction_never_widens() {
    let engine = FilterEngine::new(movie_db());
    let label = FilterClause::labels(["Movie"]);
    let range = FilterClause::NumericRange {
        property: "rating".to_string(),
        min: Some(8.0),
        max: None,
        min_inclusive: false,
        max_inclusive: true,
    };

    let by_label = engine.filter(&FilterSpec::new().with(label.clone())).unwrap();
    let by_range = engine.filter(&FilterSpec::new().with(range.clone())).unwrap();
    let both = engine.filter(&FilterSpec::new().with(label).with(range)).unwrap();

    assert!(both.node_count() <= by_label.node_count());
    assert!(both.node_count() <= by_range.node_count());
    // Exclusive lower bound leaves out Cloud Atlas (8.0)
    assert_eq!(both.node_ids(), &[nid("3")]);
}

#[test]
fn test_text_search_case_sensitivity() {
    let search = SearchEngine::new(movie_db(), SearchConfig::default());

    assert!(search.text_search("matrix", false).contains(&nid("3")));
    assert!(!search.text_search("MATRIX", true).contains(&nid("3")));
}

#[test]
fn test_text_search_exact_before_substring() {
    let search = SearchEngine::new(movie_db(), SearchConfig::default());
    // "Movie" is an exact label on 2, 3, 5; nothing else contains it
    assert_eq!(search.text_search("movie", false), vec![nid("2"), nid("3"), nid("5")]);
    // Both titles are exact hits, so id order decides
    assert_eq!(search.text_search("cloud atlas", false), vec![nid("5"), nid("6")]);
}

#[test]
fn test_acted_in_pattern() {
    let nodes = vec![
        RawNode::new("1", &["Person"]).with_property("name", "Tom Hanks"),
        RawNode::new("2", &["Movie"]).with_property("title", "Cast Away"),
    ];
    let edges = vec![RawEdge::new("10", "1", "2", "ACTED_IN")];
    let (model, _) = GraphModel::build(nodes, edges, &LoadConfig::unlimited());
    let search = SearchEngine::new(Arc::new(model), SearchConfig::default());

    let pattern = PatternSpec::new(Direction::Outgoing)
        .source("Person")
        .relationship("ACTED_IN")
        .target("Movie");
    let result = search.pattern_search(&pattern).unwrap();

    assert_eq!(
        result.matches,
        vec![PatternMatch {
            source: nid("1"),
            edge: EdgeId::new("10"),
            target: nid("2"),
        }]
    );
    assert!(!result.budget_exceeded);
}

#[test]
fn test_label_bucket_sum() {
    let stats = StatisticsEngine::new(movie_db()).graph_statistics();
    assert!(stats.label_total() > stats.node_count);

    let single = {
        let nodes = vec![RawNode::new("1", &["A"]), RawNode::new("2", &["B"])];
        let (model, _) = GraphModel::build(nodes, Vec::new(), &LoadConfig::unlimited());
        StatisticsEngine::new(Arc::new(model)).graph_statistics()
    };
    assert_eq!(single.label_total(), single.node_count);
}

#[test]
fn test_dangling_edge_is_dropped() {
    let raw = RawGraph::new(
        vec![RawNode::new("1", &["Person"])],
        vec![
            RawEdge::new("10", "1", "99", "KNOWS"),
            RawEdge::new("11", "1", "1", "SELF"),
        ],
    );
    let (model, warnings) = GraphModel::build(raw.nodes, raw.edges, &LoadConfig::unlimited());

    assert_eq!(
        warnings,
        vec![LoadWarning::DroppedEdge {
            edge_id: EdgeId::new("10"),
            reason: DropReason::EndpointMissing {
                node_id: nid("99"),
                truncated: false,
            },
        }]
    );
    assert!(model.edge(&EdgeId::new("10")).is_none());
    assert_eq!(model.edge_count(), 1);
}

#[test]
fn test_json_snapshot_roundtrip_through_engines() {
    let json = r#"{
        "nodes": [
            {"id": 1, "labels": ["Person"], "properties": {"name": "Keanu Reeves", "born": 1964}},
            {"id": 2, "labels": ["Movie"], "properties": {"title": "The Matrix", "tags": ["sci-fi", "action"]}},
            {"id": 3, "labels": [], "properties": {"meta": {"source": "import"}}}
        ],
        "relationships": [
            {"id": 5, "start_node": 1, "end_node": 2, "type": "ACTED_IN", "properties": {"roles": ["Neo"]}}
        ]
    }"#;
    let raw = RawGraph::from_json_str(json).unwrap();
    let (model, warnings) = GraphModel::build(raw.nodes, raw.edges, &LoadConfig::new(500));
    assert!(warnings.is_empty());

    let graph = Arc::new(model);
    let search = SearchEngine::new(graph.clone(), SearchConfig::default());
    assert_eq!(search.text_search("sci-fi", false), vec![nid("2")]);
    assert_eq!(search.text_search("unknown", false), vec![nid("3")]);
    assert_eq!(search.text_search("import", false), vec![nid("3")]);

    let stats = StatisticsEngine::new(graph).graph_statistics();
    assert_eq!(stats.isolated_nodes, 1);
    assert_eq!(stats.property_stats["born"].max, 1964.0);
}

use anyhow::Context;
use graph_explorer::graph::{Direction, RawEdge, RawGraph, RawNode};
use graph_explorer::{
    ExplorerConfig, FilterClause, FilterSpec, GraphSession, PatternSpec, StaticFetcher,
    StatisticsEngine,
};

/// Usage: graph-explorer [snapshot.json] [config.yaml]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Graph Explorer v{}", graph_explorer::version());
    println!("==========================================");
    println!();

    let mut args = std::env::args().skip(1);
    let snapshot = args.next();
    let config = match args.next() {
        Some(path) => ExplorerConfig::from_file(&path)
            .with_context(|| format!("loading config {}", path))?,
        None => {
            let mut config = ExplorerConfig::default();
            config.apply_env()?;
            config
        }
    };

    let fetcher = match snapshot {
        Some(path) => StaticFetcher::from_json_file(&path)
            .with_context(|| format!("reading snapshot {}", path))?,
        None => StaticFetcher::new(demo_graph()),
    };

    let session = GraphSession::new(config);
    let warnings = session.reload_from(&fetcher).await?;
    for warning in &warnings {
        println!("  ! {}", warning);
    }

    demo_statistics(&session);
    demo_search(&session);
    demo_filter(&session)?;
    demo_patterns(&session)?;

    Ok(())
}

fn demo_graph() -> RawGraph {
    let nodes = vec![
        RawNode::new("1", &["Person"]).with_property("name", "Tom Hanks").with_property("born", 1956),
        RawNode::new("2", &["Movie"]).with_property("title", "Cast Away").with_property("released", 2000),
        RawNode::new("3", &["Movie"]).with_property("title", "The Matrix").with_property("released", 1999),
        RawNode::new("4", &["Person"]).with_property("name", "Keanu Reeves").with_property("born", 1964),
        RawNode::new("5", &["Person", "Director"]).with_property("name", "Lana Wachowski").with_property("born", 1965),
    ];
    let edges = vec![
        RawEdge::new("10", "1", "2", "ACTED_IN").with_property("role", "Chuck Noland"),
        RawEdge::new("11", "4", "3", "ACTED_IN").with_property("role", "Neo"),
        RawEdge::new("12", "5", "3", "DIRECTED"),
        RawEdge::new("13", "1", "4", "KNOWS"),
    ];
    RawGraph::new(nodes, edges)
}

fn demo_statistics(session: &GraphSession) {
    println!("=== Statistics ===");
    let stats = session.statistics();
    println!("  Generation: {}", stats.generation);
    println!("  Nodes: {}, edges: {}", stats.node_count, stats.edge_count);
    for (label, count) in &stats.label_counts {
        println!("  :{} x{}", label, count);
    }
    for (edge_type, count) in &stats.relationship_type_counts {
        println!("  [:{}] x{}", edge_type, count);
    }
    println!(
        "  Out-degree min/max/mean: {}/{}/{:.2}",
        stats.out_degree.min, stats.out_degree.max, stats.out_degree.mean
    );
    println!("  Connected components: {}", stats.connected_components);
    println!("  Density: {:.3}", stats.density);
}

fn demo_search(session: &GraphSession) {
    println!("\n=== Text Search ===");
    for query in ["matrix", "keanu"] {
        let hits = session.text_search(query);
        println!("  '{}' -> {:?}", query, hits.iter().map(|id| id.as_str()).collect::<Vec<_>>());
    }
}

fn demo_filter(session: &GraphSession) -> anyhow::Result<()> {
    println!("\n=== Filter ===");
    let spec = FilterSpec::new()
        .with(FilterClause::labels(["Person"]))
        .with(FilterClause::numeric_range("born", Some(1960.0), None));
    let view = session.filter(&spec)?;
    for node in view.nodes() {
        println!("  {} {:?}", node.id, node.get_property("name"));
    }
    let stats = StatisticsEngine::view_statistics(&view);
    println!("  View: {} nodes, {} edges", stats.node_count, stats.edge_count);
    Ok(())
}

fn demo_patterns(session: &GraphSession) -> anyhow::Result<()> {
    println!("\n=== Pattern Search ===");
    let pattern = PatternSpec::new(Direction::Outgoing)
        .source("Person")
        .relationship("ACTED_IN")
        .target("Movie");
    let result = session.pattern_search(&pattern)?;
    for m in &result.matches {
        println!("  ({})-[{}]->({})", m.source.as_str(), m.edge.as_str(), m.target.as_str());
    }
    if result.budget_exceeded {
        println!("  (truncated after {} edges)", result.edges_examined);
    }
    Ok(())
}

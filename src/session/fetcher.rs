//! Source of raw records for a load

use crate::graph::RawGraph;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed records: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Supplies one bounded batch of raw records.
///
/// `limit` is the number of nodes the caller will keep; a source may return
/// more, and the model build truncates.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, limit: usize) -> FetchResult<RawGraph>;
}

/// Serves a fixed set of records, e.g. an exported JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    graph: RawGraph,
}

impl StaticFetcher {
    pub fn new(graph: RawGraph) -> Self {
        Self { graph }
    }

    pub fn from_json_str(json: &str) -> FetchResult<Self> {
        Ok(Self::new(RawGraph::from_json_str(json)?))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> FetchResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, limit: usize) -> FetchResult<RawGraph> {
        debug!(
            "Serving {} nodes, {} edges (limit {})",
            self.graph.nodes.len(),
            self.graph.edges.len(),
            limit
        );
        Ok(self.graph.clone())
    }
}

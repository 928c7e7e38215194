//! The currently loaded graph
//!
//! `GraphSession` owns the shared base graph. Queries take a snapshot (a clone
//! of the `Arc`) and run without holding any lock. Reload builds the new model
//! first and then swaps the pointer, so every query sees one complete
//! generation.

pub mod fetcher;

use crate::algo::{GraphStatistics, StatisticsEngine};
use crate::config::ExplorerConfig;
use crate::graph::{GraphModel, LoadWarning, NodeId, RawGraph, View};
use crate::query::{FilterEngine, FilterSpec, PatternResult, PatternSpec, QueryResult, SearchEngine};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{info, warn};

pub use fetcher::{FetchError, FetchResult, Fetcher, StaticFetcher};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Reload failed, previous graph kept: {0}")]
    Fetch(#[from] FetchError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Shared handle on the loaded graph
#[derive(Debug)]
pub struct GraphSession {
    current: RwLock<Arc<GraphModel>>,
    config: ExplorerConfig,
}

impl GraphSession {
    /// Session holding an empty generation-0 graph
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(GraphModel::empty())),
            config,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// The graph as of now. Holding it keeps that generation alive.
    pub fn snapshot(&self) -> Arc<GraphModel> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }

    /// Build a model from `raw` and publish it.
    ///
    /// The build runs outside the lock; only the pointer swap is exclusive.
    pub fn reload(&self, raw: RawGraph) -> Vec<LoadWarning> {
        let (model, warnings) = GraphModel::build(raw.nodes, raw.edges, &self.config.load_config());

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let generation = current.generation() + 1;
        let model = Arc::new(model.with_generation(generation));
        info!(
            "Published generation {}: {} nodes, {} edges, {} warnings",
            generation,
            model.node_count(),
            model.edge_count(),
            warnings.len()
        );
        *current = model;
        warnings
    }

    /// Fetch fresh records and reload. On fetch failure the current graph
    /// stays published.
    pub async fn reload_from<F>(&self, fetcher: &F) -> SessionResult<Vec<LoadWarning>>
    where
        F: Fetcher + ?Sized,
    {
        let raw = match fetcher.fetch(self.config.max_nodes).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Fetch failed, keeping generation {}: {}", self.generation(), e);
                return Err(e.into());
            }
        };
        Ok(self.reload(raw))
    }

    pub fn filter_engine(&self) -> FilterEngine {
        FilterEngine::new(self.snapshot())
    }

    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::new(self.snapshot(), self.config.search_config())
    }

    pub fn statistics_engine(&self) -> StatisticsEngine {
        StatisticsEngine::new(self.snapshot())
    }

    pub fn filter(&self, spec: &FilterSpec) -> QueryResult<View> {
        self.filter_engine().filter(spec)
    }

    /// Text search with the configured case sensitivity
    pub fn text_search(&self, query: &str) -> Vec<NodeId> {
        self.search_engine().text_search_default(query)
    }

    pub fn pattern_search(&self, pattern: &PatternSpec) -> QueryResult<PatternResult> {
        self.search_engine().pattern_search(pattern)
    }

    pub fn statistics(&self) -> GraphStatistics {
        self.statistics_engine().graph_statistics()
    }
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(ExplorerConfig::default())
    }
}

//! Query engines over a graph snapshot
//!
//! - `FilterEngine`: compound filter specifications producing induced views
//! - `SearchEngine`: text search, property search and pattern matching
//!
//! Both are pure reads over one `Arc<GraphModel>`; a reload never changes the
//! graph an engine was created with.

pub mod filter;
pub mod search;

use thiserror::Error;

pub use filter::{FilterClause, FilterEngine, FilterSpec, TextMatchMode};
pub use search::{
    MatchKind, PatternMatch, PatternResult, PatternSpec, SearchConfig, SearchEngine, SearchHit,
};

/// Caller mistakes in a query. Zero matches is never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Invalid range on '{property}': min {min} is greater than max {max}")]
    InvalidRange { property: String, min: f64, max: f64 },

    #[error("Invalid range on '{property}': bound is NaN")]
    NanBound { property: String },

    #[error("Invalid degree range: min {min} is greater than max {max}")]
    InvalidDegreeRange { min: usize, max: usize },

    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("Pattern {0} must not be empty")]
    EmptyPatternComponent(&'static str),

    #[error("Clause kind '{0}' cannot be evaluated against edges")]
    UnsupportedEdgeClause(&'static str),
}

pub type QueryResult<T> = Result<T, QueryError>;

//! Hop-distance queries over call graphs recorded from program execution.
//!
//! Edge records are built into a [`CallGraph`], the all-pairs
//! [`DistanceMatrix`] is computed over it, and loosely specified method
//! identifiers are resolved to concrete nodes through [`IdentifierPattern`].
//! [`CallTreeQuery`] ties the pieces together and [`DistanceCache`] shares
//! built queries per analysis unit.

mod cache;
mod distance;
mod graph;
mod pattern;
mod query;
mod resolver;
mod summary;

use hopscope_store::StoreError;
use thiserror::Error;

pub use cache::DistanceCache;
pub use distance::DistanceMatrix;
pub use graph::{CallGraph, GraphOptions};
pub use pattern::IdentifierPattern;
pub use query::CallTreeQuery;
pub use resolver::resolve_shortest_path;
pub use summary::GraphSummary;

#[derive(Debug, Error)]
pub enum GraphAlgoError {
    #[error("invalid identifier pattern '{fragment}': {source}")]
    InvalidPattern {
        fragment: String,
        #[source]
        source: regex::Error,
    },
    #[error(
        "invalid weight {weight} on edge '{caller}' -> '{callee}': weights must be finite and non-negative"
    )]
    InvalidWeight {
        caller: String,
        callee: String,
        weight: f64,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

use std::path::Path;

use anyhow::{Context, Result};
use hopscope_config::{HopscopeConfig, edges_dir};
use hopscope_graph_algo::{CallTreeQuery, GraphOptions};
use hopscope_store::{EdgeStore, FileEdgeStore};
use tracing::debug;

/// Loads the edges of `unit` from the workspace edge directory and builds
/// its query without going through the distance cache.
pub fn open_unit_query(
    workspace: &Path,
    config: &HopscopeConfig,
    unit: &str,
    options: GraphOptions,
) -> Result<CallTreeQuery> {
    let store = FileEdgeStore::open(edges_dir(workspace, config));
    let edges = store
        .load_edges(unit)
        .with_context(|| format!("failed to load call edges for unit '{unit}'"))?;
    debug!(unit, edge_records = edges.len(), root = %store.root().display(), "loaded unit edges");

    CallTreeQuery::from_edges(&edges, options)
        .with_context(|| format!("failed to build call graph for unit '{unit}'"))
}

//! Experiment evaluation over recorded call trees: hop distances between
//! test entry points, patched methods and predicted fault locations, plus
//! consistency checks for predictions.

use std::path::PathBuf;

use hopscope_graph_algo::GraphAlgoError;
use hopscope_store::StoreError;
use thiserror::Error;

mod cases;
mod evaluation;

pub use cases::{EvaluationCase, Prediction, load_cases, split_identifier_list};
pub use evaluation::{
    CaseReport, EvaluationCheck, EvaluationRequest, HopAnalyzer, HopMetric,
    PredictionConsistency, graph_options,
};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("config error: {0}")]
    Config(#[from] hopscope_config::ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("graph error: {0}")]
    Graph(#[from] GraphAlgoError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid cases file {path}: {source}")]
    Cases {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use hopscope_config::{HopscopeConfig, edges_dir, load_workspace_config};
use hopscope_core::optional_hop_distance;
use hopscope_graph_algo::{CallTreeQuery, DistanceCache, GraphAlgoError, GraphOptions};
use hopscope_store::{EdgeStore, FileEdgeStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{AnalysisError, EvaluationCase, Prediction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationCheck {
    PredictionHops,
    EntryHops,
    EntryPredictionHops,
    PatchInCallTree,
    PredictionConsistency,
}

impl EvaluationCheck {
    pub const ALL: [EvaluationCheck; 5] = [
        EvaluationCheck::PredictionHops,
        EvaluationCheck::EntryHops,
        EvaluationCheck::EntryPredictionHops,
        EvaluationCheck::PatchInCallTree,
        EvaluationCheck::PredictionConsistency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PredictionHops => "prediction_hops",
            Self::EntryHops => "entry_hops",
            Self::EntryPredictionHops => "entry_prediction_hops",
            Self::PatchInCallTree => "patch_in_call_tree",
            Self::PredictionConsistency => "prediction_consistency",
        }
    }
}

impl std::str::FromStr for EvaluationCheck {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "prediction_hops" => Ok(Self::PredictionHops),
            "entry_hops" => Ok(Self::EntryHops),
            "entry_prediction_hops" => Ok(Self::EntryPredictionHops),
            "patch_in_call_tree" => Ok(Self::PatchInCallTree),
            "prediction_consistency" => Ok(Self::PredictionConsistency),
            other => Err(format!(
                "invalid check '{other}', expected one of: prediction_hops, entry_hops, \
                 entry_prediction_hops, patch_in_call_tree, prediction_consistency"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EvaluationRequest {
    pub checks: Option<Vec<EvaluationCheck>>,
}

/// A minimised hop distance, or the reason it was not computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopMetric {
    #[serde(default, with = "optional_hop_distance")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl HopMetric {
    fn measured(distance: Option<f64>) -> Self {
        Self {
            distance,
            skipped: None,
        }
    }

    fn skipped(reason: &str) -> Self {
        Self {
            distance: None,
            skipped: Some(reason.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionConsistency {
    pub class_exists: bool,
    pub method_exists: bool,
    pub complete_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    pub id: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub patch_in_call_tree: Option<bool>,
    pub prediction_consistency: Option<PredictionConsistency>,
    pub prediction_hops: Option<HopMetric>,
    pub entry_hops: Option<HopMetric>,
    pub entry_prediction_hops: Option<HopMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseReport {
    fn empty(case: &EvaluationCase) -> Self {
        Self {
            id: case.id.clone(),
            unit: case.unit.clone(),
            project: case.project.clone(),
            patch_in_call_tree: None,
            prediction_consistency: None,
            prediction_hops: None,
            entry_hops: None,
            entry_prediction_hops: None,
            error: None,
        }
    }
}

const SKIP_NO_PREDICTION: &str = "no prediction provided";
const SKIP_PATCH_MISSING: &str = "patched method not in call tree";
const SKIP_PREDICTION_OR_PATCH_MISSING: &str =
    "patched method or predicted method not in call tree";
const SKIP_PREDICTION_MISSING: &str = "predicted method not in call tree";

/// Graph build options for a workspace's `[graph]` settings.
pub fn graph_options(config: &HopscopeConfig) -> GraphOptions {
    GraphOptions {
        directed: config.graph.directed,
        default_weight: config.graph.default_weight,
    }
}

pub struct HopAnalyzer {
    store: Arc<dyn EdgeStore>,
    options: GraphOptions,
    cache: Option<DistanceCache>,
}

impl HopAnalyzer {
    pub fn new(workspace: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let workspace = workspace.as_ref();
        let config = load_workspace_config(workspace)?;

        let options = graph_options(&config);
        let store = FileEdgeStore::open(edges_dir(workspace, &config));
        Ok(Self::with_store(Arc::new(store), options, config.query.cache))
    }

    pub fn with_store(store: Arc<dyn EdgeStore>, options: GraphOptions, cache: bool) -> Self {
        Self {
            store,
            options,
            cache: cache.then(|| DistanceCache::new(options)),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Query for one unit, served from the cache when caching is enabled.
    pub fn query(&self, unit: &str) -> Result<Arc<CallTreeQuery>, AnalysisError> {
        match &self.cache {
            Some(cache) => Ok(cache.get_or_build(self.store.as_ref(), unit)?),
            None => {
                let edges = self.store.load_edges(unit)?;
                Ok(Arc::new(CallTreeQuery::from_edges(&edges, self.options)?))
            }
        }
    }

    pub fn evaluate(
        &self,
        cases: &[EvaluationCase],
        request: &EvaluationRequest,
    ) -> Vec<CaseReport> {
        let checks = effective_checks(request.checks.as_deref());
        let reports: Vec<CaseReport> = cases
            .iter()
            .map(|case| self.evaluate_case(case, &checks))
            .collect();

        info!(
            cases = reports.len(),
            failed = reports.iter().filter(|report| report.error.is_some()).count(),
            "evaluated cases"
        );
        reports
    }

    /// Runs `checks` for one case. Failures to load or build the unit's
    /// graph are recorded on the report instead of being returned.
    pub fn evaluate_case(
        &self,
        case: &EvaluationCase,
        checks: &HashSet<EvaluationCheck>,
    ) -> CaseReport {
        let outcome = self
            .query(&case.unit)
            .and_then(|query| run_checks(&query, case, checks).map_err(AnalysisError::from));

        match outcome {
            Ok(report) => report,
            Err(err) => {
                warn!(case = %case.id, unit = %case.unit, error = %err, "case evaluation failed");
                CaseReport {
                    error: Some(err.to_string()),
                    ..CaseReport::empty(case)
                }
            }
        }
    }
}

fn run_checks(
    query: &CallTreeQuery,
    case: &EvaluationCase,
    checks: &HashSet<EvaluationCheck>,
) -> Result<CaseReport, GraphAlgoError> {
    let mut report = CaseReport::empty(case);
    let patch_in_call_tree =
        query.class_method_exists(&case.patched_classes, &case.patched_methods)?;
    let consistency = match &case.prediction {
        Some(prediction) => Some(prediction_consistency(query, prediction)?),
        None => None,
    };
    let predicted_method_exists = consistency.is_some_and(|checked| checked.method_exists);

    if checks.contains(&EvaluationCheck::PatchInCallTree) {
        report.patch_in_call_tree = Some(patch_in_call_tree);
    }
    if checks.contains(&EvaluationCheck::PredictionConsistency) {
        report.prediction_consistency = consistency;
    }

    if checks.contains(&EvaluationCheck::PredictionHops) {
        report.prediction_hops = Some(match &case.prediction {
            None => HopMetric::skipped(SKIP_NO_PREDICTION),
            Some(prediction) if predicted_method_exists && patch_in_call_tree => {
                let mut distances = Vec::with_capacity(case.patched_classes.len());
                for class in &case.patched_classes {
                    distances.push(query.class_distance(class, &prediction.class)?.distance);
                }
                HopMetric::measured(minimum(distances))
            }
            Some(_) => HopMetric::skipped(SKIP_PREDICTION_OR_PATCH_MISSING),
        });
    }

    if checks.contains(&EvaluationCheck::EntryHops) {
        report.entry_hops = Some(if patch_in_call_tree {
            let mut distances = Vec::new();
            for class in &case.patched_classes {
                for method in &case.patched_methods {
                    let result = query.method_distance(
                        class,
                        method,
                        &case.tested_class,
                        &case.tested_method,
                    )?;
                    distances.push(result.distance);
                }
            }
            HopMetric::measured(minimum(distances))
        } else {
            HopMetric::skipped(SKIP_PATCH_MISSING)
        });
    }

    if checks.contains(&EvaluationCheck::EntryPredictionHops) {
        report.entry_prediction_hops = Some(match &case.prediction {
            None => HopMetric::skipped(SKIP_NO_PREDICTION),
            Some(prediction) if predicted_method_exists => {
                let result = query.method_distance(
                    &case.tested_class,
                    &case.tested_method,
                    &prediction.class,
                    &prediction.method,
                )?;
                HopMetric::measured(Some(result.distance))
            }
            Some(_) => HopMetric::skipped(SKIP_PREDICTION_MISSING),
        });
    }

    Ok(report)
}

fn prediction_consistency(
    query: &CallTreeQuery,
    prediction: &Prediction,
) -> Result<PredictionConsistency, GraphAlgoError> {
    Ok(PredictionConsistency {
        class_exists: query.class_exists(&prediction.class)?,
        method_exists: query.method_exists(&prediction.method)?,
        complete_exists: query
            .class_method_exists(&[prediction.class.as_str()], &[prediction.method.as_str()])?,
    })
}

/// Smallest distance, keeping the first of equal values. `None` when there
/// was nothing to compare.
fn minimum(distances: impl IntoIterator<Item = f64>) -> Option<f64> {
    distances
        .into_iter()
        .fold(None, |best, distance| match best {
            Some(current) if distance >= current => Some(current),
            _ => Some(distance),
        })
}

fn effective_checks(checks: Option<&[EvaluationCheck]>) -> HashSet<EvaluationCheck> {
    let mut effective = HashSet::new();
    if let Some(checks) = checks {
        effective.extend(checks.iter().copied());
        if !effective.is_empty() {
            return effective;
        }
    }

    effective.extend(EvaluationCheck::ALL);
    effective
}

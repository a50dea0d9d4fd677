use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub method: String,
}

/// One row of an experiment: a recorded call tree, the methods a fix
/// touched, the failing test entry point, and an optional model prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCase {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(deserialize_with = "identifier_list")]
    pub patched_classes: Vec<String>,
    #[serde(deserialize_with = "identifier_list")]
    pub patched_methods: Vec<String>,
    pub tested_class: String,
    pub tested_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Prediction>,
}

pub fn load_cases(path: impl AsRef<Path>) -> Result<Vec<EvaluationCase>, AnalysisError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|source| AnalysisError::Cases {
        path: path.to_path_buf(),
        source,
    })
}

/// Splits a comma-separated identifier cell, dropping blanks.
pub fn split_identifier_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentifierList {
    Joined(String),
    Items(Vec<String>),
}

fn identifier_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdentifierList::deserialize(deserializer)? {
        IdentifierList::Joined(raw) => split_identifier_list(&raw),
        IdentifierList::Items(items) => items
            .iter()
            .flat_map(|item| split_identifier_list(item))
            .collect(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CaseId {
    Text(String),
    Integer(i64),
    Number(f64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CaseId::deserialize(deserializer)? {
        CaseId::Text(text) => text,
        CaseId::Integer(value) => value.to_string(),
        CaseId::Number(value) => value.to_string(),
    })
}

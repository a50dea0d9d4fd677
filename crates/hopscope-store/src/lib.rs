use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hopscope_core::EdgeRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const JSON_EXTENSION: &str = "json";
pub const TSV_EXTENSION: &str = "tsv";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse edge file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize edges: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("malformed edge row at {path}:{line}: {message}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("no edge records found for analysis unit '{0}'")]
    UnitNotFound(String),
}

/// Source of call edges for one analysis unit.
pub trait EdgeStore: Send + Sync {
    fn load_edges(&self, unit: &str) -> Result<Vec<EdgeRecord>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEdgesFile {
    pub unit: String,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EdgeFileContents {
    Unit(UnitEdgesFile),
    Bare(Vec<EdgeRecord>),
}

/// Reads `<root>/<stem>.json` or `<root>/<stem>.tsv`, where `stem` is the
/// unit id with path-hostile characters replaced by `_`.
pub struct FileEdgeStore {
    root: PathBuf,
}

impl FileEdgeStore {
    pub fn open(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn unit_path(&self, unit: &str, extension: &str) -> PathBuf {
        self.root
            .join(format!("{}.{extension}", unit_file_stem(unit)))
    }

    pub fn write_unit(&self, unit: &str, edges: &[EdgeRecord]) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.root)?;
        let path = self.unit_path(unit, JSON_EXTENSION);
        let payload = UnitEdgesFile {
            unit: unit.to_owned(),
            edges: edges.to_vec(),
        };
        fs::write(&path, serde_json::to_string_pretty(&payload)?)?;
        Ok(path)
    }

    fn read_json(path: &Path) -> Result<Vec<EdgeRecord>, StoreError> {
        let raw = fs::read_to_string(path)?;
        let contents: EdgeFileContents =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(match contents {
            EdgeFileContents::Unit(file) => file.edges,
            EdgeFileContents::Bare(edges) => edges,
        })
    }

    fn read_tsv(path: &Path) -> Result<Vec<EdgeRecord>, StoreError> {
        let raw = fs::read_to_string(path)?;
        parse_tsv_edges(&raw).map_err(|(line, message)| StoreError::MalformedRow {
            path: path.to_path_buf(),
            line,
            message,
        })
    }
}

impl EdgeStore for FileEdgeStore {
    fn load_edges(&self, unit: &str) -> Result<Vec<EdgeRecord>, StoreError> {
        let json_path = self.unit_path(unit, JSON_EXTENSION);
        if json_path.exists() {
            return Self::read_json(&json_path);
        }

        let tsv_path = self.unit_path(unit, TSV_EXTENSION);
        if tsv_path.exists() {
            return Self::read_tsv(&tsv_path);
        }

        Err(StoreError::UnitNotFound(unit.to_owned()))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryEdgeStore {
    units: HashMap<String, Vec<EdgeRecord>>,
}

impl MemoryEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: impl Into<String>, edges: Vec<EdgeRecord>) {
        self.units.insert(unit.into(), edges);
    }

    pub fn with_unit(mut self, unit: impl Into<String>, edges: Vec<EdgeRecord>) -> Self {
        self.insert(unit, edges);
        self
    }
}

impl EdgeStore for MemoryEdgeStore {
    fn load_edges(&self, unit: &str) -> Result<Vec<EdgeRecord>, StoreError> {
        self.units
            .get(unit)
            .cloned()
            .ok_or_else(|| StoreError::UnitNotFound(unit.to_owned()))
    }
}

/// File name stem for `unit`. ASCII alphanumerics, `-`, `_` and `.` are
/// kept; every other byte is written as `%XX`, so distinct units never share
/// a file.
pub fn unit_file_stem(unit: &str) -> String {
    let mut stem = String::with_capacity(unit.len());
    for byte in unit.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.') {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

/// Parses `caller<TAB>callee[<TAB>weight]` rows. Blank lines, `#` comments
/// and a leading `caller\tcallee` header are skipped.
pub fn parse_tsv_edges(raw: &str) -> Result<Vec<EdgeRecord>, (usize, String)> {
    let mut edges = Vec::new();

    for (index, line) in raw.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
        if edges.is_empty() && columns.first() == Some(&"caller") {
            continue;
        }

        match columns.as_slice() {
            [caller, callee] if !caller.is_empty() && !callee.is_empty() => {
                edges.push(EdgeRecord::new(*caller, *callee));
            }
            [caller, callee, weight] if !caller.is_empty() && !callee.is_empty() => {
                let weight = weight
                    .parse::<f64>()
                    .map_err(|_| (line_no, format!("invalid weight '{weight}'")))?;
                edges.push(EdgeRecord::weighted(*caller, *callee, weight));
            }
            _ => {
                return Err((
                    line_no,
                    format!("expected 2 or 3 tab-separated columns, found {}", columns.len()),
                ));
            }
        }
    }

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_file_stem_escapes_uri_punctuation() {
        assert_eq!(
            unit_file_stem("http://example.org/jsoup-42"),
            "http%3A%2F%2Fexample.org%2Fjsoup-42"
        );
        assert_eq!(unit_file_stem("run_7"), "run_7");
        assert_eq!(unit_file_stem("run 7%"), "run%207%25");
        assert_eq!(unit_file_stem("é"), "%C3%A9");
    }

    #[test]
    fn unit_file_stem_keeps_distinct_units_apart() {
        let units = ["a/b", "a:b", "a_b", "a%2Fb", "a b", " a b "];
        let stems: std::collections::HashSet<String> =
            units.iter().map(|unit| unit_file_stem(unit)).collect();
        assert_eq!(stems.len(), units.len());
    }

    #[test]
    fn parse_tsv_edges_reads_optional_weight_and_skips_header() {
        let raw = "caller\tcallee\tweight\n# comment\nA.run\tB.call\nB.call\tC.exec\t2\n\n";
        let edges = parse_tsv_edges(raw).expect("parse");

        assert_eq!(
            edges,
            vec![
                EdgeRecord::new("A.run", "B.call"),
                EdgeRecord::weighted("B.call", "C.exec", 2.0),
            ]
        );
    }

    #[test]
    fn parse_tsv_edges_reports_line_of_bad_row() {
        let raw = "A.run\tB.call\nlonely\n";
        let (line, message) = parse_tsv_edges(raw).expect_err("expected error");
        assert_eq!(line, 2);
        assert!(message.contains("found 1"));
    }

    #[test]
    fn parse_tsv_edges_rejects_non_numeric_weight() {
        let (line, message) = parse_tsv_edges("A\tB\theavy\n").expect_err("expected error");
        assert_eq!(line, 1);
        assert!(message.contains("heavy"));
    }

    #[test]
    fn memory_store_returns_unit_not_found() {
        let store = MemoryEdgeStore::new().with_unit("run-1", vec![EdgeRecord::new("A", "B")]);

        assert_eq!(store.load_edges("run-1").expect("load").len(), 1);
        let err = store.load_edges("run-2").expect_err("expected missing unit");
        assert!(matches!(err, StoreError::UnitNotFound(unit) if unit == "run-2"));
    }
}

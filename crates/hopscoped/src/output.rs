use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "invalid output format '{other}', expected one of: table, json"
            )),
        }
    }
}

pub fn write_json<T: Serialize>(value: &T, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("failed to serialize JSON output")?;
    writeln!(out).context("failed to write trailing newline")?;
    Ok(())
}

/// Keeps a value on one tab-separated cell.
pub fn normalize_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use hopscope_analysis::graph_options;
use hopscope_config::HopscopeConfig;
use hopscope_graph_algo::GraphSummary;

use crate::cli::SummaryArgs;
use crate::output::{OutputFormat, write_json};
use crate::unit::open_unit_query;

pub fn run_summary_command(
    workspace: &Path,
    config: &HopscopeConfig,
    args: SummaryArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let query = open_unit_query(workspace, config, &args.unit, graph_options(config))?;
    let summary = query.summary();

    match args.output {
        OutputFormat::Table => {
            write_summary(&summary, out).context("failed to write summary")?;
            Ok(())
        }
        OutputFormat::Json => write_json(&summary, out),
    }
}

pub fn write_summary(summary: &GraphSummary, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "edge_records\tunique_edges\tdistinct_methods\tdistinct_classes")?;
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        summary.edge_records, summary.unique_edges, summary.distinct_methods, summary.distinct_classes
    )
}

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use hopscope_analysis::graph_options;
use hopscope_config::HopscopeConfig;
use hopscope_core::{Fragment, HopResult, format_distance};
use tracing::info;

use crate::cli::PathArgs;
use crate::output::{OutputFormat, normalize_field, write_json};
use crate::unit::open_unit_query;

pub fn run_path_command(
    workspace: &Path,
    config: &HopscopeConfig,
    args: PathArgs,
    out: &mut dyn Write,
) -> Result<()> {
    if args.raw && !config.query.allow_raw_patterns {
        bail!("--raw requires [query] allow_raw_patterns = true in .hopscope/config.toml");
    }

    let mut options = graph_options(config);
    options.directed |= args.directed;

    let (source, destination) = if args.raw {
        (Fragment::raw(args.src), Fragment::raw(args.dst))
    } else {
        (Fragment::literal(args.src), Fragment::literal(args.dst))
    };

    let query = open_unit_query(workspace, config, &args.unit, options)?;
    let result = query
        .shortest_path(&source, &destination)
        .context("failed to resolve shortest path")?;
    info!(
        unit = %args.unit,
        outcome = result.outcome.as_str(),
        distance = %format_distance(result.distance),
        "resolved hop distance"
    );

    match args.output {
        OutputFormat::Table => {
            write_hop_result(&result, out).context("failed to write path result")?;
            Ok(())
        }
        OutputFormat::Json => write_json(&result, out),
    }
}

pub fn write_hop_result(result: &HopResult, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "source\tdestination\tdistance\toutcome\tpath")?;
    let path = result
        .path
        .iter()
        .map(|label| normalize_field(label))
        .collect::<Vec<_>>()
        .join(" -> ");
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        normalize_field(&result.matched_source),
        normalize_field(&result.matched_destination),
        format_distance(result.distance),
        result.outcome.as_str(),
        path
    )
}

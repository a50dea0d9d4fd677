use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use hopscope_analysis::graph_options;
use hopscope_config::HopscopeConfig;

use crate::cli::ExistsArgs;
use crate::unit::open_unit_query;

pub fn run_exists_command(
    workspace: &Path,
    config: &HopscopeConfig,
    args: ExistsArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let query = open_unit_query(workspace, config, &args.unit, graph_options(config))?;
    let exists = query
        .class_method_exists(&args.classes, &args.methods)
        .context("failed to match class/method combinations")?;
    writeln!(out, "{exists}").context("failed to write exists result")?;
    Ok(())
}

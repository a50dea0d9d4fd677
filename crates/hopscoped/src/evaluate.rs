use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use hopscope_analysis::{CaseReport, EvaluationRequest, HopAnalyzer, HopMetric, load_cases};
use hopscope_core::format_distance;

use crate::cli::EvaluateArgs;
use crate::output::{OutputFormat, normalize_field, write_json};

pub fn run_evaluate_command(workspace: &Path, args: EvaluateArgs, out: &mut dyn Write) -> Result<()> {
    let cases = load_cases(&args.cases)
        .with_context(|| format!("failed to load cases from {}", args.cases.display()))?;
    let analyzer = HopAnalyzer::new(workspace).context("failed to initialize hop analyzer")?;

    let checks = (!args.checks.is_empty()).then_some(args.checks);
    let reports = analyzer.evaluate(&cases, &EvaluationRequest { checks });

    match args.output {
        OutputFormat::Table => {
            write_case_reports(&reports, out).context("failed to write evaluation results")?;
            Ok(())
        }
        OutputFormat::Json => write_json(&reports, out),
    }
}

pub fn write_case_reports(reports: &[CaseReport], out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "id\tunit\tpatch_in_call_tree\tclass_exists\tmethod_exists\tcomplete_exists\tprediction_hops\tentry_hops\tentry_prediction_hops\terror"
    )?;

    for report in reports {
        let consistency = report.prediction_consistency;
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            normalize_field(&report.id),
            normalize_field(&report.unit),
            flag_cell(report.patch_in_call_tree),
            flag_cell(consistency.map(|checked| checked.class_exists)),
            flag_cell(consistency.map(|checked| checked.method_exists)),
            flag_cell(consistency.map(|checked| checked.complete_exists)),
            metric_cell(report.prediction_hops.as_ref()),
            metric_cell(report.entry_hops.as_ref()),
            metric_cell(report.entry_prediction_hops.as_ref()),
            normalize_field(report.error.as_deref().unwrap_or("-"))
        )?;
    }

    Ok(())
}

fn flag_cell(value: Option<bool>) -> String {
    value.map_or_else(|| "-".to_owned(), |flag| flag.to_string())
}

fn metric_cell(metric: Option<&HopMetric>) -> String {
    match metric {
        None => "-".to_owned(),
        Some(HopMetric {
            distance: Some(distance),
            ..
        }) => format_distance(*distance),
        Some(HopMetric {
            skipped: Some(_), ..
        }) => "skipped".to_owned(),
        Some(_) => "none".to_owned(),
    }
}

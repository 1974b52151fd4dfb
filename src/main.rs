mod config;
mod input;
mod logging;
mod model;
mod pipeline;
mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::config::{ComparisonSpec, Config, load_config};
use crate::input::load_sample_sheet;
use crate::model::analysis::AnalysisKind;
use crate::model::table::AnalysisTable;
use crate::pipeline::CompareError;
use crate::pipeline::stage1_validate::{check_samples, route_analysis_files};
use crate::pipeline::stage2_normalize::collect_tables;
use crate::pipeline::stage4_reconcile::assemble_for_comparison;
use crate::pipeline::stage6_metrics::{compare_all_labs, compare_lab};
use crate::pipeline::stage7_report::{write_lab_comparisons, write_summary, write_tables};
use crate::report::json::{AnalysisSummary, RunSummary};
use crate::report::tsv::TsvRenderer;

const TOOL_NAME: &str = "kira-eqa";

#[derive(Debug, Parser)]
#[command(
    name = "kira-eqa",
    version,
    about = "Normalize bacterial WGS EQA results and compare laboratories"
)]
struct Cli {
    /// Debug logging unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate sample folders and write one normalized table per analysis.
    Collect(CollectArgs),
    /// Collect, then compare the configured analyses across laboratories.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
struct CollectArgs {
    /// YAML run configuration.
    #[arg(long)]
    config: PathBuf,

    /// Overrides `output_dir` from the configuration.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CompareArgs {
    #[command(flatten)]
    common: CollectArgs,

    /// Compare only this laboratory instead of every laboratory.
    #[arg(long)]
    lab: Option<String>,

    /// Run only this configured analysis.
    #[arg(long)]
    analysis: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Collect(args) => {
            let (config, out_dir) = load_run_config(&args)?;
            collect(&config, &out_dir)?;
        }
        Command::Compare(args) => {
            let (config, out_dir) = load_run_config(&args.common)?;
            let tables = collect(&config, &out_dir)?;
            let summary = compare(
                &config,
                &tables,
                args.lab.as_deref(),
                args.analysis.as_deref(),
                &out_dir,
            )?;
            let path = write_summary(&summary, &out_dir).map_err(|e| e.to_string())?;
            tracing::info!(path = %path.display(), "wrote run summary");
        }
    }
    Ok(())
}

fn load_run_config(args: &CollectArgs) -> Result<(Config, PathBuf), String> {
    let config = load_config(&args.config).map_err(|e| e.to_string())?;
    let out_dir = args.out.clone().unwrap_or_else(|| config.output_dir.clone());
    Ok((config, out_dir))
}

fn collect(config: &Config, out_dir: &Path) -> Result<BTreeMap<String, AnalysisTable>, String> {
    let sample_dirs = load_sample_sheet(&config.sample_sheet).map_err(|e| e.to_string())?;
    let report = check_samples(&sample_dirs);
    let missing_dirs = report.values().filter(|s| !s.exists).count();
    if missing_dirs == report.len() && !report.is_empty() {
        return Err(format!(
            "none of the {} sample directories in {} exist",
            report.len(),
            config.sample_sheet.display()
        ));
    }

    let routed = route_analysis_files(&report);
    let tables = collect_tables(&routed, &config.thresholds);
    write_tables(&tables, out_dir).map_err(|e| e.to_string())?;
    Ok(tables)
}

fn compare(
    config: &Config,
    tables: &BTreeMap<String, AnalysisTable>,
    lab: Option<&str>,
    analysis: Option<&str>,
    out_dir: &Path,
) -> Result<RunSummary, String> {
    if let Some(name) = analysis {
        if !config.comparisons.iter().any(|c| c.analysis == name) {
            return Err(format!("analysis `{name}` is not configured for comparison"));
        }
    }

    let renderer = TsvRenderer::new(config.render);
    let mut analyses = Vec::new();
    for comparison in &config.comparisons {
        if analysis.is_some_and(|name| name != comparison.analysis) {
            continue;
        }
        let summary = compare_analysis(config, comparison, tables, lab, &renderer, out_dir)?;
        analyses.extend(summary);
    }

    Ok(RunSummary {
        tool: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        fixed_reference_lab: config.fixed_reference_lab.clone(),
        analyses,
    })
}

fn compare_analysis(
    config: &Config,
    comparison: &ComparisonSpec,
    tables: &BTreeMap<String, AnalysisTable>,
    lab: Option<&str>,
    renderer: &TsvRenderer,
    out_dir: &Path,
) -> Result<Option<AnalysisSummary>, String> {
    if AnalysisKind::from_name(&comparison.analysis).is_none() {
        return Err(format!("unknown analysis `{}`", comparison.analysis));
    }
    let Some(table) = tables.get(&comparison.analysis) else {
        tracing::warn!(analysis = %comparison.analysis, "no table collected; comparison skipped");
        return Ok(None);
    };

    let assembly = comparison.assembly_options(&config.fixed_reference_lab);
    let input = match assemble_for_comparison(std::slice::from_ref(table), &assembly) {
        Ok(input) => input,
        Err(CompareError::EmptyTable(name)) => {
            tracing::warn!(analysis = %name, "no rows to compare; comparison skipped");
            return Ok(None);
        }
        Err(err) => return Err(err.to_string()),
    };

    let options = comparison.comparison_options(&config.fixed_reference_lab);
    let (labs, per_lab) = match lab {
        Some(lab) => {
            let result = compare_lab(&input.table, &input.kmas, lab, &input.samples, &options)
                .map_err(|e| e.to_string())?;
            (vec![lab.to_string()], vec![result])
        }
        None => {
            let results = compare_all_labs(&input.table, &input.kmas, &input.samples, &options)
                .map_err(|e| e.to_string())?;
            (input.kmas.clone(), results)
        }
    };

    let mut lab_summaries = Vec::with_capacity(labs.len());
    for (lab, (comparisons, map)) in labs.iter().zip(per_lab) {
        let analysis = &comparison.analysis;
        let summary = write_lab_comparisons(renderer, analysis, lab, &comparisons, &map, out_dir)
            .map_err(|e| e.to_string())?;
        lab_summaries.push(summary);
    }

    Ok(Some(AnalysisSummary {
        analysis: comparison.analysis.clone(),
        metric: options.metric,
        columns: options.columns,
        kmas: input.kmas,
        samples: input.samples,
        labs: lab_summaries,
    }))
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;

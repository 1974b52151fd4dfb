use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::table::AnalysisTable;
use crate::pipeline::stage3_anonymize::AnonymizationMap;
use crate::pipeline::stage6_metrics::{Comparison, stack_comparisons};
use crate::report::json::{ComparisonSummary, LabSummary, RunSummary, render_summary_json};
use crate::report::tsv::write_table_tsv;
use crate::report::{RenderTable, TableRenderer};

pub const TABLES_DIR: &str = "tables";
pub const COMPARISONS_DIR: &str = "comparisons";
pub const SUMMARY_FILE: &str = "summary.json";
pub const STACKED_TAG: &str = "all_samples";

/// Writes one `<analysis>.tsv` per normalized table.
pub fn write_tables(
    tables: &BTreeMap<String, AnalysisTable>,
    out_dir: &Path,
) -> std::io::Result<Vec<PathBuf>> {
    let dir = out_dir.join(TABLES_DIR);
    fs::create_dir_all(&dir)?;
    let mut written = Vec::with_capacity(tables.len());
    for (name, table) in tables {
        let path = dir.join(format!("{name}.tsv"));
        write_table_tsv(table, &path)?;
        written.push(path);
    }
    tracing::info!(dir = %dir.display(), tables = written.len(), "wrote normalized tables");
    Ok(written)
}

pub fn comparison_file_name(lab: &str, analysis: &str, sample: &str, ending: &str) -> String {
    format!("{lab}_{analysis}_{sample}{ending}")
}

/// Renders each comparison of one laboratory, then all of them stacked into
/// one artifact, and returns the laboratory summary.
pub fn write_lab_comparisons(
    renderer: &dyn TableRenderer,
    analysis: &str,
    lab: &str,
    comparisons: &[Comparison],
    map: &AnonymizationMap,
    out_dir: &Path,
) -> std::io::Result<LabSummary> {
    let dir = out_dir.join(COMPARISONS_DIR).join(analysis);
    fs::create_dir_all(&dir)?;

    let mut summaries = Vec::with_capacity(comparisons.len());
    for c in comparisons {
        let file_name = comparison_file_name(lab, analysis, &c.sample, renderer.file_ending());
        let path = dir.join(&file_name);
        let render = RenderTable {
            table: &c.table,
            classes: &c.classes,
        };
        renderer.render(&render, &path)?;
        summaries.push(ComparisonSummary::from_comparison(c, file_name));
    }

    let mut summary = LabSummary::new(lab, map, summaries);
    if comparisons.len() > 1 {
        if let Some((table, classes)) = stack_comparisons(comparisons) {
            let file_name = comparison_file_name(lab, analysis, STACKED_TAG, renderer.file_ending());
            let render = RenderTable {
                table: &table,
                classes: &classes,
            };
            renderer.render(&render, &dir.join(&file_name))?;
            summary.stacked_artifact = Some(file_name);
        } else {
            tracing::warn!(lab, analysis, "comparisons disagree on columns; no stacked view");
        }
    }
    Ok(summary)
}

pub fn write_summary(summary: &RunSummary, out_dir: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(SUMMARY_FILE);
    let json = render_summary_json(summary).map_err(std::io::Error::other)?;
    fs::write(&path, json)?;
    Ok(path)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;

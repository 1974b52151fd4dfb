use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::classification::{CellClass, ClassMatrix};
use crate::model::identifiers::join_identifier;
use crate::model::table::{AnalysisTable, Cell, Row};
use crate::pipeline::CompareError;
use crate::pipeline::stage3_anonymize::{AnonymizationMap, anonymize_for_lab};
use crate::pipeline::stage4_reconcile::JOIN_SEPARATOR;
use crate::pipeline::stage5_compare::{build_sub_table, classify};

pub const MATCH_COUNT_COLUMN: &str = "n_match";
pub const JACCARD_COLUMN: &str = "jaccard";
pub const ALL_COLUMNS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// `<matches>/<total>` over the compared columns.
    #[default]
    MatchCount,
    /// Jaccard index of the comma-split values of one column.
    Jaccard(String),
}

impl Metric {
    /// `"all"` selects the match count, anything else names a Jaccard column.
    pub fn from_name(name: &str) -> Self {
        if name == ALL_COLUMNS {
            Metric::MatchCount
        } else {
            Metric::Jaccard(name.to_string())
        }
    }
}

pub fn value_set(value: &str) -> BTreeSet<&str> {
    value.split(JOIN_SEPARATOR).collect()
}

/// |A ∩ B| / |A ∪ B| over comma-split values.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = value_set(a);
    let b = value_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Restricts the comparison to `subset` (if any) and appends the metric
/// column. The class matrix gains neutral cells for the added column.
pub fn append_metrics(
    table: &AnalysisTable,
    classes: &ClassMatrix,
    metric: &Metric,
    subset: &[String],
) -> Result<(AnalysisTable, ClassMatrix), CompareError> {
    let reference = table
        .rows
        .first()
        .ok_or_else(|| CompareError::EmptyTable(table.name.clone()))?;

    let col_idx: Vec<usize> = if subset.is_empty() {
        (0..table.width()).collect()
    } else {
        subset
            .iter()
            .map(|c| {
                table
                    .column_index(c)
                    .ok_or_else(|| CompareError::UnknownColumn(c.clone()))
            })
            .collect::<Result<_, _>>()?
    };
    let mut columns: Vec<String> = col_idx.iter().map(|&i| table.columns[i].clone()).collect();

    let metric_values: Vec<Cell> = match metric {
        Metric::MatchCount => {
            let total = col_idx.len();
            table
                .rows
                .iter()
                .map(|row| {
                    let matches = col_idx
                        .iter()
                        .filter(|&&i| row.cells[i].agrees_with(&reference.cells[i]))
                        .count();
                    Cell::Text(format!("{matches}/{total}"))
                })
                .collect()
        }
        Metric::Jaccard(column) => {
            let idx = col_idx
                .iter()
                .copied()
                .find(|&i| table.columns[i] == *column)
                .ok_or_else(|| CompareError::UnknownColumn(column.clone()))?;
            let reference_value = reference.cells[idx].to_string();
            table
                .rows
                .iter()
                .map(|row| Cell::Float(jaccard(&reference_value, &row.cells[idx].to_string())))
                .collect()
        }
    };
    columns.push(match metric {
        Metric::MatchCount => MATCH_COUNT_COLUMN.to_string(),
        Metric::Jaccard(_) => JACCARD_COLUMN.to_string(),
    });

    let mut out = AnalysisTable::new(table.name.clone(), columns);
    for (row, value) in table.rows.iter().zip(metric_values) {
        let mut cells: Vec<Cell> = col_idx.iter().map(|&i| row.cells[i].clone()).collect();
        cells.push(value);
        out.push(Row::new(row.sample.clone(), cells));
    }

    let selected = classes.select_columns(&col_idx);
    let extra = out.width() - selected.n_cols;
    let extended = selected.extend_columns(extra, CellClass::Neutral);
    Ok((out, extended))
}

#[derive(Debug, Clone, Default)]
pub struct ComparisonOptions {
    pub fixed_reference_lab: String,
    pub metric: Metric,
    pub columns: Vec<String>,
}

/// One finished comparison, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub lab: String,
    pub sample: String,
    pub table: AnalysisTable,
    pub classes: ClassMatrix,
    pub synthesized: Vec<String>,
}

impl Comparison {
    pub fn row_labels(&self) -> Vec<&str> {
        self.table.rows.iter().map(|r| r.sample.as_str()).collect()
    }

    pub fn metric_values(&self) -> Vec<String> {
        self.table
            .rows
            .iter()
            .map(|r| r.cells.last().map(Cell::to_string).unwrap_or_default())
            .collect()
    }
}

/// Sub-table, classification and metrics for one lab/sample pair of an
/// already anonymized table.
pub fn compare_sample(
    anonymized: &AnalysisTable,
    map: &AnonymizationMap,
    lab: &str,
    sample: &str,
    options: &ComparisonOptions,
) -> Result<Comparison, CompareError> {
    let sub = build_sub_table(anonymized, lab, sample, map, &options.fixed_reference_lab)?;
    let classes = classify(&sub.table);
    let (table, classes) = append_metrics(&sub.table, &classes, &options.metric, &options.columns)?;
    Ok(Comparison {
        lab: lab.to_string(),
        sample: sample.to_string(),
        table,
        classes,
        synthesized: sub.synthesized,
    })
}

/// Every comparison for one laboratory. Samples the laboratory has no row for
/// are skipped.
pub fn compare_lab(
    table: &AnalysisTable,
    kmas: &[String],
    lab: &str,
    samples: &[String],
    options: &ComparisonOptions,
) -> Result<(Vec<Comparison>, AnonymizationMap), CompareError> {
    if !kmas.iter().any(|k| k == lab) {
        return Err(CompareError::UnknownLab(lab.to_string()));
    }
    let (anonymized, map) = anonymize_for_lab(table, kmas, lab, &options.fixed_reference_lab)?;

    let mut out = Vec::new();
    for sample in samples {
        if !anonymized.contains_sample(&join_identifier(lab, sample)) {
            tracing::debug!(lab, sample = %sample, "lab has no row for sample; skipped");
            continue;
        }
        out.push(compare_sample(&anonymized, &map, lab, sample, options)?);
    }
    tracing::info!(analysis = %table.name, lab, comparisons = out.len(), "compared laboratory");
    Ok((out, map))
}

pub fn compare_all_labs(
    table: &AnalysisTable,
    kmas: &[String],
    samples: &[String],
    options: &ComparisonOptions,
) -> Result<Vec<(Vec<Comparison>, AnonymizationMap)>, CompareError> {
    kmas.iter()
        .map(|lab| compare_lab(table, kmas, lab, samples, options))
        .collect()
}

/// Stacks a laboratory's comparisons vertically. `None` when empty or when
/// the tables disagree on columns.
pub fn stack_comparisons(comparisons: &[Comparison]) -> Option<(AnalysisTable, ClassMatrix)> {
    let first = comparisons.first()?;
    if comparisons.iter().any(|c| c.table.columns != first.table.columns) {
        return None;
    }
    let mut table = AnalysisTable::new(first.table.name.clone(), first.table.columns.clone());
    for c in comparisons {
        for row in &c.table.rows {
            table.push(row.clone());
        }
    }
    let parts: Vec<ClassMatrix> = comparisons.iter().map(|c| c.classes.clone()).collect();
    let classes = ClassMatrix::stack(&parts)?;
    Some((table, classes))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_metrics.rs"]
mod tests;

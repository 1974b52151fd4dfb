use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::identifiers::{lab_prefix, split_eqa_identifier};
use crate::model::table::{AnalysisTable, Cell, Row};
use crate::pipeline::CompareError;
use crate::pipeline::stage3_anonymize::group_by_lab;

pub const JOIN_SEPARATOR: &str = ",";

/// Merges rows sharing a sample identifier into one row whose cells are the
/// comma-joined values of each column. Unique rows pass through unchanged.
/// Output keeps first-appearance order.
pub fn reconcile_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Row>> = HashMap::new();
    for row in rows {
        let bucket = buckets.entry(row.sample.clone()).or_default();
        if bucket.is_empty() {
            order.push(row.sample.clone());
        }
        bucket.push(row);
    }

    let mut out = Vec::with_capacity(order.len());
    for sample in order {
        let Some(mut bucket) = buckets.remove(&sample) else {
            continue;
        };
        if bucket.len() == 1 {
            out.extend(bucket.pop());
            continue;
        }
        let width = bucket[0].cells.len();
        let cells = (0..width)
            .map(|col| {
                let joined = bucket
                    .iter()
                    .map(|r| r.cells.get(col).map(Cell::to_string).unwrap_or_default())
                    .collect::<Vec<_>>()
                    .join(JOIN_SEPARATOR);
                Cell::Text(joined)
            })
            .collect();
        tracing::debug!(sample = %sample, runs = bucket.len(), "merged duplicate runs");
        out.push(Row::new(sample, cells));
    }
    out
}

/// Reconciles duplicates independently inside every laboratory group. Rows
/// come back in the order their identifier first appeared in `table`.
pub fn reconcile_table(table: &AnalysisTable) -> AnalysisTable {
    let mut first_seen: HashMap<&str, usize> = HashMap::new();
    for (idx, row) in table.rows.iter().enumerate() {
        first_seen.entry(row.sample.as_str()).or_insert(idx);
    }

    let mut rows: Vec<Row> = group_by_lab(table)
        .into_iter()
        .flat_map(|group| {
            tracing::trace!(lab = %group.prefix, rows = group.rows.len(), "reconciling lab group");
            reconcile_rows(group.rows)
        })
        .collect();
    rows.sort_by_key(|r| first_seen.get(r.sample.as_str()).copied().unwrap_or(usize::MAX));

    let mut out = AnalysisTable::new(table.name.clone(), table.columns.clone());
    for row in rows {
        out.push(row);
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    pub fixed_reference_lab: String,
    pub renames: BTreeMap<String, String>,
    pub sort_by: Option<String>,
}

/// Reconciled table plus the sorted laboratory roster and sample tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonInput {
    pub table: AnalysisTable,
    pub kmas: Vec<String>,
    pub samples: Vec<String>,
}

/// Builds the comparison input from one or more tables of the same analysis.
/// Fixed-reference rows are taken from the first table only.
pub fn assemble_for_comparison(
    tables: &[AnalysisTable],
    options: &AssemblyOptions,
) -> Result<ComparisonInput, CompareError> {
    let first = tables
        .first()
        .ok_or_else(|| CompareError::EmptyTable("<none>".to_string()))?;
    let is_fixed = |row: &Row| lab_prefix(&row.sample) == options.fixed_reference_lab;

    // Non-reference rows from every table are reconciled together.
    let mut labs = AnalysisTable::new(first.name.clone(), first.columns.clone());
    for t in tables {
        for row in align_columns(t, &first.columns).rows {
            if !is_fixed(&row) {
                labs.push(row);
            }
        }
    }
    let mut fixed_part = first.clone();
    fixed_part.retain_rows(is_fixed);

    let mut table = reconcile_table(&labs);
    for row in reconcile_table(&fixed_part).rows {
        table.push(row);
    }
    if table.is_empty() {
        return Err(CompareError::EmptyTable(first.name.clone()));
    }

    table.rename_columns(&options.renames);

    let mut kmas = BTreeSet::new();
    let mut samples = BTreeSet::new();
    for row in &table.rows {
        let (kma, sample) = split_eqa_identifier(&row.sample)
            .ok_or_else(|| CompareError::IdentifierShape(row.sample.clone()))?;
        kmas.insert(kma.to_string());
        samples.insert(sample.to_string());
    }

    if let Some(column) = &options.sort_by {
        if !table.sort_by_column(column) {
            return Err(CompareError::UnknownColumn(column.clone()));
        }
    }

    Ok(ComparisonInput {
        table,
        kmas: kmas.into_iter().collect(),
        samples: samples.into_iter().collect(),
    })
}

/// Re-maps `table` onto `columns` by name; absent columns become missing.
fn align_columns(table: &AnalysisTable, columns: &[String]) -> AnalysisTable {
    if table.columns == columns {
        return table.clone();
    }
    let index: Vec<Option<usize>> = columns.iter().map(|c| table.column_index(c)).collect();
    let mut out = AnalysisTable::new(table.name.clone(), columns.to_vec());
    for row in &table.rows {
        let cells = index
            .iter()
            .map(|idx| idx.map_or(Cell::Missing, |i| row.cells[i].clone()))
            .collect();
        out.push(Row::new(row.sample.clone(), cells));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_reconcile.rs"]
mod tests;

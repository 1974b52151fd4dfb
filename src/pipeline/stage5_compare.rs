use std::collections::HashSet;

use crate::model::classification::{CellClass, ClassMatrix};
use crate::model::identifiers::{join_identifier, sample_stem, split_eqa_identifier};
use crate::model::table::{AnalysisTable, Cell, NO_DATA, Row};
use crate::pipeline::CompareError;
use crate::pipeline::stage3_anonymize::AnonymizationMap;

/// Comparison of one laboratory's sample against every other laboratory.
/// Row 0 is the laboratory's own row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTable {
    pub table: AnalysisTable,
    /// Identifiers that had no row and were filled with `no_data`.
    pub synthesized: Vec<String>,
}

/// Identifiers in `table` for `label` whose sample part contains `stem`,
/// i.e. every run of the same EQA sample for that laboratory.
fn runs_for<'a>(table: &'a AnalysisTable, label: &str, stem: &str) -> Vec<&'a str> {
    let prefix = format!("{label}_");
    let mut seen = HashSet::new();
    table
        .rows
        .iter()
        .map(|r| r.sample.as_str())
        .filter(|id| {
            id.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.contains(stem))
        })
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Expected row identifiers, in output order: the lab's own row, its other
/// runs, the fixed reference laboratory, then every anonymized laboratory.
pub fn expected_rows(
    anonymized: &AnalysisTable,
    lab: &str,
    sample: &str,
    map: &AnonymizationMap,
    fixed_reference_lab: &str,
) -> Result<Vec<String>, CompareError> {
    let target = join_identifier(lab, sample);
    if split_eqa_identifier(&target).is_none() {
        return Err(CompareError::IdentifierShape(target));
    }
    if map.label(lab).is_none() {
        return Err(CompareError::UnknownLab(lab.to_string()));
    }
    let stem = sample_stem(sample);

    let mut ids = vec![target.clone()];
    ids.extend(
        runs_for(anonymized, lab, stem)
            .into_iter()
            .filter(|id| *id != target)
            .map(str::to_string),
    );
    if lab != fixed_reference_lab {
        ids.push(join_identifier(fixed_reference_lab, stem));
    }
    for label in map.anonymized_labels() {
        let mut runs: Vec<String> = runs_for(anonymized, label, stem)
            .into_iter()
            .map(str::to_string)
            .collect();
        let base = join_identifier(label, stem);
        if !runs.contains(&base) {
            runs.push(base);
        }
        ids.extend(runs);
    }
    Ok(ids)
}

/// Assembles the comparison rows, synthesizing `no_data` rows for identifiers
/// absent from the table so the roster shape is preserved.
pub fn build_sub_table(
    anonymized: &AnalysisTable,
    lab: &str,
    sample: &str,
    map: &AnonymizationMap,
    fixed_reference_lab: &str,
) -> Result<SubTable, CompareError> {
    let ids = expected_rows(anonymized, lab, sample, map, fixed_reference_lab)?;
    let width = anonymized.width();

    let mut table = AnalysisTable::new(anonymized.name.clone(), anonymized.columns.clone());
    let mut synthesized = Vec::new();
    for id in ids {
        let found = anonymized.rows_for(&id).next().cloned();
        match found {
            Some(row) => table.push(row),
            None => {
                tracing::debug!(analysis = %anonymized.name, row = %id, "no row; filling with no_data");
                table.push(Row::filled(id.clone(), width, Cell::text(NO_DATA)));
                synthesized.push(id);
            }
        }
    }
    Ok(SubTable { table, synthesized })
}

/// Marks row 0 as the reference and every other cell as match or mismatch
/// against the reference cell in the same column.
pub fn classify(table: &AnalysisTable) -> ClassMatrix {
    let n_rows = table.len();
    let n_cols = table.width();
    let mut classes = ClassMatrix::filled(n_rows, n_cols, CellClass::Neutral);
    let Some(reference) = table.rows.first() else {
        return classes;
    };
    for col in 0..n_cols {
        classes.set(0, col, CellClass::Reference);
    }
    for (r, row) in table.rows.iter().enumerate().skip(1) {
        for (c, cell) in row.cells.iter().enumerate() {
            let class = if cell.agrees_with(&reference.cells[c]) {
                CellClass::Match
            } else {
                CellClass::Mismatch
            };
            classes.set(r, c, class);
        }
    }
    classes
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_compare.rs"]
mod tests;

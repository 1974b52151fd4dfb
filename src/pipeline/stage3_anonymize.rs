use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::identifiers::{
    ANONYMIZED_LABEL_PREFIX, is_anonymized_label, join_identifier, lab_prefix,
    split_eqa_identifier,
};
use crate::model::table::{AnalysisTable, Row};
use crate::pipeline::CompareError;

/// Rows of one laboratory, keyed by the three-token identifier prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct LabGroup {
    pub prefix: String,
    pub rows: Vec<Row>,
}

/// Partitions rows by laboratory prefix. Groups are ordered by prefix and keep
/// the table's row order inside each group.
pub fn group_by_lab(table: &AnalysisTable) -> Vec<LabGroup> {
    let mut groups: BTreeMap<String, Vec<Row>> = BTreeMap::new();
    for row in &table.rows {
        groups
            .entry(lab_prefix(&row.sample))
            .or_default()
            .push(row.clone());
    }
    groups
        .into_iter()
        .map(|(prefix, rows)| LabGroup { prefix, rows })
        .collect()
}

/// Real laboratory tag -> published label, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymizationMap {
    entries: Vec<(String, String)>,
}

impl AnonymizationMap {
    /// Labels every roster entry except `lab` and `fixed_reference_lab`.
    ///
    /// Numbering runs backwards through the roster: the last anonymized
    /// laboratory is `other_kma_1`, the one before it `other_kma_2`, and so on.
    /// Reports rely on this staying stable for a given roster order.
    pub fn build(kmas: &[String], lab: &str, fixed_reference_lab: &str) -> Self {
        let mut roster: Vec<&str> = Vec::with_capacity(kmas.len());
        for kma in kmas {
            if !roster.contains(&kma.as_str()) {
                roster.push(kma.as_str());
            }
        }
        let is_kept = |kma: &str| kma == lab || kma == fixed_reference_lab;
        let n_anonymized = roster.iter().filter(|&&k| !is_kept(k)).count();

        let mut next = n_anonymized;
        let entries = roster
            .into_iter()
            .map(|kma| {
                let label = if is_kept(kma) {
                    kma.to_string()
                } else {
                    let label = format!("{ANONYMIZED_LABEL_PREFIX}{next}");
                    next -= 1;
                    label
                };
                (kma.to_string(), label)
            })
            .collect();
        Self { entries }
    }

    pub fn label(&self, kma: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(real, _)| real == kma)
            .map(|(_, label)| label.as_str())
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Generated labels in roster order.
    pub fn anonymized_labels(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|(_, label)| label.as_str())
            .filter(|label| is_anonymized_label(label))
    }
}

/// Copy of `table` with every laboratory tag replaced by its label.
pub fn anonymize_table(
    table: &AnalysisTable,
    map: &AnonymizationMap,
) -> Result<AnalysisTable, CompareError> {
    let mut out = table.clone();
    for row in &mut out.rows {
        let (kma, sample) = split_eqa_identifier(&row.sample)
            .ok_or_else(|| CompareError::IdentifierShape(row.sample.clone()))?;
        let label = map
            .label(kma)
            .ok_or_else(|| CompareError::UnknownLab(kma.to_string()))?;
        row.sample = join_identifier(label, sample);
    }
    Ok(out)
}

pub fn anonymize_for_lab(
    table: &AnalysisTable,
    kmas: &[String],
    lab: &str,
    fixed_reference_lab: &str,
) -> Result<(AnalysisTable, AnonymizationMap), CompareError> {
    let map = AnonymizationMap::build(kmas, lab, fixed_reference_lab);
    let anonymized = anonymize_table(table, &map)?;
    tracing::debug!(
        analysis = %table.name,
        lab,
        anonymized = map.anonymized_labels().count(),
        "anonymized table"
    );
    Ok((anonymized, map))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_anonymize.rs"]
mod tests;

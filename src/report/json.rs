use serde::Serialize;

use crate::model::classification::CellClass;
use crate::pipeline::stage3_anonymize::AnonymizationMap;
use crate::pipeline::stage6_metrics::{Comparison, Metric};

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonSummary {
    pub analysis: String,
    pub lab: String,
    pub sample: String,
    pub artifact: String,
    pub rows: Vec<String>,
    pub metric: Vec<String>,
    pub shape: [usize; 2],
    pub matches: usize,
    pub mismatches: usize,
    pub synthesized_rows: Vec<String>,
}

impl ComparisonSummary {
    pub fn from_comparison(c: &Comparison, artifact: String) -> Self {
        let (n_rows, n_cols) = c.classes.shape();
        Self {
            analysis: c.table.name.clone(),
            lab: c.lab.clone(),
            sample: c.sample.clone(),
            artifact,
            rows: c.row_labels().into_iter().map(str::to_string).collect(),
            metric: c.metric_values(),
            shape: [n_rows, n_cols],
            matches: c.classes.count(CellClass::Match),
            mismatches: c.classes.count(CellClass::Mismatch),
            synthesized_rows: c.synthesized.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabSummary {
    pub lab: String,
    pub anonymization: Vec<AnonymizationEntry>,
    pub comparisons: Vec<ComparisonSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked_artifact: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnonymizationEntry {
    pub lab: String,
    pub label: String,
}

impl LabSummary {
    pub fn new(lab: &str, map: &AnonymizationMap, comparisons: Vec<ComparisonSummary>) -> Self {
        Self {
            lab: lab.to_string(),
            anonymization: map
                .entries()
                .iter()
                .map(|(lab, label)| AnonymizationEntry {
                    lab: lab.clone(),
                    label: label.clone(),
                })
                .collect(),
            comparisons,
            stacked_artifact: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummary {
    pub analysis: String,
    pub metric: Metric,
    pub columns: Vec<String>,
    pub kmas: Vec<String>,
    pub samples: Vec<String>,
    pub labs: Vec<LabSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: String,
    pub version: String,
    pub fixed_reference_lab: String,
    pub analyses: Vec<AnalysisSummary>,
}

pub fn render_summary_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

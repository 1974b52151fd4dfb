use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;
use thiserror::Error;

use crate::input::yaml::{as_str, get, get_path, mapping_cells, to_cell, untag};
use crate::model::analysis::{
    ASSEMBLY_FIELDS, AnalysisKind, FinderKind, MLST_COLUMNS, POINT_MUTATION_SAMPLE_COLUMN,
};
use crate::model::table::Cell;

pub const SUCCESS_STATUS: &str = "Success";

/// A result file that could not be turned into a record. Its contribution to
/// the analysis table is dropped.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{}: record has no sample.name", .path.display())]
    MissingSampleName { path: PathBuf },
    #[error("{}: record has no status", .path.display())]
    MissingStatus { path: PathBuf },
    #[error("{}: {detail}", .path.display())]
    Payload { path: PathBuf, detail: String },
}

/// Envelope shared by every analysis result file.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub path: PathBuf,
    pub sample_name: String,
    pub status: String,
    pub summary: Value,
    pub results: Value,
}

impl RawRecord {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinderHit {
    pub gene: Cell,
    pub coverage: Cell,
    pub identity: Cell,
    pub sequence: Cell,
    pub start: Cell,
    pub end: Cell,
    pub database: Cell,
    pub accession: Cell,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeciesSummary {
    pub name_classified_species_1: Option<String>,
    pub percent_classified_species_1: Option<f64>,
    pub name_classified_species_2: Option<String>,
    pub percent_classified_species_2: Option<f64>,
    pub percent_unclassified: Option<f64>,
}

/// Analysis-specific content of a successful record.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sequence type followed by the seven locus alleles.
    Mlst(Vec<String>),
    /// One entry per hit, fields in document order.
    PointMutations(Vec<Vec<(String, Cell)>>),
    Amr(Vec<Vec<(String, Cell)>>),
    Finder(Vec<FinderHit>),
    /// Status of every sub-check.
    Stamper(Vec<String>),
    Species(SpeciesSummary),
    Assembly(Vec<Cell>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Parsed(Payload),
    /// The pipeline reported a status other than `Success`.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub sample_name: String,
    pub outcome: Outcome,
}

pub fn read_record(path: &Path) -> Result<RawRecord, RecordError> {
    let text = fs::read_to_string(path).map_err(|source| RecordError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_record(path, &text)
}

pub fn parse_record(path: &Path, text: &str) -> Result<RawRecord, RecordError> {
    let doc: Value = serde_yaml::from_str(text).map_err(|source| RecordError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    let sample_name = get_path(&doc, &["sample", "name"])
        .and_then(as_str)
        .ok_or_else(|| RecordError::MissingSampleName {
            path: path.to_path_buf(),
        })?
        .to_string();
    let status = get(&doc, "status")
        .map(|v| to_cell(v).to_string())
        .ok_or_else(|| RecordError::MissingStatus {
            path: path.to_path_buf(),
        })?;
    Ok(RawRecord {
        path: path.to_path_buf(),
        sample_name,
        status,
        summary: get(&doc, "summary").cloned().unwrap_or(Value::Null),
        results: get(&doc, "results").cloned().unwrap_or(Value::Null),
    })
}

/// Extracts the typed payload for `kind`. Non-success records become
/// `Outcome::Failed` and are never an error.
pub fn decode_record(kind: AnalysisKind, raw: &RawRecord) -> Result<AnalysisRecord, RecordError> {
    if !raw.is_success() {
        return Ok(AnalysisRecord {
            sample_name: raw.sample_name.clone(),
            outcome: Outcome::Failed(raw.status.clone()),
        });
    }
    let payload = match kind {
        AnalysisKind::Mlst => decode_mlst(raw)?,
        AnalysisKind::PointMutations => {
            let values = get_path(&raw.results, &["pointmutations_tsv", "values"]);
            Payload::PointMutations(decode_hit_list(raw, values, "pointmutations_tsv.values")?)
        }
        AnalysisKind::Amr => {
            let values = get(&raw.summary, "output_tsv");
            Payload::Amr(decode_hit_list(raw, values, "output_tsv")?)
        }
        AnalysisKind::Finder(finder) => decode_finder(raw, finder)?,
        AnalysisKind::Stamper(_) => decode_stamper(raw)?,
        AnalysisKind::Species => {
            let species: SpeciesSummary = serde_yaml::from_value(untag(&raw.summary).clone())
                .map_err(|e| payload_error(raw, format!("species summary: {e}")))?;
            Payload::Species(species)
        }
        AnalysisKind::Assembly => decode_assembly(raw)?,
    };
    Ok(AnalysisRecord {
        sample_name: raw.sample_name.clone(),
        outcome: Outcome::Parsed(payload),
    })
}

fn payload_error(raw: &RawRecord, detail: String) -> RecordError {
    RecordError::Payload {
        path: raw.path.clone(),
        detail,
    }
}

fn decode_mlst(raw: &RawRecord) -> Result<Payload, RecordError> {
    let report = get(&raw.summary, "mlst_report")
        .and_then(as_str)
        .ok_or_else(|| payload_error(raw, "summary.mlst_report missing".to_string()))?;
    let mut fields: Vec<String> = report.split(',').map(|s| s.trim().to_string()).collect();
    if fields.len() > MLST_COLUMNS.len() {
        return Err(payload_error(
            raw,
            format!(
                "mlst_report has {} fields, expected {}",
                fields.len(),
                MLST_COLUMNS.len()
            ),
        ));
    }
    fields.resize(MLST_COLUMNS.len(), crate::model::table::NOT_AVAILABLE.to_string());
    Ok(Payload::Mlst(fields))
}

fn decode_hit_list(
    raw: &RawRecord,
    values: Option<&Value>,
    what: &str,
) -> Result<Vec<Vec<(String, Cell)>>, RecordError> {
    let Some(values) = values else {
        return Ok(Vec::new());
    };
    match untag(values) {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                mapping_cells(item)
                    .ok_or_else(|| payload_error(raw, format!("{what}: hit is not a mapping")))
            })
            .map(|hit| {
                hit.map(|fields| {
                    fields
                        .into_iter()
                        .filter(|(k, _)| k != POINT_MUTATION_SAMPLE_COLUMN)
                        .collect()
                })
            })
            .collect(),
        _ => Err(payload_error(raw, format!("{what} is not a list"))),
    }
}

fn decode_finder(raw: &RawRecord, finder: FinderKind) -> Result<Payload, RecordError> {
    let hits = match get(&raw.summary, finder.summary_key()) {
        None => Vec::new(),
        Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                if !matches!(untag(item), Value::Mapping(_)) {
                    return Err(payload_error(
                        raw,
                        format!("{}: hit is not a mapping", finder.summary_key()),
                    ));
                }
                let field = |key: &str| get(item, key).map(to_cell).unwrap_or(Cell::Missing);
                Ok(FinderHit {
                    gene: field("GENE"),
                    coverage: field("%COVERAGE"),
                    identity: field("%IDENTITY"),
                    sequence: field("SEQUENCE"),
                    start: field("START"),
                    end: field("END"),
                    database: field("DATABASE"),
                    accession: field("ACCESSION"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(payload_error(
                raw,
                format!("{} is not a list", finder.summary_key()),
            ));
        }
    };
    Ok(Payload::Finder(hits))
}

fn decode_stamper(raw: &RawRecord) -> Result<Payload, RecordError> {
    let statuses = stamper_statuses(untag(&raw.results))
        .ok_or_else(|| payload_error(raw, "stamper results carry no status".to_string()))?;
    if statuses.is_empty() {
        return Err(payload_error(raw, "stamper results are empty".to_string()));
    }
    Ok(Payload::Stamper(statuses))
}

/// Accepts a list of checks, a map of named checks, or a column-wise map with
/// a `status` list.
fn stamper_statuses(results: &Value) -> Option<Vec<String>> {
    let status_of = |v: &Value| get(v, "status").map(|s| to_cell(s).to_string());
    match results {
        Value::Sequence(items) => items.iter().map(status_of).collect(),
        Value::Mapping(map) => {
            if let Some(column) = map.get("status") {
                return match untag(column) {
                    Value::Sequence(items) => {
                        Some(items.iter().map(|v| to_cell(v).to_string()).collect())
                    }
                    Value::Mapping(inner) => {
                        Some(inner.values().map(|v| to_cell(v).to_string()).collect())
                    }
                    other => Some(vec![to_cell(other).to_string()]),
                };
            }
            map.values().map(status_of).collect()
        }
        _ => None,
    }
}

fn decode_assembly(raw: &RawRecord) -> Result<Payload, RecordError> {
    let mut cells = Vec::with_capacity(ASSEMBLY_FIELDS.len());
    for (key, _) in ASSEMBLY_FIELDS {
        let value = get(&raw.summary, key)
            .ok_or_else(|| payload_error(raw, format!("summary.{key} missing")))?;
        cells.push(to_cell(value));
    }
    Ok(Payload::Assembly(cells))
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/record.rs"]
mod tests;

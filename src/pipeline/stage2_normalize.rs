use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::input::record::{FinderHit, SpeciesSummary};
use crate::input::{Outcome, Payload, decode_record, read_record};
use crate::model::analysis::{AnalysisKind, FINDER_COLUMNS, FINDER_NUMERIC_COLUMNS, MLST_COLUMNS};
use crate::model::table::{AnalysisTable, Cell, NOT_AVAILABLE, Row};
use crate::model::thresholds::{HitThreshold, ThresholdProfile};

pub const STAMP_PASS: &str = "Pass";
pub const STAMP_FAIL: &str = "Fail";
pub const STAMP_NOT_MET: &str = "Requirement Not Met";
const SUB_CHECK_PASS: &str = "pass";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub files: usize,
    pub parsed: usize,
    pub failed: usize,
    pub malformed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage2Output {
    pub table: AnalysisTable,
    pub stats: NormalizeStats,
}

/// Per-file contribution before the table schema is known.
enum Pending {
    Parsed(String, Payload),
    Failed(String),
}

/// Parses every file of one analysis type into a single table. Bad files
/// never abort the batch.
pub fn normalize_analysis(kind: AnalysisKind, files: &[PathBuf]) -> Stage2Output {
    let mut stats = NormalizeStats {
        files: files.len(),
        ..NormalizeStats::default()
    };
    let mut pending = Vec::with_capacity(files.len());

    for path in files {
        let record = read_record(path).and_then(|raw| decode_record(kind, &raw));
        match record {
            Ok(record) => match record.outcome {
                Outcome::Parsed(payload) => {
                    stats.parsed += 1;
                    pending.push(Pending::Parsed(record.sample_name, payload));
                }
                Outcome::Failed(status) => {
                    stats.failed += 1;
                    tracing::warn!(
                        analysis = %kind,
                        sample = %record.sample_name,
                        status = %status,
                        "analysis did not succeed; using fallback row"
                    );
                    pending.push(Pending::Failed(record.sample_name));
                }
            },
            Err(err) => {
                stats.malformed += 1;
                tracing::warn!(analysis = %kind, "malformed record dropped: {err}");
            }
        }
    }

    let columns = match kind {
        AnalysisKind::PointMutations => {
            let discovered = discover_columns(&pending);
            if discovered.is_empty() && !pending.is_empty() {
                tracing::warn!(
                    analysis = %kind,
                    samples = pending.len(),
                    "no point mutation hits; using the default header"
                );
                kind.columns()
            } else {
                discovered
            }
        }
        other => other.columns(),
    };
    let mut table = AnalysisTable::new(kind.name(), columns);
    for item in pending {
        for row in rows_for(kind, &table.columns, item) {
            table.push(row);
        }
    }

    tracing::info!(
        analysis = %kind,
        files = stats.files,
        parsed = stats.parsed,
        failed = stats.failed,
        malformed = stats.malformed,
        rows = table.len(),
        samples = table.samples().len(),
        "normalized analysis"
    );
    Stage2Output { table, stats }
}

/// Union of hit keys in first-seen order.
fn discover_columns(pending: &[Pending]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for item in pending {
        if let Pending::Parsed(_, Payload::PointMutations(hits)) = item {
            for hit in hits {
                for (key, _) in hit {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
        }
    }
    columns
}

fn rows_for(kind: AnalysisKind, columns: &[String], item: Pending) -> Vec<Row> {
    let width = columns.len();
    match item {
        Pending::Failed(sample) => vec![fallback_row(kind, columns, sample)],
        Pending::Parsed(sample, payload) => match payload {
            Payload::Mlst(fields) => {
                vec![Row::new(sample, fields.into_iter().map(Cell::Text).collect())]
            }
            Payload::PointMutations(hits) | Payload::Amr(hits) => {
                if hits.is_empty() {
                    tracing::warn!(analysis = %kind, sample = %sample, "no hits reported");
                    return vec![Row::filled(sample, width, Cell::Missing)];
                }
                hits.into_iter()
                    .map(|hit| keyed_row(&sample, columns, hit))
                    .collect()
            }
            Payload::Finder(hits) => {
                if hits.is_empty() {
                    return vec![fallback_row(kind, columns, sample)];
                }
                hits.into_iter().map(|hit| finder_row(&sample, hit)).collect()
            }
            Payload::Stamper(statuses) => {
                vec![Row::new(sample, vec![Cell::text(stamp_outcome(&statuses))])]
            }
            Payload::Species(summary) => vec![Row::new(sample, species_cells(&summary))],
            Payload::Assembly(cells) => vec![Row::new(sample, cells)],
        },
    }
}

fn fallback_row(kind: AnalysisKind, columns: &[String], sample: String) -> Row {
    match kind {
        AnalysisKind::Mlst => Row::filled(sample, MLST_COLUMNS.len(), Cell::text(NOT_AVAILABLE)),
        AnalysisKind::Stamper(_) => Row::new(sample, vec![Cell::text(STAMP_NOT_MET)]),
        AnalysisKind::Finder(_) => {
            let cells = FINDER_COLUMNS
                .iter()
                .map(|col| {
                    if FINDER_NUMERIC_COLUMNS.contains(col) {
                        Cell::Int(0)
                    } else {
                        Cell::Missing
                    }
                })
                .collect();
            Row::new(sample, cells)
        }
        _ => Row::filled(sample, columns.len(), Cell::Missing),
    }
}

fn keyed_row(sample: &str, columns: &[String], hit: Vec<(String, Cell)>) -> Row {
    let mut cells = vec![Cell::Missing; columns.len()];
    for (key, value) in hit {
        match columns.iter().position(|c| *c == key) {
            Some(idx) => cells[idx] = value,
            None => tracing::debug!(sample, field = %key, "field outside schema ignored"),
        }
    }
    Row::new(sample, cells)
}

fn finder_row(sample: &str, hit: FinderHit) -> Row {
    Row::new(
        sample,
        vec![
            hit.gene,
            Cell::Int(hit.coverage.coerce_int()),
            Cell::Int(hit.identity.coerce_int()),
            hit.sequence,
            Cell::Int(hit.start.coerce_int()),
            Cell::Int(hit.end.coerce_int()),
            hit.database,
            hit.accession,
        ],
    )
}

/// `Pass` only when every sub-check passed.
pub fn stamp_outcome(statuses: &[String]) -> &'static str {
    if statuses.iter().all(|s| s == SUB_CHECK_PASS) {
        STAMP_PASS
    } else {
        STAMP_FAIL
    }
}

fn species_cells(summary: &SpeciesSummary) -> Vec<Cell> {
    let num = |v: Option<f64>| v.map(Cell::Float).unwrap_or(Cell::Missing);
    let name = |v: &Option<String>| v.clone().map(Cell::Text).unwrap_or(Cell::Missing);
    let derived = match (
        summary.percent_unclassified,
        summary.percent_classified_species_1,
    ) {
        (Some(u), Some(s1)) => Cell::Float(u + s1),
        _ => Cell::Missing,
    };
    vec![
        name(&summary.name_classified_species_1),
        num(summary.percent_classified_species_1),
        name(&summary.name_classified_species_2),
        num(summary.percent_classified_species_2),
        num(summary.percent_unclassified),
        derived,
    ]
}

/// Drops finder hits below the coverage/identity gate. Returns the number of
/// rows removed.
pub fn filter_finder_hits(table: &mut AnalysisTable, threshold: HitThreshold) -> usize {
    let (Some(cov), Some(ident)) = (
        table.column_index("%COVERAGE"),
        table.column_index("%IDENTITY"),
    ) else {
        return 0;
    };
    let before = table.len();
    table.retain_rows(|row| {
        threshold.accepts(row.cells[cov].coerce_int(), row.cells[ident].coerce_int())
    });
    before - table.len()
}

/// Normalizes every analysis with a parser and applies finder thresholds.
pub fn collect_tables(
    routed: &BTreeMap<String, Vec<PathBuf>>,
    thresholds: &ThresholdProfile,
) -> BTreeMap<String, AnalysisTable> {
    for name in routed.keys() {
        if AnalysisKind::from_name(name).is_none() {
            tracing::debug!(analysis = %name, "no normalizer for analysis; skipped");
        }
    }

    let mut tables = BTreeMap::new();
    for &kind in AnalysisKind::all() {
        let files = routed.get(kind.name()).map(Vec::as_slice).unwrap_or(&[]);
        let mut output = normalize_analysis(kind, files);
        if let AnalysisKind::Finder(finder) = kind {
            let dropped = filter_finder_hits(&mut output.table, thresholds.for_finder(finder));
            tracing::debug!(analysis = %kind, dropped, "finder hits below threshold dropped");
        }
        tables.insert(kind.name().to_string(), output.table);
    }
    tables
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_normalize.rs"]
mod tests;

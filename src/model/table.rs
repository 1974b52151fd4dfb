use std::fmt;

use serde::Serialize;

pub const NO_DATA: &str = "no_data";
pub const NOT_AVAILABLE: &str = "N/A";

/// One value in a normalized table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Exact value agreement. Missing never agrees, numbers compare numerically.
    pub fn agrees_with(&self, other: &Cell) -> bool {
        if self.is_missing() || other.is_missing() {
            return false;
        }
        match (self, other) {
            (Cell::Int(a), Cell::Int(b)) => a == b,
            (Cell::Float(a), Cell::Float(b)) => a == b,
            (Cell::Int(a), Cell::Float(b)) | (Cell::Float(b), Cell::Int(a)) => (*a as f64) == *b,
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }

    /// Integer coercion used for finder columns; anything unparseable becomes 0.
    pub fn coerce_int(&self) -> i64 {
        match self {
            Cell::Int(v) => *v,
            Cell::Float(v) if v.is_finite() => v.trunc() as i64,
            Cell::Text(s) => {
                let s = s.trim();
                if let Ok(v) = s.parse::<i64>() {
                    v
                } else if let Ok(v) = s.parse::<f64>() {
                    if v.is_finite() { v.trunc() as i64 } else { 0 }
                } else {
                    0
                }
            }
            _ => 0,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => f.write_str("nan"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => f.write_str(&format_float(*v)),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub sample: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(sample: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            sample: sample.into(),
            cells,
        }
    }

    pub fn filled(sample: impl Into<String>, width: usize, cell: Cell) -> Self {
        Self::new(sample, vec![cell; width])
    }
}

/// Rows keyed by sample identifier. Duplicate identifiers are allowed until
/// duplicate runs are reconciled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl AnalysisTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn push(&mut self, row: Row) {
        debug_assert_eq!(row.cells.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn contains_sample(&self, sample: &str) -> bool {
        self.rows.iter().any(|r| r.sample == sample)
    }

    pub fn rows_for<'a>(&'a self, sample: &'a str) -> impl Iterator<Item = &'a Row> + 'a {
        self.rows.iter().filter(move |r| r.sample == sample)
    }

    #[cfg(test)]
    pub fn has_duplicate_samples(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.rows.len());
        self.rows.iter().any(|r| !seen.insert(r.sample.as_str()))
    }

    /// Distinct sample identifiers in first-seen order.
    pub fn samples(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if seen.insert(row.sample.as_str()) {
                out.push(row.sample.clone());
            }
        }
        out
    }

    pub fn retain_rows(&mut self, mut keep: impl FnMut(&Row) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    pub fn rename_columns(&mut self, renames: &std::collections::BTreeMap<String, String>) {
        for col in &mut self.columns {
            if let Some(new_name) = renames.get(col) {
                *col = new_name.clone();
            }
        }
    }

    /// Stable sort by one column's display text, then by sample identifier.
    pub fn sort_by_column(&mut self, column: &str) -> bool {
        let Some(idx) = self.column_index(column) else {
            return false;
        };
        self.rows.sort_by(|a, b| {
            a.cells[idx]
                .to_string()
                .cmp(&b.cells[idx].to_string())
                .then_with(|| a.sample.cmp(&b.sample))
        });
        true
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/table.rs"]
mod tests;

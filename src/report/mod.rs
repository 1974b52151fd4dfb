pub mod json;
pub mod tsv;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::classification::ClassMatrix;
use crate::model::table::AnalysisTable;

pub const SHORTEN_PLACEHOLDER: &str = " [...]";

/// Cell text formatting supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub max_width: usize,
    pub truncate: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_width: 70,
            truncate: false,
        }
    }
}

/// Everything a renderer needs: cell text, colours and labels.
#[derive(Debug, Clone, Copy)]
pub struct RenderTable<'a> {
    pub table: &'a AnalysisTable,
    pub classes: &'a ClassMatrix,
}

impl RenderTable<'_> {
    pub fn row_labels(&self) -> Vec<&str> {
        self.table.rows.iter().map(|r| r.sample.as_str()).collect()
    }

    pub fn column_labels(&self) -> &[String] {
        &self.table.columns
    }

    pub fn cell_text(&self, options: &RenderOptions) -> Vec<Vec<String>> {
        self.table
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| format_cell_text(&c.to_string(), options))
                    .collect()
            })
            .collect()
    }

    pub fn colors(&self) -> Vec<Vec<&'static str>> {
        (0..self.classes.n_rows)
            .map(|r| self.classes.row(r).iter().map(|c| c.color()).collect())
            .collect()
    }
}

/// Produces a rendered artifact from a coloured table.
pub trait TableRenderer {
    fn file_ending(&self) -> &'static str;
    fn render(&self, table: &RenderTable<'_>, path: &Path) -> std::io::Result<()>;
}

pub fn format_cell_text(text: &str, options: &RenderOptions) -> String {
    if options.truncate {
        shorten(text, options.max_width)
    } else {
        text.to_string()
    }
}

/// Collapses whitespace and cuts at a word boundary so the result, placeholder
/// included, fits in `width` characters.
pub fn shorten(text: &str, width: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let collapsed = words.join(" ");
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let budget = width.saturating_sub(SHORTEN_PLACEHOLDER.chars().count());
    let mut out = String::new();
    for word in words {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if extra == 1 {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        SHORTEN_PLACEHOLDER.trim_start().to_string()
    } else {
        out.push_str(SHORTEN_PLACEHOLDER);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/report/mod.rs"]
mod tests;

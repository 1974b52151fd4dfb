use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::model::table::AnalysisTable;
use crate::report::{RenderOptions, RenderTable, TableRenderer};

pub const SAMPLE_COLUMN: &str = "sample";

fn sanitize(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}

pub fn write_table_tsv(table: &AnalysisTable, path: &Path) -> std::io::Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    let mut header = vec![SAMPLE_COLUMN.to_string()];
    header.extend(table.columns.iter().map(|c| sanitize(c)));
    writeln!(w, "{}", header.join("\t"))?;
    for row in &table.rows {
        let mut fields = vec![sanitize(&row.sample)];
        fields.extend(row.cells.iter().map(|c| sanitize(&c.to_string())));
        writeln!(w, "{}", fields.join("\t"))?;
    }
    w.flush()
}

/// Writes cell text to `<path>` and the colour grid to `<path>.colors.tsv`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsvRenderer {
    pub options: RenderOptions,
}

impl TsvRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

pub fn colors_path(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(".colors.tsv");
    path.with_file_name(name)
}

impl TableRenderer for TsvRenderer {
    fn file_ending(&self) -> &'static str {
        ".tsv"
    }

    fn render(&self, table: &RenderTable<'_>, path: &Path) -> std::io::Result<()> {
        let rows = table.row_labels();
        let mut header = vec![SAMPLE_COLUMN.to_string()];
        header.extend(table.column_labels().iter().map(|c| sanitize(c)));

        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "{}", header.join("\t"))?;
        for (label, cells) in rows.iter().zip(table.cell_text(&self.options)) {
            let mut fields = vec![sanitize(label)];
            fields.extend(cells.iter().map(|c| sanitize(c)));
            writeln!(w, "{}", fields.join("\t"))?;
        }
        w.flush()?;

        let mut w = BufWriter::new(File::create(colors_path(path))?);
        writeln!(w, "{}", header.join("\t"))?;
        for (label, colors) in rows.iter().zip(table.colors()) {
            writeln!(w, "{}\t{}", sanitize(label), colors.join("\t"))?;
        }
        w.flush()
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use crate::input::InputError;

pub const SAMPLE_ID_COLUMN: &str = "SampleID";

/// Reads a tab- or comma-separated sample sheet and resolves every `SampleID`
/// to a directory next to the sheet.
pub fn load_sample_sheet(path: &Path) -> Result<Vec<PathBuf>, InputError> {
    let content = fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| InputError::InvalidInput(format!("{} is empty", path.display())))?;
    let delimiter = if header.contains('\t') { '\t' } else { ',' };

    let id_col = header
        .split(delimiter)
        .position(|h| h.trim().trim_matches('"') == SAMPLE_ID_COLUMN)
        .ok_or_else(|| {
            InputError::MissingInput(format!(
                "{} has no {SAMPLE_ID_COLUMN} column",
                path.display()
            ))
        })?;

    let mut out = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let Some(raw) = line.split(delimiter).nth(id_col) else {
            tracing::warn!(
                line = line_no + 2,
                "sample sheet line has no {SAMPLE_ID_COLUMN} value; skipping"
            );
            continue;
        };
        let id = raw.trim().trim_matches('"');
        if id.is_empty() {
            tracing::warn!(line = line_no + 2, "empty {SAMPLE_ID_COLUMN}; skipping");
            continue;
        }
        out.push(base.join(id));
    }

    tracing::info!(
        sheet = %path.display(),
        samples = out.len(),
        "loaded sample sheet"
    );
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/sheet.rs"]
mod tests;

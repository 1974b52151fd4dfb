use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::input::InputError;
use crate::model::analysis::{EXPECTED_RESULT_SUFFIXES, analysis_name_from_file};

/// Presence of one sample directory and each expected result file in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleStatus {
    pub exists: bool,
    pub files: BTreeMap<String, bool>,
}

impl SampleStatus {
    pub fn missing_files(&self) -> impl Iterator<Item = &str> {
        self.files
            .iter()
            .filter(|(_, present)| !**present)
            .map(|(name, _)| name.as_str())
    }
}

pub type ValidationReport = BTreeMap<PathBuf, SampleStatus>;

pub fn check_samples(dirs: &[PathBuf]) -> ValidationReport {
    let mut report = BTreeMap::new();
    for dir in dirs {
        let status = check_sample_dir(dir);
        report.insert(dir.clone(), status);
    }
    report
}

pub fn check_sample_dir(dir: &Path) -> SampleStatus {
    let mut files = BTreeMap::new();
    if !dir.is_dir() {
        tracing::error!("{}", InputError::MissingDirectory(dir.to_path_buf()));
        return SampleStatus {
            exists: false,
            files,
        };
    }

    let sample_name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for suffix in EXPECTED_RESULT_SUFFIXES {
        let file_name = format!("{sample_name}{suffix}");
        let present = dir.join(&file_name).is_file();
        if !present {
            tracing::debug!(sample = %sample_name, file = %file_name, "result file not present");
        }
        files.insert(file_name, present);
    }

    let status = SampleStatus {
        exists: true,
        files,
    };
    let n_missing = status.missing_files().count();
    if n_missing > 0 {
        tracing::warn!(
            sample = %sample_name,
            missing = n_missing,
            expected = EXPECTED_RESULT_SUFFIXES.len(),
            "sample is missing result files"
        );
    }
    status
}

/// Groups every present result file by analysis name. Missing directories and
/// missing files are skipped.
pub fn route_analysis_files(report: &ValidationReport) -> BTreeMap<String, Vec<PathBuf>> {
    let mut routed: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for (dir, status) in report {
        if !status.exists {
            continue;
        }
        for (file_name, present) in &status.files {
            if !present {
                continue;
            }
            let Some(analysis) = analysis_name_from_file(file_name) else {
                tracing::warn!(file = %file_name, "cannot derive analysis name; skipping");
                continue;
            };
            routed
                .entry(analysis.to_string())
                .or_default()
                .push(dir.join(file_name));
        }
    }
    routed
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_validate.rs"]
mod tests;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::identifiers::DEFAULT_FIXED_REFERENCE_LAB;
use crate::model::thresholds::ThresholdProfile;
use crate::pipeline::stage4_reconcile::AssemblyOptions;
use crate::pipeline::stage6_metrics::{ALL_COLUMNS, ComparisonOptions, Metric};
use crate::report::RenderOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn default_fixed_reference_lab() -> String {
    DEFAULT_FIXED_REFERENCE_LAB.to_string()
}

fn default_metric() -> String {
    ALL_COLUMNS.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub sample_sheet: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_fixed_reference_lab")]
    pub fixed_reference_lab: String,
    #[serde(default)]
    pub thresholds: ThresholdProfile,
    #[serde(default)]
    pub render: RenderOptions,
    #[serde(default)]
    pub comparisons: Vec<ComparisonSpec>,
}

/// One analysis to compare across laboratories.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonSpec {
    pub analysis: String,
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rename: BTreeMap<String, String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

impl Config {
    /// Relative paths in the file are taken relative to the file's directory.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.sample_sheet, &mut self.output_dir] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl ComparisonSpec {
    pub fn assembly_options(&self, fixed_reference_lab: &str) -> AssemblyOptions {
        AssemblyOptions {
            fixed_reference_lab: fixed_reference_lab.to_string(),
            renames: self.rename.clone(),
            sort_by: self.sort_by.clone(),
        }
    }

    pub fn comparison_options(&self, fixed_reference_lab: &str) -> ComparisonOptions {
        ComparisonOptions {
            fixed_reference_lab: fixed_reference_lab.to_string(),
            metric: Metric::from_name(&self.metric),
            columns: self.columns.clone(),
        }
    }
}

pub fn parse_config(path: &Path, text: &str) -> Result<Config, ConfigError> {
    serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config = parse_config(path, &text)?;
    config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));
    Ok(config)
}

#[cfg(test)]
#[path = "../tests/src_inline/config.rs"]
mod tests;

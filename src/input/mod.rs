use std::path::PathBuf;

use thiserror::Error;

pub mod record;
pub mod sheet;
pub mod yaml;

pub use record::{Outcome, Payload, decode_record, read_record};
pub use sheet::load_sample_sheet;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing input: {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("sample directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
}

impl InputError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InputError::Io {
            path: path.into(),
            source,
        }
    }
}

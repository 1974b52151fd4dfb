use thiserror::Error;

pub mod stage1_validate;
pub mod stage2_normalize;
pub mod stage3_anonymize;
pub mod stage4_reconcile;
pub mod stage5_compare;
pub mod stage6_metrics;
pub mod stage7_report;

/// Errors surfaced to the caller of a comparison; never absorbed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("identifier `{0}` does not follow the <LAB>_WGS_EQA_<n> naming convention")]
    IdentifierShape(String),
    #[error("laboratory `{0}` is not part of the laboratory roster")]
    UnknownLab(String),
    #[error("column `{0}` is not present in the table")]
    UnknownColumn(String),
    #[error("table `{0}` has no rows to compare")]
    EmptyTable(String),
}

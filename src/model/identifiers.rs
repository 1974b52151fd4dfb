use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_FIXED_REFERENCE_LAB: &str = "SSI_BTP_WGS";
pub const ANONYMIZED_LABEL_PREFIX: &str = "other_kma_";

/// Characters of the sample tag shared by every run of the same EQA sample.
pub const SAMPLE_STEM_LEN: usize = 6;

/// Laboratory prefix: first three underscore-separated tokens.
pub fn lab_prefix(sample_name: &str) -> String {
    sample_name.split('_').take(3).collect::<Vec<_>>().join("_")
}

fn eqa_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(.*_WGS)_(EQA_[0-9]+.*)$").ok())
        .as_ref()
}

/// Splits `<lab tag>_<EQA sample tag>`, e.g. `HER_BTP_WGS_EQA_03-2` -> (`HER_BTP_WGS`, `EQA_03-2`).
pub fn split_eqa_identifier(identifier: &str) -> Option<(&str, &str)> {
    let caps = eqa_pattern()?.captures(identifier)?;
    let lab = caps.get(1)?.as_str();
    let sample = caps.get(2)?.as_str();
    Some((lab, sample))
}

/// Leading characters of a sample tag, e.g. `EQA_03-2` -> `EQA_03`.
pub fn sample_stem(sample: &str) -> &str {
    match sample.char_indices().nth(SAMPLE_STEM_LEN) {
        Some((idx, _)) => &sample[..idx],
        None => sample,
    }
}

pub fn join_identifier(lab: &str, sample: &str) -> String {
    format!("{lab}_{sample}")
}

pub fn is_anonymized_label(label: &str) -> bool {
    label.starts_with(ANONYMIZED_LABEL_PREFIX)
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/identifiers.rs"]
mod tests;

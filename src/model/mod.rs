pub mod analysis;
pub mod classification;
pub mod identifiers;
pub mod table;
pub mod thresholds;

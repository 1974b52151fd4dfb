use serde::{Deserialize, Serialize};

use crate::model::analysis::FinderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitThreshold {
    pub min_coverage: i64,
    pub min_identity: i64,
}

impl HitThreshold {
    pub const fn new(min_coverage: i64, min_identity: i64) -> Self {
        Self {
            min_coverage,
            min_identity,
        }
    }

    pub fn accepts(&self, coverage: i64, identity: i64) -> bool {
        coverage >= self.min_coverage && identity >= self.min_identity
    }
}

/// Coverage/identity gates applied to finder hits after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdProfile {
    pub plasmid: HitThreshold,
    pub resistance: HitThreshold,
    pub virulence: HitThreshold,
}

impl ThresholdProfile {
    pub fn default_v1() -> Self {
        Self {
            plasmid: HitThreshold::new(80, 80),
            resistance: HitThreshold::new(60, 90),
            virulence: HitThreshold::new(60, 90),
        }
    }

    pub fn for_finder(&self, kind: FinderKind) -> HitThreshold {
        match kind {
            FinderKind::Plasmid => self.plasmid,
            FinderKind::Resistance => self.resistance,
            FinderKind::Virulence => self.virulence,
        }
    }
}

impl Default for ThresholdProfile {
    fn default() -> Self {
        Self::default_v1()
    }
}

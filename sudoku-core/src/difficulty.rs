#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Target difficulty of a generated puzzle.
///
/// The elimination envelope attached to each level lives in the generator;
/// the forced-cells registry consumes the level directly for its
/// protection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
    Unknown,
}

impl core::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

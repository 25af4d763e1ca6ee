//! Difficulty envelopes for the elimination pipeline.

use sudoku_core::Difficulty;

use crate::GenError;

#[cfg(feature = "telemetry-tracing")]
use tracing::warn;

#[cfg(not(feature = "telemetry-tracing"))]
macro_rules! warn {
    ($($tt:tt)*) => {};
}

/// How aggressively elimination may thin a solved board, and whether
/// phase 3 walks candidates by box density or in shuffled order.
#[derive(Debug, Clone, Copy)]
pub struct DifficultyConfig {
    pub difficulty: Difficulty,
    /// Fraction of cells elimination aims to clear, lower bound.
    pub min_elimination: f64,
    /// Fraction of cells elimination aims to clear, upper bound.
    pub max_elimination: f64,
    pub use_density_scoring: bool,
    pub prioritize_high_density: bool,
}

impl DifficultyConfig {
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        let (min_elimination, max_elimination, prioritize_high_density) = match difficulty {
            Difficulty::Easy => (0.43, 0.56, true),
            // Unknown still has to drive phase 3; it borrows the medium envelope.
            Difficulty::Medium | Difficulty::Unknown => (0.57, 0.60, true),
            Difficulty::Hard => (0.62, 0.65, false),
            Difficulty::Expert => (0.67, 0.73, false),
        };
        Self {
            difficulty,
            min_elimination,
            max_elimination,
            use_density_scoring: true,
            prioritize_high_density,
        }
    }

    /// Hard failure outside `0 <= min <= max <= 1`; envelopes reaching
    /// below 20% or above 85% are suspicious but only warned about.
    pub fn validate(&self) -> Result<(), GenError> {
        if !(0.0..=1.0).contains(&self.min_elimination)
            || !(0.0..=1.0).contains(&self.max_elimination)
        {
            return Err(GenError::InvalidConfig {
                reason: "elimination bounds must lie in [0, 1]",
            });
        }
        if self.min_elimination > self.max_elimination {
            return Err(GenError::InvalidConfig {
                reason: "min elimination exceeds max elimination",
            });
        }
        if self.min_elimination < 0.20 {
            warn!(
                min = self.min_elimination,
                "elimination floor below 20%, puzzles will be very dense"
            );
        }
        if self.max_elimination > 0.85 {
            warn!(
                max = self.max_elimination,
                "elimination ceiling above 85%, uniqueness will be hard to keep"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_envelopes_match_the_difficulty_bands() {
        let easy = DifficultyConfig::for_difficulty(Difficulty::Easy);
        assert_eq!((easy.min_elimination, easy.max_elimination), (0.43, 0.56));
        assert!(easy.prioritize_high_density);

        let medium = DifficultyConfig::for_difficulty(Difficulty::Medium);
        assert_eq!((medium.min_elimination, medium.max_elimination), (0.57, 0.60));
        assert!(medium.prioritize_high_density);

        let hard = DifficultyConfig::for_difficulty(Difficulty::Hard);
        assert_eq!((hard.min_elimination, hard.max_elimination), (0.62, 0.65));
        assert!(!hard.prioritize_high_density);

        let expert = DifficultyConfig::for_difficulty(Difficulty::Expert);
        assert_eq!((expert.min_elimination, expert.max_elimination), (0.67, 0.73));
        assert!(!expert.prioritize_high_density);
    }

    #[test]
    fn unknown_borrows_the_medium_envelope() {
        let unknown = DifficultyConfig::for_difficulty(Difficulty::Unknown);
        let medium = DifficultyConfig::for_difficulty(Difficulty::Medium);
        assert_eq!(unknown.min_elimination, medium.min_elimination);
        assert_eq!(unknown.max_elimination, medium.max_elimination);
    }

    #[test]
    fn validation_rejects_inverted_or_out_of_range_bounds() {
        let mut cfg = DifficultyConfig::for_difficulty(Difficulty::Medium);
        cfg.min_elimination = 0.9;
        assert!(cfg.validate().is_err());

        cfg.min_elimination = -0.1;
        assert!(cfg.validate().is_err());

        cfg.min_elimination = 0.3;
        cfg.max_elimination = 1.2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn suspicious_envelopes_only_warn() {
        let mut cfg = DifficultyConfig::for_difficulty(Difficulty::Medium);
        cfg.min_elimination = 0.05;
        cfg.max_elimination = 0.9;
        assert!(cfg.validate().is_ok());
    }
}

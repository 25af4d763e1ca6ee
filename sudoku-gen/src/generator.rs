//! Generation orchestrator: diagonal seeding, AC3HB completion with
//! bounded retries, then the three elimination phases.

use rand::Rng;
use sudoku_core::{Board, Difficulty, Pos};
use sudoku_solver::{SolveStats, SolverConfig, complete_with_config};

use crate::GenError;
use crate::config::DifficultyConfig;
use crate::eliminate::{phase1_balanced, phase2_alternatives, phase3_unique};
use crate::events::{EventSink, GenEventKind, GenObserver};
use crate::shuffle::{permutation, seeded_rng};

#[cfg(feature = "telemetry-tracing")]
use tracing::trace;

#[cfg(not(feature = "telemetry-tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Configuration for puzzle generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerateConfig {
    /// Elimination envelope and protection difficulty.
    pub difficulty: DifficultyConfig,
    /// Completion attempts before giving up.
    pub max_attempts: u32,
    /// RNG seed for deterministic generation.
    pub seed: u64,
}

impl GenerateConfig {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty: DifficultyConfig::for_difficulty(difficulty),
            max_attempts: 5,
            seed,
        }
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationReport {
    /// Solver statistics from the accepted completion attempt.
    pub stats: SolveStats,
    /// Completion attempts spent (1-based).
    pub attempts: u32,
    /// Cells removed across all three phases.
    pub removed: u32,
    /// Clues left on the final puzzle.
    pub clues: u16,
}

/// Generates a puzzle into `board` with default settings for `difficulty`.
pub fn generate(
    board: &mut Board,
    difficulty: Difficulty,
    seed: u64,
) -> Result<GenerationReport, GenError> {
    generate_ex(board, &GenerateConfig::new(difficulty, seed), None)
}

/// Generates a puzzle into `board`, streaming progress to `observer`.
///
/// The board is cleared and refilled; on success it holds the final
/// puzzle and the forced-cells registry from the accepted completion.
pub fn generate_ex(
    board: &mut Board,
    config: &GenerateConfig,
    observer: Option<&mut dyn GenObserver>,
) -> Result<GenerationReport, GenError> {
    config.difficulty.validate()?;

    let n = board.size();
    let mut rng = seeded_rng(config.seed);
    let mut events = EventSink::new(observer);
    let mut stats = SolveStats::default();

    events.emit(GenEventKind::GenerationStart, board, None);
    trace!(
        n,
        seed = config.seed,
        max_attempts = config.max_attempts,
        "gen.start"
    );

    let solver_config = SolverConfig::default();
    let mut attempt = 0;
    loop {
        attempt += 1;
        trace!(attempt, "gen.attempt");
        board.clear();
        fill_diagonal_boxes(board, &mut rng)?;

        match complete_with_config(board, &solver_config, &mut rng, &mut stats) {
            Ok(()) => break,
            Err(_err) => {
                trace!(attempt, error = %_err, "gen.attempt_failed");
                if attempt >= config.max_attempts.max(1) {
                    return Err(GenError::AttemptsExhausted { attempts: attempt });
                }
            }
        }
    }

    let order: Vec<u8> = (0..n).collect();
    let phase1 = phase1_balanced(board, &order, &mut rng, &mut events)?;
    let phase2 = phase2_alternatives(board, &order, &mut events)?;
    let phase3 = phase3_unique(
        board,
        &config.difficulty,
        phase1 + phase2,
        &mut rng,
        &mut events,
    )?;

    board.update_stats();
    events.emit(GenEventKind::GenerationComplete, board, None);

    let removed = phase1 + phase2 + phase3;
    trace!(attempt, removed, clues = board.clues(), "gen.accept");

    Ok(GenerationReport {
        stats,
        attempts: attempt,
        removed,
        clues: board.clues(),
    })
}

/// Fills the k boxes on the main diagonal with independent shuffled
/// permutations of `1..=N`. The boxes share no row, column or box, so no
/// legality check is needed.
fn fill_diagonal_boxes<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) -> Result<(), GenError> {
    let k = board.box_size();
    let n = board.size();
    for d in 0..k {
        let values = permutation(n as usize, 1, rng);
        let origin = Pos::new(d * k, d * k);
        for (i, &value) in values.iter().enumerate() {
            let pos = Pos::new(origin.row + (i as u8) / k, origin.col + (i as u8) % k);
            board.set(pos, value)?;
        }
    }
    Ok(())
}

#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod eliminate;
pub mod events;
pub mod generator;
pub mod shuffle;

pub use crate::config::DifficultyConfig;
pub use crate::eliminate::{
    has_alternative, phase1_balanced, phase2_alternatives, phase2_round, phase3_unique,
};
pub use crate::events::{EventSink, GenEvent, GenEventKind, GenObserver};
pub use crate::generator::{GenerateConfig, GenerationReport, generate, generate_ex};

#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error(transparent)]
    Core(#[from] sudoku_core::CoreError),

    #[error(transparent)]
    Solve(#[from] sudoku_solver::SolveError),

    #[error("generation exhausted attempts ({attempts})")]
    AttemptsExhausted { attempts: u32 },

    #[error("invalid difficulty configuration: {reason}")]
    InvalidConfig { reason: &'static str },
}

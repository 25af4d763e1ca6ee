#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub mod budget;
pub mod density;
pub mod error;
pub mod heuristics;
pub mod network;
pub mod propagate;
pub mod queue;
pub mod solver;
pub mod stats;

pub use crate::budget::{SearchBudget, TimeBudget};
pub use crate::density::BoxDensity;
pub use crate::error::SolveError;
pub use crate::heuristics::{
    CellScore, HeuristicWeights, candidates_shuffled, order_values_lcv, select_optimal_cell,
};
pub use crate::network::ConstraintNetwork;
pub use crate::propagate::{Consistency, enforce_consistency, propagate_from, revise};
pub use crate::solver::{SolverConfig, ValueOrder, complete, complete_ex, complete_with_config};
pub use crate::stats::SolveStats;

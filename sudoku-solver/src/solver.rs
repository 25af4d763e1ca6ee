//! The AC3HB completion engine: arc consistency plus heuristic
//! backtracking over the constraint network.
//!
//! Each invocation owns its timeout record and statistics; nothing is
//! process-global. The board's forced-cells registry (created here if the
//! caller did not attach one) receives the provenance of every derived
//! cell: naked singles from the root propagation pass, hidden singles
//! from the root unit scan, singletons induced by in-search propagation,
//! and guessed cells that only survived after backtracking.

use fixedbitset::FixedBitSet;
use rand::Rng;
use smallvec::SmallVec;
use sudoku_core::{Board, Domain, ForcedCells, ForcedKind, pos_of};

#[cfg(feature = "tracing")]
use tracing::trace;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

use crate::budget::{DEEPENING_STEP, SearchBudget, TimeBudget};
use crate::density::BoxDensity;
use crate::error::SolveError;
use crate::heuristics::{
    HeuristicWeights, candidates_shuffled, order_values_lcv, select_optimal_cell,
};
use crate::network::ConstraintNetwork;
use crate::propagate::{Consistency, enforce_consistency, propagate_from};
use crate::stats::SolveStats;

/// How candidate values for a chosen cell are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueOrder {
    /// Least-constraining value first (deterministic).
    #[default]
    Lcv,
    /// The domain as a uniformly shuffled array.
    Random,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
    pub weights: HeuristicWeights,
    pub value_order: ValueOrder,
    /// Overrides the per-size budget. `None` selects by board size.
    pub budget: Option<SearchBudget>,
}

/// Completes `board` in place with default configuration.
pub fn complete(board: &mut Board) -> Result<SolveStats, SolveError> {
    let mut stats = SolveStats::default();
    complete_ex(board, &mut stats)?;
    Ok(stats)
}

/// Completes `board` in place, accumulating statistics into `stats`.
/// Statistics are written on success and on controlled failure.
pub fn complete_ex(board: &mut Board, stats: &mut SolveStats) -> Result<(), SolveError> {
    complete_with_config(board, &SolverConfig::default(), &mut rand::rng(), stats)
}

/// Completes `board` under an explicit configuration and RNG handle.
///
/// The RNG is only consulted for [`ValueOrder::Random`]; the default LCV
/// ordering is fully deterministic.
pub fn complete_with_config<R: Rng + ?Sized>(
    board: &mut Board,
    config: &SolverConfig,
    rng: &mut R,
    stats: &mut SolveStats,
) -> Result<(), SolveError> {
    stats.reset();
    let n = board.size();
    let budget = config.budget.unwrap_or_else(|| SearchBudget::for_size(n));
    let mut time = TimeBudget::new(budget.timeout);

    if board.forced().is_none() {
        board.attach_forced(ForcedCells::new(n));
    }
    let mut forced = board.take_forced();

    trace!(
        n,
        max_depth = budget.max_depth,
        deepening = budget.iterative_deepening,
        "solve.start"
    );

    let result = if budget.iterative_deepening {
        let mut limit = DEEPENING_STEP.min(budget.max_depth);
        loop {
            // Per-iteration counters restart; the clock never does.
            stats.total_backtracks = 0;
            stats.cells_assigned = 0;
            match run(board, forced.as_mut(), config, limit, &mut time, rng, stats) {
                Err(SolveError::DepthExhausted) if limit < budget.max_depth => {
                    trace!(limit, "solve.deepen");
                    limit = (limit + DEEPENING_STEP).min(budget.max_depth);
                }
                other => break other,
            }
        }
    } else {
        run(
            board,
            forced.as_mut(),
            config,
            budget.max_depth,
            &mut time,
            rng,
            stats,
        )
    };

    stats.time_ms = time.elapsed_ms();
    if let Some(registry) = forced {
        board.attach_forced(registry);
    }
    if result.is_ok() {
        trace!(
            assigned = stats.cells_assigned,
            backtracks = stats.total_backtracks,
            "solve.accept"
        );
    } else {
        trace!(expired = time.expired(), "solve.fail");
    }
    result
}

fn run<R: Rng + ?Sized>(
    board: &mut Board,
    forced: Option<&mut ForcedCells>,
    config: &SolverConfig,
    depth_limit: u32,
    time: &mut TimeBudget,
    rng: &mut R,
    stats: &mut SolveStats,
) -> Result<(), SolveError> {
    let net = ConstraintNetwork::from_board(board);
    let density = BoxDensity::from_network(&net);

    // Density bookkeeping starts from the network's singletons (what the
    // cache counted); registration bookkeeping starts from the board's
    // clues, so singletons derived during construction still get records.
    let mut counted = FixedBitSet::with_capacity(net.cell_count() as usize);
    for cell in 0..net.cell_count() {
        if net.domain(cell).is_singleton() {
            counted.insert(cell as usize);
        }
    }
    let mut decided = FixedBitSet::with_capacity(net.cell_count() as usize);
    for (idx, &v) in board.cells().iter().enumerate() {
        if v != 0 {
            decided.insert(idx);
        }
    }

    let mut engine = Engine {
        net,
        density,
        counted,
        decided,
        forced,
        config,
        depth_limit,
        time,
        rng,
        stats,
        step: 0,
    };

    match engine.solve(0) {
        StepOutcome::Solved => {
            copy_solution(board, &engine.net)?;
            Ok(())
        }
        StepOutcome::DeadEnd => Err(SolveError::Unsolvable),
        StepOutcome::DepthExhausted => Err(SolveError::DepthExhausted),
        StepOutcome::Timeout => Err(SolveError::Timeout {
            elapsed_ms: engine.time.elapsed_ms(),
        }),
    }
}

fn copy_solution(board: &mut Board, net: &ConstraintNetwork) -> Result<(), SolveError> {
    let n = net.size();
    for cell in 0..net.cell_count() {
        if let Some(value) = net.domain(cell).sole_value() {
            board.set(pos_of(n, cell as usize), value)?;
        }
    }
    board.update_stats();
    Ok(())
}

enum StepOutcome {
    Solved,
    DeadEnd,
    /// A dead end reached only because the depth limit cut the search
    /// short; a deeper sweep may still succeed.
    DepthExhausted,
    Timeout,
}

struct Engine<'a, R: Rng + ?Sized> {
    net: ConstraintNetwork,
    density: BoxDensity,
    /// Cells currently contributing to the density cache.
    counted: FixedBitSet,
    /// Cells whose value already has a provenance: clues, guesses, and
    /// everything registered so far.
    decided: FixedBitSet,
    forced: Option<&'a mut ForcedCells>,
    config: &'a SolverConfig,
    depth_limit: u32,
    time: &'a mut TimeBudget,
    rng: &'a mut R,
    stats: &'a mut SolveStats,
    step: u32,
}

impl<R: Rng + ?Sized> Engine<'_, R> {
    fn solve(&mut self, depth: u32) -> StepOutcome {
        if self.time.expired() {
            return StepOutcome::Timeout;
        }
        self.time.tick();
        if depth > self.depth_limit {
            return StepOutcome::DepthExhausted;
        }
        self.stats.max_depth = self.stats.max_depth.max(depth);

        // Propagate to a fixed point. The root pass also claims hidden
        // singles, looping until the unit scan comes up dry.
        loop {
            if enforce_consistency(&mut self.net, self.stats) == Consistency::Inconsistent {
                return StepOutcome::DeadEnd;
            }
            if self.time.expired() {
                return StepOutcome::Timeout;
            }
            self.time.tick();
            let kind = if depth == 0 {
                ForcedKind::NakedSingle
            } else {
                ForcedKind::Propagated
            };
            self.register_new_singletons(kind);
            if depth == 0 && self.assign_hidden_singles() > 0 {
                continue;
            }
            break;
        }

        if self.net.is_solved() {
            return StepOutcome::Solved;
        }
        if self.net.has_empty_domain() {
            return StepOutcome::DeadEnd;
        }

        if self.time.expired() {
            return StepOutcome::Timeout;
        }
        self.time.tick();
        let Some(score) = select_optimal_cell(&self.net, &self.density, &self.config.weights)
        else {
            return StepOutcome::DeadEnd;
        };
        let cell = score.cell;

        let candidates: SmallVec<[u8; 16]> = match self.config.value_order {
            ValueOrder::Lcv => order_values_lcv(&self.net, cell),
            ValueOrder::Random => candidates_shuffled(&self.net, cell, self.rng),
        };

        let mut failed_before_success = false;
        let mut hit_depth_limit = false;
        for value in candidates {
            if self.time.expired() {
                return StepOutcome::Timeout;
            }

            let backup = self.snapshot(cell);
            self.net.assign(cell, value);
            self.mark_counted(cell);
            self.decided.insert(cell as usize);
            self.stats.cells_assigned += 1;
            self.time.tick();

            if propagate_from(&mut self.net, cell, self.stats) == Consistency::Consistent
                && !self.time.expired()
            {
                self.register_new_singletons(ForcedKind::Propagated);
                match self.solve(depth + 1) {
                    StepOutcome::Solved => {
                        if failed_before_success {
                            self.register_forced(cell, value, ForcedKind::Backtracked);
                        }
                        return StepOutcome::Solved;
                    }
                    StepOutcome::DepthExhausted => hit_depth_limit = true,
                    StepOutcome::DeadEnd | StepOutcome::Timeout => {}
                }
            }

            self.restore(&backup);
            self.stats.total_backtracks += 1;
            failed_before_success = true;
        }

        if self.time.expired() {
            StepOutcome::Timeout
        } else if hit_depth_limit {
            StepOutcome::DepthExhausted
        } else {
            StepOutcome::DeadEnd
        }
    }

    /// Domains of the cell and its whole neighborhood, captured before a
    /// tentative assignment.
    fn snapshot(&self, cell: u16) -> SmallVec<[(u16, Domain); 24]> {
        let neighbors = self.net.neighbors_of(cell);
        let mut backup = SmallVec::with_capacity(neighbors.len() + 1);
        backup.push((cell, self.net.domain(cell)));
        for &nb in neighbors {
            backup.push((nb, self.net.domain(nb)));
        }
        backup
    }

    /// Restores every backed-up domain to its exact prior bit pattern and
    /// rolls back the decided-cell bookkeeping for cells that lose their
    /// singleton status.
    fn restore(&mut self, backup: &[(u16, Domain)]) {
        for &(cell, saved) in backup {
            if self.net.domain(cell).is_singleton() && !saved.is_singleton() {
                self.counted.set(cell as usize, false);
                self.density.decrement(cell);
                self.decided.set(cell as usize, false);
            }
            self.net.set_domain(cell, saved);
        }
    }

    fn mark_counted(&mut self, cell: u16) {
        if !self.counted.contains(cell as usize) {
            self.counted.insert(cell as usize);
            self.density.increment(cell);
        }
    }

    /// Registers every cell that became a singleton since the last pass.
    fn register_new_singletons(&mut self, kind: ForcedKind) {
        for cell in 0..self.net.cell_count() {
            let domain = self.net.domain(cell);
            if !domain.is_singleton() {
                continue;
            }
            self.mark_counted(cell);
            if !self.decided.contains(cell as usize) {
                self.decided.insert(cell as usize);
                if let Some(value) = domain.sole_value() {
                    self.register_forced(cell, value, kind);
                }
            }
        }
    }

    fn register_forced(&mut self, cell: u16, value: u8, kind: ForcedKind) {
        let Some(registry) = self.forced.as_mut() else {
            return;
        };
        self.step += 1;
        let pos = pos_of(self.net.size(), cell as usize);
        // Inputs are in range by construction; a rejected record is a no-op.
        let _ = registry.register(pos, value, kind, self.step);
    }

    /// Assigns every value that has a single remaining home in some row,
    /// column or box. Returns the number of assignments made.
    fn assign_hidden_singles(&mut self) -> u32 {
        let n = self.net.size() as usize;
        let k = self.net.box_size() as usize;
        let mut unit: Vec<u16> = Vec::with_capacity(n);
        let mut assigned = 0;

        for u in 0..3 * n {
            unit.clear();
            if u < n {
                unit.extend((0..n).map(|c| (u * n + c) as u16));
            } else if u < 2 * n {
                let c = u - n;
                unit.extend((0..n).map(|r| (r * n + c) as u16));
            } else {
                let b = u - 2 * n;
                let br = (b / k) * k;
                let bc = (b % k) * k;
                unit.extend(
                    (0..k).flat_map(|dr| (0..k).map(move |dc| ((br + dr) * n + bc + dc) as u16)),
                );
            }
            assigned += self.hidden_singles_in_unit(&unit);
        }
        assigned
    }

    fn hidden_singles_in_unit(&mut self, unit: &[u16]) -> u32 {
        let n = self.net.size();
        let mut assigned = 0;
        for value in 1..=n {
            let mut holder = None;
            let mut homes = 0;
            for &cell in unit {
                if self.net.has_value(cell, value) {
                    homes += 1;
                    holder = Some(cell);
                }
            }
            if homes == 1
                && let Some(cell) = holder
                && !self.net.domain(cell).is_singleton()
            {
                self.net.assign(cell, value);
                self.mark_counted(cell);
                self.decided.insert(cell as usize);
                self.register_forced(cell, value, ForcedKind::HiddenSingle);
                assigned += 1;
            }
        }
        assigned
    }
}

//! AC-3 arc-consistency propagation.
//!
//! The only constraint between neighboring cells is inequality, which
//! collapses the textbook revise step: a value in `D(xi)` loses its last
//! support exactly when `D(xj)` is the singleton holding that value.

use crate::network::ConstraintNetwork;
use crate::queue::{ArcQueue, FULL_PASS_CAPACITY, INCREMENTAL_CAPACITY};
use crate::stats::SolveStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    Consistent,
    Inconsistent,
}

/// Revises the arc `(xi, xj)`; true iff a value was removed from `D(xi)`.
pub fn revise(net: &mut ConstraintNetwork, xi: u16, xj: u16) -> bool {
    let Some(v) = net.domain(xj).sole_value() else {
        return false;
    };
    net.remove_value(xi, v)
}

/// Full AC-3 pass: seeds every arc in both directions and drains to a
/// fixed point. Terminates because domains only shrink.
pub fn enforce_consistency(net: &mut ConstraintNetwork, stats: &mut SolveStats) -> Consistency {
    stats.ac3_calls += 1;
    // A contradictory board can arrive with a domain already emptied at
    // network construction; no revision would ever observe it.
    if net.has_empty_domain() {
        return Consistency::Inconsistent;
    }
    let mut queue = ArcQueue::with_capacity(FULL_PASS_CAPACITY);
    for xi in 0..net.cell_count() {
        for &xj in net.neighbors_of(xi) {
            queue.push((xi, xj));
        }
    }
    drain(net, queue, stats)
}

/// Incremental propagation after assigning `cell`: seeds only the arcs
/// pointing at it.
pub fn propagate_from(net: &mut ConstraintNetwork, cell: u16, stats: &mut SolveStats) -> Consistency {
    stats.ac3_calls += 1;
    let mut queue = ArcQueue::with_capacity(INCREMENTAL_CAPACITY);
    for &xi in net.neighbors_of(cell) {
        queue.push((xi, cell));
    }
    drain(net, queue, stats)
}

fn drain(net: &mut ConstraintNetwork, mut queue: ArcQueue, stats: &mut SolveStats) -> Consistency {
    while let Some((xi, xj)) = queue.pop() {
        if revise(net, xi, xj) {
            stats.values_eliminated += 1;
            if net.domain(xi).is_empty() {
                return Consistency::Inconsistent;
            }
            for &xk in net.neighbors_of(xi) {
                if xk != xj {
                    queue.push((xk, xi));
                }
            }
        }
    }
    Consistency::Consistent
}

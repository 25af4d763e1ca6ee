//! Per-box count of decided (singleton-domain) cells.

#[cfg(feature = "tracing")]
use tracing::warn;

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($tt:tt)*) => {};
}

use crate::network::ConstraintNetwork;

/// Incrementally maintained box densities, indexed by
/// `(row / k) * k + col / k`.
#[derive(Debug, Clone)]
pub struct BoxDensity {
    k: u8,
    n: u8,
    counts: Vec<u16>,
}

impl BoxDensity {
    pub fn from_network(net: &ConstraintNetwork) -> Self {
        let k = net.box_size();
        let n = net.size();
        let mut cache = Self {
            k,
            n,
            counts: vec![0; n as usize],
        };
        for cell in 0..net.cell_count() {
            if net.domain(cell).is_singleton() {
                let b = cache.box_of(cell);
                cache.counts[b] += 1;
            }
        }
        cache
    }

    fn box_of(&self, cell: u16) -> usize {
        let n = self.n as usize;
        let k = self.k as usize;
        let r = cell as usize / n;
        let c = cell as usize % n;
        (r / k) * k + c / k
    }

    pub fn get(&self, box_idx: u8) -> u16 {
        self.counts[box_idx as usize]
    }

    pub fn get_for_cell(&self, cell: u16) -> u16 {
        self.counts[self.box_of(cell)]
    }

    pub fn increment(&mut self, cell: u16) {
        let b = self.box_of(cell);
        self.counts[b] += 1;
    }

    /// Clamped at zero: an underflow means the caller's bookkeeping
    /// drifted, which is logged but not fatal.
    pub fn decrement(&mut self, cell: u16) {
        let b = self.box_of(cell);
        if self.counts[b] == 0 {
            warn!(box_idx = b, "density decrement below zero, clamping");
            return;
        }
        self.counts[b] -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sudoku_core::{Board, Pos};

    #[test]
    fn initial_counts_match_singleton_domains() {
        let mut board = Board::new(3).unwrap();
        board.set(Pos::new(0, 0), 1).unwrap();
        board.set(Pos::new(1, 1), 2).unwrap();
        board.set(Pos::new(4, 4), 3).unwrap();
        let net = ConstraintNetwork::from_board(&board);
        let cache = BoxDensity::from_network(&net);

        assert_eq!(cache.get(0), 2);
        assert_eq!(cache.get(4), 1);
        assert_eq!(cache.get(8), 0);
    }

    #[test]
    fn increment_and_decrement_are_inverse() {
        let net = ConstraintNetwork::from_board(&Board::new(2).unwrap());
        let mut cache = BoxDensity::from_network(&net);
        cache.increment(0);
        cache.increment(1);
        assert_eq!(cache.get(0), 2);
        cache.decrement(0);
        cache.decrement(1);
        assert_eq!(cache.get(0), 0);
    }

    #[test]
    fn decrement_clamps_at_zero() {
        let net = ConstraintNetwork::from_board(&Board::new(2).unwrap());
        let mut cache = BoxDensity::from_network(&net);
        cache.decrement(0);
        assert_eq!(cache.get(0), 0);
    }
}

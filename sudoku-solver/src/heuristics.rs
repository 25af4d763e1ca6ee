//! Variable and value ordering for the backtracking search.
//!
//! Cell choice is a composite of minimum-remaining-values, box density
//! and degree (empty neighbors); value choice is least-constraining-value
//! with a uniformly shuffled fallback behind an explicit RNG handle.

use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;

use crate::density::BoxDensity;
use crate::network::ConstraintNetwork;

/// Weights for the combined cell score
/// `candidates * candidates_w - box_density * density_w - empty_neighbors * degree_w`.
/// Lower combined scores are preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicWeights {
    pub candidates: i64,
    pub density: i64,
    pub degree: i64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            candidates: 1000,
            density: 100,
            degree: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellScore {
    pub cell: u16,
    pub candidates: u8,
    pub box_density: u16,
    pub empty_neighbors: u16,
    pub combined: i64,
}

impl CellScore {
    /// Deterministic preference order: combined, then fewer candidates,
    /// then denser box, then row-major position.
    fn beats(&self, other: &Self) -> bool {
        (
            self.combined,
            self.candidates,
            core::cmp::Reverse(self.box_density),
            self.cell,
        ) < (
            other.combined,
            other.candidates,
            core::cmp::Reverse(other.box_density),
            other.cell,
        )
    }
}

/// Scores every undecided cell and returns the minimum, or `None` when no
/// cell has more than one candidate (the caller should have detected
/// completion).
pub fn select_optimal_cell(
    net: &ConstraintNetwork,
    density: &BoxDensity,
    weights: &HeuristicWeights,
) -> Option<CellScore> {
    let mut best: Option<CellScore> = None;

    for cell in 0..net.cell_count() {
        let candidates = net.domain_size(cell);
        if candidates <= 1 {
            continue;
        }
        let empty_neighbors = net
            .neighbors_of(cell)
            .iter()
            .filter(|&&nb| net.domain_size(nb) > 1)
            .count() as u16;
        let box_density = density.get_for_cell(cell);
        let combined = i64::from(candidates) * weights.candidates
            - i64::from(box_density) * weights.density
            - i64::from(empty_neighbors) * weights.degree;
        let score = CellScore {
            cell,
            candidates,
            box_density,
            empty_neighbors,
            combined,
        };
        if best.is_none_or(|b| score.beats(&b)) {
            best = Some(score);
        }
    }
    best
}

/// Least-constraining-value order: candidates sorted by how many
/// neighboring domains still contain them, fewest first; ties break on
/// the value itself to stay deterministic.
pub fn order_values_lcv(net: &ConstraintNetwork, cell: u16) -> SmallVec<[u8; 16]> {
    let mut impacts: SmallVec<[(u16, u8); 16]> = net
        .domain(cell)
        .iter_values()
        .map(|v| {
            let impact = net
                .neighbors_of(cell)
                .iter()
                .filter(|&&nb| net.has_value(nb, v))
                .count() as u16;
            (impact, v)
        })
        .collect();
    impacts.sort_unstable();
    impacts.into_iter().map(|(_, v)| v).collect()
}

/// Fallback value order: the domain as a uniformly shuffled array.
pub fn candidates_shuffled<R: Rng + ?Sized>(
    net: &ConstraintNetwork,
    cell: u16,
    rng: &mut R,
) -> SmallVec<[u8; 16]> {
    let mut values: SmallVec<[u8; 16]> = net.domain(cell).iter_values().collect();
    values.shuffle(rng);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use sudoku_core::{Board, Pos};

    #[test]
    fn mrv_dominates_the_composite_score() {
        let mut board = Board::new(3).unwrap();
        // Narrow (0,0) to two candidates; leave the rest of the board open.
        for (c, v) in [0u8, 1, 2, 3, 4, 5, 6].iter().zip(1u8..=7) {
            board.set(Pos::new(1, *c), v).unwrap();
        }
        let net = ConstraintNetwork::from_board(&board);
        let density = BoxDensity::from_network(&net);

        let score = select_optimal_cell(&net, &density, &HeuristicWeights::default()).unwrap();
        assert_eq!(score.candidates, 2);
    }

    #[test]
    fn ties_break_row_major() {
        let net = ConstraintNetwork::from_board(&Board::new(2).unwrap());
        let density = BoxDensity::from_network(&net);
        // Every cell is identical on an empty board; the scan must settle
        // on the first cell in row-major order.
        let score = select_optimal_cell(&net, &density, &HeuristicWeights::default()).unwrap();
        assert_eq!(score.cell, 0);
    }

    #[test]
    fn solved_network_yields_no_cell() {
        let mut board = Board::new(2).unwrap();
        for (idx, v) in [1u8, 2, 3, 4, 3, 4, 1, 2, 2, 1, 4, 3, 4, 3, 2, 1]
            .into_iter()
            .enumerate()
        {
            board.set(Pos::new((idx / 4) as u8, (idx % 4) as u8), v).unwrap();
        }
        let net = ConstraintNetwork::from_board(&board);
        let density = BoxDensity::from_network(&net);
        assert!(select_optimal_cell(&net, &density, &HeuristicWeights::default()).is_none());
    }

    #[test]
    fn lcv_orders_by_ascending_impact() {
        let mut board = Board::new(2).unwrap();
        // 1 is already placed in the row of cell (1,3) and prunes fewer
        // neighbor domains from there than a fresh value would.
        board.set(Pos::new(0, 0), 1).unwrap();
        let net = ConstraintNetwork::from_board(&board);

        let order = order_values_lcv(&net, 7); // cell (1,3)
        let impact_of = |v: u8| {
            net.neighbors_of(7)
                .iter()
                .filter(|&&nb| net.has_value(nb, v))
                .count()
        };
        for pair in order.windows(2) {
            assert!(impact_of(pair[0]) <= impact_of(pair[1]));
        }
    }

    #[test]
    fn shuffled_candidates_are_a_permutation_of_the_domain() {
        let net = ConstraintNetwork::from_board(&Board::new(3).unwrap());
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
        let mut values = candidates_shuffled(&net, 40, &mut rng);
        values.sort_unstable();
        assert_eq!(values.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }
}

//! Three-phase clue elimination over a solved board.
//!
//! Phase 1 thins every box once, phase 2 iterates a cheap alternatives
//! heuristic to its fixed point, and phase 3 pays for full uniqueness
//! checks while honoring the forced-cells protection policy.

use rand::Rng;
use rand::seq::SliceRandom;
use smallvec::SmallVec;
use sudoku_core::{Board, Pos, count_solutions, is_safe, pos_of};

use crate::GenError;
use crate::config::DifficultyConfig;
use crate::events::{EventSink, GenEventKind};
use crate::shuffle::permutation;

#[cfg(feature = "telemetry-tracing")]
use tracing::trace;

#[cfg(not(feature = "telemetry-tracing"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Cells of box `box_idx` in row-major order within the box.
fn box_cells(board: &Board, box_idx: u8) -> SmallVec<[Pos; 25]> {
    let k = board.box_size();
    let origin = board.box_origin(box_idx);
    (0..k)
        .flat_map(|dr| (0..k).map(move |dc| Pos::new(origin.row + dr, origin.col + dc)))
        .collect()
}

/// Phase 1: balanced removal. Draws a fresh permutation `p` of `1..=N`
/// and, for the i-th box of `order`, blanks the first cell holding
/// `p[i]`. On a solved board every box holds every value, so exactly one
/// cell per box goes and solvability is never at risk.
pub fn phase1_balanced<R: Rng + ?Sized>(
    board: &mut Board,
    order: &[u8],
    rng: &mut R,
    events: &mut EventSink<'_>,
) -> Result<u32, GenError> {
    let n = board.size();
    events.emit(GenEventKind::Phase1Start, board, None);

    let targets = permutation(n as usize, 1, rng);
    let mut removed = 0;
    for (i, &box_idx) in order.iter().take(n as usize).enumerate() {
        let target = targets[i];
        let mut hit = None;
        for pos in box_cells(board, box_idx) {
            if board.get(pos)? == target {
                hit = Some(pos);
                break;
            }
        }
        let Some(pos) = hit else { continue };
        board.set(pos, 0)?;
        removed += 1;
        events.note_removed();
        events.emit(GenEventKind::Phase1CellSelected, board, Some((pos, target)));
    }

    trace!(removed, "eliminate.phase1_done");
    events.emit(GenEventKind::Phase1Complete, board, None);
    Ok(removed)
}

/// True iff `value` could legally sit in some *other* empty cell of the
/// row, column or box of `pos`. The cell is emptied for the duration of
/// the probe and always restored.
pub fn has_alternative(board: &mut Board, pos: Pos, value: u8) -> Result<bool, GenError> {
    let n = board.size();
    board.set(pos, 0)?;

    let mut found = false;
    for c in 0..n {
        let probe = Pos::new(pos.row, c);
        if probe != pos && board.get(probe)? == 0 && is_safe(board, probe, value) {
            found = true;
            break;
        }
    }
    if !found {
        for r in 0..n {
            let probe = Pos::new(r, pos.col);
            if probe != pos && board.get(probe)? == 0 && is_safe(board, probe, value) {
                found = true;
                break;
            }
        }
    }
    if !found {
        for probe in box_cells(board, board.box_index(pos)) {
            if probe != pos && board.get(probe)? == 0 && is_safe(board, probe, value) {
                found = true;
                break;
            }
        }
    }

    board.set(pos, value)?;
    Ok(found)
}

/// One phase-2 round: per box (in `order`), blank the first filled cell
/// whose value has no alternative home. At most one removal per box.
pub fn phase2_round(
    board: &mut Board,
    order: &[u8],
    events: &mut EventSink<'_>,
) -> Result<u32, GenError> {
    let mut removed = 0;
    for &box_idx in order {
        for pos in box_cells(board, box_idx) {
            let value = board.get(pos)?;
            if value == 0 {
                continue;
            }
            if !has_alternative(board, pos, value)? {
                board.set(pos, 0)?;
                removed += 1;
                events.note_removed();
                events.emit(GenEventKind::Phase2CellSelected, board, Some((pos, value)));
                break;
            }
        }
    }
    Ok(removed)
}

/// Phase 2: the smallest fixed point of [`phase2_round`]; rounds repeat
/// until one removes nothing.
pub fn phase2_alternatives(
    board: &mut Board,
    order: &[u8],
    events: &mut EventSink<'_>,
) -> Result<u32, GenError> {
    events.emit(GenEventKind::Phase2Start, board, None);

    let mut total = 0;
    loop {
        let removed = phase2_round(board, order, events)?;
        total += removed;
        if removed == 0 {
            break;
        }
    }

    trace!(total, "eliminate.phase2_done");
    events.emit(GenEventKind::Phase2Complete, board, None);
    Ok(total)
}

struct Candidate {
    pos: Pos,
    value: u8,
    alternatives: u32,
    box_density: u32,
}

/// How many other empty cells of the same row, column or box could
/// legally take this cell's value.
fn alternatives_count(board: &mut Board, pos: Pos, value: u8) -> Result<u32, GenError> {
    let n = board.size();
    board.set(pos, 0)?;

    let mut count = 0;
    for c in 0..n {
        let probe = Pos::new(pos.row, c);
        if probe != pos && board.get(probe)? == 0 && is_safe(board, probe, value) {
            count += 1;
        }
    }
    for r in 0..n {
        let probe = Pos::new(r, pos.col);
        if probe != pos && board.get(probe)? == 0 && is_safe(board, probe, value) {
            count += 1;
        }
    }
    for probe in box_cells(board, board.box_index(pos)) {
        if probe != pos
            && probe.row != pos.row
            && probe.col != pos.col
            && board.get(probe)? == 0
            && is_safe(board, probe, value)
        {
            count += 1;
        }
    }

    board.set(pos, value)?;
    Ok(count)
}

/// Phase 3: uniqueness-verified elimination toward the difficulty
/// envelope's midpoint. Protected cells are kept; every other candidate
/// is blanked and stays blank only while the board still has exactly one
/// completion. Returns the number of removals.
pub fn phase3_unique<R: Rng + ?Sized>(
    board: &mut Board,
    config: &DifficultyConfig,
    already_removed: u32,
    rng: &mut R,
    events: &mut EventSink<'_>,
) -> Result<u32, GenError> {
    events.emit(GenEventKind::Phase3Start, board, None);

    let total = f64::from(board.total_cells());
    let midpoint = (config.min_elimination + config.max_elimination) / 2.0;
    let target = (total * midpoint).round() as i64 - i64::from(already_removed);
    if target <= 0 {
        trace!(already_removed, "eliminate.phase3_nothing_to_do");
        events.emit(GenEventKind::Phase3Complete, board, None);
        return Ok(0);
    }

    // Score once up front; the ordering is frozen before any removal.
    let n = board.size();
    let filled: Vec<Pos> = board
        .cells()
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v != 0)
        .map(|(idx, _)| pos_of(n, idx))
        .collect();

    let mut box_fill = vec![0u32; n as usize];
    for &pos in &filled {
        box_fill[board.box_index(pos) as usize] += 1;
    }

    let mut candidates = Vec::with_capacity(filled.len());
    for pos in filled {
        let value = board.get(pos)?;
        let alternatives = alternatives_count(board, pos, value)?;
        candidates.push(Candidate {
            pos,
            value,
            alternatives,
            box_density: box_fill[board.box_index(pos) as usize],
        });
    }

    if config.prioritize_high_density {
        candidates.sort_by(|a, b| {
            (b.box_density, b.alternatives)
                .cmp(&(a.box_density, a.alternatives))
                .then_with(|| (a.pos.row, a.pos.col).cmp(&(b.pos.row, b.pos.col)))
        });
    } else {
        candidates.shuffle(rng);
    }

    let mut successes: i64 = 0;
    for candidate in candidates {
        if successes >= target {
            break;
        }
        let protected = board
            .forced()
            .is_some_and(|reg| reg.should_protect(candidate.pos, config.difficulty));
        if protected {
            events.emit(
                GenEventKind::Phase3CellKept,
                board,
                Some((candidate.pos, candidate.value)),
            );
            continue;
        }

        board.set(candidate.pos, 0)?;
        if count_solutions(board, 2) == 1 {
            successes += 1;
            events.note_removed();
            events.emit(
                GenEventKind::Phase3CellRemoved,
                board,
                Some((candidate.pos, candidate.value)),
            );
        } else {
            board.set(candidate.pos, candidate.value)?;
            events.emit(
                GenEventKind::Phase3CellKept,
                board,
                Some((candidate.pos, candidate.value)),
            );
        }
    }

    trace!(successes, target, "eliminate.phase3_done");
    events.emit(GenEventKind::Phase3Complete, board, None);
    Ok(successes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shuffle::seeded_rng;
    use sudoku_core::{Difficulty, validate_board};
    use sudoku_solver::complete;

    fn solved(k: u8) -> Board {
        let mut board = Board::new(k).unwrap();
        complete(&mut board).unwrap();
        board
    }

    #[test]
    fn phase1_removes_one_cell_per_box() {
        let mut board = solved(3);
        let order: Vec<u8> = (0..9).collect();
        let mut rng = seeded_rng(11);
        let mut events = EventSink::disabled();

        let removed = phase1_balanced(&mut board, &order, &mut rng, &mut events).unwrap();
        assert_eq!(removed, 9);
        assert_eq!(board.clues(), 72);

        for box_idx in 0..9u8 {
            let empty_in_box = box_cells(&board, box_idx)
                .into_iter()
                .filter(|&p| board.get(p).unwrap() == 0)
                .count();
            assert_eq!(empty_in_box, 1, "box {box_idx} should lose exactly one cell");
        }
        assert!(validate_board(&board));
    }

    #[test]
    fn has_alternative_restores_the_probed_cell() {
        let mut board = solved(2);
        let pos = Pos::new(1, 2);
        let value = board.get(pos).unwrap();
        let before = board.cells().to_vec();

        let _ = has_alternative(&mut board, pos, value).unwrap();
        assert_eq!(board.cells(), before.as_slice());
    }

    #[test]
    fn fully_solved_cells_have_no_alternative() {
        // On a complete board every other unit cell is filled, so no
        // empty alternative spot can exist.
        let mut board = solved(2);
        for idx in 0..16usize {
            let pos = pos_of(4, idx);
            let value = board.get(pos).unwrap();
            assert!(!has_alternative(&mut board, pos, value).unwrap());
        }
    }

    #[test]
    fn phase2_reaches_a_fixed_point_and_only_grows_the_holes() {
        let mut board = solved(3);
        let order: Vec<u8> = (0..9).collect();
        let mut rng = seeded_rng(5);
        let mut events = EventSink::disabled();
        phase1_balanced(&mut board, &order, &mut rng, &mut events).unwrap();

        let after_phase1 = board.empty_cells();
        let removed = phase2_alternatives(&mut board, &order, &mut events).unwrap();
        assert_eq!(board.empty_cells(), after_phase1 + removed as u16);

        // The fixed point really is one: another round removes nothing.
        assert_eq!(phase2_round(&mut board, &order, &mut events).unwrap(), 0);
        assert!(validate_board(&board));
    }

    #[test]
    fn phase3_with_no_remaining_target_removes_nothing() {
        let mut board = solved(3);
        let config = DifficultyConfig::for_difficulty(Difficulty::Easy);
        let mut rng = seeded_rng(2);
        let mut events = EventSink::disabled();

        let removed = phase3_unique(&mut board, &config, 81, &mut rng, &mut events).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(board.clues(), 81);
    }

    #[test]
    fn phase3_ordering_is_governed_by_density_priority_alone() {
        // A caller-built config that turns density scoring off must not
        // change the walk order while prioritize_high_density is set.
        let mut reference = solved(3);
        let mut tweaked = reference.clone();
        let order: Vec<u8> = (0..9).collect();
        let mut events = EventSink::disabled();

        let mut rng = seeded_rng(17);
        phase1_balanced(&mut reference, &order, &mut rng, &mut events).unwrap();
        phase2_alternatives(&mut reference, &order, &mut events).unwrap();
        let mut rng = seeded_rng(17);
        phase1_balanced(&mut tweaked, &order, &mut rng, &mut events).unwrap();
        phase2_alternatives(&mut tweaked, &order, &mut events).unwrap();

        let config = DifficultyConfig::for_difficulty(Difficulty::Easy);
        let mut no_scoring = config;
        no_scoring.use_density_scoring = false;

        let mut rng = seeded_rng(29);
        let a = phase3_unique(&mut reference, &config, 0, &mut rng, &mut events).unwrap();
        let mut rng = seeded_rng(29);
        let b = phase3_unique(&mut tweaked, &no_scoring, 0, &mut rng, &mut events).unwrap();

        assert_eq!(a, b);
        assert_eq!(reference.cells(), tweaked.cells());
    }

    #[test]
    fn phase3_keeps_the_board_unique() {
        let mut board = solved(3);
        let order: Vec<u8> = (0..9).collect();
        let mut rng = seeded_rng(23);
        let mut events = EventSink::disabled();

        let r1 = phase1_balanced(&mut board, &order, &mut rng, &mut events).unwrap();
        let r2 = phase2_alternatives(&mut board, &order, &mut events).unwrap();
        let config = DifficultyConfig::for_difficulty(Difficulty::Medium);
        phase3_unique(&mut board, &config, r1 + r2, &mut rng, &mut events).unwrap();

        assert!(validate_board(&board));
        assert_eq!(count_solutions(&mut board, 2), 1);
    }
}

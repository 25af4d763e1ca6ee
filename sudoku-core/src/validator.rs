//! Row/column/box legality and the bounded solution counter.

use crate::board::{Board, Pos, pos_of};

/// True iff `value` can legally sit at `pos`: it must not already appear
/// in the row, the column, or the box. The probed cell itself is treated
/// as empty, so callers may test a replacement value for a filled cell.
pub fn is_safe(board: &Board, pos: Pos, value: u8) -> bool {
    let n = board.size() as usize;
    let k = board.box_size() as usize;
    let (r, c) = (pos.row as usize, pos.col as usize);
    if r >= n || c >= n || value == 0 || value as usize > n {
        return false;
    }

    let cells = board.cells();
    for i in 0..n {
        if i != c && cells[r * n + i] == value {
            return false;
        }
        if i != r && cells[i * n + c] == value {
            return false;
        }
    }

    let br = (r / k) * k;
    let bc = (c / k) * k;
    for rr in br..br + k {
        for cc in bc..bc + k {
            if (rr != r || cc != c) && cells[rr * n + cc] == value {
                return false;
            }
        }
    }
    true
}

/// First empty cell in row-major order.
pub fn find_first_empty(board: &Board) -> Option<Pos> {
    board
        .cells()
        .iter()
        .position(|&v| v == 0)
        .map(|idx| pos_of(board.size(), idx))
}

/// Every filled cell is consistent with its row, column and box.
pub fn validate_board(board: &Board) -> bool {
    let n = board.size();
    for idx in 0..board.cells().len() {
        let v = board.cells()[idx];
        if v != 0 && !is_safe(board, pos_of(n, idx), v) {
            return false;
        }
    }
    true
}

/// Counts completions of the current partial board, stopping as soon as
/// `limit` is reached. Returns `min(limit, true count)`.
///
/// The board is restored to its input state on return; `limit = 2` is the
/// uniqueness check (`== 1` means exactly one completion exists).
pub fn count_solutions(board: &mut Board, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let mut count = 0;
    count_rec(board, limit, &mut count);
    count
}

fn count_rec(board: &mut Board, limit: u32, count: &mut u32) {
    if *count >= limit {
        return;
    }
    let Some(pos) = find_first_empty(board) else {
        *count += 1;
        return;
    };

    let n = board.size();
    let idx = (pos.row as usize) * (n as usize) + pos.col as usize;
    for value in 1..=n {
        if is_safe(board, pos, value) {
            board.store(idx, value);
            count_rec(board, limit, count);
            board.store(idx, 0);
            if *count >= limit {
                return;
            }
        }
    }
}

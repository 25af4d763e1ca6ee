//! Explicit constraint network over a Sudoku board.
//!
//! One `Domain` per cell plus a neighbor map built once at construction.
//! Neighbors of a cell are every other cell sharing its row, column or
//! box; the lists are symmetric by construction. A network is owned by a
//! single solver invocation and never shared.

use sudoku_core::{Board, Domain, Pos};

/// Precomputed neighbor lists in CSR layout: `flat[offsets[c]..offsets[c+1]]`
/// holds the neighbors of cell `c` in row, column, box order.
#[derive(Debug, Clone)]
struct NeighborMap {
    offsets: Vec<u32>,
    flat: Vec<u16>,
}

impl NeighborMap {
    fn build(k: u8) -> Self {
        let n = (k as usize) * (k as usize);
        let total = n * n;
        // Row and column contribute n-1 cells each, the box adds the
        // (k-1)^2 cells outside the cell's own row and column.
        let per_cell = 2 * (n - 1) + (k as usize - 1) * (k as usize - 1);

        let mut offsets = Vec::with_capacity(total + 1);
        let mut flat = Vec::with_capacity(total * per_cell);
        offsets.push(0u32);

        for idx in 0..total {
            let r = idx / n;
            let c = idx % n;
            for cc in 0..n {
                if cc != c {
                    flat.push((r * n + cc) as u16);
                }
            }
            for rr in 0..n {
                if rr != r {
                    flat.push((rr * n + c) as u16);
                }
            }
            let br = (r / k as usize) * k as usize;
            let bc = (c / k as usize) * k as usize;
            for rr in br..br + k as usize {
                for cc in bc..bc + k as usize {
                    if rr != r && cc != c {
                        flat.push((rr * n + cc) as u16);
                    }
                }
            }
            offsets.push(flat.len() as u32);
        }

        Self { offsets, flat }
    }

    fn of(&self, cell: u16) -> &[u16] {
        let lo = self.offsets[cell as usize] as usize;
        let hi = self.offsets[cell as usize + 1] as usize;
        &self.flat[lo..hi]
    }
}

#[derive(Debug, Clone)]
pub struct ConstraintNetwork {
    k: u8,
    n: u8,
    domains: Vec<Domain>,
    neighbors: NeighborMap,
}

impl ConstraintNetwork {
    /// Builds a network mirroring `board`: filled cells get singleton
    /// domains and prune their value from every neighbor; empty cells
    /// start full and are narrowed by their fixed neighbors.
    ///
    /// A contradictory board (duplicate in a unit) yields an empty domain
    /// here rather than an error; `enforce_consistency` reports it.
    pub fn from_board(board: &Board) -> Self {
        let k = board.box_size();
        let n = board.size();
        let total = (n as usize) * (n as usize);

        let mut net = Self {
            k,
            n,
            domains: vec![Domain::full(n); total],
            neighbors: NeighborMap::build(k),
        };

        let cells = board.cells();
        for (idx, &v) in cells.iter().enumerate() {
            if v != 0 {
                net.domains[idx] = Domain::singleton(v);
            }
        }
        let Self {
            domains, neighbors, ..
        } = &mut net;
        for (idx, &v) in cells.iter().enumerate() {
            if v != 0 {
                for &nb in neighbors.of(idx as u16) {
                    let _ = domains[nb as usize].remove(v);
                }
            }
        }
        net
    }

    pub fn box_size(&self) -> u8 {
        self.k
    }

    pub fn size(&self) -> u8 {
        self.n
    }

    pub fn cell_count(&self) -> u16 {
        (self.n as u16) * (self.n as u16)
    }

    /// Cheap copy of the cell's domain (32 bits plus cached count).
    pub fn domain(&self, cell: u16) -> Domain {
        self.domains[cell as usize]
    }

    pub fn domain_size(&self, cell: u16) -> u8 {
        self.domains[cell as usize].len()
    }

    pub fn has_value(&self, cell: u16, value: u8) -> bool {
        self.domains[cell as usize].contains(value)
    }

    /// Removes `value` from the cell's domain; true if the bit was set.
    pub fn remove_value(&mut self, cell: u16, value: u8) -> bool {
        self.domains[cell as usize].remove(value)
    }

    /// Collapses the cell's domain to `{value}`. The value must still be
    /// in the domain.
    pub fn assign(&mut self, cell: u16, value: u8) {
        debug_assert!(self.domains[cell as usize].contains(value));
        self.domains[cell as usize] = Domain::singleton(value);
    }

    /// Resets the cell's domain to the full candidate set.
    pub fn restore_full(&mut self, cell: u16) {
        self.domains[cell as usize] = Domain::full(self.n);
    }

    /// Overwrites a domain from a snapshot (bit-for-bit restoration).
    pub fn set_domain(&mut self, cell: u16, domain: Domain) {
        self.domains[cell as usize] = domain;
    }

    pub fn neighbors_of(&self, cell: u16) -> &[u16] {
        self.neighbors.of(cell)
    }

    pub fn is_solved(&self) -> bool {
        self.domains.iter().all(Domain::is_singleton)
    }

    pub fn has_empty_domain(&self) -> bool {
        self.domains.iter().any(Domain::is_empty)
    }

    pub fn pos(&self, cell: u16) -> Pos {
        sudoku_core::pos_of(self.n, cell as usize)
    }
}

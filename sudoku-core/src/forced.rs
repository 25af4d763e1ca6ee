//! Provenance registry for cells decided during CSP completion.
//!
//! The completion engine records *why* each cell got its value; the
//! elimination pipeline consults that record to decide which clues a given
//! difficulty level must keep.

use fixedbitset::FixedBitSet;

use crate::board::{Pos, cell_index};
use crate::difficulty::Difficulty;
use crate::error::CoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a cell's value was derived. Ordered from cheapest deduction to a
/// value settled only after backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ForcedKind {
    NakedSingle,
    HiddenSingle,
    Propagated,
    Backtracked,
}

impl ForcedKind {
    fn base_score(self) -> u8 {
        match self {
            Self::NakedSingle => 1,
            Self::HiddenSingle => 3,
            Self::Propagated => 6,
            Self::Backtracked => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedCell {
    pub pos: Pos,
    pub value: u8,
    pub kind: ForcedKind,
    pub step: u32,
    /// Derived difficulty contribution in 1..=10.
    pub score: u8,
}

fn difficulty_score(kind: ForcedKind, step: u32) -> u8 {
    let bonus = (step / 20).min(3) as u8;
    (kind.base_score() + bonus).clamp(1, 10)
}

/// Bounded registry of forced cells: a bitmap for fast-negative lookup
/// plus a dense record array. Registration is idempotent per position.
#[derive(Debug, Clone)]
pub struct ForcedCells {
    n: u8,
    occupied: FixedBitSet,
    records: Vec<ForcedCell>,
}

impl ForcedCells {
    pub fn new(n: u8) -> Self {
        let total = (n as usize) * (n as usize);
        Self {
            n,
            occupied: FixedBitSet::with_capacity(total),
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records `pos` as forced, updating the existing record in place if
    /// the position was already registered.
    pub fn register(
        &mut self,
        pos: Pos,
        value: u8,
        kind: ForcedKind,
        step: u32,
    ) -> Result<(), CoreError> {
        let idx = cell_index(self.n, pos)?;
        if value == 0 || value > self.n {
            return Err(CoreError::ValueOutOfRange {
                n: self.n,
                value,
            });
        }

        let record = ForcedCell {
            pos,
            value,
            kind,
            step,
            score: difficulty_score(kind, step),
        };
        if self.occupied.contains(idx) {
            if let Some(slot) = self.records.iter_mut().find(|r| r.pos == pos) {
                *slot = record;
            }
        } else {
            self.occupied.insert(idx);
            self.records.push(record);
        }
        Ok(())
    }

    pub fn is_registered(&self, pos: Pos) -> bool {
        match cell_index(self.n, pos) {
            Ok(idx) => self.occupied.contains(idx),
            Err(_) => false,
        }
    }

    pub fn get(&self, pos: Pos) -> Option<&ForcedCell> {
        if !self.is_registered(pos) {
            return None;
        }
        self.records.iter().find(|r| r.pos == pos)
    }

    pub fn kind_of(&self, pos: Pos) -> Option<ForcedKind> {
        self.get(pos).map(|r| r.kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ForcedCell> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.occupied.clear();
        self.records.clear();
    }

    /// Whether elimination at `difficulty` must keep this cell as a clue.
    /// Unregistered positions are never protected.
    pub fn should_protect(&self, pos: Pos, difficulty: Difficulty) -> bool {
        let Some(kind) = self.kind_of(pos) else {
            return false;
        };
        match difficulty {
            Difficulty::Easy => kind >= ForcedKind::Propagated,
            Difficulty::Medium | Difficulty::Unknown => kind >= ForcedKind::HiddenSingle,
            Difficulty::Hard => true,
            Difficulty::Expert => kind != ForcedKind::Backtracked,
        }
    }
}

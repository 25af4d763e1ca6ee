//! Typed progress events for generation.
//!
//! Events are purely informational: they are delivered synchronously, in
//! the order produced, to at most one observer whose borrow is scoped to
//! the generation call. Observers see the board through a shared
//! reference and can never steer control flow.

use sudoku_core::{Board, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenEventKind {
    GenerationStart,
    GenerationComplete,
    Phase1Start,
    Phase1CellSelected,
    Phase1Complete,
    Phase2Start,
    Phase2CellSelected,
    Phase2Complete,
    Phase3Start,
    Phase3CellRemoved,
    Phase3CellKept,
    Phase3Complete,
}

impl GenEventKind {
    /// Pipeline stage: 0 outside the elimination phases, 1..=3 within.
    pub fn phase(self) -> u8 {
        match self {
            Self::GenerationStart | Self::GenerationComplete => 0,
            Self::Phase1Start | Self::Phase1CellSelected | Self::Phase1Complete => 1,
            Self::Phase2Start | Self::Phase2CellSelected | Self::Phase2Complete => 2,
            Self::Phase3Start
            | Self::Phase3CellRemoved
            | Self::Phase3CellKept
            | Self::Phase3Complete => 3,
        }
    }
}

#[derive(Debug)]
pub struct GenEvent<'a> {
    pub kind: GenEventKind,
    pub board: &'a Board,
    pub phase: u8,
    /// Cells removed so far across the whole pipeline.
    pub cells_removed: u32,
    /// The affected cell and its value, for per-cell events.
    pub cell: Option<(Pos, u8)>,
}

pub trait GenObserver {
    fn on_event(&mut self, event: &GenEvent<'_>);
}

/// Fans events out to the (optional) observer and tracks the running
/// removed-cell total the events carry.
pub struct EventSink<'a> {
    observer: Option<&'a mut dyn GenObserver>,
    removed_total: u32,
}

impl<'a> EventSink<'a> {
    pub fn new(observer: Option<&'a mut dyn GenObserver>) -> Self {
        Self {
            observer,
            removed_total: 0,
        }
    }

    /// A sink nobody listens to; emission becomes a no-op.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn removed_total(&self) -> u32 {
        self.removed_total
    }

    pub(crate) fn note_removed(&mut self) {
        self.removed_total += 1;
    }

    pub(crate) fn emit(&mut self, kind: GenEventKind, board: &Board, cell: Option<(Pos, u8)>) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&GenEvent {
                kind,
                board,
                phase: kind.phase(),
                cells_removed: self.removed_total,
                cell,
            });
        }
    }
}

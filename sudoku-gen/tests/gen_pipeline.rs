//! End-to-end generation properties across difficulties.

use sudoku_core::{Board, Difficulty, ForcedKind, Pos, count_solutions, validate_board};
use sudoku_gen::{GenEvent, GenEventKind, GenObserver, generate, generate_ex, GenerateConfig};

#[derive(Default)]
struct Recorder {
    kinds: Vec<GenEventKind>,
    phase3_removed: Vec<(Pos, u8)>,
    last_removed_total: u32,
}

impl GenObserver for Recorder {
    fn on_event(&mut self, event: &GenEvent<'_>) {
        self.kinds.push(event.kind);
        self.last_removed_total = event.cells_removed;
        if event.kind == GenEventKind::Phase3CellRemoved
            && let Some(cell) = event.cell
        {
            self.phase3_removed.push(cell);
        }
    }
}

#[test]
fn every_difficulty_yields_a_valid_unique_puzzle() {
    for (difficulty, seed) in [
        (Difficulty::Easy, 1u64),
        (Difficulty::Medium, 2),
        (Difficulty::Hard, 3),
        (Difficulty::Expert, 4),
    ] {
        let mut board = Board::new(3).unwrap();
        let report = generate(&mut board, difficulty, seed).unwrap();

        assert!(validate_board(&board), "{difficulty}: board must stay valid");
        assert_eq!(
            count_solutions(&mut board, 2),
            1,
            "{difficulty}: puzzle must have exactly one completion"
        );
        assert!(report.clues > 0);
        assert_eq!(report.clues, board.clues());
    }
}

#[test]
fn four_by_four_generation_works_too() {
    let mut board = Board::new(2).unwrap();
    generate(&mut board, Difficulty::Easy, 99).unwrap();
    assert!(validate_board(&board));
    assert_eq!(count_solutions(&mut board, 2), 1);
}

#[test]
fn events_bracket_the_pipeline_in_order() {
    let mut board = Board::new(3).unwrap();
    let mut recorder = Recorder::default();
    let config = GenerateConfig::new(Difficulty::Medium, 21);
    let report = generate_ex(&mut board, &config, Some(&mut recorder)).unwrap();

    assert_eq!(recorder.kinds.first(), Some(&GenEventKind::GenerationStart));
    assert_eq!(recorder.kinds.last(), Some(&GenEventKind::GenerationComplete));

    let position = |kind: GenEventKind| {
        recorder
            .kinds
            .iter()
            .position(|&k| k == kind)
            .unwrap_or_else(|| panic!("missing event {kind:?}"))
    };
    assert!(position(GenEventKind::Phase1Start) < position(GenEventKind::Phase1Complete));
    assert!(position(GenEventKind::Phase1Complete) < position(GenEventKind::Phase2Start));
    assert!(position(GenEventKind::Phase2Complete) < position(GenEventKind::Phase3Start));
    assert!(position(GenEventKind::Phase3Start) < position(GenEventKind::Phase3Complete));

    // The running total on the final event matches the report.
    assert_eq!(recorder.last_removed_total, report.removed);
}

#[test]
fn easy_phase3_never_removes_protected_cells() {
    let mut board = Board::new(3).unwrap();
    let mut recorder = Recorder::default();
    let config = GenerateConfig::new(Difficulty::Easy, 8);
    generate_ex(&mut board, &config, Some(&mut recorder)).unwrap();

    let registry = board.forced().expect("generation attaches a registry");
    for (pos, _) in recorder.phase3_removed {
        if let Some(kind) = registry.kind_of(pos) {
            assert!(
                kind < ForcedKind::Propagated,
                "easy elimination removed a {kind:?} cell at {pos}"
            );
        }
    }
}

#[test]
fn expert_strips_more_cells_than_easy_from_the_same_grid() {
    let mut easy = Board::new(3).unwrap();
    let easy_report = generate(&mut easy, Difficulty::Easy, 31).unwrap();

    // The same seed reproduces the same solved grid before elimination.
    let mut expert = Board::new(3).unwrap();
    let expert_report = generate(&mut expert, Difficulty::Expert, 31).unwrap();

    assert!(
        expert_report.removed > easy_report.removed,
        "expert ({}) should remove more than easy ({})",
        expert_report.removed,
        easy_report.removed
    );
    assert_eq!(count_solutions(&mut easy, 2), 1);
    assert_eq!(count_solutions(&mut expert, 2), 1);
}

#[test]
fn failed_generation_is_an_error_not_a_panic() {
    let mut board = Board::new(3).unwrap();
    let mut config = GenerateConfig::new(Difficulty::Medium, 12);
    config.difficulty.min_elimination = 0.9;
    config.difficulty.max_elimination = 0.5;
    assert!(generate_ex(&mut board, &config, None).is_err());
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Core(#[from] sudoku_core::CoreError),

    #[error("search exhausted every candidate without completing the board")]
    Unsolvable,

    #[error("search hit its depth limit before completing the board")]
    DepthExhausted,

    #[error("search timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
}

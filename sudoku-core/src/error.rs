use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("box size k={0} not supported (expected 2..=5)")]
    InvalidBoxSize(u8),

    #[error("cell ({row},{col}) out of range for N={n}")]
    CellOutOfRange { n: u8, row: u8, col: u8 },

    #[error("value {value} out of range for N={n}")]
    ValueOutOfRange { n: u8, value: u8 },
}

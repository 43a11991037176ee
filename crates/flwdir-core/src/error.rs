//! Error types for flwdir.
//!
//! Per-cell problems (bad codes, cycles, flow off the grid) are never errors:
//! they are reported through [`crate::validate::CellStatus`]. Only input that
//! cannot be analysed at all ends up here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("grid size mismatch: {rows} x {cols} grid given {len} codes")]
    SizeMismatch { rows: usize, cols: usize, len: usize },

    #[error("grid of {size} cells exceeds the rankable maximum of {} cells", i32::MAX)]
    GridTooLarge { size: usize },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

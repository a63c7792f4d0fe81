use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CcdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file: {0}")]
    InvalidFits(String),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Empty frame sequence")]
    EmptyInput,

    #[error("Shape mismatch: expected {expected_height}x{expected_width}, got {height}x{width}")]
    ShapeMismatch {
        expected_height: usize,
        expected_width: usize,
        height: usize,
        width: usize,
    },

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Cannot reshape {pixels} pixels to {target_height}x{target_width}")]
    Reshape {
        pixels: usize,
        target_height: usize,
        target_width: usize,
    },
}

pub type Result<T> = std::result::Result<T, CcdError>;

//! Error types for sheetgen-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetgen-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(usize, usize),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(usize, usize),

    /// Invalid named range
    #[error("Invalid named range: {0}")]
    InvalidName(String),

    /// Duplicate named range
    #[error("Named range already exists: {0}")]
    DuplicateName(String),

    /// Reference to a range that is not defined
    #[error("Unknown range: {0}")]
    UnknownRange(String),
}

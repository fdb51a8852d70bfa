//! Error types for sheetgen

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a project
#[derive(Debug, Error)]
pub enum Error {
    /// Project file could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Project file is not valid JSON of the expected shape
    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),

    /// A data file could not be loaded
    #[error(transparent)]
    Csv(#[from] sheetgen_csv::CsvError),

    /// A range or named range in the project is invalid
    #[error(transparent)]
    Core(#[from] sheetgen_core::Error),

    /// `preset_template` names no built-in preset
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

//! Prelude module - common imports for sheetgen users
//!
//! ```rust
//! use sheetgen::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellValue,
    // I/O types
    CsvReadOptions,
    CsvReader,

    // Tables
    DataSource,
    DataTable,

    // Diagnostics
    Diagnostic,
    DiagnosticKind,
    Diagnostics,

    Direction,
    // Error types
    Error,
    Generated,
    // Engine
    GenerationRequest,
    Layout,
    // Projects
    Project,
    ProjectConfig,

    RangeCatalog,
    // Ranges
    RangeSpec,
    Result,
    SelectedRange,
    TableSet,
};

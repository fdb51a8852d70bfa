//! # sheetgen
//!
//! Generate source code from tabular data.
//!
//! A template is ordinary source text with `{{MARKER}}` placeholders. Loop
//! markers repeat their body once per row or column of a selected range,
//! once per data file, or once per selected range; scalar markers are
//! replaced by cell values and range metadata. Typical output is a C array
//! initializer or a table of assignment statements.
//!
//! ## Features
//!
//! - Row-major or column-major walks (`{{DIRECTION:COLUMN}}`)
//! - Several data files (`FILES_LOOP`) and several ranges (`RANGES_LOOP`)
//! - Named ranges and single-cell lookups (`RANGE[name]_VALUE[r,c]`)
//! - Trailing-comma handling suited to array literals
//! - Built-in preset templates
//! - Project files compatible with the desktop tool
//!
//! Expansion never fails: problems are returned as diagnostics next to the
//! generated text.
//!
//! ## Example
//!
//! ```rust
//! use sheetgen::prelude::*;
//!
//! let mut tables = TableSet::new();
//! tables.insert(
//!     "weights.csv",
//!     DataTable::from_rows(vec![
//!         vec![CellValue::from(1), CellValue::from(2)],
//!         vec![CellValue::from(3), CellValue::from(4)],
//!     ]),
//! );
//!
//! let mut config = ProjectConfig::default();
//! config.selected_ranges.push(SelectedRange::from(&RangeSpec::parse("A1:B2").unwrap()));
//! config.set_code_template("int w[] = { {{LOOP_START}}{{ALL_COLUMNS}}{{LOOP_END}} };");
//!
//! let project = Project::from_tables(config, tables).unwrap();
//! let generated = project.generate().unwrap();
//! assert_eq!(generated.text, "int w[] = { 1, 2,3, 4, };");
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod project;

pub use config::{ProjectConfig, SelectedRange, TemplateType};
pub use error::{Error, Result};
pub use project::Project;

// Re-export core types
pub use sheetgen_core::{
    CellAddress,
    // Cell types
    CellValue,
    DataSource,
    // Tables
    DataTable,
    NamedRangeRegistry,
    RangeCatalog,
    // Ranges
    RangeSpec,
    TableSet,

    MAX_COLS,
    // Constants
    MAX_ROWS,
};

// Re-export engine types
pub use sheetgen_template::{
    format_value, generate, presets, scan, try_format_value, validate, Diagnostic, DiagnosticKind,
    Diagnostics, Direction, ExpandError, Generated, GenerationRequest, Layout, Location, Preset,
    Severity, Validation,
};

// Re-export I/O types
pub use sheetgen_csv::{CsvError, CsvReadOptions, CsvReader};

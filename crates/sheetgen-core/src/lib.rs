//! # sheetgen-core
//!
//! Core data structures for the sheetgen code generator.
//!
//! This crate provides the fundamental types the template engine consumes:
//! - [`CellValue`] - A cell value (number, text or empty)
//! - [`DataTable`] - An immutable rectangular grid of values for one file
//! - [`DataSource`] - Lookup of tables by file identifier
//! - [`CellAddress`] and [`RangeSpec`] - A1 addressing and rectangular ranges
//! - [`NamedRangeRegistry`] and [`RangeCatalog`] - Named and ordered range lists
//!
//! ## Example
//!
//! ```rust
//! use sheetgen_core::{CellValue, DataTable, RangeSpec};
//!
//! let table = DataTable::from_rows(vec![
//!     vec![CellValue::from(1), CellValue::from(2)],
//!     vec![CellValue::from(3), CellValue::from(4)],
//! ]);
//!
//! let range = RangeSpec::parse("A1:B2").unwrap();
//! assert_eq!(range.row_count(), 2);
//! assert_eq!(table.get(1, 0), Some(&CellValue::Number(3.0)));
//! ```

pub mod cell;
pub mod error;
pub mod named_range;
pub mod range;
pub mod table;

// Re-exports for convenience
pub use cell::{CellAddress, CellValue};
pub use error::{Error, Result};
pub use named_range::NamedRangeRegistry;
pub use range::{RangeCatalog, RangeSpec};
pub use table::{DataSource, DataTable, TableSet};

/// Maximum number of rows addressable in A1 notation (Excel limit)
pub const MAX_ROWS: usize = 1_048_576;

/// Maximum number of columns addressable in A1 notation (Excel limit)
pub const MAX_COLS: usize = 16_384;

//! # sheetgen-csv
//!
//! CSV loader for sheetgen. Reads delimited text into
//! [`DataTable`](sheetgen_core::DataTable)s addressed exactly like a
//! spreadsheet: the first record is row 1 (`A1`) unless a header is
//! declared.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;

//! In-memory tables and the data source seam
//!
//! A [`DataTable`] is the fully materialized content of one file: an
//! immutable rectangular grid addressed by zero-based `(row, col)`. Loading
//! happens elsewhere; the engine only sees tables through [`DataSource`].

use ahash::AHashMap;

use crate::cell::CellValue;
use crate::range::RangeSpec;

/// An immutable 2-D grid of cell values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl DataTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows
    ///
    /// Ragged input is padded with [`CellValue::Empty`] so that every row has
    /// the width of the longest one.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self { rows, width }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn col_count(&self) -> usize {
        self.width
    }

    /// Check if the table has no cells
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    /// Get a cell value, or `None` outside the table's bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a whole row
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// A range covering every cell of the table, if it has any
    pub fn full_range(&self) -> Option<RangeSpec> {
        if self.is_empty() {
            return None;
        }
        RangeSpec::from_indices(0, 0, self.row_count() - 1, self.col_count() - 1).ok()
    }
}

/// Source of materialized tables, keyed by file identifier
pub trait DataSource {
    /// The table loaded for `file`, if any
    fn table(&self, file: &str) -> Option<&DataTable>;
}

impl DataSource for std::collections::HashMap<String, DataTable> {
    fn table(&self, file: &str) -> Option<&DataTable> {
        self.get(file)
    }
}

impl DataSource for std::collections::BTreeMap<String, DataTable> {
    fn table(&self, file: &str) -> Option<&DataTable> {
        self.get(file)
    }
}

/// An ordered set of loaded files and their tables
///
/// The insertion order is the file order used by `FILES_LOOP`.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    files: Vec<String>,
    tables: AHashMap<String, DataTable>,
}

impl TableSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file's table
    ///
    /// A file added again is listed again, so `FILES_LOOP` visits it once per
    /// insertion. Its table is replaced by the newest one.
    pub fn insert(&mut self, file: impl Into<String>, table: DataTable) {
        let file = file.into();
        self.files.push(file.clone());
        self.tables.insert(file, table);
    }

    /// Check if a table is stored for `file`
    pub fn contains(&self, file: &str) -> bool {
        self.tables.contains_key(file)
    }

    /// File identifiers in insertion order, repeats included
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if no files were added
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DataSource for TableSet {
    fn table(&self, file: &str) -> Option<&DataTable> {
        self.tables.get(file)
    }
}

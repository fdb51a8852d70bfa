//! Rectangular ranges and the range catalog
//!
//! A [`RangeSpec`] is a zero-based, inclusive rectangle that remembers the
//! A1 notation it was created from. A [`RangeCatalog`] holds the ordered list
//! of explicitly selected ranges together with the named range registry, and
//! resolves template references against both.

use std::fmt;
use std::str::FromStr;

use crate::cell::CellAddress;
use crate::error::{Error, Result};
use crate::named_range::NamedRangeRegistry;

/// A rectangular range of cells (e.g., "A1:G10")
///
/// Invariant: `start_row <= end_row` and `start_col <= end_col`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RangeFields"))]
pub struct RangeSpec {
    /// First row (0-based, inclusive)
    pub start_row: usize,
    /// First column (0-based, inclusive)
    pub start_col: usize,
    /// Last row (0-based, inclusive)
    pub end_row: usize,
    /// Last column (0-based, inclusive)
    pub end_col: usize,
    /// Original notation, kept for display and re-serialization
    pub label: String,
}

impl RangeSpec {
    /// Create a range from zero-based corner indices
    ///
    /// Fails if the corners are not ordered top-left to bottom-right.
    pub fn new(
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
        label: impl Into<String>,
    ) -> Result<Self> {
        let range = Self {
            start_row,
            start_col,
            end_row,
            end_col,
            label: label.into(),
        };
        range.check()?;
        Ok(range)
    }

    /// Check that the corners are ordered top-left to bottom-right
    ///
    /// The fields are public, so a range built by hand may break this.
    pub fn check(&self) -> Result<()> {
        if self.start_row > self.end_row || self.start_col > self.end_col {
            return Err(Error::InvalidRange(format!(
                "start ({}, {}) is after end ({}, {}) in '{}'",
                self.start_row, self.start_col, self.end_row, self.end_col, self.label
            )));
        }
        Ok(())
    }

    /// Create a range from indices, deriving the label from A1 notation
    pub fn from_indices(
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Result<Self> {
        let label = format!(
            "{}:{}",
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col)
        );
        Self::new(start_row, start_col, end_row, end_col, label)
    }

    /// Parse a range from `START:END` notation
    ///
    /// # Examples
    /// ```
    /// use sheetgen_core::RangeSpec;
    ///
    /// let range = RangeSpec::parse("B2:D4").unwrap();
    /// assert_eq!((range.start_row, range.start_col), (1, 1));
    /// assert_eq!((range.end_row, range.end_col), (3, 3));
    /// assert_eq!(range.label, "B2:D4");
    ///
    /// assert!(RangeSpec::parse("B2").is_err());
    /// assert!(RangeSpec::parse("D4:B2").is_err());
    /// ```
    pub fn parse(notation: &str) -> Result<Self> {
        let notation = notation.trim();

        let (start, end) = notation.split_once(':').ok_or_else(|| {
            Error::InvalidRange(format!("'{}' is not of the form START:END", notation))
        })?;
        if end.contains(':') {
            return Err(Error::InvalidRange(format!(
                "'{}' has more than one ':'",
                notation
            )));
        }

        let start = CellAddress::parse(start)?;
        let end = CellAddress::parse(end)?;
        Self::new(start.row, start.col, end.row, end.col, notation)
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Top-left corner
    pub fn start(&self) -> CellAddress {
        CellAddress::new(self.start_row, self.start_col)
    }

    /// Bottom-right corner
    pub fn end(&self) -> CellAddress {
        CellAddress::new(self.end_row, self.end_col)
    }

    /// Absolute address of a cell given by its offset inside the range
    ///
    /// Returns `None` if the offset falls outside the range's extent.
    pub fn absolute(&self, row_offset: usize, col_offset: usize) -> Option<CellAddress> {
        if row_offset >= self.row_count() || col_offset >= self.col_count() {
            return None;
        }
        Some(CellAddress::new(
            self.start_row + row_offset,
            self.start_col + col_offset,
        ))
    }

    /// Format the corners as A1 notation, ignoring the stored label
    pub fn to_a1_string(&self) -> String {
        format!("{}:{}", self.start(), self.end())
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Wire form of [`RangeSpec`], validated on the way in
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RangeFields {
    start_row: usize,
    start_col: usize,
    end_row: usize,
    end_col: usize,
    label: String,
}

#[cfg(feature = "serde")]
impl TryFrom<RangeFields> for RangeSpec {
    type Error = Error;

    fn try_from(f: RangeFields) -> Result<Self> {
        RangeSpec::new(f.start_row, f.start_col, f.end_row, f.end_col, f.label)
    }
}

/// The ranges available to one generation request
///
/// Explicit ranges are addressed positionally (1-based in templates), named
/// ranges through the registry.
#[derive(Debug, Clone, Default)]
pub struct RangeCatalog {
    ranges: Vec<RangeSpec>,
    named: NamedRangeRegistry,
}

impl RangeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from explicit ranges and a registry
    pub fn with_ranges(ranges: Vec<RangeSpec>, named: NamedRangeRegistry) -> Self {
        Self { ranges, named }
    }

    /// Append an explicit range
    pub fn push(&mut self, range: RangeSpec) {
        self.ranges.push(range);
    }

    /// Explicit ranges in declaration order
    pub fn ranges(&self) -> &[RangeSpec] {
        &self.ranges
    }

    /// The named range registry
    pub fn named(&self) -> &NamedRangeRegistry {
        &self.named
    }

    /// Mutable access to the named range registry
    pub fn named_mut(&mut self) -> &mut NamedRangeRegistry {
        &mut self.named
    }

    /// Whether there are neither explicit nor named ranges
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty() && self.named.is_empty()
    }

    /// First explicit range, used as the primary range
    pub fn first(&self) -> Option<&RangeSpec> {
        self.ranges.first()
    }

    /// Look up an explicit range by its 1-based ordinal
    pub fn nth(&self, ordinal: usize) -> Option<&RangeSpec> {
        ordinal.checked_sub(1).and_then(|idx| self.ranges.get(idx))
    }

    /// Look up a named range
    pub fn by_name(&self, name: &str) -> Option<&RangeSpec> {
        self.named.get(name)
    }

    /// Resolve a reference: a registered name, a 1-based ordinal, or A1 notation
    pub fn resolve(&self, reference: &str) -> Result<RangeSpec> {
        let reference = reference.trim();

        if let Some(range) = self.named.get(reference) {
            return Ok(range.clone());
        }

        if !reference.is_empty() && reference.bytes().all(|b| b.is_ascii_digit()) {
            let ordinal: usize = reference
                .parse()
                .map_err(|_| Error::UnknownRange(reference.to_string()))?;
            return self
                .nth(ordinal)
                .cloned()
                .ok_or_else(|| Error::UnknownRange(reference.to_string()));
        }

        if reference.contains(':') {
            return RangeSpec::parse(reference)
                .map_err(|e| Error::UnknownRange(format!("{} ({})", reference, e)));
        }

        Err(Error::UnknownRange(reference.to_string()))
    }

    /// Largest row count across the explicit ranges
    pub fn max_row_count(&self) -> Option<usize> {
        self.ranges.iter().map(RangeSpec::row_count).max()
    }

    /// Largest column count across the explicit ranges
    pub fn max_col_count(&self) -> Option<usize> {
        self.ranges.iter().map(RangeSpec::col_count).max()
    }
}

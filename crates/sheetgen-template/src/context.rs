//! Expansion context
//!
//! Each loop level pushes a new frame by cloning its parent's context and
//! overriding one dimension. Frames are plain values; nothing is shared or
//! mutated across iterations.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use sheetgen_core::{CellValue, DataTable, RangeSpec};

/// Whether a leaf loop walks rows or columns of its range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    #[default]
    Row,
    Column,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Row => f.write_str("row"),
            Direction::Column => f.write_str("column"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "row" | "rows" => Ok(Direction::Row),
            "column" | "columns" | "col" => Ok(Direction::Column),
            other => Err(format!("unknown direction '{}', expected row or column", other)),
        }
    }
}

/// The file being visited by a `FILES_LOOP` iteration
#[derive(Debug, Clone, Copy)]
pub struct FileFrame<'a> {
    /// 0-based position in the file list
    pub index: usize,
    /// Basename, as substituted for `FILE_NAME`
    pub name: &'a str,
    /// Loaded table, if the data source had one
    pub table: Option<&'a DataTable>,
}

/// The range being visited by a `RANGES_LOOP` iteration
#[derive(Debug, Clone)]
pub struct RangeFrame {
    /// 0-based position in the explicit range list
    pub index: usize,
    pub spec: RangeSpec,
}

/// The row or column being visited by a leaf loop iteration
#[derive(Debug, Clone)]
pub struct Cursor {
    pub direction: Direction,
    /// Offset of the lane from the range's first row (row mode) or column
    pub offset: usize,
    /// Cell values along the lane
    pub cells: Vec<CellValue>,
}

/// Everything a marker may be resolved against at one point of expansion
#[derive(Debug, Clone, Default)]
pub struct ExpansionContext<'a> {
    file: Option<FileFrame<'a>>,
    range: Option<RangeFrame>,
    cursor: Option<Rc<Cursor>>,
    direction: Direction,
    argument: Option<Rc<[String]>>,
}

impl<'a> ExpansionContext<'a> {
    /// The outermost context
    pub fn root(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Enter a file iteration
    pub fn with_file(&self, file: FileFrame<'a>) -> Self {
        Self {
            file: Some(file),
            ..self.clone()
        }
    }

    /// Enter a range iteration
    pub fn with_range(&self, range: RangeFrame) -> Self {
        Self {
            range: Some(range),
            ..self.clone()
        }
    }

    /// Enter a lane of a leaf loop
    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        Self {
            direction: cursor.direction,
            cursor: Some(Rc::new(cursor)),
            ..self.clone()
        }
    }

    /// Override the direction inherited by nested loops
    pub fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    /// Enter an argument block listing the ranges it refers to
    pub fn with_argument(&self, range_names: Vec<String>) -> Self {
        Self {
            argument: Some(range_names.into()),
            ..self.clone()
        }
    }

    pub fn file(&self) -> Option<&FileFrame<'a>> {
        self.file.as_ref()
    }

    pub fn range(&self) -> Option<&RangeFrame> {
        self.range.as_ref()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_deref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Range names of the enclosing argument block, if inside one
    pub fn argument(&self) -> Option<&[String]> {
        self.argument.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_str() {
        assert_eq!("row".parse::<Direction>(), Ok(Direction::Row));
        assert_eq!(" Column ".parse::<Direction>(), Ok(Direction::Column));
        assert!("diagonal".parse::<Direction>().is_err());
        assert_eq!(Direction::default(), Direction::Row);
    }

    #[test]
    fn test_frames_do_not_leak_upwards() {
        let root = ExpansionContext::root(Direction::Row);
        let spec = RangeSpec::parse("A1:B2").unwrap();

        let inner = root
            .with_range(RangeFrame { index: 1, spec })
            .with_cursor(Cursor {
                direction: Direction::Column,
                offset: 0,
                cells: vec![CellValue::from(1)],
            });

        assert_eq!(inner.direction(), Direction::Column);
        assert_eq!(inner.range().map(|r| r.index), Some(1));
        assert!(root.range().is_none());
        assert!(root.cursor().is_none());
        assert_eq!(root.direction(), Direction::Row);
    }

    #[test]
    fn test_argument_frame() {
        let ctx = ExpansionContext::root(Direction::Row).with_argument(vec!["a".into()]);
        assert_eq!(ctx.argument(), Some(&["a".to_string()][..]));
    }
}

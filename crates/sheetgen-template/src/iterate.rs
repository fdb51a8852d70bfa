//! Walking a range as rows or columns
//!
//! A lane is one row (row mode) or one column (column mode) of a range,
//! clipped to the table. Leaf markers such as `VALUE` and `ALL_COLUMNS` are
//! projections of the current lane.

use sheetgen_core::{CellValue, DataTable, RangeSpec};

use crate::context::{Cursor, Direction};
use crate::diagnostic::{Diagnostic, Diagnostics, Location};
use crate::error::ExpandError;
use crate::format::try_format_value;
use crate::marker::Scalar;

const ROW_MODE_ALL_ROWS: &str = "/* ROW MODE: ALL_ROWS not applicable */";
const COLUMN_MODE_ALL_COLUMNS: &str = "/* COLUMN MODE: ALL_COLUMNS not applicable */";

/// One row or column of a range
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// Offset from the range's first row (row mode) or first column
    pub offset: usize,
    pub cells: Vec<CellValue>,
}

/// Split a range of `table` into lanes
///
/// The range is clipped to the table's extent; clipping is reported as
/// out-of-bounds, and a range starting past the table yields no lanes.
pub fn lanes(
    table: &DataTable,
    range: &RangeSpec,
    direction: Direction,
    location: Option<Location>,
    diagnostics: &mut Diagnostics,
) -> Vec<Lane> {
    let rows = table.row_count();
    let cols = table.col_count();

    if range.start_row >= rows || range.start_col >= cols {
        push_at(
            diagnostics,
            ExpandError::OutOfBounds(format!(
                "range {} starts outside the table ({} rows x {} columns)",
                range, rows, cols
            )),
            location,
        );
        return Vec::new();
    }

    let end_row = range.end_row.min(rows - 1);
    let end_col = range.end_col.min(cols - 1);
    if end_row != range.end_row || end_col != range.end_col {
        push_at(
            diagnostics,
            ExpandError::OutOfBounds(format!(
                "range {} extends past the table ({} rows x {} columns), clipped",
                range, rows, cols
            )),
            location,
        );
    }

    let cell = |r: usize, c: usize| table.get(r, c).cloned().unwrap_or_default();
    match direction {
        Direction::Row => (range.start_row..=end_row)
            .map(|r| Lane {
                offset: r - range.start_row,
                cells: (range.start_col..=end_col).map(|c| cell(r, c)).collect(),
            })
            .collect(),
        Direction::Column => (range.start_col..=end_col)
            .map(|c| Lane {
                offset: c - range.start_col,
                cells: (range.start_row..=end_row).map(|r| cell(r, c)).collect(),
            })
            .collect(),
    }
}

/// Format a value, reporting values that have no literal form
pub fn format_cell(
    value: &CellValue,
    location: Option<Location>,
    diagnostics: &mut Diagnostics,
) -> String {
    match try_format_value(value) {
        Ok(text) => text,
        Err(err) => {
            push_at(diagnostics, err, location);
            "0".to_string()
        }
    }
}

/// Resolve a lane-dependent marker against the current cursor
///
/// Returns `None` for markers that do not depend on the lane.
pub fn project(
    cursor: &Cursor,
    scalar: &Scalar,
    location: Option<Location>,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    let offset = cursor.offset.to_string();
    let text = match (scalar, cursor.direction) {
        (Scalar::Value, _) => match cursor.cells.first() {
            Some(value) => format_cell(value, location, diagnostics),
            None => "0".to_string(),
        },
        (Scalar::RowIndex, Direction::Row) | (Scalar::ColIndex, Direction::Column) => offset,
        (Scalar::RowIndex, Direction::Column) | (Scalar::ColIndex, Direction::Row) => {
            "-1".to_string()
        }
        (Scalar::AllColumns, Direction::Row) | (Scalar::AllRows, Direction::Column) => {
            join_cells(&cursor.cells, location, diagnostics)
        }
        (Scalar::AllRows, Direction::Row) => ROW_MODE_ALL_ROWS.to_string(),
        (Scalar::AllColumns, Direction::Column) => COLUMN_MODE_ALL_COLUMNS.to_string(),
        (Scalar::ColAt(n), Direction::Column) => match cursor.offset.checked_add(*n) {
            Some(col) => col.to_string(),
            None => {
                push_at(
                    diagnostics,
                    ExpandError::OutOfBounds(format!(
                        "column offset {} overflows from column {}",
                        n, cursor.offset
                    )),
                    location,
                );
                "0".to_string()
            }
        },
        (Scalar::RowAt(n), _) | (Scalar::ColAt(n), Direction::Row) => {
            match cursor.cells.get(*n) {
                Some(value) => format_cell(value, location, diagnostics),
                None => {
                    push_at(
                        diagnostics,
                        ExpandError::OutOfBounds(format!(
                            "position {} is outside a lane of {} cells",
                            n,
                            cursor.cells.len()
                        )),
                        location,
                    );
                    "0".to_string()
                }
            }
        }
        _ => return None,
    };
    Some(text)
}

fn join_cells(
    cells: &[CellValue],
    location: Option<Location>,
    diagnostics: &mut Diagnostics,
) -> String {
    cells
        .iter()
        .map(|v| format_cell(v, location, diagnostics))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_at(diagnostics: &mut Diagnostics, error: ExpandError, location: Option<Location>) {
    let diagnostic = Diagnostic::new(error);
    diagnostics.push(match location {
        Some(loc) => diagnostic.at(loc),
        None => diagnostic,
    });
}

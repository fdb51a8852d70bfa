//! Rendering cell values as source-code literals
//!
//! # Example
//!
//! ```rust
//! use sheetgen_core::CellValue;
//! use sheetgen_template::format_value;
//!
//! assert_eq!(format_value(&CellValue::Number(3.0)), "3");
//! assert_eq!(format_value(&CellValue::Number(3.5)), "3.5");
//! assert_eq!(format_value(&CellValue::from("abc")), "\"abc\"");
//! assert_eq!(format_value(&CellValue::from("\"123\"")), "123");
//! assert_eq!(format_value(&CellValue::Empty), "0");
//! ```

use sheetgen_core::CellValue;

use crate::error::ExpandError;

/// Format a cell value as a literal, substituting `0` where no literal exists
pub fn format_value(value: &CellValue) -> String {
    try_format_value(value).unwrap_or_else(|_| "0".to_string())
}

/// Format a cell value as a literal
///
/// Only infinities fail; the caller decides what to emit in their place.
pub fn try_format_value(value: &CellValue) -> Result<String, ExpandError> {
    match value {
        CellValue::Empty => Ok("0".to_string()),
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => Ok(format_text(s)),
    }
}

fn format_number(n: f64) -> Result<String, ExpandError> {
    if n.is_nan() {
        return Ok("0".to_string());
    }
    if n.is_infinite() {
        return Err(ExpandError::UnrepresentableValue(n.to_string()));
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Ok(format!("{}", n as i64))
    } else {
        Ok(format!("{}", n))
    }
}

fn format_text(s: &str) -> String {
    let trimmed = s.trim();
    if is_numeric_literal(trimmed) {
        return trimmed.to_string();
    }

    if let Some(inner) = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        if is_numeric_literal(inner) {
            return inner.to_string();
        }
    }

    format!("\"{}\"", s.replace('"', "\\\""))
}

/// Whether text reads as a plain decimal number
///
/// An optional leading `-`, then digits and at most one `.`, with at least
/// one digit.
pub fn is_numeric_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    !body.is_empty()
        && body.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && body.bytes().filter(|&b| b == b'.').count() <= 1
        && body.bytes().any(|b| b.is_ascii_digit())
}

//! Expansion error types
//!
//! Expansion never aborts on these; each one is recorded as a
//! [`Diagnostic`](crate::Diagnostic) next to the generated text.

use thiserror::Error;

/// Something that went wrong while scanning, validating or expanding a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Unmatched or mismatched loop/argument tags
    #[error("Malformed marker: {0}")]
    MalformedMarker(String),

    /// Reference to an undefined named, numbered or string range
    #[error("Unknown range: {0}")]
    UnknownRange(String),

    /// Row/column reference outside the range or table extent
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// No files, no ranges or no template supplied
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Marker keyword outside the supported vocabulary
    #[error("Unsupported marker: {0}")]
    UnsupportedMarker(String),

    /// Loop nesting order could not be determined from the template
    #[error("Ambiguous layout: {0}")]
    AmbiguousLayout(String),

    /// A cell value with no source-literal form (e.g. infinity)
    #[error("Unrepresentable value: {0}")]
    UnrepresentableValue(String),

    /// A listed file has no table in the data source
    #[error("No table loaded for file: {0}")]
    MissingTable(String),
}

/// Diagnostic category, one per [`ExpandError`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticKind {
    MalformedMarker,
    UnknownRange,
    OutOfBounds,
    EmptyInput,
    UnsupportedMarker,
    AmbiguousLayout,
    UnrepresentableValue,
    MissingTable,
}

/// How serious a diagnostic is for a hosting application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl ExpandError {
    /// The category of this error
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ExpandError::MalformedMarker(_) => DiagnosticKind::MalformedMarker,
            ExpandError::UnknownRange(_) => DiagnosticKind::UnknownRange,
            ExpandError::OutOfBounds(_) => DiagnosticKind::OutOfBounds,
            ExpandError::EmptyInput(_) => DiagnosticKind::EmptyInput,
            ExpandError::UnsupportedMarker(_) => DiagnosticKind::UnsupportedMarker,
            ExpandError::AmbiguousLayout(_) => DiagnosticKind::AmbiguousLayout,
            ExpandError::UnrepresentableValue(_) => DiagnosticKind::UnrepresentableValue,
            ExpandError::MissingTable(_) => DiagnosticKind::MissingTable,
        }
    }
}

impl DiagnosticKind {
    /// Default severity for this category
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::OutOfBounds
            | DiagnosticKind::AmbiguousLayout
            | DiagnosticKind::UnrepresentableValue => Severity::Warning,
            DiagnosticKind::MalformedMarker
            | DiagnosticKind::UnknownRange
            | DiagnosticKind::EmptyInput
            | DiagnosticKind::UnsupportedMarker
            | DiagnosticKind::MissingTable => Severity::Error,
        }
    }

    /// Stable name, as used in the taxonomy (`OutOfBoundsError`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedMarker => "MalformedMarkerError",
            DiagnosticKind::UnknownRange => "UnknownRangeError",
            DiagnosticKind::OutOfBounds => "OutOfBoundsError",
            DiagnosticKind::EmptyInput => "EmptyInputError",
            DiagnosticKind::UnsupportedMarker => "UnsupportedMarkerError",
            DiagnosticKind::AmbiguousLayout => "AmbiguousLayoutWarning",
            DiagnosticKind::UnrepresentableValue => "UnrepresentableValueError",
            DiagnosticKind::MissingTable => "MissingTableError",
        }
    }
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<sheetgen_core::Error> for ExpandError {
    fn from(err: sheetgen_core::Error) -> Self {
        match err {
            sheetgen_core::Error::RowOutOfBounds(..) | sheetgen_core::Error::ColumnOutOfBounds(..) => {
                ExpandError::OutOfBounds(err.to_string())
            }
            other => ExpandError::UnknownRange(other.to_string()),
        }
    }
}

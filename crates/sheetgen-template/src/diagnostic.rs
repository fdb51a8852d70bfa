//! Diagnostics accumulated during one scan, validation or generation call

use std::fmt;

use crate::error::{DiagnosticKind, ExpandError, Severity};

/// Position of a marker inside the template text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Byte offset of the marker's opening `{{`
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Location {
    /// Compute the line and column of `offset` within `text`
    ///
    /// Offsets past the end of `text` are clamped to its length.
    pub fn in_text(text: &str, offset: usize) -> Self {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;

        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A structured warning or error, never raised as a panic or `Err`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub error: ExpandError,
    /// Where in the template, when it can be attributed to a marker
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a diagnostic without a location
    pub fn new(error: ExpandError) -> Self {
        Self {
            error,
            location: None,
        }
    }

    /// Attach a location
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The diagnostic category
    pub fn kind(&self) -> DiagnosticKind {
        self.error.kind()
    }

    /// The diagnostic severity
    pub fn severity(&self) -> Severity {
        self.kind().severity()
    }

    /// Human-readable message, without location
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "{}: {}", loc, self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

impl From<ExpandError> for Diagnostic {
    fn from(error: ExpandError) -> Self {
        Diagnostic::new(error)
    }
}

/// Ordered list of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: impl Into<Diagnostic>) {
        let diagnostic = diagnostic.into();
        tracing::warn!(kind = %diagnostic.kind(), "{}", diagnostic);
        self.items.push(diagnostic);
    }

    /// Record an error at a location inside `template`
    pub fn report(&mut self, error: ExpandError, template: &str, offset: usize) {
        self.push(Diagnostic::new(error).at(Location::in_text(template, offset)));
    }

    /// Append all diagnostics from another list
    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Iterate in recording order
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics of a given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind() == kind).count()
    }

    /// Whether any diagnostic has [`Severity::Error`]
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity() == Severity::Error)
    }

    /// Kinds in recording order
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.items.iter().map(Diagnostic::kind).collect()
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

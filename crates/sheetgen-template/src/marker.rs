//! Marker vocabulary and lexing
//!
//! A marker is a `{{KEYWORD}}` span. Everything between two markers is
//! literal text. Keywords are parsed strictly: anything not in the
//! vocabulary below becomes [`MarkerKind::Unknown`] and is passed through
//! untouched by expansion.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::Direction;

/// Matches one `{{...}}` marker whose body contains no braces
static MARKER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([^{}]+)\}\}").expect("marker pattern is a valid regex")
});

/// The kind of a loop, shared by its start and end markers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// `LOOP`: row or column lanes of the layout's bound range
    Data,
    /// `FILES_LOOP`: one iteration per input file
    Files,
    /// `RANGES_LOOP`: one iteration per explicit range
    Ranges,
    /// `RANGE_LOOP`: lanes of the current range
    Range,
    /// `RANGE_DATA_LOOP`: lanes of the current range, in multi-range layouts
    RangeData,
    /// `RANGE[name]_LOOP`: lanes of a named range
    Named(String),
    /// `RANGE:n_LOOP`: lanes of the nth explicit range (1-based)
    Numbered(usize),
}

impl LoopKind {
    /// The keyword stem, without `_START`/`_END`
    pub fn keyword(&self) -> String {
        match self {
            LoopKind::Data => "LOOP".to_string(),
            LoopKind::Files => "FILES_LOOP".to_string(),
            LoopKind::Ranges => "RANGES_LOOP".to_string(),
            LoopKind::Range => "RANGE_LOOP".to_string(),
            LoopKind::RangeData => "RANGE_DATA_LOOP".to_string(),
            LoopKind::Named(name) => format!("RANGE[{}]_LOOP", name),
            LoopKind::Numbered(n) => format!("RANGE:{}_LOOP", n),
        }
    }

    /// Whether the loop walks lanes of one range, as opposed to files or ranges
    pub fn is_leaf(&self) -> bool {
        !matches!(self, LoopKind::Files | LoopKind::Ranges)
    }
}

/// Markers that are replaced by a value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    Value,
    RowIndex,
    ColIndex,
    AllColumns,
    AllRows,
    /// `ROW:n`
    RowAt(usize),
    /// `COL:n`
    ColAt(usize),
    FileName,
    FileIndex,
    FileCount,
    RowCount,
    ColCount,
    RangeIndex,
    RangeStr,
    RangeCount,
    RangeRowCount,
    RangeColCount,
    MaxRowCount,
    MaxColCount,
    /// `RANGE[name]_ROW_COUNT`
    NamedRowCount(String),
    /// `RANGE[name]_COL_COUNT`
    NamedColCount(String),
    /// `RANGE[name]_FULL_NAME`
    NamedFullName(String),
    /// `RANGE[name]_VALUE[r,c]`
    NamedValue { name: String, row: usize, col: usize },
    /// `RANGE_n_ROW_COUNT`
    NumberedRowCount(usize),
    /// `RANGE_n_COL_COUNT`
    NumberedColCount(usize),
}

/// What a marker means
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Scalar(Scalar),
    Direction(Direction),
    LoopStart(LoopKind),
    LoopEnd(LoopKind),
    ArgumentStart(String),
    ArgumentEnd(String),
    Unknown,
}

/// One marker occurrence in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Parsed meaning
    pub kind: MarkerKind,
    /// Keyword between the braces
    pub body: String,
    /// Full source text including braces
    pub raw: String,
    /// Byte offset of the opening `{{`
    pub offset: usize,
}

/// A lexed piece of template text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Marker(Marker),
}

/// Split a template into literal text and markers
pub fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    for caps in MARKER_PATTERN.captures_iter(template) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > pos {
            tokens.push(Token::Text(&template[pos..whole.start()]));
        }
        tokens.push(Token::Marker(Marker {
            kind: parse_keyword(body.as_str()),
            body: body.as_str().to_string(),
            raw: whole.as_str().to_string(),
            offset: whole.start(),
        }));
        pos = whole.end();
    }

    if pos < template.len() {
        tokens.push(Token::Text(&template[pos..]));
    }
    tokens
}

/// Parse a marker keyword
pub fn parse_keyword(body: &str) -> MarkerKind {
    if let Some(kind) = parse_fixed(body) {
        return kind;
    }

    if let Some(stem) = body.strip_suffix("_START") {
        if let Some(kind) = parse_loop_stem(stem) {
            return MarkerKind::LoopStart(kind);
        }
    }
    if let Some(stem) = body.strip_suffix("_END") {
        if let Some(kind) = parse_loop_stem(stem) {
            return MarkerKind::LoopEnd(kind);
        }
    }

    if let Some(name) = body.strip_prefix("ARGUMENT_START:") {
        if is_word(name) {
            return MarkerKind::ArgumentStart(name.to_string());
        }
    }
    if let Some(name) = body.strip_prefix("ARGUMENT_END:") {
        if is_word(name) {
            return MarkerKind::ArgumentEnd(name.to_string());
        }
    }

    if let Some(n) = body.strip_prefix("ROW:").and_then(parse_index) {
        return MarkerKind::Scalar(Scalar::RowAt(n));
    }
    if let Some(n) = body.strip_prefix("COL:").and_then(parse_index) {
        return MarkerKind::Scalar(Scalar::ColAt(n));
    }

    if let Some(scalar) = parse_named_scalar(body).or_else(|| parse_numbered_scalar(body)) {
        return MarkerKind::Scalar(scalar);
    }

    MarkerKind::Unknown
}

fn parse_fixed(body: &str) -> Option<MarkerKind> {
    let scalar = match body {
        "VALUE" => Scalar::Value,
        "ROW_INDEX" => Scalar::RowIndex,
        "COL_INDEX" => Scalar::ColIndex,
        "ALL_COLUMNS" => Scalar::AllColumns,
        "ALL_ROWS" => Scalar::AllRows,
        "FILE_NAME" => Scalar::FileName,
        "FILE_INDEX" => Scalar::FileIndex,
        "FILE_COUNT" => Scalar::FileCount,
        "ROW_COUNT" => Scalar::RowCount,
        "COL_COUNT" => Scalar::ColCount,
        "RANGE_INDEX" => Scalar::RangeIndex,
        "RANGE_STR" => Scalar::RangeStr,
        "RANGE_COUNT" => Scalar::RangeCount,
        "RANGE_ROW_COUNT" => Scalar::RangeRowCount,
        "RANGE_COL_COUNT" => Scalar::RangeColCount,
        "MAX_ROW_COUNT" => Scalar::MaxRowCount,
        "MAX_COL_COUNT" => Scalar::MaxColCount,
        "DIRECTION:ROW" => return Some(MarkerKind::Direction(Direction::Row)),
        "DIRECTION:COLUMN" => return Some(MarkerKind::Direction(Direction::Column)),
        _ => return None,
    };
    Some(MarkerKind::Scalar(scalar))
}

fn parse_loop_stem(stem: &str) -> Option<LoopKind> {
    match stem {
        "LOOP" => return Some(LoopKind::Data),
        "FILES_LOOP" => return Some(LoopKind::Files),
        "RANGES_LOOP" => return Some(LoopKind::Ranges),
        "RANGE_LOOP" => return Some(LoopKind::Range),
        "RANGE_DATA_LOOP" => return Some(LoopKind::RangeData),
        _ => {}
    }

    let stem = stem.strip_suffix("_LOOP")?;
    if let Some((name, rest)) = split_named(stem) {
        return rest.is_empty().then(|| LoopKind::Named(name.to_string()));
    }
    stem.strip_prefix("RANGE:")
        .and_then(parse_index)
        .map(LoopKind::Numbered)
}

/// Split `RANGE[name]rest` into `(name, rest)`
fn split_named(body: &str) -> Option<(&str, &str)> {
    let inner = body.strip_prefix("RANGE[")?;
    let close = inner.find(']')?;
    let name = &inner[..close];
    if name.is_empty() {
        return None;
    }
    Some((name, &inner[close + 1..]))
}

fn parse_named_scalar(body: &str) -> Option<Scalar> {
    let (name, rest) = split_named(body)?;
    let name = name.to_string();
    match rest {
        "_ROW_COUNT" => Some(Scalar::NamedRowCount(name)),
        "_COL_COUNT" => Some(Scalar::NamedColCount(name)),
        "_FULL_NAME" => Some(Scalar::NamedFullName(name)),
        _ => {
            let coords = rest.strip_prefix("_VALUE[")?.strip_suffix(']')?;
            let (row, col) = coords.split_once(',')?;
            Some(Scalar::NamedValue {
                name,
                row: parse_index(row.trim())?,
                col: parse_index(col.trim())?,
            })
        }
    }
}

fn parse_numbered_scalar(body: &str) -> Option<Scalar> {
    let rest = body.strip_prefix("RANGE_")?;
    if let Some(n) = rest.strip_suffix("_ROW_COUNT").and_then(parse_index) {
        return Some(Scalar::NumberedRowCount(n));
    }
    rest.strip_suffix("_COL_COUNT")
        .and_then(parse_index)
        .map(Scalar::NumberedColCount)
}

fn parse_index(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

//! Template expansion
//!
//! [`generate`] runs the whole pipeline for one [`GenerationRequest`]:
//! metadata that does not depend on iteration is computed once up front,
//! argument blocks are expanded next, and the remaining loop structure is
//! expanded recursively according to the template's [`Layout`].
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use sheetgen_core::{CellValue, DataTable, RangeCatalog, RangeSpec};
//! use sheetgen_template::{generate, GenerationRequest};
//!
//! let mut tables = HashMap::new();
//! tables.insert(
//!     "data.csv".to_string(),
//!     DataTable::from_rows(vec![
//!         vec![CellValue::from(1), CellValue::from(2)],
//!         vec![CellValue::from(3), CellValue::from(4)],
//!     ]),
//! );
//! let mut catalog = RangeCatalog::new();
//! catalog.push(RangeSpec::parse("A1:B2").unwrap());
//!
//! let files = vec!["data.csv".to_string()];
//! let template = "int t[{{ROW_COUNT}}][{{COL_COUNT}}] = {{{LOOP_START}} { {{ALL_COLUMNS}} },{{LOOP_END}} };";
//! let request = GenerationRequest::new(template, &tables, &catalog).with_files(&files);
//! let generated = generate(&request);
//!
//! assert_eq!(generated.text, "int t[2][2] = { { 1, 2 }, { 3, 4 } };");
//! assert!(generated.diagnostics.is_empty());
//! ```

use std::path::Path;

use ahash::{AHashMap, AHashSet};
use sheetgen_core::{DataSource, DataTable, RangeCatalog, RangeSpec};

use crate::classify::{classify, DataBinding, Layout};
use crate::context::{Cursor, Direction, ExpansionContext, FileFrame, RangeFrame};
use crate::diagnostic::{Diagnostic, Diagnostics, Location};
use crate::error::ExpandError;
use crate::iterate::{self, format_cell};
use crate::marker::{LoopKind, Marker, MarkerKind, Scalar};
use crate::scanner::{direction_in, scan, walk_markers, ArgumentScope, LoopScope, Node};
use crate::separator;

/// Line prefixes inside an argument block that list the ranges it uses
const RANGE_NAME_KEYS: [&str; 2] = ["RANGE_NAMES=", "範圍名稱="];

/// Everything one `generate` call reads
///
/// The request is never mutated by expansion; the same request always
/// produces the same output.
#[derive(Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub template: &'a str,
    /// File identifiers in iteration order
    pub files: &'a [String],
    pub source: &'a dyn DataSource,
    pub catalog: &'a RangeCatalog,
    /// Range used when no explicit range is listed
    pub primary_range: Option<&'a RangeSpec>,
    /// Direction used when the template has no direction marker
    pub default_direction: Option<Direction>,
}

impl<'a> GenerationRequest<'a> {
    /// Create a request with no files, no primary range and no direction
    pub fn new(template: &'a str, source: &'a dyn DataSource, catalog: &'a RangeCatalog) -> Self {
        Self {
            template,
            files: &[],
            source,
            catalog,
            primary_range: None,
            default_direction: None,
        }
    }

    /// Set the file list
    pub fn with_files(mut self, files: &'a [String]) -> Self {
        self.files = files;
        self
    }

    /// Set the fallback primary range
    pub fn with_primary_range(mut self, range: &'a RangeSpec) -> Self {
        self.primary_range = Some(range);
        self
    }

    /// Set the default direction
    pub fn with_default_direction(mut self, direction: Direction) -> Self {
        self.default_direction = Some(direction);
        self
    }

    /// First explicit range, else the fallback primary range
    pub fn primary(&self) -> Option<&'a RangeSpec> {
        self.catalog.first().or(self.primary_range)
    }

    fn empty_input(&self) -> Option<&'static str> {
        if self.template.is_empty() {
            Some("no template supplied")
        } else if self.files.is_empty() {
            Some("no files supplied")
        } else if self.primary().is_none() && self.catalog.named().is_empty() {
            Some("no ranges supplied")
        } else {
            None
        }
    }

    /// Ranges whose corners are not ordered top-left to bottom-right
    fn invalid_ranges(&self) -> Vec<ExpandError> {
        let named = self.catalog.named().iter().map(|(_, range)| range);
        self.catalog
            .ranges()
            .iter()
            .chain(named)
            .chain(self.primary_range)
            .filter_map(|range| range.check().err())
            .map(ExpandError::from)
            .collect()
    }
}

impl std::fmt::Debug for GenerationRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("template_len", &self.template.len())
            .field("files", &self.files)
            .field("catalog", &self.catalog)
            .field("primary_range", &self.primary_range)
            .field("default_direction", &self.default_direction)
            .finish()
    }
}

/// Output of one `generate` call
#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub diagnostics: Diagnostics,
    pub layout: Layout,
}

/// Expand a template against loaded tables
///
/// Never fails: problems are reported in [`Generated::diagnostics`]. With
/// no template, no files or no ranges the template is returned unchanged
/// with a single empty-input diagnostic. A range with inverted corners also
/// returns the template unchanged, with one unknown-range diagnostic per
/// such range.
pub fn generate(request: &GenerationRequest<'_>) -> Generated {
    let span = tracing::info_span!(
        "generate",
        files = request.files.len(),
        ranges = request.catalog.ranges().len(),
        named = request.catalog.named().len()
    );
    let _enter = span.enter();

    if let Some(reason) = request.empty_input() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(ExpandError::EmptyInput(reason.to_string()));
        return Generated {
            text: request.template.to_string(),
            diagnostics,
            layout: Layout::PassThrough,
        };
    }

    let invalid = request.invalid_ranges();
    if !invalid.is_empty() {
        let mut diagnostics = Diagnostics::new();
        for err in invalid {
            diagnostics.push(err);
        }
        return Generated {
            text: request.template.to_string(),
            diagnostics,
            layout: Layout::PassThrough,
        };
    }

    let scanned = scan(request.template);
    let mut diagnostics = scanned.diagnostics;
    let nodes = scanned.nodes;

    let mut expander = Expander::new(request, &mut diagnostics);
    expander.collect_globals(&nodes, &mut diagnostics);

    let direction = direction_in(&nodes)
        .or(request.default_direction)
        .unwrap_or_default();
    let root = ExpansionContext::root(direction);

    let mut arguments = Vec::new();
    for node in &nodes {
        if let Node::Argument(scope) = node {
            let mut text = String::new();
            expander.expand_argument(scope, &root, &mut diagnostics, &mut text);
            arguments.push(text);
        }
    }

    expander.layout = classify(&nodes, &mut diagnostics);

    let mut arguments = arguments.into_iter();
    let mut text = String::with_capacity(request.template.len());
    for node in &nodes {
        match node {
            Node::Argument(_) => text.push_str(&arguments.next().unwrap_or_default()),
            other => expander.render_node(other, &root, &mut diagnostics, &mut text),
        }
    }

    tracing::info!(
        layout = %expander.layout,
        bytes = text.len(),
        diagnostics = diagnostics.len(),
        "generation finished"
    );

    Generated {
        text,
        diagnostics,
        layout: expander.layout,
    }
}

struct FileEntry<'r> {
    name: &'r str,
    table: Option<&'r DataTable>,
}

struct Expander<'r> {
    template: &'r str,
    catalog: &'r RangeCatalog,
    files: Vec<FileEntry<'r>>,
    primary: Option<&'r RangeSpec>,
    /// Iteration-independent substitutions, keyed by marker keyword
    globals: AHashMap<String, String>,
    layout: Layout,
}

impl<'r> Expander<'r> {
    fn new(request: &GenerationRequest<'r>, diagnostics: &mut Diagnostics) -> Self {
        let files = request
            .files
            .iter()
            .map(|file| {
                let table = request.source.table(file);
                if table.is_none() {
                    diagnostics.push(ExpandError::MissingTable(file.clone()));
                }
                FileEntry {
                    name: basename(file),
                    table,
                }
            })
            .collect();

        Self {
            template: request.template,
            catalog: request.catalog,
            files,
            primary: request.primary(),
            globals: AHashMap::new(),
            layout: Layout::PassThrough,
        }
    }

    fn location(&self, marker: &Marker) -> Location {
        Location::in_text(self.template, marker.offset)
    }

    fn report(&self, diagnostics: &mut Diagnostics, error: ExpandError, marker: &Marker) {
        diagnostics.push(Diagnostic::new(error).at(self.location(marker)));
    }

    fn first_table(&self) -> Option<&'r DataTable> {
        self.files.first().and_then(|f| f.table)
    }

    fn current_table(&self, ctx: &ExpansionContext<'r>) -> Option<&'r DataTable> {
        match ctx.file() {
            Some(file) => file.table,
            None => self.first_table(),
        }
    }

    /// Compute file/range counts and named-range metadata
    fn collect_globals(&mut self, nodes: &[Node], diagnostics: &mut Diagnostics) {
        let catalog = self.catalog;
        let mut globals = AHashMap::new();

        globals.insert("FILE_COUNT".to_string(), self.files.len().to_string());
        globals.insert("RANGE_COUNT".to_string(), catalog.ranges().len().to_string());
        if let (Some(rows), Some(cols)) = (catalog.max_row_count(), catalog.max_col_count()) {
            globals.insert("MAX_ROW_COUNT".to_string(), rows.to_string());
            globals.insert("MAX_COL_COUNT".to_string(), cols.to_string());
        }
        if let Some(primary) = self.primary {
            globals.insert("ROW_COUNT".to_string(), primary.row_count().to_string());
            globals.insert("COL_COUNT".to_string(), primary.col_count().to_string());
        }

        let mut visited = AHashSet::new();
        walk_markers(nodes, &mut |marker| {
            let MarkerKind::Scalar(scalar) = &marker.kind else {
                return;
            };
            if globals.contains_key(&marker.body) || !visited.insert(marker.body.clone()) {
                return;
            }
            match self.named_metadata(scalar, marker, diagnostics) {
                Some(value) => {
                    globals.insert(marker.body.clone(), value);
                }
                None => tracing::trace!(marker = %marker.raw, "not a global marker"),
            }
        });

        tracing::debug!(count = globals.len(), "computed global substitutions");
        self.globals = globals;
    }

    /// Resolve numbered and named metadata markers
    fn named_metadata(
        &self,
        scalar: &Scalar,
        marker: &Marker,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let unknown_name = |name: &str| {
            ExpandError::UnknownRange(format!("{}: '{}' is not defined", marker.raw, name))
        };
        let unknown_ordinal = |n: usize| {
            ExpandError::UnknownRange(format!(
                "{}: range {} does not exist ({} defined)",
                marker.raw,
                n,
                self.catalog.ranges().len()
            ))
        };

        match scalar {
            Scalar::NumberedRowCount(n) | Scalar::NumberedColCount(n) => {
                let Some(range) = self.catalog.nth(*n) else {
                    self.report(diagnostics, unknown_ordinal(*n), marker);
                    return None;
                };
                Some(match scalar {
                    Scalar::NumberedRowCount(_) => range.row_count().to_string(),
                    _ => range.col_count().to_string(),
                })
            }
            Scalar::NamedRowCount(name) | Scalar::NamedColCount(name) => {
                let Some(range) = self.catalog.by_name(name) else {
                    self.report(diagnostics, unknown_name(name.as_str()), marker);
                    return None;
                };
                Some(match scalar {
                    Scalar::NamedRowCount(_) => range.row_count().to_string(),
                    _ => range.col_count().to_string(),
                })
            }
            Scalar::NamedFullName(name) => match self.catalog.by_name(name) {
                Some(range) => Some(format!("{} ({})", name, range)),
                None => {
                    self.report(diagnostics, unknown_name(name.as_str()), marker);
                    Some(name.clone())
                }
            },
            Scalar::NamedValue { name, row, col } => {
                self.named_value(name, *row, *col, marker, diagnostics)
            }
            // Reached only when no primary or explicit range was available
            Scalar::RowCount | Scalar::ColCount | Scalar::MaxRowCount | Scalar::MaxColCount => {
                let err = ExpandError::UnknownRange(format!(
                    "{}: no range is selected to measure",
                    marker.raw
                ));
                self.report(diagnostics, err, marker);
                None
            }
            _ => None,
        }
    }

    /// Single-cell lookup in a named range, always read from the first file
    fn named_value(
        &self,
        name: &str,
        row: usize,
        col: usize,
        marker: &Marker,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        let Some(range) = self.catalog.by_name(name) else {
            let err = ExpandError::UnknownRange(format!("{}: '{}' is not defined", marker.raw, name));
            self.report(diagnostics, err, marker);
            return None;
        };

        let Some(cell) = range.absolute(row, col) else {
            let err = ExpandError::OutOfBounds(format!(
                "{}: offset ({}, {}) is outside '{}' ({} rows x {} columns)",
                marker.raw,
                row,
                col,
                name,
                range.row_count(),
                range.col_count()
            ));
            self.report(diagnostics, err, marker);
            return None;
        };

        match self.first_table().and_then(|t| t.get(cell.row, cell.col)) {
            Some(value) => Some(format_cell(value, Some(self.location(marker)), diagnostics)),
            None => {
                let err = ExpandError::OutOfBounds(format!(
                    "{}: cell {} is outside the first file's table",
                    marker.raw, cell
                ));
                self.report(diagnostics, err, marker);
                None
            }
        }
    }

    fn render(
        &self,
        nodes: &[Node],
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let mut out = String::new();
        for node in nodes {
            self.render_node(node, ctx, diagnostics, &mut out);
        }
        out
    }

    fn render_node(
        &self,
        node: &Node,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Marker(marker) => self.render_marker(marker, ctx, diagnostics, out),
            Node::Loop(scope) => self.expand_loop(scope, ctx, diagnostics, out),
            Node::Argument(scope) => self.expand_argument(scope, ctx, diagnostics, out),
        }
    }

    fn render_marker(
        &self,
        marker: &Marker,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        match &marker.kind {
            MarkerKind::Direction(_) => {}
            MarkerKind::Scalar(scalar) => {
                if let Some(value) = self.globals.get(&marker.body) {
                    out.push_str(value);
                } else if let Some(value) = self.resolve_scalar(scalar, marker, ctx, diagnostics) {
                    out.push_str(&value);
                } else {
                    out.push_str(&marker.raw);
                }
            }
            _ => out.push_str(&marker.raw),
        }
    }

    fn resolve_scalar(
        &self,
        scalar: &Scalar,
        marker: &Marker,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
    ) -> Option<String> {
        if let Some(cursor) = ctx.cursor() {
            let location = Some(self.location(marker));
            if let Some(value) = iterate::project(cursor, scalar, location, diagnostics) {
                return Some(value);
            }
        }

        match scalar {
            Scalar::FileName => ctx.file().map(|f| f.name.to_string()),
            Scalar::FileIndex => ctx.file().map(|f| f.index.to_string()),
            Scalar::RangeIndex => ctx.range().map(|r| r.index.to_string()),
            Scalar::RangeStr => ctx.range().map(|r| r.spec.label.clone()),
            Scalar::RangeRowCount => ctx.range().map(|r| r.spec.row_count().to_string()),
            Scalar::RangeColCount => ctx.range().map(|r| r.spec.col_count().to_string()),
            _ => None,
        }
    }

    fn expand_loop(
        &self,
        scope: &LoopScope,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        match &scope.kind {
            LoopKind::Files => self.expand_files(scope, ctx, diagnostics, out),
            LoopKind::Ranges => self.expand_ranges(scope, ctx, diagnostics, out),
            kind => match self.bind_range(kind, ctx) {
                Ok(range) => self.expand_leaf(scope, &range, ctx, diagnostics, out),
                Err(reason) => {
                    let err = ExpandError::UnknownRange(format!("{}: {}", scope.start.raw, reason));
                    self.report(diagnostics, err, &scope.start);
                    scope.write_raw(out);
                }
            },
        }
    }

    /// The range a leaf loop walks
    fn bind_range(&self, kind: &LoopKind, ctx: &ExpansionContext<'r>) -> Result<RangeSpec, String> {
        let primary = || {
            self.primary
                .cloned()
                .ok_or_else(|| "no primary range is selected".to_string())
        };

        match kind {
            LoopKind::Data if ctx.argument().is_some() => self
                .current_table(ctx)
                .and_then(DataTable::full_range)
                .ok_or_else(|| "no table to read inside the argument block".to_string()),
            LoopKind::Data => match (self.layout.data_binding(), ctx.range()) {
                (DataBinding::CurrentRange, Some(frame)) => Ok(frame.spec.clone()),
                _ => primary(),
            },
            LoopKind::Range | LoopKind::RangeData => {
                if let Some(frame) = ctx.range() {
                    return Ok(frame.spec.clone());
                }
                let listed = ctx
                    .argument()
                    .and_then(|names| names.iter().find_map(|n| self.catalog.by_name(n)));
                match listed {
                    Some(range) => Ok(range.clone()),
                    None => primary(),
                }
            }
            LoopKind::Named(name) => self
                .catalog
                .by_name(name)
                .cloned()
                .ok_or_else(|| format!("named range '{}' is not defined", name)),
            LoopKind::Numbered(n) => self.catalog.nth(*n).cloned().ok_or_else(|| {
                format!(
                    "range {} does not exist ({} defined)",
                    n,
                    self.catalog.ranges().len()
                )
            }),
            LoopKind::Files | LoopKind::Ranges => Err(format!("{} does not walk a range", kind.keyword())),
        }
    }

    fn expand_leaf(
        &self,
        scope: &LoopScope,
        range: &RangeSpec,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        // A missing table was already reported when the request was loaded
        let Some(table) = self.current_table(ctx) else {
            scope.write_raw(out);
            return;
        };

        let direction = direction_in(&scope.body).unwrap_or(ctx.direction());
        let location = self.location(&scope.start);
        let lanes = iterate::lanes(table, range, direction, Some(location), diagnostics);
        tracing::debug!(
            keyword = %scope.kind.keyword(),
            range = %range,
            %direction,
            lanes = lanes.len(),
            "expanding leaf loop"
        );

        let last = lanes.len().saturating_sub(1);
        for (i, lane) in lanes.into_iter().enumerate() {
            let child = ctx.with_cursor(Cursor {
                direction,
                offset: lane.offset,
                cells: lane.cells,
            });
            let text = self.render(&scope.body, &child, diagnostics);
            out.push_str(&separator::apply(&text, i == last));
        }
    }

    fn expand_files(
        &self,
        scope: &LoopScope,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        let direction = direction_in(&scope.body).unwrap_or(ctx.direction());
        let inner = ctx.with_direction(direction);

        for (index, file) in self.files.iter().enumerate() {
            let child = inner.with_file(FileFrame {
                index,
                name: file.name,
                table: file.table,
            });
            let text = self.render(&scope.body, &child, diagnostics);
            if index + 1 == self.files.len() {
                out.push_str(&separator::trim_last_comma(&text));
            } else {
                out.push_str(&text);
            }
        }
    }

    fn expand_ranges(
        &self,
        scope: &LoopScope,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        let ranges = self.catalog.ranges();
        if ranges.is_empty() {
            tracing::debug!("no explicit ranges, {} expands to nothing", scope.start.raw);
        }

        let direction = direction_in(&scope.body).unwrap_or(ctx.direction());
        let inner = ctx.with_direction(direction);

        for (index, spec) in ranges.iter().enumerate() {
            let child = inner.with_range(RangeFrame {
                index,
                spec: spec.clone(),
            });
            let text = self.render(&scope.body, &child, diagnostics);
            if index + 1 == ranges.len() {
                out.push_str(&separator::trim_last_comma(&text));
            } else {
                out.push_str(&text);
            }
        }
    }

    fn expand_argument(
        &self,
        scope: &ArgumentScope,
        ctx: &ExpansionContext<'r>,
        diagnostics: &mut Diagnostics,
        out: &mut String,
    ) {
        let names = range_names(&scope.body);
        tracing::debug!(argument = %scope.name, ranges = ?names, "expanding argument block");

        let mut child = ctx.with_argument(names);
        if let Some(direction) = direction_in(&scope.body) {
            child = child.with_direction(direction);
        }
        out.push_str(&self.render(&scope.body, &child, diagnostics));
    }
}

/// Range names listed on a `RANGE_NAMES=a, b` line directly inside a block
fn range_names(body: &[Node]) -> Vec<String> {
    for node in body {
        let Node::Text(text) = node else {
            continue;
        };
        for key in RANGE_NAME_KEYS {
            if let Some(pos) = text.find(key) {
                let rest = &text[pos + key.len()..];
                let line = rest.split('\n').next().unwrap_or_default();
                return line
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
    }
    Vec::new()
}

fn basename(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use pretty_assertions::assert_eq;
    use sheetgen_core::{CellValue, NamedRangeRegistry, TableSet};

    fn table(rows: &[&[i32]]) -> DataTable {
        DataTable::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|&n| CellValue::from(n)).collect())
                .collect(),
        )
    }

    struct Fixture {
        tables: TableSet,
        catalog: RangeCatalog,
    }

    impl Fixture {
        fn new(files: &[(&str, DataTable)], ranges: &[&str]) -> Self {
            let mut tables = TableSet::new();
            for (name, t) in files {
                tables.insert(*name, t.clone());
            }
            let catalog = RangeCatalog::with_ranges(
                ranges.iter().map(|r| RangeSpec::parse(r).unwrap()).collect(),
                NamedRangeRegistry::new(),
            );
            Self { tables, catalog }
        }

        fn run(&self, template: &str) -> Generated {
            let request = GenerationRequest::new(template, &self.tables, &self.catalog)
                .with_files(self.tables.files());
            generate(&request)
        }

        fn run_with(&self, template: &str, direction: Direction) -> Generated {
            let request = GenerationRequest::new(template, &self.tables, &self.catalog)
                .with_files(self.tables.files())
                .with_default_direction(direction);
            generate(&request)
        }
    }

    fn two_by_two() -> Fixture {
        Fixture::new(&[("data.csv", table(&[&[1, 2], &[3, 4]]))], &["A1:B2"])
    }

    #[test]
    fn test_row_and_column_duality() {
        let fx = two_by_two();

        let rows = fx.run("{{LOOP_START}}[{{ALL_COLUMNS}}]{{LOOP_END}}");
        assert_eq!(rows.text, "[1, 2],[3, 4],");

        let cols = fx.run_with("{{LOOP_START}}[{{ALL_ROWS}}]{{LOOP_END}}", Direction::Column);
        assert_eq!(cols.text, "[1, 3],[2, 4],");
        assert!(cols.diagnostics.is_empty());
    }

    #[test]
    fn test_separator_on_three_rows() {
        let fx = Fixture::new(
            &[("data.csv", table(&[&[1, 2], &[3, 4], &[5, 6]]))],
            &["A1:B3"],
        );
        let generated = fx.run("{{LOOP_START}}\n{ {{ALL_COLUMNS}} },{{LOOP_END}}\n");
        assert_eq!(generated.text, "\n{ 1, 2 },\n{ 3, 4 },\n{ 5, 6 }\n");
    }

    #[test]
    fn test_no_loop_template_is_idempotent() {
        let fx = two_by_two();
        let template = "// {{FILE_COUNT}} file(s), {{ROW_COUNT}}x{{COL_COUNT}} {{UNKNOWN}}";

        let first = fx.run(template);
        let second = fx.run(template);
        assert_eq!(first.text, "// 1 file(s), 2x2 {{UNKNOWN}}");
        assert_eq!(first.text, second.text);
        assert_eq!(first.layout, Layout::PassThrough);
    }

    #[test]
    fn test_empty_input_aborts() {
        let fx = two_by_two();
        let no_files: &[String] = &[];
        let request = GenerationRequest::new("{{VALUE}}", &fx.tables, &fx.catalog).with_files(no_files);
        let generated = generate(&request);

        assert_eq!(generated.text, "{{VALUE}}");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::EmptyInput]);

        let empty_catalog = RangeCatalog::new();
        let request = GenerationRequest::new("x", &fx.tables, &empty_catalog)
            .with_files(fx.tables.files());
        assert_eq!(generate(&request).diagnostics.count(DiagnosticKind::EmptyInput), 1);
    }

    #[test]
    fn test_primary_range_fallback() {
        let fx = two_by_two();
        let empty_catalog = RangeCatalog::new();
        let primary = RangeSpec::parse("A2:B2").unwrap();
        let request = GenerationRequest::new("{{LOOP_START}}{{ALL_COLUMNS}}{{LOOP_END}}", &fx.tables, &empty_catalog)
            .with_files(fx.tables.files())
            .with_primary_range(&primary);

        assert_eq!(generate(&request).text, "3, 4,");
    }

    #[test]
    fn test_indices_and_point_lookups() {
        let fx = Fixture::new(&[("d.csv", table(&[&[1, 2, 3], &[4, 5, 6]]))], &["B1:C2"]);

        let rows = fx.run("{{LOOP_START}}{{ROW_INDEX}}:{{COL_INDEX}}:{{VALUE}}:{{COL:1}} {{LOOP_END}}");
        assert_eq!(rows.text, "0:-1:2:3,1:-1:5:6,");

        let cols = fx.run("{{DIRECTION:COLUMN}}{{LOOP_START}}{{COL_INDEX}}/{{ROW:1}}/{{COL:1}}{{LOOP_END}}");
        assert_eq!(cols.text, "0/5/1,1/6/2,");
    }

    #[test]
    fn test_loop_body_direction_wins() {
        let fx = two_by_two();
        let generated = fx.run(
            "{{DIRECTION:ROW}}{{LOOP_START}}{{DIRECTION:COLUMN}}{{ALL_ROWS}};{{LOOP_END}}",
        );
        assert_eq!(generated.text, "1, 3;,2, 4;,");
    }

    #[test]
    fn test_files_loop() {
        let fx = Fixture::new(
            &[
                ("in/a.csv", table(&[&[1, 2], &[3, 4]])),
                ("in/b.csv", table(&[&[5, 6], &[7, 8]])),
            ],
            &["A1:B2"],
        );
        let template = "{{FILES_LOOP_START}}\n// {{FILE_INDEX}} {{FILE_NAME}}\n{\
                        {{LOOP_START}} { {{ALL_COLUMNS}} },{{LOOP_END}} },{{FILES_LOOP_END}}\n";
        let generated = fx.run(template);

        assert_eq!(generated.layout, Layout::ThreeD);
        assert_eq!(
            generated.text,
            "\n// 0 a.csv\n{ { 1, 2 }, { 3, 4 } },\n// 1 b.csv\n{ { 5, 6 }, { 7, 8 } }\n"
        );
    }

    #[test]
    fn test_four_d_file_first() {
        let fx = Fixture::new(
            &[
                ("a.csv", table(&[&[1, 2], &[3, 4]])),
                ("b.csv", table(&[&[5, 6], &[7, 8]])),
            ],
            &["A1:A2", "B1:B2"],
        );
        let template = "{{FILES_LOOP_START}}{{RANGES_LOOP_START}}{{RANGE_INDEX}}={{RANGE_STR}}[\
                        {{LOOP_START}}{{VALUE}}{{LOOP_END}}];{{RANGES_LOOP_END}}|{{FILES_LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.layout, Layout::FourDFileFirst);
        assert_eq!(
            generated.text,
            "0=A1:A2[1,3,];1=B1:B2[2,4,];|0=A1:A2[5,7,];1=B1:B2[6,8,];|"
        );
    }

    #[test]
    fn test_four_d_range_first() {
        let fx = Fixture::new(
            &[
                ("a.csv", table(&[&[1, 2], &[3, 4]])),
                ("b.csv", table(&[&[5, 6], &[7, 8]])),
            ],
            &["A1:B1", "A2:B2"],
        );
        let template = "{{RANGES_LOOP_START}}{{FILES_LOOP_START}}\
                        {{LOOP_START}}{ {{ALL_COLUMNS}} }{{LOOP_END}}{{FILES_LOOP_END}};{{RANGES_LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.layout, Layout::FourDRangeFirst);
        assert_eq!(generated.text, "{ 1, 2 }{ 5, 6 };{ 3, 4 }{ 7, 8 };");
    }

    #[test]
    fn test_three_d_multi_range() {
        let fx = Fixture::new(&[("a.csv", table(&[&[1, 2], &[3, 4]]))], &["A1:B1", "A2:B2"]);
        let template = "{{FILES_LOOP_START}}{{RANGES_LOOP_START}}{{RANGE_ROW_COUNT}}x{{RANGE_COL_COUNT}}:\
                        {{RANGE_DATA_LOOP_START}}{{ALL_COLUMNS}}{{RANGE_DATA_LOOP_END}} {{RANGES_LOOP_END}}{{FILES_LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.layout, Layout::ThreeDMultiRange);
        assert_eq!(generated.text, "1x2:1, 2, 1x2:3, 4 ");
    }

    #[test]
    fn test_multi_range_metadata() {
        let fx = Fixture::new(
            &[("a.csv", table(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 9]]))],
            &["A1:A3", "B1:C2"],
        );
        let template = "{{RANGE_COUNT}} {{MAX_ROW_COUNT}} {{MAX_COL_COUNT}} {{RANGE_2_ROW_COUNT}} \
                        {{RANGE_2_COL_COUNT}} {{RANGE_3_ROW_COUNT}}\
                        {{RANGE:2_LOOP_START}}[{{ALL_COLUMNS}}]{{RANGE:2_LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.layout, Layout::MultiRange);
        assert_eq!(generated.text, "2 3 2 2 2 {{RANGE_3_ROW_COUNT}}[2, 3],[5, 6],");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::UnknownRange]);
    }

    #[test]
    fn test_named_only_request_counts() {
        let mut fx = Fixture::new(&[("a.csv", table(&[&[1, 2], &[3, 4]]))], &[]);
        fx.catalog.named_mut().define("n", "A1:B2").unwrap();

        let generated = fx.run(
            "{{RANGE_COUNT}} {{ROW_COUNT}} {{RANGE[n]_LOOP_START}}{{VALUE}}{{RANGE[n]_LOOP_END}}",
        );

        assert_eq!(generated.text, "0 {{ROW_COUNT}} 1,3,");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::UnknownRange]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let mut fx = two_by_two();
        let inverted = RangeSpec {
            start_row: 2,
            start_col: 0,
            end_row: 0,
            end_col: 1,
            label: "A3:B1".to_string(),
        };
        fx.catalog = RangeCatalog::with_ranges(vec![inverted], NamedRangeRegistry::new());

        let generated = fx.run("{{MAX_ROW_COUNT}} {{LOOP_START}}{{VALUE}}{{LOOP_END}}");

        assert_eq!(generated.text, "{{MAX_ROW_COUNT}} {{LOOP_START}}{{VALUE}}{{LOOP_END}}");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::UnknownRange]);
        assert_eq!(generated.layout, Layout::PassThrough);
    }

    #[test]
    fn test_huge_column_offset_in_column_mode() {
        let fx = Fixture::new(
            &[("a.csv", table(&[&[1, 2], &[3, 4], &[5, 6]]))],
            &["A1:B3"],
        );

        let generated =
            fx.run("{{DIRECTION:COLUMN}}{{LOOP_START}}{{COL:18446744073709551615}}{{LOOP_END}}");

        assert_eq!(generated.text, "0,0,");
        assert_eq!(generated.diagnostics.count(DiagnosticKind::OutOfBounds), 2);
    }

    #[test]
    fn test_named_ranges() {
        let mut fx = Fixture::new(&[("a.csv", table(&[&[1, 2], &[3, 4]]))], &["A1:B2"]);
        fx.catalog.named_mut().define("left", "A1:A2").unwrap();

        let template = "{{RANGE[left]_FULL_NAME}} {{RANGE[left]_ROW_COUNT}}x{{RANGE[left]_COL_COUNT}} \
                        {{RANGE[left]_VALUE[1,0]}} {{RANGE[left]_LOOP_START}}{{VALUE}}{{RANGE[left]_LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.text, "left (A1:A2) 2x1 3 1,3,");
        assert!(generated.diagnostics.is_empty());
    }

    #[test]
    fn test_named_value_out_of_range_is_left_unresolved() {
        let mut fx = two_by_two();
        fx.catalog.named_mut().define("left", "A1:B2").unwrap();

        let generated = fx.run("v={{RANGE[left]_VALUE[5,5]}};");
        assert_eq!(generated.text, "v={{RANGE[left]_VALUE[5,5]}};");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::OutOfBounds]);
    }

    #[test]
    fn test_unknown_named_loop_is_kept_verbatim() {
        let fx = two_by_two();
        let template = "a{{RANGE[nope]_LOOP_START}}{{VALUE}}{{RANGE[nope]_LOOP_END}}b {{RANGE[nope]_FULL_NAME}}";
        let generated = fx.run(template);

        assert_eq!(
            generated.text,
            "a{{RANGE[nope]_LOOP_START}}{{VALUE}}{{RANGE[nope]_LOOP_END}}b nope"
        );
        assert_eq!(generated.diagnostics.count(DiagnosticKind::UnknownRange), 2);
    }

    #[test]
    fn test_argument_block() {
        let mut fx = Fixture::new(&[("a.csv", table(&[&[1, 2], &[3, 4]]))], &["A1:B1"]);
        fx.catalog.named_mut().define("second", "A2:B2").unwrap();

        let template = "{{ARGUMENT_START:w}}// RANGE_NAMES=missing, second\n\
                        {{RANGE_DATA_LOOP_START}}{{ALL_COLUMNS}}{{RANGE_DATA_LOOP_END}}\n\
                        {{LOOP_START}}{{VALUE}}{{LOOP_END}}{{ARGUMENT_END:w}}|{{LOOP_START}}{{VALUE}}{{LOOP_END}}";
        let generated = fx.run(template);

        assert_eq!(generated.text, "// RANGE_NAMES=missing, second\n3, 4,\n1,3,|1,");
        assert!(generated.diagnostics.is_empty());
    }

    #[test]
    fn test_clipped_range_reports_out_of_bounds() {
        let fx = Fixture::new(&[("a.csv", table(&[&[1, 2], &[3, 4]]))], &["A1:C3"]);
        let generated = fx.run("{{LOOP_START}}{{ALL_COLUMNS}}{{LOOP_END}}");

        assert_eq!(generated.text, "1, 2,3, 4,");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::OutOfBounds]);
    }

    #[test]
    fn test_missing_table_is_reported() {
        let tables = TableSet::new();
        let files = vec!["ghost.csv".to_string()];
        let mut catalog = RangeCatalog::new();
        catalog.push(RangeSpec::parse("A1:A1").unwrap());

        let request = GenerationRequest::new("{{LOOP_START}}x{{LOOP_END}}", &tables, &catalog)
            .with_files(&files);
        let generated = generate(&request);

        assert_eq!(generated.text, "{{LOOP_START}}x{{LOOP_END}}");
        assert_eq!(generated.diagnostics.kinds(), vec![DiagnosticKind::MissingTable]);
    }

    #[test]
    fn test_range_names_parsing() {
        let body = scan("// 範圍名稱= a ,b,,\nrest").nodes;
        assert_eq!(range_names(&body), vec!["a".to_string(), "b".to_string()]);
        assert!(range_names(&scan("nothing").nodes).is_empty());
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("dir/sub/file.csv"), "file.csv");
        assert_eq!(basename("file.csv"), "file.csv");
    }
}

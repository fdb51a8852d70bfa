//! Template scanning
//!
//! Turns template text into a tree of scopes. Loop and argument blocks
//! become nested nodes; everything else stays a flat sequence of text and
//! scalar markers. Malformed structure never aborts a scan: the offending
//! markers are kept as literal text and reported.

use ahash::AHashSet;
use sheetgen_core::RangeCatalog;

use crate::context::Direction;
use crate::diagnostic::Diagnostics;
use crate::error::ExpandError;
use crate::marker::{tokenize, LoopKind, Marker, MarkerKind, Scalar, Token};

/// A node of the scanned template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Marker(Marker),
    Loop(LoopScope),
    Argument(ArgumentScope),
}

/// A matched `*_LOOP_START` / `*_LOOP_END` pair and the body between them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopScope {
    pub kind: LoopKind,
    pub start: Marker,
    pub end: Marker,
    pub body: Vec<Node>,
}

/// A matched `ARGUMENT_START:name` / `ARGUMENT_END:name` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentScope {
    pub name: String,
    pub start: Marker,
    pub end: Marker,
    pub body: Vec<Node>,
}

impl Node {
    /// Append the node's source text to `out`
    pub fn write_raw(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Marker(marker) => out.push_str(&marker.raw),
            Node::Loop(scope) => scope.write_raw(out),
            Node::Argument(scope) => {
                out.push_str(&scope.start.raw);
                write_raw_all(&scope.body, out);
                out.push_str(&scope.end.raw);
            }
        }
    }
}

impl LoopScope {
    /// Append the loop's source text, delimiters included, to `out`
    pub fn write_raw(&self, out: &mut String) {
        out.push_str(&self.start.raw);
        write_raw_all(&self.body, out);
        out.push_str(&self.end.raw);
    }
}

/// Append the source text of a node sequence to `out`
pub fn write_raw_all(nodes: &[Node], out: &mut String) {
    for node in nodes {
        node.write_raw(out);
    }
}

/// Result of scanning one template
#[derive(Debug, Clone, Default)]
pub struct ScannedTemplate {
    pub nodes: Vec<Node>,
    pub diagnostics: Diagnostics,
}

enum OpenScope {
    Loop {
        kind: LoopKind,
        start: Marker,
        body: Vec<Node>,
    },
    Argument {
        name: String,
        start: Marker,
        body: Vec<Node>,
    },
}

impl OpenScope {
    fn start(&self) -> &Marker {
        match self {
            OpenScope::Loop { start, .. } | OpenScope::Argument { start, .. } => start,
        }
    }

    fn into_parts(self) -> (Marker, Vec<Node>) {
        match self {
            OpenScope::Loop { start, body, .. } | OpenScope::Argument { start, body, .. } => {
                (start, body)
            }
        }
    }
}

struct Scanner<'t> {
    template: &'t str,
    root: Vec<Node>,
    stack: Vec<OpenScope>,
    diagnostics: Diagnostics,
}

impl<'t> Scanner<'t> {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(OpenScope::Loop { body, .. }) | Some(OpenScope::Argument { body, .. }) => body,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let nodes = self.current();
        if let Some(Node::Text(prev)) = nodes.last_mut() {
            prev.push_str(text);
        } else {
            nodes.push(Node::Text(text.to_string()));
        }
    }

    fn push_node(&mut self, node: Node) {
        match node {
            Node::Text(text) => self.push_text(&text),
            other => self.current().push(other),
        }
    }

    /// Keep a marker as literal text and report it
    fn reject(&mut self, marker: &Marker, reason: String) {
        self.diagnostics
            .report(ExpandError::MalformedMarker(reason), self.template, marker.offset);
        self.push_text(&marker.raw);
    }

    /// Dissolve the innermost open scope into its parent as literal text
    fn flatten_top(&mut self) {
        let Some(open) = self.stack.pop() else {
            return;
        };
        let reason = format!("{} is never closed", open.start().raw);
        self.diagnostics.report(
            ExpandError::MalformedMarker(reason),
            self.template,
            open.start().offset,
        );

        let (start, body) = open.into_parts();
        self.push_text(&start.raw);
        for node in body {
            self.push_node(node);
        }
    }

    fn loop_is_open(&self, kind: &LoopKind) -> bool {
        self.stack
            .iter()
            .any(|s| matches!(s, OpenScope::Loop { kind: k, .. } if k == kind))
    }

    fn marker(&mut self, marker: Marker) {
        match marker.kind.clone() {
            MarkerKind::LoopStart(kind) => {
                if self.loop_is_open(&kind) {
                    let reason = format!("{} nested inside a loop of the same kind", marker.raw);
                    self.reject(&marker, reason);
                } else {
                    self.stack.push(OpenScope::Loop {
                        kind,
                        start: marker,
                        body: Vec::new(),
                    });
                }
            }
            MarkerKind::LoopEnd(kind) => self.close_loop(kind, marker),
            MarkerKind::ArgumentStart(name) => {
                if self
                    .stack
                    .iter()
                    .any(|s| matches!(s, OpenScope::Argument { .. }))
                {
                    let reason = format!("{} nested inside another argument block", marker.raw);
                    self.reject(&marker, reason);
                } else {
                    self.stack.push(OpenScope::Argument {
                        name,
                        start: marker,
                        body: Vec::new(),
                    });
                }
            }
            MarkerKind::ArgumentEnd(name) => self.close_argument(name, marker),
            _ => self.current().push(Node::Marker(marker)),
        }
    }

    fn close_loop(&mut self, kind: LoopKind, end: Marker) {
        // A loop may not close across an argument boundary
        let mut found = None;
        for (idx, open) in self.stack.iter().enumerate().rev() {
            match open {
                OpenScope::Loop { kind: k, .. } if *k == kind => {
                    found = Some(idx);
                    break;
                }
                OpenScope::Argument { .. } => break,
                OpenScope::Loop { .. } => {}
            }
        }

        let Some(idx) = found else {
            let reason = format!("{} has no matching start", end.raw);
            self.reject(&end, reason);
            return;
        };

        while self.stack.len() > idx + 1 {
            self.flatten_top();
        }
        if let Some(OpenScope::Loop { kind, start, body }) = self.stack.pop() {
            self.current().push(Node::Loop(LoopScope {
                kind,
                start,
                end,
                body,
            }));
        }
    }

    fn close_argument(&mut self, end_name: String, end: Marker) {
        let Some(idx) = self
            .stack
            .iter()
            .rposition(|s| matches!(s, OpenScope::Argument { .. }))
        else {
            let reason = format!("{} has no matching start", end.raw);
            self.reject(&end, reason);
            return;
        };

        while self.stack.len() > idx + 1 {
            self.flatten_top();
        }
        if let Some(OpenScope::Argument { name, start, body }) = self.stack.pop() {
            if name != end_name {
                let reason = format!(
                    "{} closes argument block '{}' opened at offset {}",
                    end.raw, name, start.offset
                );
                self.diagnostics
                    .report(ExpandError::MalformedMarker(reason), self.template, end.offset);
            }
            self.current().push(Node::Argument(ArgumentScope {
                name,
                start,
                end,
                body,
            }));
        }
    }
}

/// Scan a template into a scope tree
///
/// Identical loops may not nest: a repeated start marker is kept as text,
/// so the first end marker closes the outer scope.
pub fn scan(template: &str) -> ScannedTemplate {
    let mut scanner = Scanner {
        template,
        root: Vec::new(),
        stack: Vec::new(),
        diagnostics: Diagnostics::new(),
    };

    for token in tokenize(template) {
        match token {
            Token::Text(text) => scanner.push_text(text),
            Token::Marker(marker) => scanner.marker(marker),
        }
    }

    while !scanner.stack.is_empty() {
        scanner.flatten_top();
    }

    ScannedTemplate {
        nodes: scanner.root,
        diagnostics: scanner.diagnostics,
    }
}

/// Visit every marker in a tree, loop and argument delimiters included
pub fn walk_markers<'n>(nodes: &'n [Node], f: &mut impl FnMut(&'n Marker)) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Marker(marker) => f(marker),
            Node::Loop(scope) => {
                f(&scope.start);
                walk_markers(&scope.body, f);
                f(&scope.end);
            }
            Node::Argument(scope) => {
                f(&scope.start);
                walk_markers(&scope.body, f);
                f(&scope.end);
            }
        }
    }
}

/// Direction set by markers directly in `nodes`, outside any nested scope
///
/// `COLUMN` wins when both directions are present.
pub fn direction_in(nodes: &[Node]) -> Option<Direction> {
    let mut found = None;
    for node in nodes {
        if let Node::Marker(Marker {
            kind: MarkerKind::Direction(direction),
            ..
        }) = node
        {
            if *direction == Direction::Column {
                return Some(Direction::Column);
            }
            found = Some(*direction);
        }
    }
    found
}

/// Report of a standalone template check
#[derive(Debug, Clone, Default)]
pub struct Validation {
    /// Distinct unsupported marker texts, in order of first appearance
    pub unsupported: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl Validation {
    /// Whether the template can be expanded without errors
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Check a template against a range catalog without expanding it
pub fn validate(template: &str, catalog: &RangeCatalog) -> Validation {
    let scanned = scan(template);
    let mut diagnostics = scanned.diagnostics;
    let mut unsupported = Vec::new();
    let mut seen = AHashSet::new();

    walk_markers(&scanned.nodes, &mut |marker| {
        let unknown_name = |name: &str| {
            (!catalog.named().contains(name))
                .then(|| format!("named range '{}' is not defined", name))
        };
        let unknown_ordinal = |n: usize| {
            catalog
                .nth(n)
                .is_none()
                .then(|| format!("range {} does not exist ({} defined)", n, catalog.ranges().len()))
        };

        let problem = match &marker.kind {
            MarkerKind::Unknown => {
                if seen.insert(marker.raw.clone()) {
                    unsupported.push(marker.raw.clone());
                }
                diagnostics.report(
                    ExpandError::UnsupportedMarker(marker.raw.clone()),
                    template,
                    marker.offset,
                );
                None
            }
            MarkerKind::LoopStart(LoopKind::Named(name))
            | MarkerKind::Scalar(Scalar::NamedRowCount(name))
            | MarkerKind::Scalar(Scalar::NamedColCount(name))
            | MarkerKind::Scalar(Scalar::NamedFullName(name))
            | MarkerKind::Scalar(Scalar::NamedValue { name, .. }) => unknown_name(name.as_str()),
            MarkerKind::LoopStart(LoopKind::Numbered(n))
            | MarkerKind::Scalar(Scalar::NumberedRowCount(n))
            | MarkerKind::Scalar(Scalar::NumberedColCount(n)) => unknown_ordinal(*n),
            _ => None,
        };

        if let Some(reason) = problem {
            diagnostics.report(
                ExpandError::UnknownRange(format!("{}: {}", marker.raw, reason)),
                template,
                marker.offset,
            );
        }
    });

    Validation {
        unsupported,
        diagnostics,
    }
}

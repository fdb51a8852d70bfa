//! Layout classification
//!
//! Decides from the loop structure outside argument blocks which
//! dimensions a template iterates over. The layout decides what a plain
//! `LOOP` binds to; all other loops bind the same way in every layout.

use std::fmt;

use crate::diagnostic::Diagnostics;
use crate::error::ExpandError;
use crate::marker::LoopKind;
use crate::scanner::{LoopScope, Node};

/// Loop structure of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// No loops; only scalar substitution
    PassThrough,
    /// Rows or columns of the primary range
    Standard,
    /// Numbered range loops side by side
    MultiRange,
    /// Files, each walking the primary range
    ThreeD,
    /// Files, ranges, and a range data loop
    ThreeDMultiRange,
    /// Ranges outside, files inside
    FourDRangeFirst,
    /// Files outside, ranges inside
    FourDFileFirst,
}

/// What a plain `LOOP` walks in a given layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBinding {
    /// Always the primary range
    Primary,
    /// The range of the enclosing `RANGES_LOOP`, else the primary range
    CurrentRange,
}

impl Layout {
    pub fn data_binding(self) -> DataBinding {
        match self {
            Layout::ThreeDMultiRange | Layout::FourDRangeFirst | Layout::FourDFileFirst => {
                DataBinding::CurrentRange
            }
            Layout::PassThrough | Layout::Standard | Layout::MultiRange | Layout::ThreeD => {
                DataBinding::Primary
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layout::PassThrough => "pass-through",
            Layout::Standard => "standard",
            Layout::MultiRange => "multi-range",
            Layout::ThreeD => "3d",
            Layout::ThreeDMultiRange => "3d-multi-range",
            Layout::FourDRangeFirst => "4d-range-first",
            Layout::FourDFileFirst => "4d-file-first",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visit loop scopes outside argument blocks, outermost first
fn for_each_loop<'n>(nodes: &'n [Node], f: &mut impl FnMut(&'n LoopScope)) {
    for node in nodes {
        if let Node::Loop(scope) = node {
            f(scope);
            for_each_loop(&scope.body, f);
        }
    }
}

fn any_loop(nodes: &[Node], pred: impl Fn(&LoopKind) -> bool) -> bool {
    let mut found = false;
    for_each_loop(nodes, &mut |scope| found |= pred(&scope.kind));
    found
}

/// Whether a loop of kind `outer` encloses a loop of kind `inner`
fn encloses(nodes: &[Node], outer: &LoopKind, inner: &LoopKind) -> bool {
    let mut found = false;
    for_each_loop(nodes, &mut |scope| {
        if !found && scope.kind == *outer {
            found = any_loop(&scope.body, |k| k == inner);
        }
    });
    found
}

/// Classify a scanned template
///
/// The first matching rule wins. When files and ranges loops are siblings
/// the nesting order is undecidable and file-first is assumed.
pub fn classify(nodes: &[Node], diagnostics: &mut Diagnostics) -> Layout {
    let has = |kind: LoopKind| any_loop(nodes, |k| *k == kind);
    let files = has(LoopKind::Files);
    let ranges = has(LoopKind::Ranges);

    let layout = if files && ranges && has(LoopKind::RangeData) {
        Layout::ThreeDMultiRange
    } else if files && ranges {
        if encloses(nodes, &LoopKind::Ranges, &LoopKind::Files) {
            Layout::FourDRangeFirst
        } else if encloses(nodes, &LoopKind::Files, &LoopKind::Ranges) {
            Layout::FourDFileFirst
        } else {
            diagnostics.push(ExpandError::AmbiguousLayout(
                "FILES_LOOP and RANGES_LOOP do not nest; assuming files outside ranges".into(),
            ));
            Layout::FourDFileFirst
        }
    } else if files && has(LoopKind::Data) {
        Layout::ThreeD
    } else if any_loop(nodes, |k| matches!(k, LoopKind::Numbered(_))) {
        Layout::MultiRange
    } else if any_loop(nodes, |_| true) {
        Layout::Standard
    } else {
        Layout::PassThrough
    };

    tracing::debug!(layout = %layout, "classified template");
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagnosticKind;
    use crate::scanner::scan;

    fn layout_of(template: &str) -> (Layout, Diagnostics) {
        let scanned = scan(template);
        let mut diags = Diagnostics::new();
        let layout = classify(&scanned.nodes, &mut diags);
        (layout, diags)
    }

    #[test]
    fn test_basic_layouts() {
        assert_eq!(layout_of("{{ROW_COUNT}}").0, Layout::PassThrough);
        assert_eq!(layout_of("{{LOOP_START}}x{{LOOP_END}}").0, Layout::Standard);
        assert_eq!(
            layout_of("{{RANGE:1_LOOP_START}}x{{RANGE:1_LOOP_END}}{{LOOP_START}}{{LOOP_END}}").0,
            Layout::MultiRange
        );
        assert_eq!(
            layout_of("{{FILES_LOOP_START}}{{LOOP_START}}x{{LOOP_END}}{{FILES_LOOP_END}}").0,
            Layout::ThreeD
        );
        assert_eq!(
            layout_of("{{RANGE[t]_LOOP_START}}x{{RANGE[t]_LOOP_END}}").0,
            Layout::Standard
        );
    }

    #[test]
    fn test_four_d_layouts() {
        let range_first = "{{RANGES_LOOP_START}}{{FILES_LOOP_START}}{{LOOP_START}}x{{LOOP_END}}\
                           {{FILES_LOOP_END}}{{RANGES_LOOP_END}}";
        assert_eq!(layout_of(range_first).0, Layout::FourDRangeFirst);

        let file_first = "{{FILES_LOOP_START}}{{RANGES_LOOP_START}}{{LOOP_START}}x{{LOOP_END}}\
                          {{RANGES_LOOP_END}}{{FILES_LOOP_END}}";
        assert_eq!(layout_of(file_first).0, Layout::FourDFileFirst);

        let multi = "{{FILES_LOOP_START}}{{RANGES_LOOP_START}}{{RANGE_DATA_LOOP_START}}x\
                     {{RANGE_DATA_LOOP_END}}{{RANGES_LOOP_END}}{{FILES_LOOP_END}}";
        assert_eq!(layout_of(multi).0, Layout::ThreeDMultiRange);
    }

    #[test]
    fn test_sibling_files_and_ranges_are_ambiguous() {
        let (layout, diags) = layout_of(
            "{{FILES_LOOP_START}}a{{FILES_LOOP_END}}{{RANGES_LOOP_START}}b{{RANGES_LOOP_END}}",
        );
        assert_eq!(layout, Layout::FourDFileFirst);
        assert_eq!(diags.count(DiagnosticKind::AmbiguousLayout), 1);
    }

    #[test]
    fn test_argument_blocks_are_ignored() {
        let (layout, _) = layout_of(
            "{{ARGUMENT_START:a}}{{FILES_LOOP_START}}{{LOOP_START}}{{LOOP_END}}\
             {{FILES_LOOP_END}}{{ARGUMENT_END:a}}",
        );
        assert_eq!(layout, Layout::PassThrough);
    }

    #[test]
    fn test_data_binding() {
        assert_eq!(Layout::Standard.data_binding(), DataBinding::Primary);
        assert_eq!(Layout::FourDFileFirst.data_binding(), DataBinding::CurrentRange);
    }
}

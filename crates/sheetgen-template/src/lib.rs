//! # sheetgen-template
//!
//! Template expansion engine for sheetgen.
//!
//! A template is source text with `{{MARKER}}` placeholders. Loop markers
//! delimit bodies that repeat once per row or column of a range, per input
//! file, or per selected range; scalar markers are replaced by values and
//! metadata. Expansion is a pure function of a [`GenerationRequest`]: it
//! never performs I/O and never fails, reporting problems as
//! [`Diagnostic`]s next to the generated text.
//!
//! ## Pipeline
//!
//! - [`marker`]: lexes `{{...}}` spans into typed markers
//! - [`scanner`]: matches loop and argument delimiters into a scope tree
//! - [`classify`]: derives the [`Layout`] from the loop structure
//! - [`iterate`]: walks ranges as rows or columns
//! - [`separator`]: trailing-comma policy between iterations
//! - [`expand`]: ties it all together in [`generate`]

pub mod classify;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod expand;
pub mod format;
pub mod iterate;
pub mod marker;
pub mod presets;
pub mod scanner;
pub mod separator;

pub use classify::Layout;
pub use context::Direction;
pub use diagnostic::{Diagnostic, Diagnostics, Location};
pub use error::{DiagnosticKind, ExpandError, Severity};
pub use expand::{generate, Generated, GenerationRequest};
pub use format::{format_value, try_format_value};
pub use presets::Preset;
pub use scanner::{scan, validate, Validation};

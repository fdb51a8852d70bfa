//! Project configuration
//!
//! A project file records which data files to load, the selected ranges,
//! named ranges and the template to expand. The JSON shape is the one saved
//! by the desktop tool, so existing project files load unchanged:
//!
//! ```json
//! {
//!   "excel_files": ["data/a.csv", "data/b.csv"],
//!   "selected_ranges": [
//!     { "start_row": 0, "start_col": 0, "end_row": 2, "end_col": 3, "range_str": "A1:D3" }
//!   ],
//!   "named_ranges": { "weights": "B2:E5" },
//!   "template_type": "preset",
//!   "preset_template": "array-2d",
//!   "template_direction": "row"
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetgen_core::{NamedRangeRegistry, RangeCatalog, RangeSpec};
use sheetgen_template::{presets, Direction};

use crate::error::{Error, Result};

/// Where the template text comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    /// A built-in template named by `preset_template`
    Preset,
    /// The literal `code_template` text
    #[default]
    Custom,
}

/// One explicitly selected range, zero-based and inclusive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectedRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
    /// A1 notation shown to the user; derived from the indices when empty
    pub range_str: String,
}

impl SelectedRange {
    /// Convert into a validated [`RangeSpec`]
    pub fn to_range(&self) -> sheetgen_core::Result<RangeSpec> {
        if self.range_str.trim().is_empty() {
            RangeSpec::from_indices(self.start_row, self.start_col, self.end_row, self.end_col)
        } else {
            RangeSpec::new(
                self.start_row,
                self.start_col,
                self.end_row,
                self.end_col,
                self.range_str.trim(),
            )
        }
    }
}

impl From<&RangeSpec> for SelectedRange {
    fn from(range: &RangeSpec) -> Self {
        Self {
            start_row: range.start_row,
            start_col: range.start_col,
            end_row: range.end_row,
            end_col: range.end_col,
            range_str: range.label.clone(),
        }
    }
}

/// A saved project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Data files, in `FILES_LOOP` order
    pub excel_files: Vec<PathBuf>,
    /// Sheet picked in the desktop tool; CSV files have a single sheet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_sheet: Option<String>,
    pub selected_ranges: Vec<SelectedRange>,
    /// Name to A1 notation
    pub named_ranges: BTreeMap<String, String>,
    pub template_type: TemplateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_direction: Option<Direction>,
}

impl ProjectConfig {
    /// Read a project file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            files = config.excel_files.len(),
            ranges = config.selected_ranges.len(),
            named = config.named_ranges.len(),
            "loaded project"
        );
        Ok(config)
    }

    /// Write the project file as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve relative data file paths against `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for file in &mut self.excel_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Build the range catalog from the selected and named ranges
    pub fn catalog(&self) -> Result<RangeCatalog> {
        let ranges = self
            .selected_ranges
            .iter()
            .map(SelectedRange::to_range)
            .collect::<sheetgen_core::Result<Vec<_>>>()?;

        let mut named = NamedRangeRegistry::new();
        for (name, notation) in &self.named_ranges {
            named.define(name.as_str(), notation)?;
        }

        Ok(RangeCatalog::with_ranges(ranges, named))
    }

    /// The template text to expand
    ///
    /// For preset projects the named preset wins; `code_template` is the
    /// fallback when the preset is unknown. A project without any template
    /// yields an empty one.
    pub fn template(&self) -> Result<String> {
        if self.template_type == TemplateType::Preset {
            let name = self.preset_template.as_deref().unwrap_or_default();
            if let Some(preset) = presets::get(name) {
                return Ok(preset.template.to_string());
            }
            return match &self.code_template {
                Some(text) => {
                    tracing::warn!(preset = name, "unknown preset, using code_template");
                    Ok(text.clone())
                }
                None => Err(Error::UnknownPreset(name.to_string())),
            };
        }

        Ok(self.code_template.clone().unwrap_or_default())
    }

    /// Use a built-in preset as the template
    pub fn set_preset(&mut self, name: impl Into<String>) {
        self.template_type = TemplateType::Preset;
        self.preset_template = Some(name.into());
    }

    /// Use literal template text
    pub fn set_code_template(&mut self, text: impl Into<String>) {
        self.template_type = TemplateType::Custom;
        self.code_template = Some(text.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAVED: &str = r#"{
        "excel_files": ["a.csv", "/abs/b.csv"],
        "selected_sheet": "Sheet1",
        "selected_ranges": [
            {"start_row": 0, "start_col": 0, "end_row": 1, "end_col": 2, "range_str": "A1:C2"},
            {"start_row": 3, "start_col": 1, "end_row": 4, "end_col": 1}
        ],
        "named_ranges": {"left_top": "A1:B2"},
        "template_type": "preset",
        "preset_template": "array-2d",
        "template_direction": "column",
        "window_geometry": [10, 20]
    }"#;

    #[test]
    fn test_parse_saved_project() {
        let config: ProjectConfig = serde_json::from_str(SAVED).unwrap();

        assert_eq!(config.excel_files.len(), 2);
        assert_eq!(config.selected_sheet.as_deref(), Some("Sheet1"));
        assert_eq!(config.template_type, TemplateType::Preset);
        assert_eq!(config.template_direction, Some(Direction::Column));
        assert_eq!(config.selected_ranges[1].range_str, "");
    }

    #[test]
    fn test_all_fields_optional() {
        let config: ProjectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.template().unwrap(), "");
    }

    #[test]
    fn test_catalog() {
        let config: ProjectConfig = serde_json::from_str(SAVED).unwrap();
        let catalog = config.catalog().unwrap();

        assert_eq!(catalog.ranges().len(), 2);
        assert_eq!(catalog.nth(1).unwrap().label, "A1:C2");
        // Label derived from indices when range_str is missing
        assert_eq!(catalog.nth(2).unwrap().label, "B4:B5");
        assert_eq!(catalog.by_name("left_top").unwrap().col_count(), 2);
    }

    #[test]
    fn test_catalog_rejects_inverted_range() {
        let config = ProjectConfig {
            selected_ranges: vec![SelectedRange {
                start_row: 5,
                end_row: 1,
                ..SelectedRange::default()
            }],
            ..ProjectConfig::default()
        };
        assert!(matches!(config.catalog(), Err(Error::Core(_))));
    }

    #[test]
    fn test_catalog_rejects_bad_named_notation() {
        let mut config = ProjectConfig::default();
        config.named_ranges.insert("bad".into(), "A1".into());
        assert!(config.catalog().is_err());
    }

    #[test]
    fn test_template_sources() {
        let mut config = ProjectConfig::default();
        config.set_preset("array-init");
        assert!(config.template().unwrap().contains("{{VALUE}}"));

        config.set_preset("no-such-preset");
        assert!(matches!(config.template(), Err(Error::UnknownPreset(name)) if name == "no-such-preset"));

        // Unknown preset falls back to the custom text
        config.code_template = Some("{{ROW_COUNT}}".into());
        assert_eq!(config.template().unwrap(), "{{ROW_COUNT}}");

        config.set_code_template("x");
        assert_eq!(config.template().unwrap(), "x");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");

        let mut config: ProjectConfig = serde_json::from_str(SAVED).unwrap();
        config.save(&path).unwrap();
        let loaded = ProjectConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        config.resolve_paths(dir.path());
        assert_eq!(config.excel_files[0], dir.path().join("a.csv"));
        assert_eq!(config.excel_files[1], PathBuf::from("/abs/b.csv"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(ProjectConfig::load(&missing), Err(Error::Io { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(ProjectConfig::load(&broken), Err(Error::Json(_))));
    }

    #[test]
    fn test_selected_range_from_spec() {
        let range = RangeSpec::parse("C3:D9").unwrap();
        let selected = SelectedRange::from(&range);
        assert_eq!(selected.to_range().unwrap(), range);
    }
}

//! End-to-end generation from CSV files and project files

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use sheetgen::prelude::*;
use sheetgen::{presets, Severity};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// Test a preset project saved next to its data
#[test]
fn test_project_file_with_preset() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "data.csv", "1,2,3\n4,5,6\n");
    write(
        dir.path(),
        "project.json",
        r#"{
            "excel_files": ["data.csv"],
            "selected_ranges": [
                {"start_row": 0, "start_col": 0, "end_row": 1, "end_col": 2, "range_str": "A1:C2"}
            ],
            "template_type": "preset",
            "preset_template": "array-2d"
        }"#,
    );

    let project = Project::from_file(dir.path().join("project.json")).unwrap();
    let generated = project.generate().unwrap();

    let expected = "// Two-dimensional array
#define ROW_COUNT 2
#define COL_COUNT 3

unsigned int table[ROW_COUNT][COL_COUNT] = {

    { 1, 2, 3 },
    { 4, 5, 6 }
};";
    assert_eq!(generated.text, expected);
    assert!(generated.diagnostics.is_empty());
    assert_eq!(generated.layout, Layout::Standard);
}

/// Test a three-dimensional array over two files
#[test]
fn test_files_loop_over_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "1,2\n3,4\n");
    write(dir.path(), "b.csv", "5,6\n7,8\n");

    let mut config = ProjectConfig::default();
    config.excel_files = vec![dir.path().join("a.csv"), dir.path().join("b.csv")];
    config.selected_ranges.push(SelectedRange::from(&RangeSpec::parse("A1:B2").unwrap()));
    config.set_preset("array-3d");

    let generated = Project::open(config).unwrap().generate().unwrap();
    let text = &generated.text;

    assert_eq!(generated.layout, Layout::ThreeD);
    assert!(text.contains("#define FILE_COUNT 2"), "{}", text);
    assert!(text.contains("// file: a.csv"), "{}", text);
    assert!(text.contains("// file: b.csv"), "{}", text);
    assert!(text.contains("        { 5, 6 },\n        { 7, 8 }\n"), "{}", text);
    // The last file's block loses its trailing comma
    assert!(text.ends_with("    }\n\n};"), "{}", text);
}

/// Test that a file listed twice is visited twice
#[test]
fn test_repeated_data_file() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "1,2\n3,4\n");

    let mut config = ProjectConfig::default();
    config.excel_files = vec![dir.path().join("a.csv"), dir.path().join("a.csv")];
    config.selected_ranges.push(SelectedRange::from(&RangeSpec::parse("A1:B1").unwrap()));
    config.set_preset("array-3d");

    let project = Project::open(config).unwrap();
    let generated = project.generate().unwrap();
    let text = &generated.text;

    assert_eq!(project.tables().len(), 2);
    assert!(text.contains("#define FILE_COUNT 2"), "{}", text);
    assert_eq!(text.matches("// file: a.csv").count(), 2, "{}", text);
    assert!(!generated.diagnostics.has_errors(), "{:?}", generated.diagnostics);
}

/// Test named ranges and single-cell lookups
#[test]
fn test_named_ranges_preset() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "grid.csv", "1,2,3\n4,5,6\n");

    let mut config = ProjectConfig::default();
    config.excel_files = vec![dir.path().join("grid.csv")];
    config.named_ranges.insert("left_top".into(), "A1:B1".into());
    config.named_ranges.insert("right_top".into(), "C1:C2".into());
    config.set_preset("named-ranges");

    let generated = Project::open(config).unwrap().generate().unwrap();
    let text = &generated.text;

    assert!(generated.diagnostics.is_empty(), "{:?}", generated.diagnostics);
    assert!(text.contains("#define LEFT_TOP_ROWS 1\n#define LEFT_TOP_COLS 2"), "{}", text);
    assert!(text.contains("// left_top (A1:B1)"), "{}", text);
    // The separator lands after the trailing line comment
    assert!(text.contains("    { 3 },  // row 0,\n    { 6 },  // row 1\n};"), "{}", text);
    assert!(text.contains("int right_top_first_value = 3;"), "{}", text);
}

/// Test that a range larger than the data is clipped with a warning
#[test]
fn test_range_larger_than_data() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "small.csv", "1,2\n3,4\n");

    let mut config = ProjectConfig::default();
    config.excel_files = vec![dir.path().join("small.csv")];
    config.selected_ranges.push(SelectedRange::from(&RangeSpec::parse("A1:D5").unwrap()));
    config.set_code_template("{{LOOP_START}}{{ALL_COLUMNS}};{{LOOP_END}}");

    let generated = Project::open(config).unwrap().generate().unwrap();

    assert_eq!(generated.text, "1, 2;,3, 4;,");
    assert_eq!(generated.diagnostics.count(DiagnosticKind::OutOfBounds), 1);
    assert!(!generated.diagnostics.has_errors());
}

/// Test quoted and textual CSV cells
#[test]
fn test_text_cells_are_quoted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "names.csv", "alpha,\"7\"\n\"say \"\"hi\"\"\",2.50\n");

    let mut config = ProjectConfig::default();
    config.excel_files = vec![dir.path().join("names.csv")];
    config.selected_ranges.push(SelectedRange::from(&RangeSpec::parse("A1:B2").unwrap()));
    config.set_code_template("{{LOOP_START}}{{ALL_COLUMNS}}\n{{LOOP_END}}");

    let generated = Project::open(config).unwrap().generate().unwrap();

    assert_eq!(generated.text, "\"alpha\", 7,\"say \\\"hi\\\"\", 2.5,");
}

/// Test that every preset expands without errors on a realistic project
#[test]
fn test_all_presets_expand() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.csv", "1,2,3,4\n5,6,7,8\n9,10,11,12\n");
    write(dir.path(), "two.csv", "13,14,15,16\n17,18,19,20\n21,22,23,24\n");

    let mut base = ProjectConfig::default();
    base.excel_files = vec![dir.path().join("one.csv"), dir.path().join("two.csv")];
    for notation in ["A1:B2", "C2:D3"] {
        base.selected_ranges.push(SelectedRange::from(&RangeSpec::parse(notation).unwrap()));
    }
    base.named_ranges.insert("left_top".into(), "A1:B2".into());
    base.named_ranges.insert("right_top".into(), "C1:D2".into());

    for preset in presets::all() {
        let mut config = base.clone();
        config.set_preset(preset.name);

        let generated = Project::open(config).unwrap().generate().unwrap();
        let errors: Vec<_> = generated
            .diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .collect();

        assert!(errors.is_empty(), "{}: {:?}", preset.name, errors);
        assert!(!generated.text.contains("_LOOP_START}}"), "{}", preset.name);
    }
}

/// Test that a missing data file is an error, not a diagnostic
#[test]
fn test_missing_data_file() {
    let mut config = ProjectConfig::default();
    config.excel_files = vec!["/no/such/dir/data.csv".into()];

    let err = Project::open(config).unwrap_err();
    assert!(matches!(err, Error::Csv(_)));
    assert!(err.to_string().contains("data.csv"));
}

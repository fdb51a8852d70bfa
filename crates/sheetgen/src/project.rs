//! Loaded projects

use std::path::Path;

use sheetgen_core::{DataSource, RangeCatalog, TableSet};
use sheetgen_csv::{CsvReadOptions, CsvReader};
use sheetgen_template::{generate, Direction, Generated, GenerationRequest, Validation};

use crate::config::ProjectConfig;
use crate::error::Result;

/// A project with its data files loaded and ranges resolved
#[derive(Debug, Clone)]
pub struct Project {
    config: ProjectConfig,
    tables: TableSet,
    catalog: RangeCatalog,
}

impl Project {
    /// Load every data file of `config` and build its range catalog
    pub fn open(config: ProjectConfig) -> Result<Self> {
        Self::open_with_options(config, &CsvReadOptions::default())
    }

    /// Like [`Project::open`], with explicit CSV options
    pub fn open_with_options(config: ProjectConfig, options: &CsvReadOptions) -> Result<Self> {
        let catalog = config.catalog()?;
        let tables = CsvReader::read_files(&config.excel_files, options)?;
        if let Some(sheet) = &config.selected_sheet {
            tracing::debug!(sheet = %sheet, "ignoring sheet selection for csv input");
        }

        Ok(Self {
            config,
            tables,
            catalog,
        })
    }

    /// Load a project file, resolving data files relative to it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = ProjectConfig::load(path)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Self::open(config)
    }

    /// Build a project from tables that are already in memory
    pub fn from_tables(config: ProjectConfig, tables: TableSet) -> Result<Self> {
        let catalog = config.catalog()?;
        Ok(Self {
            config,
            tables,
            catalog,
        })
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn tables(&self) -> &TableSet {
        &self.tables
    }

    pub fn catalog(&self) -> &RangeCatalog {
        &self.catalog
    }

    /// Expand the project's own template
    pub fn generate(&self) -> Result<Generated> {
        let template = self.config.template()?;
        Ok(self.generate_template(&template))
    }

    /// Expand `template` against the project's data and ranges
    pub fn generate_template(&self, template: &str) -> Generated {
        let source: &dyn DataSource = &self.tables;
        let mut request = GenerationRequest::new(template, source, &self.catalog)
            .with_files(self.tables.files());
        if let Some(direction) = self.default_direction() {
            request = request.with_default_direction(direction);
        }
        generate(&request)
    }

    /// Check the project's template against its ranges
    pub fn validate(&self) -> Result<Validation> {
        let template = self.config.template()?;
        Ok(sheetgen_template::validate(&template, &self.catalog))
    }

    fn default_direction(&self) -> Option<Direction> {
        self.config.template_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectedRange;
    use pretty_assertions::assert_eq;
    use sheetgen_core::{CellValue, DataTable};

    fn tables() -> TableSet {
        let mut set = TableSet::new();
        set.insert(
            "dir/one.csv",
            DataTable::from_rows(vec![
                vec![CellValue::from(1), CellValue::from(2)],
                vec![CellValue::from(3), CellValue::from(4)],
            ]),
        );
        set
    }

    fn config(template: &str) -> ProjectConfig {
        let mut config = ProjectConfig {
            selected_ranges: vec![SelectedRange::from(
                &sheetgen_core::RangeSpec::parse("A1:B2").unwrap(),
            )],
            ..ProjectConfig::default()
        };
        config.set_code_template(template);
        config
    }

    #[test]
    fn test_generate_from_tables() {
        let project =
            Project::from_tables(config("{{LOOP_START}}{{ALL_COLUMNS}};{{LOOP_END}}"), tables())
                .unwrap();
        let generated = project.generate().unwrap();

        assert_eq!(generated.text, "1, 2;,3, 4;,");
        assert!(generated.diagnostics.is_empty());
    }

    #[test]
    fn test_direction_from_config() {
        let mut cfg = config("{{LOOP_START}}{{ALL_ROWS}}|{{LOOP_END}}");
        cfg.template_direction = Some(Direction::Column);
        let project = Project::from_tables(cfg, tables()).unwrap();

        assert_eq!(project.generate().unwrap().text, "1, 3|,2, 4|,");
    }

    #[test]
    fn test_file_name_is_basename() {
        let template = "{{FILE_COUNT}} {{FILES_LOOP_START}}{{FILE_NAME}}{{FILES_LOOP_END}}";
        let project = Project::from_tables(config(template), tables()).unwrap();
        assert_eq!(project.generate().unwrap().text, "1 one.csv");
    }

    #[test]
    fn test_validate() {
        let project = Project::from_tables(config("{{VALUE}} {{NOPE}}"), tables()).unwrap();
        let validation = project.validate().unwrap();

        assert!(!validation.is_ok());
        assert_eq!(validation.unsupported, vec!["{{NOPE}}".to_string()]);
    }
}

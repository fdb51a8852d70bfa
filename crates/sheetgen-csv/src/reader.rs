//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use sheetgen_core::{CellValue, DataSource, DataTable, TableSet};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a table
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<DataTable> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CsvError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::read(file, options)?;
        tracing::debug!(
            path = %path.display(),
            rows = table.row_count(),
            cols = table.col_count(),
            "loaded csv"
        );
        Ok(table)
    }

    /// Read several CSV files, keyed by the path as given
    ///
    /// The returned set keeps the order of `paths`. A path given twice is
    /// listed twice but read once.
    pub fn read_files<I, P>(paths: I, options: &CsvReadOptions) -> CsvResult<TableSet>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = TableSet::new();
        for path in paths {
            let path = path.as_ref();
            let key = path.to_string_lossy().into_owned();
            let table = match set.table(&key) {
                Some(table) => table.clone(),
                None => Self::read_file(path, options)?,
            };
            set.insert(key, table);
        }
        Ok(set)
    }

    /// Read CSV from a reader into a table
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<DataTable> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;

            let row = record
                .iter()
                .map(|field| {
                    if options.auto_detect_types {
                        Self::detect_type(field)
                    } else if field.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::from(field)
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(DataTable::from_rows(rows))
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        // Try number; reject spellings like "inf" and "NaN" that f64 accepts
        if trimmed.bytes().any(|b| b.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<f64>() {
                if n.is_finite() {
                    return CellValue::Number(n);
                }
            }
        }

        // Default to string
        CellValue::from(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_read_detects_numbers() {
        let data = "1,2.5,abc\n,-3, 4 \n";
        let table = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 3);
        assert_eq!(table.get(0, 0), Some(&CellValue::Number(1.0)));
        assert_eq!(table.get(0, 1), Some(&CellValue::Number(2.5)));
        assert_eq!(table.get(0, 2), Some(&CellValue::from("abc")));
        assert_eq!(table.get(1, 0), Some(&CellValue::Empty));
        assert_eq!(table.get(1, 1), Some(&CellValue::Number(-3.0)));
        assert_eq!(table.get(1, 2), Some(&CellValue::Number(4.0)));
    }

    #[test]
    fn test_read_keeps_text_when_asked() {
        let options = CsvReadOptions {
            auto_detect_types: false,
            ..CsvReadOptions::default()
        };
        let table = CsvReader::read("1,,x".as_bytes(), &options).unwrap();

        assert_eq!(table.get(0, 0), Some(&CellValue::from("1")));
        assert_eq!(table.get(0, 1), Some(&CellValue::Empty));
    }

    #[test]
    fn test_special_float_spellings_stay_text() {
        let table = CsvReader::read("inf,NaN,1e3".as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(table.get(0, 0), Some(&CellValue::from("inf")));
        assert_eq!(table.get(0, 1), Some(&CellValue::from("NaN")));
        assert_eq!(table.get(0, 2), Some(&CellValue::Number(1000.0)));
    }

    #[test]
    fn test_header_and_ragged_rows() {
        let options = CsvReadOptions {
            has_header: true,
            ..CsvReadOptions::default()
        };
        let table = CsvReader::read("a,b,c\n1\n2,3,4,5\n".as_bytes(), &options).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.col_count(), 4);
        assert_eq!(table.get(0, 1), Some(&CellValue::Empty));
        assert_eq!(table.get(1, 3), Some(&CellValue::Number(5.0)));
    }

    #[test]
    fn test_tsv() {
        let table = CsvReader::read("1\t2\n".as_bytes(), &CsvReadOptions::tsv()).unwrap();
        assert_eq!(table.col_count(), 2);
    }

    #[test]
    fn test_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.csv");
        let second = dir.path().join("second.csv");
        std::fs::File::create(&first)
            .unwrap()
            .write_all(b"1,2\n3,4\n")
            .unwrap();
        std::fs::write(&second, "5\n").unwrap();

        let set = CsvReader::read_files([&first, &second], &CsvReadOptions::default()).unwrap();
        let files = set.files().to_vec();

        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("first.csv"));
        assert_eq!(set.table(&files[1]).unwrap().row_count(), 1);
    }

    #[test]
    fn test_read_files_lists_repeated_path() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.csv");
        std::fs::write(&data, "1,2\n").unwrap();

        let set = CsvReader::read_files([&data, &data], &CsvReadOptions::default()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.files()[0], set.files()[1]);
        assert_eq!(set.table(&set.files()[1]).unwrap().col_count(), 2);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = CsvReader::read_file("/definitely/not/here.csv", &CsvReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, CsvError::File { .. }));
        assert!(err.to_string().contains("here.csv"));
    }
}

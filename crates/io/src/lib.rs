// File and database I/O for the well tagger

use std::path::Path;

use welltag_recon::{ReconError, Table};

pub mod csv;
pub mod registry;
pub mod xlsx;

pub use registry::{open_registry, CsvRegistry, SqliteRegistry};

/// Table file formats accepted for input and produced for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// Format from the file extension; `None` for anything unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    fn require(path: &Path) -> Result<Self, ReconError> {
        Self::from_path(path).ok_or_else(|| {
            ReconError::Io(format!(
                "{}: unsupported file type (expected .csv or .xlsx)",
                path.display()
            ))
        })
    }
}

pub fn read_table(path: &Path) -> Result<Table, ReconError> {
    match TableFormat::require(path)? {
        TableFormat::Csv => csv::import(path),
        TableFormat::Xlsx => xlsx::import(path),
    }
}

/// Write a table in the format named by the path's extension.
pub fn write_table(table: &Table, path: &Path) -> Result<(), ReconError> {
    match TableFormat::require(path)? {
        TableFormat::Csv => csv::export(table, path),
        TableFormat::Xlsx => xlsx::export(table, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("a.CSV")), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path(Path::new("dir/b.xlsx")), Some(TableFormat::Xlsx));
        assert_eq!(TableFormat::from_path(Path::new("c.txt")), None);
        assert_eq!(TableFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn every_csv_row_is_tagged() {
        use welltag_recon::config::WellNameConfig;
        use welltag_recon::{process_table, CanonicalIndex, ReconConfig};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wells.csv");
        std::fs::write(
            &path,
            "Property,Operator,County,State,RRC\nSMITH #1,ACME,REEVES,TX,100\n,,,,\nJONES #2,BETA,WARD,TX,200\n",
        )
        .unwrap();

        let input = read_table(&path).unwrap();
        let index = CanonicalIndex::from_wells(Vec::new(), &WellNameConfig::default());
        let (output, result) = process_table(&ReconConfig::default(), &index, &input).unwrap();
        assert_eq!(output.len(), 3);
        assert_eq!(result.summary.total_records, 3);

        let notes = output.column("Notes").unwrap();
        assert_eq!(output.rows[1][notes], "No match found in DB Browser");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = read_table(Path::new("input.txt")).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));
    }
}

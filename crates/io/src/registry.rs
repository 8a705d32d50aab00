// Canonical well registry sources: SQLite database or CSV export

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use welltag_recon::config::RegistryConfig;
use welltag_recon::model::CanonicalWell;
use welltag_recon::table::wells_from_table;
use welltag_recon::{ReconError, RegistrySource, Table};

/// Registry table in a SQLite database, opened read-only.
#[derive(Debug, Clone)]
pub struct SqliteRegistry {
    path: PathBuf,
}

impl SqliteRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> ReconError {
        ReconError::SourceUnavailable(format!("{}: {reason}", self.path.display()))
    }

    fn load_table(&self, table: &str) -> Result<Table, ReconError> {
        if !self.path.is_file() {
            return Err(self.unavailable("no such database file"));
        }
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.unavailable(e))?;

        let query = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
        let mut stmt = conn.prepare(&query).map_err(|e| self.unavailable(e))?;
        let headers: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = headers.len();

        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|i| row.get_ref(i).map(value_text))
                    .collect::<Result<Vec<String>, _>>()
            })
            .map_err(|e| self.unavailable(e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.unavailable(e))?;

        Ok(Table { headers, rows })
    }
}

/// SQLite value as text; whole-number reals render without a fraction.
fn value_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", n as i64)
            } else {
                format!("{}", n)
            }
        }
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

impl RegistrySource for SqliteRegistry {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn load_wells(&self, registry: &RegistryConfig) -> Result<Vec<CanonicalWell>, ReconError> {
        let table = self.load_table(&registry.table)?;
        wells_from_table(&table, &registry.columns)
    }
}

/// Registry exported to CSV with the configured column names.
#[derive(Debug, Clone)]
pub struct CsvRegistry {
    path: PathBuf,
}

impl CsvRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RegistrySource for CsvRegistry {
    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }

    fn load_wells(&self, registry: &RegistryConfig) -> Result<Vec<CanonicalWell>, ReconError> {
        let table = crate::csv::import(&self.path).map_err(|e| match e {
            ReconError::Io(reason) => ReconError::SourceUnavailable(reason),
            other => other,
        })?;
        wells_from_table(&table, &registry.columns)
    }
}

/// Pick a registry source from the file extension: `.csv` is a CSV export,
/// anything else is treated as a SQLite database.
pub fn open_registry(path: &Path) -> Box<dyn RegistrySource> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        Box::new(CsvRegistry::new(path))
    } else {
        Box::new(SqliteRegistry::new(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use welltag_recon::{CanonicalIndex, ReconConfig};

    fn create_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE wells (
                id INTEGER PRIMARY KEY,
                api10 TEXT,
                api14 TEXT,
                rrc REAL,
                well_name TEXT,
                well_number TEXT,
                lease_name TEXT,
                operator TEXT,
                county TEXT,
                state TEXT,
                well_status TEXT
            );
            INSERT INTO wells VALUES (1, '4238930001', NULL, 12345.0, 'SMITH GAS UNIT', '1', 'SMITH LEASE', 'ACME', 'REEVES', 'TX', 'ACTIVE');
            INSERT INTO wells VALUES (2, '4238930002', NULL, 12345.0, 'SMITH GAS UNIT', '2', NULL, 'ACME', 'REEVES', 'TX', 'ACTIVE');
            "#,
        )
        .unwrap();
    }

    #[test]
    fn loads_wells_from_sqlite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.db");
        create_db(&path);

        let source = SqliteRegistry::new(&path);
        let wells = source.load_wells(&RegistryConfig::default()).unwrap();
        assert_eq!(wells.len(), 2);
        assert_eq!(wells[0].well_id, "1");
        assert_eq!(wells[0].registry_number.as_deref(), Some("12345"));
        assert_eq!(wells[0].api14, None);
        assert_eq!(wells[1].lease_name, None);

        let index = CanonicalIndex::build(&source, &ReconConfig::default()).unwrap();
        assert_eq!(index.lookup_composite("SMITH GU 2", "12345"), &[1]);
    }

    #[test]
    fn missing_database_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.db");
        let err = SqliteRegistry::new(&path)
            .load_wells(&RegistryConfig::default())
            .unwrap_err();
        assert!(matches!(err, ReconError::SourceUnavailable(_)));
        assert!(!path.exists(), "read-only open must not create the file");
    }

    #[test]
    fn missing_table_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.db");
        create_db(&path);
        let registry = RegistryConfig {
            table: "nope".into(),
            ..RegistryConfig::default()
        };
        let err = SqliteRegistry::new(&path).load_wells(&registry).unwrap_err();
        assert!(matches!(err, ReconError::SourceUnavailable(_)));
    }

    #[test]
    fn csv_registry_and_source_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("registry.CSV");
        std::fs::write(&path, "id,rrc,well_name,well_number\n7,#555,ROGERS,7\n").unwrap();

        let source = open_registry(&path);
        assert!(source.describe().starts_with("csv:"));
        let wells = source.load_wells(&RegistryConfig::default()).unwrap();
        assert_eq!(wells[0].registry_number.as_deref(), Some("#555"));

        let missing = CsvRegistry::new(dir.path().join("gone.csv"));
        assert!(matches!(
            missing.load_wells(&RegistryConfig::default()),
            Err(ReconError::SourceUnavailable(_))
        ));

        assert!(open_registry(Path::new("wells.sqlite")).describe().starts_with("sqlite:"));
    }
}

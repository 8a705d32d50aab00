// Excel import (xlsx, xls, xlsb, ods: first sheet) and export (xlsx only)
//
// Import flattens every cell to text; the first row is the header row.
// Export writes a single plain sheet with a bold header row.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use welltag_recon::{ReconError, Table};

/// Name of the sheet written on export.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

pub fn import(path: &Path) -> Result<Table, ReconError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| ReconError::Io(format!("Failed to open Excel file {}: {e}", path.display())))?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(ReconError::Io(format!("{} contains no sheets", path.display())));
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ReconError::Io(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();

    let mut table = Table::new(headers);
    // Blank rows inside the used range are records like any other.
    for row in rows {
        table.rows.push(row.iter().map(cell_text).collect());
    }

    log::debug!(
        "read {} rows from sheet '{sheet_name}' of {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Cell as text. Integral floats drop their fractional part so registry
/// numbers typed as numbers read back as `12345`, not `12345.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

pub fn export(table: &Table, path: &Path) -> Result<(), ReconError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| ReconError::Io(format!("{}: {e}", path.display()));

    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook
        .add_worksheet()
        .set_name(EXPORT_SHEET_NAME)
        .map_err(xlsx_err)?;

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, column_index(col)?, header, &header_format)
            .map_err(xlsx_err)?;
    }

    for (row_idx, row) in table.rows.iter().enumerate() {
        let row32 = u32::try_from(row_idx + 1)
            .map_err(|_| ReconError::Io(format!("{}: too many rows for xlsx", path.display())))?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row32, column_index(col)?, value)
                .map_err(xlsx_err)?;
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

fn column_index(col: usize) -> Result<u16, ReconError> {
    u16::try_from(col).map_err(|_| ReconError::Io(format!("column {col} out of range for xlsx")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            headers: vec!["Property".into(), "RRC".into(), "Notes".into()],
            rows: vec![
                vec!["SMITH #1".into(), "12345".into(), "Well matched in DI".into()],
                vec!["JONES #2".into(), String::new(), "No match found in DB Browser".into()],
            ],
        }
    }

    #[test]
    fn export_then_import_keeps_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagged.xlsx");
        export(&sample(), &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 100);

        let table = import(&path).unwrap();
        assert_eq!(table.headers, sample().headers);
        assert_eq!(table.rows[0], sample().rows[0]);
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), Some("No match found in DB Browser"));
    }

    #[test]
    fn numeric_cells_read_as_integers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numbers.xlsx");

        let mut workbook = XlsxWorkbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "RRC").unwrap();
        sheet.write_number(1, 0, 12345.0).unwrap();
        sheet.write_number(2, 0, 1.5).unwrap();
        workbook.save(&path).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.rows[0][0], "12345");
        assert_eq!(table.rows[1][0], "1.5");
    }

    #[test]
    fn blank_rows_inside_sheet_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaps.xlsx");

        let mut workbook = XlsxWorkbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Property").unwrap();
        sheet.write_string(0, 1, "RRC").unwrap();
        sheet.write_string(1, 0, "SMITH #1").unwrap();
        sheet.write_string(3, 0, "JONES #2").unwrap();
        workbook.save(&path).unwrap();

        let table = import(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(1, 0), None);
        assert_eq!(table.cell(2, 0), Some("JONES #2"));
    }

    #[test]
    fn unreadable_workbook_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(import(&path), Err(ReconError::Io(_))));
    }
}

// CSV import/export for input and output tables

use std::io::Read;
use std::path::Path;

use welltag_recon::{ReconError, Table};

/// Read a CSV file with a header row.
pub fn import(path: &Path) -> Result<Table, ReconError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

/// Lines read when guessing the delimiter, header included.
const SNIFF_LINES: usize = 10;

/// Delimiters seen in analyst exports: comma, `;` from Excel under a
/// European locale, tab from copy-paste, `|` from registry dumps.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Guess the delimiter of an analyst export.
///
/// The header row fixes the expected width under each candidate. The
/// candidate whose data rows agree with that width most often wins, then
/// the wider header; comma on a full tie. A comma inside an operator name
/// (`ACME, INC`) never changes the header width under `;`.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().take(SNIFF_LINES).collect();
    let Some((header, body)) = sample.split_first() else {
        return b',';
    };

    DELIMITERS
        .into_iter()
        .rev()
        .filter_map(|delim| {
            let width = field_count(header, delim);
            (width > 1).then(|| {
                let agreeing = body.iter().filter(|line| field_count(line, delim) == width).count();
                (agreeing, width, delim)
            })
        })
        .max_by_key(|&(agreeing, width, _)| (agreeing, width))
        .map_or(b',', |(_, _, delim)| delim)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |r| r.len())
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, ReconError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;

    match String::from_utf8(bytes) {
        Ok(s) => {
            if let Some(rest) = s.strip_prefix('\u{feff}') {
                return Ok(rest.to_string());
            }
            Ok(s)
        }
        Err(e) => {
            let bytes = e.into_bytes();
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn import_from_string(content: &str, delimiter: u8) -> Result<Table, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ReconError::Io(e.to_string()))?
        .iter()
        .map(String::from)
        .collect();
    let mut table = Table::new(headers);

    // A row of empty fields (`,,,,`) is still a record and gets tagged.
    // Only lines with no fields at all are skipped by the reader.
    for result in reader.records() {
        let record = result.map_err(|e| ReconError::Io(e.to_string()))?;
        table.rows.push(record.iter().map(String::from).collect());
    }

    Ok(table)
}

pub fn export(table: &Table, path: &Path) -> Result<(), ReconError> {
    let io_err = |e: csv::Error| ReconError::Io(format!("{}: {e}", path.display()));
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(io_err)?;

    writer.write_record(&table.headers).map_err(io_err)?;
    for row in &table.rows {
        writer.write_record(row).map_err(io_err)?;
    }

    writer
        .flush()
        .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
    Ok(())
}

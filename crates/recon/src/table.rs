//! In-memory tabular data shared by the engine and its file/database loaders.
//!
//! A [`Table`] is a header row plus string cells; a blank cell is an absent
//! value. Loaders in `welltag-io` produce tables, the functions here turn them
//! into engine records and turn results back into an output table.

use std::collections::HashMap;

use crate::config::{InputColumns, RegistryColumns};
use crate::error::ReconError;
use crate::model::{CanonicalWell, InputRecord, MatchResult};
use crate::tokenize::normalize_registry_number;

pub const COL_WELL_ID: &str = "Well ID";
pub const COL_API10: &str = "API10";
pub const COL_API14: &str = "API14";
pub const COL_WELL_STATUS: &str = "Well Status";
pub const COL_WELL_NAME: &str = "DI Well Name";
pub const COL_WELL_NUMBER: &str = "DI Well Number";
pub const COL_LEASE_NAME: &str = "Lease Name";
pub const COL_OPERATOR: &str = "DI Operator Name";
pub const COL_WELL_NAME_NUMBER: &str = "Well Name & Number";
pub const COL_NOTES: &str = "Notes";

/// Output columns appended after the input columns, in order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    COL_WELL_ID,
    COL_API10,
    COL_API14,
    COL_WELL_STATUS,
    COL_WELL_NAME,
    COL_WELL_NUMBER,
    COL_LEASE_NAME,
    COL_OPERATOR,
    COL_WELL_NAME_NUMBER,
    COL_NOTES,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Position of a header, matched after trimming.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    /// Cell value, `None` when blank or past the end of a short row.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn require(table: &Table, source_name: &str, column: &str) -> Result<usize, ReconError> {
    table.column(column).ok_or_else(|| ReconError::MissingColumn {
        source_name: source_name.to_string(),
        column: column.to_string(),
    })
}

/// Build input records from an analyst table. Every configured input column
/// must exist; individual cells may be blank.
pub fn records_from_table(table: &Table, columns: &InputColumns) -> Result<Vec<InputRecord>, ReconError> {
    let property = require(table, "input", &columns.property)?;
    let operator = require(table, "input", &columns.operator)?;
    let county = require(table, "input", &columns.county)?;
    let state = require(table, "input", &columns.state)?;
    let registry = require(table, "input", &columns.registry_number)?;

    let owned = |row: usize, col: usize| table.cell(row, col).map(String::from);

    Ok((0..table.len())
        .map(|row| InputRecord {
            row,
            property_text: owned(row, property),
            operator_name: owned(row, operator),
            county: owned(row, county),
            state: owned(row, state),
            registry_number: table.cell(row, registry).and_then(normalize_registry_number),
        })
        .collect())
}

/// Build canonical wells from a registry table. The well id and registry
/// number columns are required; any other missing column reads as absent.
/// Rows without a well id are skipped.
pub fn wells_from_table(table: &Table, columns: &RegistryColumns) -> Result<Vec<CanonicalWell>, ReconError> {
    let well_id = require(table, "registry", &columns.well_id)?;
    let registry = require(table, "registry", &columns.registry_number)?;

    let optional = |name: &str| {
        let idx = table.column(name);
        if idx.is_none() {
            log::debug!("registry has no '{name}' column; treating as absent");
        }
        idx
    };
    let api10 = optional(columns.api10.as_str());
    let api14 = optional(columns.api14.as_str());
    let well_name = optional(columns.well_name.as_str());
    let well_number = optional(columns.well_number.as_str());
    let lease_name = optional(columns.lease_name.as_str());
    let operator = optional(columns.operator.as_str());
    let county = optional(columns.county.as_str());
    let state = optional(columns.state.as_str());
    let status = optional(columns.status.as_str());

    let get = |row: usize, col: Option<usize>| col.and_then(|c| table.cell(row, c)).map(String::from);

    let mut wells = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for row in 0..table.len() {
        let Some(id) = table.cell(row, well_id) else {
            skipped += 1;
            continue;
        };
        wells.push(CanonicalWell {
            well_id: id.to_string(),
            api10: get(row, api10),
            api14: get(row, api14),
            registry_number: get(row, Some(registry)),
            well_name: get(row, well_name),
            well_number: get(row, well_number),
            lease_name: get(row, lease_name),
            operator_name: get(row, operator),
            county: get(row, county),
            state: get(row, state),
            status: get(row, status),
        });
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} registry rows without a well id");
    }
    Ok(wells)
}

/// Attach results to the input table.
///
/// Input columns are kept in order with the registry-number column holding
/// the normalized value; the output columns follow. An output column already
/// present in the input (a re-tagged file) is overwritten in place.
pub fn results_to_table(input: &Table, columns: &InputColumns, results: &[MatchResult]) -> Table {
    let mut headers = input.headers.clone();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for name in OUTPUT_COLUMNS {
        let pos = match input.column(name) {
            Some(pos) => pos,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        };
        positions.insert(name, pos);
    }
    let registry_col = input.column(&columns.registry_number);

    let by_row: HashMap<usize, &MatchResult> = results.iter().map(|r| (r.row, r)).collect();

    let rows = input
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let mut out = cells.clone();
            out.resize(headers.len(), String::new());

            let Some(result) = by_row.get(&row) else {
                return out;
            };
            if let Some(col) = registry_col {
                out[col] = result.registry_number.clone().unwrap_or_default();
            }

            let mut set = |name: &str, value: Option<String>| {
                out[positions[name]] = value.unwrap_or_default();
            };
            match &result.canonical {
                Some(attrs) => {
                    set(COL_WELL_ID, attrs.well_id.joined());
                    set(COL_API10, attrs.api10.joined());
                    set(COL_API14, attrs.api14.joined());
                    set(COL_WELL_STATUS, attrs.status.joined());
                    set(COL_WELL_NAME, attrs.well_name.joined());
                    set(COL_WELL_NUMBER, attrs.well_number.joined());
                    set(COL_LEASE_NAME, attrs.lease_name.joined());
                    set(COL_OPERATOR, attrs.operator_name.joined());
                    set(COL_WELL_NAME_NUMBER, attrs.well_name_number.joined());
                }
                None => {
                    for name in &OUTPUT_COLUMNS[..OUTPUT_COLUMNS.len() - 1] {
                        set(*name, None);
                    }
                }
            }
            set(COL_NOTES, Some(result.notes.to_string()));
            out
        })
        .collect();

    Table { headers, rows }
}

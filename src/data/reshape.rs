//! Wide-to-long reshaping.

use super::model::{RawRecord, WideTable, DEFAULT_STATE};

/// One cell of the wide table, addressed by its row and month header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeltedCell<'a> {
    pub record: &'a RawRecord,
    /// Index into [`WideTable::month_headers`].
    pub column: usize,
    pub header: &'a str,
    pub value: Option<f64>,
}

/// Pivot every month column into one row per (region, month).
///
/// Produces exactly `records × month_headers` cells in row-major order;
/// short rows contribute `None` for their missing tail.
pub fn melt(table: &WideTable) -> Vec<MeltedCell<'_>> {
    let mut out = Vec::with_capacity(table.records.len() * table.month_headers.len());
    for record in &table.records {
        for (column, header) in table.month_headers.iter().enumerate() {
            out.push(MeltedCell {
                record,
                column,
                header,
                value: record.cells.get(column).copied().flatten(),
            });
        }
    }
    out
}

/// State for a record: the `StateName` field when filled, else the token
/// after the last comma of the region name, else [`DEFAULT_STATE`].
pub fn derive_state(region_name: &str, state_field: Option<&str>) -> String {
    if let Some(state) = state_field.map(str::trim).filter(|s| !s.is_empty()) {
        return state.to_string();
    }
    match region_name.rsplit_once(',') {
        Some((_, suffix)) if !suffix.trim().is_empty() => suffix.trim().to_string(),
        _ => DEFAULT_STATE.to_string(),
    }
}

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::{DataError, DataResult};

use super::model::{
    RawRecord, WideTable, COL_REGION_ID, COL_REGION_NAME, COL_REGION_TYPE, COL_SIZE_RANK,
    COL_STATE_NAME, ID_COLUMNS,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Read a wide home value CSV from disk.
///
/// A missing file is [`DataError::Unavailable`]; the caller shows it as a
/// message. Rows that cannot be decoded are skipped with a warning.
pub fn load_wide_csv(path: &Path) -> DataResult<WideTable> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataError::Unavailable {
            path: path.to_path_buf(),
        },
        _ => DataError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let table = read_wide_csv(file)?;
    log::info!(
        "Read {} regions x {} month columns from {}",
        table.records.len(),
        table.month_headers.len(),
        path.display()
    );
    if !table.has_state_column {
        log::info!(
            "No {COL_STATE_NAME} column in {}; states come from region name suffixes",
            path.display()
        );
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row, the identifying columns in any order, then one
/// column per month. Only `RegionName` is required.
pub fn read_wide_csv<R: Read>(input: R) -> DataResult<WideTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let index_of = |name: &str| headers.iter().position(|h| h == name);
    let name_idx = index_of(COL_REGION_NAME)
        .ok_or_else(|| DataError::MissingColumn(COL_REGION_NAME.into()))?;
    let id_idx = index_of(COL_REGION_ID);
    let rank_idx = index_of(COL_SIZE_RANK);
    let type_idx = index_of(COL_REGION_TYPE);
    let state_idx = index_of(COL_STATE_NAME);

    // (position in row, header text) for every non-identifying column
    let month_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !ID_COLUMNS.contains(&h.as_str()))
        .map(|(i, h)| (i, h.clone()))
        .collect();

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping CSV row {row_no}: {e}");
                continue;
            }
        };

        let text = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let Some(region_name) = text(Some(name_idx)) else {
            log::warn!("Skipping CSV row {row_no}: empty {COL_REGION_NAME}");
            continue;
        };

        let cells = month_cols
            .iter()
            .map(|(i, _)| record.get(*i).and_then(parse_cell))
            .collect();

        records.push(RawRecord {
            region_id: text(id_idx),
            size_rank: text(rank_idx).and_then(|s| s.parse().ok()),
            region_name,
            region_type: text(type_idx),
            state_name: text(state_idx),
            cells,
        });
    }

    Ok(WideTable {
        month_headers: month_cols.into_iter().map(|(_, h)| h).collect(),
        records,
        has_state_column: state_idx.is_some(),
    })
}

/// Interpret a value cell. Empty, non-numeric and non-finite text is a
/// missing value. Tolerates `$` and thousands separators.
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// Column layout of the source table
// ---------------------------------------------------------------------------

pub const COL_REGION_ID: &str = "RegionID";
pub const COL_SIZE_RANK: &str = "SizeRank";
pub const COL_REGION_NAME: &str = "RegionName";
pub const COL_REGION_TYPE: &str = "RegionType";
pub const COL_STATE_NAME: &str = "StateName";

/// Identifying columns. Every other header is treated as a month column.
pub const ID_COLUMNS: [&str; 5] = [
    COL_REGION_ID,
    COL_SIZE_RANK,
    COL_REGION_NAME,
    COL_REGION_TYPE,
    COL_STATE_NAME,
];

/// State assigned to regions whose name carries no ", ST" suffix.
pub const DEFAULT_STATE: &str = "United States";

// ---------------------------------------------------------------------------
// Wide table – exactly what the CSV holds
// ---------------------------------------------------------------------------

/// One row of the source table: identifying fields plus one cell per month
/// column, in the order of [`WideTable::month_headers`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub region_id: Option<String>,
    pub size_rank: Option<u32>,
    pub region_name: String,
    pub region_type: Option<String>,
    pub state_name: Option<String>,
    /// `None` for empty or non-numeric cells.
    pub cells: Vec<Option<f64>>,
}

/// The parsed CSV before reshaping.
#[derive(Debug, Clone, Default)]
pub struct WideTable {
    /// Month column headers exactly as written in the file.
    pub month_headers: Vec<String>,
    pub records: Vec<RawRecord>,
    /// Whether the file has a `StateName` column at all.
    pub has_state_column: bool,
}

impl WideTable {
    /// Sum of every numeric cell, nulls counted as zero.
    pub fn cell_sum(&self) -> f64 {
        self.records
            .iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.unwrap_or(0.0))
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Long-form records
// ---------------------------------------------------------------------------

/// One region in one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    pub region_id: Option<String>,
    pub region_name: String,
    pub state_name: String,
    /// First day of the observed month.
    pub date: NaiveDate,
    /// Whole currency units. Missing source cells are stored as `0`.
    pub value: i64,
    /// `true` when `value` was coalesced from a missing cell.
    pub imputed: bool,
    /// Percent change against the same region twelve periods earlier.
    pub growth_rate: Option<f64>,
}

impl ObservationRecord {
    /// Thousands-separated display string, e.g. `$512,300`.
    pub fn formatted_value(&self) -> String {
        format_currency(self.value)
    }
}

/// Mean of all observations sharing a state and month.
#[derive(Debug, Clone, PartialEq)]
pub struct StateAverageRecord {
    pub state_name: String,
    pub date: NaiveDate,
    pub mean_value: f64,
    /// How many of the averaged observations were coalesced from missing
    /// cells. Such means are neither a growth base nor a growth target.
    pub imputed_count: usize,
    pub growth_rate: Option<f64>,
}

impl StateAverageRecord {
    /// `true` when every contributing observation was reported.
    pub fn is_complete(&self) -> bool {
        self.imputed_count == 0
    }
}

// ---------------------------------------------------------------------------
// PreparedDataset – what the presentation layer consumes
// ---------------------------------------------------------------------------

/// Where a prepared dataset came from and which clock it was cut against.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    pub path: PathBuf,
    pub prepared_at: NaiveDate,
    pub window_start: NaiveDate,
}

/// The full prepared dataset with pre-computed selector indices.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Sorted by date descending, then region name.
    pub observations: Vec<ObservationRecord>,
    /// Sorted by date descending, then state name.
    pub state_averages: Vec<StateAverageRecord>,
    /// Sorted unique region names.
    pub regions: Vec<String>,
    /// Sorted unique state names.
    pub states: Vec<String>,
    pub source: DatasetSource,
}

impl PreparedDataset {
    /// Build selector indices from the prepared records.
    pub fn from_parts(
        observations: Vec<ObservationRecord>,
        state_averages: Vec<StateAverageRecord>,
        source: DatasetSource,
    ) -> Self {
        let regions: BTreeSet<&str> = observations
            .iter()
            .map(|o| o.region_name.as_str())
            .collect();
        let states: BTreeSet<&str> = observations
            .iter()
            .map(|o| o.state_name.as_str())
            .collect();
        let regions = regions.into_iter().map(str::to_string).collect();
        let states = states.into_iter().map(str::to_string).collect();

        PreparedDataset {
            observations,
            state_averages,
            regions,
            states,
            source,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// State of a region, if the region is present.
    pub fn state_of(&self, region: &str) -> Option<&str> {
        self.observations
            .iter()
            .find(|o| o.region_name == region)
            .map(|o| o.state_name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

/// Format whole currency units with a dollar sign and thousands separators.
pub fn format_currency(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Month as a fractional year (`2020-07` → `2020.5`), the x axis of plots.
pub fn decimal_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.month0() as f64 / 12.0
}

/// `YYYY-MM` label for a month.
pub struct MonthLabel(pub NaiveDate);

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0), "$0");
        assert_eq!(format_currency(999), "$999");
        assert_eq!(format_currency(1_000), "$1,000");
        assert_eq!(format_currency(512_300), "$512,300");
        assert_eq!(format_currency(1_234_567), "$1,234,567");
        assert_eq!(format_currency(-45_000), "-$45,000");
    }

    #[test]
    fn decimal_year_and_label() {
        let d = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
        assert!((decimal_year(d) - 2020.5).abs() < 1e-9);
        assert_eq!(MonthLabel(d).to_string(), "2020-07");
    }

    #[test]
    fn cell_sum_treats_null_as_zero() {
        let table = WideTable {
            month_headers: vec!["2020-01".into(), "2020-02".into()],
            records: vec![RawRecord {
                region_id: None,
                size_rank: None,
                region_name: "Austin, TX".into(),
                region_type: None,
                state_name: None,
                cells: vec![Some(10.0), None],
            }],
            has_state_column: false,
        };
        assert_eq!(table.cell_sum(), 10.0);
    }
}

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, Utc};

use crate::error::DataResult;

use super::aggregate::{apply_region_growth, state_averages};
use super::dates::{parse_month_header, window_start};
use super::loader::load_wide_csv;
use super::model::{DatasetSource, ObservationRecord, PreparedDataset, WideTable};
use super::reshape::{derive_state, melt};

pub const DEFAULT_TRAILING_YEARS: u32 = 10;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Switches shared by every dashboard variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrepareOptions {
    pub trailing_years: u32,
    pub include_growth_rate: bool,
    /// Consumed by the presentation layer; the transform itself ignores it.
    pub include_geocoding: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            trailing_years: DEFAULT_TRAILING_YEARS,
            include_growth_rate: true,
            include_geocoding: false,
        }
    }
}

impl PrepareOptions {
    pub fn with_trailing_years(mut self, years: u32) -> Self {
        self.trailing_years = years;
        self
    }

    pub fn with_growth_rate(mut self, enabled: bool) -> Self {
        self.include_growth_rate = enabled;
        self
    }

    pub fn with_geocoding(mut self, enabled: bool) -> Self {
        self.include_geocoding = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// Preparer
// ---------------------------------------------------------------------------

/// Turns a wide home value CSV into long-form observations and state
/// averages.
///
/// ```text
///  wide CSV ─► melt ─► parse headers ─► state / coalesce ─► growth
///                                                         │
///                 sort ◄─ trailing window ◄─ state means ◄┘
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatasetPreparer {
    options: PrepareOptions,
}

impl DatasetPreparer {
    pub fn new(options: PrepareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrepareOptions {
        &self.options
    }

    /// Load and prepare `path`, cutting the window against today's date.
    pub fn load_and_normalize(&self, path: &Path) -> DataResult<PreparedDataset> {
        self.prepare_at(path, Utc::now().date_naive())
    }

    /// Load and prepare `path` as if today were `now`.
    pub fn prepare_at(&self, path: &Path, now: NaiveDate) -> DataResult<PreparedDataset> {
        let table = load_wide_csv(path)?;
        Ok(self.prepare_table(&table, path, now))
    }

    /// Prepare an already-parsed table. Never fails: bad columns and
    /// cells are dropped or coalesced.
    pub fn prepare_table(&self, table: &WideTable, path: &Path, now: NaiveDate) -> PreparedDataset {
        let months: Vec<Option<NaiveDate>> = table
            .month_headers
            .iter()
            .map(|h| {
                let parsed = parse_month_header(h);
                if parsed.is_none() {
                    log::warn!("Dropping column {h:?}: header is not a date");
                }
                parsed
            })
            .collect();

        // region → month → observation; first occurrence wins
        let mut by_region: BTreeMap<&str, BTreeMap<NaiveDate, ObservationRecord>> =
            BTreeMap::new();
        let mut duplicates = 0usize;

        for cell in melt(table) {
            let Some(date) = months[cell.column] else {
                continue;
            };
            let record = cell.record;
            let series = by_region.entry(record.region_name.as_str()).or_default();
            match series.entry(date) {
                Entry::Occupied(_) => {
                    duplicates += 1;
                    log::debug!(
                        "Duplicate value for {} in column {:?}; keeping the first",
                        record.region_name,
                        cell.header
                    );
                }
                Entry::Vacant(slot) => {
                    let value = cell.value.filter(|v| *v >= 0.0);
                    slot.insert(ObservationRecord {
                        region_id: record.region_id.clone(),
                        region_name: record.region_name.clone(),
                        state_name: derive_state(&record.region_name, record.state_name.as_deref()),
                        date,
                        value: value.map(|v| v.round() as i64).unwrap_or(0),
                        imputed: value.is_none(),
                        growth_rate: None,
                    });
                }
            }
        }
        if duplicates > 0 {
            log::info!("Ignored {duplicates} duplicate (region, month) cells");
        }

        let mut observations = Vec::with_capacity(by_region.values().map(BTreeMap::len).sum());
        for series in by_region.into_values() {
            let mut series: Vec<ObservationRecord> = series.into_values().collect();
            if self.options.include_growth_rate {
                apply_region_growth(&mut series);
            }
            observations.extend(series);
        }

        let mut averages = state_averages(&observations, self.options.include_growth_rate);

        let cutoff = window_start(now, self.options.trailing_years);
        observations.retain(|o| o.date >= cutoff);
        averages.retain(|a| a.date >= cutoff);

        observations.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.region_name.cmp(&b.region_name))
        });
        averages.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| a.state_name.cmp(&b.state_name))
        });

        log::info!(
            "Prepared {} observations and {} state averages since {cutoff}",
            observations.len(),
            averages.len()
        );

        PreparedDataset::from_parts(
            observations,
            averages,
            DatasetSource {
                path: path.to_path_buf(),
                prepared_at: now,
                window_start: cutoff,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_wide_csv;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn prepare(csv: &str, options: PrepareOptions) -> PreparedDataset {
        let table = read_wide_csv(csv.as_bytes()).unwrap();
        DatasetPreparer::new(options).prepare_table(&table, Path::new("test.csv"), now())
    }

    #[test]
    fn new_york_example_yields_two_observations() {
        let ds = prepare(
            "RegionName,Jan-2020,Feb-2020\n\"New York, NY\",500000,510000\n",
            PrepareOptions::default(),
        );
        let got: Vec<_> = ds
            .observations
            .iter()
            .map(|o| (o.region_name.as_str(), o.state_name.as_str(), o.date, o.value))
            .collect();
        assert_eq!(
            got,
            vec![
                ("New York, NY", "NY", NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(), 510000),
                ("New York, NY", "NY", NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 500000),
            ]
        );
        assert_eq!(ds.regions, vec!["New York, NY"]);
        assert_eq!(ds.states, vec!["NY"]);
    }

    #[test]
    fn bad_headers_are_dropped_and_nulls_coalesced() {
        let ds = prepare(
            "RegionName,Notes,2020-01-31,2020-02-29\nUnited States,hello,,300000.6\n",
            PrepareOptions::default(),
        );
        assert_eq!(ds.len(), 2);
        let jan = ds
            .observations
            .iter()
            .find(|o| o.date.to_string() == "2020-01-01")
            .unwrap();
        assert_eq!((jan.value, jan.imputed), (0, true));
        let feb = ds
            .observations
            .iter()
            .find(|o| o.date.to_string() == "2020-02-01")
            .unwrap();
        assert_eq!((feb.value, feb.imputed), (300001, false));
        assert_eq!(feb.state_name, "United States");
        assert_eq!(feb.formatted_value(), "$300,001");
    }

    #[test]
    fn trailing_window_excludes_old_months() {
        let ds = prepare(
            "RegionName,2016-09-30,2016-10-31,2026-09-30\n\"Boise, ID\",1,2,3\n",
            PrepareOptions::default(),
        );
        let dates: Vec<String> = ds
            .observations
            .iter()
            .map(|o| o.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2026-09-01", "2016-10-01"]);
        assert_eq!(ds.source.window_start, NaiveDate::from_ymd_opt(2016, 10, 1).unwrap());
        assert!(ds.state_averages.iter().all(|a| a.date >= ds.source.window_start));
    }

    #[test]
    fn duplicate_months_keep_the_first_value() {
        let ds = prepare(
            "RegionName,2020-01-15,2020-01-31\n\"Austin, TX\",100,200\n\"Austin, TX\",300,400\n",
            PrepareOptions::default(),
        );
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.observations[0].value, 100);
    }

    #[test]
    fn growth_can_be_disabled() {
        let mut header = String::from("RegionName");
        let mut row = String::from("\"Austin, TX\"");
        for m in 1..=12 {
            header.push_str(&format!(",2024-{m:02}"));
            row.push_str(",100");
        }
        header.push_str(",2025-01");
        row.push_str(",110");
        let csv = format!("{header}\n{row}\n");

        let with = prepare(&csv, PrepareOptions::default());
        assert!((with.observations[0].growth_rate.unwrap() - 10.0).abs() < 1e-9);
        assert!((with.state_averages[0].growth_rate.unwrap() - 10.0).abs() < 1e-9);

        let without = prepare(&csv, PrepareOptions::default().with_growth_rate(false));
        assert!(without.observations.iter().all(|o| o.growth_rate.is_none()));
        assert!(without.state_averages.iter().all(|a| a.growth_rate.is_none()));
    }

    #[test]
    fn negative_cells_are_missing_and_carry_no_growth() {
        // 2024-01 through 2025-02: a negative base and a negative current cell.
        let mut header = String::from("RegionName");
        let mut row = String::from("\"Austin, TX\"");
        for i in 0..14u32 {
            header.push_str(&format!(",{}-{:02}", 2024 + i / 12, i % 12 + 1));
            let cell = match i {
                0 => "-5",
                13 => "-20",
                _ => "100",
            };
            row.push_str(&format!(",{cell}"));
        }
        let ds = prepare(&format!("{header}\n{row}\n"), PrepareOptions::default());
        let at = |y: i32, m: u32| {
            let date = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
            ds.observations.iter().find(|o| o.date == date).unwrap()
        };

        let base = at(2024, 1);
        assert_eq!((base.value, base.imputed), (0, true));
        // 100 against a -5 base would otherwise read as -2100%.
        assert_eq!(at(2025, 1).growth_rate, None);

        let current = at(2025, 2);
        assert_eq!((current.value, current.imputed), (0, true));
        assert_eq!(current.growth_rate, None);
        assert_eq!(at(2024, 12).growth_rate, None);

        let tx: Vec<_> = ds
            .state_averages
            .iter()
            .filter(|a| a.state_name == "TX")
            .collect();
        assert_eq!(tx.len(), 14);
        assert!(tx.iter().all(|a| a.mean_value >= 0.0));
        assert_eq!(tx[0].imputed_count, 1);
        assert_eq!(tx[0].growth_rate, None);
        assert_eq!(tx[1].growth_rate, None);
    }

    #[test]
    fn growth_uses_history_before_the_window() {
        let ds = prepare(
            "RegionName,2015-10-31,2015-11-30,2015-12-31,2016-01-31,2016-02-29,2016-03-31,\
2016-04-30,2016-05-31,2016-06-30,2016-07-31,2016-08-31,2016-09-30,2016-10-31\n\
\"Boise, ID\",100,100,100,100,100,100,100,100,100,100,100,100,150\n",
            PrepareOptions::default(),
        );
        assert_eq!(ds.len(), 1);
        assert!((ds.observations[0].growth_rate.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn builder_sets_every_switch() {
        let opts = PrepareOptions::default()
            .with_trailing_years(3)
            .with_growth_rate(false)
            .with_geocoding(true);
        assert_eq!(
            opts,
            PrepareOptions {
                trailing_years: 3,
                include_growth_rate: false,
                include_geocoding: true,
            }
        );
    }
}

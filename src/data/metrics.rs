use chrono::NaiveDate;

use super::model::ObservationRecord;

/// Headline numbers for one region's series.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub latest_date: Option<NaiveDate>,
    pub latest_value: Option<i64>,
    /// Lowest reported value. Coalesced zeros are not reported values.
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub latest_growth: Option<f64>,
    pub observations: usize,
    pub imputed: usize,
}

impl RegionSummary {
    /// Summarise a series in any order.
    pub fn from_series(series: &[&ObservationRecord]) -> Self {
        let reported = series.iter().filter(|o| !o.imputed);
        let latest = series.iter().filter(|o| !o.imputed).max_by_key(|o| o.date);

        RegionSummary {
            latest_date: latest.map(|o| o.date),
            latest_value: latest.map(|o| o.value),
            min_value: reported.clone().map(|o| o.value).min(),
            max_value: reported.map(|o| o.value).max(),
            latest_growth: latest.and_then(|o| o.growth_rate),
            observations: series.len(),
            imputed: series.iter().filter(|o| o.imputed).count(),
        }
    }
}

use super::model::{ObservationRecord, PreparedDataset, StateAverageRecord};

// ---------------------------------------------------------------------------
// Selection: simple equality filters over a prepared dataset
// ---------------------------------------------------------------------------

/// Observations for one region, oldest first.
pub fn region_series<'a>(dataset: &'a PreparedDataset, region: &str) -> Vec<&'a ObservationRecord> {
    // Stored newest first, so reversing gives ascending dates.
    dataset
        .observations
        .iter()
        .rev()
        .filter(|o| o.region_name == region)
        .collect()
}

/// State averages for one state, oldest first.
pub fn state_series<'a>(dataset: &'a PreparedDataset, state: &str) -> Vec<&'a StateAverageRecord> {
    dataset
        .state_averages
        .iter()
        .rev()
        .filter(|a| a.state_name == state)
        .collect()
}

/// Regions whose name contains `query`, ignoring case. An empty query
/// matches everything.
pub fn search_regions<'a>(dataset: &'a PreparedDataset, query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    dataset
        .regions
        .iter()
        .filter(|r| needle.is_empty() || r.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_wide_csv;
    use crate::data::prepare::{DatasetPreparer, PrepareOptions};
    use chrono::NaiveDate;
    use std::path::Path;

    fn dataset() -> PreparedDataset {
        let csv = "RegionName,StateName,2024-01-31,2024-02-29,2024-03-31\n\
\"Austin, TX\",TX,1,2,3\n\
\"Dallas, TX\",TX,4,5,6\n\
\"Boise City, ID\",ID,7,8,9\n";
        let table = read_wide_csv(csv.as_bytes()).unwrap();
        DatasetPreparer::new(PrepareOptions::default()).prepare_table(
            &table,
            Path::new("t.csv"),
            NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
        )
    }

    #[test]
    fn region_series_is_ascending_and_exclusive() {
        let ds = dataset();
        let values: Vec<i64> = region_series(&ds, "Dallas, TX")
            .iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec![4, 5, 6]);
        assert!(region_series(&ds, "Nowhere").is_empty());
    }

    #[test]
    fn state_series_is_ascending() {
        let ds = dataset();
        let means: Vec<f64> = state_series(&ds, "TX").iter().map(|a| a.mean_value).collect();
        assert_eq!(means, vec![2.5, 3.5, 4.5]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let ds = dataset();
        assert_eq!(search_regions(&ds, "").len(), 3);
        assert_eq!(search_regions(&ds, "tx"), vec!["Austin, TX", "Dallas, TX"]);
        assert_eq!(search_regions(&ds, " boise "), vec!["Boise City, ID"]);
    }
}

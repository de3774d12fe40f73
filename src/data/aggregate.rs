use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{ObservationRecord, StateAverageRecord};

/// Look-back distance for year-over-year growth, in monthly periods.
pub const GROWTH_PERIODS: usize = 12;

// ---------------------------------------------------------------------------
// Growth rate
// ---------------------------------------------------------------------------

/// Percent change of each value against the one `periods` positions
/// earlier. `values` must be in ascending date order; `None` marks a
/// missing value.
///
/// The result is `None` for the first `periods` entries, wherever either
/// side is missing, and where the base is zero.
pub fn growth_rates(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, current)| {
            if periods == 0 || i < periods {
                return None;
            }
            let base = values[i - periods]?;
            let current = (*current)?;
            if base == 0.0 {
                return None;
            }
            Some((current - base) / base * 100.0)
        })
        .collect()
}

/// Fill `growth_rate` on one region's observations (ascending by date).
pub fn apply_region_growth(series: &mut [ObservationRecord]) {
    let values: Vec<Option<f64>> = series
        .iter()
        .map(|o| (!o.imputed).then_some(o.value as f64))
        .collect();
    for (obs, rate) in series.iter_mut().zip(growth_rates(&values, GROWTH_PERIODS)) {
        obs.growth_rate = rate;
    }
}

// ---------------------------------------------------------------------------
// State averages
// ---------------------------------------------------------------------------

/// Mean value per (state, month), returned grouped by state with months
/// ascending. Every observation counts toward the mean, coalesced zeros
/// included, but a month with any coalesced contribution carries no growth
/// rate and cannot serve as a growth base.
pub fn state_averages(
    observations: &[ObservationRecord],
    include_growth: bool,
) -> Vec<StateAverageRecord> {
    // (sum, count, imputed count)
    let mut sums: BTreeMap<(&str, NaiveDate), (f64, usize, usize)> = BTreeMap::new();
    for obs in observations {
        let slot = sums.entry((obs.state_name.as_str(), obs.date)).or_default();
        slot.0 += obs.value as f64;
        slot.1 += 1;
        if obs.imputed {
            slot.2 += 1;
        }
    }

    let mut out: Vec<StateAverageRecord> = sums
        .into_iter()
        .map(|((state, date), (sum, count, imputed))| StateAverageRecord {
            state_name: state.to_string(),
            date,
            mean_value: sum / count as f64,
            imputed_count: imputed,
            growth_rate: None,
        })
        .collect();

    if include_growth {
        // BTreeMap order keeps each state's months contiguous and ascending.
        for chunk in out.chunk_by_mut(|a, b| a.state_name == b.state_name) {
            let values: Vec<Option<f64>> = chunk
                .iter()
                .map(|r| r.is_complete().then_some(r.mean_value))
                .collect();
            for (rec, rate) in chunk.iter_mut().zip(growth_rates(&values, GROWTH_PERIODS)) {
                rec.growth_rate = rate;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(i: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2010 + (i / 12) as i32, i % 12 + 1, 1).unwrap()
    }

    fn obs(region: &str, state: &str, i: u32, value: i64) -> ObservationRecord {
        ObservationRecord {
            region_id: None,
            region_name: region.into(),
            state_name: state.into(),
            date: month(i),
            value,
            imputed: false,
            growth_rate: None,
        }
    }

    #[test]
    fn growth_matches_formula_after_twelve_periods() {
        let values: Vec<Option<f64>> = (0..26).map(|i| Some(100.0 + i as f64)).collect();
        let rates = growth_rates(&values, GROWTH_PERIODS);

        assert!(rates[..12].iter().all(Option::is_none));
        for i in 12..26 {
            let (current, base) = (values[i].unwrap(), values[i - 12].unwrap());
            let expected = (current - base) / base * 100.0;
            assert!((rates[i].unwrap() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn growth_is_null_for_missing_or_zero_base() {
        let mut values: Vec<Option<f64>> = vec![Some(10.0); 14];
        values[0] = None;
        values[1] = Some(0.0);
        let rates = growth_rates(&values, GROWTH_PERIODS);
        assert_eq!(rates[12], None);
        assert_eq!(rates[13], None);

        let mut values = vec![Some(10.0); 13];
        values[12] = None;
        assert_eq!(growth_rates(&values, GROWTH_PERIODS)[12], None);
    }

    #[test]
    fn region_growth_skips_imputed_values() {
        let mut series: Vec<ObservationRecord> =
            (0..13).map(|i| obs("A, TX", "TX", i, 200)).collect();
        series[12].value = 250;
        apply_region_growth(&mut series);
        assert!((series[12].growth_rate.unwrap() - 25.0).abs() < 1e-9);

        series[0].imputed = true;
        series[0].value = 0;
        apply_region_growth(&mut series);
        assert_eq!(series[12].growth_rate, None);
    }

    #[test]
    fn state_mean_is_arithmetic_mean() {
        let observations = vec![
            obs("Austin, TX", "TX", 0, 300),
            obs("Dallas, TX", "TX", 0, 400),
            obs("Houston, TX", "TX", 0, 200),
            obs("Austin, TX", "TX", 1, 310),
            obs("Boise, ID", "ID", 0, 250),
        ];
        let avgs = state_averages(&observations, false);
        assert_eq!(avgs.len(), 3);

        let tx0 = avgs
            .iter()
            .find(|r| r.state_name == "TX" && r.date == month(0))
            .unwrap();
        assert!((tx0.mean_value - 300.0).abs() < 1e-9);
        let tx1 = avgs
            .iter()
            .find(|r| r.state_name == "TX" && r.date == month(1))
            .unwrap();
        assert!((tx1.mean_value - 310.0).abs() < 1e-9);
        assert!(avgs.iter().all(|r| r.growth_rate.is_none()));
    }

    #[test]
    fn state_growth_is_computed_per_state() {
        let mut observations = Vec::new();
        for i in 0..13 {
            observations.push(obs("Austin, TX", "TX", i, 100 + i as i64 * 10));
            observations.push(obs("Boise, ID", "ID", i, 500));
        }
        let avgs = state_averages(&observations, true);

        let tx_last = avgs
            .iter()
            .find(|r| r.state_name == "TX" && r.date == month(12))
            .unwrap();
        assert!((tx_last.growth_rate.unwrap() - 120.0).abs() < 1e-9);
        let id_last = avgs
            .iter()
            .find(|r| r.state_name == "ID" && r.date == month(12))
            .unwrap();
        assert_eq!(id_last.growth_rate, Some(0.0));
        let id_first = avgs
            .iter()
            .find(|r| r.state_name == "ID" && r.date == month(11))
            .unwrap();
        assert_eq!(id_first.growth_rate, None);
    }

    #[test]
    fn state_growth_ignores_months_with_imputed_members() {
        let mut observations = Vec::new();
        for i in 0..14 {
            observations.push(obs("Austin, TX", "TX", i, 100));
            let mut dallas = obs("Dallas, TX", "TX", i, 100);
            if i == 0 || i == 13 {
                dallas.value = 0;
                dallas.imputed = true;
            }
            observations.push(dallas);
        }
        let avgs = state_averages(&observations, true);
        let at = |i: u32| avgs.iter().find(|r| r.date == month(i)).unwrap();

        // The mean still counts the coalesced zero.
        assert!((at(0).mean_value - 50.0).abs() < 1e-9);
        assert_eq!(at(0).imputed_count, 1);
        assert!(!at(0).is_complete());

        // Imputed base month: no 100% jump from 50 to 100.
        assert_eq!(at(12).growth_rate, None);
        // Imputed current month: no -50% drop either.
        assert_eq!(at(13).growth_rate, None);
        assert!(at(12).is_complete());
    }
}

//! Dashboard configuration.
//!
//! Read once at startup from environment variables; every value has a
//! default so the dashboard runs with no setup when the CSV sits in the
//! working directory.
//!
//! | Variable | Default |
//! |---|---|
//! | `ZHVI_DATA_PATH` | `Metro_zhvi_uc_sfr_tier_0.33_0.67_sm_sa_month.csv` |
//! | `ZHVI_TRAILING_YEARS` | `10` |
//! | `ZHVI_GROWTH_RATE` | `true` |
//! | `ZHVI_GEOCODING` | `false` |
//! | `ZHVI_GEOCODER_URL` | Nominatim public search endpoint |
//! | `ZHVI_GEOCODER_USER_AGENT` | `zhvi-dashboard/<version>` |
//! | `ZHVI_GEOCODER_INTERVAL_MS` | `1000` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::data::prepare::{PrepareOptions, DEFAULT_TRAILING_YEARS};
use crate::geo::{DEFAULT_GEOCODER_URL, DEFAULT_MIN_INTERVAL};

pub const DEFAULT_DATA_PATH: &str = "Metro_zhvi_uc_sfr_tier_0.33_0.67_sm_sa_month.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub options: PrepareOptions,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            options: PrepareOptions::default(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocoder_user_agent: default_user_agent(),
            geocoder_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's
    /// value or `None` when unset.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let trailing_years = parse_or(
            get("ZHVI_TRAILING_YEARS"),
            "ZHVI_TRAILING_YEARS",
            DEFAULT_TRAILING_YEARS,
        );
        let growth = parse_bool_or(
            get("ZHVI_GROWTH_RATE"),
            "ZHVI_GROWTH_RATE",
            defaults.options.include_growth_rate,
        );
        let geocoding = parse_bool_or(
            get("ZHVI_GEOCODING"),
            "ZHVI_GEOCODING",
            defaults.options.include_geocoding,
        );
        let interval_ms = parse_or(
            get("ZHVI_GEOCODER_INTERVAL_MS"),
            "ZHVI_GEOCODER_INTERVAL_MS",
            defaults.geocoder_interval.as_millis() as u64,
        );

        Self {
            data_path: get("ZHVI_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            options: PrepareOptions::default()
                .with_trailing_years(trailing_years)
                .with_growth_rate(growth)
                .with_geocoding(geocoding),
            geocoder_url: get("ZHVI_GEOCODER_URL").unwrap_or(defaults.geocoder_url),
            geocoder_user_agent: get("ZHVI_GEOCODER_USER_AGENT")
                .unwrap_or(defaults.geocoder_user_agent),
            geocoder_interval: Duration::from_millis(interval_ms),
        }
    }
}

fn default_user_agent() -> String {
    format!("zhvi-dashboard/{}", env!("CARGO_PKG_VERSION"))
}

fn parse_or<T: FromStr + Copy>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {key}={v:?}: not a valid value");
            default
        }),
    }
}

fn parse_bool_or(raw: Option<String>, key: &str, default: bool) -> bool {
    match raw.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => default,
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            log::warn!("Ignoring {key}={other:?}: expected true or false");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DashboardConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashboardConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(config(&[]), DashboardConfig::default());
        let d = DashboardConfig::default();
        assert_eq!(d.options.trailing_years, 10);
        assert!(d.options.include_growth_rate);
        assert!(!d.options.include_geocoding);
        assert_eq!(d.geocoder_interval, Duration::from_secs(1));
    }

    #[test]
    fn variables_override_defaults() {
        let c = config(&[
            ("ZHVI_DATA_PATH", "data/zhvi.csv"),
            ("ZHVI_TRAILING_YEARS", "5"),
            ("ZHVI_GROWTH_RATE", "no"),
            ("ZHVI_GEOCODING", "TRUE"),
            ("ZHVI_GEOCODER_URL", "http://localhost:8080/search"),
            ("ZHVI_GEOCODER_INTERVAL_MS", "250"),
        ]);
        assert_eq!(c.data_path, PathBuf::from("data/zhvi.csv"));
        assert_eq!(c.options.trailing_years, 5);
        assert!(!c.options.include_growth_rate);
        assert!(c.options.include_geocoding);
        assert_eq!(c.geocoder_url, "http://localhost:8080/search");
        assert_eq!(c.geocoder_interval, Duration::from_millis(250));
    }

    #[test]
    fn invalid_values_fall_back() {
        let c = config(&[
            ("ZHVI_TRAILING_YEARS", "ten"),
            ("ZHVI_GROWTH_RATE", "maybe"),
            ("ZHVI_DATA_PATH", "   "),
        ]);
        assert_eq!(c.options.trailing_years, DEFAULT_TRAILING_YEARS);
        assert!(c.options.include_growth_rate);
        assert_eq!(c.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }
}

use chrono::{Datelike, Months, NaiveDate};

/// Parse a month column header into the first day of that month.
///
/// Accepted: `2020-01-31`, `2020-01`, `2020/01/31`, `01/31/2020`,
/// `Jan-2020`, `Jan 2020`, `January-2020`. Returns `None` for anything
/// else; callers drop such columns.
pub fn parse_month_header(header: &str) -> Option<NaiveDate> {
    let s = header.trim();
    if s.is_empty() {
        return None;
    }

    const FULL_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in FULL_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return first_of_month(d.year(), d.month());
        }
    }

    // Year-month forms have no day, so pin day 1 before handing to chrono.
    if let Some((y, m)) = s.split_once('-').or_else(|| s.split_once('/')) {
        if y.len() == 4 && m.len() <= 2 {
            let year: i32 = y.parse().ok()?;
            let month: u32 = m.parse().ok()?;
            return first_of_month(year, month);
        }
    }

    const MONTH_NAME_FORMATS: [&str; 4] = ["%d-%b-%Y", "%d %b %Y", "%d-%B-%Y", "%d %B %Y"];
    let with_day = format!("01-{s}");
    let with_day_space = format!("01 {s}");
    for fmt in MONTH_NAME_FORMATS {
        let candidate = if fmt.starts_with("%d-") { &with_day } else { &with_day_space };
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return Some(d);
        }
    }

    None
}

/// First day of `year`-`month`, or `None` when the month is out of range.
pub fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Start of the trailing window: `years` before `now`, truncated to the
/// first of that month.
pub fn window_start(now: NaiveDate, years: u32) -> NaiveDate {
    let back = now
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN);
    first_of_month(back.year(), back.month()).unwrap_or(back)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn parses_zillow_month_end_headers() {
        assert_eq!(parse_month_header("2000-01-31"), Some(ym(2000, 1)));
        assert_eq!(parse_month_header(" 2024-02-29 "), Some(ym(2024, 2)));
        assert_eq!(parse_month_header("2024/02/29"), Some(ym(2024, 2)));
        assert_eq!(parse_month_header("02/29/2024"), Some(ym(2024, 2)));
    }

    #[test]
    fn parses_year_month_and_month_name_headers() {
        assert_eq!(parse_month_header("2020-01"), Some(ym(2020, 1)));
        assert_eq!(parse_month_header("2020-1"), Some(ym(2020, 1)));
        assert_eq!(parse_month_header("Jan-2020"), Some(ym(2020, 1)));
        assert_eq!(parse_month_header("Feb 2020"), Some(ym(2020, 2)));
        assert_eq!(parse_month_header("March-2021"), Some(ym(2021, 3)));
    }

    #[test]
    fn rejects_non_dates() {
        assert_eq!(parse_month_header(""), None);
        assert_eq!(parse_month_header("Metro"), None);
        assert_eq!(parse_month_header("2020-13"), None);
        assert_eq!(parse_month_header("2020-02-30"), None);
        assert_eq!(parse_month_header("Unnamed: 0"), None);
    }

    #[test]
    fn window_start_truncates_to_month() {
        let now = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(window_start(now, 10), ym(2016, 10));
        assert_eq!(window_start(now, 0), ym(2026, 10));
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(window_start(leap, 1), ym(2023, 2));
    }
}

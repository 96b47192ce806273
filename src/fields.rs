use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::collections::HashMap;

/// One CSV row, keyed by header name.
pub type Row = HashMap<String, String>;

/// Export sources disagree on column names ("head" vs "dean", etc.), leave
/// cells blank, or write a literal NULL. Every helper here treats those the
/// same way and never errors: entity routines must not abort the whole
/// transaction over one malformed cell.
fn is_missing(value: &str) -> bool {
    let t = value.trim();
    t.is_empty() || t.eq_ignore_ascii_case("null")
}

/// First candidate key present in the row with a non-missing value, else
/// `default`.
pub fn resolve(row: &Row, keys: &[&str], default: &str) -> String {
    opt(row, keys).unwrap_or_else(|| default.to_string())
}

/// Like [`resolve`], but `None` when every candidate is missing.
pub fn opt(row: &Row, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = row.get(*key) {
            if !is_missing(v) {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

/// Integer with a tolerated trailing fraction ("30.0" parses as 30).
/// Missing or unparsable input yields `default`.
pub fn parse_int(value: &str, default: i64) -> i64 {
    parse_int_opt(value).unwrap_or(default)
}

pub fn parse_int_opt(value: &str) -> Option<i64> {
    if is_missing(value) {
        return None;
    }
    let t = value.trim();
    if let Ok(n) = t.parse::<i64>() {
        return Some(n);
    }
    t.parse::<f64>().ok().map(|f| f.trunc() as i64)
}

/// Fixed-point numeric; missing or unparsable input yields `default`.
pub fn parse_decimal(value: &str, default: f64) -> f64 {
    parse_decimal_opt(value).unwrap_or(default)
}

pub fn parse_decimal_opt(value: &str) -> Option<f64> {
    if is_missing(value) {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Calendar date; datetime input is truncated to its date part. `None` on
/// missing input or when no pattern matches.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if is_missing(value) {
        return None;
    }
    let t = value.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Timestamp; date-only input lands at midnight. Naive values are attached
/// to the process-local timezone. `None` on missing or unmatched input.
pub fn parse_date_time(value: &str) -> Option<DateTime<Local>> {
    if is_missing(value) {
        return None;
    }
    let t = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, fmt) {
            return Local
                .from_local_datetime(&d.and_hms_opt(0, 0, 0)?)
                .earliest();
        }
    }
    None
}

/// Time of day, `%H:%M:%S` then `%H:%M`. `None` on missing or unmatched
/// input.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    if is_missing(value) {
        return None;
    }
    let t = value.trim();
    for fmt in &["%H:%M:%S", "%H:%M"] {
        if let Ok(v) = NaiveTime::parse_from_str(t, fmt) {
            return Some(v);
        }
    }
    None
}

/// True for {true, 1, yes, y} in any case; missing input yields `default`;
/// every other value is false.
pub fn parse_bool(value: &str, default: bool) -> bool {
    if is_missing(value) {
        return default;
    }
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn resolve_takes_first_present_candidate() {
        let r = row(&[("dean", "Dr. Reyes"), ("name", "Physics")]);
        assert_eq!(resolve(&r, &["head", "dean"], ""), "Dr. Reyes");
        assert_eq!(resolve(&r, &["head"], "unknown"), "unknown");
    }

    #[test]
    fn resolve_skips_blank_and_null_cells() {
        let r = row(&[("head", "  "), ("dean", "NULL"), ("lead", "M. Osei")]);
        assert_eq!(resolve(&r, &["head", "dean", "lead"], ""), "M. Osei");
        assert_eq!(opt(&r, &["head", "dean"]), None);
    }

    #[test]
    fn parse_int_tolerates_trailing_fraction() {
        assert_eq!(parse_int("30.0", 0), 30);
        assert_eq!(parse_int("30", 0), 30);
        assert_eq!(parse_int("", 7), 7);
        assert_eq!(parse_int("NULL", 7), 7);
        assert_eq!(parse_int("thirty", 7), 7);
    }

    #[test]
    fn parse_decimal_falls_back() {
        assert_eq!(parse_decimal("3.85", 0.0), 3.85);
        assert_eq!(parse_decimal("", 1.5), 1.5);
        assert_eq!(parse_decimal_opt("x"), None);
    }

    #[test]
    fn parse_date_accepts_both_separators() {
        let dash = parse_date("2024-09-01").expect("dash date");
        let slash = parse_date("2024/09/01").expect("slash date");
        assert_eq!(dash, slash);
        assert_eq!(dash, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    }

    #[test]
    fn parse_date_truncates_datetime_input() {
        let d = parse_date("2024-09-01 13:45:00").expect("datetime input");
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
    }

    #[test]
    fn parse_date_never_raises() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("NULL"), None);
    }

    #[test]
    fn parse_date_time_keeps_time_of_day() {
        let dt = parse_date_time("2024-09-01 13:45:00").expect("datetime");
        assert_eq!(dt.naive_local().to_string(), "2024-09-01 13:45:00");
        let midnight = parse_date_time("2024-09-01").expect("date only");
        assert_eq!(midnight.naive_local().to_string(), "2024-09-01 00:00:00");
    }

    #[test]
    fn parse_time_tries_seconds_then_minutes() {
        assert_eq!(
            parse_time("14:30:15"),
            NaiveTime::from_hms_opt(14, 30, 15)
        );
        assert_eq!(parse_time("14:30"), NaiveTime::from_hms_opt(14, 30, 0));
        assert_eq!(parse_time("2pm"), None);
    }

    #[test]
    fn parse_bool_accepts_spellings() {
        for v in ["true", "TRUE", "1", "yes", "Y"] {
            assert!(parse_bool(v, false), "{v} should be true");
        }
        assert!(!parse_bool("no", true));
        assert!(!parse_bool("0", true));
        assert!(parse_bool("", true));
        assert!(parse_bool("NULL", true));
    }
}

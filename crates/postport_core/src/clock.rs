use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Source of "today" for posts without a usable date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Reads the local system date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// Always returns the same date; used to keep output reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses an export date into a calendar date, falling back to `clock`.
///
/// Timestamps containing `T` keep the part before the first `T`. Anything
/// else is read as an ISO-8601 date or timestamp, a trailing `Z` meaning UTC.
pub fn parse_date(input: Option<&str>, clock: &dyn Clock) -> NaiveDate {
    input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_iso_date)
        .unwrap_or_else(|| clock.today())
}

fn parse_iso_date(input: &str) -> Option<NaiveDate> {
    if let Some((date_part, _)) = input.split_once('T') {
        return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }

    let normalized = match input.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => input.to_string(),
    };
    if let Ok(stamp) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(stamp.date_naive());
    }
    if let Ok(stamp) = DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M%:z") {
        return Some(stamp.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
        .map(|stamp| stamp.date())
}

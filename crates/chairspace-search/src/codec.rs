//! Wire-format codec for times, dates and durations.
//!
//! The booking back-end speaks truncated ISO 8601: plain dates
//! (`2024-03-15`), local date-times without offset or fraction
//! (`2024-03-15T09:00:00`) and `PTxHyM` durations. Everything here is a
//! pure function over explicit inputs; nothing reads the system clock.
//!
//! # Functions
//!
//! - [`parse_time_of_day`] / [`format_time_of_day`]: `"HH:MM"` form fields
//! - [`parse_date`] / [`format_date`]: `"YYYY-MM-DD"`
//! - [`date_from_parts`]: `[year, month, day]` arrays as the back-end serializes them
//! - [`format_date_time`] / [`format_naive_date_time`]: reservation window boundaries
//! - [`parse_duration`] / [`format_duration`]: `PTxHyM`

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

// ── TimeOfDay ───────────────────────────────────────────────────────────────

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    /// 00:00, the default search start.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };
    /// 23:59, the default search end.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay {
        hour: 23,
        minute: 59,
    };

    /// Build a time of day, rejecting out-of-range components.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            return Err(SearchError::Format(format!("hour out of range: {hour}")));
        }
        if minute > 59 {
            return Err(SearchError::Format(format!(
                "minute out of range: {minute}"
            )));
        }
        Ok(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds and fractions are truncated.
    fn from(time: NaiveTime) -> Self {
        TimeOfDay {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        parse_time_of_day(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SearchError;

    fn try_from(value: String) -> Result<Self> {
        parse_time_of_day(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Parse an `"HH:MM"` string.
///
/// # Errors
///
/// Returns [`SearchError::Format`] unless the input is exactly two
/// colon-separated unsigned integers with hour in `0..=23` and minute in
/// `0..=59`.
///
/// # Examples
///
/// ```
/// use chairspace_search::codec::{format_time_of_day, parse_time_of_day};
///
/// let t = parse_time_of_day("09:05").unwrap();
/// assert_eq!(t.hour(), 9);
/// assert_eq!(format_time_of_day(t), "09:05");
/// ```
pub fn parse_time_of_day(s: &str) -> Result<TimeOfDay> {
    let mut parts = s.split(':');
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(SearchError::Format(format!(
            "expected HH:MM, got '{s}'"
        )));
    };
    let hour = parse_component(h, s)?;
    let minute = parse_component(m, s)?;
    TimeOfDay::new(hour, minute)
        .map_err(|_| SearchError::Format(format!("'{s}' is not a valid time")))
}

/// Format a time as zero-padded `"HH:MM"`.
pub fn format_time_of_day(time: TimeOfDay) -> String {
    time.to_string()
}

// ── Dates and date-times ────────────────────────────────────────────────────

/// Format a date as `"YYYY-MM-DD"`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `"YYYY-MM-DD"` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| SearchError::Format(format!("'{s}': {e}")))
}

/// Build a date from the `[year, month, day]` array form used by the
/// back-end's JSON serializer. Month is 1-based.
pub fn date_from_parts(parts: &[i32]) -> Result<NaiveDate> {
    let [year, month, day] = parts else {
        return Err(SearchError::Format(format!(
            "expected [year, month, day], got {} components",
            parts.len()
        )));
    };
    u32::try_from(*month)
        .ok()
        .zip(u32::try_from(*day).ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(*year, m, d))
        .ok_or_else(|| SearchError::Format(format!("no such date: {year}-{month}-{day}")))
}

/// Combine a date and a time of day into the wire date-time form.
///
/// Seconds are always present and always `00`.
///
/// ```
/// use chairspace_search::codec::{format_date_time, TimeOfDay};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// let time = TimeOfDay::new(9, 0).unwrap();
/// assert_eq!(format_date_time(date, time), "2024-03-15T09:00:00");
/// ```
pub fn format_date_time(date: NaiveDate, time: TimeOfDay) -> String {
    format!("{}T{}:00", format_date(date), time)
}

/// Format a full date-time in the wire form, truncating any sub-second part.
pub fn format_naive_date_time(datetime: NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
}

// ── Duration ────────────────────────────────────────────────────────────────

/// Elapsed time as entered in the search form.
///
/// Either component may be unset while the user is still typing; see
/// [`crate::criteria::resolved_duration`] for how a partial value is
/// completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Duration {
    pub hours: Option<u32>,
    pub minutes: Option<u32>,
}

impl Duration {
    /// A fully specified duration.
    pub fn new(hours: u32, minutes: u32) -> Self {
        Duration {
            hours: Some(hours),
            minutes: Some(minutes),
        }
    }

    /// Both components unset.
    pub fn unset() -> Self {
        Duration::default()
    }

    /// Split a minute count into hours and remainder minutes.
    pub fn from_minutes(total: u32) -> Self {
        Duration::new(total / 60, total % 60)
    }

    pub fn is_complete(&self) -> bool {
        self.hours.is_some() && self.minutes.is_some()
    }

    pub fn is_blank(&self) -> bool {
        self.hours.is_none() && self.minutes.is_none()
    }

    /// Total length in minutes, if both components are set and the total
    /// fits in a `u32`.
    pub fn total_minutes(&self) -> Option<u32> {
        self.hours?.checked_mul(60)?.checked_add(self.minutes?)
    }
}

/// Format a duration as `PT{hours}H{minutes}M`.
///
/// Components are not padded; zero is written as `0`.
///
/// # Errors
///
/// Returns [`SearchError::MissingField`] if either component is unset.
pub fn format_duration(duration: &Duration) -> Result<String> {
    let hours = duration
        .hours
        .ok_or(SearchError::MissingField("duration.hours"))?;
    let minutes = duration
        .minutes
        .ok_or(SearchError::MissingField("duration.minutes"))?;
    Ok(format!("PT{hours}H{minutes}M"))
}

/// Parse an ISO 8601 time-only duration (`PT2H`, `PT45M`, `PT1H30M`, `PT0S`).
///
/// Minute totals of 60 or more are normalized into hours. Second
/// components are accepted only when zero.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let rest = s
        .strip_prefix("PT")
        .ok_or_else(|| SearchError::Format(format!("duration must start with 'PT': '{s}'")))?;
    if rest.is_empty() {
        return Err(SearchError::Format(format!(
            "duration has no components: '{s}'"
        )));
    }

    let mut total_minutes: u32 = 0;
    let mut num_buf = String::new();
    let mut last_unit = 0u8;

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return Err(SearchError::Format(format!(
                "expected number before '{ch}' in '{s}'"
            )));
        }
        let n: u32 = num_buf
            .parse()
            .map_err(|_| SearchError::Format(format!("invalid number in '{s}'")))?;
        num_buf.clear();

        // Units must appear in H, M, S order, each at most once.
        let unit = match ch {
            'H' => 1,
            'M' => 2,
            'S' => 3,
            _ => {
                return Err(SearchError::Format(format!(
                    "unknown unit '{ch}' in '{s}'"
                )))
            }
        };
        if unit <= last_unit {
            return Err(SearchError::Format(format!(
                "unit '{ch}' out of order in '{s}'"
            )));
        }
        last_unit = unit;

        let added = match unit {
            1 => n.checked_mul(60),
            2 => Some(n),
            _ if n == 0 => Some(0),
            _ => {
                return Err(SearchError::Format(format!(
                    "sub-minute durations are not supported: '{s}'"
                )))
            }
        };
        total_minutes = added
            .and_then(|m| total_minutes.checked_add(m))
            .ok_or_else(|| SearchError::Format(format!("duration overflows: '{s}'")))?;
    }

    if !num_buf.is_empty() {
        return Err(SearchError::Format(format!(
            "number without unit at end of '{s}'"
        )));
    }

    Ok(Duration::from_minutes(total_minutes))
}

// ── Internal helpers ────────────────────────────────────────────────────────

fn parse_component(part: &str, whole: &str) -> Result<u32> {
    if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SearchError::Format(format!(
            "expected HH:MM, got '{whole}'"
        )));
    }
    part.parse()
        .map_err(|_| SearchError::Format(format!("expected HH:MM, got '{whole}'")))
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── TimeOfDay ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_time_of_day() {
        let t = parse_time_of_day("17:45").unwrap();
        assert_eq!(t.hour(), 17);
        assert_eq!(t.minute(), 45);
        assert_eq!(t.minutes_since_midnight(), 17 * 60 + 45);
    }

    #[test]
    fn test_parse_time_of_day_single_digit_components() {
        let t = parse_time_of_day("9:5").unwrap();
        assert_eq!(format_time_of_day(t), "09:05");
    }

    #[test]
    fn test_parse_time_of_day_rejects_out_of_range() {
        assert!(matches!(
            parse_time_of_day("24:00"),
            Err(SearchError::Format(_))
        ));
        assert!(matches!(
            parse_time_of_day("12:60"),
            Err(SearchError::Format(_))
        ));
    }

    #[test]
    fn test_parse_time_of_day_rejects_malformed() {
        for input in ["", "12", "12:", ":30", "12:30:00", "ab:cd", "-1:30", "12:3x", " 12:30"] {
            assert!(
                matches!(parse_time_of_day(input), Err(SearchError::Format(_))),
                "accepted {input:?}"
            );
        }
    }

    #[test]
    fn test_time_of_day_from_naive_time_truncates_seconds() {
        let t = TimeOfDay::from(NaiveTime::from_hms_opt(8, 15, 59).unwrap());
        assert_eq!(t.to_string(), "08:15");
    }

    #[test]
    fn test_time_of_day_serde_uses_wire_string() {
        let t = TimeOfDay::new(7, 30).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:30\"");
        let back: TimeOfDay = serde_json::from_str("\"07:30\"").unwrap();
        assert_eq!(back, t);
        assert!(serde_json::from_str::<TimeOfDay>("\"7h30\"").is_err());
    }

    proptest! {
        #[test]
        fn prop_time_of_day_round_trips(hour in 0u32..24, minute in 0u32..60) {
            let s = format!("{hour:02}:{minute:02}");
            prop_assert_eq!(format_time_of_day(parse_time_of_day(&s).unwrap()), s);
        }
    }

    // ── Dates ───────────────────────────────────────────────────────────

    #[test]
    fn test_format_date_pads() {
        assert_eq!(format_date(date(2024, 3, 5)), "2024-03-05");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-03-15").unwrap(), date(2024, 3, 15));
        assert!(matches!(parse_date("2024-13-01"), Err(SearchError::Format(_))));
        assert!(matches!(parse_date("15.03.2024"), Err(SearchError::Format(_))));
    }

    #[test]
    fn test_date_from_parts() {
        assert_eq!(date_from_parts(&[2024, 2, 29]).unwrap(), date(2024, 2, 29));
        assert!(date_from_parts(&[2023, 2, 29]).is_err());
        assert!(date_from_parts(&[2024, 2]).is_err());
        assert!(date_from_parts(&[2024, -1, 3]).is_err());
    }

    #[test]
    fn test_format_date_time_always_has_seconds() {
        let t = TimeOfDay::new(0, 0).unwrap();
        assert_eq!(format_date_time(date(2024, 1, 1), t), "2024-01-01T00:00:00");
    }

    #[test]
    fn test_format_naive_date_time_truncates_fraction() {
        let dt = date(2024, 3, 15).and_hms_milli_opt(9, 5, 7, 999).unwrap();
        assert_eq!(format_naive_date_time(dt), "2024-03-15T09:05:07");
    }

    // ── Duration ────────────────────────────────────────────────────────

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::new(8, 0)).unwrap(), "PT8H0M");
        assert_eq!(format_duration(&Duration::new(0, 0)).unwrap(), "PT0H0M");
        assert_eq!(format_duration(&Duration::new(1, 30)).unwrap(), "PT1H30M");
    }

    #[test]
    fn test_format_duration_missing_component() {
        let d = Duration {
            hours: Some(2),
            minutes: None,
        };
        assert_eq!(
            format_duration(&d),
            Err(SearchError::MissingField("duration.minutes"))
        );
        assert_eq!(
            format_duration(&Duration::unset()),
            Err(SearchError::MissingField("duration.hours"))
        );
    }

    #[test]
    fn test_duration_from_minutes() {
        assert_eq!(Duration::from_minutes(90), Duration::new(1, 30));
        assert_eq!(Duration::from_minutes(59), Duration::new(0, 59));
        assert_eq!(Duration::new(2, 15).total_minutes(), Some(135));
        assert_eq!(Duration::unset().total_minutes(), None);
    }

    #[test]
    fn test_total_minutes_overflow_is_none() {
        assert_eq!(Duration::new(u32::MAX, 0).total_minutes(), None);
        assert_eq!(Duration::new(u32::MAX / 60, 59).total_minutes(), None);
        assert_eq!(
            Duration::new(u32::MAX / 60, 0).total_minutes(),
            Some(u32::MAX / 60 * 60)
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("PT1H30M").unwrap(), Duration::new(1, 30));
        assert_eq!(parse_duration("PT2H").unwrap(), Duration::new(2, 0));
        assert_eq!(parse_duration("PT45M").unwrap(), Duration::new(0, 45));
        assert_eq!(parse_duration("PT90M").unwrap(), Duration::new(1, 30));
        assert_eq!(parse_duration("PT0S").unwrap(), Duration::new(0, 0));
    }

    #[test]
    fn test_parse_duration_rejects() {
        for input in ["", "PT", "P1D", "PT1M2H", "PT1H1H", "PT30S", "PT5", "PTH", "PT1X"] {
            assert!(
                matches!(parse_duration(input), Err(SearchError::Format(_))),
                "accepted {input:?}"
            );
        }
    }
}

//! Month-grid and week-number arithmetic for the date picker.
//!
//! All arithmetic goes through a [`DateArithmetic`] capability handed to
//! [`CalendarGrid`] at construction. [`ChronoCalendar`] is the default
//! implementation; tests and embedders can substitute their own.
//!
//! Dates are timezone-naive wall-clock dates throughout.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, SearchError};

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAY_SHORT_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Number of weeks in a default month grid. Six rows cover every month.
pub const DEFAULT_GRID_WEEKS: usize = 6;

// ── Configurable week start ─────────────────────────────────────────────────

/// Which day begins a week for [`DateArithmetic::start_of_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> i64 {
    match week_start {
        WeekStartDay::Monday => weekday.num_days_from_monday() as i64,
        WeekStartDay::Sunday => weekday.num_days_from_sunday() as i64,
    }
}

/// Which week-number rule the grid labels rows with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekNumbering {
    /// `floor((10 + day_of_year - iso_weekday) / 7)`, with 0 mapped to 53.
    ///
    /// Agrees with ISO 8601 except around some year boundaries, where it
    /// clamps instead of moving the week into the neighbouring year.
    #[default]
    Legacy,
    /// Full ISO 8601 week-date numbering.
    Iso,
}

// ── DateArithmetic capability ───────────────────────────────────────────────

/// Date arithmetic needed by the grid and by duration reconciliation.
pub trait DateArithmetic {
    /// Signed whole minutes from `from` to `to`.
    fn diff_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64;

    /// Signed whole days from `from` to `to`.
    fn diff_days(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        self.diff_minutes(from.and_time(NaiveTime::MIN), to.and_time(NaiveTime::MIN)) / (24 * 60)
    }

    /// First day of the month containing `date`.
    fn start_of_month(&self, date: NaiveDate) -> NaiveDate;

    /// First day of the week containing `date`.
    fn start_of_week(&self, date: NaiveDate, week_start: WeekStartDay) -> NaiveDate;

    /// `date` shifted by `days`, or `None` if that leaves the representable range.
    fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate>;

    fn weekday(&self, date: NaiveDate) -> Weekday;

    /// Three-letter English weekday name (`"Mon"` .. `"Sun"`).
    fn weekday_short_name(&self, date: NaiveDate) -> &'static str {
        WEEKDAY_SHORT_NAMES[self.weekday(date).num_days_from_monday() as usize]
    }
}

impl<A: DateArithmetic + ?Sized> DateArithmetic for &A {
    fn diff_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        (**self).diff_minutes(from, to)
    }

    fn diff_days(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        (**self).diff_days(from, to)
    }

    fn start_of_month(&self, date: NaiveDate) -> NaiveDate {
        (**self).start_of_month(date)
    }

    fn start_of_week(&self, date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
        (**self).start_of_week(date, week_start)
    }

    fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
        (**self).add_days(date, days)
    }

    fn weekday(&self, date: NaiveDate) -> Weekday {
        (**self).weekday(date)
    }

    fn weekday_short_name(&self, date: NaiveDate) -> &'static str {
        (**self).weekday_short_name(date)
    }
}

/// [`DateArithmetic`] backed by chrono's proleptic Gregorian calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChronoCalendar;

impl DateArithmetic for ChronoCalendar {
    fn diff_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        (to - from).num_minutes()
    }

    fn diff_days(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        (to - from).num_days()
    }

    fn start_of_month(&self, date: NaiveDate) -> NaiveDate {
        date.with_day(1).unwrap_or(date)
    }

    fn start_of_week(&self, date: NaiveDate, week_start: WeekStartDay) -> NaiveDate {
        let back = days_from_week_start(date.weekday(), week_start);
        date.checked_sub_signed(chrono::Duration::days(back))
            .unwrap_or(date)
    }

    fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
        date.checked_add_signed(chrono::Duration::try_days(days)?)
    }

    fn weekday(&self, date: NaiveDate) -> Weekday {
        date.weekday()
    }
}

// ── CalendarGrid ────────────────────────────────────────────────────────────

/// One row of a month grid: seven consecutive days, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    /// Week number of the row, taken from its Thursday.
    pub week_number: u32,
    pub days: [NaiveDate; 7],
}

impl CalendarWeek {
    pub fn monday(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn thursday(&self) -> NaiveDate {
        self.days[3]
    }

    pub fn sunday(&self) -> NaiveDate {
        self.days[6]
    }
}

/// Month-view calendar arithmetic over an injected [`DateArithmetic`].
#[derive(Debug, Clone)]
pub struct CalendarGrid<A> {
    calendar: A,
    numbering: WeekNumbering,
}

impl CalendarGrid<ChronoCalendar> {
    /// A grid over [`ChronoCalendar`] with legacy week numbering.
    pub fn chrono() -> Self {
        CalendarGrid::new(ChronoCalendar)
    }
}

impl<A: DateArithmetic> CalendarGrid<A> {
    pub fn new(calendar: A) -> Self {
        CalendarGrid {
            calendar,
            numbering: WeekNumbering::default(),
        }
    }

    pub fn with_numbering(mut self, numbering: WeekNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    pub fn numbering(&self) -> WeekNumbering {
        self.numbering
    }

    pub fn calendar(&self) -> &A {
        &self.calendar
    }

    /// Week number (1..=53) of the week containing `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chairspace_search::calendar::CalendarGrid;
    /// use chrono::NaiveDate;
    ///
    /// let grid = CalendarGrid::chrono();
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    /// assert_eq!(grid.week_number(date), 11);
    /// ```
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        match self.numbering {
            WeekNumbering::Iso => date.iso_week().week(),
            WeekNumbering::Legacy => self.legacy_week_number(date),
        }
    }

    fn legacy_week_number(&self, date: NaiveDate) -> u32 {
        let jan_first = date.with_ordinal(1).unwrap_or(date);
        let day_of_year = self.calendar.diff_days(jan_first, date) + 1;
        let weekday = self.calendar.weekday(date).number_from_monday() as i64;
        let raw = (10 + day_of_year - weekday).div_euclid(7);

        if raw == 0 {
            53
        } else {
            raw as u32
        }
    }

    /// `count` consecutive weeks starting with the week that contains the
    /// first day of `month` (0-based) in `year`.
    ///
    /// Rows spill over into the neighbouring months so the grid stays
    /// rectangular.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidDate`] if `month` is outside `0..=11`,
    /// the year is out of chrono's range, or the grid would run past it.
    pub fn weeks_of_month(&self, year: i32, month: u32, count: usize) -> Result<Vec<CalendarWeek>> {
        if month > 11 {
            return Err(SearchError::InvalidDate(format!(
                "month index {month} is outside 0..=11"
            )));
        }
        let first = NaiveDate::from_ymd_opt(year, month + 1, 1).ok_or_else(|| {
            SearchError::InvalidDate(format!("{year}-{:02} is out of range", month + 1))
        })?;

        let month_start = self.calendar.start_of_month(first);
        let grid_start = self
            .calendar
            .start_of_week(month_start, WeekStartDay::Monday);
        trace!(year, month, count, %grid_start, "building month grid");

        if count == 0 {
            return Ok(Vec::new());
        }
        // Reject grids that run out of range before allocating any rows.
        let last_day = i64::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(7))
            .map(|days| days - 1)
            .ok_or_else(|| SearchError::InvalidDate(format!("{count} weeks is out of range")))?;
        self.shift(grid_start, last_day)?;

        let mut weeks = Vec::with_capacity(count);
        for w in 0..count {
            let week_start = self.shift(grid_start, w as i64 * 7)?;
            let mut days = [week_start; 7];
            for (d, slot) in days.iter_mut().enumerate().skip(1) {
                *slot = self.shift(week_start, d as i64)?;
            }
            weeks.push(CalendarWeek {
                week_number: self.week_number(days[3]),
                days,
            });
        }

        Ok(weeks)
    }

    /// See [`month_name`].
    pub fn month_name(&self, month: usize) -> Option<&'static str> {
        month_name(month)
    }

    /// See [`weekday_names`].
    pub fn weekday_names(&self) -> &'static [&'static str; 7] {
        weekday_names()
    }

    fn shift(&self, date: NaiveDate, days: i64) -> Result<NaiveDate> {
        self.calendar
            .add_days(date, days)
            .ok_or_else(|| SearchError::InvalidDate(format!("{date} + {days} days is out of range")))
    }
}

/// English name of a 0-based month index, `None` outside `0..=11`.
pub fn month_name(month: usize) -> Option<&'static str> {
    MONTH_NAMES.get(month).copied()
}

/// English weekday names, Monday first.
pub fn weekday_names() -> &'static [&'static str; 7] {
    &WEEKDAY_NAMES
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── ChronoCalendar ──────────────────────────────────────────────────

    #[test]
    fn test_diff_minutes_is_signed() {
        let cal = ChronoCalendar;
        let a = date(2024, 3, 15).and_hms_opt(9, 0, 0).unwrap();
        let b = date(2024, 3, 15).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(cal.diff_minutes(a, b), 90);
        assert_eq!(cal.diff_minutes(b, a), -90);
    }

    #[test]
    fn test_start_of_week() {
        let cal = ChronoCalendar;
        // Fri Mar 15 2024
        assert_eq!(
            cal.start_of_week(date(2024, 3, 15), WeekStartDay::Monday),
            date(2024, 3, 11)
        );
        assert_eq!(
            cal.start_of_week(date(2024, 3, 15), WeekStartDay::Sunday),
            date(2024, 3, 10)
        );
        // A Monday is its own week start
        assert_eq!(
            cal.start_of_week(date(2024, 4, 1), WeekStartDay::Monday),
            date(2024, 4, 1)
        );
    }

    #[test]
    fn test_start_of_month_and_add_days() {
        let cal = ChronoCalendar;
        assert_eq!(cal.start_of_month(date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(cal.add_days(date(2024, 2, 28), 2), Some(date(2024, 3, 1)));
        assert_eq!(cal.add_days(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn test_weekday_short_name() {
        let cal = ChronoCalendar;
        assert_eq!(cal.weekday_short_name(date(2024, 3, 15)), "Fri");
        assert_eq!(cal.weekday_short_name(date(2024, 3, 17)), "Sun");
    }

    #[test]
    fn test_default_diff_days_goes_through_minutes() {
        struct MinutesOnly;
        impl DateArithmetic for MinutesOnly {
            fn diff_minutes(&self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
                (to - from).num_minutes()
            }
            fn start_of_month(&self, date: NaiveDate) -> NaiveDate {
                date.with_day(1).unwrap()
            }
            fn start_of_week(&self, date: NaiveDate, ws: WeekStartDay) -> NaiveDate {
                ChronoCalendar.start_of_week(date, ws)
            }
            fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
                ChronoCalendar.add_days(date, days)
            }
            fn weekday(&self, date: NaiveDate) -> Weekday {
                date.weekday()
            }
        }

        assert_eq!(MinutesOnly.diff_days(date(2024, 1, 1), date(2024, 3, 15)), 74);
        let grid = CalendarGrid::new(MinutesOnly);
        assert_eq!(grid.week_number(date(2024, 3, 15)), 11);
    }

    // ── week_number ─────────────────────────────────────────────────────

    #[test]
    fn test_week_number_mid_year() {
        let grid = CalendarGrid::chrono();
        assert_eq!(grid.week_number(date(2024, 3, 15)), 11);
        assert_eq!(grid.week_number(date(2024, 1, 1)), 1);
    }

    #[test]
    fn test_week_number_fallback_to_53() {
        let grid = CalendarGrid::chrono();
        // Fri Jan 1 2021 belongs to 2020-W53
        assert_eq!(grid.week_number(date(2021, 1, 1)), 53);
        // Sat Jan 1 2022 belongs to 2021-W52; the legacy rule clamps to 53
        assert_eq!(grid.week_number(date(2022, 1, 1)), 53);
    }

    #[test]
    fn test_week_number_legacy_differs_from_iso_at_year_end() {
        // Tue Dec 31 2024 is ISO 2025-W01
        let legacy = CalendarGrid::chrono();
        let iso = CalendarGrid::chrono().with_numbering(WeekNumbering::Iso);
        assert_eq!(legacy.week_number(date(2024, 12, 31)), 53);
        assert_eq!(iso.week_number(date(2024, 12, 31)), 1);
        assert_eq!(iso.week_number(date(2022, 1, 1)), 52);
    }

    proptest! {
        #[test]
        fn prop_week_number_stable_within_week(year in 1970i32..2100, ordinal in 1u32..=365) {
            let grid = CalendarGrid::chrono();
            let day = NaiveDate::from_yo_opt(year, ordinal).unwrap();
            let monday = ChronoCalendar.start_of_week(day, WeekStartDay::Monday);
            let sunday = monday + chrono::Duration::days(6);
            prop_assume!(monday.year() == sunday.year());
            prop_assume!(monday.ordinal() > 3);

            let expected = grid.week_number(monday);
            for offset in 1..7 {
                let d = monday + chrono::Duration::days(offset);
                prop_assert_eq!(grid.week_number(d), expected);
            }
        }
    }

    // ── weeks_of_month ──────────────────────────────────────────────────

    #[test]
    fn test_weeks_of_month_march_2024() {
        let grid = CalendarGrid::chrono();
        let weeks = grid.weeks_of_month(2024, 2, DEFAULT_GRID_WEEKS).unwrap();

        assert_eq!(weeks.len(), 6);
        // Mar 1 2024 is a Friday → grid opens on Mon Feb 26
        assert_eq!(weeks[0].monday(), date(2024, 2, 26));
        assert_eq!(weeks[0].thursday(), date(2024, 2, 29));
        assert_eq!(weeks[0].week_number, 9);
        assert_eq!(weeks[5].monday(), date(2024, 4, 1));
        assert_eq!(weeks[5].sunday(), date(2024, 4, 7));
    }

    #[test]
    fn test_weeks_of_month_starting_on_monday() {
        let grid = CalendarGrid::chrono();
        let weeks = grid.weeks_of_month(2024, 3, DEFAULT_GRID_WEEKS).unwrap();
        assert_eq!(weeks[0].monday(), date(2024, 4, 1));
        assert_eq!(weeks[0].week_number, 14);
    }

    #[test]
    fn test_weeks_of_month_numbers_from_thursday() {
        let grid = CalendarGrid::chrono();
        // Jan 2021 grid opens on Mon Dec 28 2020; its Thursday is Dec 31 2020
        let weeks = grid.weeks_of_month(2021, 0, DEFAULT_GRID_WEEKS).unwrap();
        assert_eq!(weeks[0].monday(), date(2020, 12, 28));
        assert_eq!(weeks[0].week_number, 53);
        assert_eq!(weeks[1].week_number, 1);
    }

    #[test]
    fn test_weeks_of_month_custom_count() {
        let grid = CalendarGrid::chrono();
        assert_eq!(grid.weeks_of_month(2024, 1, 4).unwrap().len(), 4);
        assert!(grid.weeks_of_month(2024, 1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_weeks_of_month_rejects_bad_month() {
        let grid = CalendarGrid::chrono();
        assert!(matches!(
            grid.weeks_of_month(2024, 12, 6),
            Err(SearchError::InvalidDate(_))
        ));
        assert!(matches!(
            grid.weeks_of_month(i32::MAX, 0, 6),
            Err(SearchError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_weeks_of_month_rejects_oversized_grid() {
        let grid = CalendarGrid::chrono();
        assert!(matches!(
            grid.weeks_of_month(2024, 2, usize::MAX),
            Err(SearchError::InvalidDate(_))
        ));
        // Fits in i64 but runs past the last representable date
        assert!(matches!(
            grid.weeks_of_month(2024, 2, 100_000_000_000),
            Err(SearchError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_calendar_week_serializes_camel_case() {
        let weeks = CalendarGrid::chrono().weeks_of_month(2024, 2, 1).unwrap();
        let json = serde_json::to_value(&weeks[0]).unwrap();
        assert_eq!(json["weekNumber"], 9);
        assert_eq!(json["days"][0], "2024-02-26");
        assert!(json.get("week_number").is_none());
    }

    proptest! {
        #[test]
        fn prop_weeks_of_month_is_contiguous(year in 1900i32..2200, month in 0u32..12) {
            let grid = CalendarGrid::chrono();
            let weeks = grid.weeks_of_month(year, month, DEFAULT_GRID_WEEKS).unwrap();
            let first = date(year, month + 1, 1);

            prop_assert_eq!(weeks.len(), 6);
            prop_assert!(weeks[0].monday() <= first);
            prop_assert!(first - weeks[0].monday() < chrono::Duration::days(7));

            let mut expected = weeks[0].monday();
            for week in &weeks {
                prop_assert_eq!(week.monday().weekday(), Weekday::Mon);
                for day in week.days {
                    prop_assert_eq!(day, expected);
                    expected = expected.succ_opt().unwrap();
                }
            }
        }
    }

    // ── names ───────────────────────────────────────────────────────────

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(0), Some("January"));
        assert_eq!(month_name(11), Some("December"));
        assert_eq!(month_name(12), None);
    }

    #[test]
    fn test_weekday_names_monday_first() {
        let names = CalendarGrid::chrono().weekday_names();
        assert_eq!(names[0], "Monday");
        assert_eq!(names[6], "Sunday");
    }
}

//! Search form state, validation and query-parameter derivation.
//!
//! [`SearchCriteria`] is a plain value the UI edits field by field. The
//! derivations over it ([`resolved_duration`], [`create_query_params`],
//! [`validate_criteria`]) are pure functions taking the criteria, a
//! [`DateArithmetic`] capability and an explicit "today" anchor.
//! [`SearchForm`] bundles the criteria with its capability and the last
//! validation result for callers that want the stateful surface.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::DateArithmetic;
use crate::codec::{format_date_time, format_duration, Duration, TimeOfDay};
use crate::error::{Result, SearchError};
use crate::query::QueryParams;

pub const GENERIC_ERROR: &str = "An error has occurred";
pub const CAPACITY_ERROR: &str = "Capacity must be more than 0";
/// Shown for either side of the time window when it is unset; the web
/// client uses the same wording for both fields.
pub const TIME_REQUIRED: &str = "Start time is required";

// ── Area types ──────────────────────────────────────────────────────────────

/// Space category filter. [`AreaType::Any`] means "no constraint".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaType {
    Any,
    #[default]
    Desk,
    Room,
    Floor,
    Building,
    Other,
}

impl AreaType {
    pub const ALL: [AreaType; 6] = [
        AreaType::Any,
        AreaType::Desk,
        AreaType::Room,
        AreaType::Floor,
        AreaType::Building,
        AreaType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaType::Any => "any",
            AreaType::Desk => "desk",
            AreaType::Room => "room",
            AreaType::Floor => "floor",
            AreaType::Building => "building",
            AreaType::Other => "other",
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, AreaType::Any)
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaType {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        AreaType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| SearchError::Format(format!("unknown area type: '{s}'")))
    }
}

// ── Criteria ────────────────────────────────────────────────────────────────

/// The editable search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub area_type: AreaType,
    pub capacity: u32,
    /// `None` means "today".
    pub date: Option<NaiveDate>,
    pub time_start: Option<TimeOfDay>,
    pub time_end: Option<TimeOfDay>,
    pub duration: Duration,
    /// Super-area id; `None` means any location.
    pub location: Option<String>,
    pub features: BTreeSet<String>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        SearchCriteria {
            area_type: AreaType::Desk,
            capacity: 1,
            date: None,
            time_start: Some(TimeOfDay::MIDNIGHT),
            time_end: Some(TimeOfDay::END_OF_DAY),
            duration: Duration::unset(),
            location: None,
            features: BTreeSet::new(),
        }
    }
}

impl SearchCriteria {
    pub fn with_area_type(self, area_type: AreaType) -> Self {
        SearchCriteria { area_type, ..self }
    }

    pub fn with_capacity(self, capacity: u32) -> Self {
        SearchCriteria { capacity, ..self }
    }

    pub fn with_date(self, date: NaiveDate) -> Self {
        SearchCriteria {
            date: Some(date),
            ..self
        }
    }

    pub fn with_times(self, start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> Self {
        SearchCriteria {
            time_start: start,
            time_end: end,
            ..self
        }
    }

    pub fn with_duration(self, duration: Duration) -> Self {
        SearchCriteria { duration, ..self }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        SearchCriteria {
            location: Some(location.into()),
            ..self
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    /// The selected date, falling back to `today`.
    pub fn effective_date(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

/// Form fields that carry validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    AreaType,
    Capacity,
    Date,
    TimeStart,
    TimeEnd,
    Duration,
    Location,
    Features,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::AreaType,
        Field::Capacity,
        Field::Date,
        Field::TimeStart,
        Field::TimeEnd,
        Field::Duration,
        Field::Location,
        Field::Features,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::AreaType => "areaType",
            Field::Capacity => "capacity",
            Field::Date => "date",
            Field::TimeStart => "timeStart",
            Field::TimeEnd => "timeEnd",
            Field::Duration => "duration",
            Field::Location => "location",
            Field::Features => "features",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Valid,
    /// Invalid, with the field's sole message.
    Invalid(&'static str),
    /// Invalid without a specific message; reported as [`GENERIC_ERROR`].
    Failed,
}

impl RuleOutcome {
    fn into_messages(self) -> Option<Vec<String>> {
        match self {
            RuleOutcome::Valid => None,
            RuleOutcome::Invalid(msg) => Some(vec![msg.to_string()]),
            RuleOutcome::Failed => Some(vec![GENERIC_ERROR.to_string()]),
        }
    }
}

/// Messages for every field that failed; fields that passed are absent.
pub type ErrorMessages = BTreeMap<Field, Vec<String>>;

/// Run every field rule against `criteria`.
///
/// The returned map is complete for the current values: a field is present
/// iff its rule failed.
pub fn validate_criteria(criteria: &SearchCriteria) -> ErrorMessages {
    let [start_rule, end_rule] = check_time_window(criteria.time_start, criteria.time_end);

    Field::ALL
        .into_iter()
        .filter_map(|field| {
            let outcome = match field {
                Field::Capacity => check_capacity(criteria.capacity),
                Field::TimeStart => start_rule.clone(),
                Field::TimeEnd => end_rule.clone(),
                Field::AreaType
                | Field::Date
                | Field::Duration
                | Field::Location
                | Field::Features => RuleOutcome::Valid,
            };
            outcome.into_messages().map(|messages| (field, messages))
        })
        .collect()
}

fn check_capacity(capacity: u32) -> RuleOutcome {
    if capacity > 0 {
        RuleOutcome::Valid
    } else {
        RuleOutcome::Invalid(CAPACITY_ERROR)
    }
}

/// Start and end are required together: each side is missing on its own
/// or fails because the other side is missing.
fn check_time_window(start: Option<TimeOfDay>, end: Option<TimeOfDay>) -> [RuleOutcome; 2] {
    let side = |own: Option<TimeOfDay>, other: Option<TimeOfDay>, missing| match (own, other) {
        (None, _) => RuleOutcome::Invalid(missing),
        (Some(_), None) => RuleOutcome::Failed,
        (Some(_), Some(_)) => RuleOutcome::Valid,
    };
    [side(start, end, TIME_REQUIRED), side(end, start, TIME_REQUIRED)]
}

// ── Derivations ─────────────────────────────────────────────────────────────

/// Complete a possibly partial duration.
///
/// - Either time unset → `0h0m`.
/// - Exactly one of hours/minutes set → the other defaults to 0.
/// - Neither set → the absolute span between start and end on the
///   selected date.
/// - Both set → unchanged.
///
/// # Examples
///
/// ```
/// use chairspace_search::calendar::ChronoCalendar;
/// use chairspace_search::codec::{Duration, TimeOfDay};
/// use chairspace_search::criteria::{resolved_duration, SearchCriteria};
/// use chrono::NaiveDate;
///
/// let criteria = SearchCriteria::default().with_times(
///     Some(TimeOfDay::new(9, 0).unwrap()),
///     Some(TimeOfDay::new(10, 30).unwrap()),
/// );
/// let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
/// assert_eq!(resolved_duration(&criteria, &ChronoCalendar, today), Duration::new(1, 30));
/// ```
pub fn resolved_duration<A: DateArithmetic>(
    criteria: &SearchCriteria,
    calendar: &A,
    today: NaiveDate,
) -> Duration {
    let (Some(start), Some(end)) = (criteria.time_start, criteria.time_end) else {
        return Duration::new(0, 0);
    };

    match (criteria.duration.hours, criteria.duration.minutes) {
        (Some(hours), Some(minutes)) => Duration::new(hours, minutes),
        (Some(hours), None) => Duration::new(hours, 0),
        (None, Some(minutes)) => Duration::new(0, minutes),
        (None, None) => {
            let day = criteria.effective_date(today);
            let span = calendar.diff_minutes(
                day.and_time(start.to_naive_time()),
                day.and_time(end.to_naive_time()),
            );
            let minutes = u32::try_from(span.unsigned_abs()).unwrap_or(u32::MAX);
            debug!(%start, %end, minutes, "duration derived from time span");
            Duration::from_minutes(minutes)
        }
    }
}

/// Build the back-end search parameters.
///
/// Does not validate; unset values are simply left out. `area-type` is
/// omitted for [`AreaType::Any`] and `features` when the set is empty.
///
/// # Errors
///
/// Only fails if the duration cannot be formatted, which a resolved
/// duration never triggers.
pub fn create_query_params<A: DateArithmetic>(
    criteria: &SearchCriteria,
    calendar: &A,
    today: NaiveDate,
) -> Result<QueryParams> {
    let mut params = QueryParams::new();
    let day = criteria.effective_date(today);

    if !criteria.area_type.is_any() {
        params.insert("area-type", criteria.area_type.as_str());
    }
    params.insert("capacity", criteria.capacity.to_string());
    params.insert_opt("super-area", criteria.location.clone());
    if !criteria.features.is_empty() {
        params.insert(
            "features",
            criteria.features.iter().cloned().collect::<Vec<_>>(),
        );
    }
    params.insert_opt(
        "start-time",
        criteria.time_start.map(|t| format_date_time(day, t)),
    );
    params.insert_opt(
        "end-time",
        criteria.time_end.map(|t| format_date_time(day, t)),
    );

    let duration = if criteria.duration.is_complete() {
        criteria.duration
    } else {
        resolved_duration(criteria, calendar, today)
    };
    params.insert("duration", format_duration(&duration)?);

    debug!(count = params.len(), "built search query params");
    Ok(params)
}

// ── SearchForm ──────────────────────────────────────────────────────────────

/// Search criteria bound to a date-arithmetic capability, plus the
/// messages from the last [`SearchForm::validate`] call.
#[derive(Debug, Clone)]
pub struct SearchForm<A> {
    criteria: SearchCriteria,
    calendar: A,
    error_messages: ErrorMessages,
}

impl<A> SearchForm<A> {
    pub fn builder() -> SearchFormBuilder<A> {
        SearchFormBuilder {
            criteria: SearchCriteria::default(),
            calendar: None,
        }
    }
}

impl<A: DateArithmetic> SearchForm<A> {
    /// A form with default criteria.
    pub fn new(calendar: A) -> Self {
        SearchForm::with_criteria(SearchCriteria::default(), calendar)
    }

    pub fn with_criteria(criteria: SearchCriteria, calendar: A) -> Self {
        SearchForm {
            criteria,
            calendar,
            error_messages: ErrorMessages::new(),
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut SearchCriteria {
        &mut self.criteria
    }

    pub fn calendar(&self) -> &A {
        &self.calendar
    }

    /// Re-run every rule, replacing all previous messages.
    pub fn validate(&mut self) -> bool {
        self.error_messages = validate_criteria(&self.criteria);
        let valid = self.error_messages.is_empty();
        debug!(
            valid,
            failed = ?self.error_messages.keys().collect::<Vec<_>>(),
            "validated search criteria"
        );
        valid
    }

    pub fn error_messages(&self) -> &ErrorMessages {
        &self.error_messages
    }

    /// Messages for one field, if its rule failed on the last validation.
    pub fn errors_for(&self, field: Field) -> Option<&[String]> {
        self.error_messages.get(&field).map(Vec::as_slice)
    }

    /// See [`resolved_duration`].
    pub fn default_duration(&self, today: NaiveDate) -> Duration {
        resolved_duration(&self.criteria, &self.calendar, today)
    }

    /// See [`create_query_params`].
    pub fn create_query_params(&self, today: NaiveDate) -> Result<QueryParams> {
        create_query_params(&self.criteria, &self.calendar, today)
    }

    /// [`SearchForm::create_query_params`] anchored on the local date.
    pub fn query_params_now(&self) -> Result<QueryParams> {
        self.create_query_params(Local::now().date_naive())
    }
}

/// Builder for [`SearchForm`] that reports a missing capability at
/// construction time.
#[derive(Debug, Clone)]
pub struct SearchFormBuilder<A> {
    criteria: SearchCriteria,
    calendar: Option<A>,
}

impl<A: DateArithmetic> SearchFormBuilder<A> {
    pub fn criteria(mut self, criteria: SearchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn calendar(mut self, calendar: A) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// # Errors
    ///
    /// Returns [`SearchError::MissingCapability`] if no calendar was given.
    pub fn build(self) -> Result<SearchForm<A>> {
        let calendar = self
            .calendar
            .ok_or(SearchError::MissingCapability("date arithmetic"))?;
        Ok(SearchForm::with_criteria(self.criteria, calendar))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

//! # chairspace-search
//!
//! Search and reservation time reconciliation for the Chairspace booking
//! client.
//!
//! Turns a partially filled search form (date, start/end time, optional
//! duration, area filters) into the validated, canonical query parameters
//! the booking back-end expects, and provides the calendar arithmetic the
//! date picker renders from.
//!
//! ## Modules
//!
//! - [`codec`]: `HH:MM`, `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` and `PTxHyM` wire formats
//! - [`calendar`]: month grids, week numbers, the injectable date-arithmetic capability
//! - [`criteria`]: search form state, validation, duration reconciliation, query building
//! - [`query`]: ordered query-parameter mapping
//! - [`backend`]: the back-end seam and the submit path
//! - [`reservation`]: reservation payloads
//! - [`config`]: client configuration
//! - [`error`]: Error types

pub mod backend;
pub mod calendar;
pub mod codec;
pub mod config;
pub mod criteria;
pub mod error;
pub mod query;
pub mod reservation;

pub use backend::{submit_search, Backend, PageRequest, SearchRequest, SpaceSummary, SubmitOutcome};
pub use calendar::{
    month_name, weekday_names, CalendarGrid, CalendarWeek, ChronoCalendar, DateArithmetic,
    WeekNumbering, WeekStartDay,
};
pub use codec::{
    format_date, format_date_time, format_duration, format_time_of_day, parse_date,
    parse_duration, parse_time_of_day, Duration, TimeOfDay,
};
pub use config::SearchConfig;
pub use criteria::{
    create_query_params, resolved_duration, validate_criteria, AreaType, ErrorMessages, Field,
    SearchCriteria, SearchForm,
};
pub use error::SearchError;
pub use query::{ParamValue, QueryParams};
pub use reservation::{reservation_window_params, ReservationDraft};

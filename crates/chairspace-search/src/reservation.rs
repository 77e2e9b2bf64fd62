//! Reservation payloads built with the wire codec.

use chrono::NaiveDate;
use serde::Serialize;

use crate::codec::{format_date_time, TimeOfDay};
use crate::error::{Result, SearchError};
use crate::query::QueryParams;

/// A reservation about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    pub area: String,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub comment: Option<String>,
}

/// JSON body of the reservation-creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPayload {
    pub area: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ReservationDraft {
    /// # Errors
    ///
    /// [`SearchError::MissingField`] if the area is blank,
    /// [`SearchError::Format`] if the window is empty or reversed.
    pub fn to_payload(&self) -> Result<ReservationPayload> {
        if self.area.trim().is_empty() {
            return Err(SearchError::MissingField("area"));
        }
        if self.end <= self.start {
            return Err(SearchError::Format(format!(
                "reservation ends ({}) before it starts ({})",
                self.end, self.start
            )));
        }
        Ok(ReservationPayload {
            area: self.area.clone(),
            start_time: format_date_time(self.date, self.start),
            end_time: format_date_time(self.date, self.end),
            comment: self
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// `start`/`end` parameters for listing an area's reservations in a window.
pub fn reservation_window_params(
    start: (NaiveDate, TimeOfDay),
    end: (NaiveDate, TimeOfDay),
) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("start", format_date_time(start.0, start.1));
    params.insert("end", format_date_time(end.0, end.1));
    params
}

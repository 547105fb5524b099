//! Time and weekday parsing for lesson slots.

use crate::errors::{AppError, AppResult};
use chrono::{NaiveTime, Weekday};

/// `HH:MM` (seconds are accepted and kept).
pub fn parse_time(t: &str) -> AppResult<NaiveTime> {
    let t = t.trim();
    NaiveTime::parse_from_str(t, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
        .map_err(|_| AppError::InvalidTime(t.to_string()))
}

/// English day name or abbreviation, or 1..7 with Monday = 1.
pub fn parse_weekday(s: &str) -> AppResult<Weekday> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return crate::models::subject::weekday_from_db(n)
            .ok_or_else(|| AppError::InvalidDate(format!("weekday {s}")));
    }
    s.parse::<Weekday>()
        .map_err(|_| AppError::InvalidDate(format!("weekday {s}")))
}

pub fn format_hm(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `--date` argument, defaulting to today.
pub fn date_or_today(s: Option<&str>) -> AppResult<NaiveDate> {
    match s {
        Some(raw) => parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string())),
        None => Ok(today()),
    }
}

/// Longest absence or leave request, about one school term.
pub const MAX_REQUEST_DAYS: i64 = 120;

/// A request span must be ordered and at most `MAX_REQUEST_DAYS` long.
pub fn check_request_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation("End date is before start date".into()));
    }
    let days = (end - start).num_days() + 1;
    if days > MAX_REQUEST_DAYS {
        return Err(AppError::Validation(format!(
            "A request may cover at most {MAX_REQUEST_DAYS} days ({days} requested)"
        )));
    }
    Ok(())
}

/// Every day from `start` to `end`, both included.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

fn month_last_day(y: i32, m: u32) -> Option<u32> {
    let first_next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    }?;
    first_next.pred_opt().map(|d| d.day())
}

/// First and last day covered by a period token: `YYYY`, `YYYY-MM` or
/// `YYYY-MM-DD`.
fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let bad = || AppError::InvalidDate(p.to_string());
    match p.len() {
        4 => {
            let y: i32 = p.parse().map_err(|_| bad())?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(bad)?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(bad)?;
            Ok((d1, d2))
        }
        7 => {
            let y: i32 = p.get(0..4).and_then(|s| s.parse().ok()).ok_or_else(bad)?;
            let m: u32 = p.get(5..7).and_then(|s| s.parse().ok()).ok_or_else(bad)?;
            let last = month_last_day(y, m).ok_or_else(bad)?;
            let d1 = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(bad)?;
            let d2 = NaiveDate::from_ymd_opt(y, m, last).ok_or_else(bad)?;
            Ok((d1, d2))
        }
        10 => {
            let d = parse_date(p).ok_or_else(bad)?;
            Ok((d, d))
        }
        _ => Err(bad()),
    }
}

/// Parse a `--range` value.
///
/// Accepts a single period (`YYYY`, `YYYY-MM`, `YYYY-MM-DD`) or two periods
/// of the same shape joined by `:`.
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();
    let (start, end) = match r.split_once(':') {
        Some((a, b)) => {
            let (a, b) = (a.trim(), b.trim());
            if a.len() != b.len() {
                return Err(AppError::InvalidDate(format!(
                    "{r}: start and end must have the same format"
                )));
            }
            (period_bounds(a)?.0, period_bounds(b)?.1)
        }
        None => period_bounds(r)?,
    };
    if end < start {
        return Err(AppError::InvalidDate(format!("{r}: end is before start")));
    }
    Ok((start, end))
}

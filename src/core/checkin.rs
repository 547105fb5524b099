//! Self check-in: teachers open a short-lived code for a class and students
//! redeem it for a `present` record stamped with the check-in time.

use crate::db::repo::{Order, Query, Repo, date_value};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::session::AttendanceSession;
use crate::models::student::Student;
use chrono::{DateTime, Duration, Local, Timelike};
use rand::Rng;
use rusqlite::{Connection, ErrorCode};

pub const MSG_CHECKED_IN: &str = "Checked in successfully";
pub const MSG_INVALID_CODE: &str = "Invalid or expired code";
pub const MSG_OTHER_CLASS: &str = "This code is for a different class";
pub const MSG_ALREADY: &str = "You have already checked in today";
pub const MSG_FAILED: &str = "Failed to check in. Please try again.";

const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Outcome shown to the student. The matcher never returns an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInOutcome {
    pub success: bool,
    pub message: String,
}

impl CheckInOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            message: MSG_CHECKED_IN.to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

pub fn generate_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len.max(4))
        .map(|_| CODE_CHARSET[rng.gen_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Open a check-in window for `class_id`. Earlier sessions of the class are
/// deactivated so only one code is live per class.
pub fn open_session(
    conn: &Connection,
    class_id: i64,
    created_by: i64,
    minutes: i64,
    code: Option<&str>,
    code_len: usize,
    now: DateTime<Local>,
) -> AppResult<AttendanceSession> {
    if minutes <= 0 {
        return Err(AppError::Validation(
            "Session duration must be at least one minute".into(),
        ));
    }

    let code = match code {
        Some(c) => {
            let c = c.trim();
            if c.len() < 4 || !c.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                return Err(AppError::Validation(
                    "Check-in codes must be at least 4 letters or digits".into(),
                ));
            }
            c.to_string()
        }
        None => unused_code(conn, code_len, now)?,
    };

    close_sessions(conn, class_id)?;

    let mut session = AttendanceSession {
        id: 0,
        class_id,
        session_code: code,
        expires_at: now + Duration::minutes(minutes),
        is_active: true,
        created_by,
        created_at: now.to_rfc3339(),
    };
    session.id = Repo::<AttendanceSession>::new(conn).insert(&session)?;
    Ok(session)
}

/// Random codes are retried a few times so two open windows never share one.
fn unused_code(conn: &Connection, len: usize, now: DateTime<Local>) -> AppResult<String> {
    let mut code = generate_code(len);
    for _ in 0..5 {
        if open_sessions_for_code(conn, &code, now)?.is_empty() {
            break;
        }
        code = generate_code(len);
    }
    Ok(code)
}

/// Deactivate every active session of the class. Returns how many closed.
pub fn close_sessions(conn: &Connection, class_id: i64) -> AppResult<usize> {
    Repo::<AttendanceSession>::new(conn).update_where(
        &[("is_active", 0i64.into())],
        &Query::new().eq("class_id", class_id).eq("is_active", 1i64),
    )
}

pub fn active_session(
    conn: &Connection,
    class_id: i64,
    now: DateTime<Local>,
) -> AppResult<Option<AttendanceSession>> {
    let sessions = Repo::<AttendanceSession>::new(conn).list(
        &Query::new()
            .eq("class_id", class_id)
            .eq("is_active", 1i64)
            .order_by("id", Order::Desc),
    )?;
    Ok(sessions.into_iter().find(|s| s.is_open(now)))
}

/// Every active, unexpired session using `code`, newest first.
fn open_sessions_for_code(
    conn: &Connection,
    code: &str,
    now: DateTime<Local>,
) -> AppResult<Vec<AttendanceSession>> {
    let sessions = Repo::<AttendanceSession>::new(conn).list(
        &Query::new()
            .eq("session_code", code.to_string())
            .eq("is_active", 1i64)
            .order_by("id", Order::Desc),
    )?;
    Ok(sessions.into_iter().filter(|s| s.is_open(now)).collect())
}

/// Redeem `code` for `student`.
///
/// A code only counts when it belongs to an active, unexpired session of
/// the student's own class; a live code of another class is reported as
/// such. At most one record exists per student, class and day: a second
/// attempt (including a concurrent one losing the race on the unique index)
/// reports that the student already checked in.
pub fn check_in(
    conn: &Connection,
    student: &Student,
    code: &str,
    now: DateTime<Local>,
) -> CheckInOutcome {
    match try_check_in(conn, student, code, now) {
        Ok(outcome) => outcome,
        Err(AppError::Db(rusqlite::Error::SqliteFailure(e, _)))
            if e.code == ErrorCode::ConstraintViolation =>
        {
            CheckInOutcome::rejected(MSG_ALREADY)
        }
        Err(_) => CheckInOutcome::rejected(MSG_FAILED),
    }
}

fn try_check_in(
    conn: &Connection,
    student: &Student,
    code: &str,
    now: DateTime<Local>,
) -> AppResult<CheckInOutcome> {
    let code = code.trim();
    if code.is_empty() {
        return Ok(CheckInOutcome::rejected(MSG_INVALID_CODE));
    }

    let sessions = open_sessions_for_code(conn, code, now)?;
    if sessions.is_empty() {
        return Ok(CheckInOutcome::rejected(MSG_INVALID_CODE));
    }
    let Some(session) = sessions.into_iter().find(|s| s.class_id == student.class_id) else {
        return Ok(CheckInOutcome::rejected(MSG_OTHER_CLASS));
    };

    let today = now.date_naive();
    let repo = Repo::<AttendanceRecord>::new(conn);
    let already = repo.exists(
        &Query::new()
            .eq("student_id", student.id)
            .eq("class_id", session.class_id)
            .eq("date", date_value(today)),
    )?;
    if already {
        return Ok(CheckInOutcome::rejected(MSG_ALREADY));
    }

    let mut record = AttendanceRecord::new(
        student.id,
        session.class_id,
        today,
        AttendanceStatus::Present,
        student.profile_id,
    );
    record.check_in_time = Some(now.time().with_nanosecond(0).unwrap_or(now.time()));
    repo.insert(&record)?;

    Ok(CheckInOutcome::ok())
}

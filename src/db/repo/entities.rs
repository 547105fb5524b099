//! Row mapping for every stored collection.

use super::Entity;
use crate::errors::AppError;
use crate::models::absence::{AbsenceRequest, RequestStatus};
use crate::models::announcement::{Announcement, Audience};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::class::Class;
use crate::models::issue::{Issue, IssueStatus};
use crate::models::leave::TeacherLeaveRequest;
use crate::models::note::StudentNote;
use crate::models::notification::Notification;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::school::School;
use crate::models::session::AttendanceSession;
use crate::models::student::Student;
use crate::models::subject::{Subject, SubjectSchedule, weekday_from_db, weekday_to_db};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use rusqlite::Row;
use rusqlite::types::{Type, Value};

/// NaiveDate → stored TEXT "YYYY-MM-DD"
pub fn date_value(d: NaiveDate) -> Value {
    Value::Text(d.format("%Y-%m-%d").to_string())
}

/// NaiveTime → stored TEXT "HH:MM:SS"
pub fn time_value(t: NaiveTime) -> Value {
    Value::Text(t.format("%H:%M:%S").to_string())
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn opt_text(s: &Option<String>) -> Value {
    s.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn opt_int(n: Option<i64>) -> Value {
    n.map(Value::Integer).unwrap_or(Value::Null)
}

fn conversion(idx: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn get_date(row: &Row, col: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(col)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| conversion(0, AppError::InvalidDate(raw)))
}

fn get_time(row: &Row, col: &str) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(col)?;
    NaiveTime::parse_from_str(&raw, "%H:%M:%S")
        .map_err(|_| conversion(0, AppError::InvalidTime(raw)))
}

fn get_opt_time(row: &Row, col: &str) -> rusqlite::Result<Option<NaiveTime>> {
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => NaiveTime::parse_from_str(&raw, "%H:%M:%S")
            .map(Some)
            .map_err(|_| conversion(0, AppError::InvalidTime(raw))),
        None => Ok(None),
    }
}

fn get_datetime(row: &Row, col: &str) -> rusqlite::Result<DateTime<Local>> {
    let raw: String = row.get(col)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| conversion(0, AppError::InvalidDate(raw)))
}

fn get_bool(row: &Row, col: &str) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i64>(col)? != 0)
}

fn decode<T>(
    row: &Row,
    col: &str,
    parse: fn(&str) -> Option<T>,
    err: fn(String) -> AppError,
) -> rusqlite::Result<T> {
    let raw: String = row.get(col)?;
    parse(&raw).ok_or_else(|| conversion(0, err(raw)))
}

impl Entity for School {
    const TABLE: &'static str = "schools";
    const COLUMNS: &'static [&'static str] = &["name", "code", "region", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(School {
            id: row.get("id")?,
            name: row.get("name")?,
            code: row.get("code")?,
            region: row.get("region")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.name),
            text(&self.code),
            opt_text(&self.region),
            text(&self.created_at),
        ]
    }
}

impl Entity for Profile {
    const TABLE: &'static str = "profiles";
    const COLUMNS: &'static [&'static str] = &[
        "email",
        "full_name",
        "role",
        "school_id",
        "password_hash",
        "created_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Profile {
            id: row.get("id")?,
            email: row.get("email")?,
            full_name: row.get("full_name")?,
            role: decode(row, "role", Role::from_db_str, AppError::InvalidRole)?,
            school_id: row.get("school_id")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.email),
            text(&self.full_name),
            text(self.role.to_db_str()),
            opt_int(self.school_id),
            text(&self.password_hash),
            text(&self.created_at),
        ]
    }
}

impl Entity for Class {
    const TABLE: &'static str = "classes";
    const COLUMNS: &'static [&'static str] = &["school_id", "name", "grade", "teacher_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Class {
            id: row.get("id")?,
            school_id: row.get("school_id")?,
            name: row.get("name")?,
            grade: row.get("grade")?,
            teacher_id: row.get("teacher_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.school_id),
            text(&self.name),
            opt_text(&self.grade),
            opt_int(self.teacher_id),
        ]
    }
}

impl Entity for Student {
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &[
        "class_id",
        "full_name",
        "student_id_number",
        "email",
        "parent_id",
        "profile_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Student {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            full_name: row.get("full_name")?,
            student_id_number: row.get("student_id_number")?,
            email: row.get("email")?,
            parent_id: row.get("parent_id")?,
            profile_id: row.get("profile_id")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.class_id),
            text(&self.full_name),
            opt_text(&self.student_id_number),
            opt_text(&self.email),
            opt_int(self.parent_id),
            opt_int(self.profile_id),
        ]
    }
}

impl Entity for Subject {
    const TABLE: &'static str = "subjects";
    const COLUMNS: &'static [&'static str] = &["school_id", "name", "code"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Subject {
            id: row.get("id")?,
            school_id: row.get("school_id")?,
            name: row.get("name")?,
            code: row.get("code")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Integer(self.school_id), text(&self.name), text(&self.code)]
    }
}

impl Entity for SubjectSchedule {
    const TABLE: &'static str = "subject_schedules";
    const COLUMNS: &'static [&'static str] = &[
        "subject_id",
        "class_id",
        "teacher_id",
        "weekday",
        "start_time",
        "end_time",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let day: i64 = row.get("weekday")?;
        let weekday = weekday_from_db(day)
            .ok_or_else(|| conversion(0, AppError::InvalidDate(format!("weekday {day}"))))?;
        Ok(SubjectSchedule {
            id: row.get("id")?,
            subject_id: row.get("subject_id")?,
            class_id: row.get("class_id")?,
            teacher_id: row.get("teacher_id")?,
            weekday,
            start_time: get_time(row, "start_time")?,
            end_time: get_time(row, "end_time")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.subject_id),
            Value::Integer(self.class_id),
            Value::Integer(self.teacher_id),
            Value::Integer(weekday_to_db(self.weekday)),
            time_value(self.start_time),
            time_value(self.end_time),
        ]
    }
}

impl Entity for AttendanceRecord {
    const TABLE: &'static str = "attendance";
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "class_id",
        "date",
        "status",
        "check_in_time",
        "notes",
        "marked_by",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AttendanceRecord {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            class_id: row.get("class_id")?,
            date: get_date(row, "date")?,
            status: decode(
                row,
                "status",
                AttendanceStatus::from_db_str,
                AppError::InvalidStatus,
            )?,
            check_in_time: get_opt_time(row, "check_in_time")?,
            notes: row.get("notes")?,
            marked_by: row.get("marked_by")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.student_id),
            Value::Integer(self.class_id),
            date_value(self.date),
            text(self.status.to_db_str()),
            self.check_in_time.map(time_value).unwrap_or(Value::Null),
            opt_text(&self.notes),
            opt_int(self.marked_by),
        ]
    }
}

impl Entity for AttendanceSession {
    const TABLE: &'static str = "attendance_sessions";
    const COLUMNS: &'static [&'static str] = &[
        "class_id",
        "session_code",
        "expires_at",
        "is_active",
        "created_by",
        "created_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AttendanceSession {
            id: row.get("id")?,
            class_id: row.get("class_id")?,
            session_code: row.get("session_code")?,
            expires_at: get_datetime(row, "expires_at")?,
            is_active: get_bool(row, "is_active")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.class_id),
            text(&self.session_code),
            Value::Text(self.expires_at.to_rfc3339()),
            Value::Integer(i64::from(self.is_active)),
            Value::Integer(self.created_by),
            text(&self.created_at),
        ]
    }
}

impl Entity for AbsenceRequest {
    const TABLE: &'static str = "absence_requests";
    const COLUMNS: &'static [&'static str] = &[
        "student_id",
        "parent_id",
        "start_date",
        "end_date",
        "reason",
        "status",
        "reviewed_by",
        "review_note",
        "created_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(AbsenceRequest {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            parent_id: row.get("parent_id")?,
            start_date: get_date(row, "start_date")?,
            end_date: get_date(row, "end_date")?,
            reason: row.get("reason")?,
            status: decode(row, "status", RequestStatus::from_db_str, AppError::Validation)?,
            reviewed_by: row.get("reviewed_by")?,
            review_note: row.get("review_note")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.student_id),
            Value::Integer(self.parent_id),
            date_value(self.start_date),
            date_value(self.end_date),
            text(&self.reason),
            text(self.status.to_db_str()),
            opt_int(self.reviewed_by),
            opt_text(&self.review_note),
            text(&self.created_at),
        ]
    }
}

impl Entity for TeacherLeaveRequest {
    const TABLE: &'static str = "teacher_leave_requests";
    const COLUMNS: &'static [&'static str] = &[
        "teacher_id",
        "school_id",
        "start_date",
        "end_date",
        "reason",
        "status",
        "reviewed_by",
        "created_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(TeacherLeaveRequest {
            id: row.get("id")?,
            teacher_id: row.get("teacher_id")?,
            school_id: row.get("school_id")?,
            start_date: get_date(row, "start_date")?,
            end_date: get_date(row, "end_date")?,
            reason: row.get("reason")?,
            status: decode(row, "status", RequestStatus::from_db_str, AppError::Validation)?,
            reviewed_by: row.get("reviewed_by")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.teacher_id),
            Value::Integer(self.school_id),
            date_value(self.start_date),
            date_value(self.end_date),
            text(&self.reason),
            text(self.status.to_db_str()),
            opt_int(self.reviewed_by),
            text(&self.created_at),
        ]
    }
}

impl Entity for Announcement {
    const TABLE: &'static str = "announcements";
    const COLUMNS: &'static [&'static str] =
        &["school_id", "author_id", "title", "body", "audience", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Announcement {
            id: row.get("id")?,
            school_id: row.get("school_id")?,
            author_id: row.get("author_id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            audience: decode(row, "audience", Audience::from_db_str, AppError::Validation)?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            opt_int(self.school_id),
            Value::Integer(self.author_id),
            text(&self.title),
            text(&self.body),
            text(self.audience.to_db_str()),
            text(&self.created_at),
        ]
    }
}

impl Entity for Notification {
    const TABLE: &'static str = "notifications";
    const COLUMNS: &'static [&'static str] =
        &["recipient_id", "title", "message", "kind", "is_read", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Notification {
            id: row.get("id")?,
            recipient_id: row.get("recipient_id")?,
            title: row.get("title")?,
            message: row.get("message")?,
            kind: row.get("kind")?,
            is_read: get_bool(row, "is_read")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.recipient_id),
            text(&self.title),
            text(&self.message),
            text(&self.kind),
            Value::Integer(i64::from(self.is_read)),
            text(&self.created_at),
        ]
    }
}

impl Entity for Issue {
    const TABLE: &'static str = "issues";
    const COLUMNS: &'static [&'static str] = &[
        "school_id",
        "reporter_id",
        "title",
        "description",
        "status",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Issue {
            id: row.get("id")?,
            school_id: row.get("school_id")?,
            reporter_id: row.get("reporter_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: decode(row, "status", IssueStatus::from_db_str, AppError::Validation)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            opt_int(self.school_id),
            Value::Integer(self.reporter_id),
            text(&self.title),
            text(&self.description),
            text(self.status.to_db_str()),
            text(&self.created_at),
            text(&self.updated_at),
        ]
    }
}

impl Entity for StudentNote {
    const TABLE: &'static str = "student_notes";
    const COLUMNS: &'static [&'static str] = &["student_id", "author_id", "note", "created_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(StudentNote {
            id: row.get("id")?,
            student_id: row.get("student_id")?,
            author_id: row.get("author_id")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.student_id),
            Value::Integer(self.author_id),
            text(&self.note),
            text(&self.created_at),
        ]
    }
}

use crate::core::walker::DraftRecord;
use crate::db::repo::{Order, Query, Repo, date_value};
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::student::Student;
use chrono::NaiveDate;
use rusqlite::Connection;

const KEY: &[&str] = &["student_id", "class_id", "date"];

/// What happened to a batch of drafts. Records are written one by one; a
/// failing row does not stop the rest.
#[derive(Debug, Default)]
pub struct FlushReport {
    pub saved: usize,
    pub failed: Vec<(i64, String)>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Students of a class in roster order.
pub fn roster(conn: &Connection, class_id: i64) -> AppResult<Vec<Student>> {
    Repo::<Student>::new(conn).list(
        &Query::new()
            .eq("class_id", class_id)
            .order_by("full_name", Order::Asc)
            .order_by("id", Order::Asc),
    )
}

pub fn records_for_day(
    conn: &Connection,
    class_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<AttendanceRecord>> {
    Repo::<AttendanceRecord>::new(conn).list(
        &Query::new()
            .eq("class_id", class_id)
            .eq("date", date_value(date)),
    )
}

fn find(
    repo: &Repo<AttendanceRecord>,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
) -> AppResult<Option<AttendanceRecord>> {
    repo.first(
        &Query::new()
            .eq("student_id", student_id)
            .eq("class_id", class_id)
            .eq("date", date_value(date)),
    )
}

/// Insert or overwrite the record for (student, class, date). A check-in
/// time captured earlier survives a later manual mark.
pub fn upsert_record(
    conn: &Connection,
    student_id: i64,
    class_id: i64,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<String>,
    marked_by: Option<i64>,
) -> AppResult<i64> {
    let repo = Repo::<AttendanceRecord>::new(conn);
    let mut record = AttendanceRecord::new(student_id, class_id, date, status, marked_by);
    record.notes = notes;
    if let Some(prior) = find(&repo, student_id, class_id, date)? {
        record.check_in_time = prior.check_in_time;
    }
    repo.upsert(&record, KEY)
}

/// Persist the drafts of a completed walk.
pub fn flush_drafts(
    conn: &Connection,
    class_id: i64,
    date: NaiveDate,
    marked_by: i64,
    drafts: &[DraftRecord],
) -> FlushReport {
    let mut report = FlushReport::default();
    for d in drafts {
        match upsert_record(
            conn,
            d.student_id,
            class_id,
            date,
            d.status,
            d.comment.clone(),
            Some(marked_by),
        ) {
            Ok(_) => report.saved += 1,
            Err(e) => report.failed.push((d.student_id, e.to_string())),
        }
    }
    report
}

/// Attendance history filter. `None` bounds are open.
#[derive(Debug, Default, Clone)]
pub struct RecordFilter {
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

pub fn list_records(conn: &Connection, filter: &RecordFilter) -> AppResult<Vec<AttendanceRecord>> {
    let mut q = Query::new();
    if let Some(c) = filter.class_id {
        q = q.eq("class_id", c);
    }
    if let Some(s) = filter.student_id {
        q = q.eq("student_id", s);
    }
    if let Some(d) = filter.from {
        q = q.gte("date", date_value(d));
    }
    if let Some(d) = filter.to {
        q = q.lte("date", date_value(d));
    }
    if let Some(st) = filter.status {
        q = q.eq("status", st.to_db_str().to_string());
    }
    Repo::<AttendanceRecord>::new(conn).list(
        &q.order_by("date", Order::Asc)
            .order_by("student_id", Order::Asc),
    )
}

/// Records for all students of the given classes within a date window.
pub fn records_for_classes(
    conn: &Connection,
    class_ids: &[i64],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Vec<AttendanceRecord>> {
    let mut q = Query::new().any_of("class_id", class_ids.iter().copied());
    if let Some(d) = from {
        q = q.gte("date", date_value(d));
    }
    if let Some(d) = to {
        q = q.lte("date", date_value(d));
    }
    Repo::<AttendanceRecord>::new(conn).list(&q)
}

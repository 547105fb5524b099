//! Attendance aggregates for the report commands.

use crate::core::auth::require_role;
use crate::core::marking::{RecordFilter, list_records, records_for_classes};
use crate::core::tenancy;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::class::Class;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::school::School;
use crate::models::student::Student;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

impl StatusCounts {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.present += other.present;
        self.absent += other.absent;
        self.late += other.late;
        self.excused += other.excused;
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused
    }

    /// Attended (present + late) over all recorded days, in percent with one
    /// decimal. No records gives 0.
    pub fn rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let raw = f64::from(self.present + self.late) * 100.0 / f64::from(total);
        (raw * 10.0).round() / 10.0
    }
}

pub fn count(records: &[AttendanceRecord]) -> StatusCounts {
    let mut c = StatusCounts::default();
    for r in records {
        c.add(r.status);
    }
    c
}

/// Inclusive date window; open ends are unbounded.
#[derive(Debug, Default, Clone, Copy)]
pub struct Period {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct StudentLine {
    pub student_id: i64,
    pub full_name: String,
    pub counts: StatusCounts,
    pub rate: f64,
    pub low: bool,
}

#[derive(Debug)]
pub struct ClassReport {
    pub class: Class,
    pub totals: StatusCounts,
    pub students: Vec<StudentLine>,
}

#[derive(Debug)]
pub struct SchoolReport {
    pub school: School,
    pub totals: StatusCounts,
    pub classes: Vec<(Class, StatusCounts)>,
}

pub fn student_report(
    conn: &Connection,
    user: &Profile,
    student_id: i64,
    period: Period,
) -> AppResult<(Student, Vec<AttendanceRecord>, StatusCounts)> {
    let (student, class) = tenancy::load_student(conn, user, student_id)?;
    if user.is(Role::Teacher) && !tenancy::teaches(conn, user, &class)? {
        return Err(AppError::Forbidden(format!(
            "you do not teach {}",
            student.full_name
        )));
    }
    let records = list_records(
        conn,
        &RecordFilter {
            student_id: Some(student.id),
            from: period.from,
            to: period.to,
            ..Default::default()
        },
    )?;
    let counts = count(&records);
    Ok((student, records, counts))
}

pub fn class_report(
    conn: &Connection,
    user: &Profile,
    class_id: i64,
    period: Period,
    threshold: f64,
) -> AppResult<ClassReport> {
    require_role(user, &[Role::Teacher, Role::Admin, Role::Ministry])?;
    let class = tenancy::load_class(conn, user, class_id)?;
    if user.is(Role::Teacher) && !tenancy::teaches(conn, user, &class)? {
        return Err(AppError::Forbidden(format!(
            "you do not teach class '{}'",
            class.name
        )));
    }

    let records = records_for_classes(conn, &[class.id], period.from, period.to)?;
    let mut per_student: HashMap<i64, StatusCounts> = HashMap::new();
    for r in &records {
        per_student.entry(r.student_id).or_default().add(r.status);
    }

    let students = crate::core::marking::roster(conn, class.id)?
        .into_iter()
        .map(|s| {
            let counts = per_student.get(&s.id).copied().unwrap_or_default();
            let rate = counts.rate();
            StudentLine {
                student_id: s.id,
                full_name: s.full_name,
                counts,
                rate,
                low: counts.total() > 0 && rate < threshold,
            }
        })
        .collect();

    Ok(ClassReport {
        totals: count(&records),
        class,
        students,
    })
}

fn school_totals(conn: &Connection, school: School, period: Period) -> AppResult<SchoolReport> {
    let classes = Repo::<Class>::new(conn).list(
        &Query::new()
            .eq("school_id", school.id)
            .order_by("name", Order::Asc),
    )?;
    let ids: Vec<i64> = classes.iter().map(|c| c.id).collect();
    let records = records_for_classes(conn, &ids, period.from, period.to)?;

    let mut per_class: HashMap<i64, StatusCounts> = HashMap::new();
    for r in &records {
        per_class.entry(r.class_id).or_default().add(r.status);
    }
    let classes = classes
        .into_iter()
        .map(|c| {
            let counts = per_class.get(&c.id).copied().unwrap_or_default();
            (c, counts)
        })
        .collect();

    Ok(SchoolReport {
        school,
        totals: count(&records),
        classes,
    })
}

pub fn school_report(
    conn: &Connection,
    user: &Profile,
    school_id: Option<i64>,
    period: Period,
) -> AppResult<SchoolReport> {
    require_role(user, &[Role::Admin, Role::Ministry])?;
    let id = match school_id {
        Some(id) => id,
        None => tenancy::own_school(user)?,
    };
    let school = tenancy::load_school(conn, user, id)?;
    school_totals(conn, school, period)
}

/// Per-school totals for the ministry, ordered by school name.
pub fn ministry_overview(
    conn: &Connection,
    user: &Profile,
    period: Period,
) -> AppResult<Vec<SchoolReport>> {
    require_role(user, &[Role::Ministry])?;
    let schools = Repo::<School>::new(conn).list(&Query::new().order_by("name", Order::Asc))?;
    schools
        .into_iter()
        .map(|s| school_totals(conn, s, period))
        .collect()
}

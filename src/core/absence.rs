//! Parent absence requests.
//!
//! A parent asks for a date range to be excused; the class teacher or a
//! school admin reviews it. Approval writes an `excused` record for every
//! day of the range, replacing whatever was marked before.

use crate::core::auth::require_role;
use crate::core::marking::upsert_record;
use crate::core::notify::notify;
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::absence::{AbsenceRequest, RequestStatus};
use crate::models::attendance::AttendanceStatus;
use crate::models::class::Class;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::student::Student;
use crate::utils::date::{check_request_range, days_between};
use chrono::{Local, NaiveDate};
use rusqlite::Connection;

pub fn submit(
    conn: &Connection,
    parent: &Profile,
    student_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    reason: &str,
) -> AppResult<AbsenceRequest> {
    require_role(parent, &[Role::Parent])?;
    let (student, class) = tenancy::load_student(conn, parent, student_id)?;
    check_request_range(start, end)?;
    if reason.trim().is_empty() {
        return Err(AppError::Validation("A reason is required".into()));
    }

    let mut request = AbsenceRequest {
        id: 0,
        student_id: student.id,
        parent_id: parent.id,
        start_date: start,
        end_date: end,
        reason: reason.trim().to_string(),
        status: RequestStatus::Pending,
        reviewed_by: None,
        review_note: None,
        created_at: Local::now().to_rfc3339(),
    };
    request.id = Repo::<AbsenceRequest>::new(conn).insert(&request)?;

    if let Some(teacher) = class.teacher_id {
        let msg = format!(
            "{} will be absent {} to {}: {}",
            student.full_name, start, end, request.reason
        );
        if let Err(e) = notify(conn, teacher, "absence", "New absence request", &msg) {
            crate::ui::messages::warning(format!("Class teacher was not notified: {e}"));
        }
    }

    audit(conn, "absence_submit", &request.id.to_string(), &student.full_name);
    Ok(request)
}

/// Requests the user may see: parents their own, teachers those of their
/// classes, admins their school's, the ministry all of them.
pub fn visible_to(
    conn: &Connection,
    user: &Profile,
    status: Option<RequestStatus>,
) -> AppResult<Vec<AbsenceRequest>> {
    let mut q = Query::new();
    if let Some(s) = status {
        q = q.eq("status", s.to_db_str().to_string());
    }

    match user.role {
        Role::Parent => q = q.eq("parent_id", user.id),
        Role::Ministry => {}
        Role::Admin | Role::Teacher => {
            let school = tenancy::own_school(user)?;
            let mut classes = Repo::<Class>::new(conn).list(&Query::new().eq("school_id", school))?;
            if user.is(Role::Teacher) {
                let mut mine = Vec::new();
                for c in classes {
                    if tenancy::teaches(conn, user, &c)? {
                        mine.push(c);
                    }
                }
                classes = mine;
            }
            let students = Repo::<Student>::new(conn)
                .list(&Query::new().any_of("class_id", classes.iter().map(|c| c.id)))?;
            q = q.any_of("student_id", students.iter().map(|s| s.id));
        }
        Role::Student => {
            let me = tenancy::student_for_profile(conn, user)?;
            q = q.eq("student_id", me.id);
        }
    }

    Repo::<AbsenceRequest>::new(conn).list(&q.order_by("id", Order::Desc))
}

/// Approve or reject a pending request. Returns the updated request and the
/// number of excused days written.
pub fn review(
    conn: &Connection,
    reviewer: &Profile,
    id: i64,
    approve: bool,
    note: Option<&str>,
) -> AppResult<(AbsenceRequest, usize)> {
    require_role(reviewer, &[Role::Admin, Role::Teacher])?;
    let repo = Repo::<AbsenceRequest>::new(conn);
    let missing = || AppError::NotFound(format!("Absence request {id}"));

    let mut request = repo.get(id)?.ok_or_else(missing)?;
    let (student, class) =
        tenancy::load_student(conn, reviewer, request.student_id).map_err(|_| missing())?;
    if reviewer.is(Role::Teacher) && !tenancy::teaches(conn, reviewer, &class)? {
        return Err(missing());
    }
    if request.status != RequestStatus::Pending {
        return Err(AppError::Validation(format!(
            "Request {id} was already {}",
            request.status
        )));
    }

    request.status = if approve {
        RequestStatus::Approved
    } else {
        RequestStatus::Rejected
    };
    request.reviewed_by = Some(reviewer.id);
    request.review_note = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

    if approve {
        check_request_range(request.start_date, request.end_date)?;
    }

    let tx = conn.unchecked_transaction()?;
    Repo::<AbsenceRequest>::new(&tx).update(&request)?;
    let mut excused = 0;
    if approve {
        for day in days_between(request.start_date, request.end_date) {
            upsert_record(
                &tx,
                student.id,
                class.id,
                day,
                AttendanceStatus::Excused,
                Some(request.reason.clone()),
                Some(reviewer.id),
            )?;
            excused += 1;
        }
    }
    tx.commit()?;

    let msg = match &request.review_note {
        Some(n) => format!("Absence for {} was {}: {}", student.full_name, request.status, n),
        None => format!("Absence for {} was {}", student.full_name, request.status),
    };
    if let Err(e) = notify(conn, request.parent_id, "absence", "Absence request reviewed", &msg) {
        crate::ui::messages::warning(format!("Parent was not notified: {e}"));
    }

    audit(conn, "absence_review", &id.to_string(), request.status.to_db_str());
    Ok((request, excused))
}

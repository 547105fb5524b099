use crate::core::auth::require_role;
use crate::core::notify::{fan_out, notify};
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::absence::RequestStatus;
use crate::models::leave::TeacherLeaveRequest;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::utils::date::check_request_range;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;

pub fn submit(
    conn: &Connection,
    teacher: &Profile,
    start: NaiveDate,
    end: NaiveDate,
    reason: &str,
) -> AppResult<TeacherLeaveRequest> {
    require_role(teacher, &[Role::Teacher])?;
    let school_id = tenancy::own_school(teacher)?;
    check_request_range(start, end)?;
    if reason.trim().is_empty() {
        return Err(AppError::Validation("A reason is required".into()));
    }

    let mut request = TeacherLeaveRequest {
        id: 0,
        teacher_id: teacher.id,
        school_id,
        start_date: start,
        end_date: end,
        reason: reason.trim().to_string(),
        status: RequestStatus::Pending,
        reviewed_by: None,
        created_at: Local::now().to_rfc3339(),
    };
    request.id = Repo::<TeacherLeaveRequest>::new(conn).insert(&request)?;

    let admins: Vec<i64> = Repo::<Profile>::new(conn)
        .list(
            &Query::new()
                .eq("school_id", school_id)
                .eq("role", Role::Admin.to_db_str().to_string()),
        )?
        .into_iter()
        .map(|p| p.id)
        .collect();
    let msg = format!("{} requests leave {} to {}", teacher.full_name, start, end);
    fan_out(conn, &admins, "leave", "New leave request", &msg);

    audit(conn, "leave_submit", &request.id.to_string(), &teacher.email);
    Ok(request)
}

pub fn visible_to(
    conn: &Connection,
    user: &Profile,
    status: Option<RequestStatus>,
) -> AppResult<Vec<TeacherLeaveRequest>> {
    let mut q = Query::new();
    match user.role {
        Role::Teacher => q = q.eq("teacher_id", user.id),
        Role::Admin => q = q.eq("school_id", tenancy::own_school(user)?),
        Role::Ministry => {}
        _ => {
            return Err(AppError::Forbidden(
                "leave requests are for staff only".into(),
            ));
        }
    }
    if let Some(s) = status {
        q = q.eq("status", s.to_db_str().to_string());
    }
    Repo::<TeacherLeaveRequest>::new(conn).list(&q.order_by("id", Order::Desc))
}

pub fn review(
    conn: &Connection,
    admin: &Profile,
    id: i64,
    approve: bool,
) -> AppResult<TeacherLeaveRequest> {
    require_role(admin, &[Role::Admin])?;
    let school_id = tenancy::own_school(admin)?;
    let repo = Repo::<TeacherLeaveRequest>::new(conn);

    let mut request = repo
        .get(id)?
        .filter(|r| r.school_id == school_id)
        .ok_or_else(|| AppError::NotFound(format!("Leave request {id}")))?;
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
    request.reviewed_by = Some(admin.id);
    repo.update(&request)?;

    let msg = format!(
        "Your leave {} to {} was {}",
        request.start_date, request.end_date, request.status
    );
    if let Err(e) = notify(conn, request.teacher_id, "leave", "Leave request reviewed", &msg) {
        crate::ui::messages::warning(format!("Teacher was not notified: {e}"));
    }

    audit(conn, "leave_review", &id.to_string(), request.status.to_db_str());
    Ok(request)
}

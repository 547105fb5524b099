use crate::core::auth::require_role;
use crate::core::notify::notify;
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::issue::{Issue, IssueStatus};
use crate::models::profile::Profile;
use crate::models::role::Role;
use chrono::Local;
use rusqlite::Connection;

pub fn report(
    conn: &Connection,
    user: &Profile,
    title: &str,
    description: &str,
) -> AppResult<Issue> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("A title is required".into()));
    }
    let now = Local::now().to_rfc3339();
    let mut issue = Issue {
        id: 0,
        school_id: tenancy::scope(user),
        reporter_id: user.id,
        title: title.trim().to_string(),
        description: description.trim().to_string(),
        status: IssueStatus::Open,
        created_at: now.clone(),
        updated_at: now,
    };
    issue.id = Repo::<Issue>::new(conn).insert(&issue)?;
    audit(conn, "issue_report", &issue.id.to_string(), &issue.title);
    Ok(issue)
}

/// Admins see their school's issues, the ministry all, everyone else
/// only what they reported.
pub fn visible_to(
    conn: &Connection,
    user: &Profile,
    status: Option<IssueStatus>,
) -> AppResult<Vec<Issue>> {
    let mut q = match user.role {
        Role::Ministry => Query::new(),
        Role::Admin => Query::new().eq("school_id", tenancy::own_school(user)?),
        _ => Query::new().eq("reporter_id", user.id),
    };
    if let Some(s) = status {
        q = q.eq("status", s.to_db_str().to_string());
    }
    Repo::<Issue>::new(conn).list(&q.order_by("id", Order::Desc))
}

pub fn update_status(
    conn: &Connection,
    user: &Profile,
    id: i64,
    status: IssueStatus,
) -> AppResult<Issue> {
    require_role(user, &[Role::Admin, Role::Ministry])?;
    let repo = Repo::<Issue>::new(conn);
    let mut issue = repo
        .get(id)?
        .filter(|i| {
            user.is(Role::Ministry) || (i.school_id.is_some() && i.school_id == user.school_id)
        })
        .ok_or_else(|| AppError::NotFound(format!("Issue {id}")))?;

    if issue.status == status {
        return Ok(issue);
    }
    issue.status = status;
    issue.updated_at = Local::now().to_rfc3339();
    repo.update(&issue)?;

    if issue.reporter_id != user.id {
        let msg = format!("\"{}\" is now {}", issue.title, status);
        if let Err(e) = notify(conn, issue.reporter_id, "issue", "Issue updated", &msg) {
            crate::ui::messages::warning(format!("Reporter was not notified: {e}"));
        }
    }
    audit(conn, "issue_update", &id.to_string(), status.to_db_str());
    Ok(issue)
}

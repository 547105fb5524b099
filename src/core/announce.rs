use crate::core::auth::require_role;
use crate::core::notify::{FanOutReport, fan_out};
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::announcement::{Announcement, Audience};
use crate::models::profile::Profile;
use crate::models::role::Role;
use chrono::Local;
use rusqlite::Connection;

/// Publish an announcement and notify every matching profile.
///
/// Admins always post to their own school. The ministry posts to one school
/// when `school_id` is given, otherwise to every school.
pub fn create(
    conn: &Connection,
    author: &Profile,
    title: &str,
    body: &str,
    audience: Audience,
    school_id: Option<i64>,
) -> AppResult<(Announcement, FanOutReport)> {
    require_role(author, &[Role::Admin, Role::Ministry])?;
    if title.trim().is_empty() || body.trim().is_empty() {
        return Err(AppError::Validation("Title and message are required".into()));
    }

    let target = match author.role {
        Role::Admin => Some(tenancy::own_school(author)?),
        _ => match school_id {
            Some(id) => Some(tenancy::load_school(conn, author, id)?.id),
            None => None,
        },
    };

    let mut announcement = Announcement {
        id: 0,
        school_id: target,
        author_id: author.id,
        title: title.trim().to_string(),
        body: body.trim().to_string(),
        audience,
        created_at: Local::now().to_rfc3339(),
    };
    announcement.id = Repo::<Announcement>::new(conn).insert(&announcement)?;

    let recipients = recipients(conn, target, audience, author.id)?;
    let report = fan_out(
        conn,
        &recipients,
        "announcement",
        &announcement.title,
        &announcement.body,
    );

    audit(
        conn,
        "announce",
        &announcement.id.to_string(),
        &format!(
            "{} -> {} recipient(s), {} failed",
            audience.to_db_str(),
            report.delivered,
            report.failed.len()
        ),
    );
    Ok((announcement, report))
}

fn recipients(
    conn: &Connection,
    school_id: Option<i64>,
    audience: Audience,
    author_id: i64,
) -> AppResult<Vec<i64>> {
    let mut q = Query::new().ne("id", author_id);
    if let Some(id) = school_id {
        q = q.eq("school_id", id);
    }
    let profiles = Repo::<Profile>::new(conn).list(&q.order_by("id", Order::Asc))?;
    Ok(profiles
        .into_iter()
        .filter(|p| audience.includes(p.role))
        .map(|p| p.id)
        .collect())
}

/// Announcements visible to the user, newest first.
pub fn visible_to(conn: &Connection, user: &Profile) -> AppResult<Vec<Announcement>> {
    let all = Repo::<Announcement>::new(conn).list(&Query::new().order_by("id", Order::Desc))?;
    if user.is(Role::Ministry) {
        return Ok(all);
    }
    Ok(all
        .into_iter()
        .filter(|a| a.school_id.is_none() || a.school_id == user.school_id)
        .filter(|a| a.author_id == user.id || a.audience.includes(user.role))
        .collect())
}

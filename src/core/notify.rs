use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::notification::Notification;
use rusqlite::Connection;

/// Delivery result of a fan-out. Each recipient is written on its own, so a
/// failing row is reported instead of aborting the others.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: Vec<(i64, String)>,
}

pub fn notify(
    conn: &Connection,
    recipient_id: i64,
    kind: &str,
    title: &str,
    message: &str,
) -> AppResult<i64> {
    Repo::<Notification>::new(conn).insert(&Notification::new(recipient_id, kind, title, message))
}

pub fn fan_out(
    conn: &Connection,
    recipients: &[i64],
    kind: &str,
    title: &str,
    message: &str,
) -> FanOutReport {
    let mut report = FanOutReport::default();
    for &id in recipients {
        match notify(conn, id, kind, title, message) {
            Ok(_) => report.delivered += 1,
            Err(e) => report.failed.push((id, e.to_string())),
        }
    }
    report
}

pub fn inbox(conn: &Connection, user_id: i64, unread_only: bool) -> AppResult<Vec<Notification>> {
    let mut q = Query::new().eq("recipient_id", user_id);
    if unread_only {
        q = q.eq("is_read", 0i64);
    }
    Repo::<Notification>::new(conn).list(&q.order_by("id", Order::Desc))
}

pub fn unread_count(conn: &Connection, user_id: i64) -> AppResult<i64> {
    Repo::<Notification>::new(conn).count(
        &Query::new()
            .eq("recipient_id", user_id)
            .eq("is_read", 0i64),
    )
}

/// Mark one notification read. Another user's notification is not found.
pub fn mark_read(conn: &Connection, user_id: i64, id: i64) -> AppResult<()> {
    let changed = Repo::<Notification>::new(conn).update_where(
        &[("is_read", 1i64.into())],
        &Query::new().eq("id", id).eq("recipient_id", user_id),
    )?;
    if changed == 0 {
        return Err(AppError::NotFound(format!("Notification {id}")));
    }
    Ok(())
}

pub fn mark_all_read(conn: &Connection, user_id: i64) -> AppResult<usize> {
    Repo::<Notification>::new(conn).update_where(
        &[("is_read", 1i64.into())],
        &Query::new()
            .eq("recipient_id", user_id)
            .eq("is_read", 0i64),
    )
}

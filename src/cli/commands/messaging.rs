use crate::cli::commands::{profile_name, signed_in};
use crate::cli::parser::{AnnounceCmd, NotifyCmd};
use crate::config::Config;
use crate::core::{announce, notify};
use crate::errors::{AppError, AppResult};
use crate::models::announcement::Audience;
use crate::ui::messages::{header, hint, info, success, warning};
use crate::utils::colors::{GREY, RESET};
use crate::utils::formatting::{bold, short_stamp};

pub fn announce(cmd: &AnnounceCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        AnnounceCmd::Create {
            title,
            body,
            audience,
            school_id,
        } => {
            let audience = Audience::from_db_str(&audience.trim().to_lowercase())
                .ok_or_else(|| AppError::Validation(format!("Unknown audience '{audience}'")))?;
            let (a, report) = announce::create(conn, &user, title, body, audience, *school_id)?;
            success(format!(
                "Announcement {} published; {} recipient(s) notified",
                a.id, report.delivered
            ));
            if !report.failed.is_empty() {
                warning(format!(
                    "{} recipient(s) could not be notified",
                    report.failed.len()
                ));
            }
        }

        AnnounceCmd::List => {
            let items = announce::visible_to(conn, &user)?;
            if items.is_empty() {
                info("No announcements.");
                return Ok(());
            }
            for a in items {
                header(&a.title, &cfg.separator_char);
                println!("{}", a.body);
                hint(format!(
                    "{} · {} · to {}",
                    profile_name(conn, Some(a.author_id)),
                    short_stamp(&a.created_at),
                    a.audience.to_db_str()
                ));
            }
        }
    }
    Ok(())
}

pub fn notifications(cmd: &NotifyCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        NotifyCmd::List { unread } => {
            let items = notify::inbox(conn, user.id, *unread)?;
            if items.is_empty() {
                info("No notifications.");
                return Ok(());
            }
            for n in items {
                let title = if n.is_read {
                    format!("{GREY}{}{RESET}", n.title)
                } else {
                    bold(&n.title)
                };
                println!("[{}] {} ({})", n.id, title, short_stamp(&n.created_at));
                println!("      {}", n.message);
            }
        }

        NotifyCmd::Read { id, all } => {
            if *all {
                let n = notify::mark_all_read(conn, user.id)?;
                success(format!("{} notification(s) marked as read", n));
            } else if let Some(id) = id {
                notify::mark_read(conn, user.id, *id)?;
                success(format!("Notification {} marked as read", id));
            }
        }
    }
    Ok(())
}

use crate::cli::commands::{profile_name, signed_in};
use crate::cli::parser::{AbsenceCmd, LeaveCmd};
use crate::config::Config;
use crate::core::{absence, leave};
use crate::db::repo::Repo;
use crate::errors::{AppError, AppResult};
use crate::models::absence::RequestStatus;
use crate::models::student::Student;
use crate::ui::messages::{info, success};
use crate::utils::colors::{GREEN, RED, RESET, YELLOW, colorize_optional};
use crate::utils::date::parse_date;
use crate::utils::formatting::short_stamp;
use crate::utils::table::Table;
use chrono::NaiveDate;

fn date_arg(raw: &str) -> AppResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))
}

/// `--from` with an optional `--to`; a single day when `--to` is missing.
fn date_span(from: &str, to: Option<&str>) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = date_arg(from)?;
    let end = to.map(date_arg).transpose()?.unwrap_or(start);
    Ok((start, end))
}

fn status_filter(raw: Option<&str>) -> AppResult<Option<RequestStatus>> {
    raw.map(|s| {
        RequestStatus::from_db_str(&s.trim().to_lowercase())
            .ok_or_else(|| AppError::Validation(format!("Unknown request status '{s}'")))
    })
    .transpose()
}

fn paint(status: RequestStatus) -> String {
    let color = match status {
        RequestStatus::Pending => YELLOW,
        RequestStatus::Approved => GREEN,
        RequestStatus::Rejected => RED,
    };
    format!("{color}{status}{RESET}")
}

pub fn absence(cmd: &AbsenceCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        AbsenceCmd::Submit {
            student_id,
            from,
            to,
            reason,
        } => {
            let (start, end) = date_span(from, to.as_deref())?;
            let r = absence::submit(conn, &user, *student_id, start, end, reason)?;
            success(format!("Absence request {} submitted ({} to {})", r.id, start, end));
        }

        AbsenceCmd::List { status } => {
            let requests = absence::visible_to(conn, &user, status_filter(status.as_deref())?)?;
            if requests.is_empty() {
                info("No absence requests.");
                return Ok(());
            }
            let students = Repo::<Student>::new(conn);
            let mut t = Table::new([
                "ID",
                "Student",
                "From",
                "To",
                "Reason",
                "Status",
                "Reviewed by",
            ]);
            for r in requests {
                let name = students
                    .get(r.student_id)?
                    .map(|s| s.full_name)
                    .unwrap_or_else(|| r.student_id.to_string());
                t.add_row(vec![
                    r.id.to_string(),
                    name,
                    r.start_date.to_string(),
                    r.end_date.to_string(),
                    r.reason,
                    paint(r.status),
                    profile_name(conn, r.reviewed_by),
                ]);
            }
            t.print(&cfg.separator_char);
        }

        AbsenceCmd::Review {
            id,
            approve,
            reject: _,
            note,
        } => {
            let (r, days) = absence::review(conn, &user, *id, *approve, note.as_deref())?;
            if *approve {
                success(format!(
                    "Absence request {} approved; {} day(s) marked excused",
                    r.id, days
                ));
            } else {
                success(format!("Absence request {} rejected", r.id));
            }
        }
    }
    Ok(())
}

pub fn leave(cmd: &LeaveCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        LeaveCmd::Submit { from, to, reason } => {
            let (start, end) = date_span(from, to.as_deref())?;
            let r = leave::submit(conn, &user, start, end, reason)?;
            success(format!("Leave request {} submitted ({} to {})", r.id, start, end));
        }

        LeaveCmd::List { status } => {
            let requests = leave::visible_to(conn, &user, status_filter(status.as_deref())?)?;
            if requests.is_empty() {
                info("No leave requests.");
                return Ok(());
            }
            let mut t = Table::new([
                "ID",
                "Teacher",
                "From",
                "To",
                "Reason",
                "Status",
                "Submitted",
            ]);
            for r in requests {
                t.add_row(vec![
                    r.id.to_string(),
                    profile_name(conn, Some(r.teacher_id)),
                    r.start_date.to_string(),
                    r.end_date.to_string(),
                    colorize_optional(Some(r.reason.as_str())),
                    paint(r.status),
                    short_stamp(&r.created_at),
                ]);
            }
            t.print(&cfg.separator_char);
        }

        LeaveCmd::Review {
            id,
            approve,
            reject: _,
        } => {
            let r = leave::review(conn, &user, *id, *approve)?;
            success(format!("Leave request {} {}", r.id, r.status));
        }
    }
    Ok(())
}

use crate::cli::commands::{profile_name, signed_in};
use crate::cli::parser::{IssueCmd, NoteCmd};
use crate::config::Config;
use crate::core::{issues, notes};
use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::models::issue::IssueStatus;
use crate::ui::messages::{info, success};
use crate::utils::formatting::short_stamp;
use crate::utils::table::Table;

fn parse_status(raw: &str) -> AppResult<IssueStatus> {
    let key = raw.trim().to_lowercase().replace('-', "_");
    IssueStatus::from_db_str(&key)
        .ok_or_else(|| AppError::Validation(format!("Unknown issue status '{raw}'")))
}

pub fn issue(cmd: &IssueCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        IssueCmd::Report { title, description } => {
            let i = issues::report(conn, &user, title, description)?;
            success(format!("Issue {} reported", i.id));
        }

        IssueCmd::List { status } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let items = issues::visible_to(conn, &user, status)?;
            if items.is_empty() {
                info("No issues.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Title", "Status", "Reporter", "Updated"]);
            for i in items {
                t.add_row(vec![
                    i.id.to_string(),
                    i.title,
                    i.status.to_string(),
                    profile_name(conn, Some(i.reporter_id)),
                    short_stamp(&i.updated_at),
                ]);
            }
            t.print(&cfg.separator_char);
        }

        IssueCmd::Update { id, status } => {
            let i = issues::update_status(conn, &user, *id, parse_status(status)?)?;
            success(format!("Issue {} is now {}", i.id, i.status));
        }
    }
    Ok(())
}

pub fn note(cmd: &NoteCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        NoteCmd::Add { student_id, text } => {
            let n = notes::add(conn, &user, *student_id, text)?;
            audit(conn, "note_add", &n.student_id.to_string(), &n.note);
            success(format!("Note {} added", n.id));
        }

        NoteCmd::List { student_id } => {
            let items = notes::for_student(conn, &user, *student_id)?;
            if items.is_empty() {
                info("No notes for this student.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Date", "Author", "Note"]);
            for n in items {
                t.add_row(vec![
                    n.id.to_string(),
                    short_stamp(&n.created_at),
                    profile_name(conn, Some(n.author_id)),
                    n.note,
                ]);
            }
            t.print(&cfg.separator_char);
        }
    }
    Ok(())
}

use crate::cli::commands::{period, profile_name, signed_in};
use crate::cli::parser::AttendanceCmd;
use crate::config::Config;
use crate::core::marking::{self, RecordFilter};
use crate::core::walker::{AttendanceWalker, DraftRecord, Step, WalkerEvent, WalkerState};
use crate::core::{directory, stats, tenancy};
use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::role::Role;
use crate::models::student::Student;
use crate::ui::messages::{error, header, hint, info, success, warning};
use crate::utils::colors::{RESET, color_for_status, colorize_optional};
use crate::utils::date::{date_or_today, parse_date};
use crate::utils::formatting::progress_bar;
use crate::utils::table::Table;
use std::collections::HashMap;
use std::io::{self, BufRead};

pub fn handle(cmd: &AttendanceCmd, cfg: &Config) -> AppResult<()> {
    match cmd {
        AttendanceCmd::Mark { class_id, date } => mark(cfg, *class_id, date.as_deref()),
        AttendanceCmd::Set {
            student_id,
            status,
            date,
            notes,
        } => set(cfg, *student_id, status, date.as_deref(), notes.as_deref()),
        AttendanceCmd::List {
            class_id,
            student_id,
            date,
            range,
        } => list(cfg, *class_id, *student_id, date.as_deref(), range.as_deref()),
    }
}

fn mark(cfg: &Config, class_id: i64, date: Option<&str>) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let date = date_or_today(date)?;

    let class = tenancy::load_class(conn, &user, class_id)?;
    tenancy::ensure_can_mark(conn, &user, &class)?;

    let roster = marking::roster(conn, class.id)?;
    let existing = marking::records_for_day(conn, class.id, date)?;

    header(
        format!("Attendance for {} on {}", class.name, date.format("%Y-%m-%d")),
        &cfg.separator_char,
    );
    if !existing.is_empty() {
        info(format!(
            "{} record(s) already saved for this day; they are shown as the starting choice.",
            existing.len()
        ));
    }
    hint("p = present, a = absent, l = late, c <text> = comment, n = next, b = back, s = skip, q = quit");

    let walker = AttendanceWalker::new(roster).with_existing(&existing);
    let stdin = io::stdin();
    let Some(drafts) = walk(walker, stdin.lock())? else {
        warning("Attendance walk cancelled; nothing was saved.");
        return Ok(());
    };

    if drafts.is_empty() {
        info("No attendance to save.");
        return Ok(());
    }

    let report = marking::flush_drafts(conn, class.id, date, user.id, &drafts);
    audit(
        conn,
        "attendance_mark",
        &class.name,
        &format!(
            "{} saved, {} failed for {}",
            report.saved,
            report.failed.len(),
            date.format("%Y-%m-%d")
        ),
    );

    if !report.is_complete() {
        for (student_id, reason) in &report.failed {
            error(format!("Student {}: {}", student_id, reason));
        }
        return Err(AppError::Operation {
            action: "save attendance".into(),
            source: Box::new(AppError::Validation(format!(
                "{} of {} record(s) not saved",
                report.failed.len(),
                drafts.len()
            ))),
        });
    }

    success(format!("Attendance saved for {} student(s).", report.saved));
    Ok(())
}

/// One line of walker input.
fn parse_command(line: &str) -> Option<WalkerEvent> {
    let line = line.trim();
    if let Some(text) = line.strip_prefix("c ") {
        return Some(WalkerEvent::Comment(text.to_string()));
    }
    match line {
        "" | "n" => Some(WalkerEvent::Next),
        "b" => Some(WalkerEvent::Previous),
        "s" => Some(WalkerEvent::Skip),
        "q" => Some(WalkerEvent::Cancel),
        "c" => Some(WalkerEvent::Comment(String::new())),
        other => AttendanceStatus::from_code(other).map(WalkerEvent::Select),
    }
}

fn show_current(walker: &AttendanceWalker, index: usize) {
    let Some(student) = walker.current() else {
        return;
    };
    let choice = walker
        .selection()
        .map(|s| format!("{}{}{}", color_for_status(s), s, RESET))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "\n{} {}  [{}]",
        progress_bar(index + 1, walker.roster_len(), 20),
        student.full_name,
        choice
    );
    if !walker.comment().is_empty() {
        hint(format!("comment: {}", walker.comment()));
    }
}

/// Drive the walker from line-based input. `None` when the walk was
/// cancelled or the input ended before the last student.
fn walk<R: BufRead>(mut walker: AttendanceWalker, input: R) -> AppResult<Option<Vec<DraftRecord>>> {
    match walker.apply(WalkerEvent::Start)? {
        Step::Completed(drafts) => {
            info("The class roster is empty.");
            return Ok(Some(drafts));
        }
        Step::Viewing(i) => show_current(&walker, i),
        _ => {}
    }

    for line in input.lines() {
        let line = line?;
        let Some(event) = parse_command(&line) else {
            warning(format!("Unknown input '{}'", line.trim()));
            continue;
        };
        match walker.apply(event) {
            Ok(Step::Viewing(i)) => show_current(&walker, i),
            Ok(Step::Updated) => {
                if let WalkerState::Viewing(i) = walker.state() {
                    show_current(&walker, i);
                }
            }
            Ok(Step::Completed(drafts)) => return Ok(Some(drafts)),
            Ok(Step::Cancelled) => return Ok(None),
            Err(e) => warning(e),
        }
    }
    Ok(None)
}

fn set(
    cfg: &Config,
    student_id: i64,
    status: &str,
    date: Option<&str>,
    notes: Option<&str>,
) -> AppResult<()> {
    let status = AttendanceStatus::from_code(status)
        .ok_or_else(|| AppError::InvalidStatus(status.to_string()))?;
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let date = date_or_today(date)?;

    let (student, class) = tenancy::load_student(conn, &user, student_id)?;
    tenancy::ensure_can_mark(conn, &user, &class)?;

    let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    marking::upsert_record(conn, student.id, class.id, date, status, notes, Some(user.id))
        .map_err(AppError::failed("save attendance"))?;
    audit(
        conn,
        "attendance_set",
        &student.full_name,
        &format!("{} on {}", status, date.format("%Y-%m-%d")),
    );

    success(format!(
        "{} marked {} on {}",
        student.full_name,
        status,
        date.format("%Y-%m-%d")
    ));
    Ok(())
}

fn list(
    cfg: &Config,
    class_id: Option<i64>,
    student_id: Option<i64>,
    date: Option<&str>,
    range: Option<&str>,
) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    let mut window = period(range)?;
    if let Some(raw) = date {
        let d = parse_date(raw).ok_or_else(|| AppError::InvalidDate(raw.to_string()))?;
        window.from = Some(d);
        window.to = Some(d);
    }

    let (title, students, records): (String, Vec<Student>, Vec<AttendanceRecord>) =
        match (class_id, student_id) {
            (Some(id), _) => {
                let (class, students) = directory::roster(conn, &user, id)?;
                let records = marking::list_records(
                    conn,
                    &RecordFilter {
                        class_id: Some(class.id),
                        from: window.from,
                        to: window.to,
                        ..Default::default()
                    },
                )?;
                (format!("Attendance of {}", class.name), students, records)
            }
            (None, Some(id)) => {
                let (student, records, _) = stats::student_report(conn, &user, id, window)?;
                (format!("Attendance of {}", student.full_name), vec![student], records)
            }
            (None, None) => {
                let student = match user.role {
                    Role::Student => tenancy::student_for_profile(conn, &user)?,
                    _ => {
                        return Err(AppError::Validation(
                            "Pass --class or --student".into(),
                        ));
                    }
                };
                let (student, records, _) = stats::student_report(conn, &user, student.id, window)?;
                (format!("Attendance of {}", student.full_name), vec![student], records)
            }
        };

    header(title, &cfg.separator_char);
    if records.is_empty() {
        info("No attendance records found.");
        return Ok(());
    }

    let names: HashMap<i64, String> = students.into_iter().map(|s| (s.id, s.full_name)).collect();
    let mut t = Table::new(["Date", "Student", "Status", "Check-in", "Notes", "Marked by"]);
    for r in records {
        t.add_row(vec![
            r.date_str(),
            names
                .get(&r.student_id)
                .cloned()
                .unwrap_or_else(|| r.student_id.to_string()),
            format!("{}{}{}", color_for_status(r.status), r.status, RESET),
            colorize_optional(
                r.check_in_time
                    .map(|t| t.format("%H:%M").to_string())
                    .as_deref(),
            ),
            colorize_optional(r.notes.as_deref()),
            profile_name(conn, r.marked_by),
        ]);
    }
    t.print(&cfg.separator_char);
    Ok(())
}


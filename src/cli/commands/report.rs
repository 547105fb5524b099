use crate::cli::commands::{period, signed_in};
use crate::cli::parser::ReportCmd;
use crate::config::Config;
use crate::core::stats::{self, StatusCounts};
use crate::core::tenancy;
use crate::errors::{AppError, AppResult};
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{RESET, color_for_rate};
use crate::utils::formatting::percent;
use crate::utils::table::Table;
use rusqlite::Connection;

pub fn handle(cmd: &ReportCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let sep = &cfg.separator_char;
    let threshold = cfg.low_attendance_threshold;

    match cmd {
        ReportCmd::Student { id, range } => {
            let id = default_student(conn, &user, *id)?;
            let (student, _, counts) =
                stats::student_report(conn, &user, id, period(range.as_deref())?)?;
            header(format!("Attendance of {}", student.full_name), sep);
            print_counts(&counts, threshold);
        }

        ReportCmd::Class { id, range } => {
            let report =
                stats::class_report(conn, &user, *id, period(range.as_deref())?, threshold)?;
            header(format!("Attendance of class {}", report.class.name), sep);
            print_counts(&report.totals, threshold);
            if report.students.is_empty() {
                info("No students enrolled.");
                return Ok(());
            }

            let mut t = Table::new(["ID", "Student", "P", "A", "L", "E", "Rate", ""]);
            let mut low = 0;
            for s in &report.students {
                if s.low {
                    low += 1;
                }
                t.add_row(vec![
                    s.student_id.to_string(),
                    s.full_name.clone(),
                    s.counts.present.to_string(),
                    s.counts.absent.to_string(),
                    s.counts.late.to_string(),
                    s.counts.excused.to_string(),
                    painted_rate(&s.counts, threshold),
                    if s.low { "LOW".to_string() } else { String::new() },
                ]);
            }
            println!();
            t.print(sep);
            if low > 0 {
                warning(format!(
                    "{} student(s) below {} attendance",
                    low,
                    percent(threshold)
                ));
            }
        }

        ReportCmd::School { id, range } => {
            let report = stats::school_report(conn, &user, *id, period(range.as_deref())?)?;
            header(format!("Attendance of {}", report.school.name), sep);
            print_counts(&report.totals, threshold);

            let mut t = Table::new(["ID", "Class", "Records", "Rate"]);
            for (class, counts) in &report.classes {
                t.add_row(vec![
                    class.id.to_string(),
                    class.name.clone(),
                    counts.total().to_string(),
                    painted_rate(counts, threshold),
                ]);
            }
            if !t.is_empty() {
                println!();
                t.print(sep);
            }
        }

        ReportCmd::Ministry { range } => {
            let reports = stats::ministry_overview(conn, &user, period(range.as_deref())?)?;
            header("Attendance across schools", sep);
            if reports.is_empty() {
                info("No schools registered yet.");
                return Ok(());
            }

            let mut overall = StatusCounts::default();
            let mut t = Table::new(["Code", "School", "Classes", "Records", "Rate"]);
            for r in &reports {
                overall.merge(&r.totals);
                t.add_row(vec![
                    r.school.code.clone(),
                    r.school.name.clone(),
                    r.classes.len().to_string(),
                    r.totals.total().to_string(),
                    painted_rate(&r.totals, threshold),
                ]);
            }
            t.print(sep);
            println!();
            print_counts(&overall, threshold);
        }
    }
    Ok(())
}

/// Students report on themselves; a parent with one child may omit the id.
fn default_student(conn: &Connection, user: &Profile, id: Option<i64>) -> AppResult<i64> {
    if let Some(id) = id {
        return Ok(id);
    }
    match user.role {
        Role::Student => Ok(tenancy::student_for_profile(conn, user)?.id),
        Role::Parent => {
            let children = tenancy::children_of(conn, user)?;
            match children.as_slice() {
                [only] => Ok(only.id),
                [] => Err(AppError::Validation("No children are linked to this account".into())),
                _ => Err(AppError::Validation(
                    "Several children are linked to this account; pass the student id".into(),
                )),
            }
        }
        _ => Err(AppError::Validation("Pass the student id".into())),
    }
}

fn painted_rate(counts: &StatusCounts, threshold: f64) -> String {
    format!(
        "{}{}{}",
        color_for_rate(counts.rate(), threshold, counts.total()),
        percent(counts.rate()),
        RESET
    )
}

fn print_counts(c: &StatusCounts, threshold: f64) {
    println!("  Records:  {}", c.total());
    println!("  Present:  {}", c.present);
    println!("  Absent:   {}", c.absent);
    println!("  Late:     {}", c.late);
    println!("  Excused:  {}", c.excused);
    println!("  Rate:     {}", painted_rate(c, threshold));
}

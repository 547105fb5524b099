use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

const TABLES: &[&str] = &[
    "schools",
    "profiles",
    "classes",
    "students",
    "subjects",
    "subject_schedules",
    "attendance",
    "attendance_sessions",
    "absence_requests",
    "teacher_leave_requests",
    "announcements",
    "notifications",
    "issues",
    "student_notes",
];

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROWS PER COLLECTION
    //
    println!("{}• Rows:{}", CYAN, RESET);
    for table in TABLES {
        let count: i64 =
            pool.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        let color = if count > 0 { GREEN } else { GREY };
        println!("    {:<24} {}{}{}", table, color, count, RESET);
    }

    //
    // 3) ATTENDANCE DATE RANGE
    //
    let range: Option<(Option<String>, Option<String>)> = pool
        .conn
        .query_row("SELECT MIN(date), MAX(date) FROM attendance", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .optional()?;
    let (first, last) = range.unwrap_or((None, None));
    let dash = || format!("{GREY}--{RESET}");

    println!("{}• Attendance range:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(dash));
    println!("    to:   {}", last.unwrap_or_else(dash));

    //
    // 4) SCHEMA VERSION
    //
    let versions = applied_versions(&pool.conn)?;
    println!(
        "{}• Schema:{} {} migration(s), latest {}",
        CYAN,
        RESET,
        versions.len(),
        versions.last().cloned().unwrap_or_else(dash)
    );

    println!();
    Ok(())
}

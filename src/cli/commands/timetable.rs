use crate::cli::commands::{profile_name, signed_in};
use crate::cli::parser::{ScheduleCmd, SubjectCmd};
use crate::config::Config;
use crate::core::timetable::{self, NewSlot};
use crate::db::repo::Repo;
use crate::errors::AppResult;
use crate::models::class::Class;
use crate::models::subject::SubjectSchedule;
use crate::ui::messages::{header, info, success};
use crate::utils::date::today;
use crate::utils::table::Table;
use crate::utils::time::{format_hm, parse_time, parse_weekday};
use chrono::Datelike;
use rusqlite::Connection;
use std::collections::HashMap;

pub fn subject(cmd: &SubjectCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;

    match cmd {
        SubjectCmd::Add { name, code } => {
            let s = timetable::add_subject(&pool.conn, &user, name, code)?;
            success(format!("Subject '{}' ({}) added, id {}", s.name, s.code, s.id));
        }

        SubjectCmd::List => {
            let subjects = timetable::list_subjects(&pool.conn, &user)?;
            if subjects.is_empty() {
                info("No subjects yet.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Code", "Name"]);
            for s in subjects {
                t.add_row(vec![s.id.to_string(), s.code, s.name]);
            }
            t.print(&cfg.separator_char);
        }
    }
    Ok(())
}

pub fn schedule(cmd: &ScheduleCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        ScheduleCmd::Add {
            subject_id,
            class_id,
            teacher_id,
            day,
            start,
            end,
        } => {
            let slot = NewSlot {
                subject_id: *subject_id,
                class_id: *class_id,
                teacher_id: *teacher_id,
                weekday: parse_weekday(day)?,
                start: parse_time(start)?,
                end: parse_time(end)?,
            };
            let s = timetable::add_schedule(conn, &user, slot)?;
            success(format!(
                "Lesson added on {} {}-{} (id {})",
                s.weekday,
                format_hm(s.start_time),
                format_hm(s.end_time),
                s.id
            ));
        }

        ScheduleCmd::List { class_id, day } => {
            let weekday = day.as_deref().map(parse_weekday).transpose()?;
            let slots = timetable::schedule_for(conn, &user, *class_id, weekday)?;
            print_slots(conn, &user, &slots, &cfg.separator_char)?;
        }

        ScheduleCmd::Today => {
            let weekday = today().weekday();
            header(format!("Lessons for {}", weekday), &cfg.separator_char);
            let slots = timetable::schedule_for(conn, &user, None, Some(weekday))?;
            print_slots(conn, &user, &slots, &cfg.separator_char)?;
        }
    }
    Ok(())
}

fn print_slots(
    conn: &Connection,
    user: &crate::models::profile::Profile,
    slots: &[SubjectSchedule],
    sep: &str,
) -> AppResult<()> {
    if slots.is_empty() {
        info("No lessons scheduled.");
        return Ok(());
    }

    let subjects: HashMap<i64, String> = timetable::list_subjects(conn, user)?
        .into_iter()
        .map(|s| (s.id, s.name))
        .collect();
    let classes = Repo::<Class>::new(conn);

    let mut t = Table::new(["ID", "Day", "Time", "Subject", "Class", "Teacher"]);
    for s in slots {
        let class = classes
            .get(s.class_id)?
            .map(|c| c.name)
            .unwrap_or_else(|| s.class_id.to_string());
        t.add_row(vec![
            s.id.to_string(),
            s.weekday.to_string(),
            format!("{}-{}", format_hm(s.start_time), format_hm(s.end_time)),
            subjects
                .get(&s.subject_id)
                .cloned()
                .unwrap_or_else(|| s.subject_id.to_string()),
            class,
            profile_name(conn, Some(s.teacher_id)),
        ]);
    }
    t.print(sep);
    Ok(())
}

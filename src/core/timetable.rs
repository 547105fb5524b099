use crate::core::auth::require_role;
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::class::Class;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::subject::{Subject, SubjectSchedule, weekday_to_db};
use chrono::{NaiveTime, Weekday};
use rusqlite::Connection;

pub fn add_subject(
    conn: &Connection,
    admin: &Profile,
    name: &str,
    code: &str,
) -> AppResult<Subject> {
    require_role(admin, &[Role::Admin])?;
    let school_id = tenancy::own_school(admin)?;
    let code = code.trim().to_uppercase();
    if name.trim().is_empty() || code.is_empty() {
        return Err(AppError::Validation("Subject name and code are required".into()));
    }
    let repo = Repo::<Subject>::new(conn);
    if repo.exists(&Query::new().eq("school_id", school_id).eq("code", code.clone()))? {
        return Err(AppError::Validation(format!("Subject '{code}' already exists")));
    }
    let mut subject = Subject {
        id: 0,
        school_id,
        name: name.trim().to_string(),
        code,
    };
    subject.id = repo.insert(&subject)?;
    audit(conn, "subject_add", &subject.code, &subject.name);
    Ok(subject)
}

pub fn list_subjects(conn: &Connection, user: &Profile) -> AppResult<Vec<Subject>> {
    let mut q = Query::new();
    if let Some(id) = tenancy::scope(user) {
        q = q.eq("school_id", id);
    }
    Repo::<Subject>::new(conn).list(&q.order_by("code", Order::Asc))
}

pub struct NewSlot {
    pub subject_id: i64,
    pub class_id: i64,
    pub teacher_id: i64,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

pub fn add_schedule(
    conn: &Connection,
    admin: &Profile,
    slot: NewSlot,
) -> AppResult<SubjectSchedule> {
    require_role(admin, &[Role::Admin])?;
    let school_id = tenancy::own_school(admin)?;
    if slot.end <= slot.start {
        return Err(AppError::Validation("Lesson must end after it starts".into()));
    }
    Repo::<Subject>::new(conn)
        .get(slot.subject_id)?
        .filter(|s| s.school_id == school_id)
        .ok_or_else(|| AppError::NotFound(format!("Subject {}", slot.subject_id)))?;
    let class = tenancy::load_class(conn, admin, slot.class_id)?;
    tenancy::load_member(conn, admin, slot.teacher_id, Role::Teacher)?;

    let repo = Repo::<SubjectSchedule>::new(conn);
    let same_day = repo.list(
        &Query::new()
            .eq("class_id", class.id)
            .eq("weekday", weekday_to_db(slot.weekday)),
    )?;
    if same_day
        .iter()
        .any(|s| s.start_time < slot.end && slot.start < s.end_time)
    {
        return Err(AppError::Validation(format!(
            "Class '{}' already has a lesson at that time",
            class.name
        )));
    }

    let mut entry = SubjectSchedule {
        id: 0,
        subject_id: slot.subject_id,
        class_id: class.id,
        teacher_id: slot.teacher_id,
        weekday: slot.weekday,
        start_time: slot.start,
        end_time: slot.end,
    };
    entry.id = repo.insert(&entry)?;
    audit(conn, "schedule_add", &entry.id.to_string(), &class.name);
    Ok(entry)
}

/// Timetable for a class, or for the teacher when no class is given.
pub fn schedule_for(
    conn: &Connection,
    user: &Profile,
    class_id: Option<i64>,
    weekday: Option<Weekday>,
) -> AppResult<Vec<SubjectSchedule>> {
    let mut q = match (class_id, user.role) {
        (Some(id), _) => {
            let classes = crate::core::directory::classes_for(conn, user)?;
            let class: Class = classes
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Class {id}")))?;
            Query::new().eq("class_id", class.id)
        }
        (None, Role::Teacher) => Query::new().eq("teacher_id", user.id),
        (None, _) => {
            let ids: Vec<i64> = crate::core::directory::classes_for(conn, user)?
                .iter()
                .map(|c| c.id)
                .collect();
            Query::new().any_of("class_id", ids)
        }
    };
    if let Some(day) = weekday {
        q = q.eq("weekday", weekday_to_db(day));
    }
    Repo::<SubjectSchedule>::new(conn).list(
        &q.order_by("weekday", Order::Asc)
            .order_by("start_time", Order::Asc),
    )
}

//! School scoping. Every school-bound read goes through these loaders so a
//! user never sees another school's rows; foreign rows look like missing ones.

use crate::db::repo::{Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::class::Class;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::school::School;
use crate::models::student::Student;
use crate::models::subject::SubjectSchedule;
use rusqlite::Connection;

/// School the user is bound to; `None` for the ministry (all schools).
pub fn scope(user: &Profile) -> Option<i64> {
    if user.is(Role::Ministry) {
        None
    } else {
        user.school_id
    }
}

pub fn own_school(user: &Profile) -> AppResult<i64> {
    user.school_id
        .ok_or_else(|| AppError::Validation("This account is not attached to a school".into()))
}

fn visible(user: &Profile, school_id: i64) -> bool {
    match scope(user) {
        None => user.is(Role::Ministry),
        Some(id) => id == school_id,
    }
}

pub fn load_school(conn: &Connection, user: &Profile, id: i64) -> AppResult<School> {
    Repo::<School>::new(conn)
        .get(id)?
        .filter(|s| visible(user, s.id))
        .ok_or_else(|| AppError::NotFound(format!("School {id}")))
}

pub fn load_class(conn: &Connection, user: &Profile, id: i64) -> AppResult<Class> {
    Repo::<Class>::new(conn)
        .get(id)?
        .filter(|c| visible(user, c.school_id))
        .ok_or_else(|| AppError::NotFound(format!("Class {id}")))
}

/// Loads a student with its class. Parents only reach their own children
/// and students only themselves.
pub fn load_student(conn: &Connection, user: &Profile, id: i64) -> AppResult<(Student, Class)> {
    let missing = || AppError::NotFound(format!("Student {id}"));
    let student = Repo::<Student>::new(conn).get(id)?.ok_or_else(missing)?;
    let class = Repo::<Class>::new(conn)
        .get(student.class_id)?
        .filter(|c| visible(user, c.school_id))
        .ok_or_else(missing)?;

    let linked = match user.role {
        Role::Parent => student.parent_id == Some(user.id),
        Role::Student => student.profile_id == Some(user.id),
        _ => true,
    };
    if !linked {
        return Err(missing());
    }
    Ok((student, class))
}

/// Student row linked to a student account.
pub fn student_for_profile(conn: &Connection, user: &Profile) -> AppResult<Student> {
    Repo::<Student>::new(conn)
        .first(&Query::new().eq("profile_id", user.id))?
        .ok_or_else(|| {
            AppError::Validation("This account is not linked to a student on any roster".into())
        })
}

pub fn children_of(conn: &Connection, parent: &Profile) -> AppResult<Vec<Student>> {
    Repo::<Student>::new(conn).list(&Query::new().eq("parent_id", parent.id))
}

/// Teachers may act on classes they lead or have a lesson slot in.
pub fn teaches(conn: &Connection, teacher: &Profile, class: &Class) -> AppResult<bool> {
    if class.teacher_id == Some(teacher.id) {
        return Ok(true);
    }
    Repo::<SubjectSchedule>::new(conn).exists(
        &Query::new()
            .eq("class_id", class.id)
            .eq("teacher_id", teacher.id),
    )
}

/// Marking and check-in windows: admins of the school, or a teacher of the class.
pub fn ensure_can_mark(conn: &Connection, user: &Profile, class: &Class) -> AppResult<()> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Teacher if teaches(conn, user, class)? => Ok(()),
        Role::Teacher => Err(AppError::Forbidden(format!(
            "you do not teach class '{}'",
            class.name
        ))),
        _ => Err(AppError::Forbidden(
            "only teachers and school administrators can take attendance".into(),
        )),
    }
}

/// A profile of the user's school with the expected role.
pub fn load_member(conn: &Connection, user: &Profile, id: i64, role: Role) -> AppResult<Profile> {
    Repo::<Profile>::new(conn)
        .get(id)?
        .filter(|p| p.role == role)
        .filter(|p| p.school_id.is_some_and(|s| visible(user, s)))
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", role.label())))
}

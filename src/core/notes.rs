use crate::core::auth::require_role;
use crate::core::tenancy;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::note::StudentNote;
use crate::models::profile::Profile;
use crate::models::role::Role;
use chrono::Local;
use rusqlite::Connection;

pub fn add(
    conn: &Connection,
    author: &Profile,
    student_id: i64,
    text: &str,
) -> AppResult<StudentNote> {
    require_role(author, &[Role::Teacher, Role::Admin])?;
    let (student, class) = tenancy::load_student(conn, author, student_id)?;
    if author.is(Role::Teacher) && !tenancy::teaches(conn, author, &class)? {
        return Err(AppError::Forbidden(format!(
            "you do not teach {}",
            student.full_name
        )));
    }
    if text.trim().is_empty() {
        return Err(AppError::Validation("Note text is required".into()));
    }

    let mut note = StudentNote {
        id: 0,
        student_id: student.id,
        author_id: author.id,
        note: text.trim().to_string(),
        created_at: Local::now().to_rfc3339(),
    };
    note.id = Repo::<StudentNote>::new(conn).insert(&note)?;
    Ok(note)
}

pub fn for_student(
    conn: &Connection,
    user: &Profile,
    student_id: i64,
) -> AppResult<Vec<StudentNote>> {
    let (student, _) = tenancy::load_student(conn, user, student_id)?;
    Repo::<StudentNote>::new(conn).list(
        &Query::new()
            .eq("student_id", student.id)
            .order_by("id", Order::Desc),
    )
}

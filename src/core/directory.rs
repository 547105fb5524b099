//! Schools, classes, students and user listings.

use crate::core::auth::require_role;
use crate::core::tenancy;
use crate::db::log::audit;
use crate::db::repo::{Order, Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::class::Class;
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::school::School;
use crate::models::student::Student;
use crate::models::subject::SubjectSchedule;
use rusqlite::Connection;

// ---------------------------
// Schools
// ---------------------------

pub fn add_school(
    conn: &Connection,
    user: &Profile,
    name: &str,
    code: &str,
    region: Option<&str>,
) -> AppResult<School> {
    require_role(user, &[Role::Ministry])?;
    if name.trim().is_empty() || code.trim().is_empty() {
        return Err(AppError::Validation("School name and code are required".into()));
    }
    let mut school = School::new(name, code, region.map(str::to_string));
    let repo = Repo::<School>::new(conn);
    if repo.exists(&Query::new().eq("code", school.code.clone()))? {
        return Err(AppError::Validation(format!(
            "A school with code '{}' already exists",
            school.code
        )));
    }
    school.id = repo.insert(&school)?;
    audit(conn, "school_add", &school.code, &school.name);
    Ok(school)
}

pub fn list_schools(conn: &Connection, user: &Profile) -> AppResult<Vec<School>> {
    let mut q = Query::new();
    if let Some(id) = tenancy::scope(user) {
        q = q.eq("id", id);
    }
    Repo::<School>::new(conn).list(&q.order_by("name", Order::Asc))
}

#[derive(Debug)]
pub struct SchoolSummary {
    pub school: School,
    pub classes: i64,
    pub students: i64,
    pub teachers: i64,
    pub parents: i64,
}

pub fn school_summary(conn: &Connection, user: &Profile, id: i64) -> AppResult<SchoolSummary> {
    let school = tenancy::load_school(conn, user, id)?;
    let classes = Repo::<Class>::new(conn).list(&Query::new().eq("school_id", school.id))?;
    let students = Repo::<Student>::new(conn)
        .count(&Query::new().any_of("class_id", classes.iter().map(|c| c.id)))?;
    let members = Repo::<Profile>::new(conn);
    let count_role = |role: Role| {
        members.count(
            &Query::new()
                .eq("school_id", school.id)
                .eq("role", role.to_db_str().to_string()),
        )
    };
    Ok(SchoolSummary {
        classes: classes.len() as i64,
        students,
        teachers: count_role(Role::Teacher)?,
        parents: count_role(Role::Parent)?,
        school,
    })
}

// ---------------------------
// Classes
// ---------------------------

pub fn add_class(
    conn: &Connection,
    admin: &Profile,
    name: &str,
    grade: Option<&str>,
    teacher_id: Option<i64>,
) -> AppResult<Class> {
    require_role(admin, &[Role::Admin])?;
    let school_id = tenancy::own_school(admin)?;
    if name.trim().is_empty() {
        return Err(AppError::Validation("Class name is required".into()));
    }
    if let Some(t) = teacher_id {
        tenancy::load_member(conn, admin, t, Role::Teacher)?;
    }

    let mut class = Class {
        id: 0,
        school_id,
        name: name.trim().to_string(),
        grade: grade.map(|g| g.trim().to_string()).filter(|g| !g.is_empty()),
        teacher_id,
    };
    class.id = Repo::<Class>::new(conn).insert(&class)?;
    audit(conn, "class_add", &class.id.to_string(), &class.name);
    Ok(class)
}

pub fn assign_teacher(
    conn: &Connection,
    admin: &Profile,
    class_id: i64,
    teacher_id: i64,
) -> AppResult<Class> {
    require_role(admin, &[Role::Admin])?;
    let mut class = tenancy::load_class(conn, admin, class_id)?;
    let teacher = tenancy::load_member(conn, admin, teacher_id, Role::Teacher)?;
    class.teacher_id = Some(teacher.id);
    Repo::<Class>::new(conn).update(&class)?;
    audit(conn, "class_assign", &class.id.to_string(), &teacher.email);
    Ok(class)
}

/// Classes the user works with. Teachers get the classes they lead or have
/// lessons in; parents and students the classes of the linked students.
pub fn classes_for(conn: &Connection, user: &Profile) -> AppResult<Vec<Class>> {
    let repo = Repo::<Class>::new(conn);
    let ordered = |q: Query| q.order_by("name", Order::Asc).order_by("id", Order::Asc);

    match user.role {
        Role::Ministry => repo.list(&ordered(Query::new())),
        Role::Admin => {
            repo.list(&ordered(Query::new().eq("school_id", tenancy::own_school(user)?)))
        }
        Role::Teacher => {
            let scheduled: Vec<i64> = Repo::<SubjectSchedule>::new(conn)
                .list(&Query::new().eq("teacher_id", user.id))?
                .into_iter()
                .map(|s| s.class_id)
                .collect();
            let school_id = tenancy::own_school(user)?;
            let classes = repo.list(&ordered(Query::new().eq("school_id", school_id)))?;
            Ok(classes
                .into_iter()
                .filter(|c| c.teacher_id == Some(user.id) || scheduled.contains(&c.id))
                .collect())
        }
        Role::Parent => {
            let ids: Vec<i64> = tenancy::children_of(conn, user)?
                .iter()
                .map(|s| s.class_id)
                .collect();
            repo.list(&ordered(Query::new().any_of("id", ids)))
        }
        Role::Student => {
            let me = tenancy::student_for_profile(conn, user)?;
            repo.list(&Query::new().eq("id", me.class_id))
        }
    }
}

pub fn roster(
    conn: &Connection,
    user: &Profile,
    class_id: i64,
) -> AppResult<(Class, Vec<Student>)> {
    let class = tenancy::load_class(conn, user, class_id)?;
    match user.role {
        Role::Teacher if !tenancy::teaches(conn, user, &class)? => {
            return Err(AppError::Forbidden(format!(
                "you do not teach class '{}'",
                class.name
            )));
        }
        Role::Parent | Role::Student => {
            return Err(AppError::Forbidden("rosters are for staff only".into()));
        }
        _ => {}
    }
    let students = crate::core::marking::roster(conn, class.id)?;
    Ok((class, students))
}

// ---------------------------
// Students
// ---------------------------

#[derive(Debug, Default, Clone)]
pub struct StudentForm {
    pub full_name: Option<String>,
    pub class_id: Option<i64>,
    pub student_id_number: Option<String>,
    pub email: Option<String>,
    pub parent_id: Option<i64>,
    pub profile_id: Option<i64>,
}

fn check_links(conn: &Connection, admin: &Profile, form: &StudentForm) -> AppResult<()> {
    if let Some(p) = form.parent_id {
        tenancy::load_member(conn, admin, p, Role::Parent)?;
    }
    if let Some(p) = form.profile_id {
        tenancy::load_member(conn, admin, p, Role::Student)?;
    }
    Ok(())
}

pub fn add_student(conn: &Connection, admin: &Profile, form: StudentForm) -> AppResult<Student> {
    require_role(admin, &[Role::Admin])?;
    let class_id = form
        .class_id
        .ok_or_else(|| AppError::Validation("A class is required".into()))?;
    let class = tenancy::load_class(conn, admin, class_id)?;
    let full_name = form
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Student name is required".into()))?
        .to_string();
    check_links(conn, admin, &form)?;

    let mut student = Student {
        id: 0,
        class_id: class.id,
        full_name,
        student_id_number: form.student_id_number,
        email: form.email,
        parent_id: form.parent_id,
        profile_id: form.profile_id,
    };
    student.id = Repo::<Student>::new(conn).insert(&student)?;
    audit(conn, "student_add", &student.id.to_string(), &student.full_name);
    Ok(student)
}

/// Apply the fields present in `patch`.
pub fn update_student(
    conn: &Connection,
    admin: &Profile,
    id: i64,
    patch: StudentForm,
) -> AppResult<Student> {
    require_role(admin, &[Role::Admin])?;
    let (mut student, _) = tenancy::load_student(conn, admin, id)?;
    check_links(conn, admin, &patch)?;

    if let Some(c) = patch.class_id {
        student.class_id = tenancy::load_class(conn, admin, c)?.id;
    }
    if let Some(n) = patch.full_name {
        if n.trim().is_empty() {
            return Err(AppError::Validation("Student name cannot be empty".into()));
        }
        student.full_name = n.trim().to_string();
    }
    if patch.student_id_number.is_some() {
        student.student_id_number = patch.student_id_number;
    }
    if patch.email.is_some() {
        student.email = patch.email;
    }
    if patch.parent_id.is_some() {
        student.parent_id = patch.parent_id;
    }
    if patch.profile_id.is_some() {
        student.profile_id = patch.profile_id;
    }

    Repo::<Student>::new(conn).update(&student)?;
    audit(conn, "student_update", &student.id.to_string(), &student.full_name);
    Ok(student)
}

pub fn delete_student(conn: &Connection, admin: &Profile, id: i64) -> AppResult<Student> {
    require_role(admin, &[Role::Admin])?;
    let (student, _) = tenancy::load_student(conn, admin, id)?;
    Repo::<Student>::new(conn).delete(student.id)?;
    audit(conn, "student_del", &student.id.to_string(), &student.full_name);
    Ok(student)
}

pub fn students_for(
    conn: &Connection,
    user: &Profile,
    class_id: Option<i64>,
) -> AppResult<Vec<Student>> {
    match user.role {
        Role::Parent => return tenancy::children_of(conn, user),
        Role::Student => return Ok(vec![tenancy::student_for_profile(conn, user)?]),
        _ => {}
    }
    let classes: Vec<i64> = match class_id {
        Some(id) => vec![roster(conn, user, id)?.0.id],
        None => classes_for(conn, user)?.iter().map(|c| c.id).collect(),
    };
    Repo::<Student>::new(conn).list(
        &Query::new()
            .any_of("class_id", classes)
            .order_by("full_name", Order::Asc),
    )
}

// ---------------------------
// Users
// ---------------------------

pub fn list_users(
    conn: &Connection,
    user: &Profile,
    role: Option<Role>,
) -> AppResult<Vec<Profile>> {
    require_role(user, &[Role::Admin, Role::Ministry])?;
    let mut q = Query::new();
    if let Some(id) = tenancy::scope(user) {
        q = q.eq("school_id", id);
    }
    if let Some(r) = role {
        q = q.eq("role", r.to_db_str().to_string());
    }
    Repo::<Profile>::new(conn).list(&q.order_by("full_name", Order::Asc))
}

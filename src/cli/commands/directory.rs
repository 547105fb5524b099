use crate::cli::commands::{profile_name, signed_in};
use crate::cli::parser::{ClassCmd, SchoolCmd, StudentCmd, UserCmd};
use crate::config::Config;
use crate::core::directory::{self, StudentForm};
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::ui::messages::{header, info, success};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;

pub fn school(cmd: &SchoolCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let sep = &cfg.separator_char;

    match cmd {
        SchoolCmd::Add { name, code, region } => {
            let s = directory::add_school(conn, &user, name, code, region.as_deref())?;
            success(format!("School '{}' added with code {} (id {})", s.name, s.code, s.id));
        }

        SchoolCmd::List => {
            let schools = directory::list_schools(conn, &user)?;
            if schools.is_empty() {
                info("No schools registered yet.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Code", "Name", "Region"]);
            for s in schools {
                t.add_row(vec![
                    s.id.to_string(),
                    s.code,
                    s.name,
                    colorize_optional(s.region.as_deref()),
                ]);
            }
            t.print(sep);
        }

        SchoolCmd::Show { id } => {
            let s = directory::school_summary(conn, &user, *id)?;
            header(format!("{} ({})", s.school.name, s.school.code), sep);
            println!("  Region:   {}", colorize_optional(s.school.region.as_deref()));
            println!("  Classes:  {}", s.classes);
            println!("  Students: {}", s.students);
            println!("  Teachers: {}", s.teachers);
            println!("  Parents:  {}", s.parents);
        }
    }
    Ok(())
}

pub fn class(cmd: &ClassCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let sep = &cfg.separator_char;

    match cmd {
        ClassCmd::Add {
            name,
            grade,
            teacher_id,
        } => {
            let c = directory::add_class(conn, &user, name, grade.as_deref(), *teacher_id)?;
            success(format!("Class '{}' created (id {})", c.name, c.id));
        }

        ClassCmd::List => {
            let classes = directory::classes_for(conn, &user)?;
            if classes.is_empty() {
                info("No classes found.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Name", "Grade", "Class teacher"]);
            for c in classes {
                t.add_row(vec![
                    c.id.to_string(),
                    c.name,
                    colorize_optional(c.grade.as_deref()),
                    profile_name(conn, c.teacher_id),
                ]);
            }
            t.print(sep);
        }

        ClassCmd::Roster { id } => {
            let (class, students) = directory::roster(conn, &user, *id)?;
            header(format!("Roster of {} ({} students)", class.name, students.len()), sep);
            if students.is_empty() {
                info("No students enrolled.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Name", "Number"]);
            for s in students {
                t.add_row(vec![
                    s.id.to_string(),
                    s.full_name,
                    colorize_optional(s.student_id_number.as_deref()),
                ]);
            }
            t.print(sep);
        }

        ClassCmd::Assign { id, teacher_id } => {
            let c = directory::assign_teacher(conn, &user, *id, *teacher_id)?;
            success(format!(
                "{} is now the class teacher of '{}'",
                profile_name(conn, c.teacher_id),
                c.name
            ));
        }
    }
    Ok(())
}

pub fn student(cmd: &StudentCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;

    match cmd {
        StudentCmd::Add {
            name,
            class_id,
            number,
            email,
            parent_id,
            profile_id,
        } => {
            let form = StudentForm {
                full_name: Some(name.clone()),
                class_id: Some(*class_id),
                student_id_number: number.clone(),
                email: email.clone(),
                parent_id: *parent_id,
                profile_id: *profile_id,
            };
            let s = directory::add_student(conn, &user, form)?;
            success(format!("Student '{}' enrolled (id {})", s.full_name, s.id));
        }

        StudentCmd::Update {
            id,
            name,
            class_id,
            number,
            email,
            parent_id,
            profile_id,
        } => {
            let patch = StudentForm {
                full_name: name.clone(),
                class_id: *class_id,
                student_id_number: number.clone(),
                email: email.clone(),
                parent_id: *parent_id,
                profile_id: *profile_id,
            };
            let s = directory::update_student(conn, &user, *id, patch)?;
            success(format!("Student '{}' updated", s.full_name));
        }

        StudentCmd::Del { id } => {
            let s = directory::delete_student(conn, &user, *id)?;
            success(format!("Student '{}' removed", s.full_name));
        }

        StudentCmd::List { class_id } => {
            let students = directory::students_for(conn, &user, *class_id)?;
            if students.is_empty() {
                info("No students found.");
                return Ok(());
            }
            let mut t = Table::new(["ID", "Name", "Class", "Number", "Parent"]);
            for s in students {
                t.add_row(vec![
                    s.id.to_string(),
                    s.full_name,
                    s.class_id.to_string(),
                    colorize_optional(s.student_id_number.as_deref()),
                    profile_name(conn, s.parent_id),
                ]);
            }
            t.print(&cfg.separator_char);
        }
    }
    Ok(())
}

pub fn user(cmd: &UserCmd, cfg: &Config) -> AppResult<()> {
    let UserCmd::List { role } = cmd;
    let role = match role {
        Some(r) => Some(Role::from_code(r).ok_or_else(|| AppError::InvalidRole(r.clone()))?),
        None => None,
    };

    let (pool, user) = signed_in(cfg)?;
    let users = directory::list_users(&pool.conn, &user, role)?;
    if users.is_empty() {
        info("No users found.");
        return Ok(());
    }
    let mut t = Table::new(["ID", "Name", "Email", "Role"]);
    for p in users {
        t.add_row(vec![p.id.to_string(), p.full_name, p.email, p.role.to_string()]);
    }
    t.print(&cfg.separator_char);
    Ok(())
}

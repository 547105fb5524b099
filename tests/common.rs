#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rollcall::core::auth::{SignUp, sign_up};
use rollcall::core::directory::{self, StudentForm};
use rollcall::db::pool::DbPool;
use rollcall::models::class::Class;
use rollcall::models::profile::Profile;
use rollcall::models::role::Role;
use rollcall::models::student::Student;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const PASSWORD: &str = "secret123";

pub fn rc() -> Command {
    cargo_bin_cmd!("rollcall")
}

/// `rollcall --db <db> <args…>`
pub fn rc_db(db_path: &str, args: &[&str]) -> Command {
    let mut cmd = rc();
    cmd.arg("--db").arg(db_path).args(args);
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any
/// existing file (and its remembered session).
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rollcall.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    fs::remove_file(format!("{db_path}.session")).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rollcall_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn signin(db_path: &str, email: &str) {
    rc_db(db_path, &["auth", "signin", "--email", email, "--password", PASSWORD])
        .assert()
        .success();
}

fn signup(db_path: &str, email: &str, name: &str, role: &str, school: Option<&str>) {
    let mut args = vec![
        "auth", "signup", "--email", email, "--name", name, "--password", PASSWORD, "--role", role,
    ];
    if let Some(code) = school {
        args.push("--school");
        args.push(code);
    }
    rc_db(db_path, &args).assert().success();
}

/// Initialise a database through the CLI with one school (code HILL). The
/// ministry account bootstraps the file and opens the other accounts:
///
/// | profile id | email               | role     |
/// |------------|---------------------|----------|
/// | 1          | min@gov.test        | ministry |
/// | 2          | teacher@hill.test   | teacher  |
/// | 3          | parent@hill.test    | parent   |
/// | 4          | pupil@hill.test     | student  |
/// | 5          | admin@hill.test     | admin    |
///
/// Class 1 "5A" led by the teacher, with students 1 "Ada Lovelace" (child of
/// the parent, linked to the student profile) and 2 "Ben Turing".
/// Leaves the admin signed in.
pub fn init_school(db_path: &str) {
    rc_db(db_path, &["--test", "init"]).assert().success();

    signup(db_path, "min@gov.test", "Mina Ministry", "ministry", None);
    rc_db(
        db_path,
        &["school", "add", "--name", "Hill School", "--code", "HILL", "--region", "North"],
    )
    .assert()
    .success();

    signup(db_path, "teacher@hill.test", "Tom Teacher", "teacher", Some("HILL"));
    signup(db_path, "parent@hill.test", "Pat Parent", "parent", Some("HILL"));
    signup(db_path, "pupil@hill.test", "Ada Lovelace", "student", Some("HILL"));
    signup(db_path, "admin@hill.test", "Alma Admin", "admin", Some("HILL"));
    signin(db_path, "admin@hill.test");

    rc_db(db_path, &["class", "add", "--name", "5A", "--grade", "5", "--teacher", "2"])
        .assert()
        .success();
    rc_db(
        db_path,
        &["student", "add", "--name", "Ada Lovelace", "--class", "1", "--parent", "3", "--profile", "4"],
    )
    .assert()
    .success();
    rc_db(db_path, &["student", "add", "--name", "Ben Turing", "--class", "1"])
        .assert()
        .success();
}

/// Library-level fixture on an in-memory database.
pub struct World {
    pub pool: DbPool,
    pub ministry: Profile,
    pub admin: Profile,
    pub teacher: Profile,
    pub parent: Profile,
    pub pupil: Profile,
    pub class: Class,
    /// Ada (linked to `parent` and `pupil`), Ben, Cleo: in roster order.
    pub students: Vec<Student>,
}

fn account(
    pool: &DbPool,
    email: &str,
    name: &str,
    role: Role,
    school: Option<&str>,
    creator: Option<&Profile>,
) -> Profile {
    sign_up(
        &pool.conn,
        &SignUp {
            email,
            full_name: name,
            password: PASSWORD,
            role,
            school_code: school,
        },
        creator,
    )
    .expect("sign up")
}

pub fn world() -> World {
    let pool = DbPool::in_memory().expect("in-memory db");
    let ministry = account(&pool, "min@gov.test", "Mina Ministry", Role::Ministry, None, None);
    directory::add_school(&pool.conn, &ministry, "Hill School", "hill", Some("North")).expect("school");

    let admin = account(&pool, "admin@hill.test", "Alma Admin", Role::Admin, Some("HILL"), Some(&ministry));
    let teacher = account(&pool, "teacher@hill.test", "Tom Teacher", Role::Teacher, None, Some(&admin));
    let parent = account(&pool, "parent@hill.test", "Pat Parent", Role::Parent, Some("HILL"), None);
    let pupil = account(&pool, "pupil@hill.test", "Ada Lovelace", Role::Student, Some("HILL"), None);

    let class = directory::add_class(&pool.conn, &admin, "5A", Some("5"), Some(teacher.id)).expect("class");

    let mut students = Vec::new();
    for (name, parent_id, profile_id) in [
        ("Ada Lovelace", Some(parent.id), Some(pupil.id)),
        ("Ben Turing", None, None),
        ("Cleo Hopper", None, None),
    ] {
        let s = directory::add_student(
            &pool.conn,
            &admin,
            StudentForm {
                full_name: Some(name.to_string()),
                class_id: Some(class.id),
                parent_id,
                profile_id,
                ..Default::default()
            },
        )
        .expect("student");
        students.push(s);
    }

    World {
        pool,
        ministry,
        admin,
        teacher,
        parent,
        pupil,
        class,
        students,
    }
}

/// A second school with its own admin and class, for tenancy checks.
pub fn second_school(w: &World) -> (Profile, Class) {
    directory::add_school(&w.pool.conn, &w.ministry, "River School", "RIVER", None).expect("school");
    let admin = account(
        &w.pool,
        "admin@river.test",
        "Rita Admin",
        Role::Admin,
        Some("RIVER"),
        Some(&w.ministry),
    );
    let class = directory::add_class(&w.pool.conn, &admin, "6B", None, None).expect("class");
    (admin, class)
}

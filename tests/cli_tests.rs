use predicates::str::contains;
use std::fs;

mod common;
use common::{PASSWORD, init_school, rc, rc_db, setup_test_db, signin, temp_out};

/// Teacher marks 2026-10-05: Ada present, Ben absent with a comment.
fn mark_day(db: &str) {
    signin(db, "teacher@hill.test");
    rc_db(db, &["attendance", "mark", "--class", "1", "--date", "2026-10-05"])
        .write_stdin("p\nn\na\nc flu\nn\n")
        .assert()
        .success()
        .stdout(contains("Attendance saved for 2 student(s)."));
}

#[test]
fn test_help_lists_commands() {
    rc().arg("--help")
        .assert()
        .success()
        .stdout(contains("attendance"))
        .stdout(contains("checkin"));
}

#[test]
fn test_signup_signin_and_whoami() {
    let db = setup_test_db("auth_flow");
    init_school(&db);

    rc_db(&db, &["auth", "whoami"])
        .assert()
        .success()
        .stdout(contains("Alma Admin <admin@hill.test>, School administrator (id 5)"));

    rc_db(&db, &["auth", "signin", "--email", "admin@hill.test", "--password", "nope"])
        .assert()
        .failure()
        .stderr(contains("Error:"));

    signin(&db, "parent@hill.test");
    rc_db(&db, &["auth", "whoami"])
        .assert()
        .success()
        .stdout(contains("Pat Parent"));

    rc_db(&db, &["auth", "signout"])
        .assert()
        .success()
        .stdout(contains("Signed out."));
    rc_db(&db, &["auth", "whoami"])
        .assert()
        .failure()
        .stderr(contains("not signed in"));
}

#[test]
fn test_signup_rejects_unknown_school_and_duplicate_email() {
    let db = setup_test_db("signup_errors");
    init_school(&db);

    rc_db(
        &db,
        &[
            "auth", "signup", "--email", "x@nowhere.test", "--name", "X", "--password", PASSWORD, "--role",
            "teacher", "--school", "NOPE",
        ],
    )
    .assert()
    .failure();

    rc_db(
        &db,
        &[
            "auth", "signup", "--email", "teacher@hill.test", "--name", "Again", "--password", PASSWORD,
            "--role", "teacher", "--school", "HILL",
        ],
    )
    .assert()
    .failure();
}

#[test]
fn test_signup_refuses_self_promoted_staff() {
    let db = setup_test_db("signup_roles");
    init_school(&db);
    rc_db(&db, &["auth", "signout"]).assert().success();

    for (email, role, school) in [("rogue@x.test", "ministry", None), ("rogue2@x.test", "admin", Some("HILL"))] {
        let mut args = vec![
            "auth", "signup", "--email", email, "--name", "Rogue", "--password", PASSWORD, "--role", role,
        ];
        if let Some(code) = school {
            args.extend(["--school", code]);
        }
        rc_db(&db, &args)
            .assert()
            .failure()
            .stderr(contains("Permission denied"));
    }
    rc_db(&db, &["auth", "whoami"]).assert().failure();

    // a parent signs up alone and lands signed in
    rc_db(
        &db,
        &[
            "auth", "signup", "--email", "p2@hill.test", "--name", "Paula Parent", "--password", PASSWORD,
            "--role", "parent", "--school", "HILL",
        ],
    )
    .assert()
    .success();
    rc_db(&db, &["auth", "whoami"])
        .assert()
        .success()
        .stdout(contains("Paula Parent"));

    // the admin opens a teacher account in their own school and stays signed in
    signin(&db, "admin@hill.test");
    rc_db(
        &db,
        &[
            "auth", "signup", "--email", "t2@hill.test", "--name", "Tia Teacher", "--password", PASSWORD,
            "--role", "teacher",
        ],
    )
    .assert()
    .success()
    .stdout(contains("You are still signed in as Alma Admin."));
    rc_db(&db, &["auth", "whoami"])
        .assert()
        .success()
        .stdout(contains("Alma Admin"));
}

#[test]
fn test_directory_listing_and_roles() {
    let db = setup_test_db("directory");
    init_school(&db);

    rc_db(&db, &["class", "list"])
        .assert()
        .success()
        .stdout(contains("5A"))
        .stdout(contains("Tom Teacher"));

    rc_db(&db, &["class", "roster", "1"])
        .assert()
        .success()
        .stdout(contains("Ada Lovelace"))
        .stdout(contains("Ben Turing"));

    rc_db(&db, &["student", "update", "2", "--number", "S-002"])
        .assert()
        .success()
        .stdout(contains("Student 'Ben Turing' updated"));

    signin(&db, "teacher@hill.test");
    rc_db(&db, &["class", "add", "--name", "5C"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_mark_attendance_through_the_walker() {
    let db = setup_test_db("mark_walk");
    init_school(&db);
    mark_day(&db);

    rc_db(&db, &["attendance", "list", "--class", "1", "--date", "2026-10-05"])
        .assert()
        .success()
        .stdout(contains("present"))
        .stdout(contains("absent"))
        .stdout(contains("flu"));
}

#[test]
fn test_cancelled_walk_saves_nothing() {
    let db = setup_test_db("mark_cancel");
    init_school(&db);
    signin(&db, "teacher@hill.test");

    rc_db(&db, &["attendance", "mark", "--class", "1", "--date", "2026-10-05"])
        .write_stdin("p\nn\nq\n")
        .assert()
        .success()
        .stdout(contains("nothing was saved"));

    rc_db(&db, &["attendance", "list", "--class", "1", "--date", "2026-10-05"])
        .assert()
        .success()
        .stdout(contains("No attendance records found."));
}

#[test]
fn test_parent_cannot_mark() {
    let db = setup_test_db("mark_parent");
    init_school(&db);
    signin(&db, "parent@hill.test");

    rc_db(&db, &["attendance", "set", "--student", "1", "--status", "p"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));
}

#[test]
fn test_check_in_with_session_code() {
    let db = setup_test_db("checkin_flow");
    init_school(&db);
    signin(&db, "teacher@hill.test");

    rc_db(&db, &["session", "open", "--class", "1", "--code", "ROOM42"])
        .assert()
        .success()
        .stdout(contains("Check-in open for 5A"))
        .stdout(contains("ROOM42"));

    signin(&db, "pupil@hill.test");
    rc_db(&db, &["checkin", "--code", "WRONG1"])
        .assert()
        .failure()
        .stderr(contains("Invalid or expired code"));
    rc_db(&db, &["checkin", "--code", " ROOM42 "])
        .assert()
        .success()
        .stdout(contains("Checked in successfully"));
    rc_db(&db, &["checkin", "--code", "ROOM42"])
        .assert()
        .failure()
        .stderr(contains("already checked in today"));

    signin(&db, "teacher@hill.test");
    rc_db(&db, &["session", "close", "--class", "1"])
        .assert()
        .success()
        .stdout(contains("Check-in closed for 5A"));
}

#[test]
fn test_absence_approval_excuses_days() {
    let db = setup_test_db("absence_flow");
    init_school(&db);

    signin(&db, "parent@hill.test");
    rc_db(
        &db,
        &[
            "absence", "submit", "--student", "1", "--from", "2026-10-06", "--to", "2026-10-07", "--reason",
            "dentist",
        ],
    )
    .assert()
    .success()
    .stdout(contains("Absence request 1 submitted (2026-10-06 to 2026-10-07)"));

    signin(&db, "teacher@hill.test");
    rc_db(&db, &["notify", "list", "--unread"])
        .assert()
        .success()
        .stdout(contains("New absence request"));
    rc_db(&db, &["absence", "review", "1", "--approve"])
        .assert()
        .success()
        .stdout(contains("2 day(s) marked excused"));
    rc_db(&db, &["absence", "review", "1", "--reject"])
        .assert()
        .failure();

    rc_db(&db, &["attendance", "list", "--student", "1"])
        .assert()
        .success()
        .stdout(contains("excused"))
        .stdout(contains("dentist"));
}

#[test]
fn test_announcement_reaches_parents() {
    let db = setup_test_db("announce_flow");
    init_school(&db);

    rc_db(
        &db,
        &["announce", "create", "--title", "Trip", "--body", "Museum on Friday", "--audience", "parents"],
    )
    .assert()
    .success()
    .stdout(contains("1 recipient(s) notified"));

    signin(&db, "parent@hill.test");
    rc_db(&db, &["home"])
        .assert()
        .success()
        .stdout(contains("Welcome, Pat Parent (Parent)"))
        .stdout(contains("1 unread notification(s)"));
    rc_db(&db, &["notify", "read", "--all"])
        .assert()
        .success()
        .stdout(contains("1 notification(s) marked as read"));
}

#[test]
fn test_class_report_counts_records() {
    let db = setup_test_db("report_class");
    init_school(&db);
    mark_day(&db);

    rc_db(&db, &["report", "class", "1", "--range", "2026-10"])
        .assert()
        .success()
        .stdout(contains("Attendance of class 5A"))
        .stdout(contains("Records:  2"))
        .stdout(contains("50.0%"));

    signin(&db, "parent@hill.test");
    rc_db(&db, &["report", "student"])
        .assert()
        .success()
        .stdout(contains("Attendance of Ada Lovelace"))
        .stdout(contains("100.0%"));
}

#[test]
fn test_export_csv_and_json() {
    let db = setup_test_db("export_flow");
    init_school(&db);
    mark_day(&db);
    signin(&db, "admin@hill.test");

    let csv_out = temp_out("export_flow", "csv");
    rc_db(&db, &["export", "--format", "csv", "--file", &csv_out, "--force"])
        .assert()
        .success();
    let csv = fs::read_to_string(&csv_out).unwrap();
    assert!(csv.starts_with("date,school,class,student,student_number,status"));
    assert!(csv.contains("2026-10-05,Hill School,5A,Ben Turing,,absent,,flu,Tom Teacher"));

    let json_out = temp_out("export_flow", "json");
    rc_db(
        &db,
        &["export", "--format", "json", "--file", &json_out, "--range", "2026-10-05", "--force"],
    )
    .assert()
    .success();
    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json_out).unwrap()).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(2));
    assert_eq!(rows[0]["student"], "Ada Lovelace");

    rc_db(&db, &["export", "--file", "relative.csv", "--force"])
        .assert()
        .failure()
        .stderr(contains("must be absolute"));
}

#[test]
fn test_db_log_and_config_commands() {
    let db = setup_test_db("maintenance");
    init_school(&db);

    rc_db(&db, &["db", "--check"])
        .assert()
        .success()
        .stdout(contains("Integrity check passed."));
    rc_db(&db, &["db", "--info"])
        .assert()
        .success()
        .stdout(contains("attendance"));
    rc_db(&db, &["log", "--print"])
        .assert()
        .success()
        .stdout(contains("signup"));
}

#[test]
fn test_backup_writes_snapshot_and_zip() {
    let db = setup_test_db("backup");
    init_school(&db);

    let plain = temp_out("backup_plain", "sqlite");
    rc_db(&db, &["backup", "--file", &plain, "--force"])
        .assert()
        .success()
        .stdout(contains("Backup written to"));
    assert!(fs::metadata(&plain).unwrap().len() > 0);

    let zipped = temp_out("backup_zip", "sqlite");
    let zip_path = zipped.replace(".sqlite", ".zip");
    fs::remove_file(&zip_path).ok();
    rc_db(&db, &["backup", "--file", &zipped, "--compress", "--force"])
        .assert()
        .success();
    assert!(fs::metadata(&zip_path).is_ok());
    assert!(fs::metadata(&zipped).is_err());

    rc_db(&db, &["log", "--print"])
        .assert()
        .success()
        .stdout(contains("backup"));
}

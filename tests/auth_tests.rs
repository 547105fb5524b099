use rollcall::core::auth::{SignUp, sign_in, sign_up, verify_password};
use rollcall::core::tenancy;
use rollcall::db::pool::DbPool;
use rollcall::db::repo::{Query, Repo};
use rollcall::errors::AppError;
use rollcall::models::profile::Profile;
use rollcall::models::role::Role;

mod common;
use common::{PASSWORD, second_school, world};

fn form<'a>(email: &'a str, role: Role, school: Option<&'a str>) -> SignUp<'a> {
    SignUp {
        email,
        full_name: "Someone",
        password: PASSWORD,
        role,
        school_code: school,
    }
}

fn profile_count(pool: &DbPool) -> i64 {
    Repo::<Profile>::new(&pool.conn).count(&Query::new()).unwrap()
}

#[test]
fn test_first_account_may_be_ministry() {
    let pool = DbPool::in_memory().unwrap();
    let p = sign_up(&pool.conn, &form("boot@gov.test", Role::Ministry, None), None).unwrap();
    assert_eq!(p.role, Role::Ministry);
    assert_eq!(p.school_id, None);
}

#[test]
fn test_self_signup_as_ministry_refused_once_accounts_exist() {
    let w = world();
    let before = profile_count(&w.pool);

    let err = sign_up(&w.pool.conn, &form("rogue@x.test", Role::Ministry, None), None).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(profile_count(&w.pool), before);

    // nobody can sign in as the refused account, so no school is reachable
    assert!(sign_in(&w.pool.conn, "rogue@x.test", PASSWORD).is_err());
}

#[test]
fn test_self_signup_as_admin_with_public_code_refused() {
    let w = world();
    let rogue = form("rogue@x.test", Role::Admin, Some("HILL"));
    let err = sign_up(&w.pool.conn, &rogue, None).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // only the ministry opens admin accounts
    for by in [&w.parent, &w.teacher, &w.admin] {
        let err = sign_up(&w.pool.conn, &rogue, Some(by)).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)), "created by {:?}", by.role);
    }
}

#[test]
fn test_teacher_accounts_come_from_school_staff() {
    let w = world();

    let alone = form("t2@hill.test", Role::Teacher, Some("HILL"));
    let err = sign_up(&w.pool.conn, &alone, None).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let by_admin = form("t2@hill.test", Role::Teacher, None);
    let t = sign_up(&w.pool.conn, &by_admin, Some(&w.admin)).unwrap();
    assert_eq!(t.school_id, w.admin.school_id);
    assert!(tenancy::load_class(&w.pool.conn, &t, w.class.id).is_ok());

    let t3 = sign_up(
        &w.pool.conn,
        &form("t3@hill.test", Role::Teacher, Some("HILL")),
        Some(&w.ministry),
    )
    .unwrap();
    assert_eq!(t3.role, Role::Teacher);
}

#[test]
fn test_admin_cannot_open_accounts_in_another_school() {
    let w = world();
    second_school(&w);

    let err = sign_up(
        &w.pool.conn,
        &form("t9@river.test", Role::Teacher, Some("RIVER")),
        Some(&w.admin),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn test_parents_and_students_sign_up_themselves() {
    let w = world();
    let conn = &w.pool.conn;
    let parent = sign_up(conn, &form("p2@hill.test", Role::Parent, Some("HILL")), None).unwrap();
    let pupil = sign_up(conn, &form("s2@hill.test", Role::Student, Some("hill")), None).unwrap();
    assert_eq!(parent.school_id, w.admin.school_id);
    assert_eq!(pupil.school_id, w.admin.school_id);

    let err = sign_up(&w.pool.conn, &form("p3@hill.test", Role::Parent, None), None).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_passwords_are_stored_as_argon2_phc_strings() {
    let w = world();
    assert!(w.parent.password_hash.starts_with("$argon2id$"));
    assert!(!w.parent.password_hash.contains(PASSWORD));
    // per-account salt
    assert_ne!(w.parent.password_hash, w.teacher.password_hash);

    assert!(verify_password(&w.parent.password_hash, PASSWORD));
    assert!(!verify_password(&w.parent.password_hash, "secret124"));
    assert!(!verify_password("not-a-phc-string", PASSWORD));

    let (p, token) = sign_in(&w.pool.conn, "PARENT@hill.test ", PASSWORD).unwrap();
    assert_eq!(p.id, w.parent.id);
    assert_eq!(token.len(), 40);
    assert!(sign_in(&w.pool.conn, "parent@hill.test", "wrong-password").is_err());
}

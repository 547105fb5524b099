use chrono::{Duration, Local};
use rollcall::core::checkin::{
    MSG_ALREADY, MSG_CHECKED_IN, MSG_INVALID_CODE, MSG_OTHER_CLASS, active_session, check_in, close_sessions,
    generate_code, open_session,
};
use rollcall::core::marking::{records_for_day, upsert_record};
use rollcall::errors::AppError;
use rollcall::models::attendance::AttendanceStatus;

mod common;
use common::{second_school, world};

#[test]
fn test_valid_code_records_present_with_time() {
    let w = world();
    let now = Local::now();
    let ada = &w.students[0];
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();

    let outcome = check_in(&w.pool.conn, ada, "ROOM42", now);
    assert!(outcome.success);
    assert_eq!(outcome.message, MSG_CHECKED_IN);

    let records = records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, ada.id);
    assert_eq!(records[0].status, AttendanceStatus::Present);
    assert!(records[0].check_in_time.is_some());
    assert_eq!(records[0].marked_by, Some(w.pupil.id));
}

#[test]
fn test_code_is_trimmed() {
    let w = world();
    let now = Local::now();
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();
    assert!(check_in(&w.pool.conn, &w.students[1], "  ROOM42 ", now).success);
}

#[test]
fn test_second_check_in_same_day_is_rejected() {
    let w = world();
    let now = Local::now();
    let ada = &w.students[0];
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();

    assert!(check_in(&w.pool.conn, ada, "ROOM42", now).success);
    let again = check_in(&w.pool.conn, ada, "ROOM42", now);
    assert!(!again.success);
    assert_eq!(again.message, MSG_ALREADY);
    assert_eq!(records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap().len(), 1);
}

#[test]
fn test_marked_student_cannot_check_in() {
    let w = world();
    let now = Local::now();
    let ben = &w.students[1];
    upsert_record(
        &w.pool.conn,
        ben.id,
        w.class.id,
        now.date_naive(),
        AttendanceStatus::Absent,
        None,
        Some(w.teacher.id),
    )
    .unwrap();
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();

    let outcome = check_in(&w.pool.conn, ben, "ROOM42", now);
    assert_eq!(outcome.message, MSG_ALREADY);
}

#[test]
fn test_wrong_or_empty_code_is_invalid() {
    let w = world();
    let now = Local::now();
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();

    for code in ["ROOM43", "room42", "", "   "] {
        let outcome = check_in(&w.pool.conn, &w.students[0], code, now);
        assert!(!outcome.success, "code {code:?} should fail");
        assert_eq!(outcome.message, MSG_INVALID_CODE);
    }
}

#[test]
fn test_expired_code_is_invalid() {
    let w = world();
    let opened = Local::now() - Duration::minutes(20);
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, opened).unwrap();

    let outcome = check_in(&w.pool.conn, &w.students[0], "ROOM42", Local::now());
    assert_eq!(outcome.message, MSG_INVALID_CODE);
    assert!(active_session(&w.pool.conn, w.class.id, Local::now()).unwrap().is_none());
}

#[test]
fn test_closed_session_is_invalid() {
    let w = world();
    let now = Local::now();
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();
    assert_eq!(close_sessions(&w.pool.conn, w.class.id).unwrap(), 1);

    assert_eq!(check_in(&w.pool.conn, &w.students[0], "ROOM42", now).message, MSG_INVALID_CODE);
}

#[test]
fn test_reopening_replaces_the_previous_code() {
    let w = world();
    let now = Local::now();
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("FIRST1"), 6, now).unwrap();
    let second = open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, None, 6, now).unwrap();

    assert_eq!(second.session_code.len(), 6);
    let active = active_session(&w.pool.conn, w.class.id, now).unwrap().unwrap();
    assert_eq!(active.id, second.id);
    assert_eq!(check_in(&w.pool.conn, &w.students[0], "FIRST1", now).message, MSG_INVALID_CODE);
    assert!(check_in(&w.pool.conn, &w.students[0], &second.session_code, now).success);
}

#[test]
fn test_code_of_another_class_is_refused() {
    let w = world();
    let now = Local::now();
    let (river_admin, river_class) = second_school(&w);
    open_session(&w.pool.conn, river_class.id, river_admin.id, 15, Some("RIVER1"), 6, now).unwrap();

    let outcome = check_in(&w.pool.conn, &w.students[0], "RIVER1", now);
    assert!(!outcome.success);
    assert_eq!(outcome.message, MSG_OTHER_CLASS);
    assert!(records_for_day(&w.pool.conn, river_class.id, now.date_naive()).unwrap().is_empty());
    assert!(records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap().is_empty());
}

#[test]
fn test_same_custom_code_in_two_classes_resolves_to_own_class() {
    let w = world();
    let now = Local::now();
    let (river_admin, river_class) = second_school(&w);
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("SHARED"), 6, now).unwrap();
    open_session(&w.pool.conn, river_class.id, river_admin.id, 15, Some("SHARED"), 6, now).unwrap();

    assert!(check_in(&w.pool.conn, &w.students[0], "SHARED", now).success);
    let records = records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_manual_mark_keeps_check_in_time() {
    let w = world();
    let now = Local::now();
    let ada = &w.students[0];
    open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some("ROOM42"), 6, now).unwrap();
    check_in(&w.pool.conn, ada, "ROOM42", now);
    let before = records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap()[0].check_in_time;

    upsert_record(
        &w.pool.conn,
        ada.id,
        w.class.id,
        now.date_naive(),
        AttendanceStatus::Late,
        Some("arrived after bell".into()),
        Some(w.teacher.id),
    )
    .unwrap();

    let after = &records_for_day(&w.pool.conn, w.class.id, now.date_naive()).unwrap()[0];
    assert_eq!(after.status, AttendanceStatus::Late);
    assert_eq!(after.check_in_time, before);
    assert_eq!(after.marked_by, Some(w.teacher.id));
}

#[test]
fn test_bad_custom_codes_and_durations_are_refused() {
    let w = world();
    let now = Local::now();
    for code in ["AB1", "ROOM 42", "ROOM-42"] {
        let err = open_session(&w.pool.conn, w.class.id, w.teacher.id, 15, Some(code), 6, now).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{code:?}");
    }
    let err = open_session(&w.pool.conn, w.class.id, w.teacher.id, 0, None, 6, now).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_generated_codes_avoid_ambiguous_characters() {
    for _ in 0..50 {
        let code = generate_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        assert!(!code.contains(['0', 'O', '1', 'I']));
    }
    assert_eq!(generate_code(2).len(), 4);
}

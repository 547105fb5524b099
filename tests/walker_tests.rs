use rollcall::core::walker::{AttendanceWalker, DraftRecord, Step, WalkerEvent, WalkerState};
use rollcall::models::attendance::{AttendanceRecord, AttendanceStatus};
use rollcall::models::student::Student;

use AttendanceStatus::{Absent, Excused, Late, Present};

fn student(id: i64, name: &str) -> Student {
    Student {
        id,
        class_id: 1,
        full_name: name.to_string(),
        student_id_number: None,
        email: None,
        parent_id: None,
        profile_id: None,
    }
}

fn roster() -> Vec<Student> {
    vec![student(10, "Ada"), student(20, "Ben"), student(30, "Cleo")]
}

fn started(roster: Vec<Student>) -> AttendanceWalker {
    let mut w = AttendanceWalker::new(roster);
    w.apply(WalkerEvent::Start).unwrap();
    w
}

fn draft(student_id: i64, status: AttendanceStatus, comment: Option<&str>) -> DraftRecord {
    DraftRecord {
        student_id,
        status,
        comment: comment.map(str::to_string),
    }
}

#[test]
fn test_full_walk_emits_drafts_in_roster_order() {
    let mut w = started(roster());
    assert_eq!(w.state(), WalkerState::Viewing(0));

    w.apply(WalkerEvent::Select(Present)).unwrap();
    assert_eq!(w.apply(WalkerEvent::Next).unwrap(), Step::Viewing(1));
    w.apply(WalkerEvent::Select(Absent)).unwrap();
    w.apply(WalkerEvent::Comment("  sick  ".into())).unwrap();
    w.apply(WalkerEvent::Next).unwrap();
    w.apply(WalkerEvent::Select(Late)).unwrap();

    let step = w.apply(WalkerEvent::Next).unwrap();
    assert_eq!(
        step,
        Step::Completed(vec![
            draft(10, Present, None),
            draft(20, Absent, Some("sick")),
            draft(30, Late, None),
        ])
    );
    assert_eq!(w.state(), WalkerState::Complete);
    assert_eq!(w.progress(), 1.0);
}

#[test]
fn test_empty_roster_completes_on_start() {
    let mut w = AttendanceWalker::new(Vec::new());
    assert_eq!(w.apply(WalkerEvent::Start).unwrap(), Step::Completed(Vec::new()));
    assert_eq!(w.state(), WalkerState::Complete);
}

#[test]
fn test_events_before_start_are_rejected() {
    let mut w = AttendanceWalker::new(roster());
    assert!(w.apply(WalkerEvent::Select(Present)).is_err());
    assert!(w.apply(WalkerEvent::Next).is_err());
    assert_eq!(w.state(), WalkerState::Idle);
    assert!(w.current().is_none());
}

#[test]
fn test_next_requires_a_selection() {
    let mut w = started(roster());
    assert!(!w.can_advance());
    assert!(w.apply(WalkerEvent::Next).is_err());
    assert_eq!(w.state(), WalkerState::Viewing(0));

    w.apply(WalkerEvent::Select(Absent)).unwrap();
    assert!(w.can_advance());
}

#[test]
fn test_previous_on_first_student_stays_put() {
    let mut w = started(roster());
    assert_eq!(w.apply(WalkerEvent::Previous).unwrap(), Step::Viewing(0));
    assert_eq!(w.current().map(|s| s.id), Some(10));
}

#[test]
fn test_previous_keeps_both_selections() {
    let mut w = started(roster());
    w.apply(WalkerEvent::Select(Late)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();
    w.apply(WalkerEvent::Select(Absent)).unwrap();

    w.apply(WalkerEvent::Previous).unwrap();
    assert_eq!(w.selection(), Some(Late));

    w.apply(WalkerEvent::Next).unwrap();
    assert_eq!(w.selection(), Some(Absent));
}

#[test]
fn test_skip_leaves_student_without_draft() {
    let mut w = started(roster());
    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Skip).unwrap();
    assert_eq!(w.state(), WalkerState::Viewing(1));
    w.apply(WalkerEvent::Skip).unwrap();
    w.apply(WalkerEvent::Select(Absent)).unwrap();

    let Step::Completed(drafts) = w.apply(WalkerEvent::Next).unwrap() else {
        panic!("walk should be complete");
    };
    assert_eq!(drafts, vec![draft(30, Absent, None)]);
}

#[test]
fn test_skip_all_emits_no_drafts() {
    let mut w = started(roster());
    assert_eq!(w.apply(WalkerEvent::Skip).unwrap(), Step::Viewing(1));
    assert_eq!(w.apply(WalkerEvent::Skip).unwrap(), Step::Viewing(2));
    assert_eq!(w.apply(WalkerEvent::Skip).unwrap(), Step::Completed(Vec::new()));
    assert_eq!(w.state(), WalkerState::Complete);
}

#[test]
fn test_previous_then_reselect_overwrites_draft() {
    let mut w = started(roster());
    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();

    assert_eq!(w.apply(WalkerEvent::Previous).unwrap(), Step::Viewing(0));
    assert_eq!(w.selection(), Some(Present));
    w.apply(WalkerEvent::Select(Absent)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();

    w.apply(WalkerEvent::Skip).unwrap();
    let step = w.apply(WalkerEvent::Skip).unwrap();
    assert_eq!(step, Step::Completed(vec![draft(10, Absent, None)]));
}

#[test]
fn test_existing_records_prepopulate_and_drafts_win() {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
    let mut existing = AttendanceRecord::new(20, 1, date, Late, Some(99));
    existing.notes = Some("bus".into());

    let mut w = AttendanceWalker::new(roster()).with_existing(&[existing]);
    w.apply(WalkerEvent::Start).unwrap();
    assert_eq!(w.selection(), None);

    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();
    assert_eq!(w.selection(), Some(Late));
    assert_eq!(w.comment(), "bus");

    w.apply(WalkerEvent::Select(Absent)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();
    w.apply(WalkerEvent::Previous).unwrap();
    assert_eq!(w.selection(), Some(Absent));
}

#[test]
fn test_excused_cannot_be_selected() {
    let mut w = started(roster());
    assert!(w.apply(WalkerEvent::Select(Excused)).is_err());
    assert_eq!(w.selection(), None);
}

#[test]
fn test_prepopulated_excused_is_kept() {
    let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
    let existing = AttendanceRecord::new(10, 1, date, Excused, None);
    let mut w = AttendanceWalker::new(vec![student(10, "Ada")]).with_existing(&[existing]);
    w.apply(WalkerEvent::Start).unwrap();

    assert_eq!(
        w.apply(WalkerEvent::Next).unwrap(),
        Step::Completed(vec![draft(10, Excused, None)])
    );
}

#[test]
fn test_empty_comment_clears_it() {
    let mut w = started(roster());
    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Comment("note".into())).unwrap();
    w.apply(WalkerEvent::Comment(String::new())).unwrap();
    assert_eq!(w.comment(), "");
}

#[test]
fn test_cancel_discards_and_closes() {
    let mut w = started(roster());
    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();

    assert_eq!(w.apply(WalkerEvent::Cancel).unwrap(), Step::Cancelled);
    assert_eq!(w.state(), WalkerState::Cancelled);
    assert!(w.apply(WalkerEvent::Select(Present)).is_err());
    assert!(w.apply(WalkerEvent::Start).is_err());
}

#[test]
fn test_events_after_completion_are_rejected() {
    let mut w = started(vec![student(10, "Ada")]);
    w.apply(WalkerEvent::Select(Present)).unwrap();
    w.apply(WalkerEvent::Next).unwrap();
    assert!(w.apply(WalkerEvent::Previous).is_err());
    assert!(w.apply(WalkerEvent::Cancel).is_err());
}

#[test]
fn test_progress_follows_position() {
    let mut w = AttendanceWalker::new(vec![student(1, "A"), student(2, "B"), student(3, "C"), student(4, "D")]);
    assert_eq!(w.progress(), 0.0);
    w.apply(WalkerEvent::Start).unwrap();
    assert_eq!(w.progress(), 0.25);
    w.apply(WalkerEvent::Skip).unwrap();
    assert_eq!(w.progress(), 0.5);
}

use chrono::{NaiveDate, NaiveTime, Weekday};
use rollcall::core::marking::{RecordFilter, flush_drafts, list_records, records_for_day, upsert_record};
use rollcall::core::stats::{Period, StatusCounts, class_report, school_report, student_report};
use rollcall::core::walker::DraftRecord;
use rollcall::core::timetable::{NewSlot, add_schedule, add_subject, schedule_for};
use rollcall::core::{absence, announce, directory, issues, leave, notes, notify, tenancy};
use rollcall::errors::AppError;
use rollcall::models::absence::RequestStatus;
use rollcall::models::announcement::Audience;
use rollcall::models::attendance::AttendanceStatus;
use rollcall::models::issue::IssueStatus;
use rollcall::utils::date::MAX_REQUEST_DAYS;

mod common;
use common::{second_school, world};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn draft(student_id: i64, status: AttendanceStatus, comment: Option<&str>) -> DraftRecord {
    DraftRecord {
        student_id,
        status,
        comment: comment.map(str::to_string),
    }
}

// ---------------------------
// Marking
// ---------------------------

#[test]
fn test_flush_saves_every_draft_and_overwrites_previous_marks() {
    let w = world();
    let conn = &w.pool.conn;
    let [ada, ben, cleo] = [&w.students[0], &w.students[1], &w.students[2]];

    upsert_record(conn, ben.id, w.class.id, day(5), AttendanceStatus::Present, None, None).unwrap();

    let report = flush_drafts(
        conn,
        w.class.id,
        day(5),
        w.teacher.id,
        &[
            draft(ada.id, AttendanceStatus::Present, None),
            draft(ben.id, AttendanceStatus::Absent, Some("flu")),
            draft(cleo.id, AttendanceStatus::Late, None),
        ],
    );
    assert!(report.is_complete());
    assert_eq!(report.saved, 3);

    let records = records_for_day(conn, w.class.id, day(5)).unwrap();
    assert_eq!(records.len(), 3);
    let ben_record = records.iter().find(|r| r.student_id == ben.id).unwrap();
    assert_eq!(ben_record.status, AttendanceStatus::Absent);
    assert_eq!(ben_record.notes.as_deref(), Some("flu"));
    assert!(records.iter().all(|r| r.marked_by == Some(w.teacher.id)));
}

#[test]
fn test_flush_reports_failed_rows_and_keeps_going() {
    let w = world();
    let conn = &w.pool.conn;

    let report = flush_drafts(
        conn,
        w.class.id,
        day(5),
        w.teacher.id,
        &[
            draft(9999, AttendanceStatus::Present, None),
            draft(w.students[0].id, AttendanceStatus::Present, None),
        ],
    );
    assert!(!report.is_complete());
    assert_eq!(report.saved, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, 9999);
}

#[test]
fn test_list_records_filters_by_window_and_status() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = &w.students[0];
    for (d, status) in [
        (1, AttendanceStatus::Present),
        (2, AttendanceStatus::Absent),
        (3, AttendanceStatus::Present),
        (9, AttendanceStatus::Late),
    ] {
        upsert_record(conn, ada.id, w.class.id, day(d), status, None, None).unwrap();
    }

    let window = list_records(
        conn,
        &RecordFilter {
            student_id: Some(ada.id),
            from: Some(day(2)),
            to: Some(day(3)),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(window.iter().map(|r| r.date).collect::<Vec<_>>(), vec![day(2), day(3)]);

    let present = list_records(
        conn,
        &RecordFilter {
            student_id: Some(ada.id),
            status: Some(AttendanceStatus::Present),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(present.len(), 2);
}

// ---------------------------
// Reports
// ---------------------------

#[test]
fn test_rate_counts_late_as_attended_and_excused_in_total() {
    let counts = StatusCounts {
        present: 1,
        absent: 0,
        late: 1,
        excused: 1,
    };
    assert_eq!(counts.total(), 3);
    assert_eq!(counts.rate(), 66.7);
    assert_eq!(StatusCounts::default().rate(), 0.0);
}

#[test]
fn test_class_report_flags_low_attendance_only_with_records() {
    let w = world();
    let conn = &w.pool.conn;
    let [ada, ben] = [&w.students[0], &w.students[1]];
    for d in 1..=4 {
        upsert_record(conn, ada.id, w.class.id, day(d), AttendanceStatus::Present, None, None).unwrap();
        let ben_status = if d == 1 {
            AttendanceStatus::Present
        } else {
            AttendanceStatus::Absent
        };
        upsert_record(conn, ben.id, w.class.id, day(d), ben_status, None, None).unwrap();
    }

    let report = class_report(conn, &w.teacher, w.class.id, Period::default(), 75.0).unwrap();
    assert_eq!(report.totals.total(), 8);
    assert_eq!(report.totals.rate(), 62.5);

    let line = |id: i64| report.students.iter().find(|s| s.student_id == id).unwrap();
    assert_eq!(line(ada.id).rate, 100.0);
    assert!(!line(ada.id).low);
    assert_eq!(line(ben.id).rate, 25.0);
    assert!(line(ben.id).low);
    let cleo = line(w.students[2].id);
    assert_eq!(cleo.counts.total(), 0);
    assert!(!cleo.low);
}

#[test]
fn test_reports_respect_period_and_access() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = &w.students[0];
    upsert_record(conn, ada.id, w.class.id, day(1), AttendanceStatus::Absent, None, None).unwrap();
    upsert_record(conn, ada.id, w.class.id, day(20), AttendanceStatus::Present, None, None).unwrap();

    let period = Period {
        from: Some(day(15)),
        to: Some(day(31)),
    };
    let (_, records, counts) = student_report(conn, &w.parent, ada.id, period).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(counts.rate(), 100.0);

    let err = student_report(conn, &w.parent, w.students[1].id, period).unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = class_report(conn, &w.parent, w.class.id, period, 75.0).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let school = school_report(conn, &w.admin, None, Period::default()).unwrap();
    assert_eq!(school.totals.total(), 2);
    assert_eq!(school.classes.len(), 1);
}

// ---------------------------
// Tenancy
// ---------------------------

#[test]
fn test_other_school_rows_look_missing() {
    let w = world();
    let conn = &w.pool.conn;
    let (river_admin, river_class) = second_school(&w);

    assert!(matches!(
        tenancy::load_class(conn, &river_admin, w.class.id).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        tenancy::load_student(conn, &river_admin, w.students[0].id).unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(tenancy::load_class(conn, &w.ministry, river_class.id).is_ok());

    let visible: Vec<i64> = directory::classes_for(conn, &w.admin).unwrap().iter().map(|c| c.id).collect();
    assert_eq!(visible, vec![w.class.id]);
}

#[test]
fn test_teacher_must_teach_the_class_to_mark() {
    let w = world();
    let conn = &w.pool.conn;
    let other = directory::add_class(conn, &w.admin, "5B", None, None).unwrap();

    assert!(tenancy::ensure_can_mark(conn, &w.teacher, &w.class).is_ok());
    assert!(matches!(
        tenancy::ensure_can_mark(conn, &w.teacher, &other).unwrap_err(),
        AppError::Forbidden(_)
    ));
    assert!(tenancy::ensure_can_mark(conn, &w.admin, &other).is_ok());
    assert!(tenancy::ensure_can_mark(conn, &w.parent, &w.class).is_err());
}

// ---------------------------
// Absence and leave
// ---------------------------

#[test]
fn test_approved_absence_excuses_every_day_and_notifies() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = &w.students[0];
    upsert_record(conn, ada.id, w.class.id, day(6), AttendanceStatus::Absent, None, None).unwrap();

    let request = absence::submit(conn, &w.parent, ada.id, day(5), day(7), "dentist").unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(notify::unread_count(conn, w.teacher.id).unwrap(), 1);

    let (reviewed, days) = absence::review(conn, &w.teacher, request.id, true, Some("get well")).unwrap();
    assert_eq!(reviewed.status, RequestStatus::Approved);
    assert_eq!(days, 3);

    let records = list_records(
        conn,
        &RecordFilter {
            student_id: Some(ada.id),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.status == AttendanceStatus::Excused));
    assert!(records.iter().all(|r| r.notes.as_deref() == Some("dentist")));

    let inbox = notify::inbox(conn, w.parent.id, true).unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].message.contains("approved"));

    let err = absence::review(conn, &w.teacher, request.id, false, None).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_rejected_absence_writes_nothing() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = &w.students[0];
    let request = absence::submit(conn, &w.parent, ada.id, day(5), day(5), "trip").unwrap();

    let (reviewed, days) = absence::review(conn, &w.admin, request.id, false, None).unwrap();
    assert_eq!(reviewed.status, RequestStatus::Rejected);
    assert_eq!(days, 0);
    assert!(records_for_day(conn, w.class.id, day(5)).unwrap().is_empty());
}

#[test]
fn test_parent_only_requests_for_own_child() {
    let w = world();
    let conn = &w.pool.conn;
    let err = absence::submit(conn, &w.parent, w.students[1].id, day(5), day(5), "x").unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = absence::submit(conn, &w.parent, w.students[0].id, day(7), day(5), "x").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = absence::submit(conn, &w.teacher, w.students[0].id, day(5), day(5), "x").unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[test]
fn test_request_ranges_are_capped_at_one_term() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = w.students[0].id;
    let far = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    let err = absence::submit(conn, &w.parent, ada, far(1, 1, 1), far(9999, 12, 31), "x").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // 2026-10-01 ..= 2027-01-28 is exactly the limit
    assert_eq!(MAX_REQUEST_DAYS, 120);
    assert!(absence::submit(conn, &w.parent, ada, day(1), far(2027, 1, 28), "long stay").is_ok());
    let err = absence::submit(conn, &w.parent, ada, day(1), far(2027, 1, 29), "x").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = leave::submit(conn, &w.teacher, day(1), far(2030, 1, 1), "sabbatical").unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(notify::unread_count(conn, w.admin.id).unwrap(), 0);
}

#[test]
fn test_leave_request_round_trip() {
    let w = world();
    let conn = &w.pool.conn;
    let request = leave::submit(conn, &w.teacher, day(12), day(14), "conference").unwrap();
    assert_eq!(notify::unread_count(conn, w.admin.id).unwrap(), 1);

    let pending = leave::visible_to(conn, &w.admin, Some(RequestStatus::Pending)).unwrap();
    assert_eq!(pending.len(), 1);

    let reviewed = leave::review(conn, &w.admin, request.id, true).unwrap();
    assert_eq!(reviewed.status, RequestStatus::Approved);
    assert_eq!(notify::unread_count(conn, w.teacher.id).unwrap(), 1);
    assert!(leave::review(conn, &w.admin, request.id, false).is_err());
}

// ---------------------------
// Announcements, notifications, issues
// ---------------------------

#[test]
fn test_announcement_fans_out_to_matching_roles() {
    let w = world();
    let conn = &w.pool.conn;

    let (_, report) = announce::create(conn, &w.admin, "Trip", "Museum on Friday", Audience::Parents, None).unwrap();
    assert_eq!(report.delivered, 1);
    assert!(report.failed.is_empty());
    assert_eq!(notify::unread_count(conn, w.parent.id).unwrap(), 1);
    assert_eq!(notify::unread_count(conn, w.teacher.id).unwrap(), 0);

    let (_, report) = announce::create(conn, &w.admin, "Closed", "Holiday", Audience::All, None).unwrap();
    // teacher, parent and pupil; the author is skipped
    assert_eq!(report.delivered, 3);

    assert_eq!(announce::visible_to(conn, &w.teacher).unwrap().len(), 1);
    assert_eq!(announce::visible_to(conn, &w.parent).unwrap().len(), 2);
}

#[test]
fn test_ministry_announcement_reaches_every_school() {
    let w = world();
    let conn = &w.pool.conn;
    let (river_admin, _) = second_school(&w);

    let (a, report) = announce::create(conn, &w.ministry, "Audit", "Send reports", Audience::Admins, None).unwrap();
    assert_eq!(a.school_id, None);
    assert_eq!(report.delivered, 2);
    assert_eq!(notify::unread_count(conn, river_admin.id).unwrap(), 1);

    assert!(announce::create(conn, &w.teacher, "x", "y", Audience::All, None).is_err());
}

#[test]
fn test_notifications_read_only_by_recipient() {
    let w = world();
    let conn = &w.pool.conn;
    let id = notify::notify(conn, w.parent.id, "announcement", "Hello", "World").unwrap();
    notify::notify(conn, w.parent.id, "announcement", "Again", "World").unwrap();

    assert!(matches!(
        notify::mark_read(conn, w.teacher.id, id).unwrap_err(),
        AppError::NotFound(_)
    ));
    notify::mark_read(conn, w.parent.id, id).unwrap();
    assert_eq!(notify::unread_count(conn, w.parent.id).unwrap(), 1);
    assert_eq!(notify::mark_all_read(conn, w.parent.id).unwrap(), 1);
    assert_eq!(notify::inbox(conn, w.parent.id, true).unwrap().len(), 0);
    assert_eq!(notify::inbox(conn, w.parent.id, false).unwrap().len(), 2);
}

#[test]
fn test_issue_status_change_notifies_reporter() {
    let w = world();
    let conn = &w.pool.conn;
    let issue = issues::report(conn, &w.teacher, "Projector broken", "Room 12").unwrap();
    assert_eq!(issue.school_id, w.admin.school_id);

    assert_eq!(issues::visible_to(conn, &w.admin, Some(IssueStatus::Open)).unwrap().len(), 1);
    assert!(issues::update_status(conn, &w.teacher, issue.id, IssueStatus::Resolved).is_err());

    let updated = issues::update_status(conn, &w.admin, issue.id, IssueStatus::InProgress).unwrap();
    assert_eq!(updated.status, IssueStatus::InProgress);
    assert_eq!(notify::unread_count(conn, w.teacher.id).unwrap(), 1);
}

// ---------------------------
// Timetable and notes
// ---------------------------

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_lesson_slot_lets_teacher_mark_and_blocks_overlaps() {
    let w = world();
    let conn = &w.pool.conn;
    let other = directory::add_class(conn, &w.admin, "5B", None, None).unwrap();
    let maths = add_subject(conn, &w.admin, "Mathematics", "math").unwrap();
    assert_eq!(maths.code, "MATH");
    assert!(add_subject(conn, &w.admin, "Maths again", "MATH").is_err());

    let slot = |start: NaiveTime, end: NaiveTime| NewSlot {
        subject_id: maths.id,
        class_id: other.id,
        teacher_id: w.teacher.id,
        weekday: Weekday::Mon,
        start,
        end,
    };
    add_schedule(conn, &w.admin, slot(at(8, 0), at(9, 0))).unwrap();
    assert!(tenancy::ensure_can_mark(conn, &w.teacher, &other).is_ok());

    let clash = add_schedule(conn, &w.admin, slot(at(8, 30), at(9, 30))).unwrap_err();
    assert!(matches!(clash, AppError::Validation(_)));
    assert!(add_schedule(conn, &w.admin, slot(at(10, 0), at(9, 0))).is_err());
    add_schedule(conn, &w.admin, slot(at(9, 0), at(10, 0))).unwrap();

    let monday = schedule_for(conn, &w.teacher, None, Some(Weekday::Mon)).unwrap();
    assert_eq!(monday.iter().map(|s| s.start_time).collect::<Vec<_>>(), vec![at(8, 0), at(9, 0)]);
    assert!(schedule_for(conn, &w.teacher, None, Some(Weekday::Tue)).unwrap().is_empty());
}

#[test]
fn test_notes_are_written_by_staff_and_read_by_family() {
    let w = world();
    let conn = &w.pool.conn;
    let ada = &w.students[0];

    notes::add(conn, &w.teacher, ada.id, "  Great progress in reading ").unwrap();
    assert!(notes::add(conn, &w.parent, ada.id, "hello").is_err());
    assert!(notes::add(conn, &w.teacher, ada.id, "   ").is_err());

    let seen = notes::for_student(conn, &w.parent, ada.id).unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].note, "Great progress in reading");
    assert!(notes::for_student(conn, &w.parent, w.students[1].id).is_err());
}

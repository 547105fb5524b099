use serde::Serialize;

/// One attendance record joined with the names a reader needs.
#[derive(Serialize, Clone, Debug)]
pub struct AttendanceExport {
    #[serde(skip)]
    pub class_id: i64,
    pub date: String,
    pub school: String,
    pub class: String,
    pub student: String,
    pub student_number: String,
    pub status: String,
    pub check_in_time: String,
    pub notes: String,
    pub marked_by: String,
}

pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "date",
        "school",
        "class",
        "student",
        "student_number",
        "status",
        "check_in_time",
        "notes",
        "marked_by",
    ]
}

pub(crate) fn record_to_row(r: &AttendanceExport) -> Vec<String> {
    vec![
        r.date.clone(),
        r.school.clone(),
        r.class.clone(),
        r.student.clone(),
        r.student_number.clone(),
        r.status.clone(),
        r.check_in_time.clone(),
        r.notes.clone(),
        r.marked_by.clone(),
    ]
}

pub(crate) fn records_to_table(records: &[AttendanceExport]) -> Vec<Vec<String>> {
    records.iter().map(record_to_row).collect()
}

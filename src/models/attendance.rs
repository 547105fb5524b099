use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::Excused => "excused",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            "excused" => Some(AttendanceStatus::Excused),
            _ => None,
        }
    }

    /// Accepts the full word or its first letter, any case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "p" => Some(AttendanceStatus::Present),
            "a" => Some(AttendanceStatus::Absent),
            "l" => Some(AttendanceStatus::Late),
            "e" => Some(AttendanceStatus::Excused),
            other => AttendanceStatus::from_db_str(other),
        }
    }

    /// Present and late both count as attended.
    pub fn is_attended(&self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    pub date: NaiveDate,                 // ⇔ attendance.date (TEXT "YYYY-MM-DD")
    pub status: AttendanceStatus,        // ⇔ attendance.status
    pub check_in_time: Option<NaiveTime>, // ⇔ attendance.check_in_time (TEXT "HH:MM:SS")
    pub notes: Option<String>,
    pub marked_by: Option<i64>,
}

impl AttendanceRecord {
    pub fn new(
        student_id: i64,
        class_id: i64,
        date: NaiveDate,
        status: AttendanceStatus,
        marked_by: Option<i64>,
    ) -> Self {
        Self {
            id: 0,
            student_id,
            class_id,
            date,
            status,
            check_in_time: None,
            notes: None,
            marked_by,
        }
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

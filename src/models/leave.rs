use super::absence::RequestStatus;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TeacherLeaveRequest {
    pub id: i64,
    pub teacher_id: i64,
    pub school_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: RequestStatus,
    pub reviewed_by: Option<i64>,
    pub created_at: String,
}

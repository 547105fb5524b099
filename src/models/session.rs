use chrono::{DateTime, Local};
use serde::Serialize;

/// A teacher-opened check-in window for one class.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSession {
    pub id: i64,
    pub class_id: i64,
    pub session_code: String,
    pub expires_at: DateTime<Local>,
    pub is_active: bool,
    pub created_by: i64,
    pub created_at: String,
}

impl AttendanceSession {
    /// Active and not yet expired at `now`.
    pub fn is_open(&self, now: DateTime<Local>) -> bool {
        self.is_active && self.expires_at > now
    }

    pub fn minutes_left(&self, now: DateTime<Local>) -> i64 {
        (self.expires_at - now).num_minutes().max(0)
    }
}

use serde::Serialize;

/// A roster entry. `parent_id` and `profile_id` link the row to the
/// parent and student accounts that may act on it.
#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: i64,
    pub class_id: i64,
    pub full_name: String,
    pub student_id_number: Option<String>,
    pub email: Option<String>,
    pub parent_id: Option<i64>,
    pub profile_id: Option<i64>,
}

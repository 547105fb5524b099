use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct StudentNote {
    pub id: i64,
    pub student_id: i64,
    pub author_id: i64,
    pub note: String,
    pub created_at: String,
}

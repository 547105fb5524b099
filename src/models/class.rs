use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub id: i64,
    pub school_id: i64,
    pub name: String,
    pub grade: Option<String>,
    pub teacher_id: Option<i64>,
}

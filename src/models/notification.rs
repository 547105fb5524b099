use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    pub title: String,
    pub message: String,
    pub kind: String, // announcement | absence | leave | issue
    pub is_read: bool,
    pub created_at: String,
}

impl Notification {
    pub fn new(recipient_id: i64, kind: &str, title: &str, message: &str) -> Self {
        Self {
            id: 0,
            recipient_id,
            title: title.to_string(),
            message: message.to_string(),
            kind: kind.to_string(),
            is_read: false,
            created_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

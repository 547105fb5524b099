use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub region: Option<String>,
    pub created_at: String,
}

impl School {
    pub fn new(name: &str, code: &str, region: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.trim().to_string(),
            code: code.trim().to_uppercase(),
            region,
            created_at: chrono::Local::now().to_rfc3339(),
        }
    }
}

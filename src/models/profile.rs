use super::role::Role;
use serde::Serialize;

/// A signed-up user. Credentials never leave the db layer in output.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub school_id: Option<i64>,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: String,
}

impl Profile {
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

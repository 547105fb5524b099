use serde::Serialize;
use std::fmt;

/// Who a profile is; drives navigation and command guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ministry,
    Admin,
    Teacher,
    Parent,
    Student,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Ministry,
        Role::Admin,
        Role::Teacher,
        Role::Parent,
        Role::Student,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Ministry => "ministry",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ministry" => Some(Role::Ministry),
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "parent" => Some(Role::Parent),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Helper: parse user input (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Role::from_db_str(&code.trim().to_lowercase())
    }

    /// Every role except the ministry is attached to a school.
    pub fn needs_school(&self) -> bool {
        !matches!(self, Role::Ministry)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Ministry => "Ministry",
            Role::Admin => "School administrator",
            Role::Teacher => "Teacher",
            Role::Parent => "Parent",
            Role::Student => "Student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

use super::role::Role;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Admins,
    Teachers,
    Parents,
    Students,
}

impl Audience {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Admins => "admins",
            Audience::Teachers => "teachers",
            Audience::Parents => "parents",
            Audience::Students => "students",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Audience::All),
            "admins" => Some(Audience::Admins),
            "teachers" => Some(Audience::Teachers),
            "parents" => Some(Audience::Parents),
            "students" => Some(Audience::Students),
            _ => None,
        }
    }

    /// Ministry accounts are never recipients.
    pub fn includes(&self, role: Role) -> bool {
        match self {
            Audience::All => role != Role::Ministry,
            Audience::Admins => role == Role::Admin,
            Audience::Teachers => role == Role::Teacher,
            Audience::Parents => role == Role::Parent,
            Audience::Students => role == Role::Student,
        }
    }
}

/// `school_id = None` means a ministry-wide announcement.
#[derive(Debug, Clone, Serialize)]
pub struct Announcement {
    pub id: i64,
    pub school_id: Option<i64>,
    pub author_id: i64,
    pub title: String,
    pub body: String,
    pub audience: Audience,
    pub created_at: String,
}

pub mod absence;
pub mod announce;
pub mod auth;
pub mod backup;
pub mod checkin;
pub mod directory;
pub mod issues;
pub mod leave;
pub mod log;
pub mod marking;
pub mod navigation;
pub mod notes;
pub mod notify;
pub mod stats;
pub mod tenancy;
pub mod timetable;
pub mod walker;

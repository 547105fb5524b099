pub mod absence;
pub mod announcement;
pub mod attendance;
pub mod class;
pub mod issue;
pub mod leave;
pub mod note;
pub mod notification;
pub mod profile;
pub mod role;
pub mod school;
pub mod session;
pub mod student;
pub mod subject;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use profile::Profile;
pub use role::Role;

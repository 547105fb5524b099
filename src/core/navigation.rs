use crate::models::role::Role;

/// One entry of the role home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub command: &'static str,
    pub description: &'static str,
}

const fn entry(command: &'static str, description: &'static str) -> MenuEntry {
    MenuEntry {
        command,
        description,
    }
}

const COMMON: &[MenuEntry] = &[
    entry("announce list", "Read announcements"),
    entry("notify list", "Your notifications"),
    entry("issue report", "Report a problem"),
];

const MINISTRY: &[MenuEntry] = &[
    entry("school add", "Register a school"),
    entry("school list", "All schools"),
    entry("auth signup", "Open an administrator account"),
    entry("report ministry", "Attendance across schools"),
    entry("announce create", "Announce to one or every school"),
    entry("issue list", "Issues from every school"),
];

const ADMIN: &[MenuEntry] = &[
    entry("auth signup", "Open a teacher account"),
    entry("class add", "Create a class"),
    entry("student add", "Enrol a student"),
    entry("user list", "Staff, parents and students"),
    entry("subject add", "Create a subject"),
    entry("schedule add", "Add a lesson slot"),
    entry("leave list", "Teacher leave requests"),
    entry("absence list", "Absence requests"),
    entry("report school", "School attendance"),
    entry("announce create", "Announce to the school"),
    entry("export", "Export attendance"),
];

const TEACHER: &[MenuEntry] = &[
    entry("schedule today", "Today's lessons"),
    entry("attendance mark", "Walk a class roster"),
    entry("session open", "Open a check-in code"),
    entry("absence list", "Absence requests for your classes"),
    entry("report class", "Class attendance"),
    entry("note add", "Note on a student"),
    entry("leave submit", "Request leave"),
];

const PARENT: &[MenuEntry] = &[
    entry("student list", "Your children"),
    entry("report student", "A child's attendance"),
    entry("absence submit", "Request an excused absence"),
    entry("absence list", "Your requests"),
];

const STUDENT: &[MenuEntry] = &[
    entry("checkin", "Check in with the class code"),
    entry("report student", "Your attendance"),
    entry("schedule list", "Your timetable"),
];

/// Menu for a role: role-specific entries first, then the shared ones.
pub fn menu_for(role: Role) -> Vec<MenuEntry> {
    let own = match role {
        Role::Ministry => MINISTRY,
        Role::Admin => ADMIN,
        Role::Teacher => TEACHER,
        Role::Parent => PARENT,
        Role::Student => STUDENT,
    };
    own.iter().chain(COMMON).copied().collect()
}

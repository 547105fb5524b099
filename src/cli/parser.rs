use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for rollcall
/// Multi-tenant school attendance backed by SQLite
#[derive(Parser)]
#[command(
    name = "rollcall",
    version = env!("CARGO_PKG_VERSION"),
    about = "A school attendance CLI: roster walk-through marking, check-in codes, absence and leave workflows, using SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing configuration fields with defaults")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, help = "Only the newest N rows")]
        limit: Option<usize>,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f', help = "Overwrite without asking")]
        force: bool,
    },

    /// Export attendance records
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE", help = "Absolute output path")]
        file: String,

        #[arg(
            long,
            value_name = "RANGE",
            help = "all, YYYY, YYYY-MM, YYYY-MM-DD or FROM:TO"
        )]
        range: Option<String>,

        #[arg(long = "class", help = "Only this class")]
        class_id: Option<i64>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Show what the signed-in user can do
    Home,

    /// Sign up, sign in and out
    Auth {
        #[command(subcommand)]
        action: AuthCmd,
    },

    /// Schools (ministry)
    School {
        #[command(subcommand)]
        action: SchoolCmd,
    },

    /// Classes of the school
    Class {
        #[command(subcommand)]
        action: ClassCmd,
    },

    /// Enrolled students
    Student {
        #[command(subcommand)]
        action: StudentCmd,
    },

    /// Profiles of the school
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Subjects taught at the school
    Subject {
        #[command(subcommand)]
        action: SubjectCmd,
    },

    /// Weekly lesson slots
    Schedule {
        #[command(subcommand)]
        action: ScheduleCmd,
    },

    /// Mark and list attendance
    Attendance {
        #[command(subcommand)]
        action: AttendanceCmd,
    },

    /// Check-in code sessions (teachers)
    Session {
        #[command(subcommand)]
        action: SessionCmd,
    },

    /// Check in with the code shown by the teacher
    Checkin {
        #[arg(long)]
        code: String,
    },

    /// Parent absence requests
    Absence {
        #[command(subcommand)]
        action: AbsenceCmd,
    },

    /// Teacher leave requests
    Leave {
        #[command(subcommand)]
        action: LeaveCmd,
    },

    /// School and ministry announcements
    Announce {
        #[command(subcommand)]
        action: AnnounceCmd,
    },

    /// Your notifications
    Notify {
        #[command(subcommand)]
        action: NotifyCmd,
    },

    /// Reported problems
    Issue {
        #[command(subcommand)]
        action: IssueCmd,
    },

    /// Notes on students
    Note {
        #[command(subcommand)]
        action: NoteCmd,
    },

    /// Attendance reports
    Report {
        #[command(subcommand)]
        action: ReportCmd,
    },
}

#[derive(Subcommand)]
pub enum AuthCmd {
    /// Create an account. Parents and students sign up (and in) themselves;
    /// a signed-in ministry or admin user opens staff accounts.
    Signup {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        #[arg(long)]
        password: String,

        #[arg(long, help = "ministry, admin, teacher, parent or student")]
        role: String,

        #[arg(
            long = "school",
            help = "School code (every role but ministry; defaults to an admin's own school)"
        )]
        school_code: Option<String>,
    },

    Signin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    Signout,

    /// Who is signed in
    Whoami,
}

#[derive(Subcommand)]
pub enum SchoolCmd {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        code: String,

        #[arg(long)]
        region: Option<String>,
    },

    List,

    /// Counts of classes, students and staff
    Show { id: i64 },
}

#[derive(Subcommand)]
pub enum ClassCmd {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        grade: Option<String>,

        #[arg(long = "teacher", help = "Class teacher profile id")]
        teacher_id: Option<i64>,
    },

    List,

    Roster { id: i64 },

    /// Make a teacher the class teacher
    Assign {
        id: i64,

        #[arg(long = "teacher")]
        teacher_id: i64,
    },
}

#[derive(Subcommand)]
pub enum StudentCmd {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long = "class")]
        class_id: i64,

        #[arg(long = "number", help = "School student number")]
        number: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long = "parent", help = "Parent profile id")]
        parent_id: Option<i64>,

        #[arg(long = "profile", help = "Student profile id")]
        profile_id: Option<i64>,
    },

    Update {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long = "class")]
        class_id: Option<i64>,

        #[arg(long = "number")]
        number: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long = "parent")]
        parent_id: Option<i64>,

        #[arg(long = "profile")]
        profile_id: Option<i64>,
    },

    Del { id: i64 },

    List {
        #[arg(long = "class")]
        class_id: Option<i64>,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    List {
        #[arg(long)]
        role: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SubjectCmd {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        code: String,
    },

    List,
}

#[derive(Subcommand)]
pub enum ScheduleCmd {
    Add {
        #[arg(long = "subject")]
        subject_id: i64,

        #[arg(long = "class")]
        class_id: i64,

        #[arg(long = "teacher")]
        teacher_id: i64,

        #[arg(long, help = "mon..sun or 1..7")]
        day: String,

        #[arg(long, help = "Start time (HH:MM)")]
        start: String,

        #[arg(long, help = "End time (HH:MM)")]
        end: String,
    },

    List {
        #[arg(long = "class")]
        class_id: Option<i64>,

        #[arg(long)]
        day: Option<String>,
    },

    /// Today's lessons
    Today,
}

#[derive(Subcommand)]
pub enum AttendanceCmd {
    /// Walk the class roster one student at a time
    Mark {
        #[arg(long = "class")]
        class_id: i64,

        #[arg(long, help = "Date (YYYY-MM-DD), default today")]
        date: Option<String>,
    },

    /// Set one student's status directly
    Set {
        #[arg(long = "student")]
        student_id: i64,

        #[arg(long, help = "present, absent, late, excused (or p/a/l/e)")]
        status: String,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    List {
        #[arg(long = "class", conflicts_with = "student_id")]
        class_id: Option<i64>,

        #[arg(long = "student")]
        student_id: Option<i64>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long, help = "YYYY, YYYY-MM, YYYY-MM-DD or FROM:TO")]
        range: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Open a check-in session and show its code
    Open {
        #[arg(long = "class")]
        class_id: i64,

        #[arg(long, help = "Minutes the code stays valid")]
        minutes: Option<i64>,

        #[arg(long, help = "Use this code instead of a random one")]
        code: Option<String>,
    },

    Close {
        #[arg(long = "class")]
        class_id: i64,
    },

    Show {
        #[arg(long = "class")]
        class_id: i64,
    },
}

#[derive(Subcommand)]
pub enum AbsenceCmd {
    Submit {
        #[arg(long = "student")]
        student_id: i64,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        reason: String,
    },

    List {
        #[arg(long, help = "pending, approved or rejected")]
        status: Option<String>,
    },

    Review {
        id: i64,

        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,

        #[arg(long)]
        reject: bool,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LeaveCmd {
    Submit {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        reason: String,
    },

    List {
        #[arg(long)]
        status: Option<String>,
    },

    Review {
        id: i64,

        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,

        #[arg(long)]
        reject: bool,
    },
}

#[derive(Subcommand)]
pub enum AnnounceCmd {
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,

        #[arg(long, default_value = "all", help = "all, admins, teachers, parents or students")]
        audience: String,

        #[arg(long = "school", help = "Target school id (ministry only; default every school)")]
        school_id: Option<i64>,
    },

    List,
}

#[derive(Subcommand)]
pub enum NotifyCmd {
    List {
        #[arg(long)]
        unread: bool,
    },

    /// Mark one notification (or all) as read
    Read {
        #[arg(required_unless_present = "all")]
        id: Option<i64>,

        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum IssueCmd {
    Report {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    List {
        #[arg(long)]
        status: Option<String>,
    },

    Update {
        id: i64,

        #[arg(long, help = "open, in_progress or resolved")]
        status: String,
    },
}

#[derive(Subcommand)]
pub enum NoteCmd {
    Add {
        #[arg(long = "student")]
        student_id: i64,

        #[arg(long)]
        text: String,
    },

    List {
        #[arg(long = "student")]
        student_id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCmd {
    Student {
        id: Option<i64>,

        #[arg(long)]
        range: Option<String>,
    },

    Class {
        id: i64,

        #[arg(long)]
        range: Option<String>,
    },

    School {
        id: Option<i64>,

        #[arg(long)]
        range: Option<String>,
    },

    Ministry {
        #[arg(long)]
        range: Option<String>,
    },
}

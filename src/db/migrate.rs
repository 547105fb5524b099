use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use rusqlite::{Connection, OptionalExtension};

/// One schema step. Applied steps are recorded in the `log` table as
/// `migration_applied` with the version as target.
struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20260901_0001_tenancy",
        description: "schools, profiles and auth sessions",
        sql: r#"
        CREATE TABLE IF NOT EXISTS schools (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            code        TEXT NOT NULL UNIQUE,
            region      TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            email          TEXT NOT NULL UNIQUE,
            full_name      TEXT NOT NULL,
            role           TEXT NOT NULL CHECK (role IN ('ministry','admin','teacher','parent','student')),
            school_id      INTEGER REFERENCES schools(id),
            password_salt  TEXT NOT NULL,
            password_hash  TEXT NOT NULL,
            created_at     TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_profiles_school_role ON profiles(school_id, role);

        CREATE TABLE IF NOT EXISTS auth_sessions (
            token       TEXT PRIMARY KEY,
            profile_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20260901_0002_classes_roster",
        description: "classes, students, subjects and schedules",
        sql: r#"
        CREATE TABLE IF NOT EXISTS classes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            school_id   INTEGER NOT NULL REFERENCES schools(id),
            name        TEXT NOT NULL,
            grade       TEXT,
            teacher_id  INTEGER REFERENCES profiles(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_classes_school ON classes(school_id);

        CREATE TABLE IF NOT EXISTS students (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id           INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            full_name          TEXT NOT NULL,
            student_id_number  TEXT,
            email              TEXT,
            parent_id          INTEGER REFERENCES profiles(id) ON DELETE SET NULL,
            profile_id         INTEGER REFERENCES profiles(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id);
        CREATE INDEX IF NOT EXISTS idx_students_parent ON students(parent_id);

        CREATE TABLE IF NOT EXISTS subjects (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            school_id  INTEGER NOT NULL REFERENCES schools(id),
            name       TEXT NOT NULL,
            code       TEXT NOT NULL,
            UNIQUE (school_id, code)
        );

        CREATE TABLE IF NOT EXISTS subject_schedules (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            subject_id  INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            class_id    INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            teacher_id  INTEGER NOT NULL REFERENCES profiles(id),
            weekday     INTEGER NOT NULL CHECK (weekday BETWEEN 1 AND 7),
            start_time  TEXT NOT NULL,
            end_time    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_schedules_class ON subject_schedules(class_id, weekday);
        "#,
    },
    Migration {
        version: "20260901_0003_attendance",
        description: "attendance records and check-in sessions",
        sql: r#"
        CREATE TABLE IF NOT EXISTS attendance (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id     INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            class_id       INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            date           TEXT NOT NULL,          -- YYYY-MM-DD
            status         TEXT NOT NULL CHECK (status IN ('present','absent','late','excused')),
            check_in_time  TEXT,                   -- HH:MM:SS
            notes          TEXT,
            marked_by      INTEGER REFERENCES profiles(id) ON DELETE SET NULL
        );
        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_student_class_date
            ON attendance(student_id, class_id, date);
        CREATE INDEX IF NOT EXISTS idx_attendance_class_date ON attendance(class_id, date);

        CREATE TABLE IF NOT EXISTS attendance_sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id      INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
            session_code  TEXT NOT NULL,
            expires_at    TEXT NOT NULL,           -- RFC 3339
            is_active     INTEGER NOT NULL DEFAULT 1,
            created_by    INTEGER NOT NULL REFERENCES profiles(id),
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_code ON attendance_sessions(session_code, is_active);
        "#,
    },
    Migration {
        version: "20260915_0004_workflows",
        description: "absence, leave, issues and student notes",
        sql: r#"
        CREATE TABLE IF NOT EXISTS absence_requests (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id   INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            parent_id    INTEGER NOT NULL REFERENCES profiles(id),
            start_date   TEXT NOT NULL,
            end_date     TEXT NOT NULL,
            reason       TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending','approved','rejected')),
            reviewed_by  INTEGER REFERENCES profiles(id),
            review_note  TEXT,
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teacher_leave_requests (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            teacher_id   INTEGER NOT NULL REFERENCES profiles(id),
            school_id    INTEGER NOT NULL REFERENCES schools(id),
            start_date   TEXT NOT NULL,
            end_date     TEXT NOT NULL,
            reason       TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending','approved','rejected')),
            reviewed_by  INTEGER REFERENCES profiles(id),
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS issues (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            school_id    INTEGER REFERENCES schools(id),
            reporter_id  INTEGER NOT NULL REFERENCES profiles(id),
            title        TEXT NOT NULL,
            description  TEXT NOT NULL,
            status       TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open','in_progress','resolved')),
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS student_notes (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id  INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
            author_id   INTEGER NOT NULL REFERENCES profiles(id),
            note        TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20261001_0005_messaging",
        description: "announcements and notifications",
        sql: r#"
        CREATE TABLE IF NOT EXISTS announcements (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            school_id   INTEGER REFERENCES schools(id),
            author_id   INTEGER NOT NULL REFERENCES profiles(id),
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            audience    TEXT NOT NULL CHECK (audience IN ('all','admins','teachers','parents','students')),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            recipient_id  INTEGER NOT NULL REFERENCES profiles(id) ON DELETE CASCADE,
            title         TEXT NOT NULL,
            message       TEXT NOT NULL,
            kind          TEXT NOT NULL,
            is_read       INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_id, is_read);
        "#,
    },
    Migration {
        version: "20261020_0006_argon2_credentials",
        description: "password hashes become self-describing PHC strings",
        // SHA-256 digests written before this version no longer verify.
        sql: r#"
        ALTER TABLE profiles DROP COLUMN password_salt;
        "#,
    },
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

fn is_applied(conn: &Connection, version: &str) -> rusqlite::Result<bool> {
    let mut chk = conn.prepare_cached(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Versions already recorded, oldest first.
pub fn applied_versions(conn: &Connection) -> AppResult<Vec<String>> {
    ensure_log_table(conn)?;
    let mut stmt = conn.prepare(
        "SELECT target FROM log WHERE operation = 'migration_applied' ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        [
            chrono::Local::now().to_rfc3339().as_str(),
            m.version,
            m.description,
        ],
    )?;
    tx.commit()?;
    Ok(())
}

/// Zip the database next to itself before upgrading an existing schema.
fn backup_before_migration(db_path: &str) -> AppResult<()> {
    use chrono::Local;
    use std::fs::{self, File};
    use std::io::Write;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    let path = std::path::Path::new(db_path);
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    let backup_path = dir.join(format!(
        "{}-backup_db_pre_migration.zip",
        Local::now().format("%Y%m%d_%H%M%S")
    ));

    let file = File::create(&backup_path)?;
    let mut zip = ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("database.sqlite", options)
        .map_err(|e| AppError::Migration(format!("backup failed: {e}")))?;
    zip.write_all(&fs::read(path)?)?;
    zip.finish()
        .map_err(|e| AppError::Migration(format!("backup failed: {e}")))?;

    success(format!("📦 Backup created: {}", backup_path.display()));
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by `DbPool` whenever a database is opened.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    let mut pending = Vec::new();
    for m in MIGRATIONS {
        if !is_applied(conn, m.version)? {
            pending.push(m);
        }
    }
    if pending.is_empty() {
        return Ok(());
    }

    // An upgrade (not a fresh file) gets a safety copy first.
    let upgrading = !applied_versions(conn)?.is_empty();
    if upgrading {
        let db_path: String = conn
            .query_row("PRAGMA database_list;", [], |row| row.get::<_, String>(2))
            .unwrap_or_default();
        if db_path.is_empty() {
            warning("No file path for this database; skipping the pre-migration copy.");
        } else {
            backup_before_migration(&db_path)?;
        }
    }

    for m in pending {
        apply(conn, m)?;
        if upgrading {
            success(format!("Migration applied: {} → {}", m.version, m.description));
        }
    }

    Ok(())
}

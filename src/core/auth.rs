//! Accounts, credentials and the signed-in session.
//!
//! Passwords are stored as Argon2id PHC strings. Signing in issues a
//! random token kept in `auth_sessions`; the CLI remembers the token in a
//! small file next to the database so later commands act as that user.
//!
//! Parents and students sign themselves up. Staff accounts are created by
//! someone above them: the ministry creates admins, an admin (or the
//! ministry) creates teachers. The very first account of a database may be
//! a ministry account, which bootstraps the chain.

use crate::db::log::audit;
use crate::db::repo::{Query, Repo};
use crate::errors::{AppError, AppResult};
use crate::models::profile::Profile;
use crate::models::role::Role;
use crate::models::school::School;
use crate::utils::path::{sidecar, write_private};
use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::Local;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::PathBuf;

const MIN_PASSWORD_LEN: usize = 6;

pub struct SignUp<'a> {
    pub email: &'a str,
    pub full_name: &'a str,
    pub password: &'a str,
    pub role: Role,
    pub school_code: Option<&'a str>,
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AppError::PasswordHash(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::PasswordHash(e.to_string()))?;
    Ok(phc.to_string())
}

/// False for a wrong password and for a stored value that is not a PHC string.
pub fn verify_password(phc: &str, password: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Whether `creator` (or nobody, for a self sign-up) may open an account
/// with `role`.
fn may_create(profiles: &Repo<Profile>, role: Role, creator: Option<&Profile>) -> AppResult<bool> {
    let by = creator.map(|c| c.role);
    Ok(match role {
        Role::Parent | Role::Student => true,
        Role::Teacher => matches!(by, Some(Role::Admin | Role::Ministry)),
        Role::Admin => by == Some(Role::Ministry),
        Role::Ministry => by == Some(Role::Ministry) || profiles.count(&Query::new())? == 0,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create an account. `creator` is the signed-in staff member opening it,
/// or `None` for a self sign-up.
pub fn sign_up(conn: &Connection, form: &SignUp, creator: Option<&Profile>) -> AppResult<Profile> {
    let email = normalize_email(form.email);
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::Validation(format!("'{}' is not a valid email", form.email)));
    }
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Err(AppError::Validation("Full name is required".into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let profiles = Repo::<Profile>::new(conn);
    if !may_create(&profiles, form.role, creator)? {
        let by = match form.role {
            Role::Ministry => "an existing ministry account",
            Role::Admin => "a ministry account",
            _ => "a school administrator",
        };
        return Err(AppError::Forbidden(format!(
            "{} accounts can only be created by {}",
            form.role.label(),
            by
        )));
    }

    let school_id = if !form.role.needs_school() {
        if form.school_code.is_some() {
            return Err(AppError::Validation(
                "Ministry accounts are not attached to a school".into(),
            ));
        }
        None
    } else {
        match (form.school_code, creator) {
            (Some(code), _) => {
                let code = code.trim().to_uppercase();
                let school = Repo::<School>::new(conn)
                    .first(&Query::new().eq("code", code.clone()))?
                    .ok_or_else(|| AppError::NotFound(format!("School '{code}'")))?;
                Some(school.id)
            }
            (None, Some(admin)) if admin.is(Role::Admin) => admin.school_id,
            (None, _) => {
                return Err(AppError::Validation(format!(
                    "A {} account needs a school code (--school)",
                    form.role
                )));
            }
        }
    };
    if let Some(admin) = creator
        && admin.is(Role::Admin)
        && school_id != admin.school_id
    {
        return Err(AppError::Forbidden(
            "administrators create accounts for their own school only".into(),
        ));
    }

    if profiles.exists(&Query::new().eq("email", email.clone()))? {
        return Err(AppError::Validation(
            "An account with this email already exists".into(),
        ));
    }

    let mut profile = Profile {
        id: 0,
        password_hash: hash_password(form.password)?,
        email,
        full_name: full_name.to_string(),
        role: form.role,
        school_id,
        created_at: Local::now().to_rfc3339(),
    };
    profile.id = profiles.insert(&profile)?;

    let by = creator.map(|c| c.email.as_str()).unwrap_or("self");
    audit(
        conn,
        "signup",
        &profile.email,
        &format!("{} by {}", profile.role.to_db_str(), by),
    );
    Ok(profile)
}

/// Verify credentials and open a session. Returns the profile and token.
pub fn sign_in(conn: &Connection, email: &str, password: &str) -> AppResult<(Profile, String)> {
    let bad = || AppError::Validation("Invalid email or password".into());

    let profile = Repo::<Profile>::new(conn)
        .first(&Query::new().eq("email", normalize_email(email)))?
        .ok_or_else(bad)?;
    if !verify_password(&profile.password_hash, password) {
        return Err(bad());
    }

    let token = random_token(40);
    conn.execute(
        "INSERT INTO auth_sessions (token, profile_id, created_at) VALUES (?1, ?2, ?3)",
        params![token, profile.id, Local::now().to_rfc3339()],
    )?;
    audit(conn, "signin", &profile.email, "");
    Ok((profile, token))
}

pub fn sign_out(conn: &Connection, token: &str) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM auth_sessions WHERE token = ?1", [token])?;
    Ok(n > 0)
}

pub fn profile_for_token(conn: &Connection, token: &str) -> AppResult<Option<Profile>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT profile_id FROM auth_sessions WHERE token = ?1",
            [token],
            |row| row.get(0),
        )
        .optional()?;
    match id {
        Some(id) => Repo::<Profile>::new(conn).get(id),
        None => Ok(None),
    }
}

/// Guard for role-restricted operations.
pub fn require_role(user: &Profile, allowed: &[Role]) -> AppResult<()> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    let names: Vec<&str> = allowed.iter().map(|r| r.to_db_str()).collect();
    Err(AppError::Forbidden(format!(
        "this action requires one of: {}",
        names.join(", ")
    )))
}

// ---------------------------
// Session token file
// ---------------------------

pub fn session_file(db_path: &str) -> PathBuf {
    sidecar(db_path, "session")
}

pub fn remember_token(db_path: &str, token: &str) -> AppResult<()> {
    write_private(&session_file(db_path), token)
}

pub fn stored_token(db_path: &str) -> Option<String> {
    let path = session_file(db_path);
    if !path.exists() {
        return None;
    }
    fs::read_to_string(path)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn forget_token(db_path: &str) -> AppResult<()> {
    let path = session_file(db_path);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// The profile behind the remembered token, or `NotSignedIn`.
pub fn current_user(conn: &Connection, db_path: &str) -> AppResult<Profile> {
    let token = stored_token(db_path).ok_or(AppError::NotSignedIn)?;
    profile_for_token(conn, &token)?.ok_or(AppError::NotSignedIn)
}

use crate::cli::commands::signed_in;
use crate::cli::parser::AuthCmd;
use crate::config::Config;
use crate::core::auth::{self, SignUp};
use crate::core::navigation::menu_for;
use crate::core::notify::unread_count;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::ui::messages::{header, hint, info, success};
use crate::utils::formatting::bold;

pub fn handle(cmd: &AuthCmd, cfg: &Config) -> AppResult<()> {
    let db = &cfg.database;
    match cmd {
        AuthCmd::Signup {
            email,
            name,
            password,
            role,
            school_code,
        } => {
            let role = Role::from_code(role).ok_or_else(|| AppError::InvalidRole(role.clone()))?;
            let pool = DbPool::new(db)?;
            // staff stay signed in while opening accounts for others
            let creator = match auth::stored_token(db) {
                Some(token) => auth::profile_for_token(&pool.conn, &token)?
                    .filter(|p| matches!(p.role, Role::Ministry | Role::Admin)),
                None => None,
            };
            let profile = auth::sign_up(
                &pool.conn,
                &SignUp {
                    email,
                    full_name: name,
                    password,
                    role,
                    school_code: school_code.as_deref(),
                },
                creator.as_ref(),
            )?;
            success(format!(
                "Account created for {} ({}), id {}",
                profile.full_name,
                profile.role.label(),
                profile.id
            ));
            match &creator {
                Some(by) => info(format!("You are still signed in as {}.", by.full_name)),
                None => {
                    let (_, token) = auth::sign_in(&pool.conn, &profile.email, password)?;
                    auth::remember_token(db, &token)?;
                }
            }
        }

        AuthCmd::Signin { email, password } => {
            let pool = DbPool::new(db)?;
            let (profile, token) = auth::sign_in(&pool.conn, email, password)?;
            auth::remember_token(db, &token)?;
            success(format!("Signed in as {} ({})", profile.full_name, profile.role));
        }

        AuthCmd::Signout => {
            let pool = DbPool::new(db)?;
            if let Some(token) = auth::stored_token(db) {
                auth::sign_out(&pool.conn, &token)?;
            }
            auth::forget_token(db)?;
            success("Signed out.");
        }

        AuthCmd::Whoami => {
            let (_, user) = signed_in(cfg)?;
            info(format!(
                "{} <{}>, {} (id {})",
                user.full_name,
                user.email,
                user.role.label(),
                user.id
            ));
        }
    }
    Ok(())
}

/// `home`: greeting, unread count and the commands open to the role.
pub fn home(cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;

    header(
        format!("Welcome, {} ({})", user.full_name, user.role.label()),
        &cfg.separator_char,
    );
    let unread = unread_count(&pool.conn, user.id)?;
    if unread > 0 {
        info(format!("You have {} unread notification(s).", unread));
    }

    for entry in menu_for(user.role) {
        let command = format!("rollcall {:<16}", entry.command);
        println!("  {} {}", bold(&command), entry.description);
    }
    hint("Add --help to any command for its options.");
    Ok(())
}

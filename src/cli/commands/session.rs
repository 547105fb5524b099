use crate::cli::commands::signed_in;
use crate::cli::parser::SessionCmd;
use crate::config::Config;
use crate::core::auth::require_role;
use crate::core::{checkin, tenancy};
use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::models::role::Role;
use crate::ui::messages::{hint, info, success};
use crate::utils::formatting::bold;
use chrono::Local;

pub fn handle(cmd: &SessionCmd, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    let conn = &pool.conn;
    let now = Local::now();

    match cmd {
        SessionCmd::Open {
            class_id,
            minutes,
            code,
        } => {
            let class = tenancy::load_class(conn, &user, *class_id)?;
            tenancy::ensure_can_mark(conn, &user, &class)?;

            let session = checkin::open_session(
                conn,
                class.id,
                user.id,
                minutes.unwrap_or(cfg.checkin_session_minutes),
                code.as_deref(),
                cfg.checkin_code_length,
                now,
            )
            .map_err(AppError::failed("open the check-in session"))?;
            audit(conn, "session_open", &class.name, &session.session_code);

            success(format!("Check-in open for {}", class.name));
            println!("\n    Code: {}\n", bold(&session.session_code));
            hint(format!(
                "Valid until {} ({} min)",
                session.expires_at.format("%H:%M"),
                session.minutes_left(now)
            ));
        }

        SessionCmd::Close { class_id } => {
            let class = tenancy::load_class(conn, &user, *class_id)?;
            tenancy::ensure_can_mark(conn, &user, &class)?;
            let closed = checkin::close_sessions(conn, class.id)?;
            if closed == 0 {
                info(format!("No open check-in session for {}", class.name));
            } else {
                audit(conn, "session_close", &class.name, &format!("{closed} closed"));
                success(format!("Check-in closed for {}", class.name));
            }
        }

        SessionCmd::Show { class_id } => {
            let class = tenancy::load_class(conn, &user, *class_id)?;
            tenancy::ensure_can_mark(conn, &user, &class)?;
            match checkin::active_session(conn, class.id, now)? {
                Some(s) => {
                    info(format!(
                        "Code {} for {}, {} min left",
                        bold(&s.session_code),
                        class.name,
                        s.minutes_left(now)
                    ));
                }
                None => info(format!("No open check-in session for {}", class.name)),
            }
        }
    }
    Ok(())
}

/// `checkin --code`: redeem a code as the signed-in student.
pub fn checkin(code: &str, cfg: &Config) -> AppResult<()> {
    let (pool, user) = signed_in(cfg)?;
    require_role(&user, &[Role::Student])?;
    let student = tenancy::student_for_profile(&pool.conn, &user)?;

    let outcome = checkin::check_in(&pool.conn, &student, code, Local::now());
    if !outcome.success {
        return Err(AppError::Validation(outcome.message));
    }

    audit(&pool.conn, "checkin", &student.full_name, code.trim());
    success(outcome.message);
    Ok(())
}

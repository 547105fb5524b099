pub mod attendance;
pub mod auth;
pub mod backup;
pub mod config;
pub mod db;
pub mod directory;
pub mod export;
pub mod init;
pub mod issues;
pub mod log;
pub mod messaging;
pub mod report;
pub mod requests;
pub mod session;
pub mod timetable;

use crate::config::Config;
use crate::core::auth::current_user;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::profile::Profile;

/// Open the configured database and resolve the remembered user.
pub(crate) fn signed_in(cfg: &Config) -> AppResult<(DbPool, Profile)> {
    let pool = DbPool::new(&cfg.database)?;
    let user = current_user(&pool.conn, &cfg.database)?;
    Ok((pool, user))
}

/// `--range` for listings and reports; `None` or `all` means no bounds.
pub(crate) fn period(range: Option<&str>) -> AppResult<crate::core::stats::Period> {
    match range {
        Some(r) if !r.trim().eq_ignore_ascii_case("all") => {
            let (from, to) = crate::utils::date::parse_range(r)?;
            Ok(crate::core::stats::Period {
                from: Some(from),
                to: Some(to),
            })
        }
        _ => Ok(Default::default()),
    }
}

/// Display name for an optional profile id.
pub(crate) fn profile_name(conn: &rusqlite::Connection, id: Option<i64>) -> String {
    id.and_then(|id| {
        crate::db::repo::Repo::<Profile>::new(conn)
            .get(id)
            .ok()
            .flatten()
    })
    .map(|p| p.full_name)
    .unwrap_or_else(|| "-".to_string())
}

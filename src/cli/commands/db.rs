use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::audit;
use crate::db::migrate::{applied_versions, run_pending_migrations};
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};
use rusqlite::Connection;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;

    if *migrate {
        let before = applied_versions(&pool.conn)?.len();
        run_pending_migrations(&pool.conn)?;
        let after = applied_versions(&pool.conn)?.len();
        if after > before {
            success(format!("{} migration(s) applied.", after - before));
        } else {
            info("Schema is up to date.");
        }
    }

    if *show_info {
        stats::print_db_info(&mut pool, &cfg.database)?;
    }

    if *check {
        check_integrity(&pool.conn)?;
    }

    if *vacuum {
        info("Running VACUUM…");
        pool.conn.execute_batch("VACUUM;")?;
        audit(&pool.conn, "db_vacuum", &cfg.database, "vacuum completed");
        success("Vacuum completed.");
    }

    Ok(())
}

/// SQLite page check plus dangling references left by rows written with
/// foreign keys off (older files, manual edits).
fn check_integrity(conn: &Connection) -> AppResult<()> {
    info("Running integrity check…");
    let integrity: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

    let mut stmt = conn.prepare("PRAGMA foreign_key_check;")?;
    let dangling: Vec<(String, Option<i64>, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<Result<_, _>>()?;

    if integrity != "ok" {
        error(format!("Integrity check failed: {}", integrity));
    } else if dangling.is_empty() {
        success("Integrity check passed.");
    }

    for (table, rowid, parent) in &dangling {
        let row = rowid.map(|id| id.to_string()).unwrap_or_else(|| "?".into());
        warning(format!("{table} row {row} points to a missing {parent} row"));
    }
    audit(
        conn,
        "db_check",
        &integrity,
        &format!("{} dangling reference(s)", dangling.len()),
    );
    Ok(())
}

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped with `--test`)
///  - the SQLite database with every schema migration applied
pub fn handle(cli: &Cli) -> AppResult<()> {
    let db_path = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = db_path.to_string_lossy().to_string();

    info("Initializing rollcall…");
    info(format!("Config file : {}", Config::config_file().display()));
    info(format!("Database    : {}", db_path));

    // opening the pool creates the tables and runs pending migrations
    let pool = DbPool::new(&db_path)?;
    success(format!("Database initialized at {}", db_path));

    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "Database initialized",
        &format!("Database initialized at {}", db_path),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    success("rollcall initialization completed!");
    Ok(())
}

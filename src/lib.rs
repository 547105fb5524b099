//! rollcall library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules (used directly by the integration tests).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Backup { .. } => commands::backup::handle(&cli.command, cfg),
        Commands::Export { .. } => commands::export::handle(&cli.command, cfg),
        Commands::Home => commands::auth::home(cfg),
        Commands::Auth { action } => commands::auth::handle(action, cfg),
        Commands::School { action } => commands::directory::school(action, cfg),
        Commands::Class { action } => commands::directory::class(action, cfg),
        Commands::Student { action } => commands::directory::student(action, cfg),
        Commands::User { action } => commands::directory::user(action, cfg),
        Commands::Subject { action } => commands::timetable::subject(action, cfg),
        Commands::Schedule { action } => commands::timetable::schedule(action, cfg),
        Commands::Attendance { action } => commands::attendance::handle(action, cfg),
        Commands::Session { action } => commands::session::handle(action, cfg),
        Commands::Checkin { code } => commands::session::checkin(code, cfg),
        Commands::Absence { action } => commands::requests::absence(action, cfg),
        Commands::Leave { action } => commands::requests::leave(action, cfg),
        Commands::Announce { action } => commands::messaging::announce(action, cfg),
        Commands::Notify { action } => commands::messaging::notifications(action, cfg),
        Commands::Issue { action } => commands::issues::issue(action, cfg),
        Commands::Note { action } => commands::issues::note(action, cfg),
        Commands::Report { action } => commands::report::handle(action, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // `--db` runs fall back to defaults when the config file is unreadable
    let mut cfg = match (&cli.db, Config::load()) {
        (_, Ok(cfg)) => cfg,
        (Some(_), Err(_)) => Config::default(),
        (None, Err(e)) => return Err(e),
    };

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    dispatch(&cli, &cfg)
}

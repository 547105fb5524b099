use crate::cli::commands::signed_in;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportRequest};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        class_id,
        force,
    } = cmd
    {
        let (pool, user) = signed_in(cfg)?;
        let req = ExportRequest {
            format: *format,
            file,
            range: range.as_deref(),
            class_id: *class_id,
            force: *force,
        };
        ExportLogic::export(&pool.conn, &user, &req)?;
    }
    Ok(())
}

use crate::cli::parser::Commands;
use crate::config::{Config, migrate};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::path::Path;
use std::process::Command;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate: run_migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            info(format!("Current configuration ({}):\n", path.display()));
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            migrate::check(&path)?;
        }

        if *run_migrate {
            if path.exists() {
                migrate::migrate(&path, cfg)?;
            } else {
                warning(format!(
                    "No configuration file at {}; run `rollcall init` first.",
                    path.display()
                ));
            }
        }

        if *edit_config {
            open_in_editor(&path, editor.as_deref())?;
        }
    }

    Ok(())
}

/// Try the requested editor, then `$EDITOR`/`$VISUAL`, then the platform default.
fn open_in_editor(path: &Path, requested: Option<&str>) -> AppResult<()> {
    let platform = if cfg!(target_os = "windows") { "notepad" } else { "nano" };
    let mut candidates: Vec<String> = requested.map(str::to_string).into_iter().collect();
    candidates.extend(["EDITOR", "VISUAL"].iter().filter_map(|v| std::env::var(v).ok()));
    candidates.push(platform.to_string());
    candidates.dedup();

    for (i, editor) in candidates.iter().enumerate() {
        match Command::new(editor).arg(path).status() {
            Ok(status) if status.success() => {
                success(format!("Edited {} with '{}'", path.display(), editor));
                return Ok(());
            }
            _ if i + 1 < candidates.len() => {
                warning(format!("Editor '{}' failed, trying '{}'", editor, candidates[i + 1]));
            }
            _ => {}
        }
    }
    Err(AppError::Validation(format!(
        "no working editor among {}",
        candidates.join(", ")
    )))
}

//! Path helpers: `~` expansion, files kept next to the database, and the
//! overwrite prompt used by export and backup.

use crate::errors::AppResult;
use crate::ui::messages::{info, warning};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// `<db>.<suffix>`, e.g. the remembered sign-in token of a database.
pub fn sidecar(db_path: &str, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{db_path}.{suffix}"))
}

/// Write a file only the current user can read (tokens).
pub fn write_private(path: &Path, contents: &str) -> AppResult<()> {
    fs::write(path, contents)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Whether `path` may be written. Asks on stdin when the file exists and
/// `force` is not set; anything but y/yes keeps the file.
pub fn confirm_overwrite(path: &Path, force: bool) -> AppResult<bool> {
    if force || !path.exists() {
        return Ok(true);
    }

    warning(format!("{} already exists.", path.display()));
    print!("Replace it? [y/N]: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let yes = matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes");
    if yes {
        info(format!("Replacing {}", path.display()));
    }
    Ok(yes)
}

//! Database snapshots for `rollcall backup`.

use crate::db::log::audit;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use crate::utils::path::confirm_overwrite;
use rusqlite::Connection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::FileOptions;

pub struct BackupLogic;

impl BackupLogic {
    /// Write a consistent snapshot of the open database to `dest_file`,
    /// optionally zipped. Returns the final path, or `None` when the user
    /// kept an existing file.
    pub fn backup(
        conn: &Connection,
        dest_file: &str,
        compress: bool,
        force: bool,
    ) -> AppResult<Option<PathBuf>> {
        let dest = Path::new(dest_file);
        if dest.is_dir() {
            return Err(AppError::Validation(format!(
                "{} is a directory; pass a file name",
                dest.display()
            )));
        }

        let final_target = if compress {
            dest.with_extension("zip")
        } else {
            dest.to_path_buf()
        };
        if !confirm_overwrite(&final_target, force)? {
            info("Backup cancelled.");
            return Ok(None);
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        // VACUUM INTO refuses an existing target
        if dest.exists() {
            fs::remove_file(dest)?;
        }

        conn.execute("VACUUM INTO ?1", [dest.to_string_lossy().as_ref()])
            .map_err(AppError::from)
            .map_err(AppError::failed("write the backup"))?;

        let final_path = if compress {
            let zipped = zip_snapshot(dest, &final_target)?;
            if let Err(e) = fs::remove_file(dest) {
                warning(format!("Uncompressed snapshot left at {}: {}", dest.display(), e));
            }
            zipped
        } else {
            final_target
        };

        let size = fs::metadata(&final_path).map(|m| m.len()).unwrap_or(0);
        audit(
            conn,
            "backup",
            &final_path.to_string_lossy(),
            &format!("{} bytes{}", size, if compress { ", zipped" } else { "" }),
        );
        success(format!("Backup written to {}", final_path.display()));
        Ok(Some(final_path))
    }
}

fn zip_snapshot(snapshot: &Path, zip_path: &Path) -> AppResult<PathBuf> {
    let mut zip = ZipWriter::new(fs::File::create(zip_path)?);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let entry = snapshot
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rollcall.sqlite".to_string());

    zip.start_file(entry, options).map_err(io::Error::other)?;
    io::copy(&mut fs::File::open(snapshot)?, &mut zip)?;
    zip.finish().map_err(io::Error::other)?;
    Ok(zip_path.to_path_buf())
}

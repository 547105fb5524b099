use crate::errors::{AppError, AppResult};
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    /// Length of generated check-in codes.
    #[serde(default = "default_code_length")]
    pub checkin_code_length: usize,
    /// Lifetime of a check-in session when `--minutes` is not given.
    #[serde(default = "default_session_minutes")]
    pub checkin_session_minutes: i64,
    /// Students below this rate (percent) are flagged in class reports.
    #[serde(default = "default_low_attendance")]
    pub low_attendance_threshold: f64,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_code_length() -> usize {
    6
}
fn default_session_minutes() -> i64 {
    15
}
fn default_low_attendance() -> f64 {
    75.0
}
fn default_separator_char() -> String {
    "-".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db: PathBuf) -> Self {
        Self {
            database: db.to_string_lossy().to_string(),
            checkin_code_length: default_code_length(),
            checkin_session_minutes: default_session_minutes(),
            low_attendance_threshold: default_low_attendance(),
            separator_char: default_separator_char(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rollcall")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rollcall")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rollcall.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rollcall.sqlite")
    }

    /// Load configuration from file, or return defaults if not found.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let mut cfg: Config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_yaml::from_str(&content)?
        } else {
            Config::default()
        };
        cfg.database = expand_tilde(&cfg.database).to_string_lossy().to_string();
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> AppResult<()> {
        if !(4..=12).contains(&self.checkin_code_length) {
            return Err(AppError::Config(format!(
                "checkin_code_length must be between 4 and 12 (got {})",
                self.checkin_code_length
            )));
        }
        if self.checkin_session_minutes <= 0 {
            return Err(AppError::Config(
                "checkin_session_minutes must be positive".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.low_attendance_threshold) {
            return Err(AppError::Config(
                "low_attendance_threshold must be a percentage (0-100)".into(),
            ));
        }
        Ok(())
    }

    /// Create the config directory, the config file (unless `is_test`) and
    /// an empty database file. Returns the database path.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            fs::create_dir_all(&dir)?;
            let config = Self::with_database(db_path.clone());
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {}", Self::config_file().display());
        }

        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}

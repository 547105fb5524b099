//! Unified application error type.
//! All modules (db, core, cli, export) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Unknown column '{column}' for {table}")]
    UnknownColumn { table: &'static str, column: String },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid attendance status: {0}")]
    InvalidStatus(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    // ---------------------------
    // Form / access errors
    // ---------------------------
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("You are not signed in. Run `rollcall auth signin` first.")]
    NotSignedIn,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Attendance walk: {0}")]
    Walker(String),

    /// Storage failure surfaced to the user with a fixed message.
    #[error("Failed to {action}. Please try again.")]
    Operation {
        action: String,
        #[source]
        source: Box<AppError>,
    },

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    /// Wrap a storage failure into the generic "Failed to ..." message.
    /// Validation, access and not-found errors pass through untouched.
    pub fn failed(action: impl Into<String>) -> impl FnOnce(AppError) -> AppError {
        let action = action.into();
        move |e| match e {
            AppError::Db(_) | AppError::Io(_) => AppError::Operation {
                action,
                source: Box::new(e),
            },
            other => other,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

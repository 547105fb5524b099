//! Config file upkeep: report and fill in keys added by newer releases.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{} is not a YAML mapping",
            path.display()
        ))),
    }
}

fn defaults_mapping(cfg: &Config) -> AppResult<Mapping> {
    match serde_yaml::to_value(cfg)? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config("default configuration is not a mapping".into())),
    }
}

/// Keys the file at `path` lacks compared to the current `Config`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let present = read_mapping(path)?;
    let defaults = defaults_mapping(&Config::default())?;
    Ok(defaults
        .keys()
        .filter(|k| !present.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

pub fn check(path: &Path) -> AppResult<bool> {
    if !path.exists() {
        warning(format!("No configuration file at {}", path.display()));
        return Ok(false);
    }
    let missing = missing_keys(path)?;
    if missing.is_empty() {
        success("Configuration file is complete.");
        Ok(true)
    } else {
        warning(format!("Missing keys: {}", missing.join(", ")));
        info("Run `rollcall config --migrate` to add them with default values.");
        Ok(false)
    }
}

/// Add missing keys with their defaults, keeping the values already set.
/// Returns the keys that were added.
pub fn migrate(path: &Path, current: &Config) -> AppResult<Vec<String>> {
    let mut present = read_mapping(path)?;
    let defaults = defaults_mapping(current)?;

    let mut added = Vec::new();
    for (k, v) in defaults {
        if !present.contains_key(&k) {
            if let Some(name) = k.as_str() {
                added.push(name.to_string());
            }
            present.insert(k, v);
        }
    }

    if added.is_empty() {
        info("Configuration already up to date.");
        return Ok(added);
    }

    fs::write(path, serde_yaml::to_string(&Value::Mapping(present))?)?;
    success(format!("Configuration updated: added {}", added.join(", ")));
    Ok(added)
}

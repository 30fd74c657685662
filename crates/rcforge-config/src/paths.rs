//! Platform-specific paths for settings, schemas, and templates.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/rcforge/` (Linux), `~/Library/Application Support/rcforge/` (macOS), `%APPDATA%\rcforge\` (Windows)
//! - **Settings file**: `<user config>/settings.toml`
//! - **Templates**: `<user config>/templates/`
//! - **Schema overrides**: `<user config>/schema/`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "rcforge";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.toml";

/// Subdirectory name for templates.
const TEMPLATES_SUBDIR: &str = "templates";

/// Subdirectory name for user schema definitions.
const SCHEMA_SUBDIR: &str = "schema";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Path of the settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Directory holding exported templates.
pub fn user_templates_dir() -> PathBuf {
    user_config_dir().join(TEMPLATES_SUBDIR)
}

/// Directory searched for schema definitions when no directory is configured.
pub fn user_schema_dir() -> PathBuf {
    user_config_dir().join(SCHEMA_SUBDIR)
}

/// Ensure the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_config_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure the user templates directory exists.
pub fn ensure_user_templates_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_templates_dir();
    ensure_dir(&dir)?;
    Ok(dir)
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}

/// Find a template by name or path.
///
/// A path to an existing file is returned as is; otherwise `name` (with
/// `.toml` added when missing) is looked up in the user templates directory.
pub fn find_template(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }
    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = user_templates_dir().join(filename);
    candidate.is_file().then_some(candidate)
}

/// Names of the templates in the user templates directory, sorted.
pub fn list_templates() -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(user_templates_dir()) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    names
}

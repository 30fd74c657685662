//! User settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rcforge_registry::OutOfRangePolicy;

use crate::error::ConfigError;
use crate::paths::ensure_dir;

/// Persistent user settings.
///
/// # TOML Format
///
/// ```toml
/// schema_dir = "/home/me/rc0-schema"
/// out_of_range = "clamp"
/// verify_fidelity = true
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory of schema definitions replacing the built-in set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,

    /// How edits handle integers outside their range.
    pub out_of_range: OutOfRangePolicy,

    /// Check that every loaded record re-renders to its exact source before
    /// any write.
    pub verify_fidelity: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_dir: None,
            out_of_range: OutOfRangePolicy::Reject,
            verify_fidelity: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.schema_dir.is_none());
        assert_eq!(s.out_of_range, OutOfRangePolicy::Reject);
        assert!(s.verify_fidelity);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let s = Settings::from_toml("out_of_range = \"clamp\"\n").unwrap();
        assert_eq!(s.out_of_range, OutOfRangePolicy::Clamp);
        assert!(s.verify_fidelity);
        assert!(s.schema_dir.is_none());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(Settings::from_toml("out_of_range = \"wrap\"\n").is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let s = Settings::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let s = Settings {
            schema_dir: Some(PathBuf::from("/opt/rc0")),
            out_of_range: OutOfRangePolicy::Clamp,
            verify_fidelity: false,
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
    }
}

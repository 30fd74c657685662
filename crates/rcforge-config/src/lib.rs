//! Settings, paths, and portable templates for rcforge.
//!
//! # Features
//!
//! - **Settings**: schema directory, out-of-range policy, fidelity check
//! - **Templates**: export a record's settable fields to TOML and apply
//!   them to other records, with a per-field report
//! - **Paths**: platform-specific config and template directories
//!
//! # Example
//!
//! ```rust,no_run
//! use rcforge_config::{Settings, Template, paths};
//! use rcforge_model::Record;
//!
//! let settings = Settings::load(paths::settings_path()).unwrap();
//! let text = std::fs::read_to_string("MEMORY001A.RC0").unwrap();
//! let record = Record::decode_builtin(&text).unwrap();
//!
//! let template = Template::capture("tracks", &record, &["TRACK"]);
//! template.save(paths::user_templates_dir().join("tracks.toml")).unwrap();
//!
//! let mut other = Record::decode_builtin(&text).unwrap();
//! let report = template.apply(&mut other, settings.out_of_range);
//! assert!(report.is_clean());
//! ```

mod error;
mod settings;
mod template;

/// Platform-specific paths for settings and templates.
pub mod paths;

pub use error::ConfigError;
pub use paths::{
    ensure_user_config_dir, ensure_user_templates_dir, find_template, list_templates, settings_path,
    user_config_dir, user_schema_dir, user_templates_dir,
};
pub use settings::Settings;
pub use template::{ApplyReport, FieldOutcome, Template};

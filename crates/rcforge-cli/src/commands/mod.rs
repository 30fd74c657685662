//! CLI command implementations.

pub mod audio;
pub mod bulk;
pub mod common;
pub mod config;
pub mod diff;
pub mod fx;
pub mod name;
pub mod schema;
pub mod set;
pub mod show;
pub mod template;

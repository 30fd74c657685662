//! Typed model and writer for RC0 memory and system records.
//!
//! A [`Record`] is decoded from text with a
//! [`SchemaRegistry`](rcforge_registry::SchemaRegistry): every section is
//! resolved by its structural path, and its children are bound to fields by
//! position. Values are edited only through validated setters; every change
//! goes into an undoable log. The writer substitutes changed values into the
//! original tree and emits everything else verbatim, so an unedited record
//! renders byte-identical to its source.
//!
//! # Features
//!
//! - **Validated edits**: range, enumeration, and read-only checks, with a
//!   clamp policy for out-of-range integers
//! - **Undo / redo**: per-record change log, floored at the last save
//! - **Bulk operations**: copy, swap, reset to defaults, batch edits
//! - **Diff and dry run**: attribute-level differences between records
//! - **Effects**: slots, banks, and the active effect of each slot
//! - **Coverage gaps**: everything the schema does not describe, preserved
//!
//! # Example
//!
//! ```rust
//! use rcforge_model::{AttrPath, Record};
//! use rcforge_registry::Value;
//!
//! let text = "<database>\n<mem>\n<MASTER>\n<A>100</A>\n<B>0</B>\n</MASTER>\n</mem>\n</database>\n<count>0009</count>\n";
//! let mut record = Record::decode_builtin(text).unwrap();
//!
//! let level: AttrPath = "MASTER.level".parse().unwrap();
//! assert!(record.set(&level, Value::Int(250)).is_err());
//! record.set(&level, Value::Int(120)).unwrap();
//!
//! let out = record.save().unwrap();
//! assert!(out.contains("<A>120</A>"));
//! assert!(out.ends_with("<count>0010</count>\n"));
//! ```

pub mod audio;
pub mod batch;
pub mod diff;
pub mod error;
pub mod fx;
pub mod history;
pub mod path;
pub mod record;
pub mod resolver;
pub mod writer;

pub use batch::{BatchItem, BatchReport, apply_each};
pub use diff::{DiffEntry, diff};
pub use error::{ModelError, WriteError};
pub use fx::FxSlot;
pub use history::{Change, ChangeLog};
pub use path::{AttrKey, AttrPath};
pub use record::{Group, Record, RecordKind, Section};
pub use resolver::{CoverageGap, Field, GapKind};
pub use writer::{render, save};

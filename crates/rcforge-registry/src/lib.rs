//! Schema registry for RC0 loop-station configuration files.
//!
//! RC0 section children are positional: `<A>`, `<B>`, ... carry no meaning
//! by themselves, and the same tag means different things in different
//! sections. This crate holds the declarative knowledge that gives them
//! meaning:
//!
//! - [`SectionSchema`]: the ordered fields of one section type, and the
//!   identity rule and groups that say where it applies
//! - [`EffectTypeSchema`]: the parameter block of one effect algorithm,
//!   matched by section-name suffix (`AA_DELAY`, `CD_DELAY`)
//! - [`EffectTable`]: the per-group index → effect-type mapping used by slot
//!   headers
//! - [`FieldSchema`] and [`Value`]: per-field types, ranges, and validation
//!
//! Definitions are TOML (see [`definition`]). A built-in set is embedded;
//! [`SchemaRegistry::load_dir`] loads a user-supplied one.
//!
//! ```
//! use rcforge_registry::{SchemaRegistry, SectionPath};
//!
//! let registry = SchemaRegistry::builtin();
//! let res = registry.section_schema(&SectionPath::new(["database", "ifx"], "CD_DELAY"));
//! assert_eq!(res.schema_name(), Some("DELAY"));
//! ```

pub mod builtin;
pub mod definition;
pub mod effect;
pub mod error;
pub mod field;
pub mod registry;
pub mod section;

pub use builtin::BUILTIN_DEFINITIONS;
pub use effect::{EffectTable, EffectTypeSchema};
pub use error::RegistryError;
pub use field::{FieldKind, FieldSchema, OutOfRangePolicy, ValidationError, Value};
pub use registry::{Resolution, SchemaRegistry};
pub use section::{
    FieldLayout, FieldLookup, SectionIdentity, SectionPath, SectionSchema, SectionShape, SlotCoord,
};

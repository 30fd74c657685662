//! Declarative TOML definition format.
//!
//! ```toml
//! [[section]]
//! name = "TRACK"
//! identity = "numbered"      # fixed (default) | numbered | prefixed | slot_header
//! first = 1
//! last = 6
//! groups = ["mem"]
//!
//! [[section.field]]
//! name = "pan"
//! type = "int"               # bool | int (default) | enum | chars
//! min = 0
//! max = 100
//! default = 50
//!
//! [[section.field]]          # twelve fields of unknown meaning
//! count = 12
//!
//! [[effect]]
//! name = "DELAY"
//!
//! [[effect.field]]
//! name = "time"
//!
//! [[effect_table]]
//! group = "ifx"
//! first = 0
//! types = ["LPF", "BPF", "HPF"]   # "" leaves an index undeclared
//! ```

use serde::Deserialize;

use crate::effect::EffectTypeSchema;
use crate::error::RegistryError;
use crate::field::{FieldKind, FieldSchema, Value};
use crate::section::{SectionIdentity, SectionSchema};

/// One parsed definition file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Definitions {
    /// `[[section]]` entries.
    #[serde(default, rename = "section")]
    pub sections: Vec<SectionDef>,
    /// `[[effect]]` entries.
    #[serde(default, rename = "effect")]
    pub effects: Vec<EffectDef>,
    /// `[[effect_table]]` entries.
    #[serde(default, rename = "effect_table")]
    pub effect_tables: Vec<EffectTableDef>,
}

/// Identity rule keyword.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityDef {
    /// Name matches exactly.
    #[default]
    Fixed,
    /// `prefix` + number in `first..=last`.
    Numbered,
    /// Name starts with `prefix`.
    Prefixed,
    /// Two-letter slot header.
    SlotHeader,
}

/// `[[section]]`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDef {
    /// Family name; also the default tag or prefix.
    pub name: String,
    /// Identity rule.
    #[serde(default)]
    pub identity: IdentityDef,
    /// Name prefix for `numbered` and `prefixed`; defaults to `name`.
    pub prefix: Option<String>,
    /// First instance number for `numbered`.
    pub first: Option<u32>,
    /// Last instance number for `numbered`.
    pub last: Option<u32>,
    /// Top-level groups the section appears in.
    #[serde(default)]
    pub groups: Vec<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Fields in positional order.
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

/// Field value type keyword.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindDef {
    /// `0` / `1`.
    Bool,
    /// Integer.
    #[default]
    Int,
    /// Choice index.
    Enum,
    /// Character-code run.
    Chars,
}

/// A default written as a number, a boolean, or text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DefaultDef {
    /// Integer default.
    Int(i64),
    /// Boolean default.
    Bool(bool),
    /// Text default (character arrays, or an enum label).
    Text(String),
}

/// `[[section.field]]` / `[[effect.field]]`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Logical name; omit for fields of unknown meaning.
    pub name: Option<String>,
    /// Value type.
    #[serde(default, rename = "type")]
    pub kind: KindDef,
    /// Inclusive lower bound (int).
    pub min: Option<i64>,
    /// Inclusive upper bound (int).
    pub max: Option<i64>,
    /// Choice labels (enum).
    pub choices: Option<Vec<String>>,
    /// Character count (chars).
    pub len: Option<usize>,
    /// Default value.
    pub default: Option<DefaultDef>,
    /// Computed or informational.
    #[serde(default)]
    pub read_only: bool,
    /// Display label.
    pub label: Option<String>,
    /// Display unit.
    pub unit: Option<String>,
    /// Repeat this (unnamed) field `count` times.
    #[serde(default = "one")]
    pub count: usize,
}

fn one() -> usize {
    1
}

/// `[[effect]]`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectDef {
    /// Effect-type name, matched case-insensitively against block suffixes.
    pub name: String,
    /// Display label.
    pub label: Option<String>,
    /// Fields in positional order.
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

/// `[[effect_table]]`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectTableDef {
    /// Top-level group (`ifx`, `tfx`).
    pub group: String,
    /// Index of the first entry of `types`.
    #[serde(default)]
    pub first: u32,
    /// Effect-type names in index order; `""` skips an index.
    pub types: Vec<String>,
}

impl Definitions {
    /// Parse definition text. `origin` names the source in errors.
    pub fn parse(origin: &str, text: &str) -> Result<Self, RegistryError> {
        toml::from_str(text).map_err(|source| RegistryError::Toml {
            origin: origin.to_string(),
            source,
        })
    }
}

impl SectionDef {
    /// Build the section schema.
    pub fn build(&self, origin: &str) -> Result<SectionSchema, RegistryError> {
        let prefix = || self.prefix.clone().unwrap_or_else(|| self.name.clone());
        let identity = match self.identity {
            IdentityDef::Fixed => SectionIdentity::Fixed(self.name.clone()),
            IdentityDef::Prefixed => SectionIdentity::Prefixed(prefix()),
            IdentityDef::SlotHeader => SectionIdentity::SlotHeader,
            IdentityDef::Numbered => {
                let first = self.first.unwrap_or(1);
                let Some(last) = self.last else {
                    return Err(RegistryError::invalid(
                        origin,
                        &self.name,
                        "numbered section needs `last`",
                    ));
                };
                if first > last {
                    return Err(RegistryError::invalid(
                        origin,
                        &self.name,
                        format!("first instance {first} is after last instance {last}"),
                    ));
                }
                SectionIdentity::Numbered {
                    prefix: prefix(),
                    first,
                    last,
                }
            }
        };
        let fields = build_fields(origin, &self.name, &self.fields)?;
        let mut schema = SectionSchema::new(self.name.clone(), identity, fields)
            .in_groups(self.groups.iter().cloned());
        schema.description = self.description.clone();
        Ok(schema)
    }
}

impl EffectDef {
    /// Build the effect-type schema.
    pub fn build(&self, origin: &str) -> Result<EffectTypeSchema, RegistryError> {
        if self.name.is_empty() {
            return Err(RegistryError::invalid(origin, "effect", "empty effect name"));
        }
        let fields = build_fields(origin, &self.name, &self.fields)?;
        let mut schema = EffectTypeSchema::new(&self.name, fields);
        schema.label = self.label.clone();
        Ok(schema)
    }
}

fn build_fields(
    origin: &str,
    item: &str,
    defs: &[FieldDef],
) -> Result<Vec<FieldSchema>, RegistryError> {
    let mut fields = Vec::with_capacity(defs.len());
    for (i, def) in defs.iter().enumerate() {
        let label = def.name.clone().unwrap_or_else(|| format!("field {}", i + 1));
        let item = format!("{item}.{label}");
        let field = def.build(origin, &item)?;
        if def.count == 0 {
            return Err(RegistryError::invalid(origin, &item, "count must be at least 1"));
        }
        if def.count > 1 && def.name.is_some() {
            return Err(RegistryError::invalid(origin, &item, "only unnamed fields can repeat"));
        }
        for _ in 0..def.count {
            fields.push(field.clone());
        }
    }
    let mut seen = std::collections::HashSet::new();
    for field in &fields {
        if let Some(name) = &field.name
            && !seen.insert(name.as_str())
        {
            return Err(RegistryError::invalid(
                origin,
                item,
                format!("field '{name}' is declared twice"),
            ));
        }
    }
    Ok(fields)
}

impl FieldDef {
    fn build(&self, origin: &str, item: &str) -> Result<FieldSchema, RegistryError> {
        let invalid = |reason: &str| RegistryError::invalid(origin, item, reason);

        if self.kind != KindDef::Int && (self.min.is_some() || self.max.is_some()) {
            return Err(invalid("min/max apply to int fields only"));
        }
        if self.kind != KindDef::Enum && self.choices.is_some() {
            return Err(invalid("choices apply to enum fields only"));
        }
        if self.kind != KindDef::Chars && self.len.is_some() {
            return Err(invalid("len applies to chars fields only"));
        }

        let kind = match self.kind {
            KindDef::Bool => FieldKind::Bool,
            KindDef::Int => {
                if let (Some(min), Some(max)) = (self.min, self.max)
                    && min > max
                {
                    return Err(invalid("min is above max"));
                }
                FieldKind::Int {
                    min: self.min,
                    max: self.max,
                }
            }
            KindDef::Enum => match &self.choices {
                Some(choices) if !choices.is_empty() => FieldKind::Enum {
                    choices: choices.clone(),
                },
                _ => return Err(invalid("enum field needs at least one choice")),
            },
            KindDef::Chars => match self.len {
                Some(len) if len > 0 => FieldKind::Chars { len },
                _ => return Err(invalid("chars field needs len of at least 1")),
            },
        };

        let mut field = FieldSchema::new(self.name.as_deref(), kind);
        field.read_only = self.read_only;
        field.label = self.label.clone();
        field.unit = self.unit.clone();

        if let Some(default) = &self.default {
            let value = match (&field.kind, default) {
                (FieldKind::Bool, DefaultDef::Bool(b)) => Value::Bool(*b),
                (FieldKind::Bool, DefaultDef::Int(0)) => Value::Bool(false),
                (FieldKind::Bool, DefaultDef::Int(1)) => Value::Bool(true),
                (FieldKind::Int { .. }, DefaultDef::Int(v)) => Value::Int(*v),
                (FieldKind::Enum { .. }, DefaultDef::Int(v)) => Value::Enum(
                    u32::try_from(*v).map_err(|_| invalid("enum default must be a choice index"))?,
                ),
                (FieldKind::Enum { .. }, DefaultDef::Text(label)) => field
                    .parse_input(label)
                    .map_err(|e| RegistryError::invalid(origin, item, format!("default: {e}")))?,
                (FieldKind::Chars { .. }, DefaultDef::Text(text)) => {
                    Value::Chars(text.trim_end_matches(' ').to_string())
                }
                _ => return Err(invalid("default does not match the field type")),
            };
            field.default = value;
        }
        field
            .validate(&field.default)
            .map_err(|e| RegistryError::invalid(origin, item, format!("default: {e}")))?;
        Ok(field)
    }
}

//! The schema registry: section, effect, and effect-table lookup.

use std::collections::BTreeMap;
use std::path::Path;

use crate::definition::Definitions;
use crate::effect::{EffectTable, EffectTypeSchema};
use crate::error::RegistryError;
use crate::section::{FieldLayout, FieldLookup, SectionPath, SectionSchema, SectionShape, SlotCoord};

/// Outcome of resolving a [`SectionPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A section schema applies.
    Section(&'a SectionSchema),
    /// The section is an effect block; its layout comes from the effect type.
    Effect {
        /// Slot the block belongs to.
        coord: SlotCoord,
        /// Effect-type schema matched by the name suffix.
        effect: &'a EffectTypeSchema,
    },
    /// Nothing applies; every field of the section is unmapped.
    NotFound,
}

impl<'a> Resolution<'a> {
    /// Field layout of the resolved schema.
    pub fn layout(&self) -> Option<&'a FieldLayout> {
        match self {
            Resolution::Section(s) => Some(&s.layout),
            Resolution::Effect { effect, .. } => Some(&effect.layout),
            Resolution::NotFound => None,
        }
    }

    /// Name of the resolved schema (section family or effect type).
    pub fn schema_name(&self) -> Option<&'a str> {
        match self {
            Resolution::Section(s) => Some(&s.name),
            Resolution::Effect { effect, .. } => Some(&effect.name),
            Resolution::NotFound => None,
        }
    }
}

/// Registry of section and effect-type schemas.
///
/// Built once, then only read. Share it behind an `Arc`; every lookup takes
/// `&self`.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    sections: Vec<SectionSchema>,
    effects: BTreeMap<String, EffectTypeSchema>,
    tables: BTreeMap<String, EffectTable>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from one definition text.
    pub fn from_toml(origin: &str, text: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.load_str(origin, text)?;
        Ok(registry)
    }

    /// Build a registry from every `*.toml` file in `dir`, in file-name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| RegistryError::read_dir(dir, e))?;
        let mut files: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        files.sort();

        let mut registry = Self::new();
        for path in files {
            let text =
                std::fs::read_to_string(&path).map_err(|e| RegistryError::read_file(&path, e))?;
            registry.load_str(&path.display().to_string(), &text)?;
        }
        tracing::info!(
            dir = %dir.display(),
            sections = registry.sections.len(),
            effects = registry.effects.len(),
            "loaded schema definitions"
        );
        Ok(registry)
    }

    /// Add the definitions in `text` to the registry.
    ///
    /// Sections are appended after those already registered, so earlier
    /// definitions win when two apply to the same path.
    pub fn load_str(&mut self, origin: &str, text: &str) -> Result<(), RegistryError> {
        let defs = Definitions::parse(origin, text)?;
        for def in &defs.sections {
            self.register_section(def.build(origin)?);
        }
        for def in &defs.effects {
            self.register_effect(def.build(origin)?)?;
        }
        for def in &defs.effect_tables {
            for (offset, name) in def.types.iter().enumerate() {
                if name.is_empty() {
                    continue;
                }
                let index = def.first + offset as u32;
                self.register_effect_type_index(&def.group, index, name)?;
            }
        }
        Ok(())
    }

    /// Register a section schema.
    pub fn register_section(&mut self, schema: SectionSchema) {
        self.sections.push(schema);
    }

    /// Register an effect-type schema.
    pub fn register_effect(&mut self, schema: EffectTypeSchema) -> Result<(), RegistryError> {
        if self.effects.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateEffect { name: schema.name });
        }
        self.effects.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Declare that type index `index` in `group` selects effect `name`.
    pub fn register_effect_type_index(
        &mut self,
        group: &str,
        index: u32,
        name: &str,
    ) -> Result<(), RegistryError> {
        let table = self.tables.entry(group.to_string()).or_default();
        if table.name(index).is_some() {
            return Err(RegistryError::DuplicateTableIndex {
                group: group.to_string(),
                index,
            });
        }
        table.insert(index, name);
        Ok(())
    }

    /// Resolve the schema that applies at `path`.
    ///
    /// Section identities are tried first, in registration order. A name of
    /// the form `<bank><slot>_<EFFECT>` then resolves by its effect suffix,
    /// whatever the bank and slot letters.
    pub fn section_schema(&self, path: &SectionPath) -> Resolution<'_> {
        if let Some(schema) = self.sections.iter().find(|s| s.applies_to(path)) {
            return Resolution::Section(schema);
        }
        if let SectionShape::EffectBlock { coord, effect } = path.shape()
            && let Some(effect) = self.effect_type_schema(effect)
        {
            return Resolution::Effect { coord, effect };
        }
        Resolution::NotFound
    }

    /// Effect-type schema by name, case-insensitive.
    pub fn effect_type_schema(&self, name: &str) -> Option<&EffectTypeSchema> {
        self.effects.get(&name.to_ascii_uppercase())
    }

    /// Field covering child `ordinal` of a section laid out by `layout`.
    pub fn field_schema<'a>(&self, layout: &'a FieldLayout, ordinal: usize) -> FieldLookup<'a> {
        layout.lookup(ordinal)
    }

    /// Effect table of a top-level group.
    pub fn effect_table(&self, group: &str) -> Option<&EffectTable> {
        self.tables.get(group)
    }

    /// Effect-type name selected by `index` in `group`.
    pub fn effect_name(&self, group: &str, index: u32) -> Option<&str> {
        self.effect_table(group)?.name(index)
    }

    /// Type index of effect `name` in `group`, case-insensitive.
    pub fn effect_index(&self, group: &str, name: &str) -> Option<u32> {
        self.effect_table(group)?.index(name)
    }

    /// All section schemas, in registration order.
    pub fn sections(&self) -> &[SectionSchema] {
        &self.sections
    }

    /// Section schema by family name.
    pub fn section_by_name(&self, name: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// All effect-type schemas, by name.
    pub fn effects(&self) -> impl Iterator<Item = &EffectTypeSchema> {
        self.effects.values()
    }

    /// Groups that have an effect table.
    pub fn effect_groups(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of section schemas.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether no section schema is registered.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

//! Typed records: decoding, queries, and validated mutation.

use std::sync::Arc;

use rcforge_core::{Document, parse_document};
use rcforge_registry::{OutOfRangePolicy, SchemaRegistry, SectionPath, ValidationError, Value};

use crate::error::ModelError;
use crate::history::{Change, ChangeLog};
use crate::path::{AttrKey, AttrPath, section_label};
use crate::resolver::{CoverageGap, Field, SectionResolver};

/// Section holding the memory name.
pub const NAME_SECTION: &str = "NAME";
/// Field holding the memory name.
pub const NAME_FIELD: &str = "name";
/// Schema family of the per-track sections.
pub const TRACK_FAMILY: &str = "TRACK";
/// Primary group tag of a system unit.
pub const SYSTEM_GROUP: &str = "sys";

/// Which kind of unit a record was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A memory: settings plus effect-routing groups.
    Memory,
    /// Device-wide system settings.
    System,
}

/// One section of a record with its bound fields.
#[derive(Debug, Clone)]
pub struct Section {
    /// Structural address used for schema resolution.
    pub path: SectionPath,
    /// Name of the schema that applied, `None` when unmapped.
    pub schema: Option<String>,
    /// Fields in positional order.
    pub fields: Vec<Field>,
}

impl Section {
    /// Section tag, e.g. `TRACK1`.
    pub fn name(&self) -> &str {
        &self.path.name
    }

    /// Field by key. `#N` matches the field whose run starts at child `N`.
    pub fn field(&self, key: &AttrKey) -> Option<&Field> {
        find_field(&self.fields, key).map(|i| &self.fields[i])
    }

    /// Value of the named field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.field(&AttrKey::Name(name.to_string())).map(|f| &f.value)
    }
}

fn find_field(fields: &[Field], key: &AttrKey) -> Option<usize> {
    match key {
        AttrKey::Name(_) => fields.iter().position(|f| &f.key == key),
        AttrKey::Ordinal(n) => fields.iter().position(|f| f.ordinal == *n),
    }
}

/// A top-level group (`mem`, `ifx`, `tfx`, `sys`).
#[derive(Debug, Clone)]
pub struct Group {
    /// Group tag.
    pub tag: String,
    /// Value of the `id` attribute, if present.
    pub id: Option<String>,
    /// Sections in source order.
    pub sections: Vec<Section>,
}

/// A decoded memory or system unit.
///
/// The parsed source is kept as the fidelity baseline; the writer
/// substitutes changed values into it and emits everything else verbatim.
#[derive(Debug, Clone)]
pub struct Record {
    registry: Arc<SchemaRegistry>,
    pub(crate) source: String,
    pub(crate) baseline: Document,
    pub(crate) groups: Vec<Group>,
    gaps: Vec<CoverageGap>,
    history: ChangeLog,
}

impl Record {
    /// Decode `text` with `registry`.
    pub fn decode(text: &str, registry: Arc<SchemaRegistry>) -> Result<Self, ModelError> {
        let baseline = parse_document(text)?;
        let (body_index, body) = baseline.body().ok_or(ModelError::NoBody)?;

        let mut groups: Vec<Group> = Vec::new();
        let mut gaps = Vec::new();
        for (gi, group) in body.children().iter().enumerate() {
            if group.is_scalar() {
                continue;
            }
            let qualifier = (!groups.is_empty()).then_some(group.tag.as_str());
            let mut sections = Vec::new();
            for (si, section) in group.children().iter().enumerate() {
                if section.is_scalar() {
                    continue;
                }
                let path = SectionPath::new(
                    [body.tag.as_str(), group.tag.as_str()],
                    section.tag.as_str(),
                );
                let resolution = registry.section_schema(&path);
                let label = section_label(qualifier, &section.tag);
                let addr = [body_index, gi, si];
                let (fields, found) =
                    SectionResolver::new(&label, &addr).resolve(section, resolution.layout());
                gaps.extend(found);
                sections.push(Section {
                    schema: resolution.schema_name().map(str::to_string),
                    path,
                    fields,
                });
            }
            groups.push(Group {
                tag: group.tag.clone(),
                id: group.attr("id").map(str::to_string),
                sections,
            });
        }

        tracing::debug!(
            groups = groups.len(),
            sections = groups.iter().map(|g| g.sections.len()).sum::<usize>(),
            gaps = gaps.len(),
            "decoded record"
        );
        Ok(Self {
            registry,
            source: text.to_string(),
            baseline,
            groups,
            gaps,
            history: ChangeLog::default(),
        })
    }

    /// Decode with the built-in registry.
    pub fn decode_builtin(text: &str) -> Result<Self, ModelError> {
        Self::decode(text, SchemaRegistry::builtin())
    }

    /// Registry the record was decoded with.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// The text the record was decoded from (or last saved as).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Memory or system.
    pub fn kind(&self) -> RecordKind {
        match self.groups.first() {
            Some(g) if g.tag == SYSTEM_GROUP => RecordKind::System,
            _ => RecordKind::Memory,
        }
    }

    /// Top-level groups; the first is the primary group.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Tag of the primary group.
    pub fn primary_group(&self) -> Option<&str> {
        self.groups.first().map(|g| g.tag.as_str())
    }

    /// Sections with their group qualifier (`None` for the primary group).
    pub fn sections(&self) -> impl Iterator<Item = (Option<&str>, &Section)> {
        self.groups.iter().enumerate().flat_map(|(g, group)| {
            let qualifier = (g != 0).then_some(group.tag.as_str());
            group.sections.iter().map(move |s| (qualifier, s))
        })
    }

    /// Section by group and tag.
    pub fn section(&self, group: Option<&str>, name: &str) -> Option<&Section> {
        let g = self.group_index(group)?;
        self.groups[g].sections.iter().find(|s| s.path.name == name)
    }

    /// Every field with its canonical path.
    pub fn fields(&self) -> impl Iterator<Item = (AttrPath, &Field)> + '_ {
        self.groups.iter().enumerate().flat_map(move |(g, group)| {
            group.sections.iter().flat_map(move |section| {
                section.fields.iter().map(move |field| {
                    let path = AttrPath {
                        group: (g != 0).then(|| group.tag.clone()),
                        section: section.path.name.clone(),
                        attr: field.key.clone(),
                    };
                    (path, field)
                })
            })
        })
    }

    /// Field at `path`.
    pub fn field(&self, path: &AttrPath) -> Option<&Field> {
        let (g, s, f) = self.locate(path)?;
        Some(&self.groups[g].sections[s].fields[f])
    }

    /// Current value at `path`.
    pub fn get(&self, path: &AttrPath) -> Option<&Value> {
        self.field(path).map(|f| &f.value)
    }

    /// The canonical form of `path`: primary group unqualified, named fields
    /// by name.
    pub fn canonical(&self, path: &AttrPath) -> Option<AttrPath> {
        let (g, s, f) = self.locate(path)?;
        Some(self.path_of(g, s, f))
    }

    /// Sections and ordinals that resolved to unmapped placeholders.
    pub fn coverage_gaps(&self) -> &[CoverageGap] {
        &self.gaps
    }

    /// Whether any value differs from the stored text.
    pub fn is_modified(&self) -> bool {
        self.fields().any(|(_, f)| f.is_dirty())
    }

    /// Set a field, rejecting out-of-range values.
    pub fn set(&mut self, path: &AttrPath, value: Value) -> Result<Change, ModelError> {
        self.set_with_policy(path, value, OutOfRangePolicy::Reject)
    }

    /// Set a field, handling out-of-range integers per `policy`.
    ///
    /// On failure the attribute keeps its value. Setting a field to its
    /// current value succeeds without adding a change to the log.
    pub fn set_with_policy(
        &mut self,
        path: &AttrPath,
        value: Value,
        policy: OutOfRangePolicy,
    ) -> Result<Change, ModelError> {
        let change = self.prepare(path, value, policy, false)?;
        self.commit(vec![change.clone()]);
        Ok(change)
    }

    /// Parse `text` per the field's type and set it.
    pub fn set_text(&mut self, path: &AttrPath, text: &str) -> Result<Change, ModelError> {
        self.set_text_with_policy(path, text, OutOfRangePolicy::Reject)
    }

    /// Parse `text` per the field's type and set it under `policy`.
    pub fn set_text_with_policy(
        &mut self,
        path: &AttrPath,
        text: &str,
        policy: OutOfRangePolicy,
    ) -> Result<Change, ModelError> {
        let value = self.parse_text(path, text)?;
        self.set_with_policy(path, value, policy)
    }

    /// Interpret `text` as a value for the field at `path`.
    pub fn parse_text(&self, path: &AttrPath, text: &str) -> Result<Value, ModelError> {
        let field = self
            .field(path)
            .ok_or_else(|| ModelError::NotFound { path: path.clone() })?;
        let schema = field
            .schema
            .as_ref()
            .ok_or_else(|| ModelError::Unmapped { path: path.clone() })?;
        schema.parse_input(text).map_err(|e| ModelError::invalid(path, e))
    }

    /// Set a read-only structural field (sample counts and the like).
    ///
    /// Type and range are still validated.
    pub fn set_derived(&mut self, path: &AttrPath, value: Value) -> Result<Change, ModelError> {
        let change = self.prepare(path, value, OutOfRangePolicy::Reject, true)?;
        self.commit(vec![change.clone()]);
        Ok(change)
    }

    /// Apply several derived-or-settable changes as one undo step.
    ///
    /// Every value is validated before any is applied.
    pub(crate) fn set_derived_all(
        &mut self,
        values: Vec<(AttrPath, Value)>,
    ) -> Result<Vec<Change>, ModelError> {
        let step = values
            .into_iter()
            .map(|(path, value)| self.prepare(&path, value, OutOfRangePolicy::Reject, true))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.commit(step))
    }

    /// Revert the most recent step not yet written out.
    ///
    /// Returns the changes applied, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<Change>> {
        let changes = self.history.undo()?;
        for change in &changes {
            self.apply(change);
        }
        tracing::debug!(changes = changes.len(), "undo");
        Some(changes)
    }

    /// Reapply the most recently undone step.
    pub fn redo(&mut self) -> Option<Vec<Change>> {
        let changes = self.history.redo()?;
        for change in &changes {
            self.apply(change);
        }
        tracing::debug!(changes = changes.len(), "redo");
        Some(changes)
    }

    /// Whether [`Record::undo`] would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`Record::redo`] would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Changes applied since the last save, oldest first.
    pub fn changes(&self) -> impl Iterator<Item = &Change> {
        self.history.changes()
    }

    /// The memory name, if the record has one.
    pub fn name(&self) -> Option<&str> {
        match self.get(&AttrPath::named(NAME_SECTION, NAME_FIELD)) {
            Some(Value::Chars(name)) => Some(name),
            _ => None,
        }
    }

    /// Rename the memory. Trailing spaces are dropped.
    pub fn set_name(&mut self, name: &str) -> Result<Change, ModelError> {
        self.set(&AttrPath::named(NAME_SECTION, NAME_FIELD), Value::Chars(name.to_string()))
    }

    /// Number of tracks the schema declares.
    pub fn track_count(&self) -> usize {
        self.track_names().len()
    }

    /// Track sections present in the record, in track order.
    pub fn tracks(&self) -> impl Iterator<Item = &Section> {
        self.track_names()
            .into_iter()
            .filter_map(move |name| self.section(None, &name))
    }

    /// Track section by number (`1` is `TRACK1`).
    pub fn track(&self, number: usize) -> Option<&Section> {
        let name = self.track_names().into_iter().nth(number.checked_sub(1)?)?;
        self.section(None, &name)
    }

    fn track_names(&self) -> Vec<String> {
        if self.kind() == RecordKind::System {
            return Vec::new();
        }
        self.registry
            .section_by_name(TRACK_FAMILY)
            .map(|s| s.identity.instances())
            .unwrap_or_default()
    }

    /// Copy every settable field from `other`.
    ///
    /// Read-only and unmapped fields are left alone, as are fields `other`
    /// lacks. The copy is one undo step.
    pub fn copy_from(&mut self, other: &Record) -> Result<Vec<Change>, ModelError> {
        self.check_compatible(other)?;
        let step = self.copy_step(other)?;
        Ok(self.commit(step))
    }

    /// Exchange every settable field with `other`.
    pub fn swap_with(
        &mut self,
        other: &mut Record,
    ) -> Result<(Vec<Change>, Vec<Change>), ModelError> {
        self.check_compatible(other)?;
        let mine = self.copy_step(other)?;
        let theirs = other.copy_step(self)?;
        Ok((self.commit(mine), other.commit(theirs)))
    }

    /// Return every settable field to its schema default.
    pub fn reset_to_defaults(&mut self) -> Result<Vec<Change>, ModelError> {
        let mut step = Vec::new();
        for (path, field) in self.fields() {
            let Some(schema) = &field.schema else { continue };
            if schema.read_only || field.value == schema.default {
                continue;
            }
            let default = schema.default.clone();
            step.push(self.prepare(&path, default, OutOfRangePolicy::Reject, false)?);
        }
        Ok(self.commit(step))
    }

    fn copy_step(&self, other: &Record) -> Result<Vec<Change>, ModelError> {
        let mut step = Vec::new();
        for (path, field) in self.fields() {
            if !field.is_settable() {
                continue;
            }
            let Some(theirs) = other.field(&path) else { continue };
            if !theirs.is_settable() || theirs.value == field.value {
                continue;
            }
            step.push(self.prepare(&path, theirs.value.clone(), OutOfRangePolicy::Reject, false)?);
        }
        Ok(step)
    }

    fn check_compatible(&self, other: &Record) -> Result<(), ModelError> {
        if self.kind() == other.kind() {
            Ok(())
        } else {
            Err(ModelError::Incompatible {
                detail: format!("{:?} record vs {:?} record", self.kind(), other.kind()),
            })
        }
    }

    /// Validate a change without applying it.
    fn prepare(
        &self,
        path: &AttrPath,
        value: Value,
        policy: OutOfRangePolicy,
        allow_read_only: bool,
    ) -> Result<Change, ModelError> {
        let (g, s, f) = self
            .locate(path)
            .ok_or_else(|| ModelError::NotFound { path: path.clone() })?;
        let field = &self.groups[g].sections[s].fields[f];
        let path = self.path_of(g, s, f);
        let Some(schema) = &field.schema else {
            return Err(ModelError::Unmapped { path });
        };
        if schema.read_only && !allow_read_only {
            return Err(ModelError::invalid(&path, ValidationError::ReadOnly));
        }
        let new = schema.coerce(value, policy).map_err(|e| ModelError::invalid(&path, e))?;
        Ok(Change {
            path,
            old: field.value.clone(),
            new,
        })
    }

    /// Apply a validated step and record it. No-op changes are dropped.
    fn commit(&mut self, step: Vec<Change>) -> Vec<Change> {
        let step: Vec<Change> = step.into_iter().filter(|c| c.old != c.new).collect();
        for change in &step {
            self.apply(change);
            tracing::debug!(
                path = %change.path,
                old = %change.old,
                new = %change.new,
                "change applied"
            );
        }
        self.history.push(step.clone());
        step
    }

    fn apply(&mut self, change: &Change) {
        if let Some((g, s, f)) = self.locate(&change.path) {
            self.groups[g].sections[s].fields[f].value = change.new.clone();
        }
    }

    /// Adopt written output as the new baseline.
    pub(crate) fn mark_saved(&mut self, baseline: Document, source: String) {
        for group in &mut self.groups {
            for section in &mut group.sections {
                for field in &mut section.fields {
                    if field.is_dirty() {
                        field.raw = field.encoded();
                        field.stored = field.value.clone();
                    }
                }
            }
        }
        self.baseline = baseline;
        self.source = source;
        self.history.clear();
    }

    fn group_index(&self, group: Option<&str>) -> Option<usize> {
        match group {
            None => (!self.groups.is_empty()).then_some(0),
            Some(tag) => self.groups.iter().position(|g| g.tag == tag),
        }
    }

    fn locate(&self, path: &AttrPath) -> Option<(usize, usize, usize)> {
        let g = self.group_index(path.group.as_deref())?;
        let s = self.groups[g].sections.iter().position(|s| s.path.name == path.section)?;
        let f = find_field(&self.groups[g].sections[s].fields, &path.attr)?;
        Some((g, s, f))
    }

    fn path_of(&self, g: usize, s: usize, f: usize) -> AttrPath {
        let group = &self.groups[g];
        let section = &group.sections[s];
        AttrPath {
            group: (g != 0).then(|| group.tag.clone()),
            section: section.path.name.clone(),
            attr: section.fields[f].key.clone(),
        }
    }
}

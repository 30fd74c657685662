//! Effect groups, banks, and slots.
//!
//! Each slot (`AA`..`DD`) has a header section whose type index selects the
//! active effect, and one parameter block per effect type it has stored
//! (`AA_LPF`, `AA_DELAY`, ...). Only the active block is live; the others
//! are kept as they are.

use rcforge_registry::{SectionShape, SlotCoord, ValidationError, Value};

use crate::error::ModelError;
use crate::history::Change;
use crate::path::AttrPath;
use crate::record::{Record, Section};

/// Header field holding the on/off switch.
pub const SWITCH_FIELD: &str = "sw";
/// Header field holding the effect-type index.
pub const TYPE_FIELD: &str = "fx_type";
/// Group setup field holding the selected bank.
pub const BANK_FIELD: &str = "current_slot";
/// Section holding the group setup.
pub const SETUP_SECTION: &str = "SETUP";

/// One effect slot of a group.
#[derive(Debug, Clone)]
pub struct FxSlot<'a> {
    /// Group tag (`ifx`, `tfx`).
    pub group: &'a str,
    /// Bank and slot letters.
    pub coord: SlotCoord,
    /// The slot header section.
    pub header: &'a Section,
    /// Switch state, if the header decoded.
    pub enabled: Option<bool>,
    /// Effect-type index, if the header decoded.
    pub type_index: Option<u32>,
    /// Effect-type name the index selects, if the table declares it.
    pub effect: Option<&'a str>,
    /// Parameter block of the active effect, if present.
    pub active: Option<&'a Section>,
    /// Every parameter block stored for the slot, in source order.
    pub blocks: Vec<&'a Section>,
}

impl FxSlot<'_> {
    /// Path to a parameter of the active effect.
    pub fn active_path(&self, attr: &str) -> Option<AttrPath> {
        let block = self.active?;
        Some(AttrPath::named(block.name(), attr).in_group(self.group))
    }
}

impl Record {
    /// Groups of the record that have an effect table.
    pub fn fx_groups(&self) -> Vec<&str> {
        self.groups()
            .iter()
            .map(|g| g.tag.as_str())
            .filter(|tag| self.registry().effect_table(tag).is_some())
            .collect()
    }

    /// All slots of `group`, bank-major.
    pub fn fx_slots(&self, group: &str) -> Vec<FxSlot<'_>> {
        let Some(g) = self.groups().iter().find(|g| g.tag == group) else {
            return Vec::new();
        };
        let mut slots = Vec::new();
        for header in &g.sections {
            let SectionShape::SlotHeader(coord) = header.path.shape() else { continue };
            let enabled = match header.get(SWITCH_FIELD) {
                Some(Value::Bool(b)) => Some(*b),
                _ => None,
            };
            let type_index = header
                .get(TYPE_FIELD)
                .and_then(Value::as_int)
                .and_then(|i| u32::try_from(i).ok());
            let effect = type_index.and_then(|i| self.registry().effect_name(&g.tag, i));
            let blocks: Vec<&Section> = g
                .sections
                .iter()
                .filter(|s| match s.path.shape() {
                    SectionShape::EffectBlock { coord: c, .. } => c == coord,
                    _ => false,
                })
                .collect();
            let active = effect.and_then(|name| {
                blocks.iter().copied().find(|s| match s.path.shape() {
                    SectionShape::EffectBlock { effect, .. } => effect.eq_ignore_ascii_case(name),
                    _ => false,
                })
            });
            slots.push(FxSlot {
                group: &g.tag,
                coord,
                header,
                enabled,
                type_index,
                effect,
                active,
                blocks,
            });
        }
        slots.sort_by_key(|s| s.coord);
        slots
    }

    /// One slot of `group`.
    pub fn fx_slot(&self, group: &str, coord: SlotCoord) -> Option<FxSlot<'_>> {
        self.fx_slots(group).into_iter().find(|s| s.coord == coord)
    }

    /// Bank currently selected in `group`'s setup.
    pub fn current_bank(&self, group: &str) -> Option<char> {
        let index = self.section(Some(group), SETUP_SECTION)?.get(BANK_FIELD)?.as_int()?;
        SlotCoord::BANKS.get(usize::try_from(index).ok()?).copied()
    }

    /// Select the effect type of a slot by name.
    ///
    /// Only the header's type index changes; the stored parameter blocks
    /// are left as they are.
    pub fn set_fx_type(
        &mut self,
        group: &str,
        coord: SlotCoord,
        effect: &str,
    ) -> Result<Change, ModelError> {
        let path = AttrPath::named(&coord.to_string(), TYPE_FIELD).in_group(group);
        let Some(index) = self.registry().effect_index(group, effect) else {
            let choices = self
                .registry()
                .effect_table(group)
                .map(|t| t.iter().map(|(_, n)| n).collect::<Vec<_>>().join(", "))
                .unwrap_or_default();
            return Err(ModelError::invalid(
                &path,
                ValidationError::NotAChoice {
                    value: effect.to_string(),
                    choices,
                },
            ));
        };
        self.set(&path, Value::Int(i64::from(index)))
    }

    /// Turn a slot on or off.
    pub fn set_fx_enabled(
        &mut self,
        group: &str,
        coord: SlotCoord,
        on: bool,
    ) -> Result<Change, ModelError> {
        let path = AttrPath::named(&coord.to_string(), SWITCH_FIELD).in_group(group);
        self.set(&path, Value::Bool(on))
    }
}

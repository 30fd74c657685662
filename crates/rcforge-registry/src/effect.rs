//! Effect-type schemas and per-group effect tables.
//!
//! Every effect slot stores one parameter block per effect type it has
//! ever been set to (`AA_LPF`, `AA_DELAY`, ...). The slot header's type
//! index, looked up in the group's [`EffectTable`], says which one is live.

use std::collections::BTreeMap;

use crate::field::FieldSchema;
use crate::section::FieldLayout;

/// Parameter layout of one effect algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTypeSchema {
    /// Effect-type name as it appears after the slot prefix, e.g. `DELAY`.
    pub name: String,
    /// Display label.
    pub label: Option<String>,
    /// Fields in positional order.
    pub layout: FieldLayout,
}

impl EffectTypeSchema {
    /// Create an effect schema. The name is stored upper-case.
    pub fn new(name: &str, fields: Vec<FieldSchema>) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            label: None,
            layout: FieldLayout::new(fields),
        }
    }
}

/// Mapping from a slot header's type index to an effect-type name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectTable {
    by_index: BTreeMap<u32, String>,
}

impl EffectTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` at `index`, returning the name it replaced.
    pub fn insert(&mut self, index: u32, name: &str) -> Option<String> {
        self.by_index.insert(index, name.to_ascii_uppercase())
    }

    /// Effect-type name for a type index.
    pub fn name(&self, index: u32) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    /// Type index for an effect-type name, case-insensitive.
    pub fn index(&self, name: &str) -> Option<u32> {
        self.by_index
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(i, _)| *i)
    }

    /// Highest declared index.
    pub fn max_index(&self) -> Option<u32> {
        self.by_index.keys().next_back().copied()
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.by_index.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_index.is_empty()
    }

    /// `(index, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.by_index.iter().map(|(i, n)| (*i, n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lookup_both_ways() {
        let mut table = EffectTable::new();
        table.insert(0, "LPF");
        table.insert(35, "delay");
        assert_eq!(table.name(35), Some("DELAY"));
        assert_eq!(table.index("Delay"), Some(35));
        assert_eq!(table.index("lpf"), Some(0));
        assert_eq!(table.name(1), None);
        assert_eq!(table.max_index(), Some(35));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_insert_reports_replaced() {
        let mut table = EffectTable::new();
        assert_eq!(table.insert(3, "A"), None);
        assert_eq!(table.insert(3, "B"), Some("A".to_string()));
    }

    #[test]
    fn test_effect_name_uppercased() {
        let e = EffectTypeSchema::new("beat_scatter", vec![FieldSchema::int("type")]);
        assert_eq!(e.name, "BEAT_SCATTER");
        assert_eq!(e.layout.len(), 1);
    }
}

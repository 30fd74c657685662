//! Attribute-level differences between records.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rcforge_registry::Value;

use crate::error::ModelError;
use crate::path::AttrPath;
use crate::record::Record;
use crate::resolver::Field;

/// One attribute whose value differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    /// Canonical attribute path.
    pub path: AttrPath,
    /// Value on the left side, `None` if absent there.
    pub old: Option<Value>,
    /// Value on the right side, `None` if absent there.
    pub new: Option<Value>,
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = |v: &Option<Value>| {
            v.as_ref()
                .map_or_else(|| "(absent)".to_string(), ToString::to_string)
        };
        write!(f, "{}: {} -> {}", self.path, side(&self.old), side(&self.new))
    }
}

/// Differences from `a` to `b`, in `a`'s field order followed by fields
/// only `b` has.
///
/// Unmapped fields are compared by their verbatim text.
pub fn diff(a: &Record, b: &Record) -> Vec<DiffEntry> {
    let theirs: HashMap<AttrPath, &Field> = b.fields().collect();
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for (path, field) in a.fields() {
        let other = theirs.get(&path);
        if other.is_none_or(|o| o.value != field.value) {
            entries.push(DiffEntry {
                path: path.clone(),
                old: Some(field.value.clone()),
                new: other.map(|o| o.value.clone()),
            });
        }
        seen.insert(path);
    }
    for (path, field) in b.fields() {
        if !seen.contains(&path) {
            entries.push(DiffEntry {
                path,
                old: None,
                new: Some(field.value.clone()),
            });
        }
    }
    entries
}

impl Record {
    /// Differences from `self` to `other`.
    pub fn diff(&self, other: &Record) -> Vec<DiffEntry> {
        diff(self, other)
    }

    /// Fields whose current value differs from the stored text.
    pub fn pending_changes(&self) -> Vec<DiffEntry> {
        self.fields()
            .filter(|(_, f)| f.is_dirty())
            .map(|(path, f)| DiffEntry {
                path,
                old: Some(f.stored.clone()),
                new: Some(f.value.clone()),
            })
            .collect()
    }

    /// Run `edit` on a copy and report what it would change.
    ///
    /// The record itself is untouched whether or not `edit` succeeds.
    pub fn dry_run<F>(&self, edit: F) -> Result<Vec<DiffEntry>, ModelError>
    where
        F: FnOnce(&mut Record) -> Result<(), ModelError>,
    {
        let mut scratch = self.clone();
        edit(&mut scratch)?;
        Ok(diff(self, &scratch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcforge_registry::{FieldSchema, SchemaRegistry, SectionIdentity, SectionSchema};
    use std::sync::Arc;

    fn unit(pan: &str) -> String {
        format!(
            "<database>\n<mem>\n<TRACK1>\n<A>0</A>\n<B>{pan}</B>\n<C>100</C>\n</TRACK1>\n</mem>\n</database>\n<count>0001</count>\n"
        )
    }

    fn registry() -> Arc<SchemaRegistry> {
        let mut r = SchemaRegistry::new();
        r.register_section(SectionSchema::new(
            "TRACK",
            SectionIdentity::Numbered {
                prefix: "TRACK".into(),
                first: 1,
                last: 6,
            },
            vec![
                FieldSchema::boolean("reverse"),
                FieldSchema::ranged("pan", 0, 100),
                FieldSchema::ranged("play_level", 0, 200),
            ],
        ));
        Arc::new(r)
    }

    #[test]
    fn test_diff_single_field() {
        let a = Record::decode(&unit("50"), registry()).unwrap();
        let b = Record::decode(&unit("75"), registry()).unwrap();
        let entries = a.diff(&b);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path.to_string(), "TRACK1.pan");
        assert_eq!(entries[0].old, Some(Value::Int(50)));
        assert_eq!(entries[0].new, Some(Value::Int(75)));
        assert_eq!(entries[0].to_string(), "TRACK1.pan: 50 -> 75");
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let a = Record::decode(&unit("50"), registry()).unwrap();
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn test_diff_absent_fields() {
        let a = Record::decode(&unit("50"), registry()).unwrap();
        let short = "<database>\n<mem>\n<TRACK1>\n<A>0</A>\n</TRACK1>\n</mem>\n</database>\n";
        let b = Record::decode(short, registry()).unwrap();
        let entries = a.diff(&b);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.new.is_none()));
        let back = b.diff(&a);
        assert!(back.iter().all(|e| e.old.is_none()));
    }

    #[test]
    fn test_dry_run_leaves_record() {
        let a = Record::decode(&unit("50"), registry()).unwrap();
        let pan = AttrPath::named("TRACK1", "pan");
        let entries = a
            .dry_run(|r| r.set(&pan, Value::Int(75)).map(|_| ()))
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(a.get(&pan), Some(&Value::Int(50)));
        assert!(a.dry_run(|r| r.set(&pan, Value::Int(500)).map(|_| ())).is_err());
    }

    #[test]
    fn test_pending_changes() {
        let mut a = Record::decode(&unit("50"), registry()).unwrap();
        let pan = AttrPath::named("TRACK1", "pan");
        a.set(&pan, Value::Int(60)).unwrap();
        a.set(&pan, Value::Int(75)).unwrap();
        let pending = a.pending_changes();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].old, Some(Value::Int(50)));
        assert_eq!(pending[0].new, Some(Value::Int(75)));
    }
}

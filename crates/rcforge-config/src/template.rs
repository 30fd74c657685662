//! Portable templates of record settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use rcforge_model::{AttrPath, Change, ModelError, Record};
use rcforge_registry::OutOfRangePolicy;

use crate::error::ConfigError;
use crate::paths::ensure_dir;

/// A named set of attribute values that can be applied to any record.
///
/// Values are stored as display text (`ON`, choice labels, plain numbers),
/// so a template stays readable and survives schema changes that keep the
/// field names.
///
/// # TOML Format
///
/// ```toml
/// name = "wide pan"
/// description = "Tracks 1 and 2 hard left and right"
///
/// [sections.TRACK1]
/// pan = "0"
///
/// [sections.TRACK2]
/// pan = "100"
///
/// [sections."ifx.AA_DELAY"]
/// time = "400"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    /// Name of the template.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Section label to attribute key to value text.
    #[serde(default)]
    pub sections: BTreeMap<String, BTreeMap<String, String>>,
}

/// What happened to one template entry.
#[derive(Debug)]
pub enum FieldOutcome {
    /// The record's value changed.
    Applied(Change),
    /// The record already held the value.
    Unchanged,
    /// The entry could not be applied; the record's value is as before.
    Failed(ModelError),
}

/// Per-entry outcomes of [`Template::apply`], in template order.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// `section.attr` key and its outcome.
    pub entries: Vec<(String, FieldOutcome)>,
}

impl ApplyReport {
    /// Number of entries that changed the record.
    pub fn applied(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, FieldOutcome::Applied(_)))
            .count()
    }

    /// Entries that failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ModelError)> {
        self.entries.iter().filter_map(|(key, o)| match o {
            FieldOutcome::Failed(e) => Some((key.as_str(), e)),
            _ => None,
        })
    }

    /// Whether no entry failed.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl Template {
    /// Create an empty template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sections: BTreeMap::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Capture every settable field of `record`.
    ///
    /// With a non-empty `filter`, only sections whose label (`TRACK1`,
    /// `ifx.AA_DELAY`) or schema name (`TRACK`, `DELAY`) matches an entry,
    /// ignoring case, are captured. Read-only and unmapped fields are never
    /// captured.
    pub fn capture(name: impl Into<String>, record: &Record, filter: &[&str]) -> Self {
        let mut template = Self::new(name);
        for (qualifier, section) in record.sections() {
            let label = match qualifier {
                Some(group) => format!("{group}.{}", section.name()),
                None => section.name().to_string(),
            };
            let selected = filter.is_empty()
                || filter.iter().any(|f| {
                    f.eq_ignore_ascii_case(&label)
                        || section.schema.as_deref().is_some_and(|s| f.eq_ignore_ascii_case(s))
                });
            if !selected {
                continue;
            }
            let attrs: BTreeMap<String, String> = section
                .fields
                .iter()
                .filter(|f| f.is_settable())
                .map(|f| (f.key.to_string(), f.describe()))
                .collect();
            if !attrs.is_empty() {
                template.sections.insert(label, attrs);
            }
        }
        template
    }

    /// Number of attribute entries.
    pub fn len(&self) -> usize {
        self.sections.values().map(BTreeMap::len).sum()
    }

    /// Check if the template has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry as its `section.attr` key, parsed path, and value text.
    pub fn entries(&self) -> impl Iterator<Item = (String, Result<AttrPath, ModelError>, &str)> {
        self.sections.iter().flat_map(|(section, attrs)| {
            attrs.iter().map(move |(attr, text)| {
                let key = format!("{section}.{attr}");
                let path = key.parse::<AttrPath>();
                (key, path, text.as_str())
            })
        })
    }

    /// Set every entry on `record`, each validated on its own.
    ///
    /// Entries that fail leave their field untouched and do not stop the
    /// rest. Each applied entry is its own undo step.
    pub fn apply(&self, record: &mut Record, policy: OutOfRangePolicy) -> ApplyReport {
        let mut report = ApplyReport::default();
        for (key, path, text) in self.entries() {
            let outcome = match path.and_then(|p| record.set_text_with_policy(&p, text, policy)) {
                Ok(change) if change.old == change.new => FieldOutcome::Unchanged,
                Ok(change) => FieldOutcome::Applied(change),
                Err(e) => FieldOutcome::Failed(e),
            };
            report.entries.push((key, outcome));
        }
        report
    }

    /// Load a template from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a template from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the template to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the template to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcforge_registry::Value;

    const UNIT: &str = "<database>
<mem>
<TRACK1>
<A>0</A>
<B>1</B>
<C>20</C>
<D>100</D>
</TRACK1>
<MASTER>
<A>100</A>
<B>0</B>
</MASTER>
</mem>
<ifx>
<AA_DELAY>
<A>400</A>
<B>20</B>
</AA_DELAY>
</ifx>
</database>
<count>0001</count>
";

    fn record() -> Record {
        Record::decode_builtin(UNIT).unwrap()
    }

    #[test]
    fn test_capture_all() {
        let t = Template::capture("all", &record(), &[]);
        assert_eq!(t.sections["TRACK1"]["pan"], "20");
        assert_eq!(t.sections["TRACK1"]["one_shot"], "ON");
        assert_eq!(t.sections["MASTER"]["level"], "100");
        assert_eq!(t.sections["MASTER"]["#1"], "0");
        assert_eq!(t.sections["ifx.AA_DELAY"]["time"], "400");
        assert_eq!(t.len(), 8);
    }

    #[test]
    fn test_capture_filtered_by_schema_and_label() {
        let t = Template::capture("fx", &record(), &["delay"]);
        assert_eq!(t.sections.keys().collect::<Vec<_>>(), ["ifx.AA_DELAY"]);
        let t = Template::capture("t1", &record(), &["TRACK1", "master"]);
        assert_eq!(t.sections.keys().collect::<Vec<_>>(), ["MASTER", "TRACK1"]);
    }

    #[test]
    fn test_apply_reports_each_entry() {
        let mut t = Template::new("mixed");
        t.sections.insert(
            "TRACK1".into(),
            BTreeMap::from([
                ("pan".into(), "80".into()),
                ("play_level".into(), "100".into()),
                ("reverse".into(), "maybe".into()),
            ]),
        );
        t.sections
            .insert("MASTER".into(), BTreeMap::from([("level".into(), "500".into())]));
        t.sections
            .insert("NOPE".into(), BTreeMap::from([("x".into(), "1".into())]));

        let mut r = record();
        let report = t.apply(&mut r, OutOfRangePolicy::Reject);
        assert_eq!(report.entries.len(), 5);
        assert_eq!(report.applied(), 1);
        let failed: Vec<&str> = report.failures().map(|(k, _)| k).collect();
        assert_eq!(failed, ["MASTER.level", "NOPE.x", "TRACK1.reverse"]);
        assert!(!report.is_clean());
        assert_eq!(r.get(&AttrPath::named("TRACK1", "pan")), Some(&Value::Int(80)));
        assert_eq!(r.get(&AttrPath::named("MASTER", "level")), Some(&Value::Int(100)));
    }

    #[test]
    fn test_apply_clamp_policy() {
        let mut t = Template::new("loud");
        t.sections
            .insert("MASTER".into(), BTreeMap::from([("level".into(), "500".into())]));
        let mut r = record();
        let report = t.apply(&mut r, OutOfRangePolicy::Clamp);
        assert!(report.is_clean());
        assert_eq!(r.get(&AttrPath::named("MASTER", "level")), Some(&Value::Int(200)));
    }

    #[test]
    fn test_capture_then_apply_is_unchanged() {
        let r = record();
        let t = Template::capture("same", &r, &[]);
        let mut copy = r.clone();
        let report = t.apply(&mut copy, OutOfRangePolicy::Reject);
        assert!(report.is_clean());
        assert_eq!(report.applied(), 0);
        assert!(!copy.is_modified());
    }

    #[test]
    fn test_toml_quotes_group_keys() {
        let t = Template::capture("fx", &record(), &["DELAY"]).with_description("delay only");
        let text = t.to_toml().unwrap();
        assert!(text.contains("[sections.\"ifx.AA_DELAY\"]"), "{text}");
        assert_eq!(Template::from_toml(&text).unwrap(), t);
    }

    #[test]
    fn test_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("templates").join("t.toml");
        let t = Template::capture("t", &record(), &["TRACK"]);
        t.save(&path).unwrap();
        assert_eq!(Template::load(&path).unwrap(), t);
        assert!(matches!(
            Template::load(dir.path().join("missing.toml")),
            Err(ConfigError::ReadFile { .. })
        ));
    }
}

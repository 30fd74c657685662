//! Attribute paths: `TRACK1.pan`, `ifx.AA_DELAY.time`, `SETUP.#3`.

use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The attribute part of a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    /// A field with a logical name.
    Name(String),
    /// A field without a name, by zero-based child ordinal (`#3`).
    Ordinal(usize),
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKey::Name(name) => f.write_str(name),
            AttrKey::Ordinal(n) => write!(f, "#{n}"),
        }
    }
}

/// Address of one attribute in a record.
///
/// Sections of the record's primary group need no group qualifier; others
/// do. Records normalize paths with [`Record::canonical`](crate::Record::canonical).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttrPath {
    /// Group tag, `None` for the primary group.
    pub group: Option<String>,
    /// Section tag, e.g. `TRACK1`.
    pub section: String,
    /// Field within the section.
    pub attr: AttrKey,
}

impl AttrPath {
    /// Path to a named field of a primary-group section.
    pub fn named(section: &str, attr: &str) -> Self {
        Self {
            group: None,
            section: section.to_string(),
            attr: AttrKey::Name(attr.to_string()),
        }
    }

    /// Qualify the path with a group.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// `section` or `group.section`.
    pub fn section_label(&self) -> String {
        section_label(self.group.as_deref(), &self.section)
    }
}

/// `section` or `group.section`.
pub(crate) fn section_label(group: Option<&str>, section: &str) -> String {
    match group {
        Some(group) => format!("{group}.{section}"),
        None => section.to_string(),
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(group) = &self.group {
            write!(f, "{group}.")?;
        }
        write!(f, "{}.{}", self.section, self.attr)
    }
}

impl FromStr for AttrPath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |reason| ModelError::BadPath {
            text: s.to_string(),
            reason,
        };
        let parts: Vec<&str> = s.split('.').collect();
        let (group, section, attr) = match parts.as_slice() {
            [section, attr] => (None, *section, *attr),
            [group, section, attr] => (Some(*group), *section, *attr),
            _ => return Err(bad("expected SECTION.ATTR or GROUP.SECTION.ATTR")),
        };
        if section.is_empty() || attr.is_empty() || group.is_some_and(str::is_empty) {
            return Err(bad("empty path component"));
        }
        let attr = match attr.strip_prefix('#') {
            Some(n) => AttrKey::Ordinal(
                n.parse()
                    .map_err(|_| bad("ordinal after '#' must be a number"))?,
            ),
            None => AttrKey::Name(attr.to_string()),
        };
        Ok(Self {
            group: group.map(str::to_string),
            section: section.to_string(),
            attr,
        })
    }
}

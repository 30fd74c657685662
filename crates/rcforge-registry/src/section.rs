//! Section schemas, identity rules, and section paths.

use std::fmt;

use crate::field::FieldSchema;

/// Ordered field list with precomputed ordinal offsets.
///
/// Shared by section schemas and effect-type schemas: both bind children
/// to fields by position only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldLayout {
    fields: Vec<FieldSchema>,
    starts: Vec<usize>,
    width: usize,
}

/// Result of looking up an ordinal in a [`FieldLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup<'a> {
    /// The ordinal falls inside a declared field.
    Declared {
        /// Index of the field within the layout.
        index: usize,
        /// The field.
        field: &'a FieldSchema,
        /// Position of the ordinal within the field's run (0 unless the field
        /// spans several children).
        offset: usize,
    },
    /// The ordinal lies past every declared field.
    Unknown,
}

impl FieldLayout {
    /// Build a layout from fields in positional order.
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        let mut starts = Vec::with_capacity(fields.len());
        let mut width = 0;
        for field in &fields {
            starts.push(width);
            width += field.width();
        }
        Self {
            fields,
            starts,
            width,
        }
    }

    /// Declared fields in positional order.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of positional children the declared fields span.
    pub fn width(&self) -> usize {
        self.width
    }

    /// First child ordinal of field `index`.
    pub fn start_of(&self, index: usize) -> Option<usize> {
        self.starts.get(index).copied()
    }

    /// Field covering child `ordinal`.
    pub fn lookup(&self, ordinal: usize) -> FieldLookup<'_> {
        if ordinal >= self.width {
            return FieldLookup::Unknown;
        }
        let index = self.starts.partition_point(|&s| s <= ordinal) - 1;
        FieldLookup::Declared {
            index,
            field: &self.fields[index],
            offset: ordinal - self.starts[index],
        }
    }

    /// Index of the field with logical name `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }
}

/// Bank and slot letters of a repeated effect unit, e.g. `AB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotCoord {
    /// Bank letter, `A`..=`D`.
    pub bank: char,
    /// Slot letter within the bank, `A`..=`D`.
    pub slot: char,
}

impl SlotCoord {
    /// Banks per effect group.
    pub const BANKS: [char; 4] = ['A', 'B', 'C', 'D'];

    /// Parse the two leading letters of a section name.
    pub fn parse_prefix(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        let bank = chars.next()?;
        let slot = chars.next()?;
        if Self::BANKS.contains(&bank) && Self::BANKS.contains(&slot) {
            Some(Self { bank, slot })
        } else {
            None
        }
    }

    /// All 16 coordinates, bank-major.
    pub fn all() -> impl Iterator<Item = SlotCoord> {
        Self::BANKS
            .into_iter()
            .flat_map(|bank| Self::BANKS.into_iter().map(move |slot| SlotCoord { bank, slot }))
    }
}

impl fmt::Display for SlotCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.bank, self.slot)
    }
}

/// Structural address of a section: its ancestors and its own tag.
///
/// This, not the tag text alone, is what the registry resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionPath {
    /// Ancestor tag identifiers, outermost first (e.g. `["database", "ifx"]`).
    pub ancestors: Vec<String>,
    /// The section's own tag identifier (e.g. `"AA_DELAY"`).
    pub name: String,
}

/// How a section name breaks down structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape<'a> {
    /// Slot header, e.g. `AB`.
    SlotHeader(SlotCoord),
    /// Effect block in a slot, e.g. `AB_DELAY`.
    EffectBlock {
        /// Slot coordinates.
        coord: SlotCoord,
        /// Effect-type name after the first `_`.
        effect: &'a str,
    },
    /// Anything else.
    Plain,
}

impl SectionPath {
    /// Create a path.
    pub fn new<I, S>(ancestors: I, name: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ancestors: ancestors.into_iter().map(Into::into).collect(),
            name: name.into(),
        }
    }

    /// The enclosing top-level group tag (`mem`, `ifx`, `tfx`, `sys`).
    pub fn group(&self) -> Option<&str> {
        self.ancestors.last().map(String::as_str)
    }

    /// Structural breakdown of the section name.
    pub fn shape(&self) -> SectionShape<'_> {
        let Some(coord) = SlotCoord::parse_prefix(&self.name) else {
            return SectionShape::Plain;
        };
        let rest = &self.name[2..];
        if rest.is_empty() {
            SectionShape::SlotHeader(coord)
        } else if let Some(effect) = rest.strip_prefix('_')
            && !effect.is_empty()
        {
            SectionShape::EffectBlock { coord, effect }
        } else {
            SectionShape::Plain
        }
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.ancestors {
            write!(f, "{a}/")?;
        }
        f.write_str(&self.name)
    }
}

/// Which section names a schema applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionIdentity {
    /// Exactly this name, e.g. `MASTER`.
    Fixed(String),
    /// `prefix` followed by a number in `first..=last`, e.g. `TRACK1`..`TRACK6`.
    Numbered {
        /// Name before the number.
        prefix: String,
        /// Lowest instance number.
        first: u32,
        /// Highest instance number.
        last: u32,
    },
    /// Any name starting with `prefix`, e.g. `ICTL1_TRACK1_FX`.
    Prefixed(String),
    /// A two-letter slot header, `AA`..`DD`.
    SlotHeader,
}

impl SectionIdentity {
    /// Whether `name` is an instance of this identity.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            SectionIdentity::Fixed(n) => n == name,
            SectionIdentity::Numbered {
                prefix,
                first,
                last,
            } => name
                .strip_prefix(prefix.as_str())
                .filter(|rest| !rest.is_empty() && !rest.starts_with('0'))
                .and_then(|rest| rest.parse::<u32>().ok())
                .is_some_and(|n| (*first..=*last).contains(&n)),
            SectionIdentity::Prefixed(prefix) => name.starts_with(prefix.as_str()),
            SectionIdentity::SlotHeader => {
                name.len() == 2 && SlotCoord::parse_prefix(name).is_some()
            }
        }
    }

    /// Instance names, when the identity has a finite set.
    pub fn instances(&self) -> Vec<String> {
        match self {
            SectionIdentity::Fixed(n) => vec![n.clone()],
            SectionIdentity::Numbered {
                prefix,
                first,
                last,
            } => (*first..=*last).map(|n| format!("{prefix}{n}")).collect(),
            SectionIdentity::SlotHeader => SlotCoord::all().map(|c| c.to_string()).collect(),
            SectionIdentity::Prefixed(_) => Vec::new(),
        }
    }
}

/// Schema of one section type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSchema {
    /// Family name, e.g. `TRACK`.
    pub name: String,
    /// Which section names the schema applies to.
    pub identity: SectionIdentity,
    /// Top-level groups the schema applies in; empty means any.
    pub groups: Vec<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Fields in positional order.
    pub layout: FieldLayout,
}

impl SectionSchema {
    /// Create a schema.
    pub fn new(
        name: impl Into<String>,
        identity: SectionIdentity,
        fields: Vec<FieldSchema>,
    ) -> Self {
        Self {
            name: name.into(),
            identity,
            groups: Vec::new(),
            description: None,
            layout: FieldLayout::new(fields),
        }
    }

    /// Restrict the schema to the given top-level groups.
    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the schema applies at `path`.
    pub fn applies_to(&self, path: &SectionPath) -> bool {
        let in_group = self.groups.is_empty()
            || path
                .group()
                .is_some_and(|g| self.groups.iter().any(|x| x == g));
        in_group && self.identity.matches(&path.name)
    }
}

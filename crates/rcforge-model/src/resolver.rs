//! Positional binding of section children to field schemas.
//!
//! The kth declared field binds to the next run of children (one child, or
//! `len` children for a character array). Tag text is never consulted.
//! Anything that cannot be bound to a declared field (extra children,
//! unknown sections, values that do not decode) becomes an unmapped field
//! holding its text verbatim, and a [`CoverageGap`] records why.

use std::fmt;

use rcforge_core::{NodeAddr, RawNode};
use rcforge_registry::{FieldLayout, FieldSchema, Value};

use crate::path::AttrKey;

/// One attribute of a section, bound to the child nodes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Name, or ordinal for unnamed and unmapped fields.
    pub key: AttrKey,
    /// Schema of the field; `None` when unmapped.
    pub schema: Option<FieldSchema>,
    /// Ordinal of the first child the field spans.
    pub ordinal: usize,
    /// Addresses of the child nodes, one per child of the run.
    pub addrs: Vec<NodeAddr>,
    /// Child texts as last read or written.
    pub raw: Vec<String>,
    /// Current value.
    pub value: Value,
    /// Value corresponding to `raw`.
    pub(crate) stored: Value,
}

impl Field {
    /// Whether the field has no schema.
    pub fn is_unmapped(&self) -> bool {
        self.schema.is_none()
    }

    /// Whether the field can be set through the normal write path.
    pub fn is_settable(&self) -> bool {
        self.schema.as_ref().is_some_and(|s| !s.read_only)
    }

    /// Whether the current value differs from what is stored in the text.
    pub fn is_dirty(&self) -> bool {
        self.value != self.stored
    }

    /// Human-readable rendering of the current value.
    pub fn describe(&self) -> String {
        match &self.schema {
            Some(schema) => schema.describe(&self.value),
            None => self.value.to_string(),
        }
    }

    /// Texts to write for the current value.
    pub(crate) fn encoded(&self) -> Vec<String> {
        if !self.is_dirty() {
            return self.raw.clone();
        }
        match &self.schema {
            Some(schema) => {
                let originals: Vec<&str> = self.raw.iter().map(String::as_str).collect();
                schema.encode(&self.value, &originals)
            }
            None => self.raw.clone(),
        }
    }

    fn unmapped(ordinal: usize, addr: NodeAddr, text: &str) -> Self {
        Self {
            key: AttrKey::Ordinal(ordinal),
            schema: None,
            ordinal,
            addrs: vec![addr],
            raw: vec![text.to_string()],
            value: Value::Opaque(text.to_string()),
            stored: Value::Opaque(text.to_string()),
        }
    }
}

/// Why part of a record is not covered by the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GapKind {
    /// No schema applies to the section.
    UnknownSection,
    /// The section has more children than its schema declares.
    ExtraChild,
    /// The child text does not decode under its declared field.
    Undecodable {
        /// The decoding failure.
        reason: String,
    },
    /// A child that should hold a value has children of its own.
    NotScalar,
}

/// A section or child that resolved to an unmapped placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    /// Section label (`TRACK1`, `ifx.AA_WARP`).
    pub section: String,
    /// Child ordinal, `None` for a whole section.
    pub ordinal: Option<usize>,
    /// What is missing.
    pub kind: GapKind,
}

impl fmt::Display for CoverageGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.section)?;
        if let Some(ordinal) = self.ordinal {
            write!(f, ".#{ordinal}")?;
        }
        match &self.kind {
            GapKind::UnknownSection => f.write_str(": no schema for section"),
            GapKind::ExtraChild => f.write_str(": child beyond declared fields"),
            GapKind::Undecodable { reason } => write!(f, ": {reason}"),
            GapKind::NotScalar => f.write_str(": expected a value, found nested elements"),
        }
    }
}

/// Binds the children of one section.
pub struct SectionResolver<'a> {
    label: &'a str,
    addr: &'a [usize],
    gaps: Vec<CoverageGap>,
}

impl<'a> SectionResolver<'a> {
    /// Resolver for the section labelled `label` at document address `addr`.
    pub fn new(label: &'a str, addr: &'a [usize]) -> Self {
        Self {
            label,
            addr,
            gaps: Vec::new(),
        }
    }

    /// Bind the children of `section` against `layout` (`None` when no schema
    /// applies), returning the fields and the gaps found.
    pub fn resolve(
        mut self,
        section: &RawNode,
        layout: Option<&FieldLayout>,
    ) -> (Vec<Field>, Vec<CoverageGap>) {
        let children = section.children();
        let mut fields = Vec::with_capacity(children.len());

        let Some(layout) = layout else {
            self.gap(None, GapKind::UnknownSection);
            for ordinal in 0..children.len() {
                self.bind_unmapped(children, ordinal, &mut fields, None);
            }
            return (fields, self.gaps);
        };

        let mut ordinal = 0;
        for field in layout.fields() {
            if ordinal >= children.len() {
                break;
            }
            let end = ordinal + field.width();
            if end > children.len() {
                let reason = format!(
                    "{} needs {} children, found {}",
                    field.display_name(),
                    field.width(),
                    children.len() - ordinal
                );
                for o in ordinal..children.len() {
                    let gap = GapKind::Undecodable {
                        reason: reason.clone(),
                    };
                    self.bind_unmapped(children, o, &mut fields, Some(gap));
                }
                ordinal = children.len();
                break;
            }
            self.bind_declared(children, ordinal, field, &mut fields);
            ordinal = end;
        }
        for o in ordinal..children.len() {
            self.bind_unmapped(children, o, &mut fields, Some(GapKind::ExtraChild));
        }
        (fields, self.gaps)
    }

    fn bind_declared(
        &mut self,
        children: &[RawNode],
        start: usize,
        schema: &FieldSchema,
        out: &mut Vec<Field>,
    ) {
        let run = &children[start..start + schema.width()];
        let texts: Option<Vec<&str>> = run.iter().map(RawNode::text).collect();
        let Some(texts) = texts else {
            for o in start..start + run.len() {
                self.bind_unmapped(children, o, out, Some(GapKind::NotScalar));
            }
            return;
        };
        match schema.decode(&texts) {
            Ok(value) => {
                let key = match &schema.name {
                    Some(name) => AttrKey::Name(name.clone()),
                    None => AttrKey::Ordinal(start),
                };
                out.push(Field {
                    key,
                    schema: Some(schema.clone()),
                    ordinal: start,
                    addrs: (start..start + run.len()).map(|o| self.child_addr(o)).collect(),
                    raw: texts.iter().map(|t| (*t).to_string()).collect(),
                    stored: value.clone(),
                    value,
                });
            }
            Err(e) => {
                let reason = format!("{}: {e}", schema.display_name());
                for o in start..start + run.len() {
                    let gap = GapKind::Undecodable {
                        reason: reason.clone(),
                    };
                    self.bind_unmapped(children, o, out, Some(gap));
                }
            }
        }
    }

    fn bind_unmapped(
        &mut self,
        children: &[RawNode],
        ordinal: usize,
        out: &mut Vec<Field>,
        gap: Option<GapKind>,
    ) {
        match children[ordinal].text() {
            Some(text) => {
                if let Some(kind) = gap {
                    self.gap(Some(ordinal), kind);
                }
                out.push(Field::unmapped(ordinal, self.child_addr(ordinal), text));
            }
            None => self.gap(Some(ordinal), GapKind::NotScalar),
        }
    }

    fn child_addr(&self, ordinal: usize) -> NodeAddr {
        let mut addr = self.addr.to_vec();
        addr.push(ordinal);
        addr
    }

    fn gap(&mut self, ordinal: Option<usize>, kind: GapKind) {
        let gap = CoverageGap {
            section: self.label.to_string(),
            ordinal,
            kind,
        };
        tracing::debug!(gap = %gap, "coverage gap");
        self.gaps.push(gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcforge_registry::{FieldKind, FieldLayout};

    fn section(texts: &[&str]) -> RawNode {
        RawNode::container(
            "TRACK1",
            texts
                .iter()
                .enumerate()
                .map(|(i, t)| RawNode::scalar(((b'A' + i as u8) as char).to_string(), *t))
                .collect(),
        )
    }

    fn pan_layout() -> FieldLayout {
        FieldLayout::new(vec![
            FieldSchema::boolean("reverse"),
            FieldSchema::ranged("pan", 0, 100),
            FieldSchema::ranged("play_level", 0, 200),
        ])
    }

    #[test]
    fn test_positional_binding() {
        let (fields, gaps) = SectionResolver::new("TRACK1", &[0, 0, 1])
            .resolve(&section(&["0", "50", "100"]), Some(&pan_layout()));
        assert!(gaps.is_empty());
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].value, Value::Bool(false));
        assert_eq!(fields[1].key, AttrKey::Name("pan".into()));
        assert_eq!(fields[1].value, Value::Int(50));
        assert_eq!(fields[1].addrs, vec![vec![0, 0, 1, 1]]);
        assert_eq!(fields[2].value, Value::Int(100));
    }

    #[test]
    fn test_tags_are_ignored() {
        // Same texts under arbitrary tags bind the same way.
        let node = RawNode::container(
            "TRACK1",
            vec![
                RawNode::scalar("#", "1"),
                RawNode::scalar("0", "25"),
                RawNode::scalar("Z", "7"),
            ],
        );
        let (fields, _) = SectionResolver::new("TRACK1", &[0]).resolve(&node, Some(&pan_layout()));
        assert_eq!(fields[0].value, Value::Bool(true));
        assert_eq!(fields[1].value, Value::Int(25));
    }

    #[test]
    fn test_extra_children_unmapped() {
        let (fields, gaps) = SectionResolver::new("TRACK1", &[0])
            .resolve(&section(&["0", "50", "100", "9"]), Some(&pan_layout()));
        assert_eq!(fields.len(), 4);
        assert!(fields[3].is_unmapped());
        assert_eq!(fields[3].value, Value::Opaque("9".into()));
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, GapKind::ExtraChild);
        assert_eq!(gaps[0].to_string(), "TRACK1.#3: child beyond declared fields");
    }

    #[test]
    fn test_fewer_children_absent() {
        let (fields, gaps) = SectionResolver::new("TRACK1", &[0])
            .resolve(&section(&["0"]), Some(&pan_layout()));
        assert_eq!(fields.len(), 1);
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_undecodable_becomes_gap() {
        let (fields, gaps) = SectionResolver::new("TRACK1", &[0])
            .resolve(&section(&["2", "150", "x"]), Some(&pan_layout()));
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(Field::is_unmapped));
        assert_eq!(gaps.len(), 3);
        assert!(gaps[1].to_string().contains("outside the allowed range"));
    }

    #[test]
    fn test_unknown_section() {
        let (fields, gaps) = SectionResolver::new("REC", &[0]).resolve(&section(&["1", "2"]), None);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].key, AttrKey::Ordinal(1));
        assert_eq!(gaps, vec![CoverageGap {
            section: "REC".into(),
            ordinal: None,
            kind: GapKind::UnknownSection,
        }]);
    }

    #[test]
    fn test_char_run() {
        let layout =
            FieldLayout::new(vec![FieldSchema::new(Some("name"), FieldKind::Chars { len: 4 })]);
        let (fields, gaps) = SectionResolver::new("NAME", &[0])
            .resolve(&section(&["72", "105", "32", "32"]), Some(&layout));
        assert!(gaps.is_empty());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, Value::Chars("Hi".into()));
        assert_eq!(fields[0].addrs.len(), 4);

        let (fields, gaps) = SectionResolver::new("NAME", &[0])
            .resolve(&section(&["72", "105"]), Some(&layout));
        assert_eq!(fields.len(), 2);
        assert_eq!(gaps.len(), 2);
    }

    #[test]
    fn test_encoded_keeps_clean_text() {
        let (mut fields, _) = SectionResolver::new("TRACK1", &[0])
            .resolve(&section(&["0", "050", "100"]), Some(&pan_layout()));
        assert_eq!(fields[1].encoded(), vec!["050".to_string()]);
        fields[1].value = Value::Int(75);
        assert_eq!(fields[1].encoded(), vec!["075".to_string()]);
    }
}

//! Integration tests for rcforge-core.
//!
//! Reads realistic memory and system units and checks that the raw tree
//! reflects the file and emits back unchanged.

use rcforge_core::{ParseError, RawNode, SaveCounter, parse_document};

const MEMORY_UNIT: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<database name=\"RC-505MK2\" revision=\"0\">
<mem id=\"0\">
\t<NAME>
\t\t<A>77</A>
\t\t<B>101</B>
\t\t<C>109</C>
\t\t<D>111</D>
\t</NAME>
\t<TRACK1>
\t\t<A>0</A>
\t\t<B>0</B>
\t\t<C>50</C>
\t\t<D>100</D>
\t</TRACK1>
\t<MASTER>
\t\t<A>100</A>
\t\t<B>0</B>
\t</MASTER>
</mem>
<ifx id=\"0\">
\t<AA>
\t\t<A>1</A>
\t\t<B>0</B>
\t\t<C>35</C>
\t\t<D>0</D>
\t</AA>
\t<AA_DELAY>
\t\t<A>0</A>
\t\t<B>20</B>
\t\t<C>50</C>
\t</AA_DELAY>
</ifx>
</database>
<count>0013</count>";

const SYSTEM_UNIT: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>
<database name=\"RC-505MK2\" revision=\"0\">
<sys>
<SETUP>
<0>1</0>
<#>0</#>
<A>5</A>
</SETUP>
</sys>
</database>
<count>0200</count>";

fn database(doc: &rcforge_core::Document) -> &RawNode {
    doc.body().map(|(_, n)| n).expect("database element")
}

#[test]
fn memory_unit_round_trips() {
    let doc = parse_document(MEMORY_UNIT).unwrap();
    assert_eq!(doc.emit(), MEMORY_UNIT);
}

#[test]
fn system_unit_round_trips() {
    let doc = parse_document(SYSTEM_UNIT).unwrap();
    assert_eq!(doc.emit(), SYSTEM_UNIT);
}

#[test]
fn memory_unit_structure() {
    let doc = parse_document(MEMORY_UNIT).unwrap();
    let db = database(&doc);
    assert_eq!(db.tag, "database");
    assert_eq!(db.attr("name"), Some("RC-505MK2"));

    let groups: Vec<_> = db.children().iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(groups, ["mem", "ifx"]);
    assert_eq!(db.children()[0].attr("id"), Some("0"));

    let mem = &db.children()[0];
    let sections: Vec<_> = mem.children().iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(sections, ["NAME", "TRACK1", "MASTER"]);

    let track = mem.child("TRACK1").unwrap();
    let values: Vec<_> = track.children().iter().filter_map(|n| n.text()).collect();
    assert_eq!(values, ["0", "0", "50", "100"]);
}

#[test]
fn same_tags_in_different_sections_are_separate_nodes() {
    let doc = parse_document(MEMORY_UNIT).unwrap();
    let db = database(&doc);
    let track = db.children()[0].child("TRACK1").unwrap();
    let delay = db.children()[1].child("AA_DELAY").unwrap();
    assert_eq!(track.children()[2].tag, "C");
    assert_eq!(delay.children()[2].tag, "C");
    assert_eq!(track.children()[2].text(), Some("50"));
    assert_eq!(delay.children()[2].text(), Some("50"));
}

#[test]
fn trailer_counter_increments() {
    let doc = parse_document(MEMORY_UNIT).unwrap();
    let (index, trailer) = doc.trailer().unwrap();
    assert_eq!(index, 1);
    assert_eq!(trailer.tag, "count");

    let counter = SaveCounter::parse(trailer.text().unwrap()).unwrap();
    assert_eq!(counter.value(), 13);
    assert_eq!(counter.next().unwrap().to_string(), "0014");
}

#[test]
fn replacing_one_scalar_changes_only_that_text() {
    let mut doc = parse_document(MEMORY_UNIT).unwrap();
    // database / mem / TRACK1 / C
    let old = doc.replace_scalar(&[0, 0, 1, 2], "75").unwrap();
    assert_eq!(old, "50");
    let out = doc.emit();
    assert_eq!(
        out,
        MEMORY_UNIT.replacen("\t\t<C>50</C>\n\t\t<D>100</D>", "\t\t<C>75</C>\n\t\t<D>100</D>", 1)
    );
}

#[test]
fn digit_and_symbol_tags_are_opaque() {
    let doc = parse_document(SYSTEM_UNIT).unwrap();
    let setup = database(&doc).children()[0].child("SETUP").unwrap();
    let tags: Vec<_> = setup.children().iter().map(|n| n.tag.as_str()).collect();
    assert_eq!(tags, ["0", "#", "A"]);
}

#[test]
fn truncated_unit_reports_position() {
    let cut = &MEMORY_UNIT[..MEMORY_UNIT.find("</ifx>").unwrap()];
    let err = parse_document(cut).unwrap_err();
    assert!(matches!(err, ParseError::UnclosedElement { ref tag, .. } if tag == "ifx"));
    let pos = err.position().unwrap();
    assert_eq!(pos.line, 21);
}

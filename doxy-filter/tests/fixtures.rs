//! Fixture files parse and render back unchanged

use doxy_filter::{DoxygenFilter, DoxygenWriter, LineBreak};
use rstest::rstest;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[rstest]
#[case("special_commands.h")]
#[case("lists_and_members.h")]
#[case("edge_cases.h")]
#[case("python_docs.py")]
fn test_fixture_round_trips(#[case] name: &str) {
    let path = fixture(name);
    let original = std::fs::read(&path).unwrap();
    let doc = DoxygenFilter::new().parse_path(&path).unwrap();
    assert!(doc.text_units().count() > 0, "{name} has no text units");
    assert_eq!(DoxygenWriter::new().write(&doc), original, "{name} changed");
}

#[rstest]
#[case("special_commands.h")]
#[case("python_docs.py")]
fn test_fixture_round_trips_with_crlf_and_bom(#[case] name: &str) {
    let text = std::fs::read_to_string(fixture(name)).unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(text.replace('\n', "\r\n").as_bytes());

    let doc = DoxygenFilter::new().parse_bytes(&bytes, name).unwrap();
    assert_eq!(doc.line_break, LineBreak::CrLf);
    assert!(doc.has_bom);
    assert_eq!(DoxygenWriter::new().write(&doc), bytes);
}

#[test]
fn test_translating_one_unit_leaves_the_rest_alone() {
    let path = fixture("special_commands.h");
    let original = std::fs::read_to_string(&path).unwrap();
    let mut doc = DoxygenFilter::new().parse_path(&path).unwrap();

    let id = doc
        .text_units()
        .find(|u| u.source.to_generic() == "Hides the widget.")
        .map(|u| u.id.clone())
        .unwrap();
    doc.apply_translations([(id.as_str(), "Cache le widget.")])
        .unwrap();

    let rendered = DoxygenWriter::new().render(&doc);
    assert_eq!(
        rendered,
        original.replace("/*! Hides the widget. */", "/*! Cache le widget. */")
    );
}

//! What comes out of the fixtures, and what stays in

use doxy_filter::{extract, DoxygenFilter, Event, FormatRegistry, TextUnit};
use std::path::PathBuf;

fn parse(name: &str) -> doxy_filter::Document {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    DoxygenFilter::new().parse_path(path).unwrap()
}

fn translatable(units: &[&TextUnit]) -> Vec<String> {
    units
        .iter()
        .filter(|u| u.translatable)
        .map(|u| u.source.to_generic())
        .collect()
}

#[test]
fn test_block_contents_are_not_translatable() {
    let doc = parse("special_commands.h");
    let units: Vec<&TextUnit> = doc.text_units().collect();
    let texts = translatable(&units);

    for raw in ["digraph widgets", "Client->Server", "Canvas c;"] {
        assert!(
            !texts.iter().any(|t| t.contains(raw)),
            "{raw} extracted as translatable"
        );
        assert!(
            units
                .iter()
                .any(|u| !u.translatable && u.source.render().contains(raw)),
            "{raw} missing from untranslatable units"
        );
    }
}

#[test]
fn test_prose_is_extracted() {
    let doc = parse("special_commands.h");
    let units: Vec<&TextUnit> = doc.text_units().collect();
    let texts = translatable(&units);

    for expected in [
        "Hides the widget.",
        "Canvases own their pixel buffer.",
        "Nothing else is needed.",
        "The nodes are clickable.",
        "Welcome to the guide.",
    ] {
        assert!(
            texts.iter().any(|t| t == expected),
            "{expected} not extracted"
        );
    }
}

#[test]
fn test_plain_comments_and_strings_are_ignored() {
    for name in [
        "special_commands.h",
        "lists_and_members.h",
        "edge_cases.h",
        "python_docs.py",
    ] {
        let doc = parse(name);
        for unit in doc.text_units() {
            let text = unit.source.render();
            for needle in [
                "plain comment",
                "not extracted",
                "never extracted",
                "inside a string",
                "also inside",
                "not a docstring",
                "not a comment",
                "banner",
                "fake",
                "nor this",
                "neither",
                "still a string",
            ] {
                assert!(
                    !text.contains(needle),
                    "{name}: {} contains {needle}",
                    unit.id
                );
            }
        }
    }
}

#[test]
fn test_member_comments_are_extracted() {
    let doc = parse("lists_and_members.h");
    let texts: Vec<String> = doc.text_units().map(|u| u.source.to_generic()).collect();
    assert!(texts.iter().any(|t| t == "horizontal position"));
    assert!(texts.iter().any(|t| t == "depth, kept for later"));
    assert!(texts.iter().any(|t| t == "After the strings."));
}

#[test]
fn test_python_docstrings_and_hash_blocks() {
    let doc = parse("python_docs.py");
    let texts: Vec<String> = doc.text_units().map(|u| u.source.to_generic()).collect();
    for expected in [
        "Computes the area of a circle.",
        "Constructor with a radius.",
        "Circles are defined by a radius.",
    ] {
        assert!(texts.iter().any(|t| t == expected), "{expected} missing");
    }
}

#[test]
fn test_smashed_parameter_keeps_next_line() {
    let doc = parse("edge_cases.h");
    let texts: Vec<String> = doc.text_units().map(|u| u.source.to_generic()).collect();
    assert!(texts.iter().any(|t| t == "The next line stays separate."));
}

#[test]
fn test_unbalanced_conditionals_keep_their_text() {
    let doc = parse("edge_cases.h");
    let texts: Vec<String> = doc.text_units().map(|u| u.source.plain_text()).collect();
    assert!(texts.iter().any(|t| t == "Text under an open condition."));
    assert!(texts.iter().any(|t| t == "Closing nothing."));
}

#[test]
fn test_unterminated_comment_still_parses() {
    let doc = parse("edge_cases.h");
    let last = doc.text_units().last().unwrap();
    assert!(last
        .source
        .plain_text()
        .starts_with("Unterminated comment at the end of the file."));
}

#[test]
fn test_events_bracket_every_group() {
    let doc = parse("lists_and_members.h");
    let events = doc.events();
    assert!(matches!(events.first(), Some(Event::StartDocument(_))));
    assert!(matches!(events.last(), Some(Event::EndDocument)));

    let starts = events
        .iter()
        .filter(|e| matches!(e, Event::StartGroup(_)))
        .count();
    let ends = events
        .iter()
        .filter(|e| matches!(e, Event::EndGroup(_)))
        .count();
    assert_eq!(starts, ends);
    assert_eq!(starts, doc.comments().count());
}

#[test]
fn test_extracted_listing() {
    let doc = DoxygenFilter::new().parse(
        "/**\n * Draws a <b>bold</b> line.\n *\n * \\code\n * line();\n * \\endcode\n */\n",
        doxy_filter::Syntax::C,
    );
    let units = extract(&doc, true);
    let listing = FormatRegistry::default().serialize(&units, "text").unwrap();
    insta::assert_snapshot!(listing.trim_end(), @r###"
    [tu1] (g1) Draws a {1}bold{2} line.
    [tu2] (g1) * line();
    "###);
}

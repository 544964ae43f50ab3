//! Property-based round trip tests
//!
//! Whatever the input, parsing and rendering with no targets must give it back unchanged.

use doxy_filter::{DoxygenFilter, DoxygenWriter, Syntax};
use proptest::prelude::*;

/// Lines that mix code, every comment opener and a sprinkling of commands
fn c_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ;(){}=0-9]{0,20}",
        "/// [a-zA-Z .,]{0,20}",
        "//! [a-zA-Z .]{0,20}",
        "int [a-z]{1,5}; ///< [a-z ]{0,12}",
        "/\\*\\* [a-zA-Z .]{0,20} \\*/",
        "/\\*! [a-zA-Z .]{0,20}",
        " \\* [a-zA-Z .]{0,20}",
        " \\*/",
        "// [a-z ]{0,12}",
        "/\\* [a-z ]{0,12} \\*/",
        "\"[a-z/* ]{0,10}\"",
        "/// \\\\(brief|param|code|endcode|if|endif|cond|endcond|a|c) [a-z ]{0,10}",
        "/// <(b|em)>[a-z]{0,6}</(b|em)>",
        "///  ?- [a-z ]{0,10}",
        "",
    ]
}

fn python_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,10} = [0-9]{1,3}",
        "## [a-zA-Z .]{0,20}",
        "#  [a-zA-Z .@]{0,20}",
        "# [a-z ]{0,12}",
        "    \"\"\"[a-zA-Z .]{0,20}\"\"\"",
        "    \"\"\"[a-zA-Z .]{0,20}",
        "def [a-z]{1,6}\\(\\):",
        "",
    ]
}

fn source_strategy(lines: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (prop::collection::vec(lines, 0..12), any::<bool>()).prop_map(|(lines, trailing)| {
        let mut source = lines.join("\n");
        if trailing {
            source.push('\n');
        }
        source
    })
}

proptest! {
    #[test]
    fn c_sources_round_trip(source in source_strategy(c_line_strategy())) {
        let doc = DoxygenFilter::new().parse(&source, Syntax::C);
        prop_assert_eq!(DoxygenWriter::new().render(&doc), source);
    }

    #[test]
    fn python_sources_round_trip(source in source_strategy(python_line_strategy())) {
        let doc = DoxygenFilter::new().parse(&source, Syntax::Python);
        prop_assert_eq!(DoxygenWriter::new().render(&doc), source);
    }

    #[test]
    fn arbitrary_text_round_trips(source in "[ -~\n\t]{0,200}") {
        let doc = DoxygenFilter::new().parse(&source, Syntax::C);
        prop_assert_eq!(DoxygenWriter::new().render(&doc), source);
    }

    #[test]
    fn unit_ids_are_sequential(source in source_strategy(c_line_strategy())) {
        let doc = DoxygenFilter::new().parse(&source, Syntax::C);
        let ids: Vec<String> = doc.text_units().map(|u| u.id.clone()).collect();
        let expected: Vec<String> = (1..=ids.len()).map(|n| format!("tu{n}")).collect();
        prop_assert_eq!(ids, expected);
    }
}

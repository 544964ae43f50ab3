//! Warnings logged while segmenting, captured through a tracing subscriber

use doxy_filter::{DoxygenFilter, Syntax};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Shared buffer the fmt layer writes into
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Run `f` with warnings routed into a buffer and return what was logged
fn warnings(f: impl FnOnce()) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    captured.text()
}

fn parse_fixture(name: &str) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    DoxygenFilter::new().parse_path(path).unwrap();
}

#[test]
fn test_balanced_fixture_logs_no_stack_warnings() {
    let logged = warnings(|| parse_fixture("special_commands.h"));
    assert!(!logged.contains("not closed"), "{logged}");
    assert!(!logged.contains("orphaned"), "{logged}");
}

#[test]
fn test_edge_cases_log_orphans_and_open_conditions() {
    let logged = warnings(|| parse_fixture("edge_cases.h"));
    assert!(logged.contains("orphaned end command"), "{logged}");
    assert!(logged.contains("command=endcode"), "{logged}");
    assert!(logged.contains("command=endcond"), "{logged}");
    assert!(
        logged.contains("command not closed by end of document"),
        "{logged}"
    );
    assert!(logged.contains("command=if"), "{logged}");
    assert!(
        logged.contains("unterminated doc comment runs to end of input"),
        "{logged}"
    );
}

#[test]
fn test_conditionals_across_blocks() {
    let balanced = warnings(|| {
        DoxygenFilter::new().parse(
            "/** \\if GPU\n *  Fast.\n */\nint x;\n/** \\endif */\n",
            Syntax::C,
        );
    });
    assert!(balanced.is_empty(), "{balanced}");

    let unbalanced = warnings(|| {
        DoxygenFilter::new().parse("/** \\if GPU Fast. */\n", Syntax::C);
    });
    assert!(
        unbalanced.contains("command not closed by end of document"),
        "{unbalanced}"
    );
}

#[test]
fn test_block_pair_left_open() {
    let logged = warnings(|| {
        DoxygenFilter::new().parse("/** \\code\n * x = 1;\n */\n", Syntax::C);
    });
    assert!(logged.contains("command not closed"), "{logged}");
    assert!(logged.contains("command=code"), "{logged}");
}

#[test]
fn test_unknown_command_is_reported() {
    let logged = warnings(|| {
        DoxygenFilter::new().parse("/// Uses \\frobnicate here.\n", Syntax::C);
    });
    assert!(logged.contains("unknown command kept as text"), "{logged}");
}

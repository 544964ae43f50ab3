//! Command matching
//!
//! Splits a comment body into plain text and command occurrences. Three families of commands
//! are recognised, plus any custom patterns from configuration:
//!
//! - Doxygen commands introduced by `\` or `@`
//! - HTML/XML tags
//! - list markers at the start of a line
//!
//! Matching is purely lexical. Whether a command is known, and what it does, is decided later
//! against the [super::CommandTable].

use crate::error::{FilterError, FilterResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static DOXYGEN_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"[\\@](f[$\[\]{}()]|[a-zA-Z]+|~[a-zA-Z]*|---|--|::|[\\@&$#<>%".=|{}])(?:\[[^\]\n]*\])?(?:\{[^}\n]*\})?"#,
    )
    .expect("valid regex")
});

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)(?:\s[^<>]*)?/?>").expect("valid regex"));

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:-#|[-+*]|\d+\.)[ \t]+").expect("valid regex"));

/// Table key shared by all list markers
pub const LIST_ITEM: &str = "list-item";

/// Which recogniser produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Custom(usize),
    Doxygen,
    Html,
    ListMarker,
}

impl MatchKind {
    fn priority(&self) -> usize {
        match self {
            MatchKind::Custom(_) => 0,
            MatchKind::Doxygen => 1,
            MatchKind::Html => 2,
            MatchKind::ListMarker => 3,
        }
    }
}

/// One command occurrence in a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    pub kind: MatchKind,
    /// Byte range of the whole command text, suffixes included
    pub range: Range<usize>,
    /// Key to look the command up with
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Text(Range<usize>),
    Command(CommandMatch),
}

/// Splits bodies into text and commands
#[derive(Debug, Clone, Default)]
pub struct CommandMatcher {
    custom: Vec<(Regex, String)>,
}

impl CommandMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom command: `pattern` matches the command text, `key` names its definition
    pub fn add_custom(&mut self, pattern: &str, key: impl Into<String>) -> FilterResult<()> {
        let key = key.into();
        let re = Regex::new(pattern).map_err(|e| FilterError::InvalidCommand {
            name: key.clone(),
            reason: e.to_string(),
        })?;
        self.custom.push((re, key));
        Ok(())
    }

    /// Split `body` into an ordered, gap-free sequence of pieces
    pub fn split(&self, body: &str) -> Vec<Piece> {
        let mut pieces = Vec::new();
        let mut pos = 0;

        while pos < body.len() {
            let Some(found) = self.next_match(body, pos) else {
                break;
            };
            if found.range.start > pos {
                pieces.push(Piece::Text(pos..found.range.start));
            }
            pos = found.range.end;
            pieces.push(Piece::Command(found));
        }

        if pos < body.len() {
            pieces.push(Piece::Text(pos..body.len()));
        }
        pieces
    }

    fn next_match(&self, body: &str, pos: usize) -> Option<CommandMatch> {
        let mut candidates: Vec<CommandMatch> = Vec::with_capacity(self.custom.len() + 3);

        for (index, (re, key)) in self.custom.iter().enumerate() {
            if let Some(m) = find_nonempty(re, body, pos) {
                candidates.push(CommandMatch {
                    kind: MatchKind::Custom(index),
                    range: m,
                    key: key.clone(),
                });
            }
        }
        if let Some(m) = find_doxygen(body, pos) {
            candidates.push(m);
        }
        if let Some(caps) = HTML_TAG.captures_at(body, pos) {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or(pos..pos);
            let slash = caps.get(1).map_or("", |m| m.as_str());
            let name = caps.get(2).map_or("", |m| m.as_str()).to_ascii_lowercase();
            candidates.push(CommandMatch {
                kind: MatchKind::Html,
                range: whole,
                key: format!("<{}{}>", slash, name),
            });
        }
        if let Some(m) = find_nonempty(&LIST_MARKER, body, pos) {
            candidates.push(CommandMatch {
                kind: MatchKind::ListMarker,
                range: m,
                key: LIST_ITEM.to_string(),
            });
        }

        candidates
            .into_iter()
            .min_by_key(|c| (c.range.start, c.kind.priority()))
    }
}

fn find_nonempty(re: &Regex, body: &str, pos: usize) -> Option<Range<usize>> {
    re.find_at(body, pos)
        .map(|m| m.range())
        .filter(|r| !r.is_empty())
}

/// Next `\cmd` or `@cmd` at or after `pos`
///
/// An `@` glued to a preceding word is part of an address such as `user@example.com`. A glued
/// `\` still starts a command, so `mc^2\f$` and `100\%` close formulas and escape as usual.
fn find_doxygen(body: &str, mut pos: usize) -> Option<CommandMatch> {
    while let Some(caps) = DOXYGEN_COMMAND.captures_at(body, pos) {
        let whole = caps.get(0)?.range();
        let glued = body[whole.start..].starts_with('@')
            && body[..whole.start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        if glued {
            // Leader is always one ASCII byte
            pos = whole.start + 1;
            continue;
        }
        let name = caps.get(1)?.as_str();
        let key = if name.starts_with('~') { "~" } else { name };
        return Some(CommandMatch {
            kind: MatchKind::Doxygen,
            range: whole,
            key: key.to_string(),
        });
    }
    None
}

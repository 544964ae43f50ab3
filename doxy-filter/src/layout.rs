//! Comment layout
//!
//!     Turns scanner segments into document parts. Runs of line comments on consecutive lines are
//!     merged into one [CommentBlock], and every comment line is split into a decoration prefix
//!     (indentation, markers, star leaders, and for line groups any code before the marker) and
//!     the text Doxygen would see. The texts joined with `\n` form the block body that commands
//!     are parsed against.
//!
//!     Rendering puts prefixes and texts back together, so an untouched block reproduces its
//!     source exactly. A rewritten body may have a different number of lines: extra lines take
//!     the block's continuation prefix and missing lines keep their prefix with empty text.

use crate::resource::{Part, TextUnit};
use crate::scanning::{BlockComment, LineComment, LineMarker, Segment};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static STAR_LEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*\*+[ \t]?").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// `///` or `//!` lines
    Line,
    /// `##` lines
    Hash,
    /// `/** ... */`
    Block,
    /// `"""..."""`
    Docstring,
}

/// One physical line of a comment: decoration and text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    pub prefix: String,
    pub text: String,
}

/// A doc comment with its decoration separated from its body
#[derive(Debug, Clone, PartialEq)]
pub struct CommentBlock {
    /// Group id (`g1`, `g2`, ...), assigned when the block is segmented
    pub id: String,
    pub style: CommentStyle,
    pub member: bool,
    pub opener: String,
    pub lines: Vec<CommentLine>,
    pub closer: String,
    /// Prefix for lines added beyond the original line count
    pub continuation: String,
    pub units: Vec<TextUnit>,
}

impl CommentBlock {
    /// Comment text without decoration
    pub fn body(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The comment exactly as it appeared in the source
    pub fn render(&self) -> String {
        self.render_body(&self.body())
    }

    /// Decorate `body` with this block's prefixes, opener and closer
    pub fn render_body(&self, body: &str) -> String {
        let texts: Vec<&str> = body.split('\n').collect();
        let count = texts.len().max(self.lines.len());

        // The blank line holding the closer stays last
        let (head, tail) = match self.lines.split_last() {
            Some((last, head)) if !head.is_empty() && last.text.is_empty() && !self.closer.is_empty() => {
                (head, Some(last))
            }
            _ => (self.lines.as_slice(), None),
        };
        let mut prefixes: Vec<(&str, &str)> = (0..count - usize::from(tail.is_some()))
            .map(|k| {
                head.get(k)
                    .map_or((self.continuation.as_str(), ""), |l| (l.prefix.as_str(), self.lead(l)))
            })
            .collect();
        if let Some(last) = tail {
            prefixes.push((&last.prefix, self.lead(last)));
        }

        let mut out = String::with_capacity(body.len() + self.opener.len() + self.closer.len());
        out.push_str(&self.opener);
        for (k, (prefix, lead)) in prefixes.iter().enumerate() {
            if k > 0 {
                out.push('\n');
            }
            out.push_str(prefix);
            let text = texts.get(k).copied().unwrap_or("");
            if !text.is_empty() && !text.starts_with([' ', '\t']) {
                out.push_str(lead);
            }
            out.push_str(text);
        }
        out.push_str(&self.closer);
        out
    }

    /// Blank a line group keeps after a reused marker when the new text lacks one
    fn lead<'a>(&self, line: &'a CommentLine) -> &'a str {
        match self.style {
            CommentStyle::Line | CommentStyle::Hash => leading_blanks(&line.text),
            CommentStyle::Block | CommentStyle::Docstring => "",
        }
    }
}

/// Group and decorate comment segments into document parts
pub fn build_parts(source: &str, segments: &[Segment]) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut code = String::new();
    let mut i = 0;

    while i < segments.len() {
        match &segments[i] {
            Segment::Code(range) => {
                code.push_str(&source[range.clone()]);
                i += 1;
            }
            Segment::Line(line) if line.kind == LineMarker::Hash => {
                // A plain `#` comment that does not continue a `##` group
                code.push_str(&source[line.marker.start..line.text.end]);
                i += 1;
            }
            Segment::Line(first) => {
                flush_code(&mut parts, &mut code);
                let mut group = LineGroup::start(source, first);
                i += 1;
                while let (Some(Segment::Code(sep)), Some(Segment::Line(next))) =
                    (segments.get(i), segments.get(i + 1))
                {
                    let Some(lead) = source[sep.clone()].strip_prefix('\n') else {
                        break;
                    };
                    if !group.accepts(next, lead) {
                        break;
                    }
                    group.push(source, next, lead);
                    i += 2;
                }
                parts.push(Part::Comment(group.finish()));
            }
            Segment::Block(block) => {
                flush_code(&mut parts, &mut code);
                parts.push(Part::Comment(decorate_block(source, block)));
                i += 1;
            }
        }
    }
    flush_code(&mut parts, &mut code);
    parts
}

fn flush_code(parts: &mut Vec<Part>, code: &mut String) {
    if !code.is_empty() {
        parts.push(Part::Code(std::mem::take(code)));
    }
}

fn is_blank(s: &str) -> bool {
    s.chars().all(|c| c == ' ' || c == '\t')
}

fn leading_blanks(s: &str) -> &str {
    let end = s.len() - s.trim_start_matches([' ', '\t']).len();
    &s[..end]
}

/// Consecutive line comments being merged
struct LineGroup {
    kind: LineMarker,
    member: bool,
    lines: Vec<CommentLine>,
    /// Indentation of the last line, for the continuation prefix
    indent: String,
    marker: String,
}

impl LineGroup {
    fn start(source: &str, line: &LineComment) -> Self {
        let before = &source[..line.marker.start];
        let lead = before.rsplit('\n').next().unwrap_or("");
        let marker = source[line.marker.clone()].to_string();
        LineGroup {
            kind: line.kind,
            member: line.member,
            lines: vec![CommentLine {
                prefix: marker.clone(),
                text: source[line.text.clone()].to_string(),
            }],
            indent: leading_blanks(lead).to_string(),
            marker,
        }
    }

    fn accepts(&self, next: &LineComment, lead: &str) -> bool {
        if lead.contains('\n') || next.member != self.member {
            return false;
        }
        let same_kind = next.kind == self.kind
            || (self.kind == LineMarker::DoubleHash && next.kind == LineMarker::Hash);
        if !same_kind {
            return false;
        }
        if self.member || next.kind == LineMarker::Hash {
            return is_blank(lead);
        }
        true
    }

    fn push(&mut self, source: &str, next: &LineComment, lead: &str) {
        self.marker = source[next.marker.clone()].to_string();
        self.indent = leading_blanks(lead).to_string();
        self.lines.push(CommentLine {
            prefix: format!("{}{}", lead, self.marker),
            text: source[next.text.clone()].to_string(),
        });
    }

    fn finish(self) -> CommentBlock {
        let spaced = self
            .lines
            .last()
            .is_some_and(|l| l.text.starts_with(' '));
        let continuation = format!(
            "{}{}{}",
            self.indent,
            self.marker,
            if spaced { " " } else { "" }
        );
        let style = match self.kind {
            LineMarker::DoubleHash | LineMarker::Hash => CommentStyle::Hash,
            LineMarker::Slashes | LineMarker::Bang => CommentStyle::Line,
        };
        CommentBlock {
            id: String::new(),
            style,
            member: self.member,
            opener: String::new(),
            lines: self.lines,
            closer: String::new(),
            continuation,
            units: Vec::new(),
        }
    }
}

/// Split a delimited comment into decoration and text
fn decorate_block(source: &str, block: &BlockComment) -> CommentBlock {
    let inner = &source[block.inner.clone()];
    let raw: Vec<&str> = inner.split('\n').collect();
    let starred = |line: &str| !block.docstring && STAR_LEADER.is_match(line);

    let indent = raw
        .iter()
        .skip(1)
        .copied()
        .filter(|l| !is_blank(l) && !starred(l))
        .map(|l| leading_blanks(l).len())
        .min()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(raw.len());
    let mut continuation: Option<String> = None;
    for (k, line) in raw.iter().enumerate() {
        let (prefix, text) = if k == 0 {
            ("", *line)
        } else if is_blank(line) {
            (*line, "")
        } else if let Some(m) = STAR_LEADER.find(line).filter(|_| !block.docstring) {
            line.split_at(m.end())
        } else {
            line.split_at(indent)
        };
        if k > 0 && !is_blank(line) && continuation.is_none() {
            continuation = Some(prefix.to_string());
        }
        lines.push(CommentLine {
            prefix: prefix.to_string(),
            text: text.to_string(),
        });
    }

    CommentBlock {
        id: String::new(),
        style: if block.docstring {
            CommentStyle::Docstring
        } else {
            CommentStyle::Block
        },
        member: block.member,
        opener: source[block.opener.clone()].to_string(),
        lines,
        closer: source[block.closer.clone()].to_string(),
        continuation: continuation.unwrap_or_default(),
        units: Vec::new(),
    }
}

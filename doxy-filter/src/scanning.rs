//! Comment discovery
//!
//!     The scanner walks the token stream from [crate::lexing] and partitions the source into code
//!     and doc comments. Strings, character literals and plain comments are code: anything that
//!     looks like a doc comment inside them is left alone. The partition is exact, so joining the
//!     segments back together gives the original text.
//!
//!     Grouping consecutive line comments and stripping decoration is done later, in
//!     [crate::layout]. The scanner only finds where each comment starts and stops.

use crate::decoding::Syntax;
use crate::lexing::{tokenize, Token};
use std::ops::Range;
use tracing::warn;

/// Marker that opened a line comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMarker {
    /// `///`
    Slashes,
    /// `//!`
    Bang,
    /// `##`
    DoubleHash,
    /// `#`, only extracted when it continues a `##` group
    Hash,
}

/// A single-line comment: marker plus the text up to (not including) the newline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineComment {
    pub marker: Range<usize>,
    pub text: Range<usize>,
    pub kind: LineMarker,
    pub member: bool,
}

/// A delimited comment: `/** ... */` or a docstring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComment {
    pub opener: Range<usize>,
    pub inner: Range<usize>,
    /// Empty when the comment runs to end of input
    pub closer: Range<usize>,
    pub member: bool,
    pub docstring: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Code(Range<usize>),
    Line(LineComment),
    Block(BlockComment),
}

impl Segment {
    pub fn span(&self) -> Range<usize> {
        match self {
            Segment::Code(r) => r.clone(),
            Segment::Line(l) => l.marker.start..l.text.end,
            Segment::Block(b) => b.opener.start..b.closer.end.max(b.inner.end),
        }
    }
}

/// Partition `source` into code and comment segments
pub fn scan(source: &str, syntax: Syntax) -> Vec<Segment> {
    let mut scanner = Scanner {
        source,
        tokens: tokenize(source),
        segments: Vec::new(),
        code_start: 0,
    };
    match syntax {
        Syntax::C => scanner.scan_c(),
        Syntax::Python => scanner.scan_python(),
    }
    scanner.finish()
}

struct Scanner<'a> {
    source: &'a str,
    tokens: Vec<(Token, Range<usize>)>,
    segments: Vec<Segment>,
    /// Start of the code run not yet pushed
    code_start: usize,
}

impl<'a> Scanner<'a> {
    fn kind(&self, i: usize) -> Option<Token> {
        self.tokens.get(i).map(|(t, _)| *t)
    }

    fn start(&self, i: usize) -> usize {
        self.tokens
            .get(i)
            .map_or(self.source.len(), |(_, span)| span.start)
    }

    fn end(&self, i: usize) -> usize {
        self.tokens
            .get(i)
            .map_or(self.source.len(), |(_, span)| span.end)
    }

    fn text(&self, i: usize) -> &'a str {
        let source = self.source;
        self.tokens
            .get(i)
            .map_or("", |(_, span)| &source[span.clone()])
    }

    fn byte_after(&self, i: usize) -> Option<u8> {
        self.source.as_bytes().get(self.end(i)).copied()
    }

    /// Index of the next newline token at or after `i`, or the token count
    fn line_end(&self, mut i: usize) -> usize {
        while i < self.tokens.len() && self.kind(i) != Some(Token::Newline) {
            i += 1;
        }
        i
    }

    fn find(&self, mut i: usize, token: Token) -> Option<usize> {
        while i < self.tokens.len() {
            if self.kind(i) == Some(token) {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    /// Index after the `*/` closing the comment opened at `i`
    fn skip_block(&self, i: usize) -> usize {
        self.find(i + 1, Token::BlockEnd)
            .map_or(self.tokens.len(), |e| e + 1)
    }

    fn push_code_until(&mut self, end: usize) {
        if end > self.code_start {
            let start = self.code_start;
            match self.segments.last_mut() {
                Some(Segment::Code(prev)) if prev.end == start => prev.end = end,
                _ => self.segments.push(Segment::Code(start..end)),
            }
        }
    }

    fn push_comment(&mut self, segment: Segment) {
        let span = segment.span();
        self.push_code_until(span.start);
        self.segments.push(segment);
        self.code_start = span.end;
    }

    fn finish(mut self) -> Vec<Segment> {
        self.push_code_until(self.source.len());
        self.segments
    }

    /// Skip a string literal opened by the token before `i`; returns the index after it
    fn skip_string(&self, mut i: usize, quote: u8) -> usize {
        while let Some(token) = self.kind(i) {
            match token {
                Token::Backslash => i += 2,
                Token::Newline => return i,
                Token::DoubleQuote | Token::SingleQuote | Token::TripleQuote
                    if self.text(i).as_bytes()[0] == quote =>
                {
                    // A triple quote closes the string and leaves an empty one behind
                    return i + 1;
                }
                _ => i += 1,
            }
        }
        i
    }

    fn line_comment(&mut self, i: usize, kind: LineMarker, member: bool) -> usize {
        let end = self.line_end(i + 1);
        let marker = self.start(i)..self.end(i);
        let text = marker.end..self.start(end);
        self.push_comment(Segment::Line(LineComment {
            marker,
            text,
            kind,
            member,
        }));
        end
    }

    fn scan_c(&mut self) {
        let mut i = 0;
        while let Some(token) = self.kind(i) {
            i = match token {
                Token::DoubleQuote | Token::SingleQuote | Token::TripleQuote => {
                    let quote = self.text(i).as_bytes()[0];
                    self.skip_string(i + 1, quote)
                }
                Token::Backslash => i + 2,
                Token::LineComment => self.line_end(i + 1),
                Token::BlockComment => self.skip_block(i),
                Token::LineDoc => {
                    if self.text(i) == "///" && self.byte_after(i) == Some(b'/') {
                        // `////` banner
                        self.line_end(i + 1)
                    } else {
                        let kind = if self.text(i) == "//!" {
                            LineMarker::Bang
                        } else {
                            LineMarker::Slashes
                        };
                        self.line_comment(i, kind, false)
                    }
                }
                Token::MemberLineDoc => {
                    let kind = if self.text(i).starts_with("//!") {
                        LineMarker::Bang
                    } else {
                        LineMarker::Slashes
                    };
                    self.line_comment(i, kind, true)
                }
                Token::BlockDoc if self.text(i) == "/**" && self.byte_after(i) == Some(b'/') => {
                    // `/**/`
                    i + 2
                }
                Token::BlockDoc if self.text(i) == "/**" && self.byte_after(i) == Some(b'*') => {
                    // `/***...` banner
                    self.skip_block(i)
                }
                Token::BlockDoc => self.block_comment(i, false),
                Token::MemberBlockDoc => self.block_comment(i, true),
                _ => i + 1,
            };
        }
    }

    fn block_comment(&mut self, i: usize, member: bool) -> usize {
        let opener = self.start(i)..self.end(i);
        let (inner, closer, next) = match self.find(i + 1, Token::BlockEnd) {
            Some(e) => (
                opener.end..self.start(e),
                self.start(e)..self.end(e),
                e + 1,
            ),
            None => {
                warn!(offset = opener.start, "unterminated doc comment runs to end of input");
                let len = self.source.len();
                (opener.end..len, len..len, self.tokens.len())
            }
        };
        self.push_comment(Segment::Block(BlockComment {
            opener,
            inner,
            closer,
            member,
            docstring: false,
        }));
        next
    }

    fn scan_python(&mut self) {
        let mut i = 0;
        while let Some(token) = self.kind(i) {
            i = match token {
                Token::DoubleQuote | Token::SingleQuote => {
                    let quote = self.text(i).as_bytes()[0];
                    self.skip_string(i + 1, quote)
                }
                Token::TripleQuote if self.starts_line(i) => self.docstring(i),
                Token::TripleQuote => self.skip_triple(i).1,
                Token::Backslash => i + 2,
                Token::HashDoc if matches!(self.kind(i + 1), Some(Token::Hash | Token::HashDoc)) => {
                    // `###` banner
                    self.line_end(i + 1)
                }
                Token::HashDoc => self.line_comment(i, LineMarker::DoubleHash, false),
                Token::Hash => self.line_comment(i, LineMarker::Hash, false),
                _ => i + 1,
            };
        }
    }

    /// Whether token `i` is the first non-blank text on its line
    fn starts_line(&self, i: usize) -> bool {
        let before = &self.source[..self.start(i)];
        let line = before.rsplit('\n').next().unwrap_or("");
        line.trim().is_empty()
    }

    /// Find the triple quote closing the one at `i`: (closer index if any, index after it)
    fn skip_triple(&self, i: usize) -> (Option<usize>, usize) {
        let quote = self.text(i);
        let mut j = i + 1;
        while let Some(token) = self.kind(j) {
            match token {
                Token::Backslash => j += 2,
                Token::TripleQuote if self.text(j) == quote => return (Some(j), j + 1),
                _ => j += 1,
            }
        }
        (None, self.tokens.len())
    }

    fn docstring(&mut self, i: usize) -> usize {
        let opener = self.start(i)..self.end(i);
        let (close, next) = self.skip_triple(i);
        let (inner, closer) = match close {
            Some(c) => (opener.end..self.start(c), self.start(c)..self.end(c)),
            None => {
                warn!(offset = opener.start, "unterminated docstring runs to end of input");
                let len = self.source.len();
                (opener.end..len, len..len)
            }
        };
        self.push_comment(Segment::Block(BlockComment {
            opener,
            inner,
            closer,
            member: false,
            docstring: true,
        }));
        next
    }
}

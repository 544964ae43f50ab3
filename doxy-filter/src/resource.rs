//! Document model
//!
//!     A parsed file is a [Document]: an ordered list of parts that are either verbatim code or a
//!     [CommentBlock]. Each block carries the [TextUnit]s extracted from its body. A unit's source
//!     is a [TextFragment], a run of text interleaved with inline codes standing for commands and
//!     markup that a translator must keep but not touch.
//!
//!     Fragments travel to and from translators as generic markup: code `n` is written `{n}` and
//!     literal braces are doubled.
//!
//!     [Document::events] flattens the tree into a linear event stream for consumers that prefer
//!     to walk the file from start to end.

use crate::commands::TagType;
use crate::decoding::{LineBreak, Syntax};
use crate::error::{FilterError, FilterResult};
use crate::layout::CommentBlock;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use tracing::warn;

/// A command or markup kept verbatim inside a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Code {
    /// 1-based, unique within the unit
    pub id: usize,
    pub tag: TagType,
    /// Canonical command name
    pub name: String,
    /// Source text of the command and any parameters folded into it
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Fragment {
    Text { text: String },
    Code(Code),
}

/// Text interleaved with inline codes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextFragment {
    pub parts: Vec<Fragment>,
}

impl TextFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(Fragment::Text { text: prev }) => prev.push_str(text),
            _ => self.parts.push(Fragment::Text {
                text: text.to_string(),
            }),
        }
    }

    pub fn push_code(&mut self, code: Code) {
        self.parts.push(Fragment::Code(code));
    }

    pub fn codes(&self) -> impl Iterator<Item = &Code> {
        self.parts.iter().filter_map(|p| match p {
            Fragment::Code(c) => Some(c),
            Fragment::Text { .. } => None,
        })
    }

    pub fn code(&self, id: usize) -> Option<&Code> {
        self.codes().find(|c| c.id == id)
    }

    /// Text only, codes dropped
    pub fn plain_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Fragment::Text { text } => Some(text.as_str()),
                Fragment::Code(_) => None,
            })
            .collect()
    }

    /// Text with codes expanded back to their source form
    pub fn render(&self) -> String {
        self.parts
            .iter()
            .map(|p| match p {
                Fragment::Text { text } => text.as_str(),
                Fragment::Code(c) => c.data.as_str(),
            })
            .collect()
    }

    /// Generic markup: `{n}` for code `n`, literal braces doubled
    pub fn to_generic(&self) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Fragment::Text { text } => {
                    for c in text.chars() {
                        match c {
                            '{' => out.push_str("{{"),
                            '}' => out.push_str("}}"),
                            _ => out.push(c),
                        }
                    }
                }
                Fragment::Code(code) => {
                    out.push('{');
                    out.push_str(&code.id.to_string());
                    out.push('}');
                }
            }
        }
        out
    }

    /// Rebuild a fragment from generic markup, resolving codes against `self`
    ///
    /// Codes referenced by `markup` must exist in `self`. Codes of `self` that `markup` leaves
    /// out are appended at the end so nothing structural is lost.
    pub fn from_generic(&self, unit: &str, markup: &str) -> FilterResult<TextFragment> {
        let mut fragment = TextFragment::new();
        let mut used = Vec::new();
        let mut text = String::new();
        let mut chars = markup.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, n)| *n) == Some('{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek().map(|(_, n)| *n) == Some('}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut digits = String::new();
                    let mut closed = false;
                    for (_, d) in chars.by_ref() {
                        if d == '}' {
                            closed = true;
                            break;
                        }
                        digits.push(d);
                    }
                    let id: usize = match (closed, digits.parse()) {
                        (true, Ok(id)) => id,
                        _ => {
                            return Err(FilterError::MalformedMarkup {
                                unit: unit.to_string(),
                                offset,
                            })
                        }
                    };
                    let code = self.code(id).ok_or_else(|| FilterError::UnknownCode {
                        unit: unit.to_string(),
                        code: id,
                    })?;
                    fragment.push_text(&std::mem::take(&mut text));
                    fragment.push_code(code.clone());
                    used.push(id);
                }
                '}' => {
                    return Err(FilterError::MalformedMarkup {
                        unit: unit.to_string(),
                        offset,
                    })
                }
                _ => text.push(c),
            }
        }
        fragment.push_text(&text);

        for code in self.codes().filter(|c| !used.contains(&c.id)) {
            warn!(unit, code = code.id, name = %code.name, "translation dropped a code; appending it");
            fragment.push_code(code.clone());
        }
        Ok(fragment)
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain_text())
    }
}

/// A translatable (or deliberately untranslatable) piece of a comment body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextUnit {
    /// `tu1`, `tu2`, ... in document order
    pub id: String,
    pub translatable: bool,
    pub preserve_whitespace: bool,
    pub source: TextFragment,
    pub target: Option<TextFragment>,
    /// Byte range of the unit in its block's body
    #[serde(skip)]
    pub span: Range<usize>,
    /// Body text covered by `span`
    #[serde(skip)]
    pub raw: String,
}

impl TextUnit {
    /// What the writer puts back in place of `raw`
    pub fn output(&self) -> String {
        match &self.target {
            Some(target) => target.render(),
            None => self.raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Source text outside doc comments
    Code(String),
    Comment(CommentBlock),
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub name: String,
    pub line_break: LineBreak,
    pub has_bom: bool,
    pub syntax: Syntax,
    pub parts: Vec<Part>,
}

/// One step of a document walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    StartDocument(&'a Document),
    /// Code between comment groups
    DocumentPart(&'a str),
    StartGroup(&'a CommentBlock),
    TextUnit(&'a TextUnit),
    EndGroup(&'a CommentBlock),
    EndDocument,
}

impl Document {
    pub fn comments(&self) -> impl Iterator<Item = &CommentBlock> {
        self.parts.iter().filter_map(|p| match p {
            Part::Comment(c) => Some(c),
            Part::Code(_) => None,
        })
    }

    fn comments_mut(&mut self) -> impl Iterator<Item = &mut CommentBlock> {
        self.parts.iter_mut().filter_map(|p| match p {
            Part::Comment(c) => Some(c),
            Part::Code(_) => None,
        })
    }

    pub fn text_units(&self) -> impl Iterator<Item = &TextUnit> {
        self.comments().flat_map(|c| c.units.iter())
    }

    pub fn text_unit(&self, id: &str) -> Option<&TextUnit> {
        self.text_units().find(|u| u.id == id)
    }

    pub fn text_unit_mut(&mut self, id: &str) -> Option<&mut TextUnit> {
        self.comments_mut()
            .flat_map(|c| c.units.iter_mut())
            .find(|u| u.id == id)
    }

    /// Set targets from `(unit id, generic markup)` pairs; returns how many were applied
    pub fn apply_translations<I, K, V>(&mut self, translations: I) -> FilterResult<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut applied = 0;
        for (id, markup) in translations {
            let id = id.as_ref();
            let block = self
                .comments_mut()
                .find(|c| c.units.iter().any(|u| u.id == id))
                .ok_or_else(|| FilterError::UnknownTextUnit(id.to_string()))?;
            let closer = &block.closer;
            let Some(unit) = block.units.iter_mut().find(|u| u.id == id) else {
                return Err(FilterError::UnknownTextUnit(id.to_string()));
            };
            let target = unit.source.from_generic(id, markup.as_ref())?;
            // A closer inside the target would end the comment early
            if !closer.is_empty() && target.render().contains(closer.as_str()) {
                return Err(FilterError::InvalidTarget {
                    unit: id.to_string(),
                    closer: closer.clone(),
                });
            }
            unit.target = Some(target);
            applied += 1;
        }
        Ok(applied)
    }

    /// Walk the document as a flat event stream
    pub fn events(&self) -> Vec<Event<'_>> {
        let mut events = vec![Event::StartDocument(self)];
        for part in &self.parts {
            match part {
                Part::Code(code) => events.push(Event::DocumentPart(code)),
                Part::Comment(block) => {
                    events.push(Event::StartGroup(block));
                    events.extend(block.units.iter().map(Event::TextUnit));
                    events.push(Event::EndGroup(block));
                }
            }
        }
        events.push(Event::EndDocument);
        events
    }
}

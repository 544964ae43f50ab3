//! Segmenting
//!
//!     Splits the body of each comment block into text units. The body is cut into plain text
//!     and commands by the [CommandMatcher], then walked from left to right:
//!
//!     - structural commands (`\brief`, `\param`, `\section`, list markers, `<p>`, ...) close the
//!       unit being built, when it holds text, and start a new one;
//!     - inline commands (`\b`, `\ref`, `<b>`, ...) become codes inside the current unit;
//!     - closing commands (`\endcode`, `</summary>`) end the unit and pop the command they close;
//!     - blank lines end the unit.
//!
//!     Parameters are consumed according to their length and folded into the command's code when
//!     they are not translatable. Commands that open untranslatable blocks (`\code`, `\dot`,
//!     `<pre>`, ...) switch to raw mode, where everything up to the closing command is text of
//!     an untranslatable unit.
//!
//!     When a unit is finished, whitespace and codes at its edges move back to the skeleton. A
//!     unit left with no text is dropped.

use crate::commands::{
    CommandDef, CommandMatch, CommandMatcher, CommandTable, MatchKind, ParameterDef,
    ParameterLength, Piece, Scope, TagType,
};
use crate::layout::CommentBlock;
use crate::resource::{Code, TextFragment, TextUnit};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, warn};

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("valid regex"));

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const WORD_TRAILING_PUNCTUATION: [char; 6] = ['.', ',', ';', ':', '!', '?'];

/// A command waiting for its closer
#[derive(Debug, Clone)]
struct OpenCommand {
    def: Arc<CommandDef>,
    group: String,
}

/// Segments every comment block of one document
pub struct Segmenter<'a> {
    table: &'a CommandTable,
    matcher: &'a CommandMatcher,
    preserve_whitespace: bool,
    units: usize,
    groups: usize,
    /// Commands such as `\cond` and `@{` that may close in a later block
    document_stack: Vec<OpenCommand>,
}

impl<'a> Segmenter<'a> {
    pub fn new(
        table: &'a CommandTable,
        matcher: &'a CommandMatcher,
        preserve_whitespace: bool,
    ) -> Self {
        Segmenter {
            table,
            matcher,
            preserve_whitespace,
            units: 0,
            groups: 0,
            document_stack: Vec::new(),
        }
    }

    /// Assign the block its group id and extract its text units
    pub fn segment(&mut self, block: &mut CommentBlock) {
        self.groups += 1;
        block.id = format!("g{}", self.groups);

        let body = block.body();
        let pieces = self.matcher.split(&body);
        let mut run = Run {
            body: &body,
            group: &block.id,
            table: self.table,
            default_preserve: self.preserve_whitespace,
            items: Vec::new(),
            translatable: true,
            preserve: self.preserve_whitespace,
            end_at_line_end: false,
            block_stack: Vec::new(),
            raw_until: None,
            document_stack: &mut self.document_stack,
            next_unit: &mut self.units,
            units: Vec::new(),
        };

        let mut k = 0;
        while k < pieces.len() {
            k = match &pieces[k] {
                Piece::Text(range) => {
                    run.plain_text(range.clone());
                    k + 1
                }
                Piece::Command(found) => run.command(&pieces, k, found),
            };
        }
        run.end_unit();
        run.close_block();

        block.units = run.units;
    }

    /// Report document-scoped commands that were never closed
    pub fn finish(self) {
        for open in self.document_stack {
            warn!(command = %open.def.name, group = %open.group, "command not closed by end of document");
        }
    }
}

#[derive(Debug, Clone)]
enum Item {
    Text(Range<usize>),
    Code {
        range: Range<usize>,
        tag: TagType,
        key: String,
        def: Arc<CommandDef>,
    },
}

impl Item {
    fn range(&self) -> Range<usize> {
        match self {
            Item::Text(r) => r.clone(),
            Item::Code { range, .. } => range.clone(),
        }
    }

    fn tag(&self) -> Option<TagType> {
        match self {
            Item::Code { tag, .. } => Some(*tag),
            Item::Text(_) => None,
        }
    }
}

/// Whether `close` is the closer of `open`
fn pairs(open: &Item, close: &Item) -> bool {
    match (open, close) {
        (
            Item::Code {
                tag: TagType::Opening,
                key: open_key,
                def: open_def,
                ..
            },
            Item::Code {
                tag: TagType::Closing,
                key: close_key,
                def: close_def,
                ..
            },
        ) => {
            if open_def.has_pair() {
                open_def.is_closed_by(close_def)
            } else {
                open_key.starts_with('<') && *close_key == format!("</{}", &open_key[1..])
            }
        }
        _ => false,
    }
}

fn has_partner(items: &[Item], index: usize) -> bool {
    match items[index].tag() {
        Some(TagType::Opening) => items[index + 1..].iter().any(|c| pairs(&items[index], c)),
        Some(TagType::Closing) => items[..index].iter().any(|o| pairs(o, &items[index])),
        _ => false,
    }
}

/// Whether the first and last items are a pair enclosing everything between
fn wrapped(items: &[Item]) -> bool {
    let [first, middle @ .., last] = items else {
        return false;
    };
    if !pairs(first, last) {
        return false;
    }
    let mut depth = 0usize;
    for item in middle {
        if pairs(first, item) {
            if depth == 0 {
                return false;
            }
            depth -= 1;
        } else if let (
            Item::Code {
                key,
                tag: TagType::Opening,
                ..
            },
            Item::Code { key: first_key, .. },
        ) = (item, first)
        {
            if key == first_key {
                depth += 1;
            }
        }
    }
    true
}

fn strip_leading_blank_lines(text: &str) -> &str {
    let blank = text.len() - text.trim_start().len();
    match text[..blank].rfind('\n') {
        Some(nl) => &text[nl + 1..],
        None => text,
    }
}

/// Segmentation state for one comment body
struct Run<'r> {
    body: &'r str,
    group: &'r str,
    table: &'r CommandTable,
    default_preserve: bool,

    items: Vec<Item>,
    translatable: bool,
    preserve: bool,
    /// A line parameter was cut short by an inline command; end the unit at the next newline
    end_at_line_end: bool,

    block_stack: Vec<Arc<CommandDef>>,
    /// Opener of the untranslatable block being read verbatim
    raw_until: Option<Arc<CommandDef>>,
    document_stack: &'r mut Vec<OpenCommand>,

    next_unit: &'r mut usize,
    units: Vec<TextUnit>,
}

impl<'r> Run<'r> {
    fn has_text(&self) -> bool {
        self.items.iter().any(|item| match item {
            Item::Text(r) => !self.body[r.clone()].trim().is_empty(),
            Item::Code { .. } => false,
        })
    }

    fn push_text(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        if let Some(Item::Text(prev)) = self.items.last_mut() {
            if prev.end == range.start {
                prev.end = range.end;
                return;
            }
        }
        self.items.push(Item::Text(range));
    }

    fn push_code(&mut self, range: Range<usize>, key: &str, def: &Arc<CommandDef>) {
        self.items.push(Item::Code {
            range,
            tag: def.tag,
            key: key.to_string(),
            def: Arc::clone(def),
        });
    }

    fn extend_code(&mut self, end: usize) -> bool {
        match self.items.last_mut() {
            Some(Item::Code { range, .. }) => {
                range.end = end;
                true
            }
            _ => false,
        }
    }

    /// Plain text between commands: split into paragraphs at blank lines
    fn plain_text(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        if self.raw_until.is_some() {
            self.push_text(range);
            return;
        }

        let mut start = range.start;
        if self.end_at_line_end {
            if let Some(nl) = self.body[start..range.end].find('\n') {
                self.push_text(start..start + nl);
                self.end_unit();
                start += nl;
            }
        }

        let body = self.body;
        let mut last = start;
        for m in PARAGRAPH_BREAK.find_iter(&body[start..range.end]) {
            self.push_text(last..start + m.start());
            self.end_unit();
            last = start + m.end();
        }
        self.push_text(last..range.end);
    }

    /// Handle the command at `pieces[k]`; returns the index of the next piece to process
    fn command(&mut self, pieces: &[Piece], k: usize, found: &CommandMatch) -> usize {
        let def = self.table.get(&found.key).cloned();

        if let Some(open) = &self.raw_until {
            let closes = def.as_ref().is_some_and(|d| open.is_closed_by(d));
            if !closes {
                self.push_text(found.range.clone());
                return k + 1;
            }
        }

        let Some(def) = def else {
            let text = &self.body[found.range.clone()];
            if found.kind == MatchKind::Html {
                debug!(command = text, group = self.group, "unknown tag kept as text");
            } else {
                warn!(command = text, group = self.group, "unknown command kept as text");
            }
            self.plain_text(found.range.clone());
            return k + 1;
        };

        // Text up to the next command is available to parameters
        let (region_end, next) = match pieces.get(k + 1) {
            Some(Piece::Text(r)) => (r.end, k + 2),
            _ => (found.range.end, k + 1),
        };

        if def.tag == TagType::Closing && !def.inline {
            self.push_code(found.range.clone(), &found.key, &def);
            self.end_unit();
            match def.scope {
                Scope::Block => self.close_pair(&def),
                Scope::Document => self.close_document_pair(&def),
            }
            if self.raw_until.as_ref().is_some_and(|open| open.is_closed_by(&def)) {
                self.raw_until = None;
            }
            self.plain_text(found.range.end..region_end);
            return next;
        }

        if def.inline {
            if def.tag == TagType::Opening && def.has_pair() && !def.translatable {
                if let Some(end) = self.find_pair_piece(pieces, k, &def) {
                    let close_end = match &pieces[end] {
                        Piece::Command(c) => c.range.end,
                        Piece::Text(r) => r.end,
                    };
                    self.push_code(found.range.start..close_end, &found.key, &def);
                    return end + 1;
                }
                warn!(command = %def.name, group = self.group, "command not closed");
            }
            self.push_code(found.range.clone(), &found.key, &def);
            let pos = self.parameters(&def, found.range.end, region_end, false);
            self.plain_text(pos..region_end);
            return next;
        }

        // Structural
        if self.has_text() {
            self.end_unit();
        }
        self.translatable = def.translatable;
        self.preserve = def.preserve_whitespace || self.default_preserve;
        self.push_code(found.range.clone(), &found.key, &def);

        if def.tag == TagType::Opening && def.has_pair() {
            match def.scope {
                Scope::Block => {
                    self.block_stack.push(Arc::clone(&def));
                    if !def.translatable {
                        self.raw_until = Some(Arc::clone(&def));
                    }
                }
                Scope::Document => self.document_stack.push(OpenCommand {
                    def: Arc::clone(&def),
                    group: self.group.to_string(),
                }),
            }
        }

        let pos = self.parameters(&def, found.range.end, region_end, true);
        self.plain_text(pos..region_end);
        next
    }

    /// Index of the piece closing the inline command at `k`
    fn find_pair_piece(&self, pieces: &[Piece], k: usize, def: &CommandDef) -> Option<usize> {
        pieces
            .iter()
            .enumerate()
            .skip(k + 1)
            .find(|(_, piece)| match piece {
                Piece::Command(c) => self
                    .table
                    .get(&c.key)
                    .is_some_and(|other| def.is_closed_by(other)),
                Piece::Text(_) => false,
            })
            .map(|(index, _)| index)
    }

    /// Consume the parameters of `def` from `pos`; returns where plain text resumes
    fn parameters(
        &mut self,
        def: &Arc<CommandDef>,
        mut pos: usize,
        region_end: usize,
        structural: bool,
    ) -> usize {
        let mut extend = true;

        for param in &def.parameters {
            let Some((range, boundary)) = self.find_parameter(param, pos, region_end) else {
                if param.required {
                    warn!(
                        command = %def.name,
                        parameter = %param.name,
                        group = self.group,
                        "missing required parameter"
                    );
                }
                break;
            };
            pos = range.end;

            if param.translatable {
                if param.length == ParameterLength::Phrase {
                    self.push_phrase(range, def, param);
                } else {
                    self.push_text(range);
                }
                extend = false;
            } else if !(extend && self.extend_code(range.end)) {
                self.push_placeholder(range, def, param);
            }

            match param.length {
                ParameterLength::Line | ParameterLength::Paragraph if boundary => self.end_unit(),
                ParameterLength::Line => self.end_at_line_end = true,
                _ => {}
            }
        }

        if structural && extend {
            let blanks = self.body[pos..region_end]
                .len()
                .saturating_sub(self.body[pos..region_end].trim_start_matches([' ', '\t']).len());
            if blanks > 0 && self.extend_code(pos + blanks) {
                pos += blanks;
            }
        }
        pos
    }

    /// A parameter code that stands on its own
    fn push_placeholder(&mut self, range: Range<usize>, def: &Arc<CommandDef>, param: &ParameterDef) {
        let key = format!("{}:{}", def.name, param.name);
        self.push_code(range, &key, def);
        if let Some(Item::Code { tag, .. }) = self.items.last_mut() {
            *tag = TagType::Placeholder;
        }
    }

    /// A quoted parameter: the quotes are codes, only the words between them are text
    fn push_phrase(&mut self, range: Range<usize>, def: &Arc<CommandDef>, param: &ParameterDef) {
        let Some(open) = self.body[range.clone()].find('"') else {
            self.push_text(range);
            return;
        };
        let inner_start = range.start + open + 1;
        let inner_end = range.end - 1;
        self.push_placeholder(range.start..inner_start, def, param);
        self.push_text(inner_start..inner_end);
        self.push_placeholder(inner_end..range.end, def, param);
    }

    /// Locate a parameter at `pos`: its range (leading blanks included) and whether it ran to a
    /// line or paragraph boundary rather than into the next command
    fn find_parameter(
        &self,
        param: &ParameterDef,
        pos: usize,
        region_end: usize,
    ) -> Option<(Range<usize>, bool)> {
        let region = &self.body[pos..region_end];
        let at_body_end = region_end == self.body.len();
        let blanks = region.len() - region.trim_start_matches([' ', '\t']).len();
        let rest = &region[blanks..];

        match param.length {
            ParameterLength::Word => {
                let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
                let word = &rest[..len];
                let trimmed = word.trim_end_matches(WORD_TRAILING_PUNCTUATION);
                let word = if trimmed.is_empty() { word } else { trimmed };
                if word.is_empty() || !param.accepts(word) {
                    return None;
                }
                Some((pos..pos + blanks + word.len(), false))
            }
            ParameterLength::Phrase => {
                let quoted = rest.strip_prefix('"')?;
                let close = quoted.find(['"', '\n'])?;
                if !quoted[close..].starts_with('"') {
                    return None;
                }
                Some((pos..pos + blanks + close + 2, false))
            }
            ParameterLength::Line => {
                let (len, boundary) = match region.find('\n') {
                    Some(nl) => (nl, true),
                    None => (region.len(), at_body_end),
                };
                if region[..len].trim().is_empty() {
                    return None;
                }
                Some((pos..pos + len, boundary))
            }
            ParameterLength::Paragraph => {
                let (len, boundary) = match PARAGRAPH_BREAK.find(region) {
                    Some(m) => (m.start(), true),
                    None => (region.len(), at_body_end),
                };
                if region[..len].trim().is_empty() {
                    return None;
                }
                Some((pos..pos + len, boundary))
            }
        }
    }

    /// Pop the block stack down to the opener `close` belongs to
    fn close_pair(&mut self, close: &CommandDef) {
        let Some(index) = self.block_stack.iter().rposition(|open| open.is_closed_by(close)) else {
            warn!(command = %close.name, group = self.group, "orphaned end command");
            return;
        };
        for open in self.block_stack.drain(index + 1..) {
            warn!(command = %open.name, group = self.group, "command not closed");
        }
        self.block_stack.pop();
    }

    fn close_document_pair(&mut self, close: &CommandDef) {
        let Some(index) = self
            .document_stack
            .iter()
            .rposition(|open| open.def.is_closed_by(close))
        else {
            warn!(command = %close.name, group = self.group, "orphaned end command");
            return;
        };
        for open in self.document_stack.drain(index + 1..) {
            warn!(command = %open.def.name, group = %open.group, "command not closed");
        }
        self.document_stack.pop();
    }

    /// End of the body: anything still open in this block is unclosed
    fn close_block(&mut self) {
        for open in self.block_stack.drain(..) {
            warn!(command = %open.name, group = self.group, "command not closed");
        }
        self.raw_until = None;
    }

    /// Finish the unit being built and reset to defaults
    fn end_unit(&mut self) {
        let items = std::mem::take(&mut self.items);
        let translatable = self.translatable;
        let preserve = self.preserve;
        self.translatable = true;
        self.preserve = self.default_preserve;
        self.end_at_line_end = false;

        if let Some(unit) = self.build_unit(items, translatable, preserve) {
            self.units.push(unit);
        }
    }

    fn build_unit(
        &mut self,
        mut items: Vec<Item>,
        translatable: bool,
        preserve: bool,
    ) -> Option<TextUnit> {
        self.trim(&mut items, translatable);
        if !items.iter().any(|i| matches!(i, Item::Text(r) if !self.body[r.clone()].trim().is_empty())) {
            return None;
        }

        let mut source = TextFragment::new();
        let mut next_code = 0;
        for item in &items {
            match item {
                Item::Text(r) => {
                    let text = &self.body[r.clone()];
                    if translatable && !preserve {
                        source.push_text(&WHITESPACE_RUN.replace_all(text, " "));
                    } else {
                        source.push_text(text);
                    }
                }
                Item::Code { range, tag, def, .. } => {
                    next_code += 1;
                    source.push_code(Code {
                        id: next_code,
                        tag: *tag,
                        name: def.name.clone(),
                        data: self.body[range.clone()].to_string(),
                    });
                }
            }
        }

        let span = items.first()?.range().start..items.last()?.range().end;
        *self.next_unit += 1;
        Some(TextUnit {
            id: format!("tu{}", self.next_unit),
            translatable,
            preserve_whitespace: preserve || !translatable,
            source,
            target: None,
            raw: self.body[span.clone()].to_string(),
            span,
        })
    }

    /// Move edge whitespace, edge codes and wrapping pairs out of the unit
    fn trim(&self, items: &mut Vec<Item>, translatable: bool) {
        loop {
            while let Some(first) = items.first() {
                let edge = match first {
                    Item::Text(r) => {
                        let text = &self.body[r.clone()];
                        let kept = if translatable {
                            text.trim_start()
                        } else {
                            strip_leading_blank_lines(text)
                        };
                        if kept.trim().is_empty() {
                            Edge::Drop
                        } else {
                            Edge::Trim(r.end - kept.len()..r.end)
                        }
                    }
                    Item::Code {
                        tag: TagType::Placeholder,
                        ..
                    } => Edge::Drop,
                    Item::Code { .. } if !has_partner(items, 0) => Edge::Drop,
                    Item::Code { .. } => Edge::Keep,
                };
                match edge {
                    Edge::Drop => {
                        items.remove(0);
                    }
                    Edge::Trim(range) => {
                        items[0] = Item::Text(range);
                        break;
                    }
                    Edge::Keep => break,
                }
            }

            while let Some(last) = items.last() {
                let index = items.len() - 1;
                let edge = match last {
                    Item::Text(r) => {
                        let kept = self.body[r.clone()].trim_end();
                        if kept.is_empty() {
                            Edge::Drop
                        } else {
                            Edge::Trim(r.start..r.start + kept.len())
                        }
                    }
                    Item::Code {
                        tag: TagType::Placeholder,
                        ..
                    } => Edge::Drop,
                    Item::Code { .. } if !has_partner(items, index) => Edge::Drop,
                    Item::Code { .. } => Edge::Keep,
                };
                match edge {
                    Edge::Drop => {
                        items.pop();
                    }
                    Edge::Trim(range) => {
                        items[index] = Item::Text(range);
                        break;
                    }
                    Edge::Keep => break,
                }
            }

            if wrapped(items) {
                items.pop();
                items.remove(0);
            } else {
                break;
            }
        }
    }
}

/// What unit trimming does with an edge item
enum Edge {
    Drop,
    Trim(Range<usize>),
    Keep,
}

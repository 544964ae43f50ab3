//! Writer
//!
//!     Merges a [Document] back into source text. Code parts are copied verbatim. In each comment
//!     block the unit spans are replaced by their targets (or left as they were), the body is
//!     split into lines again and decorated with the block's prefixes. Line breaks and the byte
//!     order mark are restored last.

use crate::error::{FilterError, FilterResult};
use crate::layout::CommentBlock;
use crate::resource::{Document, Part};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, Default)]
pub struct DoxygenWriter;

impl DoxygenWriter {
    pub fn new() -> Self {
        DoxygenWriter
    }

    /// Output text with the document's line breaks, without BOM
    pub fn render(&self, doc: &Document) -> String {
        let mut out = String::new();
        for part in &doc.parts {
            match part {
                Part::Code(code) => out.push_str(code),
                Part::Comment(block) => out.push_str(&self.render_block(block)),
            }
        }
        let line_break = doc.line_break.as_str();
        if line_break == "\n" {
            out
        } else {
            out.replace('\n', line_break)
        }
    }

    /// Output bytes, BOM included when the input had one
    pub fn write(&self, doc: &Document) -> Vec<u8> {
        let text = self.render(doc);
        let mut bytes = Vec::with_capacity(text.len() + UTF8_BOM.len());
        if doc.has_bom {
            bytes.extend_from_slice(UTF8_BOM);
        }
        bytes.extend_from_slice(text.as_bytes());
        bytes
    }

    /// Write to `path` through a temporary file in the same directory
    ///
    /// The destination may be the file the document was read from.
    pub fn write_to_path(&self, doc: &Document, path: impl AsRef<Path>) -> FilterResult<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FilterError::io(dir, e))?;
        tmp.write_all(&self.write(doc))
            .map_err(|e| FilterError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| FilterError::io(path, e.error))?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }

    fn render_block(&self, block: &CommentBlock) -> String {
        if block.units.iter().all(|u| u.target.is_none()) {
            return block.render();
        }

        let body = block.body();
        let mut merged = String::with_capacity(body.len());
        let mut pos = 0;
        for unit in &block.units {
            merged.push_str(&body[pos..unit.span.start]);
            merged.push_str(&unit.output());
            pos = unit.span.end;
        }
        merged.push_str(&body[pos..]);
        block.render_body(&merged)
    }
}

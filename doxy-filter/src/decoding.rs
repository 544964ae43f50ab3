//! Input decoding
//!
//!     Files come in as bytes. Before any scanning happens we strip a UTF-8 byte order mark,
//!     decide which line break the file uses and normalize every break to `\n`. The writer
//!     restores both on the way out, so a file that was not translated comes back unchanged.
//!
//!     Only UTF-8 input is accepted.

use crate::error::{FilterError, FilterResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Line break convention detected in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineBreak {
    #[default]
    Lf,
    CrLf,
    Cr,
}

impl LineBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineBreak::Lf => "\n",
            LineBreak::CrLf => "\r\n",
            LineBreak::Cr => "\r",
        }
    }

    /// Detect the convention from the first line terminator in `text`
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, b) in bytes.iter().enumerate() {
            match b {
                b'\n' => return LineBreak::Lf,
                b'\r' => {
                    return if bytes.get(i + 1) == Some(&b'\n') {
                        LineBreak::CrLf
                    } else {
                        LineBreak::Cr
                    };
                }
                _ => {}
            }
        }
        LineBreak::Lf
    }
}

/// Comment syntax of the source language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    /// C, C++, Java, Objective-C: `///`, `//!`, `/** */`, `/*! */`
    #[default]
    C,
    /// Python: `##` blocks and docstrings
    Python,
}

impl Syntax {
    /// Pick the syntax from a file name, falling back to C
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("py") => Syntax::Python,
            _ => Syntax::C,
        }
    }
}

impl std::str::FromStr for Syntax {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "cpp" | "c++" | "java" => Ok(Syntax::C),
            "python" | "py" => Ok(Syntax::Python),
            other => Err(format!("unknown syntax '{}'", other)),
        }
    }
}

/// Source text ready for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInput {
    /// Text with every line break normalized to `\n`
    pub text: String,
    pub line_break: LineBreak,
    pub has_bom: bool,
}

/// Strip the BOM, validate UTF-8 and normalize line breaks
pub fn decode(bytes: &[u8]) -> FilterResult<DecodedInput> {
    let (has_bom, bytes) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (true, rest),
        None => (false, bytes),
    };
    let text = std::str::from_utf8(bytes).map_err(|e| FilterError::Encoding {
        offset: e.valid_up_to(),
    })?;
    let mut input = decode_str(text);
    input.has_bom |= has_bom;
    Ok(input)
}

/// Same as [decode] for text that is already a string
pub fn decode_str(text: &str) -> DecodedInput {
    let (has_bom, text) = match text.strip_prefix('\u{feff}') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    DecodedInput {
        text: normalize_line_breaks(text),
        line_break: LineBreak::detect(text),
        has_bom,
    }
}

/// Replace `\r\n` and lone `\r` with `\n`
pub fn normalize_line_breaks(text: &str) -> String {
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

//! Extraction and merge filter for Doxygen-commented source files
//!
//!     Doxygen comments (`///`, `//!`, `/** */`, `/*! */`, `##` and docstrings in Python) hold
//!     prose mixed with commands and HTML. This crate pulls the translatable prose out as text
//!     units, keeps every command a translator must not touch as an inline code, and merges
//!     translations back while leaving the rest of the file byte for byte as it was.
//!
//! Architecture
//!
//!     The passes run in order, each in its own module:
//!
//!     .
//!     ├── decoding.rs        # UTF-8, BOM, line break detection
//!     ├── lexing.rs          # logos tokens for comment delimiters, strings, newlines
//!     ├── scanning.rs        # token stream -> code / line comment / block comment segments
//!     ├── layout.rs          # segments -> comment groups with their line decoration
//!     ├── commands           # command table (commands.yaml) and the command matcher
//!     ├── segmenting.rs      # comment body -> text units with inline codes
//!     ├── resource.rs        # Document, TextUnit, TextFragment, events
//!     ├── filter.rs          # DoxygenFilter: runs the passes
//!     ├── writer.rs          # DoxygenWriter: merges targets back
//!     ├── format.rs          # Format trait, ExtractedUnit
//!     ├── registry.rs        # FormatRegistry
//!     └── formats            # json, yaml, text
//!
//!     A round trip through [DoxygenFilter::parse] and [DoxygenWriter::render] with no targets set
//!     reproduces the input exactly.
//!
//! Usage
//!
//!     let filter = DoxygenFilter::new();
//!     let mut doc = filter.parse_path("widget.h")?;
//!     doc.apply_translations([("tu1", "Ceci est un {1}essai{2}.")])?;
//!     DoxygenWriter::new().write_to_path(&doc, "widget.fr.h")?;

pub mod commands;
pub mod decoding;
pub mod error;
pub mod filter;
pub mod format;
pub mod formats;
pub mod layout;
pub mod lexing;
pub mod registry;
pub mod resource;
pub mod scanning;
pub mod segmenting;
pub mod writer;

pub use commands::{CommandDef, CommandTable, TagType};
pub use decoding::{LineBreak, Syntax};
pub use error::{FilterError, FilterResult, FormatError};
pub use filter::{CustomCommand, DoxygenFilter, FilterConfig};
pub use format::{extract, ExtractedUnit, Format};
pub use layout::{CommentBlock, CommentStyle};
pub use registry::FormatRegistry;
pub use resource::{Code, Document, Event, Fragment, Part, TextFragment, TextUnit};
pub use writer::DoxygenWriter;

//! Filter entry point
//!
//! [DoxygenFilter] ties the passes together: decode, scan, lay out, segment. The result is a
//! [Document] that can be inspected, translated and handed to the writer.

use crate::commands::{CommandDef, CommandMatcher, CommandTable, ParameterDef, Scope, TagType};
use crate::decoding::{decode, decode_str, DecodedInput, Syntax};
use crate::error::{FilterError, FilterResult};
use crate::layout::build_parts;
use crate::resource::{Document, Part};
use crate::scanning::scan;
use crate::segmenting::Segmenter;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A project-specific command, matched by its own regular expression
#[derive(Debug, Clone, Deserialize)]
pub struct CustomCommand {
    /// Regular expression matching the full command text, e.g. `\\english\b`
    pub pattern: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub tag: TagType,
    #[serde(default)]
    pub inline: bool,
    #[serde(default = "default_true")]
    pub translatable: bool,
    #[serde(default)]
    pub preserve_whitespace: bool,
    #[serde(default)]
    pub pair: Option<String>,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub parameters: Vec<ParameterDef>,
}

fn default_true() -> bool {
    true
}

impl CustomCommand {
    fn to_def(&self) -> CommandDef {
        CommandDef {
            name: self.name.clone(),
            tag: self.tag,
            inline: self.inline,
            translatable: self.translatable,
            preserve_whitespace: self.preserve_whitespace,
            pair: self.pair.clone(),
            scope: self.scope,
            parameters: self.parameters.clone(),
            aliases: Vec::new(),
        }
    }
}

/// Options for [DoxygenFilter]
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Keep whitespace in translatable text instead of collapsing it
    pub preserve_whitespace: bool,
    /// Force a syntax instead of picking it from the file name
    pub syntax: Option<Syntax>,
    pub custom_commands: Vec<CustomCommand>,
}

/// Extracts translatable text from Doxygen comments
#[derive(Debug, Clone)]
pub struct DoxygenFilter {
    table: CommandTable,
    matcher: CommandMatcher,
    config: FilterConfig,
}

impl Default for DoxygenFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DoxygenFilter {
    /// Filter with the built-in command table and default options
    pub fn new() -> Self {
        DoxygenFilter {
            table: CommandTable::builtin().clone(),
            matcher: CommandMatcher::new(),
            config: FilterConfig::default(),
        }
    }

    pub fn with_config(config: FilterConfig) -> FilterResult<Self> {
        let mut matcher = CommandMatcher::new();
        for custom in &config.custom_commands {
            matcher.add_custom(&custom.pattern, custom.name.clone())?;
        }
        let table = CommandTable::builtin()
            .with_custom(config.custom_commands.iter().map(CustomCommand::to_def))?;
        Ok(DoxygenFilter {
            table,
            matcher,
            config,
        })
    }

    pub fn commands(&self) -> &CommandTable {
        &self.table
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Parse source text in the given syntax
    pub fn parse(&self, source: &str, syntax: Syntax) -> Document {
        let input = decode_str(source);
        self.build(String::new(), input, syntax)
    }

    /// Parse raw file contents; `name` picks the syntax unless one is configured
    pub fn parse_bytes(&self, bytes: &[u8], name: &str) -> FilterResult<Document> {
        let input = decode(bytes)?;
        let syntax = self.config.syntax.unwrap_or_else(|| Syntax::for_path(name));
        Ok(self.build(name.to_string(), input, syntax))
    }

    pub fn parse_path(&self, path: impl AsRef<Path>) -> FilterResult<Document> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| FilterError::io(path, e))?;
        self.parse_bytes(&bytes, &path.display().to_string())
    }

    fn build(&self, name: String, input: DecodedInput, syntax: Syntax) -> Document {
        let segments = scan(&input.text, syntax);
        let mut parts = build_parts(&input.text, &segments);

        let mut segmenter = Segmenter::new(
            &self.table,
            &self.matcher,
            self.config.preserve_whitespace,
        );
        for part in &mut parts {
            if let Part::Comment(block) = part {
                segmenter.segment(block);
            }
        }
        segmenter.finish();

        let document = Document {
            name,
            line_break: input.line_break,
            has_bom: input.has_bom,
            syntax,
            parts,
        };
        debug!(
            document = %document.name,
            groups = document.comments().count(),
            units = document.text_units().count(),
            "parsed document"
        );
        document
    }
}

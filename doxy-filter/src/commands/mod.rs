//! Doxygen command knowledge
//!
//!     The filter does not need Doxygen's full grammar. For each command it only needs to know
//!     whether the command breaks the text into a new unit or sits inline, whether the text it
//!     governs should be translated, and how much of the following text belongs to its
//!     parameters. That knowledge lives in an embedded YAML table (`commands.yaml`) which is
//!     parsed once, on first use.
//!
//!     Custom commands (project aliases such as `\english`) are layered on top through
//!     [CommandTable::with_custom].

pub mod matcher;

use crate::error::{FilterError, FilterResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub use matcher::{CommandMatch, CommandMatcher, MatchKind, Piece};

const BUILTIN_YAML: &str = include_str!("commands.yaml");

static BUILTIN: Lazy<CommandTable> = Lazy::new(|| {
    CommandTable::from_yaml(BUILTIN_YAML).expect("embedded command table is valid")
});

/// How a command's code relates to the text around it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    #[default]
    Placeholder,
    Opening,
    Closing,
}

/// How far a pair of commands may reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Opener and closer live in the same comment block
    #[default]
    Block,
    /// Opener and closer may sit in different comment blocks (`\cond`, `\if`, `@{`)
    Document,
}

/// Extent of a command parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLength {
    /// One whitespace-free token on the same line
    Word,
    /// A double-quoted string on the same line
    Phrase,
    /// The rest of the line
    Line,
    /// Everything up to the next blank line
    Paragraph,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDef {
    pub name: String,
    pub length: ParameterLength,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub translatable: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(skip)]
    pub(crate) matcher: Option<Regex>,
}

impl ParameterDef {
    /// Whether `candidate` is acceptable for this parameter
    pub fn accepts(&self, candidate: &str) -> bool {
        match &self.matcher {
            Some(re) => re.is_match(candidate),
            None => true,
        }
    }

    fn compile(&mut self, command: &str) -> FilterResult<()> {
        if let Some(pattern) = &self.pattern {
            let anchored = format!("^(?:{})$", pattern);
            let re = Regex::new(&anchored).map_err(|e| FilterError::InvalidCommand {
                name: command.to_string(),
                reason: format!("parameter '{}': {}", self.name, e),
            })?;
            self.matcher = Some(re);
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

/// Everything the filter knows about one command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandDef {
    /// Canonical name, filled in from the table key
    #[serde(default)]
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
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl CommandDef {
    pub fn placeholder(name: impl Into<String>) -> Self {
        CommandDef {
            name: name.into(),
            tag: TagType::Placeholder,
            inline: false,
            translatable: true,
            preserve_whitespace: false,
            pair: None,
            scope: Scope::Block,
            parameters: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn has_pair(&self) -> bool {
        self.pair.is_some()
    }

    /// Whether `other` is the command that closes this one
    pub fn is_closed_by(&self, other: &CommandDef) -> bool {
        self.pair.as_deref() == Some(other.name.as_str())
    }

    /// Compile parameter patterns; must be called before the definition is used
    pub fn prepare(mut self) -> FilterResult<Self> {
        let name = self.name.clone();
        for parameter in &mut self.parameters {
            parameter.compile(&name)?;
        }
        Ok(self)
    }
}

/// Lookup table from command key to definition
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    commands: HashMap<String, Arc<CommandDef>>,
}

impl CommandTable {
    /// The embedded table
    pub fn builtin() -> &'static CommandTable {
        &BUILTIN
    }

    /// Parse a table from YAML: a map from command name to definition
    pub fn from_yaml(source: &str) -> FilterResult<Self> {
        let raw: BTreeMap<String, CommandDef> = serde_yaml::from_str(source)?;
        let mut table = CommandTable::default();
        for (name, mut def) in raw {
            def.name = name;
            table.insert(def.prepare()?);
        }
        Ok(table)
    }

    /// Add a definition under its name and all of its aliases
    pub fn insert(&mut self, def: CommandDef) {
        let def = Arc::new(def);
        for alias in &def.aliases {
            self.commands.insert(alias.clone(), Arc::clone(&def));
        }
        self.commands.insert(def.name.clone(), def);
    }

    /// Copy of this table with extra definitions layered on top
    pub fn with_custom(&self, defs: impl IntoIterator<Item = CommandDef>) -> FilterResult<Self> {
        let mut table = self.clone();
        for def in defs {
            table.insert(def.prepare()?);
        }
        Ok(table)
    }

    pub fn get(&self, key: &str) -> Option<&Arc<CommandDef>> {
        self.commands.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.commands.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

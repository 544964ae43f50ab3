//! Format registry
//!
//! Formats are registered and looked up by name. The CLI resolves `-f` through it.

use crate::error::FormatError;
use crate::format::{ExtractedUnit, Format};
use std::collections::HashMap;

pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any with the same name
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Vec<ExtractedUnit>, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support parsing",
                format
            )));
        }
        fmt.parse(source)
    }

    pub fn serialize(&self, units: &[ExtractedUnit], format: &str) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support serialization",
                format
            )));
        }
        fmt.serialize(units)
    }

    /// Registry holding the built-in formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::formats::json::JsonFormat);
        registry.register(crate::formats::yaml::YamlFormat);
        registry.register(crate::formats::text::TextFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

//! Shared configuration loader for the doxy tools.
//!
//! `defaults/doxy.default.toml` is embedded into every binary so the documented defaults and
//! runtime behavior stay in sync. Applications layer user files on top via [`Loader`] before
//! deserializing into [`DoxyConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use doxy_filter::{CustomCommand, FilterConfig, Syntax};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/doxy.default.toml");

/// Top-level configuration consumed by doxy applications.
#[derive(Debug, Clone, Deserialize)]
pub struct DoxyConfig {
    pub filter: FilterSection,
    pub output: OutputConfig,
}

/// Knobs passed on to the extraction filter.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSection {
    pub preserve_whitespace: bool,
    pub syntax: SyntaxChoice,
    pub extensions: Vec<String>,
    pub include_untranslatable: bool,
    #[serde(default)]
    pub custom_commands: Vec<CustomCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxChoice {
    Auto,
    C,
    Python,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

impl DoxyConfig {
    /// Options for [doxy_filter::DoxygenFilter::with_config]
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            preserve_whitespace: self.filter.preserve_whitespace,
            syntax: match self.filter.syntax {
                SyntaxChoice::Auto => None,
                SyntaxChoice::C => Some(Syntax::C),
                SyntaxChoice::Python => Some(Syntax::Python),
            },
            custom_commands: self.filter.custom_commands.clone(),
        }
    }

    /// Whether `path` has one of the configured extensions
    pub fn accepts_path(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.filter
                    .extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<DoxyConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<DoxyConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use doxy_filter::{DoxygenFilter, TagType};
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(!config.filter.preserve_whitespace);
        assert_eq!(config.filter.syntax, SyntaxChoice::Auto);
        assert!(config.filter.extensions.iter().any(|e| e == "py"));
        assert!(config.filter.custom_commands.is_empty());
        assert_eq!(config.output.format, "json");
        assert_eq!(config.filter_config().syntax, None);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("filter.syntax", "python")
            .expect("override to apply")
            .set_override("output.format", "yaml")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.filter.syntax, SyntaxChoice::Python);
        assert_eq!(config.filter_config().syntax, Some(Syntax::Python));
        assert_eq!(config.output.format, "yaml");
    }

    #[test]
    fn user_file_adds_custom_commands() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[filter]
preserve_whitespace = true

[[filter.custom_commands]]
pattern = '\\english\b'
name = "english"
type = "placeholder"
"#
        )
        .unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert!(config.filter.preserve_whitespace);
        assert_eq!(config.filter.custom_commands.len(), 1);
        let custom = &config.filter.custom_commands[0];
        assert_eq!(custom.name, "english");
        assert_eq!(custom.tag, TagType::Placeholder);
        assert!(custom.translatable);

        let filter = DoxygenFilter::with_config(config.filter_config()).unwrap();
        assert!(filter.commands().contains("english"));
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/no/such/doxy.toml")
            .build()
            .unwrap();
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn accepts_configured_extensions() {
        let config = load_defaults().unwrap();
        assert!(config.accepts_path("src/widget.H"));
        assert!(config.accepts_path("tools/gen.py"));
        assert!(!config.accepts_path("README.md"));
        assert!(!config.accepts_path("Makefile"));
    }
}

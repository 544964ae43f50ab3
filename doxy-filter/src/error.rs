//! Error types for filtering and merging

use thiserror::Error;

/// Errors raised while reading, parsing, or writing a Doxygen-commented file
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not valid UTF-8 (byte offset {offset})")]
    Encoding { offset: usize },

    #[error("invalid command definition '{name}': {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("command table could not be loaded: {0}")]
    CommandTable(#[from] serde_yaml::Error),

    #[error("no text unit with id '{0}'")]
    UnknownTextUnit(String),

    #[error("text unit '{unit}' has no code {{{code}}}")]
    UnknownCode { unit: String, code: usize },

    #[error("translation of '{unit}' contains the comment closer `{closer}`")]
    InvalidTarget { unit: String, closer: String },

    #[error("unbalanced brace in translated text for '{unit}' at offset {offset}")]
    MalformedMarkup { unit: String, offset: usize },
}

impl FilterError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        FilterError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

/// Result alias used throughout the filter
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors raised by extraction formats
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("format '{0}' not found")]
    FormatNotFound(String),

    #[error("{0}")]
    NotSupported(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("could not parse {format} input: {message}")]
    Parse { format: String, message: String },
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::Serialization(err.to_string())
    }
}

//! Built-in extraction formats

pub mod json;
pub mod text;
pub mod yaml;

pub use json::JsonFormat;
pub use text::TextFormat;
pub use yaml::YamlFormat;

//! Format trait definition
//!
//! Extracted units leave the filter through a [Format]. Every format works on the same flat list
//! of [ExtractedUnit]s, so a listing written by one can be read back by another as long as both
//! support it.

use crate::error::FormatError;
use crate::resource::Document;
use serde::{Deserialize, Serialize};

/// A text unit as handed to translators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedUnit {
    pub id: String,
    /// Id of the comment block the unit came from
    pub group: String,
    pub translatable: bool,
    /// Source text as generic markup
    pub text: String,
}

/// Collect the units of `doc`, skipping untranslatable ones unless asked for
pub fn extract(doc: &Document, include_untranslatable: bool) -> Vec<ExtractedUnit> {
    doc.comments()
        .flat_map(|block| {
            block
                .units
                .iter()
                .filter(move |u| include_untranslatable || u.translatable)
                .map(move |u| ExtractedUnit {
                    id: u.id.clone(),
                    group: block.id.clone(),
                    translatable: u.translatable,
                    text: u.source.to_generic(),
                })
        })
        .collect()
}

/// Trait for extraction formats
///
/// Formats can support parsing, serialization, or both.
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "json", "yaml")
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Whether this format can read a listing back
    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse a listing into units
    ///
    /// Default implementation returns NotSupported error.
    fn parse(&self, _source: &str) -> Result<Vec<ExtractedUnit>, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize units into a listing
    ///
    /// Default implementation returns NotSupported error.
    fn serialize(&self, _units: &[ExtractedUnit]) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}

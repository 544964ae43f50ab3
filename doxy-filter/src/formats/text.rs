//! Plain listing for reading in a terminal
//!
//!     [tu1] (g1) This is a test.
//!     [tu2] (g1) * int x;
//!
//! Untranslatable units are marked with `*`. Newlines inside a unit are shown as `\n`.

use crate::error::FormatError;
use crate::format::{ExtractedUnit, Format};

pub struct TextFormat;

impl Format for TextFormat {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "One line per text unit"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, units: &[ExtractedUnit]) -> Result<String, FormatError> {
        let mut out = String::new();
        for unit in units {
            out.push_str(&format!("[{}] ({}) ", unit.id, unit.group));
            if !unit.translatable {
                out.push_str("* ");
            }
            out.push_str(&unit.text.replace('\n', "\\n"));
            out.push('\n');
        }
        Ok(out)
    }
}

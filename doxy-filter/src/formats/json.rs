//! JSON listing: an array of units, pretty printed

use crate::error::FormatError;
use crate::format::{ExtractedUnit, Format};

pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "JSON array of text units"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<ExtractedUnit>, FormatError> {
        serde_json::from_str(source).map_err(|e| FormatError::Parse {
            format: "json".to_string(),
            message: e.to_string(),
        })
    }

    fn serialize(&self, units: &[ExtractedUnit]) -> Result<String, FormatError> {
        let mut out = serde_json::to_string_pretty(units)?;
        out.push('\n');
        Ok(out)
    }
}

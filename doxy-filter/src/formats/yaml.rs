//! YAML listing, one mapping per unit

use crate::error::FormatError;
use crate::format::{ExtractedUnit, Format};

pub struct YamlFormat;

impl Format for YamlFormat {
    fn name(&self) -> &str {
        "yaml"
    }

    fn description(&self) -> &str {
        "YAML sequence of text units"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Vec<ExtractedUnit>, FormatError> {
        serde_yaml::from_str(source).map_err(|e| FormatError::Parse {
            format: "yaml".to_string(),
            message: e.to_string(),
        })
    }

    fn serialize(&self, units: &[ExtractedUnit]) -> Result<String, FormatError> {
        serde_yaml::to_string(units).map_err(|e| FormatError::Serialization(e.to_string()))
    }
}

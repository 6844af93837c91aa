use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::data::TagFlattener;
use crate::error::ConfigError;
use crate::input::DEFAULT_OVERRIDE_TOOL;

/// Session settings. Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tool receiving secondary-button input regardless of the selection
    pub override_tool: String,
    /// Tool selected when the toolbox is initialised
    pub default_tool: Option<String>,
    /// Disable the native context menu on bound surfaces
    pub suppress_context_menu: bool,
    /// Extra tag → keyword entries for flattening DICOM metadata
    pub dicom_keywords: BTreeMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            override_tool: DEFAULT_OVERRIDE_TOOL.to_string(),
            default_tool: None,
            suppress_context_menu: true,
            dicom_keywords: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Tag flattener with the default keyword table extended by `dicom_keywords`
    pub fn tag_flattener(&self) -> TagFlattener {
        self.dicom_keywords
            .iter()
            .fold(TagFlattener::default(), |flattener, (tag, keyword)| {
                flattener.with_keyword(tag.as_str(), keyword.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json_str(r#"{ "default_tool": "Scroll" }"#).unwrap();
        assert_eq!(config.default_tool.as_deref(), Some("Scroll"));
        assert_eq!(config.override_tool, "WindowLevel");
        assert!(config.suppress_context_menu);
    }

    #[test]
    fn test_keywords_extend_flattener() {
        let config = SessionConfig::from_json_str(r#"{ "dicom_keywords": { "x00100010": "PatientName" } }"#).unwrap();
        let flattener = config.tag_flattener();
        assert_eq!(flattener.keyword("x00100010"), Some("PatientName"));
        assert_eq!(flattener.keyword("x00200013"), Some("InstanceNumber"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            SessionConfig::from_json_str("{ not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(matches!(
            SessionConfig::load("/nonexistent/viewer-session.json"),
            Err(ConfigError::ReadError(_))
        ));
    }
}

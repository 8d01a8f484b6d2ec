//! Settings file loader
//!
//! Reads [`ModuleSettings`] from YAML or JSON documents. Files ending in
//! `.json` are parsed as JSON; everything else is parsed as YAML.

use std::{fs, path::Path};

use tracing::debug;

use super::settings::ModuleSettings;
use crate::error::{ParametersError, Result};

/// Loader for module settings files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from `path`
    ///
    /// A missing file yields default (empty) settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid settings
    /// document.
    pub fn load_from_path(path: &Path) -> Result<ModuleSettings> {
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(ModuleSettings::default());
        }

        let content = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        debug!(path = %path.display(), json = is_json, "Loading module settings");
        if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        }
    }

    /// Parse a YAML settings document
    ///
    /// An empty document yields default settings.
    pub fn parse_yaml(content: &str) -> Result<ModuleSettings> {
        if content.trim().is_empty() {
            return Ok(ModuleSettings::default());
        }

        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ParametersError::InvalidConfiguration(format!("Invalid YAML: {}", e)))?;

        if !value.is_mapping() {
            return Err(ParametersError::InvalidConfiguration(
                "settings document must be a mapping".to_string(),
            ));
        }

        Ok(serde_yaml::from_value(value)?)
    }

    /// Parse a JSON settings document
    pub fn parse_json(content: &str) -> Result<ModuleSettings> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| ParametersError::InvalidConfiguration(format!("Invalid JSON: {}", e)))?;

        if !value.is_object() {
            return Err(ParametersError::InvalidConfiguration(
                "settings document must be an object".to_string(),
            ));
        }

        Ok(serde_json::from_value(value)?)
    }
}

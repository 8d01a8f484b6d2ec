//! Declarative module settings

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    error::{ParametersError, Result},
    module::Module,
};

/// Settings a module is configured with
///
/// ```yaml
/// parameters:
///   mode: dev
///   foo: true
///   bar: 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Initial parameters, name to value
    ///
    /// Kept untyped so a malformed block is reported as a configuration error
    /// when applied rather than as a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ModuleSettings {
    /// Settings declaring the given parameters
    pub fn with_parameters(parameters: Map<String, Value>) -> Self {
        Self {
            parameters: Some(Value::Object(parameters)),
        }
    }
}

/// Applies and exports the settings of one module
#[derive(Debug, Clone)]
pub struct SettingsManager {
    module: Module,
}

impl SettingsManager {
    pub fn new(module: Module) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    /// Apply every recognised setting
    pub fn apply(&self, settings: &ModuleSettings) -> Result<()> {
        if let Some(parameters) = &settings.parameters {
            self.set_parameters(parameters)?;
        }
        Ok(())
    }

    /// Register every entry of a `parameters` block
    ///
    /// # Errors
    ///
    /// - `ModuleReady` if the module is ready
    /// - `InvalidConfiguration` if `parameters` is not a key/value map
    pub fn set_parameters(&self, parameters: &Value) -> Result<()> {
        if self.module.is_ready() {
            return Err(ParametersError::module_ready(
                self.module.name(),
                "change module settings",
            ));
        }

        let map = parameters.as_object().ok_or_else(|| {
            ParametersError::InvalidConfiguration(format!(
                "option \"parameters\" of module \"{}\" must be a key/value map, got {}",
                self.module.name(),
                parameters
            ))
        })?;

        let manager = self.module.parameter_manager();
        for (name, value) in map {
            manager.register(name, value.clone())?;
        }

        debug!(
            module = %self.module.name(),
            count = map.len(),
            "Parameters applied from settings"
        );
        Ok(())
    }

    /// Snapshot of every parameter visible to the module
    pub fn get_parameters(&self) -> Result<Map<String, Value>> {
        let parameters = self
            .module
            .parameter_manager()
            .get_parameters(false, true)?;

        Ok(parameters
            .into_iter()
            .map(|(name, parameter)| (name, parameter.into_value()))
            .collect())
    }
}

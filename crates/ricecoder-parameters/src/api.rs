//! Public facade for working with a module's parameters
//!
//! # Examples
//!
//! ```ignore
//! use ricecoder_parameters::{create_module, ModuleSettings};
//! use serde_json::json;
//!
//! let app = create_module("app", ModuleSettings::default())?;
//! app.register_parameter("param3", json!(30))?;
//! app.set_parameter("param3", json!(35))?;
//! app.setup()?;
//!
//! assert_eq!(app.get_parameter("param3")?, json!(35));
//! assert!(app.set_parameter("param3", json!(40)).is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde_json::Value;

use crate::{
    config::{ModuleSettings, SettingsManager},
    error::Result,
    manager::ParameterManager,
    module::{Module, ModuleInstance},
    parser::ParserPipeline,
};

/// Create a module and apply its settings
///
/// # Errors
///
/// - `InvalidArgument` if `name` is empty
/// - `InvalidConfiguration` if the `parameters` block is not a key/value map
pub fn create_module(name: &str, settings: ModuleSettings) -> Result<ModuleApi> {
    let api = ModuleApi::new(Module::new(name)?);
    api.settings_manager().apply(&settings)?;
    Ok(api)
}

/// Parameter operations exposed on a module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleApi {
    module: Module,
}

impl ModuleApi {
    pub fn new(module: Module) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn name(&self) -> &str {
        self.module.name()
    }

    pub fn is_ready(&self) -> bool {
        self.module.is_ready()
    }

    pub fn parameter_manager(&self) -> &ParameterManager {
        self.module.parameter_manager()
    }

    pub fn settings_manager(&self) -> SettingsManager {
        SettingsManager::new(self.module.clone())
    }

    pub fn register_parameter(&self, name: &str, value: Value) -> Result<()> {
        self.parameter_manager().register(name, value)
    }

    /// Register every entry of a key/value map
    pub fn register_parameters(&self, parameters: Value) -> Result<()> {
        self.settings_manager().set_parameters(&parameters)
    }

    pub fn set_parameter(&self, name: &str, value: Value) -> Result<()> {
        self.parameter_manager().set(name, value)
    }

    pub fn get_parameter(&self, name: &str) -> Result<Value> {
        self.parameter_manager().get(name)
    }

    pub fn isset_parameter(&self, name: &str) -> Result<bool> {
        self.parameter_manager().isset(name, false)
    }

    pub fn rename_parameter(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.parameter_manager().rename(old_name, new_name)
    }

    pub fn attach_plugin(&self, plugin: &ModuleApi) -> Result<()> {
        self.module.attach_plugin(&plugin.module)
    }

    pub fn on_config<F>(&self, listener: F)
    where
        F: Fn(&Module) -> Result<()> + Send + Sync + 'static,
    {
        self.module.on_config(listener);
    }

    pub fn on_ready<F>(&self, listener: F)
    where
        F: Fn(&Module) -> Result<()> + Send + Sync + 'static,
    {
        self.module.on_ready(listener);
    }

    pub fn setup(&self) -> Result<()> {
        self.module.setup()
    }

    pub fn create_instance(&self) -> ModuleInstance {
        self.module.create_instance()
    }

    /// Template pipeline resolving placeholders against this module
    pub fn parser(&self) -> ParserPipeline {
        ParserPipeline::for_module(&self.module)
    }

    /// Resolve placeholders in `value` and everything nested in it
    pub fn parse(&self, value: Value) -> Result<Value> {
        self.parser().parse_recursive(value)
    }
}

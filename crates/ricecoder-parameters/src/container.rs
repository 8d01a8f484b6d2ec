//! Read-only parameter view for module instances

use std::{collections::HashMap, fmt, sync::Weak};

use serde_json::Value;

use crate::{
    error::Result,
    manager::ParameterManager,
    module::{instance::InstanceNode, Module, ModuleInstance},
    parameter::Parameter,
    source::ParameterSource,
};

/// Lens over the parameters of an instance's module
///
/// Created once per [`ModuleInstance`]. It has no state of its own and no way
/// to register or change parameters; every read goes through the module's
/// manager with full tree resolution.
pub struct ParameterContainer {
    instance: Weak<InstanceNode>,
    module: Module,
}

impl ParameterContainer {
    pub(crate) fn new(instance: Weak<InstanceNode>, module: Module) -> Self {
        Self { instance, module }
    }

    /// The instance this container belongs to, while it is alive
    pub fn module_instance(&self) -> Option<ModuleInstance> {
        self.instance.upgrade().map(ModuleInstance::from_node)
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    fn parameter_manager(&self) -> &ParameterManager {
        self.module.parameter_manager()
    }

    /// Every parameter visible to the module
    pub fn get_parameters(&self) -> Result<HashMap<String, Parameter>> {
        self.parameter_manager().get_parameters(false, true)
    }

    pub fn get(&self, name: &str) -> Result<Value> {
        self.parameter_manager().get(name)
    }

    pub fn isset(&self, name: &str) -> Result<bool> {
        self.parameter_manager().isset(name, false)
    }
}

impl ParameterSource for ParameterContainer {
    fn get(&self, name: &str) -> Result<Value> {
        ParameterContainer::get(self, name)
    }

    fn isset(&self, name: &str) -> Result<bool> {
        ParameterContainer::isset(self, name)
    }
}

impl fmt::Debug for ParameterContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterContainer")
            .field("module", &self.module.name())
            .finish()
    }
}

//! Parameter manager
//!
//! Every [`Module`] owns one `ParameterManager` holding the parameters that
//! module declared itself. Reads resolve across the whole module tree; writes
//! only ever touch the local set and are rejected once the module is ready.
//!
//! # Resolution
//!
//! The effective view of a module is the union of the local sets of every
//! module in its tree, visited from the root in pre-order (the module itself,
//! then each plug-in subtree in attachment order). When several modules
//! declare the same name, the one visited last wins, so a plug-in attached
//! later shadows the root and earlier plug-ins.
//!
//! # Examples
//!
//! ```ignore
//! use ricecoder_parameters::Module;
//! use serde_json::json;
//!
//! let app = Module::new("app")?;
//! let manager = app.parameter_manager();
//!
//! manager.register("mode", json!("dev"))?;
//! manager.set("mode", json!("prod"))?;
//! assert_eq!(manager.get("mode")?, json!("prod"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{
    collections::HashMap,
    fmt,
    sync::Weak,
};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    error::{ParametersError, Result},
    module::{Module, ModuleNode},
    parameter::{validate_name, Parameter},
    source::ParameterSource,
};

/// Owner of one module's local parameters
pub struct ParameterManager {
    module: Weak<ModuleNode>,
    parameters: RwLock<HashMap<String, Parameter>>,
}

impl ParameterManager {
    pub(crate) fn new(module: Weak<ModuleNode>) -> Self {
        Self {
            module,
            parameters: RwLock::new(HashMap::new()),
        }
    }

    /// The module owning this manager
    pub fn module(&self) -> Result<Module> {
        self.module
            .upgrade()
            .map(Module::from_node)
            .ok_or_else(|| {
                ParametersError::InconsistentState(
                    "parameter manager outlived its module".to_string(),
                )
            })
    }

    /// Parameters visible from this module
    ///
    /// - `local_only`: only the parameters declared by this module
    /// - `include_parent_scope`: for a plug-in, resolve from the tree root so
    ///   the view includes ancestors and siblings; when false a plug-in sees
    ///   only its own subtree
    pub fn get_parameters(
        &self,
        local_only: bool,
        include_parent_scope: bool,
    ) -> Result<HashMap<String, Parameter>> {
        if local_only {
            return Ok(self.parameters.read().clone());
        }

        let module = self.module()?;

        if include_parent_scope && !module.is_root() {
            let root = module.root();
            debug!(
                module = %module.name(),
                root = %root.name(),
                "Resolving parameters from tree root"
            );
            return root.parameter_manager().get_parameters(false, false);
        }

        let mut parameters = HashMap::new();
        module.each_module(|current| {
            let local = current.parameter_manager().parameters.read();
            parameters.extend(
                local
                    .iter()
                    .map(|(name, parameter)| (name.clone(), parameter.clone())),
            );
        });
        Ok(parameters)
    }

    /// Register a parameter in this module
    ///
    /// An existing local parameter with the same name is replaced.
    ///
    /// # Errors
    ///
    /// - `ModuleReady` if the module is ready
    /// - `InvalidArgument` if `name` is empty
    pub fn register(&self, name: &str, value: Value) -> Result<()> {
        let module = self.module()?;
        if module.is_ready() {
            return Err(ParametersError::module_ready(
                module.name(),
                "register new parameter",
            ));
        }

        let parameter = Parameter::new(name, value)?;
        let replaced = self
            .parameters
            .write()
            .insert(name.to_string(), parameter);

        if replaced.is_some() {
            warn!(
                module = %module.name(),
                parameter = %name,
                "Parameter registered again; previous value replaced"
            );
        } else {
            debug!(module = %module.name(), parameter = %name, "Parameter registered");
        }
        Ok(())
    }

    /// Change the value of a parameter declared by this module
    ///
    /// Parameters declared by other modules of the tree are not writable
    /// from here.
    ///
    /// # Errors
    ///
    /// - `ModuleReady` if the module is ready
    /// - `ParameterNotFound` if the name is not declared locally
    pub fn set(&self, name: &str, value: Value) -> Result<()> {
        let module = self.module()?;
        if module.is_ready() {
            return Err(ParametersError::module_ready(
                module.name(),
                "change parameter value",
            ));
        }

        let mut parameters = self.parameters.write();
        let parameter = parameters
            .get_mut(name)
            .ok_or_else(|| ParametersError::ParameterNotFound(name.to_string()))?;
        parameter.set_value(value);

        debug!(module = %module.name(), parameter = %name, "Parameter value changed");
        Ok(())
    }

    /// Resolved value of `name` as seen by this module
    ///
    /// # Errors
    ///
    /// Returns `ParameterNotFound` if no module of the tree declares it
    pub fn get(&self, name: &str) -> Result<Value> {
        self.get_parameters(false, true)?
            .remove(name)
            .map(Parameter::into_value)
            .ok_or_else(|| ParametersError::ParameterNotFound(name.to_string()))
    }

    /// Whether `name` is visible, locally or through the whole tree
    pub fn isset(&self, name: &str, local_only: bool) -> Result<bool> {
        if local_only {
            return Ok(self.parameters.read().contains_key(name));
        }
        Ok(self.get_parameters(false, true)?.contains_key(name))
    }

    /// Rename a parameter wherever it is declared in the tree
    ///
    /// Every module that declares `old_name` locally gets the parameter moved
    /// to `new_name`, keeping its value. A local parameter already named
    /// `new_name` is replaced.
    ///
    /// # Errors
    ///
    /// - `ModuleReady` if this module or a declaring module is ready
    /// - `ParameterNotFound` if `old_name` is not visible
    /// - `InvalidArgument` if `new_name` is empty
    /// - `InconsistentState` if a declaring module lost the parameter mid-way
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<()> {
        let module = self.module()?;
        if module.is_ready() {
            return Err(ParametersError::module_ready(module.name(), "rename parameter"));
        }
        if !self.isset(old_name, false)? {
            return Err(ParametersError::ParameterNotFound(old_name.to_string()));
        }
        validate_name(new_name, "the new parameter name")?;

        let owners = Self::locate(old_name, &module.root());
        if let Some(ready) = owners.iter().find(|owner| owner.is_ready()) {
            return Err(ParametersError::module_ready(ready.name(), "rename parameter"));
        }

        for owner in &owners {
            let mut parameters = owner.parameter_manager().parameters.write();
            let mut parameter = parameters.remove(old_name).ok_or_else(|| {
                ParametersError::InconsistentState(format!(
                    "module \"{}\" was reported as declaring \"{}\" but does not",
                    owner.name(),
                    old_name
                ))
            })?;
            parameter.set_name(new_name)?;

            if parameters.insert(new_name.to_string(), parameter).is_some() {
                warn!(
                    module = %owner.name(),
                    parameter = %new_name,
                    "Rename replaced an existing parameter"
                );
            }
        }

        info!(
            module = %module.name(),
            from = %old_name,
            to = %new_name,
            locations = owners.len(),
            "Parameter renamed"
        );
        Ok(())
    }

    /// Names of the modules declaring `name` locally, searching the whole tree
    pub fn get_locations(&self, name: &str) -> Result<Vec<String>> {
        let root = self.module()?.root();
        Ok(self.get_locations_from(name, &root))
    }

    /// Names of the modules declaring `name` locally in the subtree of `start`
    pub fn get_locations_from(&self, name: &str, start: &Module) -> Vec<String> {
        Self::locate(name, start)
            .iter()
            .map(|module| module.name().to_string())
            .collect()
    }

    fn locate(name: &str, start: &Module) -> Vec<Module> {
        let mut owners = Vec::new();
        start.each_module(|module| {
            if module.parameter_manager().parameters.read().contains_key(name) {
                owners.push(module.clone());
            }
        });
        owners
    }
}

impl ParameterSource for ParameterManager {
    fn get(&self, name: &str) -> Result<Value> {
        ParameterManager::get(self, name)
    }

    fn isset(&self, name: &str) -> Result<bool> {
        ParameterManager::isset(self, name, false)
    }
}

impl fmt::Debug for ParameterManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let module = self.module.upgrade().map(Module::from_node);
        f.debug_struct("ParameterManager")
            .field("module", &module.as_ref().map(Module::name))
            .field("parameters", &*self.parameters.read())
            .finish()
    }
}

//! Runtime instances of a module

use std::{
    fmt,
    sync::{Arc, Weak},
};

use tracing::debug;

use super::Module;
use crate::container::ParameterContainer;

pub(crate) struct InstanceNode {
    module: Module,
    container: ParameterContainer,
}

/// A runtime instantiation of a module definition
///
/// Each instance gets its own read-only [`ParameterContainer`] when it is
/// created.
#[derive(Clone)]
pub struct ModuleInstance {
    node: Arc<InstanceNode>,
}

impl ModuleInstance {
    /// Instantiate `module`
    pub fn new(module: &Module) -> Self {
        let node = Arc::new_cyclic(|weak: &Weak<InstanceNode>| InstanceNode {
            module: module.clone(),
            container: ParameterContainer::new(weak.clone(), module.clone()),
        });

        debug!(module = %module.name(), "Module instance initialized");
        Self { node }
    }

    pub(crate) fn from_node(node: Arc<InstanceNode>) -> Self {
        Self { node }
    }

    /// The module this instance was created from
    pub fn module(&self) -> &Module {
        &self.node.module
    }

    /// Read-only parameter view for this instance
    pub fn parameter_container(&self) -> &ParameterContainer {
        &self.node.container
    }
}

impl PartialEq for ModuleInstance {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("module", &self.module().name())
            .finish()
    }
}

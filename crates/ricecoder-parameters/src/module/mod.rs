//! Module tree
//!
//! A [`Module`] is a named node that owns a [`ParameterManager`] and an ordered
//! list of plug-in modules. Plug-ins keep a weak link to the module they are
//! attached to, so the tree never forms reference cycles and the root is found
//! by walking parent links.
//!
//! # Lifecycle
//!
//! 1. `Module::new` creates the node and its parameter manager.
//! 2. Plug-ins are attached with [`Module::attach_plugin`] and parameters are
//!    registered.
//! 3. [`Module::setup`] on the root runs `config` listeners for every module,
//!    flips the whole tree to ready and runs `ready` listeners.
//!
//! After step 3 parameters can still be read but never written.
//!
//! # Examples
//!
//! ```ignore
//! use ricecoder_parameters::Module;
//! use serde_json::json;
//!
//! let app = Module::new("app")?;
//! let plugin = Module::new("app-plugin")?;
//! app.attach_plugin(&plugin)?;
//!
//! app.parameter_manager().register("mode", json!("dev"))?;
//! plugin.parameter_manager().register("mode", json!("prod"))?;
//! app.setup()?;
//!
//! assert_eq!(app.parameter_manager().get("mode")?, json!("prod"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod events;
pub mod instance;

pub use events::{LifecycleEvent, LifecycleListener};
pub use instance::ModuleInstance;

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
};

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    error::{ParametersError, Result},
    manager::ParameterManager,
    parameter::validate_name,
    source::ParameterSource,
};

use events::EventManager;

pub(crate) struct ModuleNode {
    name: String,
    ready: AtomicBool,
    parent: RwLock<Weak<ModuleNode>>,
    plugins: RwLock<Vec<Module>>,
    parameters: ParameterManager,
    events: EventManager,
}

/// Handle to a module node
///
/// Cloning is cheap and yields another handle to the same node. Equality is
/// identity, not name.
#[derive(Clone)]
pub struct Module {
    node: Arc<ModuleNode>,
}

impl Module {
    /// Create a new root module with an empty parameter manager
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is empty
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name, "the name of module")?;

        let node = Arc::new_cyclic(|weak: &Weak<ModuleNode>| ModuleNode {
            name,
            ready: AtomicBool::new(false),
            parent: RwLock::new(Weak::new()),
            plugins: RwLock::new(Vec::new()),
            parameters: ParameterManager::new(weak.clone()),
            events: EventManager::default(),
        });

        debug!(module = %node.name, "Module initialized");
        Ok(Self { node })
    }

    pub(crate) fn from_node(node: Arc<ModuleNode>) -> Self {
        Self { node }
    }

    /// Module name
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Whether the module has been set up
    pub fn is_ready(&self) -> bool {
        self.node.ready.load(Ordering::Acquire)
    }

    /// The module's parameter manager
    pub fn parameter_manager(&self) -> &ParameterManager {
        &self.node.parameters
    }

    /// Module this plug-in is attached to, if any
    pub fn parent(&self) -> Option<Module> {
        self.node.parent.read().upgrade().map(Module::from_node)
    }

    /// Whether the module is not attached to any other module
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Top of the tree this module belongs to
    pub fn root(&self) -> Module {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Attached plug-ins in attachment order
    pub fn plugins(&self) -> Vec<Module> {
        self.node.plugins.read().clone()
    }

    pub fn has_plugins(&self) -> bool {
        !self.node.plugins.read().is_empty()
    }

    /// Attach `plugin` under this module
    ///
    /// The plug-in's parameters join this module's scope and it sees every
    /// parameter of the tree.
    ///
    /// # Errors
    ///
    /// - `ModuleReady` if either module is ready
    /// - `InvalidArgument` if `plugin` is already attached somewhere, or is
    ///   this module or one of its ancestors
    pub fn attach_plugin(&self, plugin: &Module) -> Result<()> {
        if self.is_ready() {
            return Err(ParametersError::module_ready(self.name(), "attach plug-in"));
        }
        if plugin.is_ready() {
            return Err(ParametersError::module_ready(plugin.name(), "attach as plug-in"));
        }
        if let Some(parent) = plugin.parent() {
            return Err(ParametersError::InvalidArgument(format!(
                "module \"{}\" is already a plug-in of \"{}\"",
                plugin.name(),
                parent.name()
            )));
        }

        let mut ancestor = Some(self.clone());
        while let Some(current) = ancestor {
            if &current == plugin {
                return Err(ParametersError::InvalidArgument(format!(
                    "module \"{}\" can't be a plug-in of its own subtree",
                    plugin.name()
                )));
            }
            ancestor = current.parent();
        }

        *plugin.node.parent.write() = Arc::downgrade(&self.node);
        self.node.plugins.write().push(plugin.clone());

        info!(
            module = %self.name(),
            plugin = %plugin.name(),
            "Plug-in attached"
        );
        Ok(())
    }

    /// Visit this module and every plug-in below it
    ///
    /// Order is pre-order: the module itself, then each plug-in subtree in
    /// attachment order.
    pub fn each_module<F>(&self, mut callback: F)
    where
        F: FnMut(&Module),
    {
        fn walk<F: FnMut(&Module)>(module: &Module, callback: &mut F) {
            callback(module);
            for plugin in module.plugins() {
                walk(&plugin, callback);
            }
        }
        walk(self, &mut callback);
    }

    /// Every module of this subtree in [`each_module`](Self::each_module) order
    pub fn modules(&self) -> Vec<Module> {
        let mut modules = Vec::new();
        self.each_module(|module| modules.push(module.clone()));
        modules
    }

    /// First module named `name` in this subtree
    pub fn find_module(&self, name: &str) -> Option<Module> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    /// Register a listener run while the tree is being configured
    pub fn on_config<F>(&self, listener: F)
    where
        F: Fn(&Module) -> Result<()> + Send + Sync + 'static,
    {
        self.node
            .events
            .add_listener(LifecycleEvent::Config, Arc::new(listener));
    }

    /// Register a listener run once the tree is ready
    pub fn on_ready<F>(&self, listener: F)
    where
        F: Fn(&Module) -> Result<()> + Send + Sync + 'static,
    {
        self.node
            .events
            .add_listener(LifecycleEvent::Ready, Arc::new(listener));
    }

    /// Configure the tree rooted here and make it ready
    ///
    /// Config listeners run for every module in traversal order while writes
    /// are still allowed. Plug-ins attached by a config listener are
    /// configured afterwards and become ready with the rest of the tree. If
    /// any listener fails, setup stops and the tree stays not ready.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if called on a plug-in
    /// - `ModuleReady` if already set up
    /// - any error returned by a listener
    pub fn setup(&self) -> Result<()> {
        if !self.is_root() {
            return Err(ParametersError::InvalidArgument(format!(
                "module \"{}\" is a plug-in; set up its root \"{}\" instead",
                self.name(),
                self.root().name()
            )));
        }
        if self.is_ready() {
            return Err(ParametersError::module_ready(self.name(), "set up module"));
        }

        // Config listeners may attach more plug-ins; configure those too.
        let mut configured: Vec<Module> = Vec::new();
        loop {
            let pending: Vec<Module> = self
                .modules()
                .into_iter()
                .filter(|module| !configured.contains(module))
                .collect();
            if pending.is_empty() {
                break;
            }
            for module in pending {
                module.node.events.trigger(LifecycleEvent::Config, &module)?;
                configured.push(module);
            }
        }

        let modules = self.modules();

        for module in &modules {
            module.node.ready.store(true, Ordering::Release);
        }
        info!(
            module = %self.name(),
            module_count = modules.len(),
            "Module tree is ready"
        );

        for module in &modules {
            module.node.events.trigger(LifecycleEvent::Ready, module)?;
        }
        Ok(())
    }

    /// Create a runtime instance of this module
    pub fn create_instance(&self) -> ModuleInstance {
        ModuleInstance::new(self)
    }
}

impl ParameterSource for Module {
    fn get(&self, name: &str) -> Result<Value> {
        self.parameter_manager().get(name)
    }

    fn isset(&self, name: &str) -> Result<bool> {
        self.parameter_manager().isset(name, false)
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Module {}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("name", &self.name())
            .field("ready", &self.is_ready())
            .field(
                "plugins",
                &self
                    .plugins()
                    .iter()
                    .map(|p| p.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

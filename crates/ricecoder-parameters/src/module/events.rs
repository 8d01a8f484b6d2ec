//! Lifecycle listeners for modules

use std::{collections::HashMap, fmt, sync::Arc};

use parking_lot::RwLock;
use tracing::debug;

use super::Module;
use crate::error::Result;

/// Callback invoked for a lifecycle event
pub type LifecycleListener = Arc<dyn Fn(&Module) -> Result<()> + Send + Sync>;

/// Lifecycle events a module emits during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Module is being configured; parameters are still writable
    Config,
    /// Module and its whole tree became ready; parameters are frozen
    Ready,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleEvent::Config => write!(f, "config"),
            LifecycleEvent::Ready => write!(f, "ready"),
        }
    }
}

/// Listener lists keyed by event, in registration order
#[derive(Default)]
pub(crate) struct EventManager {
    listeners: RwLock<HashMap<LifecycleEvent, Vec<LifecycleListener>>>,
}

impl EventManager {
    pub(crate) fn add_listener(&self, event: LifecycleEvent, listener: LifecycleListener) {
        self.listeners.write().entry(event).or_default().push(listener);
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self, event: LifecycleEvent) -> usize {
        self.listeners.read().get(&event).map_or(0, Vec::len)
    }

    /// Run every listener for `event`, stopping at the first error
    pub(crate) fn trigger(&self, event: LifecycleEvent, module: &Module) -> Result<()> {
        // Listeners may call back into the module, so don't hold the lock.
        let listeners = self.listeners.read().get(&event).cloned().unwrap_or_default();

        if listeners.is_empty() {
            return Ok(());
        }

        debug!(
            module = %module.name(),
            event = %event,
            listener_count = listeners.len(),
            "Triggering lifecycle listeners"
        );

        for listener in listeners {
            listener(module)?;
        }
        Ok(())
    }
}

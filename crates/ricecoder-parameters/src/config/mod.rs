//! Module settings and settings files
//!
//! A module's settings carry a `parameters` block that is translated into one
//! registration per entry when the module is created. Settings can be built in
//! code or loaded from YAML/JSON files with [`ConfigLoader`].

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{ModuleSettings, SettingsManager};

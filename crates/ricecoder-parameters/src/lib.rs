//! RiceCoder Parameters
//!
//! Named configuration values for modules and their plug-ins, with `%name%`
//! placeholder interpolation.
//!
//! # Overview
//!
//! Modules declare parameters while they are being configured. Once a module
//! tree is set up its parameters are frozen and can be read from anywhere in
//! the tree, from module instances, and from any string passed through the
//! template pipeline.
//!
//! # Architecture
//!
//! 1. **Parameter** (`parameter`): a name and a JSON value
//! 2. **Module tree** (`module`): modules, plug-ins, lifecycle and instances
//! 3. **Parameter Manager** (`manager`): per-module storage and tree-wide
//!    resolution
//! 4. **Parameter Container** (`container`): read-only view for instances
//! 5. **Template Parsers** (`parser`): pipeline and the `%name%` parser
//! 6. **Configuration** (`config`): declarative settings and settings files
//!
//! # Quick Start
//!
//! ```ignore
//! use ricecoder_parameters::{create_module, ModuleSettings};
//! use serde_json::json;
//!
//! let app = create_module(
//!     "app",
//!     ModuleSettings {
//!         parameters: Some(json!({"mode": "dev", "bar": 10})),
//!     },
//! )?;
//!
//! let plugin = create_module("app-plugin", ModuleSettings::default())?;
//! plugin.register_parameter("mode", json!("prod"))?;
//! app.attach_plugin(&plugin)?;
//! app.setup()?;
//!
//! // Plug-ins attached later shadow earlier declarations.
//! assert_eq!(app.get_parameter("mode")?, json!("prod"));
//!
//! // Whole-string placeholders keep the value's type.
//! assert_eq!(app.parse(json!("%bar%"))?, json!(10));
//! assert_eq!(app.parse(json!("Mode: %mode%"))?, json!("Mode: prod"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T>`, an alias for
//! `std::result::Result<T, ParametersError>`. Errors are never retried or
//! swallowed.
//!
//! # Thread Safety
//!
//! Modules, managers and containers are `Send + Sync`. Writes are only
//! accepted before setup, so after setup every reader sees the same values.

pub mod api;
pub mod config;
pub mod container;
pub mod error;
pub mod manager;
pub mod module;
pub mod parameter;
pub mod parser;
pub mod source;

// Re-export public types
pub use api::{create_module, ModuleApi};
pub use config::{ConfigLoader, ModuleSettings, SettingsManager};
pub use container::ParameterContainer;
pub use error::{ParametersError, Result};
pub use manager::ParameterManager;
pub use module::{LifecycleEvent, LifecycleListener, Module, ModuleInstance};
pub use parameter::Parameter;
pub use parser::{ParameterParser, ParserPipeline, TemplateParser};
pub use source::ParameterSource;

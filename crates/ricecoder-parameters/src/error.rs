//! Error types for the parameters system
//!
//! All failures are synchronous and fatal to the call that raised them. They
//! describe misuse of the API (bad names, writes after readiness, unknown
//! parameters) rather than transient conditions, so nothing here is retried.
//!
//! # Examples
//!
//! ```ignore
//! match module.get_parameter("mode") {
//!     Ok(value) => println!("mode = {}", value),
//!     Err(ParametersError::ParameterNotFound(name)) => eprintln!("no parameter {}", name),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Errors that can occur in the parameters system
#[derive(Debug, Error)]
pub enum ParametersError {
    /// Malformed argument passed to a constructor or setter
    ///
    /// Raised for empty parameter names, empty module names and empty rename
    /// targets.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Mutation attempted after the owning module became ready
    ///
    /// Once a module tree is set up its parameters are frozen. `action`
    /// describes the rejected operation.
    #[error("Can't {action} when module \"{module}\" is ready")]
    ModuleReady {
        /// Name of the ready module
        module: String,
        /// The rejected operation
        action: String,
    },

    /// Parameter name could not be resolved
    #[error("Parameter with name \"{0}\" not exists")]
    ParameterNotFound(String),

    /// Invalid module configuration
    ///
    /// Common causes:
    /// - The `parameters` block is not a key/value map
    /// - Malformed settings document
    #[error("Invalid module configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal bookkeeping no longer matches the module tree
    ///
    /// Raised when a module reported by the location walk does not own the
    /// parameter being renamed, or when a handle outlived its module.
    #[error("Inconsistent parameter state: {0}")]
    InconsistentState(String),

    /// Placeholder interpolation failed
    #[error("Parameter substitution error: {0}")]
    SubstitutionError(String),

    /// YAML (de)serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error while reading settings files
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ParametersError {
    pub(crate) fn module_ready(module: &str, action: &str) -> Self {
        ParametersError::ModuleReady {
            module: module.to_string(),
            action: action.to_string(),
        }
    }
}

/// Result type for parameters operations
pub type Result<T> = std::result::Result<T, ParametersError>;

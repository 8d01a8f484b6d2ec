//! Read access to resolved parameters

use serde_json::Value;

use crate::error::Result;

/// Anything parameters can be read from with full tree resolution
///
/// Implemented by [`ParameterManager`](crate::ParameterManager),
/// [`Module`](crate::Module) and [`ParameterContainer`](crate::ParameterContainer).
/// The placeholder parser reads through this trait so it never sees a
/// mutation surface.
pub trait ParameterSource: Send + Sync {
    /// Resolved value of `name`
    ///
    /// # Errors
    ///
    /// Returns `ParameterNotFound` if the name is not visible
    fn get(&self, name: &str) -> Result<Value>;

    /// Whether `name` is visible
    fn isset(&self, name: &str) -> Result<bool>;
}

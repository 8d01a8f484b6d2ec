//! The parameter record stored by a [`ParameterManager`](crate::ParameterManager)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ParametersError, Result};

/// A named parameter value
///
/// The name is fixed for the lifetime of the parameter except when the
/// owning manager renames it. The value may be any JSON value, including
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: Value,
}

impl Parameter {
    /// Create a new parameter
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `name` is empty
    pub fn new(name: impl Into<String>, value: Value) -> Result<Self> {
        let mut parameter = Self {
            name: String::new(),
            value,
        };
        parameter.set_name(name)?;
        Ok(parameter)
    }

    /// Parameter name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the value. Any value is accepted.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Consume the parameter and return its value
    pub fn into_value(self) -> Value {
        self.value
    }

    // Only the manager renames parameters; it moves the map key alongside.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        validate_name(&name, "the name of parameter")?;
        self.name = name;
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ParametersError::InvalidArgument(format!(
            "{} must be a non-empty string",
            what
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_parameter() {
        let parameter = Parameter::new("mode", json!("dev")).unwrap();
        assert_eq!(parameter.name(), "mode");
        assert_eq!(parameter.value(), &json!("dev"));
    }

    #[test]
    fn test_new_parameter_empty_name() {
        let result = Parameter::new("", json!(1));
        assert!(matches!(result, Err(ParametersError::InvalidArgument(_))));
    }

    #[test]
    fn test_null_value_allowed() {
        let parameter = Parameter::new("nothing", Value::Null).unwrap();
        assert!(parameter.value().is_null());
    }

    #[test]
    fn test_set_value_any_type() {
        let mut parameter = Parameter::new("bar", json!(10)).unwrap();
        parameter.set_value(json!({"nested": [1, 2, 3]}));
        assert_eq!(parameter.value(), &json!({"nested": [1, 2, 3]}));
    }

    #[test]
    fn test_set_name_rejects_empty() {
        let mut parameter = Parameter::new("bar", json!(10)).unwrap();
        assert!(parameter.set_name("").is_err());
        assert_eq!(parameter.name(), "bar");
    }
}

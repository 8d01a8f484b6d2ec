//! Template parser pipeline
//!
//! A [`ParserPipeline`] feeds values through an ordered list of
//! [`TemplateParser`]s. Each parser receives the output of the previous one
//! and a reference to the pipeline itself, so a parser can run fragments of
//! its input through the whole pipeline again.
//!
//! # Examples
//!
//! ```ignore
//! use ricecoder_parameters::{Module, ParserPipeline};
//! use serde_json::json;
//!
//! let app = Module::new("app")?;
//! app.parameter_manager().register("mode", json!("prod"))?;
//!
//! let pipeline = ParserPipeline::for_module(&app);
//! assert_eq!(pipeline.parse(json!("Mode: %mode%"))?, json!("Mode: prod"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod parameter;

pub use parameter::ParameterParser;

use std::{fmt, sync::Arc};

use serde_json::Value;
use tracing::debug;

use crate::{error::Result, module::Module};

/// A rewriting step of the template pipeline
pub trait TemplateParser: Send + Sync {
    /// Unique parser name within a pipeline
    fn name(&self) -> &str;

    /// Rewrite `value`
    ///
    /// Values the parser does not understand must be returned unchanged.
    fn parse(&self, value: Value, pipeline: &ParserPipeline) -> Result<Value>;
}

/// Ordered list of template parsers
#[derive(Clone, Default)]
pub struct ParserPipeline {
    parsers: Vec<Arc<dyn TemplateParser>>,
}

impl ParserPipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline resolving `%name%` placeholders against `module`
    pub fn for_module(module: &Module) -> Self {
        let mut pipeline = Self::new();
        pipeline.register(Arc::new(ParameterParser::new(Arc::new(module.clone()))));
        pipeline
    }

    /// Add a parser at the end of the pipeline
    ///
    /// A parser with the same name is replaced in place.
    pub fn register(&mut self, parser: Arc<dyn TemplateParser>) {
        match self.parsers.iter().position(|p| p.name() == parser.name()) {
            Some(index) => {
                debug!(parser = %parser.name(), "Replacing template parser");
                self.parsers[index] = parser;
            }
            None => {
                debug!(parser = %parser.name(), "Registering template parser");
                self.parsers.push(parser);
            }
        }
    }

    pub fn has_parser(&self, name: &str) -> bool {
        self.parsers.iter().any(|p| p.name() == name)
    }

    /// Parser names in execution order
    pub fn parser_names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Feed `value` through every parser in order
    pub fn parse(&self, value: Value) -> Result<Value> {
        self.parsers
            .iter()
            .try_fold(value, |value, parser| parser.parse(value, self))
    }

    /// Parse every string inside `value`, walking arrays and object values
    ///
    /// Object keys are left untouched.
    pub fn parse_recursive(&self, value: Value) -> Result<Value> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.parse_recursive(item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            Value::Object(map) => {
                let mut parsed = serde_json::Map::with_capacity(map.len());
                for (key, item) in map {
                    parsed.insert(key, self.parse_recursive(item)?);
                }
                Ok(Value::Object(parsed))
            }
            other => self.parse(other),
        }
    }
}

impl fmt::Debug for ParserPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserPipeline")
            .field("parsers", &self.parser_names())
            .finish()
    }
}

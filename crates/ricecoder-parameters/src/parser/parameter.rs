//! `%name%` placeholder parser
//!
//! Strings containing `%name%` tokens are rewritten with resolved parameter
//! values:
//!
//! - If the whole string is a single placeholder, the result is the raw
//!   parameter value, keeping its type (`"%bar%"` can yield the number `30`).
//! - Otherwise each placeholder, leftmost first, is replaced with the value's
//!   text form until no placeholder is left.
//!
//! Before lookup the captured name is fed through the whole pipeline, so other
//! parsers can compute parameter names.
//!
//! Values may contain placeholders themselves; those are expanded as well. A
//! placeholder reached again through its own value is a `SubstitutionError`.

use std::{
    ops::Range,
    sync::{Arc, OnceLock},
};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{ParserPipeline, TemplateParser};
use crate::{
    error::{ParametersError, Result},
    source::ParameterSource,
};

/// Name the parser registers under
pub const PARSER_NAME: &str = "parameter";

/// Text spliced in by a substitution, with the names that produced it
struct Expansion {
    range: Range<usize>,
    chain: Vec<String>,
}

/// Template parser resolving `%name%` placeholders
pub struct ParameterParser {
    source: Arc<dyn ParameterSource>,
}

impl ParameterParser {
    /// Create a parser reading from `source`
    pub fn new(source: Arc<dyn ParameterSource>) -> Self {
        Self { source }
    }

    fn resolve_name(&self, raw: &str, pipeline: &ParserPipeline) -> Result<String> {
        Ok(match pipeline.parse(Value::String(raw.to_string()))? {
            Value::String(name) => name,
            other => value_to_string(&other),
        })
    }

    fn substitute(&self, mut text: String, pipeline: &ParserPipeline) -> Result<Value> {
        let regex = placeholder_regex();
        let mut expansions: Vec<Expansion> = Vec::new();

        while let Some(caps) = regex.captures(&text) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let range = whole.range();
            let name = self.resolve_name(inner.as_str(), pipeline)?;

            // Names whose values produced the text this placeholder was found in.
            let mut chain = expansions
                .iter()
                .filter(|expansion| {
                    expansion.range.start < range.end && range.start < expansion.range.end
                })
                .map(|expansion| &expansion.chain)
                .max_by_key(|chain| chain.len())
                .cloned()
                .unwrap_or_default();
            if chain.contains(&name) {
                chain.push(name.clone());
                return Err(ParametersError::SubstitutionError(format!(
                    "parameter \"{}\" references itself: {}",
                    name,
                    chain.join(" -> ")
                )));
            }

            let replacement = value_to_string(&self.source.get(&name)?);
            debug!(parameter = %name, depth = chain.len(), "Substituting embedded placeholder");

            let inserted = range.start..range.start + replacement.len();
            expansions = shift_expansions(expansions, &range, replacement.len());
            text.replace_range(range, &replacement);

            if !inserted.is_empty() {
                chain.push(name);
                expansions.push(Expansion {
                    range: inserted,
                    chain,
                });
            }
        }

        Ok(Value::String(text))
    }
}

/// Move recorded expansions past `replaced`, now `len` bytes long
///
/// Parts of an expansion overwritten by the replacement are dropped.
fn shift_expansions(
    expansions: Vec<Expansion>,
    replaced: &Range<usize>,
    len: usize,
) -> Vec<Expansion> {
    let removed = replaced.end - replaced.start;
    let mut shifted = Vec::with_capacity(expansions.len() + 1);

    for Expansion { range, chain } in expansions {
        if range.end <= replaced.start {
            shifted.push(Expansion { range, chain });
            continue;
        }
        if range.start < replaced.start {
            shifted.push(Expansion {
                range: range.start..replaced.start,
                chain: chain.clone(),
            });
        }
        if range.end > replaced.end {
            let start = range.start.max(replaced.end);
            shifted.push(Expansion {
                range: start - removed + len..range.end - removed + len,
                chain,
            });
        }
    }
    shifted
}

impl TemplateParser for ParameterParser {
    fn name(&self) -> &str {
        PARSER_NAME
    }

    fn parse(&self, value: Value, pipeline: &ParserPipeline) -> Result<Value> {
        let text = match value {
            Value::String(text) if placeholder_regex().is_match(&text) => text,
            other => return Ok(other),
        };

        if let Some(caps) = whole_placeholder_regex().captures(&text) {
            if let Some(inner) = caps.get(1) {
                let name = self.resolve_name(inner.as_str(), pipeline)?;
                debug!(parameter = %name, "Substituting whole-string placeholder");
                return self.source.get(&name);
            }
        }

        self.substitute(text, pipeline)
    }
}

/// Text form of a value spliced into a larger string
///
/// Strings are inserted as-is, scalars in their display form, `null` as
/// `"null"`, arrays and objects as compact JSON. Floats with no fractional
/// part drop the `.0` (`1.0` becomes `"1"`).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"%([^%]+)%").expect("Invalid regex"))
}

fn whole_placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^%([^%]+)%$").expect("Invalid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Module;
    use serde_json::json;

    fn create_test_module() -> Module {
        let app = Module::new("app").unwrap();
        let manager = app.parameter_manager();
        manager.register("mode", json!("prod")).unwrap();
        manager.register("foo", json!(false)).unwrap();
        manager.register("bar", json!(30)).unwrap();
        manager.register("list", json!([1, 2])).unwrap();
        manager.register("nothing", Value::Null).unwrap();
        manager.register("host", json!("localhost")).unwrap();
        manager.register("port", json!(8080)).unwrap();
        app
    }

    fn parse(module: &Module, value: Value) -> Result<Value> {
        ParserPipeline::for_module(module).parse(value)
    }

    #[test]
    fn test_non_string_unchanged() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!(42)).unwrap(), json!(42));
        assert_eq!(parse(&app, json!({"a": "%mode%"})).unwrap(), json!({"a": "%mode%"}));
    }

    #[test]
    fn test_string_without_placeholder_unchanged() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!("plain text")).unwrap(), json!("plain text"));
        assert_eq!(parse(&app, json!("100%")).unwrap(), json!("100%"));
        assert_eq!(parse(&app, json!("%%")).unwrap(), json!("%%"));
    }

    #[test]
    fn test_whole_string_keeps_number() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!("%bar%")).unwrap(), json!(30));
    }

    #[test]
    fn test_whole_string_keeps_bool() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!("%foo%")).unwrap(), json!(false));
    }

    #[test]
    fn test_whole_string_keeps_array_and_null() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!("%list%")).unwrap(), json!([1, 2]));
        assert_eq!(parse(&app, json!("%nothing%")).unwrap(), Value::Null);
    }

    #[test]
    fn test_embedded_placeholder() {
        let app = create_test_module();
        assert_eq!(
            parse(&app, json!("My mode is %mode%")).unwrap(),
            json!("My mode is prod")
        );
    }

    #[test]
    fn test_embedded_non_string_values() {
        let app = create_test_module();
        assert_eq!(
            parse(&app, json!("bar=%bar% foo=%foo% list=%list% nothing=%nothing%")).unwrap(),
            json!("bar=30 foo=false list=[1,2] nothing=null")
        );
    }

    #[test]
    fn test_multiple_placeholders() {
        let app = create_test_module();
        assert_eq!(
            parse(&app, json!("http://%host%:%port%/")).unwrap(),
            json!("http://localhost:8080/")
        );
    }

    #[test]
    fn test_adjacent_placeholders() {
        let app = create_test_module();
        assert_eq!(parse(&app, json!("%host%%port%")).unwrap(), json!("localhost8080"));
    }

    #[test]
    fn test_unknown_placeholder() {
        let app = create_test_module();
        assert!(matches!(
            parse(&app, json!("Value: %missing%")),
            Err(ParametersError::ParameterNotFound(name)) if name == "missing"
        ));
        assert!(matches!(
            parse(&app, json!("%missing%")),
            Err(ParametersError::ParameterNotFound(_))
        ));
    }

    #[test]
    fn test_value_with_placeholder_is_expanded() {
        let app = create_test_module();
        app.parameter_manager()
            .register("url", json!("http://%host%"))
            .unwrap();

        assert_eq!(
            parse(&app, json!("Open %url% now")).unwrap(),
            json!("Open http://localhost now")
        );
        // Whole-string substitution returns the raw value.
        assert_eq!(parse(&app, json!("%url%")).unwrap(), json!("http://%host%"));
    }

    #[test]
    fn test_self_reference_fails() {
        let app = create_test_module();
        app.parameter_manager()
            .register("loop", json!("again %loop%"))
            .unwrap();

        assert!(matches!(
            parse(&app, json!("start %loop%")),
            Err(ParametersError::SubstitutionError(_))
        ));
    }

    #[test]
    fn test_mutual_reference_fails() {
        let app = create_test_module();
        let manager = app.parameter_manager();
        manager.register("ping", json!("ping -> %pong%")).unwrap();
        manager.register("pong", json!("pong -> %ping%")).unwrap();

        let result = parse(&app, json!("chain: %ping%"));
        assert!(matches!(
            result,
            Err(ParametersError::SubstitutionError(message)) if message.contains("ping -> pong -> ping")
        ));
    }

    #[test]
    fn test_same_value_nested_twice_is_not_a_cycle() {
        let app = create_test_module();
        let manager = app.parameter_manager();
        manager.register("pair", json!("%host%/%host%")).unwrap();

        assert_eq!(
            parse(&app, json!("%pair% and %pair%")).unwrap(),
            json!("localhost/localhost and localhost/localhost")
        );
    }

    #[test]
    fn test_many_placeholders() {
        let app = create_test_module();
        app.parameter_manager().register("x", json!("a")).unwrap();

        let parsed = parse(&app, json!("%x% ".repeat(300))).unwrap();
        assert_eq!(parsed, json!("a ".repeat(300)));

        let distinct: String = (0..300).map(|i| format!("%p{}%,", i)).collect();
        for i in 0..300 {
            app.parameter_manager()
                .register(&format!("p{}", i), json!(i))
                .unwrap();
        }
        let expected: String = (0..300).map(|i| format!("{},", i)).collect();
        assert_eq!(parse(&app, json!(distinct)).unwrap(), json!(expected));
    }

    struct PrefixParser;

    impl TemplateParser for PrefixParser {
        fn name(&self) -> &str {
            "env-prefix"
        }

        fn parse(&self, value: Value, _pipeline: &ParserPipeline) -> Result<Value> {
            Ok(match value {
                Value::String(s) if s.starts_with('@') => Value::String(format!("prod_{}", &s[1..])),
                other => other,
            })
        }
    }

    #[test]
    fn test_name_resolved_through_pipeline() {
        let app = create_test_module();
        app.parameter_manager()
            .register("prod_db", json!("postgres"))
            .unwrap();

        let mut pipeline = ParserPipeline::for_module(&app);
        pipeline.register(Arc::new(PrefixParser));

        assert_eq!(pipeline.parse(json!("%@db%")).unwrap(), json!("postgres"));
        assert_eq!(
            pipeline.parse(json!("db: %@db%")).unwrap(),
            json!("db: postgres")
        );
    }

    #[test]
    fn test_parser_without_pipeline_parsers() {
        let app = create_test_module();
        let source: Arc<dyn ParameterSource> = Arc::new(app.clone());

        let parser = ParameterParser::new(source);
        let pipeline = ParserPipeline::new();
        assert_eq!(parser.parse(json!("%bar%"), &pipeline).unwrap(), json!(30));
        assert_eq!(
            parser.parse(json!("mode %mode%"), &pipeline).unwrap(),
            json!("mode prod")
        );
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("s")), "s");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(1.0)), "1");
        assert_eq!(value_to_string(&json!(-3.0)), "-3");
        assert_eq!(value_to_string(&json!(-0.0)), "0");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&Value::Null), "null");
        assert_eq!(value_to_string(&json!({"a": 1})), "{\"a\":1}");
    }
}

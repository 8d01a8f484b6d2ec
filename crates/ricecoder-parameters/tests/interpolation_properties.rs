//! Property-based tests for placeholder interpolation
//!
//! **Feature: ricecoder-parameters, Property 5: Whole-string placeholders keep the value type**
//! **Feature: ricecoder-parameters, Property 6: Embedded placeholders are string-coerced**
//! **Feature: ricecoder-parameters, Property 7: Text without placeholders passes through**

use proptest::prelude::*;
use ricecoder_parameters::parser::parameter::value_to_string;
use ricecoder_parameters::*;
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Strategy for generating valid parameter names
fn parameter_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(|s| s.to_string())
}

/// Strategy for generating values that never contain `%`
fn parameter_value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,20}".prop_map(Value::String),
        Just(Value::Null),
    ];
    leaf.prop_recursive(2, 8, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// Strategy for text that holds no placeholder
fn plain_text_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 :/._-]{0,30}".prop_map(|s| s.to_string())
}

fn ready_app(name: &str, value: Value) -> ModuleApi {
    let app = create_module("app", ModuleSettings::default()).unwrap();
    app.register_parameter(name, value).unwrap();
    app.setup().unwrap();
    app
}

proptest! {
    /// Property 5: `%name%` alone resolves to the stored value unchanged
    #[test]
    fn prop_whole_placeholder_preserves_type(
        name in parameter_name_strategy(),
        value in parameter_value_strategy(),
    ) {
        init_tracing();
        let app = ready_app(&name, value.clone());

        let parsed = app.parser().parse(json!(format!("%{}%", name))).unwrap();
        prop_assert_eq!(parsed, value);
    }

    /// Property 6: Placeholders inside text are replaced by the value's text form
    #[test]
    fn prop_embedded_placeholder_coerced(
        name in parameter_name_strategy(),
        value in parameter_value_strategy(),
        prefix in plain_text_strategy(),
        suffix in plain_text_strategy(),
    ) {
        prop_assume!(!prefix.is_empty() || !suffix.is_empty());
        let app = ready_app(&name, value.clone());

        let template = format!("{}%{}%{}", prefix, name, suffix);
        let parsed = app.parser().parse(Value::String(template)).unwrap();

        let expected = format!("{}{}{}", prefix, value_to_string(&value), suffix);
        prop_assert_eq!(parsed, Value::String(expected));
    }

    /// Property 6: Every occurrence of every placeholder is replaced
    #[test]
    fn prop_multiple_placeholders_replaced(
        first in -1000i64..1000,
        second in "[a-z]{1,10}",
        repeat in 1usize..4,
    ) {
        let app = create_module("app", ModuleSettings::default()).unwrap();
        app.register_parameter("first", json!(first)).unwrap();
        app.register_parameter("second", json!(second.clone())).unwrap();

        let template = "[%first%-%second%]".repeat(repeat);
        let parsed = app.parser().parse(Value::String(template)).unwrap();

        let expected = format!("[{}-{}]", first, second).repeat(repeat);
        prop_assert_eq!(parsed, Value::String(expected));
    }

    /// Property 7: Strings without placeholders and non-strings are returned as-is
    #[test]
    fn prop_plain_values_pass_through(
        text in plain_text_strategy(),
        value in parameter_value_strategy(),
    ) {
        let app = create_module("app", ModuleSettings::default()).unwrap();
        let pipeline = app.parser();

        prop_assert_eq!(pipeline.parse(json!(text.clone())).unwrap(), json!(text));
        if !value.is_string() {
            prop_assert_eq!(pipeline.parse(value.clone()).unwrap(), value);
        }
    }

    /// Unknown names fail instead of resolving to an empty string
    #[test]
    fn prop_unknown_placeholder_fails(
        name in parameter_name_strategy(),
        prefix in plain_text_strategy(),
    ) {
        let app = create_module("app", ModuleSettings::default()).unwrap();
        let pipeline = app.parser();

        let whole = pipeline.parse(json!(format!("%{}%", name)));
        prop_assert!(matches!(whole, Err(ParametersError::ParameterNotFound(_))));

        let embedded = pipeline.parse(json!(format!("{}x%{}%", prefix, name)));
        prop_assert!(matches!(embedded, Err(ParametersError::ParameterNotFound(_))));
    }
}

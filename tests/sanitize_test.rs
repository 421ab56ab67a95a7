//! Integration tests for `sanitizeIt` chains.

use contextual_validator::{AtomicRegistry, ConfigError, RegistryError, Validator};
use serde_json::{json, Value};

fn sanitized(sanitize: Value, input: Value) -> Value {
    let v = Validator::from_json(
        &json!({ "f": { "sanitizeIt": sanitize } }),
        AtomicRegistry::with_builtins(),
    )
    .unwrap();
    let data = v.validate(&json!({ "f": input }), "x").unwrap().into_result().unwrap();
    data.save.get("f").cloned().unwrap_or(Value::Null)
}

#[test]
fn test_single_and_chained_sanitizers() {
    assert_eq!(sanitized(json!("trim"), json!("  a  ")), json!("a"));
    assert_eq!(sanitized(json!(["trim", "toInt"]), json!(" 42 ")), json!(42));
}

#[test]
fn test_sanitizers_run_in_declared_order() {
    // ltrim('x') then trim: 'xx  a' -> '  a' -> 'a'
    assert_eq!(sanitized(json!([{ "ltrim": ["x"] }, "trim"]), json!("xx  a")), json!("a"));
    // trim then ltrim('x'): 'xx  a' -> 'xx  a' -> '  a'
    assert_eq!(sanitized(json!(["trim", { "ltrim": ["x"] }]), json!("xx  a")), json!("  a"));
}

#[test]
fn test_sanitizer_arguments() {
    assert_eq!(sanitized(json!({ "trim": ["-"] }), json!("--a--")), json!("a"));
    assert_eq!(sanitized(json!({ "toBoolean": [true] }), json!("yes")), json!(false));
    assert_eq!(sanitized(json!("toBoolean"), json!("yes")), json!(true));
}

#[test]
fn test_escape() {
    assert_eq!(
        sanitized(json!("escape"), json!("<b>\"x\" & 'y'</b>")),
        json!("&lt;b&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;&#x2F;b&gt;")
    );
}

#[test]
fn test_sanitizer_runs_after_check() {
    let v = Validator::from_json(
        &json!({ "n": { "checkIf": "isInt", "sanitizeIt": "toInt" } }),
        AtomicRegistry::with_builtins(),
    )
    .unwrap();
    // the check sees the raw text
    assert!(v.validate(&json!({ "n": " 4" }), "x").unwrap().is_failure());
    let data = v.validate(&json!({ "n": "4" }), "x").unwrap().into_result().unwrap();
    assert_eq!(data.save["n"], json!(4));
}

#[test]
fn test_custom_sanitizer() {
    let registry = AtomicRegistry::with_builtins();
    registry
        .register_sanitizer("upper", |value: &Value, _: &[Value]| {
            Ok::<_, RegistryError>(json!(value.as_str().unwrap_or_default().to_uppercase()))
        })
        .unwrap();
    let v = Validator::from_json(&json!({ "code": { "sanitizeIt": ["trim", "upper"] } }), registry)
        .unwrap();

    let data = v.validate(&json!({ "code": " ab " }), "x").unwrap().into_result().unwrap();
    assert_eq!(data.save["code"], json!("AB"));
}

#[test]
fn test_misused_sanitizer_is_config_error() {
    let v = Validator::from_json(
        &json!({ "f": { "sanitizeIt": { "trim": [5] } } }),
        AtomicRegistry::with_builtins(),
    )
    .unwrap();
    assert!(matches!(
        v.validate(&json!({ "f": "a" }), "x"),
        Err(ConfigError::Atomic { .. })
    ));
}

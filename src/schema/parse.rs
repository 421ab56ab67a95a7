//! Parsing JSON schema literals into typed schemas.
//!
//! Schema literals mix strings, arrays and objects in the same slots. This
//! module turns each slot into its closed type once, so malformed schemas fail
//! at load time instead of mid-traversal.

use serde_json::{Map, Value};

use super::check::{AtomicCall, CheckRule};
use super::condition::{Chain, Condition, Operator, PayloadHas, Predicate};
use super::defaults::Defaults;
use super::gate::{Action, Gate};
use super::remap::Remap;
use super::{FieldRule, FieldType, Schema};
use crate::error::ConfigError;
use crate::path::Breadcrumb;

const FIELD_KEYS: &[&str] = &[
    "requireIt",
    "refuseIt",
    "saveIt",
    "checkIf",
    "type",
    "itemsProperties",
    "properties",
    "defaults",
    "default",
    "sanitizeIt",
    "remapIt",
];

pub(super) fn parse_schema(schema: &Value, path: &Breadcrumb) -> Result<Schema, ConfigError> {
    let fields = schema.as_object().ok_or_else(|| {
        ConfigError::malformed(path.to_string(), format!("schema must be an object, got {}", schema))
    })?;

    let mut parsed = Schema::new();
    for (key, node) in fields {
        let field_path = path.push_field(key);
        parsed = parsed.field(key.clone(), parse_field(node, &field_path)?);
    }
    Ok(parsed)
}

fn parse_field(node: &Value, path: &Breadcrumb) -> Result<FieldRule, ConfigError> {
    let field = path.to_string();
    let node = node.as_object().ok_or_else(|| {
        ConfigError::malformed(&field, format!("field rule must be an object, got {}", node))
    })?;

    for key in node.keys().filter(|k| !FIELD_KEYS.contains(&k.as_str())) {
        tracing::debug!(field = %field, key = %key, "ignoring unknown schema key");
    }

    let mut rule = FieldRule::new()
        .require(parse_gate(node.get("requireIt"), Action::Require, &field)?)
        .refuse(parse_gate(node.get("refuseIt"), Action::Refuse, &field)?)
        .save(parse_gate(node.get("saveIt"), Action::Save, &field)?);

    if let Some(check) = node.get("checkIf") {
        rule = rule.check(parse_check(check, &field)?);
    }

    rule.field_type = parse_type(node, path)?;
    rule.defaults = parse_defaults(node, &field)?;

    if let Some(sanitize) = node.get("sanitizeIt") {
        rule.sanitize = parse_sanitize(sanitize, &field)?;
    }

    if let Some(remap) = node.get("remapIt") {
        rule = rule.remap(parse_remap(remap, &field)?);
    }

    Ok(rule)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn parse_gate(value: Option<&Value>, action: Action, field: &str) -> Result<Gate, ConfigError> {
    let value = match value {
        None => return Ok(Gate::Unset),
        Some(v) if is_falsy(v) => return Ok(Gate::Unset),
        Some(v) => v,
    };

    let malformed = || ConfigError::MalformedGate {
        field: field.to_string(),
        action: action.key(),
        found: value.to_string(),
    };

    match value {
        Value::String(s) if s == "always" => Ok(Gate::Always),
        Value::String(s) if s == "never" => Ok(Gate::Never),
        Value::Object(obj) => match obj.get("when") {
            Some(when) if obj.len() == 1 => Ok(Gate::When(parse_condition(when, field)?)),
            _ => Err(malformed()),
        },
        _ => Err(malformed()),
    }
}

/// Parses a condition expression: a literal, a predicate object, or a chain.
pub(super) fn parse_condition(value: &Value, field: &str) -> Result<Condition, ConfigError> {
    match value {
        Value::Array(items) => {
            let chain = parse_chain(items, field, |item| parse_atom(item, field))?;
            Ok(if chain.is_single() {
                chain.operands().next().cloned().unwrap_or(Condition::Literal(true))
            } else {
                Condition::Chain(Box::new(chain))
            })
        }
        other => parse_atom(other, field),
    }
}

fn parse_atom(value: &Value, field: &str) -> Result<Condition, ConfigError> {
    match value {
        Value::String(s) if s == "always" => Ok(Condition::Literal(true)),
        Value::String(s) if s == "never" => Ok(Condition::Literal(false)),
        Value::Object(obj) => Ok(Condition::Predicate(parse_predicate(obj, field)?)),
        Value::Array(_) => Err(ConfigError::MalformedChain {
            field: field.to_string(),
            reason: "nested chains are not supported".to_string(),
        }),
        other => Err(ConfigError::MalformedChain {
            field: field.to_string(),
            reason: format!("expected a condition, got {}", other),
        }),
    }
}

fn parse_predicate(obj: &Map<String, Value>, field: &str) -> Result<Predicate, ConfigError> {
    let mut entries = obj.iter();
    let (key, arg) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(ConfigError::malformed(
                field,
                format!(
                    "a predicate object must have exactly one key, got {}",
                    Value::Object(obj.clone())
                ),
            ))
        }
    };

    match key.as_str() {
        "contextIs" => Ok(Predicate::ContextIs(parse_tokens(arg, "contextIs", field)?)),
        "contextIsNot" => Ok(Predicate::ContextIsNot(parse_tokens(
            arg,
            "contextIsNot",
            field,
        )?)),
        "payloadHas" => Ok(Predicate::PayloadHas(parse_payload_has(arg, field)?)),
        other => Err(ConfigError::UnknownPredicate {
            field: field.to_string(),
            key: other.to_string(),
        }),
    }
}

fn parse_tokens(arg: &Value, predicate: &'static str, field: &str) -> Result<Vec<String>, ConfigError> {
    let malformed = || ConfigError::MalformedPredicate {
        field: field.to_string(),
        predicate,
        reason: format!("expected a context token or a list of tokens, got {}", arg),
    };

    match arg {
        Value::String(token) => Ok(vec![token.clone()]),
        Value::Array(tokens) => tokens
            .iter()
            .map(|t| t.as_str().map(str::to_string).ok_or_else(&malformed))
            .collect(),
        _ => Err(malformed()),
    }
}

fn parse_payload_has(arg: &Value, field: &str) -> Result<PayloadHas, ConfigError> {
    match arg {
        Value::String(key) => Ok(PayloadHas::Key(key.clone())),
        Value::Object(obj) if obj.len() == 1 => {
            let (key, expected) = obj
                .iter()
                .next()
                .ok_or_else(|| ConfigError::malformed(field, "empty payloadHas"))?;
            Ok(PayloadHas::Equals {
                field: key.clone(),
                expected: expected.clone(),
            })
        }
        other => Err(ConfigError::MalformedPredicate {
            field: field.to_string(),
            predicate: "payloadHas",
            reason: format!("expected a field name or a single-entry object, got {}", other),
        }),
    }
}

/// Parses `[x0, op, x1, op, x2, ...]`, validating the alternation.
fn parse_chain<T>(
    items: &[Value],
    field: &str,
    mut parse_operand: impl FnMut(&Value) -> Result<T, ConfigError>,
) -> Result<Chain<T>, ConfigError> {
    let (first, rest) = items.split_first().ok_or_else(|| ConfigError::MalformedChain {
        field: field.to_string(),
        reason: "empty condition chain".to_string(),
    })?;

    if rest.len() % 2 != 0 {
        return Err(ConfigError::MalformedChain {
            field: field.to_string(),
            reason: "chain must alternate operand, operator, operand".to_string(),
        });
    }

    let mut chain = Chain::new(parse_operand(first)?);
    for pair in rest.chunks(2) {
        let op = pair[0]
            .as_str()
            .and_then(Operator::parse)
            .ok_or_else(|| ConfigError::UnknownOperator {
                field: field.to_string(),
                token: pair[0]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| pair[0].to_string()),
            })?;
        chain = chain.push(op, parse_operand(&pair[1])?);
    }
    Ok(chain)
}

fn parse_call(value: &Value, action: &'static str, field: &str) -> Result<AtomicCall, ConfigError> {
    match value {
        Value::String(name) => Ok(AtomicCall::new(name.clone())),
        Value::Object(obj) if obj.len() == 1 => {
            let (name, args) = obj
                .iter()
                .next()
                .ok_or_else(|| ConfigError::malformed(field, "empty call"))?;
            let args = match args {
                Value::Array(args) => args.clone(),
                single => vec![single.clone()],
            };
            Ok(AtomicCall::with_args(name.clone(), args))
        }
        other => Err(ConfigError::MalformedCall {
            field: field.to_string(),
            action,
            found: other.to_string(),
        }),
    }
}

fn parse_check(value: &Value, field: &str) -> Result<CheckRule, ConfigError> {
    match value {
        Value::Array(items) => Ok(CheckRule::from_chain(parse_chain(items, field, |item| {
            parse_call(item, "checkIf", field)
        })?)),
        single => Ok(CheckRule::new(parse_call(single, "checkIf", field)?)),
    }
}

fn parse_sanitize(value: &Value, field: &str) -> Result<Vec<AtomicCall>, ConfigError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| parse_call(item, "sanitizeIt", field))
            .collect(),
        single => Ok(vec![parse_call(single, "sanitizeIt", field)?]),
    }
}

fn parse_type(node: &Map<String, Value>, path: &Breadcrumb) -> Result<FieldType, ConfigError> {
    let field = path.to_string();
    let nested = |key: &'static str, field_type: &'static str| match node.get(key) {
        Some(schema) => parse_schema(schema, path),
        None => Err(ConfigError::MissingNestedSchema {
            field: field.clone(),
            field_type,
            expected: key,
        }),
    };

    match node.get("type") {
        None | Some(Value::Null) => Ok(FieldType::Scalar),
        Some(Value::String(t)) => match t.as_str() {
            "scalar" => Ok(FieldType::Scalar),
            "array" => Ok(FieldType::Array(nested("itemsProperties", "array")?)),
            "object" => Ok(FieldType::Object(nested("properties", "object")?)),
            other => Err(ConfigError::malformed(
                &field,
                format!("unknown type '{}', expected scalar, array or object", other),
            )),
        },
        Some(other) => Err(ConfigError::malformed(
            &field,
            format!("type must be a string, got {}", other),
        )),
    }
}

fn parse_defaults(node: &Map<String, Value>, field: &str) -> Result<Defaults, ConfigError> {
    let mut defaults = Defaults::default();
    if let Some(per_context) = node.get("defaults") {
        let per_context = per_context.as_object().ok_or_else(|| {
            ConfigError::malformed(
                field,
                format!("defaults must map contexts to values, got {}", per_context),
            )
        })?;
        for (context, value) in per_context {
            defaults.set_for(context.clone(), value.clone().into());
        }
    }
    if let Some(fallback) = node.get("default") {
        defaults.set_fallback(fallback.clone().into());
    }
    Ok(defaults)
}

fn parse_remap(value: &Value, field: &str) -> Result<Remap, ConfigError> {
    let spec = value
        .get("fromArrayToMap")
        .filter(|_| value.as_object().map_or(false, |o| o.len() == 1))
        .ok_or_else(|| {
            ConfigError::malformed(field, format!("unsupported remapIt {}", value))
        })?;

    let map_key_field = spec
        .get("mapKeyField")
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::malformed(field, "fromArrayToMap requires a mapKeyField string"))?;

    match spec.get("allowProperties") {
        None | Some(Value::Null) => Ok(Remap::from_array_to_map(map_key_field)),
        Some(Value::Array(props)) => {
            let props = props
                .iter()
                .map(|p| {
                    p.as_str().map(str::to_string).ok_or_else(|| {
                        ConfigError::malformed(field, "allowProperties must list field names")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Remap::from_array_to_map_with(map_key_field, props))
        }
        Some(other) => Err(ConfigError::malformed(
            field,
            format!("allowProperties must be an array, got {}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn condition(value: Value) -> Result<Condition, ConfigError> {
        parse_condition(&value, "f")
    }

    #[test]
    fn test_literals_and_predicates() {
        assert_eq!(condition(json!("always")).unwrap(), Condition::Literal(true));
        assert_eq!(condition(json!("never")).unwrap(), Condition::Literal(false));
        assert_eq!(
            condition(json!({"contextIs": ["a", "b"]})).unwrap(),
            Condition::context_is_any(["a", "b"])
        );
        assert_eq!(
            condition(json!({"payloadHas": {"category": "Food"}})).unwrap(),
            Condition::payload_has_value("category", json!("Food"))
        );
        assert_eq!(
            condition(json!({"payloadHas": "category"})).unwrap(),
            Condition::payload_has("category")
        );
    }

    #[test]
    fn test_chain() {
        let parsed = condition(json!([
            {"contextIs": "addProduct"},
            "AND",
            {"payloadHas": {"category": "Food"}}
        ]))
        .unwrap();
        let built = Condition::context_is("addProduct")
            .and(Condition::payload_has_value("category", json!("Food")));
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_chain_errors() {
        assert!(matches!(
            condition(json!([{"contextIs": "a"}, "XOR", {"contextIs": "b"}])),
            Err(ConfigError::UnknownOperator { token, .. }) if token == "XOR"
        ));
        assert!(matches!(
            condition(json!([{"contextIs": "a"}, "AND"])),
            Err(ConfigError::MalformedChain { .. })
        ));
        assert!(matches!(condition(json!([])), Err(ConfigError::MalformedChain { .. })));
        assert!(matches!(
            condition(json!([[{"contextIs": "a"}]])),
            Err(ConfigError::MalformedChain { .. })
        ));
    }

    #[test]
    fn test_unknown_predicate() {
        assert!(matches!(
            condition(json!({"contextMaybe": "a"})),
            Err(ConfigError::UnknownPredicate { key, .. }) if key == "contextMaybe"
        ));
        assert!(matches!(
            condition(json!({"contextIs": 5})),
            Err(ConfigError::MalformedPredicate { .. })
        ));
    }

    #[test]
    fn test_gates() {
        assert_eq!(parse_gate(None, Action::Save, "f").unwrap(), Gate::Unset);
        assert_eq!(parse_gate(Some(&json!(false)), Action::Save, "f").unwrap(), Gate::Unset);
        assert_eq!(parse_gate(Some(&json!("")), Action::Save, "f").unwrap(), Gate::Unset);
        assert_eq!(parse_gate(Some(&json!("never")), Action::Save, "f").unwrap(), Gate::Never);
        assert!(matches!(
            parse_gate(Some(&json!("sometimes")), Action::Require, "f"),
            Err(ConfigError::MalformedGate { action: "requireIt", .. })
        ));
        assert!(matches!(
            parse_gate(Some(&json!({"if": "x"})), Action::Refuse, "f"),
            Err(ConfigError::MalformedGate { .. })
        ));
        assert!(parse_gate(Some(&json!(true)), Action::Save, "f").is_err());
    }

    #[test]
    fn test_check_forms() {
        let single = parse_check(&json!("isInt"), "f").unwrap();
        assert_eq!(single, CheckRule::new("isInt"));

        let chain = parse_check(&json!(["isAlpha", "AND", {"isLength": [3, 20]}]), "f").unwrap();
        assert_eq!(
            chain,
            CheckRule::new("isAlpha").and(AtomicCall::with_args("isLength", [json!(3), json!(20)]))
        );

        assert!(parse_check(&json!(5), "f").is_err());
    }

    #[test]
    fn test_sanitize_forms() {
        let chain = parse_sanitize(&json!(["trim", {"ltrim": ["-"]}]), "f").unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].args(), &[json!("-")]);
        assert_eq!(parse_sanitize(&json!("trim"), "f").unwrap().len(), 1);
    }

    #[test]
    fn test_nested_types_require_schema() {
        let schema = json!({"tags": {"type": "array"}});
        match Schema::from_json(&schema) {
            Err(ConfigError::MissingNestedSchema { field, expected, .. }) => {
                assert_eq!(field, "tags");
                assert_eq!(expected, "itemsProperties");
            }
            other => panic!("expected MissingNestedSchema, got {:?}", other),
        }

        let schema = json!({"facts": {"type": "object"}});
        assert!(matches!(
            Schema::from_json(&schema),
            Err(ConfigError::MissingNestedSchema { expected: "properties", .. })
        ));

        let schema = json!({"facts": {"type": "tuple"}});
        assert!(Schema::from_json(&schema).is_err());
    }

    #[test]
    fn test_nested_errors_carry_full_path() {
        let schema = json!({
            "facts": {
                "type": "object",
                "properties": {
                    "sodium": {"requireIt": {"when": {"contextIs": 1}}}
                }
            }
        });
        match Schema::from_json(&schema) {
            Err(ConfigError::MalformedPredicate { field, .. }) => assert_eq!(field, "facts.sodium"),
            other => panic!("expected MalformedPredicate, got {:?}", other),
        }
    }

    #[test]
    fn test_defaults_and_remap() {
        let schema = Schema::from_json(&json!({
            "status": {"defaults": {"addProduct": "draft"}, "default": "active"},
            "tags": {
                "type": "array",
                "itemsProperties": {"id": {}},
                "remapIt": {"fromArrayToMap": {"mapKeyField": "id", "allowProperties": ["id"]}}
            }
        }))
        .unwrap();

        let status = schema.get("status").unwrap();
        assert_eq!(status.defaults().resolve("addProduct"), Some(json!("draft")));
        assert_eq!(status.defaults().resolve("other"), Some(json!("active")));
        assert_eq!(
            schema.get("tags").unwrap().remap_rule(),
            Some(&Remap::from_array_to_map_with("id", ["id"]))
        );

        assert!(Schema::from_json(&json!({"x": {"remapIt": {"toSet": {}}}})).is_err());
        assert!(Schema::from_json(&json!({"x": {"defaults": "draft"}})).is_err());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let schema = Schema::from_json(&json!({"b": {}, "a": {}, "c": {}})).unwrap();
        let keys: Vec<_> = schema.fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}

//! Built-in atomic validators and sanitizers.
//!
//! Checks follow the string-validator convention: the tested value is first
//! rendered to its text form (numbers and booleans as written, `null` as the
//! empty string), then tested. The structural checks `isArray`, `isObject` and
//! `isString` look at the JSON type instead.

mod checks;
mod sanitizers;

use serde_json::Value;

use crate::registry::{AtomicRegistry, RegistryError};

/// Installs every built-in into `registry`, skipping names already taken.
pub(crate) fn install(registry: &AtomicRegistry) {
    for (name, check) in checks::BUILTIN_CHECKS {
        if !registry.has_check(name) {
            let _ = registry.register_check(*name, *check);
        }
    }
    for (name, sanitizer) in sanitizers::BUILTIN_SANITIZERS {
        if !registry.has_sanitizer(name) {
            let _ = registry.register_sanitizer(*name, *sanitizer);
        }
    }
}

type CheckFn = fn(&Value, &[Value]) -> Result<bool, RegistryError>;
type SanitizeFn = fn(&Value, &[Value]) -> Result<Value, RegistryError>;

/// Renders a value the way string validators see it.
pub(crate) fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn arg_usize(name: &str, args: &[Value], idx: usize) -> Result<Option<usize>, RegistryError> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| {
                RegistryError::invalid_argument(
                    name,
                    format!("argument {} must be a non-negative integer, got {}", idx + 1, v),
                )
            }),
    }
}

fn arg_str<'a>(name: &str, args: &'a [Value], idx: usize) -> Result<Option<&'a str>, RegistryError> {
    match args.get(idx) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(v) => Err(RegistryError::invalid_argument(
            name,
            format!("argument {} must be a string, got {}", idx + 1, v),
        )),
    }
}

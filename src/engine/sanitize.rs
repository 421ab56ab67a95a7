use serde_json::Value;

use crate::error::ConfigError;
use crate::path::Breadcrumb;
use crate::registry::AtomicRegistry;
use crate::schema::AtomicCall;

/// Threads `value` through each sanitizer in order.
///
/// Sanitizers never produce validation errors; a failing call is a
/// configuration error.
pub(crate) fn sanitize(
    chain: &[AtomicCall],
    value: Value,
    registry: &AtomicRegistry,
    path: &Breadcrumb,
) -> Result<Value, ConfigError> {
    chain.iter().try_fold(value, |value, call| {
        call.sanitize(registry, &value)
            .map_err(|source| ConfigError::Atomic {
                field: path.to_string(),
                source,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chain_runs_in_order() {
        let registry = AtomicRegistry::with_builtins();
        let chain = vec![
            AtomicCall::new("trim"),
            AtomicCall::with_args("ltrim", [json!("0")]),
            AtomicCall::new("toInt"),
        ];
        let value = sanitize(&chain, json!("  0042 "), &registry, &Breadcrumb::root()).unwrap();
        assert_eq!(value, json!(42));
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let registry = AtomicRegistry::new();
        let value = sanitize(&[], json!({"a": 1}), &registry, &Breadcrumb::root()).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_failing_call_is_config_error() {
        let registry = AtomicRegistry::with_builtins();
        let chain = vec![AtomicCall::with_args("ltrim", [json!(5)])];
        let err = sanitize(&chain, json!("x"), &registry, &Breadcrumb::from_field("name"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Atomic { ref field, .. } if field == "name"));
    }
}

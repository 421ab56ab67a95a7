//! Calls into the atomic registry: `checkIf` expressions and `sanitizeIt` chains.

use std::fmt::{self, Display};

use serde_json::Value;

use super::condition::{Chain, Operator};
use crate::registry::{AtomicRegistry, RegistryError};

/// A named atomic call with its extra positional arguments.
///
/// `'isInt'` is `AtomicCall::new("isInt")`; `{ isLength: [3, 20] }` is
/// `AtomicCall::with_args("isLength", [json!(3), json!(20)])`. The tested
/// value is prepended when the call runs.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicCall {
    name: String,
    args: Vec<Value>,
}

impl AtomicCall {
    /// A bare call with no extra arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A call with extra arguments.
    pub fn with_args(name: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
        }
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The extra arguments.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Runs this call as a check.
    pub fn check(&self, registry: &AtomicRegistry, value: &Value) -> Result<bool, RegistryError> {
        registry.call(&self.name, value, &self.args)
    }

    /// Runs this call as a sanitizer.
    pub fn sanitize(&self, registry: &AtomicRegistry, value: &Value) -> Result<Value, RegistryError> {
        registry.sanitize(&self.name, value, &self.args)
    }
}

impl Display for AtomicCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, Value::Array(self.args.clone()))
        }
    }
}

impl From<&str> for AtomicCall {
    fn from(name: &str) -> Self {
        AtomicCall::new(name)
    }
}

/// A `checkIf` expression: one call, or an AND/OR chain of calls.
///
/// ```rust
/// use contextual_validator::{AtomicCall, AtomicRegistry, CheckRule};
/// use serde_json::json;
///
/// // ['isAlpha', 'AND', { isLength: [3, 20] }]
/// let rule = CheckRule::new("isAlpha")
///     .and(AtomicCall::with_args("isLength", [json!(3), json!(20)]));
///
/// let registry = AtomicRegistry::with_builtins();
/// assert!(rule.evaluate(&registry, &json!("Pasta")).unwrap());
/// assert!(!rule.evaluate(&registry, &json!("a".repeat(40))).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CheckRule(Chain<AtomicCall>);

impl CheckRule {
    /// A single check.
    pub fn new(call: impl Into<AtomicCall>) -> Self {
        CheckRule(Chain::new(call.into()))
    }

    /// Appends `AND call`.
    pub fn and(self, call: impl Into<AtomicCall>) -> Self {
        CheckRule(self.0.push(Operator::And, call.into()))
    }

    /// Appends `OR call`.
    pub fn or(self, call: impl Into<AtomicCall>) -> Self {
        CheckRule(self.0.push(Operator::Or, call.into()))
    }

    pub(crate) fn from_chain(chain: Chain<AtomicCall>) -> Self {
        CheckRule(chain)
    }

    /// Every call in declaration order.
    pub fn calls(&self) -> impl Iterator<Item = &AtomicCall> {
        self.0.operands()
    }

    /// Evaluates every call against `value` and folds the results left to right.
    pub fn evaluate(&self, registry: &AtomicRegistry, value: &Value) -> Result<bool, RegistryError> {
        self.0.try_fold(|call| call.check(registry, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_single_call() {
        let registry = AtomicRegistry::with_builtins();
        let rule = CheckRule::new("isInt");
        assert!(rule.evaluate(&registry, &json!(7)).unwrap());
        assert!(!rule.evaluate(&registry, &json!("seven")).unwrap());
    }

    #[test]
    fn test_or_chain() {
        let registry = AtomicRegistry::with_builtins();
        let rule = CheckRule::new("isInt").or("isBoolean");
        assert!(rule.evaluate(&registry, &json!("true")).unwrap());
        assert!(!rule.evaluate(&registry, &json!("maybe")).unwrap());
    }

    #[test]
    fn test_and_chain_runs_every_check() {
        let registry = AtomicRegistry::with_builtins();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry
            .register_check("counted", move |_: &Value, _: &[Value]| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RegistryError>(true)
            })
            .unwrap();

        let rule = CheckRule::new("isInt").and("counted");
        assert!(!rule.evaluate(&registry, &json!("x")).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_call_errors() {
        let registry = AtomicRegistry::new();
        let rule = CheckRule::new("isInt");
        assert!(rule.evaluate(&registry, &json!(1)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(AtomicCall::new("trim").to_string(), "trim");
        assert_eq!(
            AtomicCall::with_args("isLength", [json!(3), json!(20)]).to_string(),
            "isLength[3,20]"
        );
    }
}

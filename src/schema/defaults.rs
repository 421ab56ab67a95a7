//! Default values substituted for absent, non-required fields.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

/// A default: either a literal or a zero-argument producer called at
/// validation time.
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Wraps a producer closure.
    ///
    /// ```rust
    /// use contextual_validator::DefaultValue;
    /// use serde_json::json;
    ///
    /// let created = DefaultValue::producer(|| json!("2024-01-01"));
    /// assert_eq!(created.produce(), json!("2024-01-01"));
    /// ```
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Producer(Arc::new(f))
    }

    /// Returns the literal, or the producer's fresh result.
    pub fn produce(&self) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Producer(f) => f(),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Literal(value)
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Per-context defaults plus an optional unconditional fallback.
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    per_context: IndexMap<String, DefaultValue>,
    fallback: Option<DefaultValue>,
}

impl Defaults {
    /// Sets the default used when validating under `context`.
    pub fn set_for(&mut self, context: impl Into<String>, value: DefaultValue) {
        self.per_context.insert(context.into(), value);
    }

    /// Sets the default used when no per-context default applies.
    pub fn set_fallback(&mut self, value: DefaultValue) {
        self.fallback = Some(value);
    }

    /// Returns true if nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.per_context.is_empty() && self.fallback.is_none()
    }

    /// Resolves the default for `context`: the per-context entry first, then
    /// the fallback.
    pub fn resolve(&self, context: &str) -> Option<Value> {
        self.per_context
            .get(context)
            .or(self.fallback.as_ref())
            .map(DefaultValue::produce)
    }
}

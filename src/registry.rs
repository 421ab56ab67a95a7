//! Registry of named atomic validators and sanitizers.
//!
//! This module provides the [`AtomicRegistry`] the engine delegates every
//! `checkIf` and `sanitizeIt` call to. A registry is an explicit value built
//! once and handed to a [`Validator`](crate::Validator); there is no global
//! registry to extend.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A named predicate over a value plus extra positional arguments.
///
/// The tested value is always the first argument; `args` holds whatever the
/// schema declared after the name, e.g. `[3, 20]` for `{ "isLength": [3, 20] }`.
///
/// Any closure with the right signature implements this trait:
///
/// ```rust
/// use contextual_validator::{AtomicRegistry, RegistryError};
/// use serde_json::{json, Value};
///
/// let registry = AtomicRegistry::new();
/// registry
///     .register_check("isPositive", |value: &Value, _args: &[Value]| {
///         Ok::<_, RegistryError>(value.as_i64().map_or(false, |n| n > 0))
///     })
///     .unwrap();
///
/// assert!(registry.call("isPositive", &json!(3), &[]).unwrap());
/// ```
pub trait AtomicCheck: Send + Sync {
    /// Returns whether `value` passes this check.
    fn check(&self, value: &Value, args: &[Value]) -> Result<bool, RegistryError>;
}

impl<F> AtomicCheck for F
where
    F: Fn(&Value, &[Value]) -> Result<bool, RegistryError> + Send + Sync,
{
    fn check(&self, value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
        self(value, args)
    }
}

/// A named scalar transformation.
///
/// Sanitizers never reject data. An `Err` means the sanitizer was misused
/// (bad arguments) and is surfaced as a configuration error.
pub trait AtomicSanitizer: Send + Sync {
    /// Returns the transformed value.
    fn sanitize(&self, value: &Value, args: &[Value]) -> Result<Value, RegistryError>;
}

impl<F> AtomicSanitizer for F
where
    F: Fn(&Value, &[Value]) -> Result<Value, RegistryError> + Send + Sync,
{
    fn sanitize(&self, value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
        self(value, args)
    }
}

type CheckMap = Arc<RwLock<HashMap<String, Arc<dyn AtomicCheck>>>>;
type SanitizerMap = Arc<RwLock<HashMap<String, Arc<dyn AtomicSanitizer>>>>;

/// A thread-safe set of named atomic validators and sanitizers.
///
/// Clones share the same underlying tables, so a registry can be built once
/// and handed to several validators.
///
/// # Example
///
/// ```rust
/// use contextual_validator::AtomicRegistry;
/// use serde_json::json;
///
/// let registry = AtomicRegistry::with_builtins();
///
/// assert!(registry.has("isInt"));
/// assert!(registry.call("isLength", &json!("pasta"), &[json!(3), json!(20)]).unwrap());
/// assert_eq!(registry.sanitize("trim", &json!("  pasta "), &[]).unwrap(), json!("pasta"));
/// ```
pub struct AtomicRegistry {
    checks: CheckMap,
    sanitizers: SanitizerMap,
}

impl AtomicRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            checks: Arc::new(RwLock::new(HashMap::new())),
            sanitizers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Creates a registry preloaded with the built-in checks and sanitizers.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::atomic::install(&registry);
        registry
    }

    /// Registers a named check.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if a check with that name exists.
    pub fn register_check<C>(&self, name: impl Into<String>, check: C) -> Result<(), RegistryError>
    where
        C: AtomicCheck + 'static,
    {
        let name = name.into();
        let mut checks = self.checks.write();

        if checks.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        checks.insert(name, Arc::new(check));
        Ok(())
    }

    /// Registers a named sanitizer.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if a sanitizer with that name exists.
    pub fn register_sanitizer<S>(
        &self,
        name: impl Into<String>,
        sanitizer: S,
    ) -> Result<(), RegistryError>
    where
        S: AtomicSanitizer + 'static,
    {
        let name = name.into();
        let mut sanitizers = self.sanitizers.write();

        if sanitizers.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        sanitizers.insert(name, Arc::new(sanitizer));
        Ok(())
    }

    /// Returns true if a check or a sanitizer is registered under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.has_check(name) || self.has_sanitizer(name)
    }

    /// Returns true if a check is registered under `name`.
    pub fn has_check(&self, name: &str) -> bool {
        self.checks.read().contains_key(name)
    }

    /// Returns true if a sanitizer is registered under `name`.
    pub fn has_sanitizer(&self, name: &str) -> bool {
        self.sanitizers.read().contains_key(name)
    }

    /// Runs the named check against `value` with the extra arguments.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownName` if no such check exists, or the
    /// check's own error if its arguments are unusable.
    pub fn call(&self, name: &str, value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
        // Release the lock before running user code.
        let check = self
            .checks
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
        check.check(value, args)
    }

    /// Runs the named sanitizer on `value` with the extra arguments.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownName` if no such sanitizer exists, or the
    /// sanitizer's own error if its arguments are unusable.
    pub fn sanitize(&self, name: &str, value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
        let sanitizer = self
            .sanitizers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownName(name.to_string()))?;
        sanitizer.sanitize(value, args)
    }

    /// Returns the registered check names, sorted.
    pub fn check_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.checks.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the registered sanitizer names, sorted.
    pub fn sanitizer_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.sanitizers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AtomicRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Clone for AtomicRegistry {
    fn clone(&self) -> Self {
        Self {
            checks: Arc::clone(&self.checks),
            sanitizers: Arc::clone(&self.sanitizers),
        }
    }
}

impl std::fmt::Debug for AtomicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicRegistry")
            .field("checks", &self.check_names())
            .field("sanitizers", &self.sanitizer_names())
            .finish()
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a name that already exists.
    #[error("atomic '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to call a name that doesn't exist.
    #[error("atomic '{0}' not found")]
    UnknownName(String),

    /// The extra arguments declared in the schema are unusable.
    #[error("invalid argument for '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}

impl RegistryError {
    pub(crate) fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        RegistryError::InvalidArgument {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = AtomicRegistry::new();
        assert!(!registry.has("isInt"));
        assert_eq!(
            registry.call("isInt", &json!(1), &[]),
            Err(RegistryError::UnknownName("isInt".to_string()))
        );
    }

    #[test]
    fn test_duplicate_check_rejected() {
        let registry = AtomicRegistry::new();
        let always = |_: &Value, _: &[Value]| Ok::<_, RegistryError>(true);
        registry.register_check("ok", always).unwrap();
        assert_eq!(
            registry.register_check("ok", always),
            Err(RegistryError::DuplicateName("ok".to_string()))
        );
    }

    #[test]
    fn test_check_and_sanitizer_namespaces_are_separate() {
        let registry = AtomicRegistry::new();
        registry
            .register_check("x", |_: &Value, _: &[Value]| Ok::<_, RegistryError>(true))
            .unwrap();
        registry
            .register_sanitizer("x", |v: &Value, _: &[Value]| Ok::<_, RegistryError>(v.clone()))
            .unwrap();

        assert!(registry.has_check("x"));
        assert!(registry.has_sanitizer("x"));
    }

    #[test]
    fn test_clones_share_tables() {
        let registry = AtomicRegistry::new();
        let shared = registry.clone();
        registry
            .register_check("late", |_: &Value, _: &[Value]| Ok::<_, RegistryError>(false))
            .unwrap();

        assert!(shared.has("late"));
        assert_eq!(shared.call("late", &json!(null), &[]), Ok(false));
    }

    #[test]
    fn test_arguments_follow_value() {
        let registry = AtomicRegistry::new();
        registry
            .register_check("between", |value: &Value, args: &[Value]| {
                let n = value.as_i64().unwrap_or_default();
                let lo = args.first().and_then(Value::as_i64).unwrap_or(i64::MIN);
                let hi = args.get(1).and_then(Value::as_i64).unwrap_or(i64::MAX);
                Ok::<_, RegistryError>(lo <= n && n <= hi)
            })
            .unwrap();

        assert_eq!(registry.call("between", &json!(5), &[json!(1), json!(9)]), Ok(true));
        assert_eq!(registry.call("between", &json!(10), &[json!(1), json!(9)]), Ok(false));
    }
}

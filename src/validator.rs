//! The reusable validator bound to one schema.

use std::sync::Arc;

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::error::{ConfigError, ValidationErrors};
use crate::registry::AtomicRegistry;
use crate::schema::Schema;
use crate::validation::{Session, ValidatedData};
use crate::ValidationResult;

/// A schema bound to an atomic registry, reusable across payloads.
///
/// Each call to [`validate`](Self::validate) runs an independent session, so
/// one validator can be shared between threads.
///
/// # Example
///
/// ```rust
/// use contextual_validator::{AtomicRegistry, Validator};
/// use serde_json::json;
///
/// let schema = json!({
///     "id":   { "checkIf": "isInt", "requireIt": { "when": { "contextIs": "updateProduct" } }, "saveIt": "never" },
///     "name": { "checkIf": "isAlpha", "sanitizeIt": "trim" }
/// });
///
/// let validator = Validator::from_json(&schema, AtomicRegistry::with_builtins()).unwrap();
///
/// let data = validator
///     .validate(&json!({ "id": 3, "name": "Pasta" }), "updateProduct")
///     .unwrap()
///     .into_result()
///     .unwrap();
///
/// assert_eq!(data.save["name"], json!("Pasta"));
/// assert_eq!(data.aux["id"], json!(3));
/// ```
#[derive(Clone, Debug)]
pub struct Validator {
    schema: Arc<Schema>,
    registry: AtomicRegistry,
    exit_on_first_error: bool,
}

impl Validator {
    /// Binds `schema` to `registry`.
    ///
    /// Stops at the first failing field by default; see
    /// [`set_exit_on_first_error`](Self::set_exit_on_first_error).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the schema names a check or sanitizer the
    /// registry does not provide.
    pub fn new(schema: Schema, registry: AtomicRegistry) -> Result<Self, ConfigError> {
        schema.verify(&registry).map_err(rejected)?;
        Ok(Self {
            schema: Arc::new(schema),
            registry,
            exit_on_first_error: true,
        })
    }

    /// Parses a JSON schema literal and binds it to `registry`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for malformed schemas and unknown atomic names.
    pub fn from_json(schema: &Value, registry: AtomicRegistry) -> Result<Self, ConfigError> {
        Self::new(Schema::from_json(schema).map_err(rejected)?, registry)
    }

    /// Builder-style form of [`set_exit_on_first_error`](Self::set_exit_on_first_error).
    pub fn exit_on_first_error(mut self, exit: bool) -> Self {
        self.exit_on_first_error = exit;
        self
    }

    /// `true` aborts at the first failing field; `false` validates every field
    /// and collects every error.
    pub fn set_exit_on_first_error(&mut self, exit: bool) {
        self.exit_on_first_error = exit;
    }

    /// Returns the current exit policy.
    pub fn exits_on_first_error(&self) -> bool {
        self.exit_on_first_error
    }

    /// Returns the bound schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the bound registry.
    pub fn registry(&self) -> &AtomicRegistry {
        &self.registry
    }

    /// Validates `payload` under `context`.
    ///
    /// The outer `Result` carries configuration errors, which abort
    /// validation. The inner [`Validation`] is either the partitioned data or
    /// every field error, in schema-declaration, depth-first order.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if an atomic call fails while validating.
    pub fn validate(
        &self,
        payload: &Value,
        context: &str,
    ) -> Result<ValidationResult<ValidatedData>, ConfigError> {
        Session::new(context, payload, &self.registry, self.exit_on_first_error)
            .run(&self.schema)
            .map_err(|error| {
                tracing::debug!(context, %error, "validation aborted");
                error
            })
    }

    /// Validates `payload` and hands the outcome to exactly one callback.
    ///
    /// `on_error` receives the error list; `on_success` receives the save and
    /// auxiliary documents. The chosen callback runs before this returns.
    ///
    /// ```rust
    /// use contextual_validator::{AtomicRegistry, Validator};
    /// use serde_json::json;
    ///
    /// let validator = Validator::from_json(
    ///     &json!({ "name": { "requireIt": "always" } }),
    ///     AtomicRegistry::with_builtins(),
    /// )
    /// .unwrap();
    ///
    /// let message = validator
    ///     .validate_with(
    ///         &json!({}),
    ///         "addProduct",
    ///         |errors| format!("{} error(s)", errors.len()),
    ///         |save, _aux| format!("saved {}", save.len()),
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(message, "1 error(s)");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] without calling either callback if an atomic
    /// call fails while validating.
    pub fn validate_with<R, E, S>(
        &self,
        payload: &Value,
        context: &str,
        on_error: E,
        on_success: S,
    ) -> Result<R, ConfigError>
    where
        E: FnOnce(ValidationErrors) -> R,
        S: FnOnce(Map<String, Value>, Map<String, Value>) -> R,
    {
        Ok(match self.validate(payload, context)? {
            Validation::Success(data) => on_success(data.save, data.aux),
            Validation::Failure(errors) => on_error(errors),
        })
    }
}

fn rejected(error: ConfigError) -> ConfigError {
    tracing::debug!(%error, "schema rejected");
    error
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Validator>();
    assert_sync::<Validator>();
};

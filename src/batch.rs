//! Validating many independent payloads at once.
//!
//! Each payload gets its own session; fields within one payload are still
//! validated strictly in declaration order. Only whole payloads run in
//! parallel.

use rayon::prelude::*;
use serde_json::Value;

use crate::error::ConfigError;
use crate::validation::ValidatedData;
use crate::validator::Validator;
use crate::ValidationResult;

impl Validator {
    /// Validates every payload under `context` in parallel.
    ///
    /// Results are returned in input order.
    ///
    /// ```rust
    /// use contextual_validator::{AtomicRegistry, Validator};
    /// use serde_json::json;
    ///
    /// let validator = Validator::from_json(
    ///     &json!({ "id": { "checkIf": "isInt" } }),
    ///     AtomicRegistry::with_builtins(),
    /// )
    /// .unwrap();
    ///
    /// let payloads = vec![json!({"id": 1}), json!({"id": "x"}), json!({"id": 3})];
    /// let results = validator.validate_batch(&payloads, "import");
    ///
    /// let ok: Vec<bool> = results.iter().map(|r| r.as_ref().unwrap().is_success()).collect();
    /// assert_eq!(ok, vec![true, false, true]);
    /// ```
    pub fn validate_batch(
        &self,
        payloads: &[Value],
        context: &str,
    ) -> Vec<Result<ValidationResult<ValidatedData>, ConfigError>> {
        payloads
            .par_iter()
            .map(|payload| self.validate(payload, context))
            .collect()
    }
}

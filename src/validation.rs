//! One validation session.
//!
//! A [`Session`] is created per `validate` call and scoped to one payload and
//! one context. It carries everything the recursive engine reads (the raw
//! root payload, the context token, the registry and the exit policy) and is
//! discarded once the outcome has been produced.

use serde_json::{Map, Value};
use stillwater::Validation;

use crate::engine::traverse::validate_nested;
use crate::error::ConfigError;
use crate::path::Breadcrumb;
use crate::registry::AtomicRegistry;
use crate::schema::{EvalContext, Schema};
use crate::ValidationResult;

/// The output of a successful validation.
///
/// Both documents mirror the payload's structure, restricted to fields that
/// passed. `save` holds fields whose `saveIt` resolved true, `aux` the rest.
/// Nested objects and arrays only ever contain their saved fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedData {
    /// Fields to persist.
    pub save: Map<String, Value>,
    /// Advisory fields, not to be persisted.
    pub aux: Map<String, Value>,
}

impl ValidatedData {
    /// Consumes self, returning `(save, aux)`.
    pub fn into_parts(self) -> (Map<String, Value>, Map<String, Value>) {
        (self.save, self.aux)
    }
}

/// Per-call state shared by every step of one traversal.
pub(crate) struct Session<'a> {
    pub(crate) context: &'a str,
    pub(crate) root: &'a Value,
    pub(crate) registry: &'a AtomicRegistry,
    pub(crate) exit_on_first_error: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(
        context: &'a str,
        root: &'a Value,
        registry: &'a AtomicRegistry,
        exit_on_first_error: bool,
    ) -> Self {
        Self {
            context,
            root,
            registry,
            exit_on_first_error,
        }
    }

    /// The context every condition is evaluated in. Predicates always read
    /// the raw root payload, never partially built output.
    pub(crate) fn eval_context(&self) -> EvalContext<'a> {
        EvalContext::new(self.context, self.root)
    }

    /// Traverses `schema` from the payload root and partitions the result.
    pub(crate) fn run(&self, schema: &Schema) -> Result<ValidationResult<ValidatedData>, ConfigError> {
        let outcome = validate_nested(self, self.root.as_object(), schema, &Breadcrumb::root())?;

        match &outcome {
            Validation::Success(document) => tracing::debug!(
                context = self.context,
                saved = document.save.len(),
                auxiliary = document.aux.len(),
                "payload accepted"
            ),
            Validation::Failure(errors) => tracing::debug!(
                context = self.context,
                errors = errors.len(),
                "payload rejected"
            ),
        }

        Ok(outcome.map(|document| ValidatedData {
            save: document.save,
            aux: document.aux,
        }))
    }
}

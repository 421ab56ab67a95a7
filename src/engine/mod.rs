//! The recursive validation engine.
//!
//! [`field`] runs the per-field pipeline, [`traverse`] walks a schema level
//! and [`sanitize`] threads scalars through sanitizer chains. All three share
//! one [`Session`](crate::validation::Session) per `validate` call.

pub(crate) mod field;
pub(crate) mod sanitize;
pub(crate) mod traverse;

use stillwater::prelude::*;

use crate::error::ValidationErrors;

/// Appends `errors` to the accumulated failures.
pub(crate) fn accumulate(acc: &mut Option<ValidationErrors>, errors: ValidationErrors) {
    *acc = Some(match acc.take() {
        Some(existing) => existing.combine(errors),
        None => errors,
    });
}

//! The per-field decision pipeline.
//!
//! require → refuse → check → recurse → save → sanitize, stopping at the first
//! step that rejects the field. Remapping happens one level up, in the
//! traversor, once the field's final value is known.

use serde_json::{Map, Value};
use stillwater::Validation;

use super::accumulate;
use super::sanitize::sanitize;
use super::traverse::validate_nested;
use crate::error::{ConfigError, ValidationError, ValidationErrors};
use crate::path::Breadcrumb;
use crate::schema::{resolves, Action, FieldRule, FieldType, Schema};
use crate::validation::Session;
use crate::ValidationResult;

/// The result of a field that passed every step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldOutcome {
    /// Whether the value belongs in the saved document.
    pub(crate) save: bool,
    /// The final value; `None` means there is nothing to record.
    pub(crate) value: Option<Value>,
}

impl FieldOutcome {
    fn skipped() -> Self {
        Self {
            save: false,
            value: None,
        }
    }
}

fn fail<T>(error: ValidationError) -> ValidationResult<T> {
    tracing::trace!(field = %error.path, kind = %error.kind, "field rejected");
    Validation::Failure(ValidationErrors::single(error))
}

fn invalid(path: &Breadcrumb, value: &Value, scope: Option<&Map<String, Value>>) -> ValidationError {
    let error = ValidationError::invalid(path.clone(), value.clone());
    match scope {
        Some(scope) => error.with_scope(Value::Object(scope.clone())),
        None => error,
    }
}

/// Validates the field `key` of `scope` against `rule`.
pub(crate) fn validate_field(
    session: &Session<'_>,
    key: &str,
    rule: &FieldRule,
    scope: Option<&Map<String, Value>>,
    path: &Breadcrumb,
) -> Result<ValidationResult<FieldOutcome>, ConfigError> {
    let present = scope.map_or(false, |s| s.contains_key(key));
    let mut value = scope
        .and_then(|s| s.get(key))
        .filter(|v| !v.is_null())
        .cloned();
    let base = session.eval_context();

    let ctx = base.for_field(key, value.as_ref(), scope);
    if resolves(Action::Require, rule, &ctx) {
        if !present {
            return Ok(fail(ValidationError::required(path.clone())));
        }
    } else if value.is_none() {
        match rule.defaults().resolve(session.context) {
            Some(default) => {
                tracing::debug!(field = %path, context = session.context, "substituted default");
                value = Some(default);
            }
            None => return Ok(Validation::Success(FieldOutcome::skipped())),
        }
    }

    if rule.gate(Action::Refuse).is_declared() {
        let ctx = base.for_field(key, value.as_ref(), scope);
        if resolves(Action::Refuse, rule, &ctx) && present {
            return Ok(fail(ValidationError::refused(path.clone())));
        }
    }

    if let Some(check) = rule.check_rule() {
        let null = Value::Null;
        let subject = value.as_ref().unwrap_or(&null);
        let passed = check
            .evaluate(session.registry, subject)
            .map_err(|source| ConfigError::Atomic {
                field: path.to_string(),
                source,
            })?;
        if !passed {
            return Ok(fail(invalid(path, subject, scope)));
        }
    }

    let value = match (rule.field_type(), value) {
        (FieldType::Array(items), Some(current)) => {
            return validate_array(session, key, rule, items, current, scope, path)
        }
        (FieldType::Object(properties), Some(current)) => {
            return validate_object(session, key, rule, properties, current, scope, path)
        }
        (_, value) => value,
    };

    let ctx = base.for_field(key, value.as_ref(), scope);
    let save = resolves(Action::Save, rule, &ctx);

    let value = match value {
        Some(current) if !rule.sanitizers().is_empty() => {
            Some(sanitize(rule.sanitizers(), current, session.registry, path)?)
        }
        other => other,
    };

    Ok(Validation::Success(FieldOutcome { save, value }))
}

/// Recurses element by element, keeping array order.
fn validate_array(
    session: &Session<'_>,
    key: &str,
    rule: &FieldRule,
    items: &Schema,
    current: Value,
    scope: Option<&Map<String, Value>>,
    path: &Breadcrumb,
) -> Result<ValidationResult<FieldOutcome>, ConfigError> {
    let Some(elements) = current.as_array() else {
        return Ok(fail(invalid(path, &current, scope)));
    };

    let mut validated = Vec::with_capacity(elements.len());
    let mut failures = None;
    for (index, element) in elements.iter().enumerate() {
        match validate_nested(session, element.as_object(), items, &path.push_index(index))? {
            Validation::Success(document) => validated.push(Value::Object(document.save)),
            Validation::Failure(errors) => {
                if session.exit_on_first_error {
                    return Ok(Validation::Failure(errors));
                }
                accumulate(&mut failures, errors);
            }
        }
    }
    if let Some(errors) = failures {
        return Ok(Validation::Failure(errors));
    }

    let ctx = session.eval_context().for_field(key, Some(&current), scope);
    let save = resolves(Action::Save, rule, &ctx);
    Ok(Validation::Success(FieldOutcome {
        save,
        value: Some(Value::Array(validated)),
    }))
}

fn validate_object(
    session: &Session<'_>,
    key: &str,
    rule: &FieldRule,
    properties: &Schema,
    current: Value,
    scope: Option<&Map<String, Value>>,
    path: &Breadcrumb,
) -> Result<ValidationResult<FieldOutcome>, ConfigError> {
    let Some(object) = current.as_object() else {
        return Ok(fail(invalid(path, &current, scope)));
    };

    let document = match validate_nested(session, Some(object), properties, path)? {
        Validation::Success(document) => document,
        Validation::Failure(errors) => return Ok(Validation::Failure(errors)),
    };

    let ctx = session.eval_context().for_field(key, Some(&current), scope);
    let save = resolves(Action::Save, rule, &ctx);
    Ok(Validation::Success(FieldOutcome {
        save,
        value: Some(Value::Object(document.save)),
    }))
}

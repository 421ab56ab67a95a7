//! Walking one schema level.

use serde_json::{Map, Value};
use stillwater::Validation;

use super::accumulate;
use super::field::{validate_field, FieldOutcome};
use crate::error::ConfigError;
use crate::path::Breadcrumb;
use crate::schema::Schema;
use crate::validation::Session;
use crate::ValidationResult;

/// The fields of one level, split by their save decision.
///
/// Nested levels keep only `save`; the root keeps both halves.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SubDocument {
    pub(crate) save: Map<String, Value>,
    pub(crate) aux: Map<String, Value>,
}

/// Validates the schema's declared keys of `scope`, in declaration order.
///
/// Keys of `scope` that the schema does not declare are dropped.
pub(crate) fn validate_nested(
    session: &Session<'_>,
    scope: Option<&Map<String, Value>>,
    schema: &Schema,
    path: &Breadcrumb,
) -> Result<ValidationResult<SubDocument>, ConfigError> {
    let mut document = SubDocument::default();
    let mut failures = None;

    for (key, rule) in schema.fields() {
        let field_path = path.push_field(key);
        match validate_field(session, key, rule, scope, &field_path)? {
            Validation::Success(FieldOutcome {
                save,
                value: Some(value),
            }) if !value.is_null() => {
                let value = match rule.remap_rule() {
                    Some(remap) => remap.apply(value),
                    None => value,
                };
                if save {
                    document.save.insert(key.clone(), value);
                } else {
                    document.aux.insert(key.clone(), value);
                }
            }
            Validation::Success(_) => {}
            Validation::Failure(errors) => {
                if session.exit_on_first_error {
                    return Ok(Validation::Failure(errors));
                }
                accumulate(&mut failures, errors);
            }
        }
    }

    Ok(match failures {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(document),
    })
}

//! Schema configuration errors.
//!
//! A [`ConfigError`] signals an authoring defect in the schema or the atomic
//! registry. It is never reported through the field error list; validation
//! aborts and the error is returned to the caller.

use crate::registry::RegistryError;

/// A malformed schema or a failing atomic call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A chain contained an operator token other than `AND` / `OR`.
    #[error("invalid operator '{token}' in condition chain for '{field}', expected AND or OR")]
    UnknownOperator { field: String, token: String },

    /// A chain did not alternate condition / operator / condition.
    #[error("malformed condition chain for '{field}': {reason}")]
    MalformedChain { field: String, reason: String },

    /// A gate declaration was neither a literal nor a `{ when: ... }` object.
    #[error("invalid condition for {action} on '{field}' ({found})")]
    MalformedGate {
        field: String,
        action: &'static str,
        found: String,
    },

    /// A predicate object used a key other than contextIs / contextIsNot / payloadHas.
    #[error("unrecognized predicate '{key}' for '{field}'")]
    UnknownPredicate { field: String, key: String },

    /// A predicate's argument had the wrong shape.
    #[error("malformed predicate '{predicate}' for '{field}': {reason}")]
    MalformedPredicate {
        field: String,
        predicate: &'static str,
        reason: String,
    },

    /// A `checkIf` named an atomic validator the registry does not know.
    #[error("unknown atomic validator '{name}' in checkIf for '{field}'")]
    UnknownCheck { field: String, name: String },

    /// A `sanitizeIt` named a sanitizer the registry does not know.
    #[error("unknown sanitizer '{name}' in sanitizeIt for '{field}'")]
    UnknownSanitizer { field: String, name: String },

    /// A `{name: [args]}` call did not have exactly one key with an argument list.
    #[error("malformed call in {action} for '{field}': {found}")]
    MalformedCall {
        field: String,
        action: &'static str,
        found: String,
    },

    /// A nested type was declared without its nested schema map.
    #[error("field '{field}' declares type {field_type} but has no {expected}")]
    MissingNestedSchema {
        field: String,
        field_type: &'static str,
        expected: &'static str,
    },

    /// Any other structurally invalid schema entry.
    #[error("invalid schema for '{field}': {reason}")]
    MalformedSchema { field: String, reason: String },

    /// An atomic validator or sanitizer failed while validating.
    #[error("atomic call failed for '{field}': {source}")]
    Atomic {
        field: String,
        #[source]
        source: RegistryError,
    },
}

impl ConfigError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedSchema {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_field() {
        let error = ConfigError::UnknownOperator {
            field: "nutritionFacts".to_string(),
            token: "XOR".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("XOR"));
        assert!(display.contains("nutritionFacts"));
    }

    #[test]
    fn test_atomic_has_source() {
        use std::error::Error;

        let error = ConfigError::Atomic {
            field: "name".to_string(),
            source: RegistryError::UnknownName("nope".to_string()),
        };
        assert!(error.source().is_some());
    }
}

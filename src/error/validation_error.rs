//! Field-level validation error records.
//!
//! This module provides [`ValidationError`] for a single failing field and
//! [`ValidationErrors`] for accumulating failures across a whole payload.

use std::fmt::{self, Display};

use serde_json::{json, Map, Value};
use stillwater::prelude::*;

use crate::path::Breadcrumb;

/// The gate or check that rejected a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A field whose `requireIt` gate resolved true was absent.
    Required,
    /// A field whose `refuseIt` gate resolved true was present.
    Refused,
    /// A field failed its `checkIf` expression.
    Invalid,
}

impl ErrorKind {
    /// Returns the machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Required => "required",
            ErrorKind::Refused => "refused",
            ErrorKind::Invalid => "invalid",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single failing field.
///
/// - **kind**: which gate or check rejected the field
/// - **path**: breadcrumb of the field within the payload
/// - **value**: the offending value (set for `invalid` errors)
/// - **scope**: snapshot of the object enclosing the field (set for `invalid` errors)
///
/// # Example
///
/// ```rust
/// use contextual_validator::{Breadcrumb, ErrorKind, ValidationError};
/// use serde_json::json;
///
/// let error = ValidationError::invalid(Breadcrumb::from_field("name"), json!("A1"))
///     .with_scope(json!({"name": "A1"}));
///
/// assert_eq!(error.kind, ErrorKind::Invalid);
/// assert_eq!(error.code(), "invalid");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Which gate or check rejected the field.
    pub kind: ErrorKind,
    /// Breadcrumb of the failing field.
    pub path: Breadcrumb,
    /// The value that failed, when relevant.
    pub value: Option<Value>,
    /// The enclosing scope at the time of failure, when relevant.
    pub scope: Option<Value>,
}

impl ValidationError {
    /// Creates an error of the given kind at the given path.
    pub fn new(kind: ErrorKind, path: Breadcrumb) -> Self {
        Self {
            kind,
            path,
            value: None,
            scope: None,
        }
    }

    /// A declared-required field is absent.
    pub fn required(path: Breadcrumb) -> Self {
        Self::new(ErrorKind::Required, path)
    }

    /// A declared-refused field is present.
    pub fn refused(path: Breadcrumb) -> Self {
        Self::new(ErrorKind::Refused, path)
    }

    /// A field failed its format check.
    pub fn invalid(path: Breadcrumb, value: Value) -> Self {
        Self::new(ErrorKind::Invalid, path).with_value(value)
    }

    /// Sets the offending value and returns self for chaining.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the enclosing scope snapshot and returns self for chaining.
    pub fn with_scope(mut self, scope: Value) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Returns the machine-readable code of this error's kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Renders this record as a JSON object `{type, prop, value?, scope?}`.
    pub fn to_json(&self) -> Value {
        let mut record = Map::new();
        record.insert("type".to_string(), json!(self.code()));
        record.insert("prop".to_string(), json!(self.path.to_string()));
        if let Some(ref value) = self.value {
            record.insert("value".to_string(), value.clone());
        }
        if let Some(ref scope) = self.scope {
            record.insert("scope".to_string(), scope.clone());
        }
        Value::Object(record)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.kind)?;

        if let Some(ref value) = self.value {
            write!(f, " (got: {})", value)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

/// A non-empty, ordered collection of field errors.
///
/// Errors appear in schema-declaration, depth-first order. `ValidationErrors`
/// implements `Semigroup` so nested traversals can be combined:
///
/// ```rust
/// use contextual_validator::{Breadcrumb, ValidationError, ValidationErrors};
/// use stillwater::prelude::*;
///
/// let first = ValidationErrors::single(ValidationError::required(Breadcrumb::from_field("name")));
/// let second = ValidationErrors::single(ValidationError::refused(Breadcrumb::from_field("id")));
///
/// let combined = first.combine(second);
/// assert_eq!(combined.len(), 2);
/// assert_eq!(combined.first().code(), "required");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(NonEmptyVec<ValidationError>);

impl ValidationErrors {
    /// Creates a collection containing a single error.
    pub fn single(error: ValidationError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates a collection from a `Vec`, or `None` if it is empty.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the errors in order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Returns the first error encountered.
    pub fn first(&self) -> &ValidationError {
        self.0.head()
    }

    /// Returns all errors at the given path.
    pub fn at_path(&self, path: &Breadcrumb) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Returns all errors of the given kind.
    pub fn of_kind(&self, kind: ErrorKind) -> Vec<&ValidationError> {
        self.0.iter().filter(|e| e.kind == kind).collect()
    }

    /// Converts this collection into a `Vec`.
    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0.into_vec()
    }

    /// Renders every record as JSON, in order.
    pub fn to_json(&self) -> Value {
        Value::Array(self.0.iter().map(ValidationError::to_json).collect())
    }
}

impl Semigroup for ValidationErrors {
    fn combine(self, other: Self) -> Self {
        ValidationErrors(self.0.combine(other.0))
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = Box<dyn Iterator<Item = &'a ValidationError> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

//! # Contextual Validator
//!
//! A schema-driven validation engine for JSON payloads whose rules depend on
//! the operation being performed.
//!
//! ## Overview
//!
//! A schema declares, per field, whether the field is required, refused or
//! saved, and under which operation context (`"addProduct"`,
//! `"updateProduct"`, ...) each decision applies. The same schema then
//! validates every operation on an entity. Validation walks the schema in
//! declaration order, recurses into arrays and objects, sanitizes accepted
//! values and splits the result into a document to persist and an auxiliary
//! document for everything else.
//!
//! Errors are either collected for every field or returned at the first
//! failing field, depending on the validator's exit policy.
//!
//! ## Core Types
//!
//! - [`Schema`] / [`FieldRule`]: the declarative rules, built from a JSON
//!   literal or with the typed builder
//! - [`Condition`] / [`Gate`]: the context-aware decision language
//! - [`AtomicRegistry`]: the named checks and sanitizers schemas refer to
//! - [`Validator`]: a schema bound to a registry, reusable across payloads
//! - [`ValidationErrors`]: a non-empty collection of field errors
//!
//! ## Example
//!
//! ```rust
//! use contextual_validator::{AtomicRegistry, Validator};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "id": {
//!         "checkIf": "isInt",
//!         "requireIt": { "when": { "contextIs": "updateProduct" } },
//!         "refuseIt": { "when": { "contextIs": "addProduct" } },
//!         "saveIt": "never"
//!     },
//!     "name": {
//!         "checkIf": ["isAlpha", "AND", { "isLength": [3, 20] }],
//!         "sanitizeIt": "trim"
//!     }
//! });
//!
//! let validator = Validator::from_json(&schema, AtomicRegistry::with_builtins())
//!     .unwrap()
//!     .exit_on_first_error(false);
//!
//! // an id is refused when adding
//! let errors = validator
//!     .validate(&json!({ "id": 1, "name": "Pasta" }), "addProduct")
//!     .unwrap()
//!     .into_result()
//!     .unwrap_err();
//! assert_eq!(errors.first().code(), "refused");
//!
//! // and required when updating
//! let data = validator
//!     .validate(&json!({ "id": 1, "name": "Pasta" }), "updateProduct")
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//! assert_eq!(data.save, json!({ "name": "Pasta" }).as_object().unwrap().clone());
//! assert_eq!(data.aux["id"], json!(1));
//! ```

mod atomic;
mod batch;
mod engine;
pub mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod validation;
mod validator;

pub use error::{ConfigError, ErrorKind, ValidationError, ValidationErrors};
pub use path::{Breadcrumb, PathSegment};
pub use registry::{AtomicCheck, AtomicRegistry, AtomicSanitizer, RegistryError};
pub use schema::{
    from_array_to_map, resolves, Action, AtomicCall, Chain, CheckRule, Condition, DefaultValue,
    Defaults, EvalContext, FieldRule, FieldType, Gate, Operator, PayloadHas, Predicate, Remap,
    Schema,
};
pub use validation::ValidatedData;
pub use validator::Validator;

/// Type alias for validation results using ValidationErrors
pub type ValidationResult<T> = stillwater::Validation<T, ValidationErrors>;

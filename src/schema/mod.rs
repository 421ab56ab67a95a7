//! Declarative schemas.
//!
//! A [`Schema`] maps field keys, in declaration order, to [`FieldRule`]s. A
//! schema is built once, either from a JSON schema literal with
//! [`Schema::from_json`] or with the typed builder, and then bound into a
//! reusable [`Validator`](crate::Validator).
//!
//! # Example
//!
//! ```rust
//! use contextual_validator::{CheckRule, Condition, FieldRule, Gate, Schema};
//! use serde_json::json;
//!
//! let built = Schema::new()
//!     .field(
//!         "name",
//!         FieldRule::new()
//!             .require(Gate::when(Condition::context_is("addProduct")))
//!             .check(CheckRule::new("isAlpha"))
//!             .save(Gate::Always),
//!     );
//!
//! let parsed = Schema::from_json(&json!({
//!     "name": {
//!         "requireIt": { "when": { "contextIs": "addProduct" } },
//!         "checkIf": "isAlpha",
//!         "saveIt": "always"
//!     }
//! }))
//! .unwrap();
//!
//! assert_eq!(built.len(), parsed.len());
//! ```

mod check;
mod condition;
mod defaults;
mod gate;
mod parse;
mod remap;

pub use check::{AtomicCall, CheckRule};
pub use condition::{Chain, Condition, EvalContext, Operator, PayloadHas, Predicate};
pub use defaults::{DefaultValue, Defaults};
pub use gate::{resolves, Action, Gate};
pub use remap::{from_array_to_map, Remap};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ConfigError;
use crate::path::Breadcrumb;
use crate::registry::AtomicRegistry;

/// The structural type of a field.
#[derive(Debug, Clone, Default)]
pub enum FieldType {
    /// A leaf value; sanitizers apply.
    #[default]
    Scalar,
    /// An array whose elements are validated against `itemsProperties`.
    Array(Schema),
    /// An object validated against `properties`.
    Object(Schema),
}

/// The declarative rule set for one field.
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    require: Gate,
    refuse: Gate,
    save: Gate,
    check: Option<CheckRule>,
    field_type: FieldType,
    defaults: Defaults,
    sanitize: Vec<AtomicCall>,
    remap: Option<Remap>,
}

impl FieldRule {
    /// Creates a rule with every gate unset: required, saved, never refused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `requireIt`.
    pub fn require(mut self, gate: Gate) -> Self {
        self.require = gate;
        self
    }

    /// Sets `refuseIt`.
    pub fn refuse(mut self, gate: Gate) -> Self {
        self.refuse = gate;
        self
    }

    /// Sets `saveIt`.
    pub fn save(mut self, gate: Gate) -> Self {
        self.save = gate;
        self
    }

    /// Sets `checkIf`.
    pub fn check(mut self, check: CheckRule) -> Self {
        self.check = Some(check);
        self
    }

    /// Declares `type: array` with the given `itemsProperties`.
    pub fn array(mut self, items: Schema) -> Self {
        self.field_type = FieldType::Array(items);
        self
    }

    /// Declares `type: object` with the given `properties`.
    pub fn object(mut self, properties: Schema) -> Self {
        self.field_type = FieldType::Object(properties);
        self
    }

    /// Adds a default used when validating under `context`.
    pub fn default_for(mut self, context: impl Into<String>, value: impl Into<DefaultValue>) -> Self {
        self.defaults.set_for(context, value.into());
        self
    }

    /// Sets the unconditional default.
    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.defaults.set_fallback(value.into());
        self
    }

    /// Appends a sanitizer to the chain.
    pub fn sanitize(mut self, call: impl Into<AtomicCall>) -> Self {
        self.sanitize.push(call.into());
        self
    }

    /// Sets `remapIt`.
    pub fn remap(mut self, remap: Remap) -> Self {
        self.remap = Some(remap);
        self
    }

    /// Returns the gate declared for `action`.
    pub fn gate(&self, action: Action) -> &Gate {
        match action {
            Action::Require => &self.require,
            Action::Refuse => &self.refuse,
            Action::Save => &self.save,
        }
    }

    /// Returns the `checkIf` expression, if any.
    pub fn check_rule(&self) -> Option<&CheckRule> {
        self.check.as_ref()
    }

    /// Returns the structural type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Returns the declared defaults.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Returns the sanitizer chain.
    pub fn sanitizers(&self) -> &[AtomicCall] {
        &self.sanitize
    }

    /// Returns the remap declaration, if any.
    pub fn remap_rule(&self) -> Option<&Remap> {
        self.remap.as_ref()
    }
}

/// An ordered map of field keys to rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldRule>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON schema literal.
    ///
    /// Object key order is declaration order. Every structural defect is
    /// reported here rather than during validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first malformed entry.
    pub fn from_json(schema: &Value) -> Result<Self, ConfigError> {
        parse::parse_schema(schema, &Breadcrumb::root())
    }

    /// Adds a field. Redeclaring a key replaces its rule in place.
    pub fn field(mut self, key: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(key.into(), rule);
        self
    }

    /// Returns the rule for `key`.
    pub fn get(&self, key: &str) -> Option<&FieldRule> {
        self.fields.get(key)
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &FieldRule)> {
        self.fields.iter()
    }

    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks that every atomic name the schema uses is registered.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownCheck` or `ConfigError::UnknownSanitizer`
    /// for the first unregistered name, in declaration order.
    pub fn verify(&self, registry: &AtomicRegistry) -> Result<(), ConfigError> {
        self.verify_at(registry, &Breadcrumb::root())
    }

    fn verify_at(&self, registry: &AtomicRegistry, path: &Breadcrumb) -> Result<(), ConfigError> {
        for (key, rule) in &self.fields {
            let field_path = path.push_field(key);
            if let Some(check) = &rule.check {
                if let Some(call) = check.calls().find(|c| !registry.has_check(c.name())) {
                    return Err(ConfigError::UnknownCheck {
                        field: field_path.to_string(),
                        name: call.name().to_string(),
                    });
                }
            }
            if let Some(call) = rule.sanitize.iter().find(|c| !registry.has_sanitizer(c.name())) {
                return Err(ConfigError::UnknownSanitizer {
                    field: field_path.to_string(),
                    name: call.name().to_string(),
                });
            }
            match &rule.field_type {
                FieldType::Scalar => {}
                FieldType::Array(nested) | FieldType::Object(nested) => {
                    nested.verify_at(registry, &field_path)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_sets_every_part() {
        let rule = FieldRule::new()
            .require(Gate::Never)
            .refuse(Gate::Always)
            .save(Gate::when(Condition::context_is("addProduct")))
            .check(CheckRule::new("isAlpha"))
            .default_for("addProduct", json!("x"))
            .default_value(json!("y"))
            .sanitize("trim")
            .sanitize(AtomicCall::with_args("ltrim", [json!("-")]))
            .remap(Remap::from_array_to_map("id"));

        assert_eq!(rule.gate(Action::Require), &Gate::Never);
        assert_eq!(rule.gate(Action::Refuse), &Gate::Always);
        assert!(matches!(rule.gate(Action::Save), Gate::When(_)));
        assert!(rule.check_rule().is_some());
        assert_eq!(rule.defaults().resolve("addProduct"), Some(json!("x")));
        assert_eq!(rule.sanitizers().len(), 2);
        assert!(rule.remap_rule().is_some());
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let schema = Schema::new()
            .field("zeta", FieldRule::new())
            .field("alpha", FieldRule::new())
            .field("mid", FieldRule::new());
        let keys: Vec<_> = schema.fields().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_verify_finds_nested_unknown_check() {
        let registry = AtomicRegistry::with_builtins();
        let schema = Schema::new().field(
            "tags",
            FieldRule::new().array(
                Schema::new().field("id", FieldRule::new().check(CheckRule::new("isUuid"))),
            ),
        );

        match schema.verify(&registry) {
            Err(ConfigError::UnknownCheck { field, name }) => {
                assert_eq!(field, "tags.id");
                assert_eq!(name, "isUuid");
            }
            other => panic!("expected UnknownCheck, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_finds_unknown_sanitizer() {
        let registry = AtomicRegistry::with_builtins();
        let schema = Schema::new().field("name", FieldRule::new().sanitize("slugify"));
        assert!(matches!(
            schema.verify(&registry),
            Err(ConfigError::UnknownSanitizer { .. })
        ));
    }

    #[test]
    fn test_verify_accepts_builtins() {
        let registry = AtomicRegistry::with_builtins();
        let schema = Schema::new().field(
            "name",
            FieldRule::new()
                .check(CheckRule::new("isAlpha").and(AtomicCall::with_args(
                    "isLength",
                    [json!(3), json!(20)],
                )))
                .sanitize("trim"),
        );
        assert!(schema.verify(&registry).is_ok());
    }
}

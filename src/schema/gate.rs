//! Gates: the `requireIt`, `refuseIt` and `saveIt` decisions.

use std::fmt::{self, Display};

use super::condition::{Condition, EvalContext};
use super::FieldRule;

/// The three gated actions of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Require,
    Refuse,
    Save,
}

impl Action {
    /// The schema key declaring this gate.
    pub fn key(&self) -> &'static str {
        match self {
            Action::Require => "requireIt",
            Action::Refuse => "refuseIt",
            Action::Save => "saveIt",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A declared gate.
///
/// | declared            | resolves to            |
/// |---------------------|------------------------|
/// | absent / falsy      | true                   |
/// | `'always'`          | true                   |
/// | `'never'`           | false                  |
/// | `{ when: expr }`    | `expr` evaluated       |
///
/// An unset `saveIt` therefore saves the field; declare `Gate::Never` for
/// auxiliary-only fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gate {
    #[default]
    Unset,
    Always,
    Never,
    When(Condition),
}

impl Gate {
    /// `{ when: condition }`.
    pub fn when(condition: Condition) -> Self {
        Gate::When(condition)
    }

    /// Returns true unless the gate was left unset.
    pub fn is_declared(&self) -> bool {
        !matches!(self, Gate::Unset)
    }

    /// Resolves the gate for one field.
    pub fn resolves(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Gate::Unset | Gate::Always => true,
            Gate::Never => false,
            Gate::When(condition) => condition.evaluate(ctx),
        }
    }
}

/// Resolves `action` for the field described by `rule`.
pub fn resolves(action: Action, rule: &FieldRule, ctx: &EvalContext<'_>) -> bool {
    let decision = rule.gate(action).resolves(ctx);
    tracing::trace!(action = action.key(), field = ctx.key, decision, "gate resolved");
    decision
}

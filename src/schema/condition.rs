//! The condition DSL behind every conditional gate.
//!
//! A [`Condition`] is a literal, a predicate over the validation context or
//! the root payload, or a flat chain `[c0, AND|OR, c1, ...]` folded strictly
//! left to right. Every operand of a chain is evaluated; nothing
//! short-circuits, so `[false, AND, x]` still evaluates `x`.

use serde_json::{Map, Value};

/// A boolean connective in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    /// Parses `AND` / `OR`.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "AND" => Some(Operator::And),
            "OR" => Some(Operator::Or),
            _ => None,
        }
    }

    /// Combines two already-evaluated operands.
    pub fn apply(self, lhs: bool, rhs: bool) -> bool {
        match self {
            Operator::And => lhs && rhs,
            Operator::Or => lhs || rhs,
        }
    }
}

/// A left-folded chain of operands joined by [`Operator`]s.
///
/// Shared by gate conditions and `checkIf` expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain<T> {
    head: T,
    tail: Vec<(Operator, T)>,
}

impl<T> Chain<T> {
    /// Creates a chain with a single operand.
    pub fn new(head: T) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    /// Appends `op operand` to the end of the chain.
    pub fn push(mut self, op: Operator, operand: T) -> Self {
        self.tail.push((op, operand));
        self
    }

    /// Returns true if the chain has exactly one operand.
    pub fn is_single(&self) -> bool {
        self.tail.is_empty()
    }

    /// Returns every operand in declaration order.
    pub fn operands(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, t)| t))
    }

    /// Folds the chain left to right, evaluating every operand.
    pub fn fold(&self, mut eval: impl FnMut(&T) -> bool) -> bool {
        let mut result = eval(&self.head);
        for (op, operand) in &self.tail {
            let rhs = eval(operand);
            result = op.apply(result, rhs);
        }
        result
    }

    /// Like [`fold`](Self::fold) for fallible operands. The first error aborts.
    pub fn try_fold<E>(&self, mut eval: impl FnMut(&T) -> Result<bool, E>) -> Result<bool, E> {
        let mut result = eval(&self.head)?;
        for (op, operand) in &self.tail {
            let rhs = eval(operand)?;
            result = op.apply(result, rhs);
        }
        Ok(result)
    }
}

/// The `payloadHas` predicate argument.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadHas {
    /// The root payload contains the key.
    Key(String),
    /// The root payload's value at `field` strictly equals `expected`.
    Equals { field: String, expected: Value },
}

/// An atomic predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// The current context is one of the tokens.
    ContextIs(Vec<String>),
    /// The current context is none of the tokens.
    ContextIsNot(Vec<String>),
    /// See [`PayloadHas`].
    PayloadHas(PayloadHas),
}

impl Predicate {
    /// Evaluates this predicate.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Predicate::ContextIs(tokens) => tokens.iter().any(|t| t == ctx.context),
            Predicate::ContextIsNot(tokens) => !tokens.iter().any(|t| t == ctx.context),
            Predicate::PayloadHas(PayloadHas::Key(field)) => ctx
                .root
                .as_object()
                .map_or(false, |root| root.contains_key(field)),
            Predicate::PayloadHas(PayloadHas::Equals { field, expected }) => {
                ctx.root.get(field) == Some(expected)
            }
        }
    }
}

/// A gate condition.
///
/// # Example
///
/// ```rust
/// use contextual_validator::{Condition, EvalContext};
/// use serde_json::json;
///
/// // { when: [ {contextIs: 'addProduct'}, 'AND', {payloadHas: {category: 'Food'}} ] }
/// let condition = Condition::context_is("addProduct")
///     .and(Condition::payload_has_value("category", json!("Food")));
///
/// let payload = json!({"category": "Food"});
/// let ctx = EvalContext::new("addProduct", &payload);
/// assert!(condition.evaluate(&ctx));
///
/// let ctx = EvalContext::new("updateProduct", &payload);
/// assert!(!condition.evaluate(&ctx));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `'always'` / `'never'`.
    Literal(bool),
    /// A single predicate object.
    Predicate(Predicate),
    /// `[c0, 'AND'|'OR', c1, ...]`.
    Chain(Box<Chain<Condition>>),
}

impl Condition {
    /// `{ contextIs: token }`.
    pub fn context_is(token: impl Into<String>) -> Self {
        Condition::Predicate(Predicate::ContextIs(vec![token.into()]))
    }

    /// `{ contextIs: [token, ...] }`.
    pub fn context_is_any<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Predicate(Predicate::ContextIs(
            tokens.into_iter().map(Into::into).collect(),
        ))
    }

    /// `{ contextIsNot: token }`.
    pub fn context_is_not(token: impl Into<String>) -> Self {
        Condition::Predicate(Predicate::ContextIsNot(vec![token.into()]))
    }

    /// `{ contextIsNot: [token, ...] }`.
    pub fn context_is_none_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::Predicate(Predicate::ContextIsNot(
            tokens.into_iter().map(Into::into).collect(),
        ))
    }

    /// `{ payloadHas: field }`.
    pub fn payload_has(field: impl Into<String>) -> Self {
        Condition::Predicate(Predicate::PayloadHas(PayloadHas::Key(field.into())))
    }

    /// `{ payloadHas: { field: expected } }`.
    pub fn payload_has_value(field: impl Into<String>, expected: Value) -> Self {
        Condition::Predicate(Predicate::PayloadHas(PayloadHas::Equals {
            field: field.into(),
            expected,
        }))
    }

    /// Appends `AND other`, extending an existing chain rather than nesting.
    pub fn and(self, other: Condition) -> Self {
        self.extend(Operator::And, other)
    }

    /// Appends `OR other`, extending an existing chain rather than nesting.
    pub fn or(self, other: Condition) -> Self {
        self.extend(Operator::Or, other)
    }

    fn extend(self, op: Operator, other: Condition) -> Self {
        let chain = match self {
            Condition::Chain(chain) => *chain,
            single => Chain::new(single),
        };
        Condition::Chain(Box::new(chain.push(op, other)))
    }

    /// Evaluates this condition against the given context.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) -> bool {
        match self {
            Condition::Literal(value) => *value,
            Condition::Predicate(predicate) => predicate.evaluate(ctx),
            Condition::Chain(chain) => chain.fold(|c| c.evaluate(ctx)),
        }
    }
}

/// Everything a condition may look at.
///
/// `context` and `root` drive the built-in predicates. The field-local parts
/// are carried so every gate decision sees the same snapshot.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// The operation token, e.g. `addProduct`.
    pub context: &'a str,
    /// The raw, unsanitized root payload.
    pub root: &'a Value,
    /// The key of the field being decided.
    pub key: &'a str,
    /// The field's current value (after default substitution), if any.
    pub value: Option<&'a Value>,
    /// The object enclosing the field, if it is an object.
    pub scope: Option<&'a Map<String, Value>>,
}

impl<'a> EvalContext<'a> {
    /// Creates a context with no field-local information.
    pub fn new(context: &'a str, root: &'a Value) -> Self {
        Self {
            context,
            root,
            key: "",
            value: None,
            scope: None,
        }
    }

    /// Returns a copy focused on one field.
    pub fn for_field(
        self,
        key: &'a str,
        value: Option<&'a Value>,
        scope: Option<&'a Map<String, Value>>,
    ) -> Self {
        Self {
            key,
            value,
            scope,
            ..self
        }
    }
}

//! Step sequences: the explicit form of a do-block.
//!
//! ```text
//! do {
//!     a <- m1          Bind("a", m1)
//!     let b = a + 1    Let("b", a + 1)
//!     log(b)           TailBind(log(b))
//!     return (a, b)    Return((a, b))
//! }
//! ```
//!
//! A [`StepSequence`] only exists once [`StepSequence::build`] has accepted it, so the evaluator
//! never re-checks its shape.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::BuildError;
use crate::expr::Expr;

/// Binds nothing; may be used any number of times.
pub const DISCARD: &str = "_";

#[derive(Debug, Clone)]
pub enum Step {
    /// Plain binding, no `bind`.
    Let { name: String, expr: Expr },
    /// Monadic binding; the remaining steps become the continuation.
    Bind { name: String, expr: Expr },
    /// A monadic expression whose value is discarded. As the final step it is the result.
    TailBind { expr: Expr },
    /// Lifts the value with `unit`. Only valid as the final step.
    Return { expr: Expr },
}

impl Step {
    pub fn let_(name: impl Into<String>, expr: Expr) -> Step {
        Step::Let {
            name: name.into(),
            expr,
        }
    }

    pub fn bind(name: impl Into<String>, expr: Expr) -> Step {
        Step::Bind {
            name: name.into(),
            expr,
        }
    }

    pub fn then(expr: Expr) -> Step {
        Step::TailBind { expr }
    }

    pub fn ret(expr: Expr) -> Step {
        Step::Return { expr }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Step::Let { .. } => "let",
            Step::Bind { .. } => "bind",
            Step::TailBind { .. } => "then",
            Step::Return { .. } => "return",
        }
    }

    /// The name this step introduces, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Let { name, .. } | Step::Bind { name, .. } => Some(name),
            Step::TailBind { .. } | Step::Return { .. } => None,
        }
    }

    pub fn expr(&self) -> &Expr {
        match self {
            Step::Let { expr, .. }
            | Step::Bind { expr, .. }
            | Step::TailBind { expr }
            | Step::Return { expr } => expr,
        }
    }
}

/// A validated, immutable do-block. Cloning shares the steps.
#[derive(Debug, Clone)]
pub struct StepSequence {
    inner: Arc<SequenceInner>,
}

#[derive(Debug)]
struct SequenceInner {
    name: String,
    params: Vec<String>,
    steps: Vec<Step>,
}

impl StepSequence {
    pub fn build(steps: Vec<Step>, params: Vec<String>) -> Result<StepSequence, BuildError> {
        Self::build_named("<do>", steps, params)
    }

    pub fn build_named(
        name: impl Into<String>,
        steps: Vec<Step>,
        params: Vec<String>,
    ) -> Result<StepSequence, BuildError> {
        validate(&steps, &params)?;
        Ok(StepSequence {
            inner: Arc::new(SequenceInner {
                name: name.into(),
                params,
                steps,
            }),
        })
    }

    pub fn builder(name: impl Into<String>) -> StepSequenceBuilder {
        StepSequenceBuilder {
            name: name.into(),
            params: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn params(&self) -> &[String] {
        &self.inner.params
    }

    pub fn arity(&self) -> usize {
        self.inner.params.len()
    }

    pub fn steps(&self) -> &[Step] {
        &self.inner.steps
    }
}

fn validate(steps: &[Step], params: &[String]) -> Result<(), BuildError> {
    let Some(last) = steps.len().checked_sub(1) else {
        return Err(BuildError::invalid_step(0, "a do-block needs at least one step"));
    };
    let mut bound = BoundNames::default();
    for (index, param) in params.iter().enumerate() {
        if param.is_empty() {
            return Err(BuildError::InvalidParameter(index));
        }
        bound.claim(param)?;
    }
    for (position, step) in steps.iter().enumerate() {
        match step {
            Step::Return { .. } if position != last => {
                return Err(BuildError::invalid_step(
                    position,
                    "`return` must be the final step",
                ));
            }
            Step::Let { .. } | Step::Bind { .. } if position == last => {
                return Err(BuildError::invalid_step(
                    position,
                    format!(
                        "a do-block must end with `return` or a bare monadic expression, found `{}`",
                        step.kind()
                    ),
                ));
            }
            Step::Let { name, .. } | Step::Bind { name, .. } => {
                if name.is_empty() {
                    return Err(BuildError::invalid_step(
                        position,
                        format!("`{}` step has an empty name", step.kind()),
                    ));
                }
                bound.claim(name)?;
            }
            Step::TailBind { .. } | Step::Return { .. } => {}
        }
    }
    Ok(())
}

#[derive(Default)]
struct BoundNames<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> BoundNames<'a> {
    fn claim(&mut self, name: &'a str) -> Result<(), BuildError> {
        if name == DISCARD || self.seen.insert(name) {
            Ok(())
        } else {
            Err(BuildError::DuplicateBinding(name.to_string()))
        }
    }
}

/// Chained construction of a [`StepSequence`]; validation runs in [`Self::build`].
#[derive(Debug, Clone)]
pub struct StepSequenceBuilder {
    name: String,
    params: Vec<String>,
    steps: Vec<Step>,
}

impl StepSequenceBuilder {
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(name.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn let_(self, name: impl Into<String>, expr: Expr) -> Self {
        self.step(Step::let_(name, expr))
    }

    pub fn bind(self, name: impl Into<String>, expr: Expr) -> Self {
        self.step(Step::bind(name, expr))
    }

    pub fn then(self, expr: Expr) -> Self {
        self.step(Step::then(expr))
    }

    pub fn ret(self, expr: Expr) -> Self {
        self.step(Step::ret(expr))
    }

    pub fn build(self) -> Result<StepSequence, BuildError> {
        StepSequence::build_named(self.name, self.steps, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m() -> Expr {
        Expr::just(Expr::lit(1))
    }

    fn build(steps: Vec<Step>) -> Result<StepSequence, BuildError> {
        StepSequence::build(steps, vec![])
    }

    #[test]
    fn accepts_a_well_formed_block() {
        let sequence = StepSequence::builder("pair")
            .param("x")
            .bind("a", m())
            .let_("b", Expr::var("a") + Expr::var("x"))
            .then(m())
            .ret(Expr::tuple([Expr::var("a"), Expr::var("b")]))
            .build()
            .expect("valid block");
        assert_eq!(sequence.name(), "pair");
        assert_eq!(sequence.arity(), 1);
        assert_eq!(
            sequence.steps().iter().map(Step::kind).collect::<Vec<_>>(),
            vec!["bind", "let", "then", "return"]
        );
    }

    #[test]
    fn bare_trailing_expression_is_allowed() {
        assert!(build(vec![Step::bind("a", m()), Step::then(m())]).is_ok());
    }

    #[test]
    fn empty_block_is_rejected_at_position_zero() {
        assert!(matches!(
            build(vec![]),
            Err(BuildError::InvalidStep { position: 0, .. })
        ));
    }

    #[test]
    fn return_must_be_last() {
        assert!(matches!(
            build(vec![Step::ret(m()), Step::then(m())]),
            Err(BuildError::InvalidStep { position: 0, .. })
        ));
    }

    #[test]
    fn binding_cannot_be_last() {
        assert!(matches!(
            build(vec![Step::then(m()), Step::bind("a", m())]),
            Err(BuildError::InvalidStep { position: 1, .. })
        ));
        assert!(matches!(
            build(vec![Step::let_("a", m())]),
            Err(BuildError::InvalidStep { position: 0, .. })
        ));
    }

    #[test]
    fn bindings_need_a_name() {
        assert!(matches!(
            build(vec![Step::bind("", m()), Step::ret(m())]),
            Err(BuildError::InvalidStep { position: 0, .. })
        ));
    }

    #[test]
    fn names_cannot_be_rebound() {
        assert_eq!(
            build(vec![
                Step::bind("a", m()),
                Step::let_("a", m()),
                Step::ret(m()),
            ])
            .expect_err("sequence is invalid"),
            BuildError::DuplicateBinding("a".to_string())
        );
        assert_eq!(
            StepSequence::build(
                vec![Step::bind("x", m()), Step::ret(m())],
                vec!["x".to_string()],
            )
            .expect_err("sequence is invalid"),
            BuildError::DuplicateBinding("x".to_string())
        );
    }

    #[test]
    fn discard_name_may_repeat() {
        assert!(
            build(vec![
                Step::bind(DISCARD, m()),
                Step::bind(DISCARD, m()),
                Step::ret(m()),
            ])
            .is_ok()
        );
    }

    #[test]
    fn empty_parameter_names_are_rejected() {
        assert_eq!(
            StepSequence::build(
                vec![Step::ret(m())],
                vec!["x".to_string(), String::new()],
            )
            .expect_err("sequence is invalid"),
            BuildError::InvalidParameter(1)
        );
    }
}

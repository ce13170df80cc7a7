//! Do-block evaluation.
//!
//! A sequence is folded right to left into nested `bind` calls:
//!
//! ```text
//! [Bind a m1, Let b e, Bind c m2, Return r]
//!   => bind(m1, a -> let b = e in bind(m2, c -> unit(r)))
//! ```
//!
//! Each `Bind` captures the rest of the sequence as a [`Continuation`] holding a snapshot of
//! the environment, so a `List` bind re-runs only the steps after it.

mod env;
mod target;

use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::EvalOptions;
use crate::error::EvalError;
use crate::step::{DISCARD, Step, StepSequence};
use crate::value::{Callable, Fallible, Value};

pub use env::Env;
pub use target::{Continuation, MonadKind};

/// Evaluates `sequence` in `monad` with default options.
pub fn evaluate(sequence: &StepSequence, monad: MonadKind, arguments: Vec<Value>) -> Fallible {
    Evaluator::default().evaluate(sequence, monad, arguments)
}

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvalOptions,
}

impl Evaluator {
    pub fn new(options: EvalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn evaluate(
        &self,
        sequence: &StepSequence,
        monad: MonadKind,
        arguments: Vec<Value>,
    ) -> Fallible {
        if arguments.len() != sequence.arity() {
            return Err(EvalError::ArityMismatch {
                name: sequence.name().to_string(),
                expected: sequence.arity(),
                found: arguments.len(),
            });
        }
        debug!(
            sequence = sequence.name(),
            %monad,
            arguments = arguments.len(),
            "evaluating do-block"
        );
        let env = sequence
            .params()
            .iter()
            .zip(arguments)
            .fold(Env::new(), |env, (name, value)| env.with(name, value));
        let frame = Arc::new(Frame {
            sequence: sequence.clone(),
            monad,
            options: self.options.clone(),
        });
        let result = frame.run_from(0, env);
        match &result {
            Ok(value) => debug!(sequence = sequence.name(), result = %value, "do-block finished"),
            Err(err) => debug!(sequence = sequence.name(), error = %err, "do-block failed"),
        }
        result
    }
}

/// Shared state of one evaluation, referenced by every continuation it creates.
struct Frame {
    sequence: StepSequence,
    monad: MonadKind,
    options: EvalOptions,
}

impl Frame {
    fn run_from(self: &Arc<Self>, start: usize, mut env: Env) -> Fallible {
        let steps = self.sequence.steps();
        let last = steps.len().saturating_sub(1);
        for (index, step) in steps.iter().enumerate().skip(start) {
            trace!(
                sequence = self.sequence.name(),
                step = index,
                kind = step.kind(),
                "step"
            );
            match step {
                Step::Let { name, expr } => {
                    let value = expr.eval(&env)?;
                    env = env.with(name, value);
                }
                Step::Return { expr } => return Ok(self.monad.unit(expr.eval(&env)?)),
                Step::TailBind { expr } if index == last => {
                    let value = expr.eval(&env)?;
                    self.monad.expect(&value)?;
                    return Ok(value);
                }
                Step::TailBind { expr } => {
                    let m = expr.eval(&env)?;
                    return self.bind_rest(index, DISCARD, m, env);
                }
                Step::Bind { name, expr } => {
                    let m = expr.eval(&env)?;
                    return self.bind_rest(index, name, m, env);
                }
            }
        }
        // Only reachable for sequences that bypassed validation.
        Err(EvalError::type_mismatch(self.monad.name(), "Unit"))
    }

    /// `bind(m, a -> steps[index + 1..] with name = a)`.
    fn bind_rest(self: &Arc<Self>, index: usize, name: &str, m: Value, env: Env) -> Fallible {
        let frame = Arc::clone(self);
        let name = name.to_string();
        let next: Continuation =
            Arc::new(move |value| frame.run_from(index + 1, env.with(&name, value)));
        self.monad.bind(m, next, &self.options)
    }
}

/// A step sequence fixed to one monad, callable like a function.
#[derive(Debug, Clone)]
pub struct MonadicFn {
    sequence: StepSequence,
    monad: MonadKind,
    evaluator: Evaluator,
}

impl MonadicFn {
    pub fn new(monad: MonadKind, sequence: StepSequence) -> Self {
        Self {
            sequence,
            monad,
            evaluator: Evaluator::default(),
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.evaluator = Evaluator::new(options);
        self
    }

    pub fn monad(&self) -> MonadKind {
        self.monad
    }

    pub fn sequence(&self) -> &StepSequence {
        &self.sequence
    }

    pub fn call(&self, arguments: Vec<Value>) -> Fallible {
        self.evaluator
            .evaluate(&self.sequence, self.monad, arguments)
    }

    /// Exposes the function to expressions of other do-blocks.
    pub fn into_callable(self) -> Callable {
        let name = self.sequence.name().to_string();
        let arity = self.sequence.arity();
        Callable::new(name, arity, move |arguments| self.call(arguments))
    }
}

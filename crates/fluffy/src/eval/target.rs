use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::trace;

use crate::config::EvalOptions;
use crate::error::EvalError;
use crate::instances::{Function, Identity, List, Maybe, Outcome};
use crate::monad::Monad;
use crate::value::{Fallible, Reader, Value};

/// The rest of a do-block, waiting for the value produced by a `bind`.
pub type Continuation = Arc<dyn Fn(Value) -> Fallible + Send + Sync>;

/// The monad a do-block is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonadKind {
    Identity,
    Maybe,
    Result,
    List,
    Function,
}

impl MonadKind {
    pub const ALL: [MonadKind; 5] = [
        MonadKind::Identity,
        MonadKind::Maybe,
        MonadKind::Result,
        MonadKind::List,
        MonadKind::Function,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MonadKind::Identity => "Identity",
            MonadKind::Maybe => "Maybe",
            MonadKind::Result => "Result",
            MonadKind::List => "List",
            MonadKind::Function => "Function",
        }
    }

    /// Whether `value` is an instance of this monad.
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (MonadKind::Identity, Value::Identity(_))
                | (MonadKind::Maybe, Value::Maybe(_))
                | (MonadKind::Result, Value::Outcome(_))
                | (MonadKind::List, Value::List(_))
                | (MonadKind::Function, Value::Function(_))
        )
    }

    pub fn expect(self, value: &Value) -> Result<(), EvalError> {
        if self.matches(value) {
            Ok(())
        } else {
            Err(self.mismatch(value))
        }
    }

    pub fn unit(self, value: Value) -> Value {
        match self {
            MonadKind::Identity => Identity::unit(value).into(),
            MonadKind::Maybe => Maybe::unit(value).into(),
            MonadKind::Result => Outcome::unit(value).into(),
            MonadKind::List => List::unit(value).into(),
            MonadKind::Function => Value::Function(Reader::unit(Ok(value))),
        }
    }

    /// `bind(m, g)` for this monad. `m` and every value `g` returns must be instances of it.
    pub fn bind(self, m: Value, g: Continuation, options: &EvalOptions) -> Fallible {
        match (self, m) {
            (MonadKind::Identity, Value::Identity(m)) => {
                let bound = Arc::unwrap_or_clone(m).try_bind(|a| self.into_identity(g(a)?))?;
                Ok(bound.into())
            }
            (MonadKind::Maybe, Value::Maybe(m)) => {
                let bound = Arc::unwrap_or_clone(m).try_bind(|a| self.into_maybe(g(a)?))?;
                Ok(bound.into())
            }
            (MonadKind::Result, Value::Outcome(m)) => {
                let bound = Arc::unwrap_or_clone(m).try_bind(|a| self.into_outcome(g(a)?))?;
                Ok(bound.into())
            }
            (MonadKind::List, Value::List(m)) => {
                let m = Arc::unwrap_or_clone(m);
                let parallel = options.parallel_list_bind && options.parallelize(m.len());
                let bound = if parallel {
                    trace!("parallel list bind");
                    self.bind_list_parallel(m, &g)?
                } else {
                    m.try_bind(|a| self.into_list(g(a)?))?
                };
                Ok(bound.into())
            }
            (MonadKind::Function, Value::Function(reader)) => {
                let bound = reader.bind(move |a: Fallible| {
                    match a.and_then(g.as_ref()).and_then(|next| self.into_reader(next)) {
                        Ok(next) => next,
                        Err(err) => failing(err),
                    }
                });
                Ok(Value::Function(bound))
            }
            (_, other) => Err(self.mismatch(&other)),
        }
    }

    /// `bind(m, _ => next)`.
    pub fn then(self, m: Value, next: Value, options: &EvalOptions) -> Fallible {
        self.bind(m, Arc::new(move |_| Ok(next.clone())), options)
    }

    /// Runs every continuation, then reports the first failure in element order so the
    /// outcome matches the sequential bind.
    fn bind_list_parallel(self, m: List<Value>, g: &Continuation) -> Result<List<Value>, EvalError> {
        let items: Vec<Value> = m.into_iter().collect();
        let parts: Vec<Result<List<Value>, EvalError>> = items
            .into_par_iter()
            .map(|a| self.into_list(g(a)?))
            .collect();
        let parts = parts.into_iter().collect::<Result<List<List<Value>>, EvalError>>()?;
        Ok(List::join(parts))
    }

    fn mismatch(self, value: &Value) -> EvalError {
        EvalError::type_mismatch(self.name(), value.type_name())
    }

    fn into_identity(self, value: Value) -> Result<Identity<Value>, EvalError> {
        match value {
            Value::Identity(m) => Ok(Arc::unwrap_or_clone(m)),
            other => Err(self.mismatch(&other)),
        }
    }

    fn into_maybe(self, value: Value) -> Result<Maybe<Value>, EvalError> {
        match value {
            Value::Maybe(m) => Ok(Arc::unwrap_or_clone(m)),
            other => Err(self.mismatch(&other)),
        }
    }

    fn into_outcome(self, value: Value) -> Result<Outcome<Value>, EvalError> {
        match value {
            Value::Outcome(m) => Ok(Arc::unwrap_or_clone(m)),
            other => Err(self.mismatch(&other)),
        }
    }

    fn into_list(self, value: Value) -> Result<List<Value>, EvalError> {
        match value {
            Value::List(m) => Ok(Arc::unwrap_or_clone(m)),
            other => Err(self.mismatch(&other)),
        }
    }

    fn into_reader(self, value: Value) -> Result<Reader, EvalError> {
        match value {
            Value::Function(reader) => Ok(reader),
            other => Err(self.mismatch(&other)),
        }
    }
}

/// A reader that fails with `err` whatever the environment.
fn failing(err: EvalError) -> Reader {
    Function::new(move |_| Err(err.clone()))
}

impl fmt::Display for MonadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lift(kind: MonadKind) -> Continuation {
        Arc::new(move |value| match value {
            Value::Int(n) => Ok(kind.unit(Value::Int(n + 1))),
            other => Ok(kind.unit(other)),
        })
    }

    #[test]
    fn unit_builds_the_matching_variant() {
        for kind in MonadKind::ALL {
            assert!(kind.matches(&kind.unit(Value::Int(1))), "{kind}");
        }
    }

    #[test]
    fn bind_rejects_foreign_instances() {
        let err = MonadKind::Maybe
            .bind(Value::success(Value::Int(1)), lift(MonadKind::Maybe), &EvalOptions::default())
            .expect_err("bind fails");
        assert_eq!(err, EvalError::type_mismatch("Maybe", "Result"));
    }

    #[test]
    fn continuation_results_are_checked() {
        let err = MonadKind::Maybe
            .bind(Value::just(Value::Int(1)), lift(MonadKind::List), &EvalOptions::default())
            .expect_err("bind fails");
        assert_eq!(err, EvalError::type_mismatch("Maybe", "List"));
    }

    #[test]
    fn reader_bind_defers_failures_until_run() {
        let options = EvalOptions::default();
        let m = MonadKind::Function.unit(Value::Int(1));
        let bound = MonadKind::Function
            .bind(m, Arc::new(|_| Err(EvalError::DivisionByZero)), &options)
            .expect("binding a reader is lazy");
        assert_eq!(
            bound.run_reader(Value::Unit),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn parallel_list_bind_keeps_order_and_first_error() {
        let items = Value::list((0..50).map(Value::Int));
        let g: Continuation = Arc::new(|value| {
            let n = value.expect_int()?;
            Ok(Value::list([Value::Int(n), Value::Int(-n)]))
        });
        let sequential = MonadKind::List
            .bind(items.clone(), Arc::clone(&g), &EvalOptions::default())
            .expect("sequential");
        let parallel = MonadKind::List
            .bind(items, g, &EvalOptions::parallel(1))
            .expect("parallel");
        assert_eq!(sequential, parallel);

        let failing: Continuation = Arc::new(|value| match value.expect_int()? {
            n if n >= 10 => Err(EvalError::Call {
                name: "f".to_string(),
                message: n.to_string(),
            }),
            n => Ok(Value::list([Value::Int(n)])),
        });
        let err = MonadKind::List
            .bind(Value::list((0..50).map(Value::Int)), failing, &EvalOptions::parallel(1))
            .expect_err("bind fails");
        assert_eq!(
            err,
            EvalError::Call {
                name: "f".to_string(),
                message: "10".to_string(),
            }
        );
    }

    #[test]
    fn then_discards_the_first_value() {
        let options = EvalOptions::default();
        let result = MonadKind::List
            .then(
                Value::list([Value::Int(1), Value::Int(2)]),
                Value::list([Value::text("x")]),
                &options,
            )
            .expect("then");
        assert_eq!(result, Value::list([Value::text("x"), Value::text("x")]));
    }
}

#![deny(clippy::unwrap_used)]
//! Do-notation over plain data.
//!
//! A do-block is an explicit [`StepSequence`]; [`evaluate`] folds it into nested `bind` calls of
//! one of the [`MonadKind`] targets. The typed instances in [`instances`] implement [`Monad`]
//! directly and can be used without the evaluator.
//!
//! ```
//! use fluffy::{Expr, MonadKind, StepSequence, Value, evaluate};
//!
//! let sequence = StepSequence::builder("add")
//!     .bind("a", Expr::just(Expr::lit(2)))
//!     .bind("b", Expr::just(Expr::var("a") * Expr::lit(3)))
//!     .ret(Expr::var("a") + Expr::var("b"))
//!     .build()?;
//! let result = evaluate(&sequence, MonadKind::Maybe, vec![])?;
//! assert_eq!(result.to_string(), "Just 8");
//! # Ok::<(), fluffy::FluffyError>(())
//! ```

pub mod config;
mod error;
pub mod eval;
pub mod expr;
pub mod instances;
pub mod monad;
pub mod progression;
pub mod step;
pub mod value;

pub use config::{EvalOptions, FluffyToml, parse_fluffy_toml, read_fluffy_toml};
pub use error::{BuildError, EvalError, FluffyError};
pub use eval::{Env, Evaluator, MonadKind, MonadicFn, evaluate};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use instances::{Function, Identity, List, Maybe, Outcome, safe};
pub use monad::Monad;
pub use progression::{InvalidRange, Progression};
pub use step::{DISCARD, Step, StepSequence, StepSequenceBuilder};
pub use value::{Callable, Fallible, Reader, Value};

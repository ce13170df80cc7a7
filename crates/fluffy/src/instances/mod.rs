//! Concrete monads. Each is a closed set of variants with its own `unit`/`bind`.

mod function;
mod identity;
mod list;
mod maybe;
mod outcome;

pub use function::Function;
pub use identity::Identity;
pub use list::{IntoIter, Iter, List};
pub use maybe::Maybe;
pub use outcome::{safe, Outcome};

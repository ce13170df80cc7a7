use std::fmt;

use serde::Serialize;

use crate::monad::Monad;

/// A computation that either succeeded with a value or failed with a message.
///
/// ```text
/// data Outcome a = Success a | Error String
/// ```
///
/// `Error` short-circuits `bind` and carries its message through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome<T> {
    Success(T),
    Error(String),
}

impl<T> Outcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error(message.into())
    }

    /// Converts a std `Result`, keeping only the rendered error message.
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Error(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Error(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Error(message) => Some(message),
        }
    }

    pub fn try_bind<B, E>(
        self,
        g: impl FnOnce(T) -> Result<Outcome<B>, E>,
    ) -> Result<Outcome<B>, E> {
        match self {
            Outcome::Success(value) => g(value),
            Outcome::Error(message) => Ok(Outcome::Error(message)),
        }
    }
}

/// Runs `f`, turning a failure into `Error(message)` instead of propagating it.
pub fn safe<T, E, F>(f: F) -> Outcome<T>
where
    E: fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    Outcome::from_result(f())
}

impl<T> Monad for Outcome<T> {
    type Item = T;
    type Wrapped<B> = Outcome<B>;

    fn unit(value: T) -> Self {
        Outcome::Success(value)
    }

    fn bind<B, G>(self, g: G) -> Outcome<B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(T) -> Outcome<B> + Send + Sync + 'static,
    {
        match self {
            Outcome::Success(value) => g(value),
            Outcome::Error(message) => Outcome::Error(message),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(value) => write!(f, "Success ({value})"),
            Outcome::Error(message) => write!(f, "Error \"{message}\""),
        }
    }
}

use std::fmt;

use serde::Serialize;

use crate::monad::Monad;

/// An optional value.
///
/// ```text
/// data Maybe a = Just a | Nothing
/// ```
///
/// `Nothing` short-circuits `bind`: the continuation is never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Maybe<T> {
    Just(T),
    Nothing,
}

impl<T> Maybe<T> {
    pub fn is_just(&self) -> bool {
        matches!(self, Maybe::Just(_))
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Maybe::Nothing)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Maybe::Just(value) => Some(value),
            Maybe::Nothing => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Maybe::Just(value) => Some(value),
            Maybe::Nothing => None,
        }
    }

    /// `bind` whose continuation may fail; `Nothing` still short-circuits.
    pub fn try_bind<B, E>(self, g: impl FnOnce(T) -> Result<Maybe<B>, E>) -> Result<Maybe<B>, E> {
        match self {
            Maybe::Just(value) => g(value),
            Maybe::Nothing => Ok(Maybe::Nothing),
        }
    }
}

impl<T> Monad for Maybe<T> {
    type Item = T;
    type Wrapped<B> = Maybe<B>;

    fn unit(value: T) -> Self {
        Maybe::Just(value)
    }

    fn bind<B, G>(self, g: G) -> Maybe<B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(T) -> Maybe<B> + Send + Sync + 'static,
    {
        match self {
            Maybe::Just(value) => g(value),
            Maybe::Nothing => Maybe::Nothing,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Maybe::Just(value),
            None => Maybe::Nothing,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(value: Maybe<T>) -> Self {
        value.into_option()
    }
}

impl<T: fmt::Display> fmt::Display for Maybe<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Maybe::Just(value) => write!(f, "Just {value}"),
            Maybe::Nothing => write!(f, "Nothing"),
        }
    }
}

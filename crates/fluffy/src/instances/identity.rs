use std::fmt;

use serde::Serialize;

use crate::monad::Monad;

/// The trivial monad: `bind` applies the continuation to the wrapped value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Identity<T>(pub T);

impl<T> Identity<T> {
    pub fn new(value: T) -> Self {
        Identity(value)
    }

    pub fn value(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    /// `bind` whose continuation may fail; the failure is returned as is.
    pub fn try_bind<B, E>(
        self,
        g: impl FnOnce(T) -> Result<Identity<B>, E>,
    ) -> Result<Identity<B>, E> {
        g(self.0)
    }
}

impl<T> Monad for Identity<T> {
    type Item = T;
    type Wrapped<B> = Identity<B>;

    fn unit(value: T) -> Self {
        Identity(value)
    }

    fn bind<B, G>(self, g: G) -> Identity<B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(T) -> Identity<B> + Send + Sync + 'static,
    {
        g(self.0)
    }
}

impl<T: fmt::Display> fmt::Display for Identity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity {}", self.0)
    }
}

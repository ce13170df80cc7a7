use std::fmt;
use std::sync::Arc;

use crate::monad::Monad;

/// The reader monad: a computation waiting for an environment of type `E`.
///
/// `bind` threads the same environment into both the outer computation and the one produced
/// by the continuation. Nothing runs until [`Function::run`] supplies the environment.
pub struct Function<E, T> {
    run: Arc<dyn Fn(E) -> T + Send + Sync>,
}

impl<E, T> Function<E, T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(E) -> T + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    pub fn run(&self, env: E) -> T {
        (self.run)(env)
    }
}

impl<E: 'static> Function<E, E> {
    /// The environment itself.
    pub fn ask() -> Self {
        Function::new(|env| env)
    }
}

impl<E: 'static, T: 'static> Function<E, T> {
    /// Runs `self` against an environment rewritten by `f`.
    pub fn local<F>(self, f: F) -> Self
    where
        F: Fn(E) -> E + Send + Sync + 'static,
    {
        Function::new(move |env| self.run(f(env)))
    }
}

impl<E, T> Clone for Function<E, T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<E, T> fmt::Debug for Function<E, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function(<fn>)")
    }
}

impl<E, T> Monad for Function<E, T>
where
    E: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    type Item = T;
    type Wrapped<B> = Function<E, B>;

    fn unit(value: T) -> Self {
        Function::new(move |_| value.clone())
    }

    fn bind<B, G>(self, g: G) -> Function<E, B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(T) -> Function<E, B> + Send + Sync + 'static,
    {
        Function::new(move |env: E| g(self.run(env.clone())).run(env))
    }
}

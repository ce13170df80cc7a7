//! The `Monad` capability shared by every instance in [`crate::instances`].
//!
//! An instance provides `unit` (lift a plain value) and `bind` (sequence a computation that
//! depends on the unwrapped content). `then` is derived from `bind`.
//!
//! Every instance must satisfy the monad laws:
//!
//! ```text
//! left identity   unit(x).bind(g)          == g(x)
//! right identity  m.bind(unit)             == m
//! associativity   m.bind(g).bind(h)        == m.bind(|x| g(x).bind(h))
//! ```
//!
//! Continuations are `Fn + Send + Sync + 'static` so one signature serves instances that call
//! them once (`Maybe`), once per element (`List`) or only when run later (`Function`).

pub trait Monad: Sized {
    /// The value carried by this instance.
    type Item;
    /// The same instance carrying a different value type.
    type Wrapped<B>;

    fn unit(value: Self::Item) -> Self;

    fn bind<B, G>(self, g: G) -> Self::Wrapped<B>
    where
        B: Clone + Send + Sync + 'static,
        G: Fn(Self::Item) -> Self::Wrapped<B> + Send + Sync + 'static;

    fn then<B>(self, next: Self::Wrapped<B>) -> Self::Wrapped<B>
    where
        B: Clone + Send + Sync + 'static,
        Self::Wrapped<B>: Clone + Send + Sync + 'static,
    {
        self.bind(move |_: Self::Item| next.clone())
    }
}

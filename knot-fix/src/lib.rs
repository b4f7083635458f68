//! Call-by-value fixed-point combinator for Rust closures.
//!
//! [`fix`] turns a *self-aware* closure, one whose first argument is a
//! reference to "itself", into an ordinary closure that supplies that
//! reference on its own. The result closes over the base closure and a
//! self-application step and nothing else, so it can be renamed, moved,
//! dropped from its defining scope or shared across threads without
//! changing what it computes.
//!
//! ```
//! use knot_fix::fix;
//!
//! let fib = fix(|fib: &dyn Fn(u64) -> u64, n: u64| {
//!     if n < 2 { 1 } else { fib(n - 1) + fib(n - 2) }
//! });
//!
//! assert_eq!(fib.call(6), 13);
//! ```

use std::fmt;
use std::sync::Arc;

/// An ordinary callable produced by tying the knot.
pub type Tied<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// The generator `g` in `g(g)`.
///
/// A closure type cannot name itself, so the argument of the generator is
/// wrapped in a newtype to make `self(self)` expressible.
struct SelfApply<A, R>(Arc<dyn Fn(&SelfApply<A, R>) -> Tied<A, R> + Send + Sync>);

impl<A, R> Clone for SelfApply<A, R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<A, R> SelfApply<A, R> {
    fn apply(&self, this: &SelfApply<A, R>) -> Tied<A, R> {
        (self.0)(this)
    }
}

/// Handle to a tied callable.
///
/// Cloning is cheap and every clone behaves identically; there is no state
/// shared between invocations.
pub struct Fix<A, R> {
    tied: Tied<A, R>,
}

impl<A: 'static, R: 'static> Fix<A, R> {
    /// Tie `base` into an ordinary callable. Equivalent to [`fix`].
    pub fn new<F>(base: F) -> Self
    where
        F: Fn(&dyn Fn(A) -> R, A) -> R + Send + Sync + 'static,
    {
        // g = |self| tied, where tied(args) = base(self(self), args)
        let base = Arc::new(base);
        let generator: SelfApply<A, R> = SelfApply(Arc::new(move |this: &SelfApply<A, R>| {
            let this = this.clone();
            let base = Arc::clone(&base);
            let tied: Tied<A, R> = Arc::new(move |args: A| {
                // Delayed until invocation, otherwise construction would never return.
                let rec = this.apply(&this);
                base(&*rec, args)
            });
            tied
        }));

        Self {
            tied: generator.apply(&generator),
        }
    }
}

impl<A, R> Fix<A, R> {
    /// Invoke the tied callable.
    pub fn call(&self, args: A) -> R {
        (self.tied)(args)
    }

    /// Borrow the tied callable as a plain closure reference.
    pub fn as_fn(&self) -> &(dyn Fn(A) -> R + Send + Sync) {
        &*self.tied
    }

    /// Unwrap into the shared closure.
    pub fn into_fn(self) -> Tied<A, R> {
        self.tied
    }
}

impl<A, R> Clone for Fix<A, R> {
    fn clone(&self) -> Self {
        Self {
            tied: Arc::clone(&self.tied),
        }
    }
}

impl<A, R> fmt::Debug for Fix<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fix").finish_non_exhaustive()
    }
}

/// Tie a self-aware closure into an ordinary one.
///
/// `base` receives a reference to a callable that behaves exactly like the
/// returned handle, followed by the payload argument. Invoking the result
/// with `args` is equivalent to `base(&tied, args)`.
///
/// Nothing is validated at construction. Errors returned by `base` (for
/// example when `R` is a `Result`) pass through untouched, and a `base` that
/// never stops recursing exhausts the stack like any other runaway recursion.
pub fn fix<A, R, F>(base: F) -> Fix<A, R>
where
    A: 'static,
    R: 'static,
    F: Fn(&dyn Fn(A) -> R, A) -> R + Send + Sync + 'static,
{
    Fix::new(base)
}

#[cfg(test)]
#[path = "tests/mod.rs"]
mod tests;

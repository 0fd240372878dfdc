//! Memoization engine: at-most-once evaluation per distinct input tuple.
//!
//! # Overview
//!
//! - [`Unit::memoize`]: wraps a unit with a cache keyed by its input tuple.
//!   Idempotent: memoizing a memoized unit returns it unchanged, cache
//!   included.
//! - [`Unit::memoize_ok`]: the same for fallible units, caching only `Ok`
//!   results so that a failure never poisons its key.
//! - [`MemoizedUnit`]: a typed handle exposing the cache.
//! - [`MemoCache`]: the concurrent compute-if-absent map underneath.
//!
//! # Keys
//!
//! The key of an input tuple is the tuple of its slots' [`Slot::Key`]s, the
//! per-kind equality strategy: primitives by value, floats by canonical
//! bits, references structurally (or by identity for
//! [`Identity`](crate::kind::Identity)), and null as a key of its own.
//!
//! [`Slot::Key`]: crate::kind::Slot::Key
//!
//! # Concurrency
//!
//! The check-then-insert sequence for a key is a single critical section
//! guarded by that key's own lock, so concurrent callers for one key run the
//! inner unit at most once. The compute-if-absent contract holds for every
//! unit, regardless of kinds or arity. Failed computations are not cached:
//! a panic (or a rejected `Err`) leaves the key absent and the next caller
//! retries.
//!
//! # Memory
//!
//! Caches grow without bound and never evict. A memoized unit keeps every
//! result for as long as any clone of it is alive.
//!
//! # Examples
//!
//! ```
//! use kindred::unit::Unit;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let calls = Arc::new(AtomicUsize::new(0));
//! let counted = Arc::clone(&calls);
//! let lookup = Unit::unary(move |name: Option<String>| {
//!     counted.fetch_add(1, Ordering::SeqCst);
//!     name.map_or(0, |name| name.len())
//! })
//! .memoize();
//!
//! assert_eq!(lookup.apply(None), 0);
//! assert_eq!(lookup.apply(None), 0);
//! assert_eq!(lookup.apply(Some("four".into())), 4);
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//!
//! let again = lookup.memoize();
//! assert_eq!(again.apply(None), 0);
//! assert_eq!(calls.load(Ordering::SeqCst), 2);
//! ```

mod cache;
mod memoized;

pub use cache::{DefaultHashBuilder, MemoCache};
pub use memoized::MemoizedUnit;

use crate::unit::{Signature, Unit};

/// Wraps `unit` in a [`MemoizedUnit`]. Equivalent to
/// [`MemoizedUnit::new`].
pub fn memoize<A, R>(unit: &Unit<A, R>) -> MemoizedUnit<A, R>
where
    A: Signature,
    R: Clone + Send + Sync + 'static,
{
    MemoizedUnit::new(unit)
}

impl<A: Signature, R: Clone + Send + Sync + 'static> Unit<A, R> {
    /// Returns a memoizing unit; a unit that is already memoized is returned
    /// unchanged.
    #[must_use]
    pub fn memoize(&self) -> Self {
        if self.is_memoized() {
            return self.clone();
        }
        MemoizedUnit::new(self).into_unit()
    }

    /// Returns a typed handle on the memoized form of this unit.
    pub fn to_memoized(&self) -> MemoizedUnit<A, R> {
        MemoizedUnit::new(self)
    }
}

impl<A, T, E> Unit<A, Result<T, E>>
where
    A: Signature,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Memoizes only successful results.
    ///
    /// An `Err` is returned to its caller and the same inputs are evaluated
    /// again on the next call. A unit that is already memoized is returned
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    ///
    /// let attempts = Arc::new(AtomicUsize::new(0));
    /// let counted = Arc::clone(&attempts);
    /// let flaky = Unit::unary(move |x: i32| {
    ///     if counted.fetch_add(1, Ordering::SeqCst) == 0 {
    ///         Err("transient")
    ///     } else {
    ///         Ok(x * 2)
    ///     }
    /// })
    /// .memoize_ok();
    ///
    /// assert_eq!(flaky.apply(5), Err("transient"));
    /// assert_eq!(flaky.apply(5), Ok(10));
    /// assert_eq!(flaky.apply(5), Ok(10));
    /// assert_eq!(attempts.load(Ordering::SeqCst), 2);
    /// ```
    #[must_use]
    pub fn memoize_ok(&self) -> Self {
        if self.is_memoized() {
            return self.clone();
        }
        MemoizedUnit::retaining(self, Result::is_ok).into_unit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_memoize_marks_unit() {
        let unit = Unit::unary(|x: i32| x);
        assert!(!unit.is_memoized());
        assert!(unit.memoize().is_memoized());
    }

    #[rstest]
    fn test_memoize_ok_then_memoize_is_noop() {
        let unit = Unit::unary(|x: i32| if x > 0 { Ok(x) } else { Err(x) });
        let memoized = unit.memoize_ok();
        let handle = MemoizedUnit::from_unit(&memoized.memoize()).unwrap();

        memoized.apply(-1);
        memoized.apply(1);
        assert_eq!(handle.cached_len(), 1);
    }

    #[rstest]
    fn test_free_memoize_matches_method() {
        let unit = Unit::unary(|x: i32| x + 1);
        let memoized = memoize(&unit);
        assert_eq!(memoized.invoke((1,)), 2);
        assert_eq!(memoized.arity(), 1);
    }
}

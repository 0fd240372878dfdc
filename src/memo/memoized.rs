//! The typed memoizing wrapper.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use super::cache::MemoCache;
use crate::unit::{CacheHandle, Signature, Unit};

/// A unit wrapped with a result cache keyed by its full input tuple.
///
/// For structurally equal input tuples the inner unit runs at most once,
/// including under concurrent invocation, and every caller observes the
/// same result. The cache lives as long as the last clone of this wrapper
/// (or of the unit obtained from [`into_unit`](MemoizedUnit::into_unit)).
///
/// # Examples
///
/// ```
/// use kindred::memo::MemoizedUnit;
/// use kindred::unit::Unit;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counted = Arc::clone(&calls);
/// let square = Unit::unary(move |x: i64| {
///     counted.fetch_add(1, Ordering::SeqCst);
///     x * x
/// });
///
/// let memoized = MemoizedUnit::new(&square);
/// assert_eq!(memoized.invoke((12,)), 144);
/// assert_eq!(memoized.invoke((12,)), 144);
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// assert!(memoized.is_cached(&(12,)));
/// ```
pub struct MemoizedUnit<A: Signature, R> {
    unit: Unit<A, R>,
    cache: Arc<MemoCache<A::Key, R>>,
}

impl<A: Signature, R> Clone for MemoizedUnit<A, R> {
    fn clone(&self) -> Self {
        Self {
            unit: self.unit.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<A: Signature, R: Clone + Send + Sync + 'static> MemoizedUnit<A, R> {
    /// Wraps `inner` with a cache retaining every result.
    ///
    /// If `inner` is already memoized, its existing cache is reused.
    pub fn new(inner: &Unit<A, R>) -> Self {
        Self::build(inner, MemoCache::new(), |_| true)
    }

    /// Like [`new`](MemoizedUnit::new), preallocating room for `capacity`
    /// input tuples.
    pub fn with_capacity(inner: &Unit<A, R>, capacity: usize) -> Self {
        Self::build(inner, MemoCache::with_capacity(capacity), |_| true)
    }

    /// Wraps `inner` with a cache that stores only results accepted by
    /// `retain`. Rejected results are returned but computed again on the
    /// next call.
    pub fn retaining(inner: &Unit<A, R>, retain: fn(&R) -> bool) -> Self {
        Self::build(inner, MemoCache::new(), retain)
    }

    fn build(inner: &Unit<A, R>, cache: MemoCache<A::Key, R>, retain: fn(&R) -> bool) -> Self {
        if let Some(existing) = Self::from_unit(inner) {
            return existing;
        }

        tracing::debug!(
            arity = A::ARITY,
            inputs = type_name::<A>(),
            output = type_name::<R>(),
            "memoizing unit"
        );

        let cache = Arc::new(cache);
        let shared = Arc::clone(&cache);
        let original = inner.clone();
        let handle: CacheHandle = cache.clone();

        let unit = Unit::with_cache(
            move |inputs: A| {
                let key = inputs.key();
                shared.get_or_compute_if(key, || original.invoke(inputs), retain)
            },
            handle,
        );

        Self { unit, cache }
    }

    /// Recovers the wrapper of an already-memoized unit, sharing its cache.
    ///
    /// Returns `None` if `unit` is not memoized.
    pub fn from_unit(unit: &Unit<A, R>) -> Option<Self> {
        let handle = Arc::clone(unit.cache_handle()?);
        let cache = handle.downcast::<MemoCache<A::Key, R>>().ok()?;
        Some(Self {
            unit: unit.clone(),
            cache,
        })
    }

    /// Evaluates through the cache.
    #[inline]
    pub fn invoke(&self, inputs: A) -> R {
        self.unit.invoke(inputs)
    }

    /// Returns `true` if a result is cached for `inputs`.
    pub fn is_cached(&self, inputs: &A) -> bool {
        self.cache.contains_key(&inputs.key())
    }

    /// Returns the cached result for `inputs` without evaluating anything.
    pub fn cached(&self, inputs: &A) -> Option<R> {
        self.cache.get(&inputs.key())
    }

    /// Memoizing a memoized unit is a no-op.
    #[must_use]
    pub fn memoize(&self) -> Self {
        self.clone()
    }
}

impl<A: Signature, R> MemoizedUnit<A, R> {
    /// Returns the number of input slots.
    #[must_use]
    pub const fn arity(&self) -> usize {
        A::ARITY
    }

    /// Returns the number of cached results.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Returns the memoized unit, cache attached.
    pub const fn as_unit(&self) -> &Unit<A, R> {
        &self.unit
    }

    /// Converts into the memoized unit, cache attached.
    pub fn into_unit(self) -> Unit<A, R> {
        self.unit
    }
}

impl<A: Signature, R> From<MemoizedUnit<A, R>> for Unit<A, R> {
    fn from(memoized: MemoizedUnit<A, R>) -> Self {
        memoized.unit
    }
}

impl<A: Signature, R> fmt::Debug for MemoizedUnit<A, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MemoizedUnit")
            .field("inputs", &type_name::<A>())
            .field("output", &type_name::<R>())
            .field("cached", &self.cache.len())
            .finish()
    }
}

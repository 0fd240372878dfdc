//! The concurrent compute-if-absent cache behind every memoized unit.

use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};

/// Hasher used by [`MemoCache`] unless another one is supplied.
///
/// `FxBuildHasher` with the `fxhash` feature, `ahash::RandomState` with the
/// `ahash` feature, and the standard library's `RandomState` otherwise.
#[cfg(feature = "fxhash")]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// Hasher used by [`MemoCache`] unless another one is supplied.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultHashBuilder = ahash::RandomState;

/// Hasher used by [`MemoCache`] unless another one is supplied.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder = std::collections::hash_map::RandomState;

type SlotCell<V> = Arc<Mutex<Option<V>>>;

/// A concurrent map from keys to computed values, filled on demand.
///
/// Every key owns a slot guarded by its own mutex. [`get_or_compute`]
/// holds that mutex across the check, the computation and the insert, so
/// for one key the computation runs at most once no matter how many
/// callers race on it. Callers for other keys are not blocked, and the map
/// itself is never locked while user code runs.
///
/// # Lifetime policy
///
/// Computed entries are retained forever: there is no eviction, and memory
/// is only released when the cache itself is dropped. A bounded cache would
/// be a different wrapper. A key whose computation panics or is rejected
/// leaves no entry behind once no other caller is waiting on it.
///
/// # Failures
///
/// A slot only ever holds a successfully computed value; presence is the
/// `Some` of the slot, never a property of the value. If the computation
/// panics, the slot guard is released during unwinding and the slot stays
/// empty, so the next caller computes again. The same holds when the
/// retention policy rejects a result (see [`get_or_compute_if`]).
///
/// Invoking [`get_or_compute`] for a key from inside the computation of the
/// same key deadlocks.
///
/// [`get_or_compute`]: MemoCache::get_or_compute
/// [`get_or_compute_if`]: MemoCache::get_or_compute_if
///
/// # Examples
///
/// ```
/// use kindred::memo::MemoCache;
///
/// let cache: MemoCache<u32, String> = MemoCache::new();
///
/// assert_eq!(cache.get_or_compute(7, || "seven".to_string()), "seven");
/// assert_eq!(cache.get_or_compute(7, || unreachable!()), "seven");
/// assert_eq!(cache.len(), 1);
/// ```
pub struct MemoCache<K, V, S = DefaultHashBuilder> {
    slots: RwLock<HashMap<K, SlotCell<V>, S>>,
    populated: AtomicUsize,
}

impl<K, V, S: Default> MemoCache<K, V, S> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates an empty cache with room for `capacity` keys.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S: Default> Default for MemoCache<K, V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> MemoCache<K, V, S> {
    /// Creates an empty cache using `hasher` for its keys.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            slots: RwLock::new(HashMap::with_hasher(hasher)),
            populated: AtomicUsize::new(0),
        }
    }

    /// Creates an empty cache with room for `capacity` keys using `hasher`.
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            slots: RwLock::new(HashMap::with_capacity_and_hasher(capacity, hasher)),
            populated: AtomicUsize::new(0),
        }
    }

    /// Returns the number of computed entries.
    pub fn len(&self) -> usize {
        self.populated.load(Ordering::Acquire)
    }

    /// Returns `true` if nothing has been computed yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V, S> MemoCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    /// Returns the value for `key`, computing and storing it if absent.
    ///
    /// This is the atomic compute-if-absent primitive. Concurrent callers
    /// for the same key wait for the first one and then observe its
    /// result.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        self.get_or_compute_if(key, compute, |_| true)
    }

    /// Like [`get_or_compute`](MemoCache::get_or_compute), but only stores
    /// the computed value when `retain` accepts it.
    ///
    /// A rejected value is still returned to this caller, and the next
    /// caller for the key computes again.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::memo::MemoCache;
    ///
    /// let cache: MemoCache<&str, Result<i32, String>> = MemoCache::new();
    ///
    /// let failed = cache.get_or_compute_if("n", || Err("offline".into()), Result::is_ok);
    /// assert!(failed.is_err());
    /// assert!(!cache.contains_key(&"n"));
    ///
    /// let recovered = cache.get_or_compute_if("n", || Ok(3), Result::is_ok);
    /// assert_eq!(recovered, Ok(3));
    /// assert!(cache.contains_key(&"n"));
    /// ```
    pub fn get_or_compute_if<F, P>(&self, key: K, compute: F, retain: P) -> V
    where
        F: FnOnce() -> V,
        P: FnOnce(&V) -> bool,
    {
        let slot = self.slot_for(key.clone());
        let mut guard = slot.lock();

        if let Some(value) = guard.as_ref() {
            tracing::trace!("memo cache hit");
            return value.clone();
        }

        // Dropped before `guard`, so a panicking computation evicts the
        // slot while still holding it.
        let mut vacancy = Vacancy {
            cache: self,
            key: Some(key),
            slot: &slot,
        };

        tracing::trace!("memo cache miss; evaluating");
        let value = compute();

        if retain(&value) {
            *guard = Some(value.clone());
            vacancy.key = None;
            self.populated.fetch_add(1, Ordering::Release);
            tracing::trace!(entries = self.len(), "memo cache stored result");
        } else {
            tracing::trace!("memo cache discarded result");
        }

        drop(vacancy);
        value
    }

    /// Returns the stored value for `key`, if any.
    ///
    /// Waits for an in-flight computation of the same key to finish.
    pub fn get(&self, key: &K) -> Option<V> {
        let slot = self.slots.read().get(key).map(Arc::clone)?;
        let guard = slot.lock();
        guard.clone()
    }

    /// Returns `true` if a value is stored for `key`.
    ///
    /// Waits for an in-flight computation of the same key to finish.
    pub fn contains_key(&self, key: &K) -> bool {
        let Some(slot) = self.slots.read().get(key).map(Arc::clone) else {
            return false;
        };
        let guard = slot.lock();
        guard.is_some()
    }

    fn slot_for(&self, key: K) -> SlotCell<V> {
        if let Some(slot) = self.slots.read().get(&key) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write();
        Arc::clone(
            slots
                .entry(key)
                .or_insert_with(|| Arc::new(Mutex::new(None))),
        )
    }

    /// Removes the still-empty `slot` for `key` unless another caller holds
    /// a handle to it.
    fn evict_vacant(&self, key: &K, slot: &SlotCell<V>) {
        let mut slots = self.slots.write();
        // With the map locked, the map and the evicting caller are the only
        // possible holders.
        let unshared = Arc::strong_count(slot) == 2
            && slots.get(key).is_some_and(|stored| Arc::ptr_eq(stored, slot));
        if unshared {
            slots.remove(key);
            tracing::trace!("memo cache evicted vacant slot");
        }
    }
}

/// Evicts an unfilled slot when dropped with a key still set.
struct Vacancy<'a, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    cache: &'a MemoCache<K, V, S>,
    key: Option<K>,
    slot: &'a SlotCell<V>,
}

impl<K, V, S> Drop for Vacancy<'_, K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.cache.evict_vacant(&key, self.slot);
        }
    }
}

impl<K, V, S> fmt::Debug for MemoCache<K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MemoCache")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Barrier;
    use std::thread;

    #[rstest]
    fn test_absent_key_is_computed_once() {
        let cache: MemoCache<i32, i32> = MemoCache::new();
        let mut calls = 0;

        assert_eq!(
            cache.get_or_compute(1, || {
                calls += 1;
                10
            }),
            10
        );
        assert_eq!(cache.get_or_compute(1, || 99), 10);
        assert_eq!(calls, 1);
    }

    #[rstest]
    fn test_none_value_is_present_not_absent() {
        let cache: MemoCache<i32, Option<i32>> = MemoCache::new();

        assert_eq!(cache.get_or_compute(1, || None), None);
        assert!(cache.contains_key(&1));
        assert_eq!(cache.get(&1), Some(None));
        assert_eq!(cache.get_or_compute(1, || Some(5)), None);
    }

    #[rstest]
    fn test_panic_leaves_slot_empty() {
        let cache: MemoCache<i32, i32> = MemoCache::new();

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            cache.get_or_compute(3, || panic!("boom"));
        }));

        assert!(outcome.is_err());
        assert!(!cache.contains_key(&3));
        assert!(cache.is_empty());
        assert!(cache.slots.read().is_empty());
        assert_eq!(cache.get_or_compute(3, || 30), 30);
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn test_rejected_value_is_not_counted() {
        let cache: MemoCache<i32, i32> = MemoCache::new();
        assert_eq!(cache.get_or_compute_if(1, || -1, |value| *value >= 0), -1);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn test_repeated_failures_leave_no_slots() {
        let cache: MemoCache<u32, Result<u32, String>> = MemoCache::new();

        for key in 0..100 {
            let outcome =
                cache.get_or_compute_if(key, || Err(format!("miss {key}")), Result::is_ok);
            assert!(outcome.is_err());
        }

        assert!(cache.is_empty());
        assert!(cache.slots.read().is_empty());
        assert_eq!(cache.get_or_compute_if(7, || Ok(7), Result::is_ok), Ok(7));
        assert_eq!(cache.slots.read().len(), 1);
    }

    #[rstest]
    fn test_distinct_keys_compute_independently() {
        let cache: MemoCache<&str, usize> = MemoCache::with_capacity(4);
        assert_eq!(cache.get_or_compute("a", || 1), 1);
        assert_eq!(cache.get_or_compute("bb", || 2), 2);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"bb"), Some(2));
        assert_eq!(cache.get(&"ccc"), None);
    }

    #[rstest]
    fn test_racing_callers_compute_once() {
        let cache: Arc<MemoCache<u8, u64>> = Arc::new(MemoCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.get_or_compute(0, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::yield_now();
                        64
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 64);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

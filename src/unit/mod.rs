//! The functional unit: one generic callable replacing every
//! kind-specialized function interface.
//!
//! A [`Unit<A, R>`] takes an input tuple `A` (see [`Signature`]) and produces
//! an `R`. Its arity and slot kinds are part of its type, so invoking a unit
//! with the wrong number of inputs or the wrong kinds does not compile:
//!
//! ```compile_fail
//! use kindred::unit::Unit;
//!
//! let add = Unit::binary(|x: i32, y: i32| x + y);
//! add.invoke((1, 2, 3));
//! ```
//!
//! ```compile_fail
//! use kindred::unit::Unit;
//!
//! let is_five = Unit::unary(|x: i32| x == 5);
//! is_five.invoke((5.0_f64,));
//! ```
//!
//! Units are immutable and cheap to clone: the closure lives behind an
//! `Arc`, so a clone shares it, and every combinator builds a new unit that
//! leaves its operands usable.
//!
//! # Examples
//!
//! ```
//! use kindred::kind::Kind;
//! use kindred::unit::Unit;
//!
//! let in_range = Unit::binary(|x: i32, y: i32| x == 5 && y == 10);
//!
//! assert_eq!(in_range.arity(), 2);
//! assert_eq!(in_range.signature(), vec![Kind::Int32, Kind::Int32]);
//! assert_eq!(in_range.result_kind(), Kind::Bool);
//! assert!(in_range.invoke((5, 10)));
//! assert!(!in_range.apply(5, 11));
//! ```

mod signature;

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

pub use signature::Signature;

use crate::kind::{Kind, Slot};

type Function<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

pub(crate) type CacheHandle = Arc<dyn Any + Send + Sync>;

/// A callable with a fixed input signature `A` and result type `R`.
///
/// `A` is a tuple of [`Slot`] types for every constructor that needs to know
/// the kinds; the raw [`Unit::new`] accepts any input type.
pub struct Unit<A, R> {
    function: Function<A, R>,
    cache: Option<CacheHandle>,
}

static_assertions::assert_impl_all!(Unit<(i32,), i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Unit<(Option<String>, f64, u16), bool>: Send, Sync, Clone);

impl<A, R> Clone for Unit<A, R> {
    fn clone(&self) -> Self {
        Self {
            function: Arc::clone(&self.function),
            cache: self.cache.clone(),
        }
    }
}

impl<A, R> Unit<A, R> {
    /// Returns `true` if the unit carries a memoization cache.
    #[must_use]
    pub const fn is_memoized(&self) -> bool {
        self.cache.is_some()
    }

    #[cfg_attr(not(feature = "memo"), allow(dead_code))]
    pub(crate) const fn cache_handle(&self) -> Option<&CacheHandle> {
        self.cache.as_ref()
    }
}

impl<A, R> fmt::Debug for Unit<A, R> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Unit")
            .field("inputs", &type_name::<A>())
            .field("output", &type_name::<R>())
            .field("memoized", &self.is_memoized())
            .finish()
    }
}

impl<A: 'static, R: 'static> Unit<A, R> {
    /// Creates a unit from a closure over the whole input tuple.
    ///
    /// The closure is not checked for purity. Callers that intend to
    /// memoize the unit are responsible for its determinism.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let sum = Unit::new(|(x, y): (i64, i64)| x + y);
    /// assert_eq!(sum.invoke((2, 3)), 5);
    /// ```
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            cache: None,
        }
    }

    /// Pass-through builder: `None` means "no unit" and stays `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let missing: Option<fn((i32,)) -> i32> = None;
    /// assert!(Unit::from_option(missing).is_none());
    ///
    /// let present = Unit::from_option(Some(|(x,): (i32,)| x * 2));
    /// assert_eq!(present.map(|unit| unit.invoke((4,))), Some(8));
    /// ```
    pub fn from_option<F>(function: Option<F>) -> Option<Self>
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        function.map(Self::new)
    }

    #[cfg_attr(not(feature = "memo"), allow(dead_code))]
    pub(crate) fn with_cache<F>(function: F, cache: CacheHandle) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            function: Arc::new(function),
            cache: Some(cache),
        }
    }

    /// Evaluates the unit. This is the sole evaluation entry point; every
    /// combinator ultimately calls it.
    #[inline]
    pub fn invoke(&self, inputs: A) -> R {
        (self.function)(inputs)
    }

    /// Converts the unit into a plain closure.
    pub fn into_fn(self) -> impl Fn(A) -> R + Send + Sync + Clone + 'static {
        move |inputs| self.invoke(inputs)
    }
}

impl<A: Signature, R> Unit<A, R> {
    /// Returns the number of input slots.
    #[must_use]
    pub const fn arity(&self) -> usize {
        A::ARITY
    }

    /// Returns the kinds of the input slots in declaration order.
    #[must_use]
    pub fn signature(&self) -> Vec<Kind> {
        A::kinds()
    }
}

impl<A, R: Slot> Unit<A, R> {
    /// Returns the kind of the result slot.
    #[must_use]
    pub const fn result_kind(&self) -> Kind {
        R::KIND
    }
}

impl<A: 'static, R: Clone + Send + Sync + 'static> Unit<A, R> {
    /// Creates a unit that ignores its inputs and returns `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let seven: Unit<(bool, i8), i64> = Unit::constant(7);
    /// assert_eq!(seven.invoke((true, 1)), 7);
    /// ```
    pub fn constant(value: R) -> Self {
        Self::new(move |_| value.clone())
    }
}

impl<A: 'static> Unit<A, bool> {
    /// A predicate that holds for every input.
    pub fn always_true() -> Self {
        Self::new(|_| true)
    }

    /// A predicate that holds for no input.
    pub fn always_false() -> Self {
        Self::new(|_| false)
    }
}

impl<A: Signature> Unit<A, bool> {
    /// A predicate that holds when every input equals the matching target
    /// under its kind's equality rule.
    ///
    /// A null target matches exactly a null input.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let is_origin = Unit::equal_to((0_i32, None::<String>));
    ///
    /// assert!(is_origin.invoke((0, None)));
    /// assert!(!is_origin.invoke((0, Some(String::new()))));
    /// assert!(!is_origin.invoke((1, None)));
    /// ```
    pub fn equal_to(targets: A) -> Self {
        let expected = targets.key();
        Self::new(move |inputs: A| inputs.key() == expected)
    }
}

impl<A1: 'static, R: 'static> Unit<(A1,), R> {
    /// Creates a unit of arity 1 from a positional closure.
    pub fn unary<F>(function: F) -> Self
    where
        F: Fn(A1) -> R + Send + Sync + 'static,
    {
        Self::new(move |(first,)| function(first))
    }

    /// Invokes the unit with positional arguments.
    #[inline]
    pub fn apply(&self, first: A1) -> R {
        self.invoke((first,))
    }
}

impl<A1: 'static, A2: 'static, R: 'static> Unit<(A1, A2), R> {
    /// Creates a unit of arity 2 from a positional closure.
    pub fn binary<F>(function: F) -> Self
    where
        F: Fn(A1, A2) -> R + Send + Sync + 'static,
    {
        Self::new(move |(first, second)| function(first, second))
    }

    /// Invokes the unit with positional arguments.
    #[inline]
    pub fn apply(&self, first: A1, second: A2) -> R {
        self.invoke((first, second))
    }
}

impl<A1: 'static, A2: 'static, A3: 'static, R: 'static> Unit<(A1, A2, A3), R> {
    /// Creates a unit of arity 3 from a positional closure.
    pub fn ternary<F>(function: F) -> Self
    where
        F: Fn(A1, A2, A3) -> R + Send + Sync + 'static,
    {
        Self::new(move |(first, second, third)| function(first, second, third))
    }

    /// Invokes the unit with positional arguments.
    #[inline]
    pub fn apply(&self, first: A1, second: A2, third: A3) -> R {
        self.invoke((first, second, third))
    }
}

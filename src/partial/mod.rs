//! Partial application engine: fixing input slots to reduce arity.
//!
//! Partial application fixes some inputs of a unit, producing a unit that
//! takes only the remaining ones:
//!
//! ```text
//! f.fix_prefix((a,))(b, c) = f(a, b, c)
//! f.fix_suffix((c,))(a, b) = f(a, b, c)
//! f.fix_middle(b)(a, c)    = f(a, b, c)
//! ```
//!
//! The original unit always sees its inputs in declaration order. Fixing
//! never evaluates anything: the original unit runs only when the reduced
//! unit is invoked, and fixed values are cloned for every invocation.
//!
//! Fixing every slot is not a partial application and does not compile:
//!
//! ```compile_fail
//! use kindred::unit::Unit;
//!
//! let add = Unit::binary(|x: i32, y: i32| x + y);
//! let thunk = add.fix_prefix((1, 2));
//! ```
//!
//! # Examples
//!
//! ```
//! use kindred::unit::Unit;
//!
//! let clamp = Unit::ternary(|low: i32, high: i32, value: i32| value.clamp(low, high));
//! let percent = clamp.fix_prefix((0, 100));
//!
//! assert_eq!(percent.apply(140), 100);
//! assert_eq!(percent.apply(-3), 0);
//! assert_eq!(percent.arity(), 1);
//! ```

use crate::unit::Unit;

/// Splits an input tuple into a fixed leading part `P` and the rest.
///
/// Implemented for every proper, non-empty prefix of the supported tuples.
pub trait SplitPrefix<P>: Sized + 'static {
    /// The inputs left after the prefix is fixed.
    type Rest: 'static;

    /// Rebuilds the full input tuple, prefix first.
    fn join(prefix: P, rest: Self::Rest) -> Self;
}

/// Splits an input tuple into the rest and a fixed trailing part `S`.
///
/// Implemented for every proper, non-empty suffix of the supported tuples.
pub trait SplitSuffix<S>: Sized + 'static {
    /// The inputs left after the suffix is fixed.
    type Rest: 'static;

    /// Rebuilds the full input tuple, suffix last.
    fn join(rest: Self::Rest, suffix: S) -> Self;
}

impl<A1: 'static, A2: 'static> SplitPrefix<(A1,)> for (A1, A2) {
    type Rest = (A2,);

    #[inline]
    fn join((first,): (A1,), (second,): (A2,)) -> Self {
        (first, second)
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> SplitPrefix<(A1,)> for (A1, A2, A3) {
    type Rest = (A2, A3);

    #[inline]
    fn join((first,): (A1,), (second, third): (A2, A3)) -> Self {
        (first, second, third)
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> SplitPrefix<(A1, A2)> for (A1, A2, A3) {
    type Rest = (A3,);

    #[inline]
    fn join((first, second): (A1, A2), (third,): (A3,)) -> Self {
        (first, second, third)
    }
}

impl<A1: 'static, A2: 'static> SplitSuffix<(A2,)> for (A1, A2) {
    type Rest = (A1,);

    #[inline]
    fn join((first,): (A1,), (second,): (A2,)) -> Self {
        (first, second)
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> SplitSuffix<(A3,)> for (A1, A2, A3) {
    type Rest = (A1, A2);

    #[inline]
    fn join((first, second): (A1, A2), (third,): (A3,)) -> Self {
        (first, second, third)
    }
}

impl<A1: 'static, A2: 'static, A3: 'static> SplitSuffix<(A2, A3)> for (A1, A2, A3) {
    type Rest = (A1,);

    #[inline]
    fn join((first,): (A1,), (second, third): (A2, A3)) -> Self {
        (first, second, third)
    }
}

impl<A: 'static, R: 'static> Unit<A, R> {
    /// Fixes the leading inputs, returning a unit over the remaining ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let greet = Unit::binary(|greeting: String, name: String| format!("{greeting}, {name}"));
    /// let hello = greet.fix_prefix((String::from("Hello"),));
    /// assert_eq!(hello.apply(String::from("Ada")), "Hello, Ada");
    /// ```
    pub fn fix_prefix<P>(&self, prefix: P) -> Unit<<A as SplitPrefix<P>>::Rest, R>
    where
        A: SplitPrefix<P>,
        P: Clone + Send + Sync + 'static,
    {
        let original = self.clone();
        Unit::new(move |rest| {
            original.invoke(<A as SplitPrefix<P>>::join(prefix.clone(), rest))
        })
    }

    /// Fixes the trailing inputs, returning a unit over the leading ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let divide = Unit::binary(|numerator: f64, denominator: f64| numerator / denominator);
    /// let half = divide.fix_suffix((2.0,));
    /// assert_eq!(half.apply(10.0), 5.0);
    /// ```
    pub fn fix_suffix<S>(&self, suffix: S) -> Unit<<A as SplitSuffix<S>>::Rest, R>
    where
        A: SplitSuffix<S>,
        S: Clone + Send + Sync + 'static,
    {
        let original = self.clone();
        Unit::new(move |rest| {
            original.invoke(<A as SplitSuffix<S>>::join(rest, suffix.clone()))
        })
    }
}

impl<A1, A2, A3, R> Unit<(A1, A2, A3), R>
where
    A1: 'static,
    A2: Clone + Send + Sync + 'static,
    A3: 'static,
    R: 'static,
{
    /// Fixes the second input of a ternary unit.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let between = Unit::ternary(|low: i32, value: i32, high: i32| low <= value && value <= high);
    /// let brackets_five = between.fix_middle(5);
    /// assert!(brackets_five.apply(1, 9));
    /// assert!(!brackets_five.apply(6, 9));
    /// ```
    pub fn fix_middle(&self, second: A2) -> Unit<(A1, A3), R> {
        let original = self.clone();
        Unit::new(move |(first, third)| original.invoke((first, second.clone(), third)))
    }
}

impl<A1, A2, A3, R> Unit<(A1, A2, A3), R>
where
    A1: Clone + Send + Sync + 'static,
    A2: 'static,
    A3: Clone + Send + Sync + 'static,
    R: 'static,
{
    /// Fixes the first and third inputs of a ternary unit.
    pub fn fix_ends(&self, first: A1, third: A3) -> Unit<(A2,), R> {
        let original = self.clone();
        Unit::new(move |(second,)| original.invoke((first.clone(), second, third.clone())))
    }
}

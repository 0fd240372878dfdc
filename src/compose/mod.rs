//! Composition engine: building new units out of existing ones.
//!
//! # Overview
//!
//! - [`Unit::compose`]: pre-composition. Each input is mapped through an
//!   adapter before the original unit runs.
//! - [`Unit::and_then`] / [`Unit::map`]: post-composition. The result is
//!   mapped through an adapter after the original unit runs.
//! - [`Unit::negate`], [`Unit::and`], [`Unit::or`], [`Unit::xor`]: boolean
//!   combinators for predicates.
//!
//! A composed unit owns clones of its operands. The operands stay usable and
//! are never affected by the composition. Anything raised by an operand
//! propagates unchanged to the caller of the composed unit.
//!
//! # Mathematical Background
//!
//! Given `f: (A1, A2) -> R` and adapters `g1: X1 -> A1`, `g2: X2 -> A2`,
//! pre-composition yields
//!
//! ```text
//! f.compose((g1, g2))(x1, x2) = f(g1(x1), g2(x2))
//! ```
//!
//! and post-composition with `h: R -> S` yields
//!
//! ```text
//! f.and_then(h)(a1, a2) = h(f(a1, a2))
//! ```
//!
//! # Laws
//!
//! - **Right Identity**: `f.and_then(identity) == f`
//! - **Left Identity**: `f.compose(identity) == f`
//! - **Associativity**: `f.and_then(g).and_then(h) == f.and_then(g.and_then(h))`
//! - **Double Negation**: `p.negate().negate() == p`
//!
//! # Examples
//!
//! ```
//! use kindred::unit::Unit;
//!
//! let area = Unit::binary(|width: i64, height: i64| width * height);
//! let parse = Unit::unary(|text: String| text.trim().parse::<i64>().unwrap_or(0));
//! let describe = Unit::unary(|value: i64| format!("{value} m2"));
//!
//! let from_text = area.compose((parse.clone(), parse)).and_then(describe);
//! assert_eq!(from_text.apply(" 3".into(), "4 ".into()), "12 m2");
//! ```

mod boolean;

use crate::unit::Unit;

/// The identity unit of arity 1: returns its input unchanged.
///
/// The unit element of [`Unit::and_then`] and [`Unit::compose`].
///
/// # Examples
///
/// ```
/// use kindred::compose::identity;
///
/// assert_eq!(identity::<i32>().apply(7), 7);
/// ```
pub fn identity<T: 'static>() -> Unit<(T,), T> {
    Unit::unary(|value| value)
}

/// Adapters for pre-composing a unit with input signature `A`.
///
/// Implemented for a bare `Unit<(X1,), A1>` (targeting arity 1) and for
/// tuples of arity-1 units whose results line up with `A`.
pub trait Adapters<A>: Send + Sync + 'static {
    /// The input signature of the composed unit.
    type Inputs: 'static;

    /// Maps the composed unit's inputs to the original unit's inputs.
    fn adapt(&self, inputs: Self::Inputs) -> A;
}

impl<X1: 'static, A1: 'static> Adapters<(A1,)> for Unit<(X1,), A1> {
    type Inputs = (X1,);

    #[inline]
    fn adapt(&self, inputs: (X1,)) -> (A1,) {
        (self.invoke(inputs),)
    }
}

macro_rules! tuple_adapters {
    ($(($input:ident, $slot:ident, $index:tt)),+) => {
        impl<$($input: 'static, $slot: 'static),+> Adapters<($($slot,)+)> for ($(Unit<($input,), $slot>,)+) {
            type Inputs = ($($input,)+);

            #[inline]
            fn adapt(&self, inputs: Self::Inputs) -> ($($slot,)+) {
                ($(self.$index.invoke((inputs.$index,)),)+)
            }
        }
    };
}

tuple_adapters!((X1, A1, 0));
tuple_adapters!((X1, A1, 0), (X2, A2, 1));
tuple_adapters!((X1, A1, 0), (X2, A2, 1), (X3, A3, 2));

impl<A: 'static, R: 'static> Unit<A, R> {
    /// Pre-composition: adapts each input before invoking this unit.
    ///
    /// The composed unit's signature is the adapters' input signature. Every
    /// adapter runs, in slot order, before this unit is invoked.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let is_adult = Unit::unary(|age: i32| age >= 18);
    /// let age_of = Unit::unary(|birth_year: i64| (2024 - birth_year) as i32);
    ///
    /// let born_adult = is_adult.compose(age_of);
    /// assert!(born_adult.apply(1990));
    /// assert!(!born_adult.apply(2015));
    /// ```
    pub fn compose<Ad>(&self, adapters: Ad) -> Unit<Ad::Inputs, R>
    where
        Ad: Adapters<A>,
    {
        let original = self.clone();
        Unit::new(move |inputs| original.invoke(adapters.adapt(inputs)))
    }

    /// Post-composition: feeds this unit's result into `after`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let sum = Unit::binary(|x: i32, y: i32| x + y);
    /// let is_even = Unit::unary(|value: i32| value % 2 == 0);
    ///
    /// assert!(sum.and_then(is_even).apply(3, 5));
    /// ```
    pub fn and_then<S: 'static>(&self, after: Unit<(R,), S>) -> Unit<A, S> {
        let original = self.clone();
        Unit::new(move |inputs| after.invoke((original.invoke(inputs),)))
    }

    /// Post-composition with a plain closure.
    pub fn map<S, F>(&self, function: F) -> Unit<A, S>
    where
        S: 'static,
        F: Fn(R) -> S + Send + Sync + 'static,
    {
        let original = self.clone();
        Unit::new(move |inputs| function(original.invoke(inputs)))
    }
}

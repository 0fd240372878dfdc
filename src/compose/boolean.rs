//! Boolean combinators for predicate units.
//!
//! `and` and `or` short-circuit exactly like `&&` and `||`: the right-hand
//! unit is not invoked once the left-hand result decides the outcome.
//! `xor` cannot short-circuit and always invokes both units, left first.

use std::ops::Not;

use crate::unit::Unit;

impl<A: 'static> Unit<A, bool> {
    /// Logical NOT of the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let is_empty = Unit::unary(|text: String| text.is_empty());
    /// assert!(is_empty.negate().apply(String::from("x")));
    /// ```
    pub fn negate(&self) -> Self {
        let original = self.clone();
        Self::new(move |inputs| !original.invoke(inputs))
    }
}

impl<A: Clone + 'static> Unit<A, bool> {
    /// Short-circuiting conjunction: `other` runs only if `self` holds.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::unit::Unit;
    ///
    /// let positive = Unit::unary(|x: i32| x > 0);
    /// let even = Unit::unary(|x: i32| x % 2 == 0);
    ///
    /// let positive_even = positive.and(&even);
    /// assert!(positive_even.apply(4));
    /// assert!(!positive_even.apply(-4));
    /// ```
    pub fn and(&self, other: &Self) -> Self {
        let left = self.clone();
        let right = other.clone();
        Self::new(move |inputs: A| left.invoke(inputs.clone()) && right.invoke(inputs))
    }

    /// Short-circuiting disjunction: `other` runs only if `self` fails.
    pub fn or(&self, other: &Self) -> Self {
        let left = self.clone();
        let right = other.clone();
        Self::new(move |inputs: A| left.invoke(inputs.clone()) || right.invoke(inputs))
    }

    /// Exclusive or. Both units are always invoked, `self` first.
    pub fn xor(&self, other: &Self) -> Self {
        let left = self.clone();
        let right = other.clone();
        Self::new(move |inputs: A| {
            let left_result = left.invoke(inputs.clone());
            let right_result = right.invoke(inputs);
            left_result ^ right_result
        })
    }
}

impl<A: 'static> Not for Unit<A, bool> {
    type Output = Self;

    fn not(self) -> Self {
        self.negate()
    }
}

impl<A: 'static> Not for &Unit<A, bool> {
    type Output = Unit<A, bool>;

    fn not(self) -> Unit<A, bool> {
        self.negate()
    }
}

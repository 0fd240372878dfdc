#![cfg(feature = "partial")]
//! Property-based tests for partial application.
//!
//! ## Equivalence Laws
//! - **Prefix**: `f.fix_prefix((x, y))(z) == f(x, y, z)`
//! - **Suffix**: `f.fix_suffix((y, z))(x) == f(x, y, z)`
//! - **Middle**: `f.fix_middle(y)(x, z) == f(x, y, z)`
//! - **Stepwise**: `f.fix_prefix((x,)).fix_prefix((y,)) == f.fix_prefix((x, y))`

use kindred::unit::Unit;
use proptest::prelude::*;

fn weighted() -> Unit<(i64, i64, i64), i64> {
    Unit::ternary(|x: i64, y: i64, z: i64| {
        x.wrapping_mul(31).wrapping_add(y.wrapping_mul(7)).wrapping_sub(z)
    })
}

proptest! {
    /// Prefix Law: f.fix_prefix((x, y))(z) == f(x, y, z)
    #[test]
    fn prop_fix_prefix_equivalence(x in any::<i64>(), y in any::<i64>(), z in any::<i64>()) {
        let function = weighted();

        prop_assert_eq!(function.fix_prefix((x, y)).apply(z), function.apply(x, y, z));
    }

    /// Suffix Law: f.fix_suffix((y, z))(x) == f(x, y, z)
    #[test]
    fn prop_fix_suffix_equivalence(x in any::<i64>(), y in any::<i64>(), z in any::<i64>()) {
        let function = weighted();

        prop_assert_eq!(function.fix_suffix((y, z)).apply(x), function.apply(x, y, z));
    }

    /// Middle Law: f.fix_middle(y)(x, z) == f(x, y, z)
    #[test]
    fn prop_fix_middle_equivalence(x in any::<i64>(), y in any::<i64>(), z in any::<i64>()) {
        let function = weighted();

        prop_assert_eq!(function.fix_middle(y).apply(x, z), function.apply(x, y, z));
    }

    /// Stepwise Law: fixing one slot at a time equals fixing both at once.
    #[test]
    fn prop_fix_prefix_stepwise(x in any::<i64>(), y in any::<i64>(), z in any::<i64>()) {
        let function = weighted();

        let stepwise = function.fix_prefix((x,)).fix_prefix((y,));
        let at_once = function.fix_prefix((x, y));

        prop_assert_eq!(stepwise.apply(z), at_once.apply(z));
    }

    /// Fixed reference values are not consumed by an invocation.
    #[test]
    fn prop_fixed_strings_survive_repeated_calls(prefix in "[a-z]{0,8}", suffix in "[a-z]{0,8}") {
        let concat = Unit::binary(|head: String, tail: String| head + &tail);
        let reduced = concat.fix_prefix((prefix.clone(),));

        prop_assert_eq!(reduced.apply(suffix.clone()), format!("{prefix}{suffix}"));
        prop_assert_eq!(reduced.apply(suffix.clone()), format!("{prefix}{suffix}"));
    }
}

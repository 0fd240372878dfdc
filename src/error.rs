//! Error types shared by every engine.
//!
//! Only programming errors are represented here. A failure raised by the
//! closure inside a unit is never wrapped: typed units carry it in their
//! result type (`Unit<A, Result<T, E>>`) and panics unwind untouched.

use std::borrow::Cow;

use thiserror::Error;

use crate::kind::Kind;

/// An error raised while building or invoking a functional unit.
///
/// # Examples
///
/// ```
/// use kindred::error::UnitError;
///
/// let error = UnitError::ArityMismatch { expected: 2, actual: 3 };
/// assert_eq!(error.to_string(), "arity mismatch: expected 2 inputs, got 3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnitError {
    /// A builder was handed an absent or incompatible unit. Raised before
    /// anything is constructed.
    #[error("invalid construction: {reason}")]
    InvalidConstruction {
        /// What was wrong with the builder arguments.
        reason: Cow<'static, str>,
    },

    /// A unit was invoked with the wrong number of inputs.
    #[error("arity mismatch: expected {expected} inputs, got {actual}")]
    ArityMismatch {
        /// The arity the unit was declared with.
        expected: usize,
        /// The number of inputs supplied.
        actual: usize,
    },

    /// An input slot held a value its declared kind does not accept.
    #[error("kind mismatch at slot {position}: expected {expected}, got {actual}")]
    KindMismatch {
        /// Zero-based slot position.
        position: usize,
        /// The kind declared in the signature.
        expected: Kind,
        /// The kind of the supplied value.
        actual: Kind,
    },

    /// A closure produced a value its declared result kind does not accept.
    #[error("result kind mismatch: declared {declared}, produced {actual}")]
    ResultKindMismatch {
        /// The declared result kind.
        declared: Kind,
        /// The kind of the produced value.
        actual: Kind,
    },
}

impl UnitError {
    /// Creates an [`UnitError::InvalidConstruction`] with the given reason.
    #[must_use]
    pub fn invalid(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidConstruction {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_invalid_construction_display() {
        let error = UnitError::invalid("adapter 1 is absent");
        assert_eq!(
            error.to_string(),
            "invalid construction: adapter 1 is absent"
        );
    }

    #[rstest]
    fn test_kind_mismatch_display() {
        let error = UnitError::KindMismatch {
            position: 0,
            expected: Kind::Int32,
            actual: Kind::Float64,
        };
        assert_eq!(
            error.to_string(),
            "kind mismatch at slot 0: expected Int32, got Float64"
        );
    }
}

//! Input signatures: tuples of slot types.

use std::fmt;
use std::hash::Hash;

use smallvec::smallvec;

use crate::error::UnitError;
use crate::kind::{Kind, Slot, Value, Values};

/// The ordered input slots of a unit, expressed as a tuple of [`Slot`]
/// types.
///
/// Implemented for `(A1,)`, `(A1, A2)` and `(A1, A2, A3)`. The arity is an
/// associated constant, so it never depends on runtime state.
///
/// # Examples
///
/// ```
/// use kindred::kind::Kind;
/// use kindred::unit::Signature;
///
/// type Inputs = (i32, Option<String>, f64);
///
/// assert_eq!(Inputs::ARITY, 3);
/// assert_eq!(
///     Inputs::kinds(),
///     vec![Kind::Int32, Kind::Reference { nullable: true }, Kind::Float64]
/// );
/// ```
pub trait Signature: Clone + fmt::Debug + Send + Sync + 'static {
    /// The number of input slots.
    const ARITY: usize;

    /// Tuple of the slots' keys, used to identify an input tuple.
    type Key: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static;

    /// Returns the kinds of the input slots in declaration order.
    fn kinds() -> Vec<Kind>;

    /// Returns the key of this input tuple.
    fn key(&self) -> Self::Key;

    /// Converts the tuple into dynamically-kinded values.
    fn into_values(self) -> Values;

    /// Rebuilds the tuple from dynamically-kinded values.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::ArityMismatch`] if `values` has the wrong length
    /// and [`UnitError::KindMismatch`] for the first value that cannot be
    /// read as its slot type.
    fn from_values(values: &[Value]) -> Result<Self, UnitError>;
}

fn read_slot<T: Slot>(values: &[Value], position: usize) -> Result<T, UnitError> {
    let value = &values[position];
    T::from_value(value).ok_or_else(|| UnitError::KindMismatch {
        position,
        expected: T::KIND,
        actual: value.kind(),
    })
}

macro_rules! tuple_signature {
    ($arity:literal; $($slot:ident $index:tt),+) => {
        impl<$($slot: Slot),+> Signature for ($($slot,)+) {
            const ARITY: usize = $arity;

            type Key = ($(<$slot as Slot>::Key,)+);

            fn kinds() -> Vec<Kind> {
                vec![$(<$slot as Slot>::KIND),+]
            }

            #[inline]
            fn key(&self) -> Self::Key {
                ($(self.$index.slot_key(),)+)
            }

            fn into_values(self) -> Values {
                smallvec![$(self.$index.into_value()),+]
            }

            fn from_values(values: &[Value]) -> Result<Self, UnitError> {
                if values.len() != $arity {
                    return Err(UnitError::ArityMismatch {
                        expected: $arity,
                        actual: values.len(),
                    });
                }
                Ok(($(read_slot::<$slot>(values, $index)?,)+))
            }
        }
    };
}

tuple_signature!(1; A1 0);
tuple_signature!(2; A1 0, A2 1);
tuple_signature!(3; A1 0, A2 1, A3 2);

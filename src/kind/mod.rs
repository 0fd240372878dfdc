//! Kind descriptors and slot values.
//!
//! A [`Kind`] names the shape of a value held by a slot: either a reference
//! (optionally nullable) or one of the fixed-width primitive kinds. The
//! [`Slot`] trait ties a Rust type to its kind together with the equality
//! and hashing strategy used whenever slot values are compared, most notably
//! as memoization keys.
//!
//! # Kinds and their Rust types
//!
//! | Kind                           | Rust types                                              |
//! |--------------------------------|---------------------------------------------------------|
//! | `Bool`                         | `bool`                                                  |
//! | `Int8` .. `Int64`              | `i8`, `i16`, `i32`, `i64`                               |
//! | `Float32`, `Float64`           | `f32`, `f64` (keyed by canonical bit pattern)           |
//! | `Char16`                       | `u16`                                                   |
//! | `Reference { nullable: false }`| `String`, `&'static str`, `Box<str>`, `Arc<str>`, [`Ref<T>`], [`Identity<T>`] |
//! | `Reference { nullable: true }` | `Option<T>` for any slot type `T`                       |
//!
//! # Examples
//!
//! ```
//! use kindred::kind::{Kind, Slot};
//!
//! assert_eq!(i32::KIND, Kind::Int32);
//! assert_eq!(<Option<String>>::KIND, Kind::Reference { nullable: true });
//!
//! // NaN is a single key, so memoized floats behave like value equality.
//! assert_eq!(f64::NAN.slot_key(), (0.0_f64 / 0.0).slot_key());
//! assert_ne!(0.0_f64.slot_key(), (-0.0_f64).slot_key());
//! ```

mod slots;
mod value;

use std::fmt;
use std::hash::Hash;

pub use slots::{Identity, IdentityKey, Ref};
pub use value::{Reference, Value, Values};

/// The shape of a value held by a slot.
///
/// Primitive kinds never hold null. Reference kinds carry a flag telling
/// whether null is a legal value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// A reference value compared structurally (or by identity).
    Reference {
        /// Whether the slot may hold null.
        nullable: bool,
    },
    /// A boolean.
    Bool,
    /// An 8-bit signed integer.
    Int8,
    /// A 16-bit signed integer.
    Int16,
    /// A 32-bit signed integer.
    Int32,
    /// A 64-bit signed integer.
    Int64,
    /// A 32-bit float.
    Float32,
    /// A 64-bit float.
    Float64,
    /// A 16-bit unsigned code unit.
    Char16,
}

impl Kind {
    /// Returns `true` for every kind except references.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        !self.is_reference()
    }

    /// Returns `true` for reference kinds, nullable or not.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Reference { .. })
    }

    /// Returns `true` if a slot of this kind may hold null.
    #[must_use]
    pub const fn permits_null(self) -> bool {
        matches!(self, Self::Reference { nullable: true })
    }

    /// Returns the display name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Reference { nullable: false } => "Reference",
            Self::Reference { nullable: true } => "Reference?",
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Char16 => "Char16",
        }
    }

    /// Returns `true` if a slot declared with this kind accepts a value of
    /// kind `actual`.
    ///
    /// A nullable reference slot accepts any reference, null included. A
    /// non-null reference slot rejects null. Primitive kinds require an
    /// exact match.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::kind::Kind;
    ///
    /// let nullable = Kind::Reference { nullable: true };
    /// let non_null = Kind::Reference { nullable: false };
    ///
    /// assert!(nullable.accepts(non_null));
    /// assert!(!non_null.accepts(nullable));
    /// assert!(!Kind::Int32.accepts(Kind::Int64));
    /// ```
    #[must_use]
    pub const fn accepts(self, actual: Self) -> bool {
        match (self, actual) {
            (Self::Reference { nullable: true }, Self::Reference { .. }) => true,
            (Self::Reference { nullable: false }, Self::Reference { nullable }) => !nullable,
            (Self::Bool, Self::Bool)
            | (Self::Int8, Self::Int8)
            | (Self::Int16, Self::Int16)
            | (Self::Int32, Self::Int32)
            | (Self::Int64, Self::Int64)
            | (Self::Float32, Self::Float32)
            | (Self::Float64, Self::Float64)
            | (Self::Char16, Self::Char16) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// A Rust type usable as an input or output slot of a functional unit.
///
/// The associated [`Key`](Slot::Key) is the explicit equality and hashing
/// strategy for the kind: primitives key on their raw value (floats on a
/// canonical bit pattern), references on whatever `Eq + Hash` the type
/// provides, nullable references on `Option` of the inner key so that null
/// is a distinguished key of its own.
pub trait Slot: Clone + fmt::Debug + Send + Sync + 'static {
    /// The kind of this slot type.
    const KIND: Kind;

    /// The key used for equality and hashing of slot values.
    type Key: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static;

    /// Returns the key of this value.
    fn slot_key(&self) -> Self::Key;

    /// Converts the value into a dynamically-kinded [`Value`].
    fn into_value(self) -> Value;

    /// Recovers a typed value from a [`Value`], or `None` if the value holds
    /// a different kind or reference type.
    fn from_value(value: &Value) -> Option<Self>;

    /// Compares two values under the kind's equality rule.
    #[inline]
    fn slot_eq(&self, other: &Self) -> bool {
        self.slot_key() == other.slot_key()
    }
}

/// Declares `Eq + Hash` types as non-null reference slots.
///
/// The types must also be `Clone + Debug + Send + Sync + 'static`.
///
/// # Examples
///
/// ```
/// use kindred::kind::{Kind, Slot};
/// use kindred::reference_slot;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// struct AccountId(u64);
///
/// reference_slot!(AccountId);
///
/// assert_eq!(AccountId::KIND, Kind::Reference { nullable: false });
/// assert!(AccountId(7).slot_eq(&AccountId(7)));
/// ```
#[macro_export]
macro_rules! reference_slot {
    ($($reference_type:ty),+ $(,)?) => {
        $(
            impl $crate::kind::Slot for $reference_type {
                const KIND: $crate::kind::Kind = $crate::kind::Kind::Reference { nullable: false };

                type Key = $reference_type;

                #[inline]
                fn slot_key(&self) -> Self::Key {
                    ::std::clone::Clone::clone(self)
                }

                fn into_value(self) -> $crate::kind::Value {
                    $crate::kind::Value::Reference($crate::kind::Reference::new(self))
                }

                fn from_value(value: &$crate::kind::Value) -> ::std::option::Option<Self> {
                    value
                        .as_reference()?
                        .downcast_ref::<$reference_type>()
                        .cloned()
                }
            }
        )+
    };
}

//! Dynamically-kinded slot values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use super::slots::{canonical_f32_bits, canonical_f64_bits};
use super::{Kind, Slot};

/// Argument vector of a dynamically invoked unit. Inline up to arity 3.
pub type Values = SmallVec<[Value; 3]>;

trait ErasedSlot: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn erased_eq(&self, other: &dyn ErasedSlot) -> bool;
    fn erased_hash(&self, state: &mut dyn Hasher);
    fn type_name(&self) -> &'static str;
    fn erased_fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result;
}

struct Keyed<T>(T);

impl<T: Slot> ErasedSlot for Keyed<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn erased_eq(&self, other: &dyn ErasedSlot) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self.0.slot_eq(other))
    }

    fn erased_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.0.slot_key().hash(&mut state);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn erased_fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, formatter)
    }
}

/// A non-null reference payload with its Rust type erased.
///
/// Equality and hashing delegate to the original type's [`Slot::Key`], so
/// two references are equal exactly when they hold the same Rust type and
/// equal keys.
///
/// # Examples
///
/// ```
/// use kindred::kind::Reference;
///
/// let first = Reference::new(String::from("apple"));
/// let second = Reference::new(String::from("apple"));
///
/// assert_eq!(first, second);
/// assert_eq!(first.downcast_ref::<String>().map(String::as_str), Some("apple"));
/// assert!(first.downcast_ref::<i32>().is_none());
/// ```
#[derive(Clone)]
pub struct Reference(Arc<dyn ErasedSlot>);

impl Reference {
    /// Erases a slot value into a reference payload.
    pub fn new<T: Slot>(value: T) -> Self {
        Self(Arc::new(Keyed(value)))
    }

    /// Returns the payload if it holds a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the payload holds a `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Returns the Rust type name of the payload.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.erased_eq(other.0.as_ref())
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.erased_hash(state);
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.erased_fmt(formatter)
    }
}

/// A slot value whose kind is known only at runtime.
///
/// `Value` follows the same per-kind equality as [`Slot::Key`]: floats
/// compare by canonical bit pattern, references through their original
/// key, and `Null` equals only `Null`.
#[derive(Clone, Debug)]
pub enum Value {
    /// The null reference.
    Null,
    /// A non-null reference.
    Reference(Reference),
    /// A boolean.
    Bool(bool),
    /// An 8-bit signed integer.
    Int8(i8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 64-bit signed integer.
    Int64(i64),
    /// A 32-bit float.
    Float32(f32),
    /// A 64-bit float.
    Float64(f64),
    /// A 16-bit unsigned code unit.
    Char16(u16),
}

macro_rules! primitive_accessors {
    ($($variant:ident => $name:ident : $primitive:ty),+ $(,)?) => {
        paste::paste! {
            $(
                #[doc = concat!("Returns the `", stringify!($primitive), "` held by a `", stringify!($variant), "` value.")]
                #[must_use]
                pub const fn [<as_ $name>](&self) -> Option<$primitive> {
                    match self {
                        Self::$variant(value) => Some(*value),
                        _ => None,
                    }
                }
            )+
        }
    };
}

impl Value {
    /// Converts any slot value into a `Value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::kind::{Kind, Value};
    ///
    /// assert_eq!(Value::of(5_i32), Value::Int32(5));
    /// assert_eq!(Value::of(None::<String>), Value::Null);
    /// assert_eq!(Value::of(String::from("x")).kind(), Kind::Reference { nullable: false });
    /// ```
    pub fn of<T: Slot>(value: T) -> Self {
        value.into_value()
    }

    /// Returns the kind of this value. `Null` reports a nullable reference.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Reference { nullable: true },
            Self::Reference(_) => Kind::Reference { nullable: false },
            Self::Bool(_) => Kind::Bool,
            Self::Int8(_) => Kind::Int8,
            Self::Int16(_) => Kind::Int16,
            Self::Int32(_) => Kind::Int32,
            Self::Int64(_) => Kind::Int64,
            Self::Float32(_) => Kind::Float32,
            Self::Float64(_) => Kind::Float64,
            Self::Char16(_) => Kind::Char16,
        }
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the reference payload, or `None` for null and primitives.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Recovers a typed slot value.
    #[must_use]
    pub fn get<T: Slot>(&self) -> Option<T> {
        T::from_value(self)
    }

    primitive_accessors! {
        Bool => bool: bool,
        Int8 => i8: i8,
        Int16 => i16: i16,
        Int32 => i32: i32,
        Int64 => i64: i64,
        Float32 => f32: f32,
        Float64 => f64: f64,
        Char16 => char16: u16,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Reference(left), Self::Reference(right)) => left == right,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Int8(left), Self::Int8(right)) => left == right,
            (Self::Int16(left), Self::Int16(right)) => left == right,
            (Self::Int32(left), Self::Int32(right)) => left == right,
            (Self::Int64(left), Self::Int64(right)) => left == right,
            (Self::Float32(left), Self::Float32(right)) => {
                canonical_f32_bits(*left) == canonical_f32_bits(*right)
            }
            (Self::Float64(left), Self::Float64(right)) => {
                canonical_f64_bits(*left) == canonical_f64_bits(*right)
            }
            (Self::Char16(left), Self::Char16(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Reference(reference) => reference.hash(state),
            Self::Bool(value) => value.hash(state),
            Self::Int8(value) => value.hash(state),
            Self::Int16(value) => value.hash(state),
            Self::Int32(value) => value.hash(state),
            Self::Int64(value) => value.hash(state),
            Self::Float32(value) => canonical_f32_bits(*value).hash(state),
            Self::Float64(value) => canonical_f64_bits(*value).hash(state),
            Self::Char16(value) => value.hash(state),
        }
    }
}

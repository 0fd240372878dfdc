//! `Slot` implementations for primitives, references, and nullable references.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Kind, Reference, Slot, Value};

pub(crate) fn canonical_f32_bits(value: f32) -> u32 {
    if value.is_nan() {
        f32::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

pub(crate) fn canonical_f64_bits(value: f64) -> u64 {
    if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

macro_rules! primitive_slot {
    ($primitive:ty, $kind:ident, $key:ty, |$value:ident| $key_expression:expr) => {
        impl Slot for $primitive {
            const KIND: Kind = Kind::$kind;

            type Key = $key;

            #[inline]
            fn slot_key(&self) -> Self::Key {
                let $value = *self;
                $key_expression
            }

            #[inline]
            fn into_value(self) -> Value {
                Value::$kind(self)
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$kind(inner) => Some(*inner),
                    _ => None,
                }
            }
        }
    };
}

primitive_slot!(bool, Bool, bool, |value| value);
primitive_slot!(i8, Int8, i8, |value| value);
primitive_slot!(i16, Int16, i16, |value| value);
primitive_slot!(i32, Int32, i32, |value| value);
primitive_slot!(i64, Int64, i64, |value| value);
primitive_slot!(f32, Float32, u32, |value| canonical_f32_bits(value));
primitive_slot!(f64, Float64, u64, |value| canonical_f64_bits(value));
primitive_slot!(u16, Char16, u16, |value| value);

crate::reference_slot!(String, &'static str, Box<str>, Arc<str>);

impl<T: Slot> Slot for Option<T> {
    const KIND: Kind = Kind::Reference { nullable: true };

    type Key = Option<T::Key>;

    #[inline]
    fn slot_key(&self) -> Self::Key {
        self.as_ref().map(Slot::slot_key)
    }

    fn into_value(self) -> Value {
        self.map_or(Value::Null, |inner| Value::Reference(Reference::new(inner)))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            Value::Reference(reference) => reference.downcast_ref::<T>().cloned().map(Some),
            _ => None,
        }
    }
}

/// A non-null reference slot compared by structural equality.
///
/// Wrap any `Eq + Hash` type to use it as a reference kind without
/// declaring it through [`reference_slot!`](crate::reference_slot).
///
/// # Examples
///
/// ```
/// use kindred::kind::{Ref, Slot};
///
/// let first = Ref(vec![1, 2, 3]);
/// let second = Ref(vec![1, 2, 3]);
/// assert!(first.slot_eq(&second));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Ref<T>(pub T);

impl<T> Ref<T> {
    /// Returns the wrapped value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Slot for Ref<T>
where
    T: Clone + fmt::Debug + Eq + Hash + Send + Sync + 'static,
{
    const KIND: Kind = Kind::Reference { nullable: false };

    type Key = T;

    #[inline]
    fn slot_key(&self) -> Self::Key {
        self.0.clone()
    }

    fn into_value(self) -> Value {
        Value::Reference(Reference::new(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_reference()?.downcast_ref::<Self>().cloned()
    }
}

/// Key of an [`Identity`] slot: a handle to the shared allocation.
///
/// Equality and hashing use the allocation address only. The key owns a
/// clone of the allocation, so the address cannot be handed to another
/// value while the key is alive.
#[derive(Clone)]
pub struct IdentityKey(Arc<dyn Any + Send + Sync>);

impl IdentityKey {
    fn address(&self) -> usize {
        Arc::as_ptr(&self.0).cast::<()>().addr()
    }
}

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for IdentityKey {}

impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "IdentityKey({:#x})", self.address())
    }
}

/// A non-null reference slot compared by identity.
///
/// Two `Identity` values are equal only when they share the same
/// allocation, whatever `T` contains. Use it for types without a meaningful
/// equality. The key keeps the allocation alive, so a memoized entry or an
/// [`equal_to`](crate::unit::Unit::equal_to) target never matches a later
/// value that happens to reuse the address.
///
/// # Examples
///
/// ```
/// use kindred::kind::{Identity, Slot};
///
/// let first = Identity::new(String::from("same text"));
/// let second = Identity::new(String::from("same text"));
///
/// assert!(first.slot_eq(&first.clone()));
/// assert!(!first.slot_eq(&second));
/// ```
pub struct Identity<T>(Arc<T>);

impl<T> Identity<T> {
    /// Allocates a new identity-compared reference.
    pub fn new(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Wraps an existing shared allocation.
    pub const fn from_arc(shared: Arc<T>) -> Self {
        Self(shared)
    }

    /// Returns the shared allocation.
    pub const fn as_arc(&self) -> &Arc<T> {
        &self.0
    }
}

impl<T> Clone for Identity<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> std::ops::Deref for Identity<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Identity<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Identity").field(&self.0).finish()
    }
}

impl<T: fmt::Debug + Send + Sync + 'static> Slot for Identity<T> {
    const KIND: Kind = Kind::Reference { nullable: false };

    type Key = IdentityKey;

    #[inline]
    fn slot_key(&self) -> Self::Key {
        let shared: Arc<dyn Any + Send + Sync> = self.0.clone();
        IdentityKey(shared)
    }

    fn into_value(self) -> Value {
        Value::Reference(Reference::new(self))
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_reference()?.downcast_ref::<Self>().cloned()
    }
}

//! Type-erased functional units with runtime arity and kind checks.
//!
//! [`DynUnit`] is the slot-level face of a functional unit: its signature is
//! a list of [`Kind`]s chosen at runtime and it is invoked with a slice of
//! [`Value`]s. Everything the typed [`Unit`] rejects at compile time is
//! reported here as a [`UnitError`]:
//!
//! - invoking with the wrong number of inputs: [`UnitError::ArityMismatch`]
//! - an input the slot's kind does not accept: [`UnitError::KindMismatch`]
//! - a closure producing the wrong kind: [`UnitError::ResultKindMismatch`]
//! - a builder handed an absent or incompatible unit:
//!   [`UnitError::InvalidConstruction`], raised before anything is built
//!
//! Errors returned by a closure built with [`DynUnit::try_new`] travel
//! through every combinator unchanged, and are never memoized.
//!
//! # Examples
//!
//! ```
//! use kindred::dynamic::DynUnit;
//! use kindred::kind::{Kind, Value};
//!
//! let p = DynUnit::new([Kind::Int32, Kind::Int32], Kind::Bool, |inputs| {
//!     Value::Bool(inputs[0] == Value::Int32(5) && inputs[1] == Value::Int32(10))
//! })
//! .unwrap();
//!
//! let inputs = [Value::Int32(5), Value::Int32(10)];
//! assert_eq!(p.invoke(&inputs), Ok(Value::Bool(true)));
//! assert_eq!(p.negate().unwrap().invoke(&inputs), Ok(Value::Bool(false)));
//! assert!(p.invoke(&[Value::Int32(5)]).is_err());
//! ```

use std::fmt;
use std::slice;
use std::sync::Arc;

use crate::error::UnitError;
use crate::kind::{Kind, Slot, Value, Values};
use crate::memo::MemoCache;
use crate::unit::{Signature, Unit};

type DynFunction = Arc<dyn Fn(&[Value]) -> Result<Value, UnitError> + Send + Sync>;

type DynCache = Arc<MemoCache<Values, Result<Value, UnitError>>>;

/// A functional unit whose signature and result kind are runtime values.
#[derive(Clone)]
pub struct DynUnit {
    signature: Arc<[Kind]>,
    result: Kind,
    function: DynFunction,
    cache: Option<DynCache>,
}

static_assertions::assert_impl_all!(DynUnit: Send, Sync, Clone);

impl DynUnit {
    /// Creates a unit from an infallible closure over the argument slice.
    ///
    /// The closure only ever sees argument slices that passed the arity and
    /// kind checks.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `signature` is empty.
    pub fn new<F>(signature: impl Into<Arc<[Kind]>>, result: Kind, function: F) -> Result<Self, UnitError>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::try_new(signature, result, move |inputs| Ok(function(inputs)))
    }

    /// Creates a unit from a fallible closure.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `signature` is empty.
    pub fn try_new<F>(
        signature: impl Into<Arc<[Kind]>>,
        result: Kind,
        function: F,
    ) -> Result<Self, UnitError>
    where
        F: Fn(&[Value]) -> Result<Value, UnitError> + Send + Sync + 'static,
    {
        let signature = signature.into();
        if signature.is_empty() {
            return Err(UnitError::invalid("a unit needs at least one input slot"));
        }
        Ok(Self::from_closure(signature, result, function))
    }

    /// Erases a typed unit. The typed unit's cache, if any, keeps working.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::kind::{Kind, Value};
    /// use kindred::unit::Unit;
    ///
    /// let length = Unit::unary(|text: Option<String>| text.map_or(-1, |text| text.len() as i64));
    /// let erased = DynUnit::from_unit(&length);
    ///
    /// assert_eq!(erased.signature(), &[Kind::Reference { nullable: true }]);
    /// assert_eq!(erased.invoke(&[Value::Null]), Ok(Value::Int64(-1)));
    /// assert_eq!(erased.invoke(&[Value::of(String::from("abc"))]), Ok(Value::Int64(3)));
    /// ```
    pub fn from_unit<A: Signature, R: Slot>(unit: &Unit<A, R>) -> Self {
        let typed = unit.clone();
        Self::from_closure(A::kinds().into(), R::KIND, move |inputs| {
            let inputs = A::from_values(inputs)?;
            Ok(typed.invoke(inputs).into_value())
        })
    }

    fn from_closure<F>(signature: Arc<[Kind]>, result: Kind, function: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, UnitError> + Send + Sync + 'static,
    {
        Self {
            signature,
            result,
            function: Arc::new(function),
            cache: None,
        }
    }

    /// Returns the number of input slots.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.signature.len()
    }

    /// Returns the input kinds in declaration order.
    #[must_use]
    pub fn signature(&self) -> &[Kind] {
        &self.signature
    }

    /// Returns the declared result kind.
    #[must_use]
    pub const fn result_kind(&self) -> Kind {
        self.result
    }

    /// Returns `true` if the unit carries a memoization cache.
    #[must_use]
    pub const fn is_memoized(&self) -> bool {
        self.cache.is_some()
    }

    /// Returns the number of cached results, zero for unmemoized units.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.len())
    }

    /// Evaluates the unit.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::ArityMismatch`] or [`UnitError::KindMismatch`]
    /// for bad arguments, before the closure runs;
    /// [`UnitError::ResultKindMismatch`] if the closure's result does not
    /// fit the declared result kind; and any error the closure returns.
    pub fn invoke(&self, inputs: &[Value]) -> Result<Value, UnitError> {
        self.check_inputs(inputs)?;
        match &self.cache {
            Some(cache) => cache.get_or_compute_if(
                inputs.iter().cloned().collect(),
                || self.evaluate(inputs),
                Result::is_ok,
            ),
            None => self.evaluate(inputs),
        }
    }

    /// Evaluates the unit with typed inputs and reads back a typed result.
    ///
    /// # Errors
    ///
    /// Everything [`invoke`](DynUnit::invoke) returns, plus
    /// [`UnitError::ResultKindMismatch`] when the result cannot be read as
    /// an `R`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::unit::Unit;
    ///
    /// let erased = DynUnit::from_unit(&Unit::binary(|x: i8, y: i8| x.saturating_add(y)));
    /// assert_eq!(erased.call::<_, i8>((120_i8, 20_i8)), Ok(127));
    /// ```
    pub fn call<A: Signature, R: Slot>(&self, inputs: A) -> Result<R, UnitError> {
        let value = self.invoke(&inputs.into_values())?;
        R::from_value(&value).ok_or(UnitError::ResultKindMismatch {
            declared: R::KIND,
            actual: value.kind(),
        })
    }

    fn check_inputs(&self, inputs: &[Value]) -> Result<(), UnitError> {
        if inputs.len() != self.arity() {
            return Err(UnitError::ArityMismatch {
                expected: self.arity(),
                actual: inputs.len(),
            });
        }
        for (position, (expected, value)) in self.signature.iter().zip(inputs).enumerate() {
            if !expected.accepts(value.kind()) {
                return Err(UnitError::KindMismatch {
                    position,
                    expected: *expected,
                    actual: value.kind(),
                });
            }
        }
        Ok(())
    }

    fn evaluate(&self, inputs: &[Value]) -> Result<Value, UnitError> {
        let value = (self.function)(inputs)?;
        if self.result.accepts(value.kind()) {
            Ok(value)
        } else {
            Err(UnitError::ResultKindMismatch {
                declared: self.result,
                actual: value.kind(),
            })
        }
    }

    fn holds(&self, inputs: &[Value]) -> Result<bool, UnitError> {
        let value = self.invoke(inputs)?;
        value.as_bool().ok_or(UnitError::ResultKindMismatch {
            declared: Kind::Bool,
            actual: value.kind(),
        })
    }
}

/// Construction helpers.
impl DynUnit {
    /// A unit over `signature` that ignores its inputs and returns `value`.
    /// The result kind is the kind of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `signature` is empty.
    pub fn constant(signature: impl Into<Arc<[Kind]>>, value: Value) -> Result<Self, UnitError> {
        let result = value.kind();
        Self::new(signature, result, move |_| value.clone())
    }

    /// A predicate over `signature` that holds for every input.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `signature` is empty.
    pub fn always_true(signature: impl Into<Arc<[Kind]>>) -> Result<Self, UnitError> {
        Self::constant(signature, Value::Bool(true))
    }

    /// A predicate over `signature` that holds for no input.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `signature` is empty.
    pub fn always_false(signature: impl Into<Arc<[Kind]>>) -> Result<Self, UnitError> {
        Self::constant(signature, Value::Bool(false))
    }

    /// A predicate that holds when every input equals the matching target.
    ///
    /// Reference slots are nullable, so a null target matches exactly a
    /// null input and a non-null target is simply unequal to null.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `targets` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::kind::Value;
    ///
    /// let is_unnamed = DynUnit::equal_to(&[Value::Int32(1), Value::Null]).unwrap();
    ///
    /// assert_eq!(is_unnamed.invoke(&[Value::Int32(1), Value::Null]), Ok(Value::Bool(true)));
    /// assert_eq!(
    ///     is_unnamed.invoke(&[Value::Int32(1), Value::of(String::new())]),
    ///     Ok(Value::Bool(false))
    /// );
    /// ```
    pub fn equal_to(targets: &[Value]) -> Result<Self, UnitError> {
        let signature: Vec<Kind> = targets
            .iter()
            .map(|target| match target.kind() {
                Kind::Reference { .. } => Kind::Reference { nullable: true },
                primitive => primitive,
            })
            .collect();
        let expected: Values = targets.iter().cloned().collect();
        Self::new(signature, Kind::Bool, move |inputs| {
            Value::Bool(inputs == expected.as_slice())
        })
    }
}

/// Composition.
impl DynUnit {
    /// Pre-composition: adapter `i` maps the new `i`-th input to the
    /// original `i`-th input.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if the adapter count
    /// differs from the arity, an adapter is absent, an adapter does not
    /// take exactly one input, or an adapter's result kind is not accepted
    /// by its slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::error::UnitError;
    /// use kindred::kind::{Kind, Value};
    /// use kindred::unit::Unit;
    ///
    /// let is_positive = DynUnit::from_unit(&Unit::unary(|x: i64| x > 0));
    /// let widen = DynUnit::from_unit(&Unit::unary(|x: i8| i64::from(x)));
    ///
    /// let composed = is_positive.compose(&[Some(widen)]).unwrap();
    /// assert_eq!(composed.signature(), &[Kind::Int8]);
    /// assert_eq!(composed.invoke(&[Value::Int8(3)]), Ok(Value::Bool(true)));
    ///
    /// assert!(matches!(
    ///     is_positive.compose(&[None]),
    ///     Err(UnitError::InvalidConstruction { .. })
    /// ));
    /// ```
    pub fn compose(&self, adapters: &[Option<Self>]) -> Result<Self, UnitError> {
        if adapters.len() != self.arity() {
            return Err(UnitError::invalid(format!(
                "expected {} adapters, got {}",
                self.arity(),
                adapters.len()
            )));
        }

        let mut resolved = Vec::with_capacity(adapters.len());
        let mut signature = Vec::with_capacity(adapters.len());
        for (position, (slot, adapter)) in self.signature.iter().zip(adapters).enumerate() {
            let adapter = adapter
                .as_ref()
                .ok_or_else(|| UnitError::invalid(format!("adapter {position} is absent")))?;
            if adapter.arity() != 1 {
                return Err(UnitError::invalid(format!(
                    "adapter {position} takes {} inputs, expected 1",
                    adapter.arity()
                )));
            }
            if !slot.accepts(adapter.result) {
                return Err(UnitError::invalid(format!(
                    "adapter {position} produces {}, slot expects {slot}",
                    adapter.result
                )));
            }
            signature.push(adapter.signature[0]);
            resolved.push(adapter.clone());
        }

        let original = self.clone();
        let adapters: Arc<[Self]> = resolved.into();
        Ok(Self::from_closure(signature.into(), self.result, move |inputs| {
            let adapted = adapters
                .iter()
                .zip(inputs)
                .map(|(adapter, input)| adapter.invoke(slice::from_ref(input)))
                .collect::<Result<Values, _>>()?;
            original.invoke(&adapted)
        }))
    }

    /// Post-composition: feeds this unit's result into `after`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `after` is absent, does
    /// not take exactly one input, or does not accept this unit's result
    /// kind.
    pub fn and_then(&self, after: Option<&Self>) -> Result<Self, UnitError> {
        let after = after.ok_or_else(|| UnitError::invalid("post-composition adapter is absent"))?;
        if after.arity() != 1 {
            return Err(UnitError::invalid(format!(
                "post-composition adapter takes {} inputs, expected 1",
                after.arity()
            )));
        }
        if !after.signature[0].accepts(self.result) {
            return Err(UnitError::invalid(format!(
                "post-composition adapter expects {}, unit produces {}",
                after.signature[0], self.result
            )));
        }

        let original = self.clone();
        let after = after.clone();
        let result = after.result;
        Ok(Self::from_closure(Arc::clone(&self.signature), result, move |inputs| {
            let intermediate = original.invoke(inputs)?;
            after.invoke(slice::from_ref(&intermediate))
        }))
    }

    /// Logical NOT of a predicate.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if the result kind is not
    /// `Bool`.
    pub fn negate(&self) -> Result<Self, UnitError> {
        self.require_predicate("negate")?;
        let original = self.clone();
        Ok(Self::from_closure(Arc::clone(&self.signature), Kind::Bool, move |inputs| {
            Ok(Value::Bool(!original.holds(inputs)?))
        }))
    }

    /// Short-circuiting conjunction: `other` runs only if `self` holds.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if `other` is absent,
    /// either unit is not a predicate, or the signatures differ.
    pub fn and(&self, other: Option<&Self>) -> Result<Self, UnitError> {
        let (left, right) = self.predicate_pair(other, "and")?;
        Ok(Self::from_closure(Arc::clone(&self.signature), Kind::Bool, move |inputs| {
            Ok(Value::Bool(left.holds(inputs)? && right.holds(inputs)?))
        }))
    }

    /// Short-circuiting disjunction: `other` runs only if `self` fails.
    ///
    /// # Errors
    ///
    /// Same as [`and`](DynUnit::and).
    pub fn or(&self, other: Option<&Self>) -> Result<Self, UnitError> {
        let (left, right) = self.predicate_pair(other, "or")?;
        Ok(Self::from_closure(Arc::clone(&self.signature), Kind::Bool, move |inputs| {
            Ok(Value::Bool(left.holds(inputs)? || right.holds(inputs)?))
        }))
    }

    /// Exclusive or. Both units are always invoked, `self` first.
    ///
    /// # Errors
    ///
    /// Same as [`and`](DynUnit::and).
    pub fn xor(&self, other: Option<&Self>) -> Result<Self, UnitError> {
        let (left, right) = self.predicate_pair(other, "xor")?;
        Ok(Self::from_closure(Arc::clone(&self.signature), Kind::Bool, move |inputs| {
            let left_result = left.holds(inputs)?;
            let right_result = right.holds(inputs)?;
            Ok(Value::Bool(left_result ^ right_result))
        }))
    }

    fn require_predicate(&self, operation: &str) -> Result<(), UnitError> {
        if self.result == Kind::Bool {
            Ok(())
        } else {
            Err(UnitError::invalid(format!(
                "`{operation}` needs a Bool result, got {}",
                self.result
            )))
        }
    }

    fn predicate_pair(&self, other: Option<&Self>, operation: &str) -> Result<(Self, Self), UnitError> {
        let other = other.ok_or_else(|| {
            UnitError::invalid(format!("right-hand operand of `{operation}` is absent"))
        })?;
        self.require_predicate(operation)?;
        other.require_predicate(operation)?;
        if self.signature != other.signature {
            return Err(UnitError::invalid(format!(
                "`{operation}` needs identical signatures, got {} and {}",
                describe(&self.signature),
                describe(&other.signature)
            )));
        }
        Ok((self.clone(), other.clone()))
    }
}

/// Partial application.
impl DynUnit {
    /// Fixes the leading inputs.
    ///
    /// # Errors
    ///
    /// See [`fix_at`](DynUnit::fix_at).
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::kind::Value;
    /// use kindred::unit::Unit;
    ///
    /// let weigh = DynUnit::from_unit(&Unit::ternary(|a: i32, b: i32, c: i32| a * 100 + b * 10 + c));
    /// let reduced = weigh.fix_prefix(&[Value::Int32(1), Value::Int32(2)]).unwrap();
    ///
    /// assert_eq!(reduced.arity(), 1);
    /// assert_eq!(reduced.invoke(&[Value::Int32(3)]), Ok(Value::Int32(123)));
    /// ```
    pub fn fix_prefix(&self, values: &[Value]) -> Result<Self, UnitError> {
        let fixed: Vec<(usize, Value)> = values.iter().cloned().enumerate().collect();
        self.fix_at(&fixed)
    }

    /// Fixes inputs at arbitrary positions. The remaining inputs keep their
    /// relative order, and the original unit always sees its inputs in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidConstruction`] if every input would be
    /// fixed, a position is out of range, or a position is fixed twice, and
    /// [`UnitError::KindMismatch`] if a fixed value does not fit its slot.
    pub fn fix_at(&self, fixed: &[(usize, Value)]) -> Result<Self, UnitError> {
        let arity = self.arity();
        if fixed.len() >= arity {
            return Err(UnitError::invalid(format!(
                "cannot fix {} of {arity} inputs",
                fixed.len()
            )));
        }

        let mut template: Vec<Option<Value>> = vec![None; arity];
        for (position, value) in fixed {
            let position = *position;
            let expected = *self.signature.get(position).ok_or_else(|| {
                UnitError::invalid(format!("position {position} is out of range for arity {arity}"))
            })?;
            if template[position].is_some() {
                return Err(UnitError::invalid(format!("position {position} is fixed twice")));
            }
            if !expected.accepts(value.kind()) {
                return Err(UnitError::KindMismatch {
                    position,
                    expected,
                    actual: value.kind(),
                });
            }
            template[position] = Some(value.clone());
        }

        let signature: Vec<Kind> = self
            .signature
            .iter()
            .zip(&template)
            .filter(|(_, slot)| slot.is_none())
            .map(|(kind, _)| *kind)
            .collect();
        let template: Arc<[Option<Value>]> = template.into();
        let original = self.clone();

        Ok(Self::from_closure(signature.into(), self.result, move |rest| {
            let mut remaining = rest.iter().cloned();
            let inputs = template
                .iter()
                .map(|slot| slot.clone().or_else(|| remaining.next()))
                .collect::<Option<Values>>()
                .ok_or(UnitError::ArityMismatch {
                    expected: arity - fixed_count(&template),
                    actual: rest.len(),
                })?;
            original.invoke(&inputs)
        }))
    }
}

/// Memoization.
impl DynUnit {
    /// Returns a memoizing unit keyed by the argument vector; a unit that is
    /// already memoized is returned unchanged.
    ///
    /// Only successful results are cached.
    ///
    /// # Examples
    ///
    /// ```
    /// use kindred::dynamic::DynUnit;
    /// use kindred::kind::{Kind, Value};
    ///
    /// let square = DynUnit::new([Kind::Float64], Kind::Float64, |inputs| {
    ///     let x = inputs[0].as_f64().unwrap_or_default();
    ///     Value::Float64(x * x)
    /// })
    /// .unwrap()
    /// .memoize();
    ///
    /// square.invoke(&[Value::Float64(f64::NAN)]).unwrap();
    /// square.invoke(&[Value::Float64(-f64::NAN)]).unwrap();
    /// assert_eq!(square.cached_len(), 1);
    /// assert_eq!(square.memoize().cached_len(), 1);
    /// ```
    #[must_use]
    pub fn memoize(&self) -> Self {
        if self.is_memoized() {
            return self.clone();
        }

        tracing::debug!(
            arity = self.arity(),
            result = %self.result,
            "memoizing dynamic unit"
        );

        Self {
            cache: Some(Arc::new(MemoCache::new())),
            ..self.clone()
        }
    }
}

fn fixed_count(template: &[Option<Value>]) -> usize {
    template.iter().filter(|slot| slot.is_some()).count()
}

fn describe(kinds: &[Kind]) -> String {
    let names: Vec<&str> = kinds.iter().map(|kind| kind.name()).collect();
    format!("({})", names.join(", "))
}

impl fmt::Debug for DynUnit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DynUnit")
            .field("signature", &self.signature)
            .field("result", &self.result)
            .field("memoized", &self.is_memoized())
            .finish()
    }
}

impl<A: Signature, R: Slot> From<&Unit<A, R>> for DynUnit {
    fn from(unit: &Unit<A, R>) -> Self {
        Self::from_unit(unit)
    }
}

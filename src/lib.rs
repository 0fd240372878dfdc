//! # kindred
//!
//! Generic functional units over value kinds, with composition, boolean
//! combinators, partial application and thread-safe memoization.
//!
//! ## Overview
//!
//! A functional unit is a callable with a fixed list of input slots and one
//! result slot. Instead of one hand-written interface per combination of
//! kinds and arity, a single generic [`Unit<A, R>`](unit::Unit) covers them
//! all: the input tuple `A` carries the arity and the kinds at the type
//! level, so arity and kind mismatches are compile errors.
//!
//! - **Kinds**: references (optionally nullable) and fixed-width primitives,
//!   each with an explicit equality and hashing strategy
//! - **Composition**: pre-composition through adapters, post-composition,
//!   and short-circuiting boolean combinators
//! - **Partial Application**: fixing any proper subset of the inputs
//! - **Memoization**: at-most-once evaluation per distinct input tuple, safe
//!   under concurrent callers
//! - **Dynamic Units**: a type-erased unit checked at runtime, for
//!   signatures chosen while the program runs
//!
//! ## Feature Flags
//!
//! - `compose`: Composition engine
//! - `partial`: Partial application engine
//! - `memo`: Memoization engine
//! - `dynamic`: Type-erased units (enables the three above)
//! - `fxhash` / `ahash`: Hasher used by memoization caches
//! - `serde`: `Serialize` and `Deserialize` for [`Kind`](kind::Kind)
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use kindred::prelude::*;
//!
//! let p = Unit::binary(|x: i32, y: i32| x == 5 && y == 10);
//!
//! assert!(!p.negate().apply(5, 10));
//! assert!(p.and(&Unit::constant(true)).apply(5, 10));
//! assert!(p.memoize().apply(5, 10));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use kindred::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::UnitError;
    pub use crate::kind::{Identity, Kind, Ref, Reference, Slot, Value, Values};
    pub use crate::unit::{Signature, Unit};

    #[cfg(feature = "compose")]
    pub use crate::compose::{Adapters, identity};

    #[cfg(feature = "partial")]
    pub use crate::partial::{SplitPrefix, SplitSuffix};

    #[cfg(feature = "memo")]
    pub use crate::memo::{MemoCache, MemoizedUnit, memoize};

    #[cfg(feature = "dynamic")]
    pub use crate::dynamic::DynUnit;
}

pub mod error;

pub mod kind;

pub mod unit;

#[cfg(feature = "compose")]
pub mod compose;

#[cfg(feature = "partial")]
pub mod partial;

#[cfg(feature = "memo")]
pub mod memo;

#[cfg(feature = "dynamic")]
pub mod dynamic;

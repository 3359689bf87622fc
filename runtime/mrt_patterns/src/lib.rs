//! Mrt Patterns - the pattern-handle algebra.
//!
//! Every pattern is a [`PatternHandle`]: a match attempt plus one component
//! extractor per binding, over a [`Descriptor`] (target type and binding
//! types). Primitives build handles directly; combinators build handles out
//! of other handles.
//!
//! # Primitives
//!
//! - [`of_type`], [`of_type_nullable`]: instance tests binding the target
//! - [`of_constant`]: equality test, no bindings
//! - [`of_lazy_projection`], [`of_eager_projection`]: one binding per extractor
//! - [`of_record`]: eager projection over record components
//! - [`of_imperative`]: match decision delegated to a [`Digester`]
//!
//! # Combinators
//!
//! - [`adapt_target`]: test against a related target type
//! - [`drop_bindings`]: hide bindings
//! - [`nested`]: match inner patterns against outer bindings
//! - [`compose`]: match and feed the bindings to a consumer
//!
//! Match failure is the `Null` carrier, never an error. Errors only come from
//! building a handle whose parts do not fit together.

mod bundle;
mod combinators;
mod pattern;
mod primitives;

pub use combinators::{adapt_target, compose, drop_bindings, nested};
pub use pattern::{Bindings, Descriptor, PatternHandle};
pub use primitives::{
    of_constant, of_constant_for, of_eager_projection, of_imperative, of_lazy_projection,
    of_record, of_type, of_type_for, of_type_nullable, of_type_nullable_for, Bind, Digester,
};

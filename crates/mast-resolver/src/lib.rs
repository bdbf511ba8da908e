//! Type resolution for the mast workspace.
//!
//! Turns abstract IDL type declarations, including nested generics,
//! into canonical wire-type descriptors:
//! - [`wire`]: the [`WireDef`] descriptor vocabulary and its registry
//!   JSON form
//! - [`resolver`]: [`TypeResolver`], one per program/service scope,
//!   with eager registration of non-generic declarations and memoized
//!   generic instantiation
//!
//! Resolution is pure over the immutable document; the only interior
//! state is the memoization registry.

pub mod resolver;
pub mod wire;

pub use resolver::{ResolveError, TypeResolver};
pub use wire::WireDef;

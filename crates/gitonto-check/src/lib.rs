//! Gitonto Check - Integrity validation and derived facts
//!
//! [`validate`] reports violated structural invariants as [`Issue`]s.
//! [`InferenceEngine`] separates derived facts from asserted ones, with an
//! optional [`ClosureProvider`] standing in for a reasoner.

pub mod inference;
pub mod validator;

pub use inference::{ClosureProvider, EntityFacts, InferenceEngine, TypeHierarchy};
pub use validator::{validate, Issue, Rule};

//! Gitonto Core - Commit history graph snapshot
//!
//! This crate provides the entity types, the immutable snapshot that owns
//! them, and the classification rules shared by the query and check crates.

pub mod classify;
pub mod entity;
pub mod error;
pub mod fact;
pub mod limits;
pub mod snapshot;

pub use classify::{classify, is_initial, is_merge, is_normal, message_suggests_merge, CommitKind};
pub use entity::{Branch, Commit, EntityId, EntityKind, Repository, User};
pub use error::{Error, Result};
pub use fact::{Fact, FactSet, Provenance, ProvenancedFact};
pub use snapshot::{Snapshot, SnapshotData, SnapshotProfile};

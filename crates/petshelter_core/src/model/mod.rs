//! Pet domain model and repository payload types.
//!
//! # Responsibility
//! - Define typed records for service/editor callers.
//! - Define the untyped field maps the repository consumes and returns.
//!
//! # Invariants
//! - Every pet is identified by a storage-assigned `PetId`.
//! - Deletion is permanent; there is no tombstone state.

pub mod fields;
pub mod pet;

//! Repository layer contracts and SQLite implementation.
//!
//! # Responsibility
//! - Route resource paths to single-table persistence operations.
//! - Isolate SQL details from service/editor orchestration.
//!
//! # Invariants
//! - Every write path validates its field map before SQL runs.
//! - Repository APIs return semantic errors (`UnknownResource`,
//!   `InvalidRecord`) in addition to storage errors.

pub mod cursor;
pub mod pet_repo;

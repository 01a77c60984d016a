//! Core data layer for the pet shelter catalog.
//! This crate is the single source of truth for pet persistence invariants.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod schema;
pub mod service;
pub mod uri;

pub use config::ShelterConfig;
pub use db::{DbError, ShelterDb, StoreLocation};
pub use editor::{EditorError, EditorMode, FormError, PetEditor, PetForm, SaveOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::fields::{FieldMap, FieldValue};
pub use model::pet::{NewPet, Pet, PetId, PetSummary};
pub use notify::{ChangeNotifier, ChangeObserver, ObserverId};
pub use repo::cursor::{PetCursor, PetRow};
pub use repo::pet_repo::{PetRepository, RepoError, RepoResult, ResourceType, SqlitePetRepository};
pub use schema::Gender;
pub use service::pet_service::PetService;
pub use uri::ResourcePath;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

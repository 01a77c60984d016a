//! Pet use-case service.
//!
//! # Responsibility
//! - Provide typed CRUD entry points for core callers.
//! - Translate typed requests into resource-path repository calls.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or notification.
//! - Service layer remains storage-agnostic.

use crate::model::pet::{NewPet, Pet, PetId, PetSummary};
use crate::repo::pet_repo::{PetRepository, RepoResult};
use crate::schema::{Gender, COLUMN_BREED, COLUMN_ID, COLUMN_NAME};
use crate::uri::ResourcePath;

const COLLECTION_PATH: &str = "/pets";
const ORDER_BY_ID: &str = "_id ASC";

/// Use-case service wrapper for pet operations.
pub struct PetService<R: PetRepository> {
    repo: R,
}

impl<R: PetRepository> PetService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Creates a pet and returns its storage-assigned id.
    pub fn create_pet(&self, pet: &NewPet) -> RepoResult<PetId> {
        self.repo.insert(COLLECTION_PATH, &pet.to_fields())
    }

    /// Inserts the catalog's sample row (`Terry`, a female terrier).
    pub fn insert_sample_pet(&self) -> RepoResult<PetId> {
        self.create_pet(&NewPet::new("Terry", "Terrier", Gender::Female, 11))
    }

    pub fn get_pet(&self, id: PetId) -> RepoResult<Option<Pet>> {
        let path = ResourcePath::for_pet(id).to_string();
        let mut cursor = self.repo.query(&path, &[], None, &[], None)?;
        cursor.next().map(|row| row.to_pet()).transpose()
    }

    /// Lists every pet ordered by id.
    pub fn list_pets(&self) -> RepoResult<Vec<Pet>> {
        self.repo
            .query(COLLECTION_PATH, &[], None, &[], Some(ORDER_BY_ID))?
            .into_pets()
    }

    /// Lists the id/name/breed projection shown by the catalog.
    pub fn list_summaries(&self) -> RepoResult<Vec<PetSummary>> {
        self.repo
            .query(
                COLLECTION_PATH,
                &[COLUMN_ID, COLUMN_NAME, COLUMN_BREED],
                None,
                &[],
                Some(ORDER_BY_ID),
            )?
            .map(|row| row.to_summary())
            .collect()
    }

    /// Replaces all mutable fields of one pet; returns rows changed.
    pub fn update_pet(&self, id: PetId, pet: &NewPet) -> RepoResult<usize> {
        let path = ResourcePath::for_pet(id).to_string();
        self.repo.update(&path, &pet.to_fields(), None, &[])
    }

    pub fn delete_pet(&self, id: PetId) -> RepoResult<usize> {
        let path = ResourcePath::for_pet(id).to_string();
        self.repo.delete(&path, None, &[])
    }

    /// Removes every pet; returns rows removed.
    pub fn delete_all_pets(&self) -> RepoResult<usize> {
        self.repo.delete(COLLECTION_PATH, None, &[])
    }
}

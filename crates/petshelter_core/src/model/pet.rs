//! Pet domain model.
//!
//! # Responsibility
//! - Define typed pet records used by service and editor callers.
//! - Convert between typed records and repository field maps.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused.
//! - `weight` is never negative for persisted pets.

use crate::model::fields::FieldMap;
use crate::schema::{Gender, COLUMN_BREED, COLUMN_GENDER, COLUMN_NAME, COLUMN_WEIGHT};
use serde::{Deserialize, Serialize};

/// Row id assigned by the storage engine.
pub type PetId = i64;

/// Persisted pet record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    /// Stored column is nullable; rows written through the repository
    /// always carry a value, possibly empty.
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

/// Field values for creating or fully replacing a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    pub breed: String,
    pub gender: Gender,
    pub weight: i64,
}

impl NewPet {
    pub fn new(
        name: impl Into<String>,
        breed: impl Into<String>,
        gender: Gender,
        weight: i64,
    ) -> Self {
        Self {
            name: name.into(),
            breed: breed.into(),
            gender,
            weight,
        }
    }

    /// Builds the full insert/update payload.
    pub fn to_fields(&self) -> FieldMap {
        FieldMap::new()
            .with(COLUMN_NAME, self.name.as_str())
            .with(COLUMN_BREED, self.breed.as_str())
            .with(COLUMN_GENDER, self.gender.as_i64())
            .with(COLUMN_WEIGHT, self.weight)
    }
}

impl From<&Pet> for NewPet {
    fn from(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            breed: pet.breed.clone().unwrap_or_default(),
            gender: pet.gender,
            weight: pet.weight,
        }
    }
}

/// Catalog list projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSummary {
    pub id: PetId,
    pub name: String,
    pub breed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{NewPet, Pet};
    use crate::schema::Gender;

    #[test]
    fn to_fields_carries_all_columns() {
        let fields = NewPet::new("Terry", "Terrier", Gender::Female, 11).to_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields.get("gender").and_then(|v| v.as_integer()), Some(2));
        assert_eq!(fields.get("breed").and_then(|v| v.as_text()), Some("Terrier"));
    }

    #[test]
    fn new_pet_from_pet_defaults_missing_breed_to_empty() {
        let pet = Pet {
            id: 4,
            name: "Tom".to_string(),
            breed: None,
            gender: Gender::Male,
            weight: 3,
        };
        let fields = NewPet::from(&pet);
        assert_eq!(fields.breed, "");
        assert_eq!(fields.weight, 3);
    }
}

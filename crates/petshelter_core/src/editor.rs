//! Editor form flows for creating and editing one pet.
//!
//! # Responsibility
//! - Carry the explicit create/edit mode of the editor screen.
//! - Apply presentation-level input limits before calling the service.
//!
//! # Invariants
//! - Form validation is independent from repository validation; a form that
//!   passes here can still be rejected by the repository.
//! - A blank weight is saved as 0; non-numeric weight is rejected.

use crate::model::pet::{NewPet, Pet, PetId};
use crate::repo::pet_repo::{PetRepository, RepoError};
use crate::schema::Gender;
use crate::service::pet_service::PetService;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Heaviest weight the editor accepts.
pub const MAX_FORM_WEIGHT: i64 = 100;

/// Whether the editor creates a new pet or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit(PetId),
}

/// Raw editor input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: String,
    pub breed: String,
    pub gender: Gender,
    pub weight: String,
}

/// Presentation-level input problems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    NameRequired,
    WeightNotANumber(String),
    WeightTooHeavy(i64),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "pet name is required"),
            Self::WeightNotANumber(value) => {
                write!(f, "weight must be a whole number, got `{value}`")
            }
            Self::WeightTooHeavy(value) => {
                write!(f, "weight {value} exceeds maximum of {MAX_FORM_WEIGHT}")
            }
        }
    }
}

impl Error for FormError {}

impl PetForm {
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            breed: pet.breed.clone().unwrap_or_default(),
            gender: pet.gender,
            weight: pet.weight.to_string(),
        }
    }

    /// Trims input and applies editor limits.
    pub fn validate(&self) -> Result<NewPet, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::NameRequired);
        }

        let weight_text = self.weight.trim();
        let weight = if weight_text.is_empty() {
            0
        } else {
            match weight_text.parse::<i64>() {
                Ok(value) if value >= 0 => value,
                _ => return Err(FormError::WeightNotANumber(weight_text.to_string())),
            }
        };
        if weight > MAX_FORM_WEIGHT {
            return Err(FormError::WeightTooHeavy(weight));
        }

        Ok(NewPet::new(name, self.breed.trim(), self.gender, weight))
    }
}

/// Editor flow errors.
#[derive(Debug)]
pub enum EditorError {
    Form(FormError),
    Repo(RepoError),
    /// Delete requested while creating a pet.
    NothingToDelete,
    PetNotFound(PetId),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::NothingToDelete => write!(f, "cannot delete a pet that was never saved"),
            Self::PetNotFound(id) => write!(f, "pet not found: {id}"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Form(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::NothingToDelete | Self::PetNotFound(_) => None,
        }
    }
}

impl From<FormError> for EditorError {
    fn from(value: FormError) -> Self {
        Self::Form(value)
    }
}

impl From<RepoError> for EditorError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(PetId),
    Updated(PetId),
}

/// Editor screen logic bound to a pet service.
pub struct PetEditor<'s, R: PetRepository> {
    service: &'s PetService<R>,
}

impl<'s, R: PetRepository> PetEditor<'s, R> {
    pub fn new(service: &'s PetService<R>) -> Self {
        Self { service }
    }

    /// Returns the initial form for `mode`.
    pub fn load(&self, mode: EditorMode) -> Result<PetForm, EditorError> {
        match mode {
            EditorMode::Create => Ok(PetForm::default()),
            EditorMode::Edit(id) => self
                .service
                .get_pet(id)?
                .map(|pet| PetForm::from_pet(&pet))
                .ok_or(EditorError::PetNotFound(id)),
        }
    }

    /// Validates and persists the form.
    pub fn save(&self, mode: EditorMode, form: &PetForm) -> Result<SaveOutcome, EditorError> {
        let pet = form.validate()?;
        match mode {
            EditorMode::Create => {
                let id = self.service.create_pet(&pet)?;
                info!("event=editor_save module=editor status=ok mode=create id={id}");
                Ok(SaveOutcome::Created(id))
            }
            EditorMode::Edit(id) => {
                if self.service.update_pet(id, &pet)? == 0 {
                    return Err(EditorError::PetNotFound(id));
                }
                info!("event=editor_save module=editor status=ok mode=edit id={id}");
                Ok(SaveOutcome::Updated(id))
            }
        }
    }

    /// Deletes the pet being edited.
    pub fn delete(&self, mode: EditorMode) -> Result<PetId, EditorError> {
        let EditorMode::Edit(id) = mode else {
            return Err(EditorError::NothingToDelete);
        };
        if self.service.delete_pet(id)? == 0 {
            return Err(EditorError::PetNotFound(id));
        }
        info!("event=editor_delete module=editor status=ok id={id}");
        Ok(id)
    }
}

//! Resource path classification.
//!
//! # Responsibility
//! - Map caller-supplied path strings to a collection or single-row scope.
//!
//! # Invariants
//! - `/pets` is `All`; `/pets/<digits>` is `One(id)`; everything else is
//!   `Unrecognized`.
//! - Classification is pure; there is no registry to initialize.

use crate::model::pet::PetId;
use crate::schema::{CONTENT_AUTHORITY, PATH_PETS};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

const CONTENT_SCHEME: &str = "content://";

static PETS_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^/{}(?:/([0-9]+))?$", regex::escape(PATH_PETS)))
        .expect("valid pets path regex")
});

/// Scope addressed by a resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourcePath {
    /// The whole pets collection.
    All,
    /// One pet row.
    One(PetId),
    Unrecognized,
}

impl ResourcePath {
    /// Classifies a bare path (`/pets/3`) or a full content URI
    /// (`content://com.example.android.pets/pets/3`).
    pub fn classify(raw: &str) -> Self {
        let path = match raw.strip_prefix(CONTENT_SCHEME) {
            Some(rest) => match rest.split_once('/') {
                Some((authority, _)) if authority == CONTENT_AUTHORITY => {
                    &rest[authority.len()..]
                }
                _ => return Self::Unrecognized,
            },
            None => raw,
        };

        let Some(captures) = PETS_PATH_RE.captures(path) else {
            return Self::Unrecognized;
        };
        match captures.get(1) {
            None => Self::All,
            Some(id) => id
                .as_str()
                .parse::<PetId>()
                .map_or(Self::Unrecognized, Self::One),
        }
    }

    pub fn for_pet(id: PetId) -> Self {
        Self::One(id)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized)
    }

    /// Embedded row id for single-row paths.
    pub fn pet_id(&self) -> Option<PetId> {
        match self {
            Self::One(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether `other` lies strictly below this path.
    pub fn is_ancestor_of(&self, other: &ResourcePath) -> bool {
        matches!((self, other), (Self::All, Self::One(_)))
    }

    /// Full content URI form of this path.
    pub fn to_uri(&self) -> String {
        format!("{CONTENT_SCHEME}{CONTENT_AUTHORITY}{self}")
    }
}

impl Display for ResourcePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "/{PATH_PETS}"),
            Self::One(id) => write!(f, "/{PATH_PETS}/{id}"),
            Self::Unrecognized => write!(f, "<unrecognized>"),
        }
    }
}

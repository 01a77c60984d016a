//! Pets table schema and domain constants.
//!
//! # Responsibility
//! - Declare table/column names used by storage and repository code.
//! - Define the closed gender domain and content-type tags.
//!
//! # Invariants
//! - `COLUMNS` order is the default projection order.
//! - Gender values persisted as integers are always within `0..=2`.

use serde::{Deserialize, Serialize};

/// File name used for the on-disk database.
pub const DATABASE_NAME: &str = "shelter.db";
/// Schema version mirrored to `PRAGMA user_version`.
pub const DATABASE_VERSION: u32 = 1;

/// Authority part of full content URIs.
pub const CONTENT_AUTHORITY: &str = "com.example.android.pets";
/// Path segment addressing the pets collection.
pub const PATH_PETS: &str = "pets";

pub const TABLE_NAME: &str = "pets";
pub const COLUMN_ID: &str = "_id";
pub const COLUMN_NAME: &str = "name";
pub const COLUMN_BREED: &str = "breed";
pub const COLUMN_GENDER: &str = "gender";
pub const COLUMN_WEIGHT: &str = "weight";

/// Content type for the whole pets collection.
pub const CONTENT_LIST_TYPE: &str = "vnd.android.cursor.dir/com.example.android.pets/pets";
/// Content type for a single pet row.
pub const CONTENT_ITEM_TYPE: &str = "vnd.android.cursor.item/com.example.android.pets/pets";

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// One column of the pets table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnType,
    pub nullable: bool,
}

/// Pets table columns in declaration order.
pub const COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        name: COLUMN_ID,
        kind: ColumnType::Integer,
        nullable: false,
    },
    ColumnDef {
        name: COLUMN_NAME,
        kind: ColumnType::Text,
        nullable: false,
    },
    ColumnDef {
        name: COLUMN_BREED,
        kind: ColumnType::Text,
        nullable: true,
    },
    ColumnDef {
        name: COLUMN_GENDER,
        kind: ColumnType::Integer,
        nullable: false,
    },
    ColumnDef {
        name: COLUMN_WEIGHT,
        kind: ColumnType::Integer,
        nullable: false,
    },
];

/// Looks up a column definition by exact name.
pub fn column(name: &str) -> Option<&'static ColumnDef> {
    COLUMNS.iter().find(|column| column.name == name)
}

/// Returns all column names in declaration order.
pub fn column_names() -> Vec<&'static str> {
    COLUMNS.iter().map(|column| column.name).collect()
}

/// Pet gender as stored in `pets.gender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unknown, Gender::Male, Gender::Female];

    /// Integer code persisted in the database.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }

    /// Parses a persisted integer code; `None` when out of range.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parses a label or numeric code, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unknown" | "0" => Some(Self::Unknown),
            "male" | "1" => Some(Self::Male),
            "female" | "2" => Some(Self::Female),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{column, column_names, ColumnType, Gender, COLUMN_BREED, COLUMN_ID};

    #[test]
    fn gender_codes_cover_closed_range() {
        for gender in Gender::ALL {
            assert_eq!(Gender::from_i64(gender.as_i64()), Some(gender));
        }
        assert_eq!(Gender::from_i64(3), None);
        assert_eq!(Gender::from_i64(-1), None);
    }

    #[test]
    fn gender_parse_accepts_labels_and_codes() {
        assert_eq!(Gender::parse(" Female "), Some(Gender::Female));
        assert_eq!(Gender::parse("1"), Some(Gender::Male));
        assert_eq!(Gender::parse("cat"), None);
    }

    #[test]
    fn columns_are_declared_in_table_order() {
        assert_eq!(
            column_names(),
            vec!["_id", "name", "breed", "gender", "weight"]
        );
        let id = column(COLUMN_ID).expect("id column");
        assert_eq!(id.kind, ColumnType::Integer);
        assert!(column(COLUMN_BREED).expect("breed column").nullable);
        assert!(column("owner").is_none());
    }
}

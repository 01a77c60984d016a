//! Query result cursor.
//!
//! Rows are read out of SQLite while the statement is held and the statement
//! is finalized before the cursor is handed back, so a cursor never pins the
//! connection. Iteration is forward-only and consumes the rows.

use crate::model::fields::{FieldMap, FieldValue};
use crate::model::pet::{Pet, PetSummary};
use crate::repo::pet_repo::{RepoError, RepoResult};
use crate::schema::{Gender, COLUMN_BREED, COLUMN_GENDER, COLUMN_ID, COLUMN_NAME, COLUMN_WEIGHT};
use std::sync::Arc;

/// Forward-only, read-once sequence of projected rows.
#[derive(Debug)]
pub struct PetCursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<FieldValue>>,
}

impl PetCursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<FieldValue>>) -> Self {
        Self {
            columns: columns.into(),
            rows: rows.into_iter(),
        }
    }

    /// Projected column names, in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Consumes the cursor into typed pets; every column must be projected.
    pub fn into_pets(self) -> RepoResult<Vec<Pet>> {
        self.map(|row| row.to_pet()).collect()
    }
}

impl Iterator for PetCursor {
    type Item = PetRow;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|values| PetRow {
            columns: Arc::clone(&self.columns),
            values,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for PetCursor {}

/// One projected row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetRow {
    columns: Arc<[String]>,
    values: Vec<FieldValue>,
}

impl PetRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    pub fn get_text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(FieldValue::as_text)
    }

    pub fn get_integer(&self, column: &str) -> Option<i64> {
        match self.get(column) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn to_field_map(&self) -> FieldMap {
        self.columns
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }

    /// Converts a full-projection row into a typed pet.
    pub fn to_pet(&self) -> RepoResult<Pet> {
        let id = self.require_integer(COLUMN_ID)?;
        let name = self
            .get_text(COLUMN_NAME)
            .ok_or_else(|| missing(COLUMN_NAME))?
            .to_string();
        let breed = match self.get(COLUMN_BREED) {
            Some(FieldValue::Text(value)) => Some(value.clone()),
            Some(FieldValue::Null) => None,
            _ => return Err(missing(COLUMN_BREED)),
        };
        let gender_code = self.require_integer(COLUMN_GENDER)?;
        let gender = Gender::from_i64(gender_code).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid gender `{gender_code}` in pets.gender"))
        })?;
        let weight = self.require_integer(COLUMN_WEIGHT)?;
        if weight < 0 {
            return Err(RepoError::InvalidData(format!(
                "negative weight `{weight}` in pets.weight"
            )));
        }

        Ok(Pet {
            id,
            name,
            breed,
            gender,
            weight,
        })
    }

    /// Converts a row projecting at least `_id`, `name` and `breed`.
    pub fn to_summary(&self) -> RepoResult<PetSummary> {
        Ok(PetSummary {
            id: self.require_integer(COLUMN_ID)?,
            name: self
                .get_text(COLUMN_NAME)
                .ok_or_else(|| missing(COLUMN_NAME))?
                .to_string(),
            breed: self.get_text(COLUMN_BREED).map(str::to_string),
        })
    }

    fn require_integer(&self, column: &'static str) -> RepoResult<i64> {
        self.get_integer(column).ok_or_else(|| missing(column))
    }
}

fn missing(column: &str) -> RepoError {
    RepoError::InvalidData(format!("missing or mistyped column `{column}` in pets row"))
}

#[cfg(test)]
mod tests {
    use super::PetCursor;
    use crate::model::fields::FieldValue;
    use crate::schema::Gender;

    fn full_row(id: i64, gender: i64) -> Vec<FieldValue> {
        vec![
            FieldValue::Integer(id),
            FieldValue::Text("Rex".into()),
            FieldValue::Null,
            FieldValue::Integer(gender),
            FieldValue::Integer(12),
        ]
    }

    fn all_columns() -> Vec<String> {
        crate::schema::column_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn cursor_is_read_once() {
        let mut cursor = PetCursor::new(all_columns(), vec![full_row(1, 1), full_row(2, 0)]);
        assert_eq!(cursor.remaining(), 2);
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_some());
        assert!(cursor.next().is_none());
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn row_converts_to_pet_with_nullable_breed() {
        let cursor = PetCursor::new(all_columns(), vec![full_row(7, 1)]);
        let pets = cursor.into_pets().unwrap();
        assert_eq!(pets[0].id, 7);
        assert_eq!(pets[0].breed, None);
        assert_eq!(pets[0].gender, Gender::Male);
    }

    #[test]
    fn out_of_range_gender_is_invalid_data() {
        let cursor = PetCursor::new(all_columns(), vec![full_row(7, 5)]);
        assert!(cursor.into_pets().is_err());
    }

    #[test]
    fn partial_projection_cannot_become_pet() {
        let mut cursor = PetCursor::new(
            vec!["_id".to_string(), "name".to_string()],
            vec![vec![FieldValue::Integer(1), FieldValue::Text("Rex".into())]],
        );
        let row = cursor.next().unwrap();
        assert_eq!(row.get_text("name"), Some("Rex"));
        assert!(row.get("weight").is_none());
        assert!(row.to_pet().is_err());
    }
}

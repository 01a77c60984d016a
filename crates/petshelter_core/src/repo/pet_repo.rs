//! Pet repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Dispatch resource paths to single-table query/insert/update/delete.
//! - Own persistence validation for every write path.
//! - Fire change notifications after successful mutations.
//!
//! # Invariants
//! - Single-row paths always force `_id = <embedded id>` as the filter.
//! - Inserts are only accepted on the collection path.
//! - Notifications fire for every insert and for update/delete only when at
//!   least one row changed.

use crate::db::{DbError, ShelterDb};
use crate::model::fields::{FieldMap, FieldValue};
use crate::model::pet::PetId;
use crate::notify::ChangeNotifier;
use crate::repo::cursor::PetCursor;
use crate::schema::{
    self, Gender, COLUMN_BREED, COLUMN_GENDER, COLUMN_ID, COLUMN_NAME, COLUMN_WEIGHT,
    CONTENT_ITEM_TYPE, CONTENT_LIST_TYPE, TABLE_NAME,
};
use crate::uri::ResourcePath;
use log::{info, warn};
use rusqlite::params_from_iter;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for pet persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Path matches neither the collection nor a single pet.
    UnknownResource(String),
    /// Field map is missing a required column or carries an invalid value.
    InvalidRecord(String),
    /// Projection names a column the pets table does not have.
    UnknownColumn(String),
    /// Storage rejected a write or returned no row id.
    WriteFailed {
        operation: &'static str,
        cause: Option<DbError>,
    },
    /// Backing store could not be opened or created.
    StorageUnavailable(DbError),
    /// Persisted row violates domain invariants.
    InvalidData(String),
    /// Read-side SQLite failure.
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownResource(path) => write!(f, "unknown resource path: {path}"),
            Self::InvalidRecord(message) => write!(f, "invalid pet data: {message}"),
            Self::UnknownColumn(column) => write!(f, "unknown pets column: {column}"),
            Self::WriteFailed {
                operation,
                cause: Some(err),
            } => write!(f, "pet {operation} failed: {err}"),
            Self::WriteFailed {
                operation,
                cause: None,
            } => write!(f, "pet {operation} failed"),
            Self::StorageUnavailable(err) => write!(f, "pet storage unavailable: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted pet data: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WriteFailed {
                cause: Some(err), ..
            } => Some(err),
            Self::StorageUnavailable(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Content classification of a resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    PetList,
    PetItem,
}

impl ResourceType {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::PetList => CONTENT_LIST_TYPE,
            Self::PetItem => CONTENT_ITEM_TYPE,
        }
    }
}

/// Resource-path addressed pet operations.
pub trait PetRepository {
    /// Reads rows; an empty `columns` slice projects every column.
    fn query(
        &self,
        path: &str,
        columns: &[&str],
        filter: Option<&str>,
        filter_args: &[FieldValue],
        sort: Option<&str>,
    ) -> RepoResult<PetCursor>;
    /// Inserts one pet on the collection path and returns its new id.
    fn insert(&self, path: &str, fields: &FieldMap) -> RepoResult<PetId>;
    /// Updates matching rows and returns how many changed.
    fn update(
        &self,
        path: &str,
        fields: &FieldMap,
        filter: Option<&str>,
        filter_args: &[FieldValue],
    ) -> RepoResult<usize>;
    /// Deletes matching rows and returns how many were removed.
    fn delete(&self, path: &str, filter: Option<&str>, filter_args: &[FieldValue])
        -> RepoResult<usize>;
    fn resource_type(&self, path: &str) -> RepoResult<ResourceType>;
}

/// SQLite-backed pet repository.
pub struct SqlitePetRepository<'db> {
    db: &'db ShelterDb,
    notifier: Arc<ChangeNotifier>,
}

impl<'db> SqlitePetRepository<'db> {
    /// Creates a repository with its own, initially empty, notifier.
    pub fn new(db: &'db ShelterDb) -> Self {
        Self::with_notifier(db, Arc::new(ChangeNotifier::new()))
    }

    /// Creates a repository that reports changes to a shared notifier.
    pub fn with_notifier(db: &'db ShelterDb, notifier: Arc<ChangeNotifier>) -> Self {
        Self { db, notifier }
    }

    pub fn notifier(&self) -> &Arc<ChangeNotifier> {
        &self.notifier
    }

    fn write_rows(
        &self,
        operation: &'static str,
        path: &str,
        sql: &str,
        bind_values: &[&FieldValue],
    ) -> RepoResult<usize> {
        let conn = self.db.writable().map_err(RepoError::StorageUnavailable)?;
        conn.execute(sql, params_from_iter(bind_values.iter()))
            .map_err(|err| {
                warn!("event=pet_{operation} module=repo status=error path={path} error={err}");
                RepoError::WriteFailed {
                    operation,
                    cause: Some(err.into()),
                }
            })
    }
}

impl PetRepository for SqlitePetRepository<'_> {
    fn query(
        &self,
        path: &str,
        columns: &[&str],
        filter: Option<&str>,
        filter_args: &[FieldValue],
        sort: Option<&str>,
    ) -> RepoResult<PetCursor> {
        let scope = resolve(path)?;
        let projection = resolve_projection(columns)?;
        let selection = Selection::for_scope(scope, filter, filter_args);

        let mut sql = format!("SELECT {} FROM {TABLE_NAME}", projection.join(", "));
        selection.append_where(&mut sql);
        if let Some(sort) = sort.map(str::trim).filter(|sort| !sort.is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(sort);
        }

        let conn = self.db.readable().map_err(RepoError::StorageUnavailable)?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(selection.args.iter()))?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..projection.len())
                .map(|index| row.get::<_, FieldValue>(index))
                .collect::<Result<Vec<_>, _>>()?;
            collected.push(values);
        }

        Ok(PetCursor::new(
            projection.into_iter().map(str::to_string).collect(),
            collected,
        ))
    }

    fn insert(&self, path: &str, fields: &FieldMap) -> RepoResult<PetId> {
        match resolve(path)? {
            ResourcePath::All => {}
            _ => return Err(RepoError::UnknownResource(path.to_string())),
        }
        let values = validate_insert(fields)?;

        let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {TABLE_NAME} ({}) VALUES ({placeholders});",
            columns.join(", ")
        );
        let bind_values: Vec<&FieldValue> = values.iter().map(|(_, value)| value).collect();

        let id = {
            let conn = self.db.writable().map_err(RepoError::StorageUnavailable)?;
            conn.execute(&sql, params_from_iter(bind_values.iter()))
                .map_err(|err| {
                    warn!("event=pet_insert module=repo status=error error={err}");
                    RepoError::WriteFailed {
                        operation: "insert",
                        cause: Some(err.into()),
                    }
                })?;
            conn.last_insert_rowid()
        };
        if id <= 0 {
            warn!("event=pet_insert module=repo status=error error_code=non_positive_row_id id={id}");
            return Err(RepoError::WriteFailed {
                operation: "insert",
                cause: None,
            });
        }

        info!("event=pet_insert module=repo status=ok id={id}");
        self.notifier.notify_change(&ResourcePath::All);
        Ok(id)
    }

    fn update(
        &self,
        path: &str,
        fields: &FieldMap,
        filter: Option<&str>,
        filter_args: &[FieldValue],
    ) -> RepoResult<usize> {
        let scope = resolve(path)?;
        let values = validate_update(fields)?;
        if values.is_empty() {
            return Ok(0);
        }

        let selection = Selection::for_scope(scope, filter, filter_args);
        let assignments = values
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {TABLE_NAME} SET {assignments}");
        selection.append_where(&mut sql);

        let bind_values: Vec<&FieldValue> = values
            .iter()
            .map(|(_, value)| value)
            .chain(selection.args.iter())
            .collect();
        let changed = self.write_rows("update", path, &sql, &bind_values)?;

        info!("event=pet_update module=repo status=ok path={scope} changed={changed}");
        if changed > 0 {
            self.notifier.notify_change(&scope);
        }
        Ok(changed)
    }

    fn delete(
        &self,
        path: &str,
        filter: Option<&str>,
        filter_args: &[FieldValue],
    ) -> RepoResult<usize> {
        let scope = resolve(path)?;
        let selection = Selection::for_scope(scope, filter, filter_args);
        let mut sql = format!("DELETE FROM {TABLE_NAME}");
        selection.append_where(&mut sql);

        let bind_values: Vec<&FieldValue> = selection.args.iter().collect();
        let changed = self.write_rows("delete", path, &sql, &bind_values)?;

        info!("event=pet_delete module=repo status=ok path={scope} changed={changed}");
        if changed > 0 {
            self.notifier.notify_change(&scope);
        }
        Ok(changed)
    }

    fn resource_type(&self, path: &str) -> RepoResult<ResourceType> {
        match resolve(path)? {
            ResourcePath::All => Ok(ResourceType::PetList),
            _ => Ok(ResourceType::PetItem),
        }
    }
}

/// WHERE clause plus its positional arguments.
struct Selection {
    clause: Option<String>,
    args: Vec<FieldValue>,
}

impl Selection {
    /// Single-row scopes replace whatever filter the caller supplied.
    fn for_scope(scope: ResourcePath, filter: Option<&str>, filter_args: &[FieldValue]) -> Self {
        match scope {
            ResourcePath::One(id) => Self {
                clause: Some(format!("{COLUMN_ID} = ?")),
                args: vec![FieldValue::Integer(id)],
            },
            _ => match filter.map(str::trim).filter(|filter| !filter.is_empty()) {
                Some(filter) => Self {
                    clause: Some(format!("({filter})")),
                    args: filter_args.to_vec(),
                },
                None => Self {
                    clause: None,
                    args: Vec::new(),
                },
            },
        }
    }

    fn append_where(&self, sql: &mut String) {
        if let Some(clause) = &self.clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
    }
}

fn resolve(path: &str) -> RepoResult<ResourcePath> {
    let scope = ResourcePath::classify(path);
    if scope.is_recognized() {
        Ok(scope)
    } else {
        warn!("event=path_resolve module=repo status=error error_code=unknown_resource");
        Err(RepoError::UnknownResource(path.to_string()))
    }
}

fn resolve_projection<'c>(columns: &[&'c str]) -> RepoResult<Vec<&'c str>> {
    if columns.is_empty() {
        return Ok(schema::column_names());
    }
    columns
        .iter()
        .map(|column| match schema::column(column) {
            Some(_) => Ok(*column),
            None => Err(RepoError::UnknownColumn((*column).to_string())),
        })
        .collect()
}

const INSERT_REQUIRED: [&str; 4] = [COLUMN_NAME, COLUMN_BREED, COLUMN_GENDER, COLUMN_WEIGHT];

fn validate_insert(fields: &FieldMap) -> RepoResult<Vec<(&'static str, FieldValue)>> {
    for column in INSERT_REQUIRED {
        if !fields.contains(column) {
            return Err(RepoError::InvalidRecord(format!("`{column}` is required")));
        }
    }
    validate_update(fields)
}

/// Validates every present column and normalizes numeric text to integers.
fn validate_update(fields: &FieldMap) -> RepoResult<Vec<(&'static str, FieldValue)>> {
    fields
        .iter()
        .map(|(column, value)| validate_column(column, value))
        .collect()
}

fn validate_column(column: &str, value: &FieldValue) -> RepoResult<(&'static str, FieldValue)> {
    match column {
        COLUMN_NAME => match value.as_text() {
            Some(name) if !name.trim().is_empty() => Ok((COLUMN_NAME, value.clone())),
            _ => Err(RepoError::InvalidRecord(
                "`name` must be non-empty text".to_string(),
            )),
        },
        COLUMN_BREED => match value {
            FieldValue::Text(_) => Ok((COLUMN_BREED, value.clone())),
            _ => Err(RepoError::InvalidRecord("`breed` must be text".to_string())),
        },
        COLUMN_GENDER => match value.as_integer().and_then(Gender::from_i64) {
            Some(gender) => Ok((COLUMN_GENDER, FieldValue::Integer(gender.as_i64()))),
            None => Err(RepoError::InvalidRecord(format!(
                "`gender` must be 0, 1 or 2, got {value}"
            ))),
        },
        COLUMN_WEIGHT => match value.as_integer() {
            Some(weight) if weight >= 0 => Ok((COLUMN_WEIGHT, FieldValue::Integer(weight))),
            _ => Err(RepoError::InvalidRecord(format!(
                "`weight` must be a non-negative integer, got {value}"
            ))),
        },
        COLUMN_ID => Err(RepoError::InvalidRecord(
            "`_id` is assigned by storage and cannot be written".to_string(),
        )),
        other => Err(RepoError::InvalidRecord(format!("unknown column `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{validate_insert, validate_update, RepoError, ResourceType};
    use crate::model::fields::{FieldMap, FieldValue};

    fn valid_fields() -> FieldMap {
        FieldMap::new()
            .with("name", "Terry")
            .with("breed", "")
            .with("gender", 2)
            .with("weight", 11)
    }

    #[test]
    fn insert_requires_every_domain_column() {
        for column in ["name", "breed", "gender", "weight"] {
            let mut fields = valid_fields();
            fields.remove(column);
            let err = validate_insert(&fields).unwrap_err();
            assert!(matches!(err, RepoError::InvalidRecord(_)), "{column}");
        }
        assert_eq!(validate_insert(&valid_fields()).unwrap().len(), 4);
    }

    #[test]
    fn numeric_text_is_normalized_to_integer() {
        let fields = valid_fields().with("gender", "1").with("weight", " 4 ");
        let values = validate_insert(&fields).unwrap();
        assert!(values.contains(&("gender", FieldValue::Integer(1))));
        assert!(values.contains(&("weight", FieldValue::Integer(4))));
    }

    #[test]
    fn update_rejects_id_and_unknown_columns() {
        let with_id = FieldMap::new().with("_id", 3);
        assert!(matches!(
            validate_update(&with_id),
            Err(RepoError::InvalidRecord(_))
        ));
        let with_owner = FieldMap::new().with("owner", "me");
        assert!(matches!(
            validate_update(&with_owner),
            Err(RepoError::InvalidRecord(_))
        ));
    }

    #[test]
    fn null_and_blank_names_are_rejected() {
        let mut fields = valid_fields();
        fields.put_null("name");
        assert!(validate_insert(&fields).is_err());
        let blank = valid_fields().with("name", "   ");
        assert!(validate_insert(&blank).is_err());
    }

    #[test]
    fn resource_types_map_to_content_types() {
        assert!(ResourceType::PetList.content_type().contains("cursor.dir"));
        assert!(ResourceType::PetItem.content_type().contains("cursor.item"));
    }
}

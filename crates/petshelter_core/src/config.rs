//! Runtime configuration for the pets store.
//!
//! # Responsibility
//! - Resolve where the database file lives and which log level to use.
//!
//! # Invariants
//! - `db_file_name` is a bare file name joined under `data_dir`.

use crate::db::{ShelterDb, StoreLocation};
use crate::logging::default_log_level;
use crate::schema::DATABASE_NAME;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelterConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_db_file_name")]
    pub db_file_name: String,
    #[serde(default = "default_level_string")]
    pub log_level: String,
}

impl ShelterConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_file_name: default_db_file_name(),
            log_level: default_level_string(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn store_location(&self) -> StoreLocation {
        StoreLocation::File(self.db_path())
    }

    /// Builds the lazily opened store; nothing touches disk yet.
    pub fn open_store(&self) -> ShelterDb {
        ShelterDb::new(self.store_location())
    }
}

fn default_db_file_name() -> String {
    DATABASE_NAME.to_string()
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

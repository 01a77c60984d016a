//! Schema creation and version-upgrade hook.
//!
//! # Responsibility
//! - Create the pets table exactly once for a fresh database.
//! - Route older schema versions through the upgrade hook.
//!
//! # Invariants
//! - Applied schema version is mirrored to `PRAGMA user_version`.
//! - Creation and version bump commit atomically.

use crate::db::{DbError, DbResult};
use crate::schema::DATABASE_VERSION;
use log::info;
use rusqlite::Connection;

const CREATE_PETS_SQL: &str = include_str!("0001_pets.sql");

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    DATABASE_VERSION
}

/// Creates or upgrades the schema on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    if current_version == 0 {
        tx.execute_batch(CREATE_PETS_SQL)?;
        info!("event=schema_create module=db status=ok version={latest}");
    } else {
        on_upgrade(&tx, current_version, latest)?;
    }
    tx.execute_batch(&format!("PRAGMA user_version = {latest};"))?;
    tx.commit()?;

    Ok(())
}

/// Upgrade hook for databases created by an older schema version.
///
/// No migrations exist yet; only the version number moves forward.
pub fn on_upgrade(_conn: &Connection, old_version: u32, new_version: u32) -> DbResult<()> {
    info!(
        "event=schema_upgrade module=db status=ok from_version={old_version} to_version={new_version}"
    );
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

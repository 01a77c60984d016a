//! Connection bootstrap and scoped handle acquisition.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas and apply the schema before first use.
//! - Serialize access through scoped read-only / read-write handles.
//!
//! # Invariants
//! - `ShelterDb` opens its connection lazily, at most once.
//! - A `ReadHandle` cannot write: `query_only` is on for its whole lifetime.
//! - Handles release the connection lock when dropped.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{debug, error, info, warn};
use once_cell::sync::OnceCell;
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Opens a SQLite database file and brings its schema up to date.
///
/// Missing parent directories are created.
///
/// # Side effects
/// - Performs connection bootstrap and schema checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();
    info!("event=db_open module=db status=start mode=file");

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_dir_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    }

    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, "file", started_at)
}

/// Opens an in-memory SQLite database with the schema applied.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_open(conn, "memory", started_at)
}

fn finish_open(mut conn: Connection, mode: &str, started_at: Instant) -> DbResult<Connection> {
    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}

/// Where the backing store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Lazily opened pets database.
///
/// The connection is created on the first `readable()`/`writable()` call and
/// kept for the lifetime of this value.
pub struct ShelterDb {
    location: StoreLocation,
    conn: OnceCell<Mutex<Connection>>,
}

impl ShelterDb {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Returns whether the backing connection has been opened yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }

    /// Acquires a read-only handle, opening the store on first use.
    pub fn readable(&self) -> DbResult<ReadHandle<'_>> {
        let conn = self.lock()?;
        conn.execute_batch("PRAGMA query_only = ON;")?;
        Ok(ReadHandle { conn })
    }

    /// Acquires a read-write handle, opening the store on first use.
    pub fn writable(&self) -> DbResult<WriteHandle<'_>> {
        let conn = self.lock()?;
        Ok(WriteHandle { conn })
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        let cell = self.conn.get_or_try_init(|| {
            debug!("event=db_lazy_open module=db status=start");
            let conn = match &self.location {
                StoreLocation::File(path) => open_db(path)?,
                StoreLocation::Memory => open_db_in_memory()?,
            };
            Ok::<_, super::DbError>(Mutex::new(conn))
        })?;
        // A panic while holding the lock leaves the connection itself usable.
        Ok(cell.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Scoped read-only connection handle.
pub struct ReadHandle<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl Deref for ReadHandle<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl Drop for ReadHandle<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.conn.execute_batch("PRAGMA query_only = OFF;") {
            warn!("event=db_release module=db status=error mode=read error={err}");
        }
    }
}

/// Scoped read-write connection handle.
pub struct WriteHandle<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl Deref for WriteHandle<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for WriteHandle<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

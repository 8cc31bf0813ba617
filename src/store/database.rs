//! SQLite-backed Record Store
//!
//! Opens and configures connections to the catalog database. Two kinds of
//! connection exist:
//! - **Writers** (`open_writer`): used by the bulk loader, one per import run.
//! - **Readers** (`open_reader`): handed to the connection pool; they are
//!   `query_only`, so the live search path can never mutate records.
//!
//! Every connection gets the `similarity` function registered before use.

use super::schema::SCHEMA;
use super::trigram;
use crate::pool::pool::ConnectFn;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the schema if it does not exist yet.
    pub fn initialize(&self) -> rusqlite::Result<()> {
        self.open_writer().map(drop)
    }

    /// Read-write connection with the schema in place.
    pub fn open_writer(&self) -> rusqlite::Result<Connection> {
        let conn = self.open()?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Query-only connection for the search path.
    pub fn open_reader(&self) -> rusqlite::Result<Connection> {
        let conn = self.open()?;
        conn.execute_batch("PRAGMA query_only = ON;")?;
        Ok(conn)
    }

    /// Factory handed to [`crate::pool::pool::ConnectionPool`].
    pub fn connect_fn(&self) -> ConnectFn {
        let store = self.clone();
        Arc::new(move || store.open_reader())
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA temp_store = MEMORY;",
        )?;
        trigram::register(&conn)?;
        Ok(conn)
    }
}

pub fn count_records(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT count(*) FROM medicines", [], |row| row.get(0))
}

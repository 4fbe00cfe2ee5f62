//! Student record store: connection bootstrap and schema versioning.
//!
//! # Responsibility
//! - Hand out one configured, fully migrated connection per process.
//! - Report store failures with enough context to tell the operator which
//!   file is at fault.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - No student row is touched before migrations succeed.
//! - A store written by a newer build is never downgraded or modified.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The store file could not be opened or created.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    /// The store carries a schema newer than this build understands.
    SchemaTooNew { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "cannot open record store `{}`: {source}", path.display())
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "record store schema v{found} needs a newer gradebook (this build reads up to v{supported})"
            ),
            Self::Sqlite(err) => write!(f, "record store error: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

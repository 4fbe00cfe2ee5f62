//! Student detail loader.
//!
//! Fetches the complete record for one directory entry on demand. Results
//! are snapshots owned by the caller and never cached here.

use crate::model::student::{Student, StudentId};
use crate::repo::student_repo::{RepoError, StudentRepository};
use log::{error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures from an id-keyed detail fetch.
#[derive(Debug)]
pub enum DetailError {
    /// No row carries the id.
    NotFound(StudentId),
    /// More than one row carries the id.
    DuplicateId { id: StudentId, count: usize },
    /// Store-level failure.
    Repo(RepoError),
}

impl Display for DetailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::DuplicateId { id, count } => {
                write!(f, "student id {id} matches {count} rows; expected exactly one")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DetailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DetailError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Loads the full record for `id`, requiring exactly one matching row.
pub fn load_detail<R>(repo: &R, id: StudentId) -> Result<Student, DetailError>
where
    R: StudentRepository + ?Sized,
{
    let mut rows = repo.find_by_id(id).map_err(|err| {
        error!("event=detail_load module=detail status=error student_id={id} error={err}");
        DetailError::from(err)
    })?;

    match rows.len() {
        1 => Ok(rows.remove(0)),
        0 => {
            warn!(
                "event=detail_load module=detail status=error student_id={id} error_code=not_found"
            );
            Err(DetailError::NotFound(id))
        }
        count => {
            warn!(
                "event=detail_load module=detail status=error student_id={id} error_code=duplicate_id count={count}"
            );
            Err(DetailError::DuplicateId { id, count })
        }
    }
}

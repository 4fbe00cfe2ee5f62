//! Student record store adapter and SQLite implementation.
//!
//! # Responsibility
//! - Provide the six statements the directory, detail loader and mutation
//!   pipeline need against the `student` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every operation is exactly one parameterized statement.
//! - Write paths validate drafts before touching the store.
//! - Prepared statements are scoped to the call and released on every path.

use crate::db::DbError;
use crate::model::student::{
    DirectoryEntry, Student, StudentDraft, StudentId, StudentValidationError,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    address,
    city,
    state,
    zip,
    dob,
    active
FROM student";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    NotFound(StudentId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "record store failure: {err}"),
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted student data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store contract used by the student pipeline.
pub trait StudentRepository {
    /// Lists directory projections ordered by last name, then id.
    ///
    /// With `include_inactive == false` only rows with `active = 1` are read.
    fn list_directory(&self, include_inactive: bool) -> RepoResult<Vec<DirectoryEntry>>;

    /// Returns every row matching `id`.
    ///
    /// Returns a list so callers can detect absent and duplicated ids
    /// instead of silently picking a row.
    fn find_by_id(&self, id: StudentId) -> RepoResult<Vec<Student>>;

    /// Inserts a new active row and returns the store-assigned id.
    fn insert_student(&self, draft: &StudentDraft) -> RepoResult<StudentId>;

    /// Overwrites every editable field of row `id`.
    ///
    /// When `reactivate` is set the same statement also forces `active = 1`;
    /// otherwise the active flag is left untouched.
    fn update_student(&self, id: StudentId, draft: &StudentDraft, reactivate: bool)
        -> RepoResult<()>;

    /// Sets only the active flag of row `id`.
    fn set_active(&self, id: StudentId, active: bool) -> RepoResult<()>;
}

/// SQLite-backed student repository over a borrowed, migrated connection.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository, rejecting connections without the schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'student'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::InvalidData(
                "record store has no `student` table; open it through db::open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn list_directory(&self, include_inactive: bool) -> RepoResult<Vec<DirectoryEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, last_name, first_name, active
             FROM student
             WHERE (?1 = 1 OR active = 1)
             ORDER BY last_name ASC, id ASC;",
        )?;

        let mut rows = stmt.query([bool_to_int(include_inactive)])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(DirectoryEntry {
                id: row.get("id")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
            });
        }

        Ok(entries)
    }

    fn find_by_id(&self, id: StudentId) -> RepoResult<Vec<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn insert_student(&self, draft: &StudentDraft) -> RepoResult<StudentId> {
        draft.validate()?;

        self.conn.execute(
            "INSERT INTO student (
                first_name,
                last_name,
                address,
                city,
                state,
                zip,
                dob,
                active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1);",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.address.as_str(),
                draft.city.as_str(),
                draft.state.as_str(),
                draft.zip.as_str(),
                draft.dob.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_student(
        &self,
        id: StudentId,
        draft: &StudentDraft,
        reactivate: bool,
    ) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE student
             SET
                first_name = ?1,
                last_name = ?2,
                address = ?3,
                city = ?4,
                state = ?5,
                zip = ?6,
                dob = ?7,
                active = CASE WHEN ?8 = 1 THEN 1 ELSE active END
             WHERE id = ?9;",
            params![
                draft.first_name.as_str(),
                draft.last_name.as_str(),
                draft.address.as_str(),
                draft.city.as_str(),
                draft.state.as_str(),
                draft.zip.as_str(),
                draft.dob.as_str(),
                bool_to_int(reactivate),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn set_active(&self, id: StudentId, active: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE student SET active = ?1 WHERE id = ?2;",
            params![bool_to_int(active), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let id: StudentId = row.get("id")?;
    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in student.active for id {id}"
            )));
        }
    };

    Ok(Student {
        id,
        fields: StudentDraft {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            address: row.get("address")?,
            city: row.get("city")?,
            state: row.get("state")?,
            zip: row.get("zip")?,
            dob: row.get("dob")?,
        },
        active,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

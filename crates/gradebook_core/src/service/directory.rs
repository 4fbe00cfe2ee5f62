//! Student directory listing model.
//!
//! # Responsibility
//! - Hold the ordered directory entries currently on screen.
//! - Own the include-inactive filter and the positional selection.
//!
//! # Invariants
//! - After a successful reload the listing exactly reflects the store.
//! - A failed reload leaves listing, filter and selection untouched.
//! - Every successful reload clears the selection.

use crate::model::student::DirectoryEntry;
use crate::repo::student_repo::{RepoResult, StudentRepository};
use log::{error, info};

/// Ordered directory listing with filter and selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryModel {
    entries: Vec<DirectoryEntry>,
    include_inactive: bool,
    selection: Option<usize>,
}

impl DirectoryModel {
    /// Creates an empty active-only listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the listing with a fresh read from `repo`.
    ///
    /// The active-only variant also resets the include-inactive toggle.
    /// Returns the number of entries loaded.
    pub fn reload<R>(&mut self, repo: &R, include_inactive: bool) -> RepoResult<usize>
    where
        R: StudentRepository + ?Sized,
    {
        match repo.list_directory(include_inactive) {
            Ok(entries) => {
                info!(
                    "event=directory_reload module=directory status=ok include_inactive={} count={}",
                    include_inactive,
                    entries.len()
                );
                self.entries = entries;
                self.include_inactive = include_inactive;
                self.selection = None;
                Ok(self.entries.len())
            }
            Err(err) => {
                error!(
                    "event=directory_reload module=directory status=error include_inactive={} kept_count={} error={}",
                    include_inactive,
                    self.entries.len(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Reloads using the current filter.
    pub fn refresh<R>(&mut self, repo: &R) -> RepoResult<usize>
    where
        R: StudentRepository + ?Sized,
    {
        self.reload(repo, self.include_inactive)
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current state of the include-inactive toggle.
    pub fn include_inactive(&self) -> bool {
        self.include_inactive
    }

    /// Selects the entry at `index`.
    ///
    /// Out-of-range indices clear the selection and return `None`.
    pub fn select(&mut self, index: usize) -> Option<&DirectoryEntry> {
        if index < self.entries.len() {
            self.selection = Some(index);
            self.entries.get(index)
        } else {
            self.selection = None;
            None
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Index of the current selection, if any.
    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Entry under the current selection, if any.
    pub fn selected_entry(&self) -> Option<&DirectoryEntry> {
        self.selection.and_then(|index| self.entries.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::DirectoryModel;
    use crate::db::DbError;
    use crate::model::student::{DirectoryEntry, Student, StudentDraft, StudentId};
    use crate::repo::student_repo::{RepoError, RepoResult, StudentRepository};
    use std::cell::Cell;

    struct FixedRepo {
        entries: Vec<DirectoryEntry>,
        fail: Cell<bool>,
    }

    impl StudentRepository for FixedRepo {
        fn list_directory(&self, include_inactive: bool) -> RepoResult<Vec<DirectoryEntry>> {
            if self.fail.get() {
                return Err(RepoError::Db(DbError::Sqlite(
                    rusqlite::Error::InvalidQuery,
                )));
            }
            let take = if include_inactive { self.entries.len() } else { 1 };
            Ok(self.entries.iter().take(take).cloned().collect())
        }

        fn find_by_id(&self, _id: StudentId) -> RepoResult<Vec<Student>> {
            Ok(Vec::new())
        }

        fn insert_student(&self, _draft: &StudentDraft) -> RepoResult<StudentId> {
            unreachable!("directory tests never write")
        }

        fn update_student(&self, _: StudentId, _: &StudentDraft, _: bool) -> RepoResult<()> {
            unreachable!("directory tests never write")
        }

        fn set_active(&self, _: StudentId, _: bool) -> RepoResult<()> {
            unreachable!("directory tests never write")
        }
    }

    fn entry(id: StudentId, first: &str, last: &str) -> DirectoryEntry {
        DirectoryEntry {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn repo() -> FixedRepo {
        FixedRepo {
            entries: vec![entry(1, "Jane", "Doe"), entry(2, "Richard", "Roe")],
            fail: Cell::new(false),
        }
    }

    #[test]
    fn reload_replaces_entries_and_clears_selection() {
        let repo = repo();
        let mut model = DirectoryModel::new();

        assert_eq!(model.reload(&repo, true).unwrap(), 2);
        assert!(model.select(1).is_some());
        assert_eq!(model.selection(), Some(1));

        assert_eq!(model.reload(&repo, false).unwrap(), 1);
        assert_eq!(model.selection(), None);
        assert!(!model.include_inactive());
    }

    #[test]
    fn failed_reload_keeps_previous_listing_filter_and_selection() {
        let repo = repo();
        let mut model = DirectoryModel::new();
        model.reload(&repo, true).unwrap();
        model.select(0);

        repo.fail.set(true);
        assert!(model.reload(&repo, false).is_err());
        assert_eq!(model.len(), 2);
        assert!(model.include_inactive());
        assert_eq!(model.selected_entry().map(|e| e.id), Some(1));
    }

    #[test]
    fn select_out_of_range_clears_selection() {
        let repo = repo();
        let mut model = DirectoryModel::new();
        model.reload(&repo, true).unwrap();
        model.select(0);

        assert!(model.select(5).is_none());
        assert_eq!(model.selection(), None);
        assert!(model.selected_entry().is_none());
    }
}

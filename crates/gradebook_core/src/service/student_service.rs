//! Student directory and mutation pipeline service.
//!
//! # Responsibility
//! - Own the directory listing, selection, detail snapshot and open forms.
//! - Run create/edit/delete/reactivate as prompt -> one write -> reload.
//!
//! # Invariants
//! - Declining a prompt performs no write.
//! - Edit and delete always act on a fresh re-fetch, never on the listing.
//! - Each mutation issues exactly one write statement.
//! - After a committed write the directory reloads with the current filter.
//!
//! Between the re-fetch and the write there is no surrounding transaction;
//! the store is assumed to have a single operator.

use crate::model::student::{
    DirectoryEntry, Student, StudentDraft, StudentId, StudentValidationError,
};
use crate::repo::student_repo::{RepoError, StudentRepository};
use crate::service::confirm::{
    Confirm, ADD_STUDENT_PROMPT, DELETE_STUDENT_PROMPT, MODIFY_AND_REACTIVATE_PROMPT,
    MODIFY_STUDENT_PROMPT, REACTIVATE_STUDENT_PROMPT,
};
use crate::service::detail::{load_detail, DetailError};
use crate::service::directory::DirectoryModel;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which form an operation expected to be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Create,
    Edit,
}

/// Errors from student service operations.
#[derive(Debug)]
pub enum StudentServiceError {
    /// Edit/delete/reactivate invoked with nothing selected.
    NoSelection,
    /// Selection index does not address a listed entry.
    SelectionOutOfRange { index: usize, len: usize },
    /// Selected id no longer resolves to a row.
    StudentNotFound(StudentId),
    /// Selected id resolves to several rows.
    DuplicateStudentId { id: StudentId, count: usize },
    /// Form payload failed validation; the form stays open.
    Validation(StudentValidationError),
    /// Submit/cancel invoked without the matching form open.
    NoOpenForm(FormKind),
    /// Store failure; nothing was committed by this call.
    Repo(RepoError),
    /// The write for `committed` succeeded but the directory reload failed.
    RefreshFailed {
        committed: StudentId,
        source: RepoError,
    },
}

impl Display for StudentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "no student is selected"),
            Self::SelectionOutOfRange { index, len } => write!(
                f,
                "selection {index} is out of range for a directory of {len} entries"
            ),
            Self::StudentNotFound(id) => write!(f, "student not found: {id}"),
            Self::DuplicateStudentId { id, count } => {
                write!(f, "student id {id} matches {count} rows; expected exactly one")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoOpenForm(FormKind::Create) => write!(f, "no student creation form is open"),
            Self::NoOpenForm(FormKind::Edit) => write!(f, "no student edit form is open"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::RefreshFailed { committed, source } => write!(
                f,
                "change to student {committed} was saved but the directory could not be reloaded: {source}"
            ),
        }
    }
}

impl Error for StudentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::RefreshFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for StudentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::StudentNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<DetailError> for StudentServiceError {
    fn from(value: DetailError) -> Self {
        match value {
            DetailError::NotFound(id) => Self::StudentNotFound(id),
            DetailError::DuplicateId { id, count } => Self::DuplicateStudentId { id, count },
            DetailError::Repo(err) => Self::Repo(err),
        }
    }
}

impl From<StudentValidationError> for StudentServiceError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Controls the side effects of a full-record edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPolicy {
    /// When set, a confirmed edit also forces `active = true`.
    ///
    /// Defaults to `true`, so editing an inactive student brings it back.
    pub reactivate_on_edit: bool,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            reactivate_on_edit: true,
        }
    }
}

/// Open edit form: target id plus the editable draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    pub id: StudentId,
    /// Active flag of the snapshot the form was opened from.
    pub was_active: bool,
    pub draft: StudentDraft,
}

/// Result of a confirm-gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// The operator confirmed and the write committed.
    Applied(T),
    /// The operator declined; nothing was written.
    Declined,
}

impl<T> MutationOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Student use-case service over a repository and a confirmation boundary.
pub struct StudentService<R: StudentRepository, C: Confirm> {
    repo: R,
    confirm: C,
    policy: EditPolicy,
    directory: DirectoryModel,
    detail: Option<Student>,
    create_form: Option<StudentDraft>,
    edit_form: Option<EditForm>,
}

impl<R: StudentRepository, C: Confirm> StudentService<R, C> {
    /// Creates a service with an empty directory and no open forms.
    pub fn new(repo: R, confirm: C, policy: EditPolicy) -> Self {
        Self {
            repo,
            confirm,
            policy,
            directory: DirectoryModel::new(),
            detail: None,
            create_form: None,
            edit_form: None,
        }
    }

    pub fn policy(&self) -> EditPolicy {
        self.policy
    }

    pub fn directory(&self) -> &DirectoryModel {
        &self.directory
    }

    /// Detail snapshot of the last loaded selection.
    pub fn detail(&self) -> Option<&Student> {
        self.detail.as_ref()
    }

    pub fn create_form(&self) -> Option<&StudentDraft> {
        self.create_form.as_ref()
    }

    pub fn create_form_mut(&mut self) -> Option<&mut StudentDraft> {
        self.create_form.as_mut()
    }

    pub fn edit_form(&self) -> Option<&EditForm> {
        self.edit_form.as_ref()
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut EditForm> {
        self.edit_form.as_mut()
    }

    /// Reloads the directory with an explicit filter.
    ///
    /// The detail snapshot is dropped on success because the selection it
    /// belonged to is gone.
    pub fn reload_directory(
        &mut self,
        include_inactive: bool,
    ) -> Result<usize, StudentServiceError> {
        let count = self.directory.reload(&self.repo, include_inactive)?;
        self.detail = None;
        Ok(count)
    }

    /// Reloads the directory with the current filter.
    pub fn refresh_directory(&mut self) -> Result<usize, StudentServiceError> {
        self.reload_directory(self.directory.include_inactive())
    }

    /// Selects a directory entry by position.
    pub fn select(&mut self, index: usize) -> Result<&DirectoryEntry, StudentServiceError> {
        let len = self.directory.len();
        self.detail = None;
        self.directory
            .select(index)
            .ok_or(StudentServiceError::SelectionOutOfRange { index, len })
    }

    /// Loads and keeps the detail snapshot for the current selection.
    ///
    /// On failure the previous snapshot is kept.
    pub fn load_selected_detail(&mut self) -> Result<&Student, StudentServiceError> {
        let id = self.selected_id()?;
        let student = load_detail(&self.repo, id)?;
        Ok(&*self.detail.insert(student))
    }

    /// Opens the creation form, keeping an already open draft.
    pub fn open_create_form(&mut self) -> &mut StudentDraft {
        self.create_form.get_or_insert_with(StudentDraft::default)
    }

    /// Closes the creation form without writing.
    pub fn cancel_create(&mut self) -> Result<(), StudentServiceError> {
        self.create_form
            .take()
            .map(|_| ())
            .ok_or(StudentServiceError::NoOpenForm(FormKind::Create))
    }

    /// Submits the creation form.
    ///
    /// Confirmed: inserts an active row, closes the form and reloads.
    /// Declined or failed: the form stays open for further edits.
    pub fn submit_create(&mut self) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        let draft = self
            .create_form
            .as_ref()
            .ok_or(StudentServiceError::NoOpenForm(FormKind::Create))?
            .normalized();
        draft.validate()?;

        if !self.confirm.confirm(ADD_STUDENT_PROMPT) {
            info!("event=student_create module=service status=declined");
            return Ok(MutationOutcome::Declined);
        }

        let id = self.repo.insert_student(&draft).map_err(|err| {
            error!("event=student_create module=service status=error error={err}");
            StudentServiceError::from(err)
        })?;
        info!("event=student_create module=service status=ok student_id={id}");

        self.create_form = None;
        self.finish_mutation(id)
    }

    /// Re-fetches the selected student and opens the edit form with it.
    ///
    /// The detail snapshot is replaced with the fresh copy.
    pub fn begin_edit(&mut self) -> Result<&EditForm, StudentServiceError> {
        let student = self.refetch_selected()?;
        let form = EditForm {
            id: student.id,
            was_active: student.active,
            draft: student.fields.clone(),
        };
        self.detail = Some(student);
        Ok(&*self.edit_form.insert(form))
    }

    /// Closes the edit form without prompting or writing.
    pub fn cancel_edit(&mut self) -> Result<(), StudentServiceError> {
        self.edit_form
            .take()
            .map(|_| ())
            .ok_or(StudentServiceError::NoOpenForm(FormKind::Edit))
    }

    /// Submits the edit form.
    ///
    /// Invalid drafts keep the form open without prompting. Once the prompt
    /// is answered the form closes either way.
    pub fn submit_edit(&mut self) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        let form = self
            .edit_form
            .as_ref()
            .ok_or(StudentServiceError::NoOpenForm(FormKind::Edit))?;
        let id = form.id;
        let draft = form.draft.normalized();
        draft.validate()?;

        let reactivate = self.policy.reactivate_on_edit;
        let prompt = if reactivate {
            MODIFY_AND_REACTIVATE_PROMPT
        } else {
            MODIFY_STUDENT_PROMPT
        };
        let confirmed = self.confirm.confirm(prompt);
        self.edit_form = None;

        if !confirmed {
            info!("event=student_edit module=service status=declined student_id={id}");
            return Ok(MutationOutcome::Declined);
        }

        self.repo
            .update_student(id, &draft, reactivate)
            .map_err(|err| {
                error!(
                    "event=student_edit module=service status=error student_id={id} error={err}"
                );
                StudentServiceError::from(err)
            })?;
        info!(
            "event=student_edit module=service status=ok student_id={id} reactivate={reactivate}"
        );

        self.finish_mutation(id)
    }

    /// Soft-deletes the selected student after confirmation.
    ///
    /// Only the active flag changes; the row stays in the store.
    pub fn delete_selected(&mut self) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        self.set_selected_active(false, DELETE_STUDENT_PROMPT, "student_delete")
    }

    /// Reactivates the selected student after confirmation.
    pub fn reactivate_selected(
        &mut self,
    ) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        self.set_selected_active(true, REACTIVATE_STUDENT_PROMPT, "student_reactivate")
    }

    /// Drops selection, detail and forms; used when the directory is left.
    pub fn reset_view(&mut self) {
        self.directory.clear_selection();
        self.detail = None;
        self.create_form = None;
        self.edit_form = None;
    }

    fn set_selected_active(
        &mut self,
        active: bool,
        prompt: &str,
        event: &'static str,
    ) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        let student = self.refetch_selected()?;
        let id = student.id;
        let shown = &*self.detail.insert(student);

        if !self.confirm.confirm_record(prompt, shown) {
            info!("event={event} module=service status=declined student_id={id}");
            return Ok(MutationOutcome::Declined);
        }

        self.repo.set_active(id, active).map_err(|err| {
            error!("event={event} module=service status=error student_id={id} error={err}");
            StudentServiceError::from(err)
        })?;
        info!("event={event} module=service status=ok student_id={id}");

        self.finish_mutation(id)
    }

    fn selected_id(&self) -> Result<StudentId, StudentServiceError> {
        self.directory
            .selected_entry()
            .map(|entry| entry.id)
            .ok_or(StudentServiceError::NoSelection)
    }

    fn refetch_selected(&self) -> Result<Student, StudentServiceError> {
        let id = self.selected_id()?;
        Ok(load_detail(&self.repo, id)?)
    }

    fn finish_mutation(
        &mut self,
        id: StudentId,
    ) -> Result<MutationOutcome<StudentId>, StudentServiceError> {
        self.detail = None;
        self.directory.clear_selection();
        match self.directory.refresh(&self.repo) {
            Ok(_) => Ok(MutationOutcome::Applied(id)),
            Err(source) => Err(StudentServiceError::RefreshFailed {
                committed: id,
                source,
            }),
        }
    }
}

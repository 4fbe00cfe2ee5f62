//! Yes/no confirmation boundary for mutating operations.
//!
//! # Invariants
//! - Every mutation asks exactly one prompt before writing.
//! - A `false` answer must leave the store untouched.
//! - Record-level prompts receive the freshly fetched record the write will
//!   act on, so it can be shown before the question.

use crate::model::student::Student;

/// Prompt shown before inserting a new student.
pub const ADD_STUDENT_PROMPT: &str = "Are you sure you want to add this student?";
/// Prompt shown before an edit that also reactivates the student.
pub const MODIFY_AND_REACTIVATE_PROMPT: &str =
    "Are you sure you want to modify the student record? This will activate inactive students.";
/// Prompt shown before an edit that leaves the active flag alone.
pub const MODIFY_STUDENT_PROMPT: &str = "Are you sure you want to modify the student record?";
/// Prompt shown before soft-deleting a student.
pub const DELETE_STUDENT_PROMPT: &str = "Are you sure you want to delete this student?";
/// Prompt shown before reactivating a student.
pub const REACTIVATE_STUDENT_PROMPT: &str = "Are you sure you want to reactivate this student?";

/// Asks the operator a yes/no question.
pub trait Confirm {
    /// Returns `true` only when the operator explicitly agreed.
    fn confirm(&mut self, prompt: &str) -> bool;

    /// Asks about a write that targets `student`.
    ///
    /// Implementations that can display records show it before asking.
    fn confirm_record(&mut self, prompt: &str, _student: &Student) -> bool {
        self.confirm(prompt)
    }
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt with a fixed decision.
///
/// Used for non-interactive runs (`--yes`) and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

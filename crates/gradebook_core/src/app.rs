//! Application controller.
//!
//! # Responsibility
//! - Own navigation state and the student service in one object.
//! - Run on-enter actions and scope student operations to the directory.
//!
//! # Invariants
//! - Entering the student directory reloads it active-only.
//! - Leaving the student directory drops selection, detail and open forms.
//! - Student operations are rejected unless the directory is visible.

use crate::navigation::{EnterAction, Navigator, Screen};
use crate::repo::student_repo::StudentRepository;
use crate::service::confirm::Confirm;
use crate::service::student_service::{EditPolicy, StudentService, StudentServiceError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors surfaced by controller operations.
#[derive(Debug)]
pub enum AppError {
    /// Operation needs a screen other than the visible one.
    WrongScreen { required: Screen, current: Screen },
    /// Student pipeline failure.
    Student(StudentServiceError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongScreen { required, current } => write!(
                f,
                "this action needs the `{required}` screen; `{current}` is visible"
            ),
            Self::Student(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Student(err) => Some(err),
            Self::WrongScreen { .. } => None,
        }
    }
}

impl From<StudentServiceError> for AppError {
    fn from(value: StudentServiceError) -> Self {
        Self::Student(value)
    }
}

/// Single owner of all UI state.
pub struct Gradebook<R: StudentRepository, C: Confirm> {
    navigator: Navigator,
    students: StudentService<R, C>,
}

impl<R: StudentRepository, C: Confirm> Gradebook<R, C> {
    /// Creates a controller showing the home screen.
    pub fn new(repo: R, confirm: C, policy: EditPolicy) -> Self {
        Self {
            navigator: Navigator::new(),
            students: StudentService::new(repo, confirm, policy),
        }
    }

    pub fn current_screen(&self) -> Screen {
        self.navigator.current()
    }

    /// Shows `screen` and runs its on-enter action.
    ///
    /// The screen switch always happens; an `Err` reports a failed on-enter
    /// reload, in which case the directory keeps its previous listing.
    pub fn show(&mut self, screen: Screen) -> Result<(), AppError> {
        let previous = self.navigator.current();
        let action = self.navigator.show(screen);
        if previous == screen {
            return Ok(());
        }

        info!("event=navigate module=app status=ok from={previous} to={screen}");
        if previous == Screen::StudentDirectory {
            self.students.reset_view();
        }
        if let Some(EnterAction::ReloadDirectory) = action {
            self.students.reload_directory(false)?;
        }
        Ok(())
    }

    /// Read access to the student service from any screen.
    pub fn students(&self) -> &StudentService<R, C> {
        &self.students
    }

    /// Mutable access to the student service; requires the directory screen.
    pub fn students_mut(&mut self) -> Result<&mut StudentService<R, C>, AppError> {
        let current = self.navigator.current();
        if current != Screen::StudentDirectory {
            return Err(AppError::WrongScreen {
                required: Screen::StudentDirectory,
                current,
            });
        }
        Ok(&mut self.students)
    }
}

//! Core logic for the gradebook student records tool.
//! This crate owns navigation, the student directory and every student write.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod repo;
pub mod service;

pub use app::{AppError, Gradebook};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, parse_log_level, LogTarget};
pub use model::student::{
    DirectoryEntry, Student, StudentDraft, StudentField, StudentId, StudentValidationError,
};
pub use navigation::{EnterAction, Navigator, Screen, UnknownScreen};
pub use repo::student_repo::{RepoError, RepoResult, SqliteStudentRepository, StudentRepository};
pub use service::confirm::{AutoConfirm, Confirm};
pub use service::detail::{load_detail, DetailError};
pub use service::directory::DirectoryModel;
pub use service::student_service::{
    EditForm, EditPolicy, FormKind, MutationOutcome, StudentService, StudentServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Record store adapter layer.
//!
//! # Responsibility
//! - Define the data access contract the student pipeline depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   store transport errors.

pub mod student_repo;

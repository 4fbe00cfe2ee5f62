//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into directory, detail and mutation flows.
//! - Keep UI layers decoupled from storage details.

pub mod confirm;
pub mod detail;
pub mod directory;
pub mod student_service;

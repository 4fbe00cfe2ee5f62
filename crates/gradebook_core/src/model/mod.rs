//! Student domain model.
//!
//! # Invariants
//! - Every student is identified by a store-assigned `StudentId`.
//! - Deletion is represented by the `active` flag, not by removing rows.

pub mod student;

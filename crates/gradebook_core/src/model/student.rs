//! Student domain model.
//!
//! # Responsibility
//! - Define the full student record, the editable draft and the directory
//!   projection used for listing.
//! - Provide draft normalization and validation shared by create/edit paths.
//!
//! # Invariants
//! - `id` is assigned by the record store and never changes.
//! - `active == false` is the soft-delete tombstone; rows are never removed.
//! - A `Student` value is a snapshot, never a live view of the row.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Store-assigned student identifier.
pub type StudentId = i64;

/// Editable student fields, without identity or lifecycle state.
///
/// Used as the payload of both the creation form and the edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    /// Free text; no date format is enforced.
    pub dob: String,
}

/// Full student record as read from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(flatten)]
    pub fields: StudentDraft,
    /// Soft-delete marker. `false` means logically deleted.
    pub active: bool,
}

/// Minimal projection shown in the student directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
}

/// Editable field selector, used by form editing surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    FirstName,
    LastName,
    Address,
    City,
    State,
    Zip,
    Dob,
}

/// Validation failures for student drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentValidationError {
    BlankFirstName,
    BlankLastName,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFirstName => write!(f, "first name must not be blank"),
            Self::BlankLastName => write!(f, "last name must not be blank"),
        }
    }
}

impl Error for StudentValidationError {}

impl StudentDraft {
    /// Creates a draft with names only; contact fields start empty.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }

    /// Checks the fields the directory depends on.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(StudentValidationError::BlankFirstName);
        }
        if self.last_name.trim().is_empty() {
            return Err(StudentValidationError::BlankLastName);
        }
        Ok(())
    }

    /// Returns a copy with every field trimmed and name whitespace collapsed.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: collapse_whitespace(&self.first_name),
            last_name: collapse_whitespace(&self.last_name),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip: self.zip.trim().to_string(),
            dob: self.dob.trim().to_string(),
        }
    }

    /// Replaces one field value.
    pub fn set(&mut self, field: StudentField, value: impl Into<String>) {
        let value = value.into();
        match field {
            StudentField::FirstName => self.first_name = value,
            StudentField::LastName => self.last_name = value,
            StudentField::Address => self.address = value,
            StudentField::City => self.city = value,
            StudentField::State => self.state = value,
            StudentField::Zip => self.zip = value,
            StudentField::Dob => self.dob = value,
        }
    }

    /// Reads one field value.
    pub fn get(&self, field: StudentField) -> &str {
        match field {
            StudentField::FirstName => &self.first_name,
            StudentField::LastName => &self.last_name,
            StudentField::Address => &self.address,
            StudentField::City => &self.city,
            StudentField::State => &self.state,
            StudentField::Zip => &self.zip,
            StudentField::Dob => &self.dob,
        }
    }
}

impl Student {
    /// Projects this record into a directory entry.
    pub fn directory_entry(&self) -> DirectoryEntry {
        DirectoryEntry {
            id: self.id,
            first_name: self.fields.first_name.clone(),
            last_name: self.fields.last_name.clone(),
        }
    }
}

impl StudentField {
    /// All editable fields in form order.
    pub const ALL: [StudentField; 7] = [
        Self::FirstName,
        Self::LastName,
        Self::Address,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Dob,
    ];

    /// Stable field name, matching the store column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
            Self::Dob => "dob",
        }
    }

    /// Parses a field name; accepts the column name or a short alias.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_name" | "first" => Some(Self::FirstName),
            "last_name" | "last" => Some(Self::LastName),
            "address" => Some(Self::Address),
            "city" => Some(Self::City),
            "state" => Some(Self::State),
            "zip" => Some(Self::Zip),
            "dob" => Some(Self::Dob),
            _ => None,
        }
    }
}

fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value.trim(), " ").into_owned()
}

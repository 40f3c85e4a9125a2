//! # Storage Traits
//!
//! Storage abstraction used by the domain layer so the reconciliation service
//! can run against any document store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::storage::document::{AttendanceDocument, FieldViolation};

/// A document together with its persistence metadata
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub document: AttendanceDocument,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// The document breaks the stored schema; nothing was written
    #[error("Attendance document failed schema validation ({} field(s))", .0.len())]
    Schema(Vec<FieldViolation>),

    /// Another writer changed the record after it was read; nothing was written
    #[error("Attendance for student {student_id} was modified concurrently")]
    Conflict { student_id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored attendance document is unreadable: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl PersistenceError {
    /// Machine-readable code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            PersistenceError::Schema(_) => "schema_validation_failed",
            PersistenceError::Conflict { .. } => "concurrent_modification",
            PersistenceError::Database(_) | PersistenceError::Encoding(_) => "storage_error",
        }
    }
}

/// Trait defining the interface for attendance document storage
#[async_trait]
pub trait AttendanceStorage: Send + Sync {
    /// Retrieve the document of one student
    async fn get_attendance(&self, student_id: &str) -> Result<Option<StoredDocument>, PersistenceError>;

    /// Write a document.
    ///
    /// `expected_version` is `None` when the caller saw no stored document, in
    /// which case the write must create it. Otherwise the write only succeeds
    /// while the stored version still equals `expected_version`.
    async fn save_attendance(
        &self,
        document: &AttendanceDocument,
        expected_version: Option<i64>,
    ) -> Result<StoredDocument, PersistenceError>;

    /// Delete every document of a student, returning how many were removed
    async fn delete_attendance(&self, student_id: &str) -> Result<u64, PersistenceError>;

    /// Student ids of every stored document, in ascending order
    async fn list_student_ids(&self) -> Result<Vec<String>, PersistenceError>;
}

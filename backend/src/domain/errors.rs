//! Error types returned by the reconciliation service.

use crate::domain::subject_validator::InvalidSubject;
use crate::storage::traits::PersistenceError;

/// A submission whose top-level shape is unusable
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmissionShapeError {
    #[error("Student ID is missing")]
    MissingStudentId,
    #[error("Semester field is missing")]
    MissingSemester,
    #[error("Semester {0} is not a valid semester number")]
    InvalidSemester(i64),
    #[error("Month field is missing")]
    MissingMonth,
    #[error("Month {0} is not a valid month number")]
    InvalidMonth(i64),
    #[error("Subjects field is missing")]
    MissingSubjects,
    #[error("Empty subjects array")]
    EmptySubjects,
    #[error("Request body is not valid attendance data")]
    MalformedBody(String),
}

impl SubmissionShapeError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmissionShapeError::MissingStudentId => "missing_student_id",
            SubmissionShapeError::MissingSemester => "missing_semester",
            SubmissionShapeError::InvalidSemester(_) => "invalid_semester",
            SubmissionShapeError::MissingMonth => "missing_month",
            SubmissionShapeError::InvalidMonth(_) => "invalid_month",
            SubmissionShapeError::MissingSubjects => "missing_subjects",
            SubmissionShapeError::EmptySubjects => "empty_subjects",
            SubmissionShapeError::MalformedBody(_) => "malformed_body",
        }
    }

    /// Hint telling the client how to fix the request
    pub fn details(&self) -> String {
        match self {
            SubmissionShapeError::MissingStudentId => {
                "The studentId parameter is required in the URL".to_string()
            }
            SubmissionShapeError::MissingSemester => {
                "Request body must include 'semester' field with a valid semester number".to_string()
            }
            SubmissionShapeError::InvalidSemester(_) => {
                "The 'semester' field must be a positive integer".to_string()
            }
            SubmissionShapeError::MissingMonth => {
                "Request body must include 'month' field with a valid month number (1-12)".to_string()
            }
            SubmissionShapeError::InvalidMonth(_) => {
                "The 'month' field must be a month number between 1 and 12".to_string()
            }
            SubmissionShapeError::MissingSubjects => {
                "Request body must include 'subjects' array with attendance data".to_string()
            }
            SubmissionShapeError::EmptySubjects => {
                "At least one subject is required in the subjects array".to_string()
            }
            SubmissionShapeError::MalformedBody(reason) => reason.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error(transparent)]
    Shape(#[from] SubmissionShapeError),

    #[error("Invalid subject data found")]
    InvalidSubjects(Vec<InvalidSubject>),

    #[error("No valid subjects found in the provided data")]
    NoValidSubjects,

    #[error("Attendance not found for student {0}")]
    NotFound(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_errors_have_distinct_codes() {
        let errors = [
            SubmissionShapeError::MissingStudentId,
            SubmissionShapeError::MissingSemester,
            SubmissionShapeError::InvalidSemester(0),
            SubmissionShapeError::MissingMonth,
            SubmissionShapeError::InvalidMonth(13),
            SubmissionShapeError::MissingSubjects,
            SubmissionShapeError::EmptySubjects,
            SubmissionShapeError::MalformedBody("bad".to_string()),
        ];

        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_shape_error_is_transparent() {
        let error = ReconciliationError::from(SubmissionShapeError::InvalidMonth(13));
        assert_eq!(error.to_string(), "Month 13 is not a valid month number");
    }
}

//! Structural and numeric validation of submitted subject rows.
//!
//! Every rule is evaluated for every subject so a client gets the complete
//! list of problems in one response. A single invalid subject rejects the
//! whole submission.

use crate::domain::models::SubjectSubmission;

/// A rule violated by one submitted subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubjectViolation {
    #[error("missing subjectName")]
    MissingSubjectName,
    #[error("missing attendedClasses")]
    MissingAttendedClasses,
    #[error("missing totalClasses")]
    MissingTotalClasses,
    #[error("attendedClasses cannot be negative")]
    NegativeAttended,
    #[error("totalClasses cannot be negative")]
    NegativeTotal,
    #[error("attendedClasses cannot be greater than totalClasses")]
    AttendedExceedsTotal,
}

impl SubjectViolation {
    /// Machine-readable code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            SubjectViolation::MissingSubjectName => "missing_subject_name",
            SubjectViolation::MissingAttendedClasses => "missing_attended_classes",
            SubjectViolation::MissingTotalClasses => "missing_total_classes",
            SubjectViolation::NegativeAttended => "negative_attended",
            SubjectViolation::NegativeTotal => "negative_total",
            SubjectViolation::AttendedExceedsTotal => "attended_exceeds_total",
        }
    }
}

/// A submitted subject together with everything wrong with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSubject {
    /// 1-based position in the submission
    pub index: usize,
    pub subject_name: String,
    pub subject_code: String,
    pub violations: Vec<SubjectViolation>,
}

pub struct SubjectValidator;

impl SubjectValidator {
    /// Check one subject. The returned violations are in rule order.
    pub fn validate(subject: &SubjectSubmission) -> Vec<SubjectViolation> {
        let mut violations = Vec::new();

        if subject.name().is_none() {
            violations.push(SubjectViolation::MissingSubjectName);
        }
        if subject.attended_classes.is_none() {
            violations.push(SubjectViolation::MissingAttendedClasses);
        }
        if subject.total_classes.is_none() {
            violations.push(SubjectViolation::MissingTotalClasses);
        }
        if matches!(subject.attended_classes, Some(a) if a < 0) {
            violations.push(SubjectViolation::NegativeAttended);
        }
        if matches!(subject.total_classes, Some(t) if t < 0) {
            violations.push(SubjectViolation::NegativeTotal);
        }
        if let (Some(attended), Some(total)) = (subject.attended_classes, subject.total_classes) {
            if attended > total {
                violations.push(SubjectViolation::AttendedExceedsTotal);
            }
        }

        violations
    }

    /// Check a whole batch, returning one entry per offending subject
    pub fn validate_all(subjects: &[SubjectSubmission]) -> Vec<InvalidSubject> {
        subjects
            .iter()
            .enumerate()
            .filter_map(|(index, subject)| {
                let violations = Self::validate(subject);
                if violations.is_empty() {
                    return None;
                }
                Some(InvalidSubject {
                    index: index + 1,
                    subject_name: subject.name().unwrap_or("Unknown").to_string(),
                    subject_code: subject.code().unwrap_or("Not provided").to_string(),
                    violations,
                })
            })
            .collect()
    }
}

use axum::http::StatusCode;

use crate::domain::commands::attendance::{
    CleanupAttendanceResult, DeleteAttendanceResult, GetAttendanceResult, SubmitAttendanceCommand,
    SubmitAttendanceResult,
};
use crate::domain::errors::{ReconciliationError, SubmissionShapeError};
use crate::domain::models::{
    StoredAttendance, SubjectEntry, SubjectSubmission as DomainSubjectSubmission,
};
use crate::domain::subject_validator::InvalidSubject as DomainInvalidSubject;
use crate::storage::document::FieldViolation;
use crate::storage::traits::PersistenceError;
use shared::{
    AttendanceData, AttendanceRecord as SharedAttendanceRecord, CleanupAttendanceResponse,
    DeleteAttendanceResponse, ErrorContext, ErrorResponse, FieldValidationError, GetAttendanceResponse,
    InvalidSubject as SharedInvalidSubject, MonthAttendance, RecordCleanupFailure, RecordCleanupReport,
    SemesterAttendance,
    SubjectAttendance, SubjectSubmission as SharedSubjectSubmission, SubmitAttendanceData,
    SubmitAttendanceRequest, SubmitAttendanceResponse,
};

const SUCCESS: &str = "success";

pub struct AttendanceMapper;

impl AttendanceMapper {
    /// Convert a request body into a submission command, checking its shape
    pub fn to_submit_command(
        student_id: &str,
        request: SubmitAttendanceRequest,
    ) -> Result<SubmitAttendanceCommand, SubmissionShapeError> {
        let subjects = request
            .subjects
            .map(|subjects| subjects.into_iter().map(Self::to_domain_subject).collect());
        SubmitAttendanceCommand::parse(student_id, request.semester, request.month, subjects)
    }

    pub fn to_domain_subject(dto: SharedSubjectSubmission) -> DomainSubjectSubmission {
        DomainSubjectSubmission {
            code: dto.subject_code,
            name: dto.subject_name,
            attended_classes: dto.attended_classes,
            total_classes: dto.total_classes,
        }
    }

    /// Convert a stored domain record to the nested DTO
    pub fn to_dto(stored: StoredAttendance) -> SharedAttendanceRecord {
        let semesters = stored
            .record
            .semesters
            .into_iter()
            .map(|(semester, semester_record)| SemesterAttendance {
                semester,
                months: semester_record
                    .months
                    .into_iter()
                    .map(|(month, month_record)| MonthAttendance {
                        month: u32::from(month),
                        subjects: month_record.subjects.into_iter().map(Self::to_subject_dto).collect(),
                        overall_attendance: month_record.overall_attendance,
                    })
                    .collect(),
            })
            .collect();

        SharedAttendanceRecord {
            student_id: stored.record.student_id,
            semesters,
            created_at: stored.created_at.to_rfc3339(),
            updated_at: stored.updated_at.to_rfc3339(),
        }
    }

    fn to_subject_dto(entry: SubjectEntry) -> SubjectAttendance {
        SubjectAttendance {
            subject_code: entry.code,
            subject_name: entry.name,
            attended_classes: entry.attended_classes,
            total_classes: entry.total_classes,
        }
    }

    pub fn to_submit_response(result: SubmitAttendanceResult) -> SubmitAttendanceResponse {
        SubmitAttendanceResponse {
            status: SUCCESS.to_string(),
            message: result.success_message,
            data: SubmitAttendanceData {
                attendance: Self::to_dto(result.attendance),
                overall_attendance: result.overall_attendance,
                stored_subjects: result.stored_subjects,
                discarded_subjects: result.discarded_subjects,
            },
        }
    }

    pub fn to_get_response(result: GetAttendanceResult) -> GetAttendanceResponse {
        GetAttendanceResponse {
            status: SUCCESS.to_string(),
            data: AttendanceData {
                attendance: Self::to_dto(result.attendance),
            },
        }
    }

    pub fn to_delete_response(result: DeleteAttendanceResult) -> DeleteAttendanceResponse {
        DeleteAttendanceResponse {
            status: SUCCESS.to_string(),
            message: result.success_message,
            deleted_count: result.deleted_count,
        }
    }

    pub fn to_cleanup_response(result: CleanupAttendanceResult) -> CleanupAttendanceResponse {
        CleanupAttendanceResponse {
            status: SUCCESS.to_string(),
            dry_run: result.dry_run,
            records_scanned: result.records_scanned,
            records_changed: result.records.len(),
            totals: result.totals,
            records: result
                .records
                .into_iter()
                .map(|r| RecordCleanupReport {
                    student_id: r.student_id,
                    counts: r.counts,
                })
                .collect(),
            failed: result
                .failed
                .into_iter()
                .map(|f| RecordCleanupFailure {
                    student_id: f.student_id,
                    code: f.code.to_string(),
                    message: f.message,
                })
                .collect(),
        }
    }

    /// Convert a domain error to its status code and response body
    pub fn to_error_response(
        error: &ReconciliationError,
        context: Option<ErrorContext>,
    ) -> (StatusCode, ErrorResponse) {
        let fail = |code: &str, message: String| ErrorResponse {
            status: "fail".to_string(),
            code: code.to_string(),
            message,
            details: None,
            invalid_subjects: None,
            validation_errors: None,
            context: None,
        };

        match error {
            ReconciliationError::Shape(shape) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    details: Some(shape.details()),
                    context,
                    ..fail(shape.code(), shape.to_string())
                },
            ),
            ReconciliationError::InvalidSubjects(invalid) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    details: Some(format!("{} subject(s) have validation errors", invalid.len())),
                    invalid_subjects: Some(invalid.iter().map(Self::to_invalid_subject_dto).collect()),
                    context,
                    ..fail("invalid_subjects", error.to_string())
                },
            ),
            ReconciliationError::NoValidSubjects => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    details: Some(
                        "All subjects were filtered out due to invalid data (missing values, 'No Data' entries, numeric-only names, or zero totals)"
                            .to_string(),
                    ),
                    context,
                    ..fail("no_valid_subjects", error.to_string())
                },
            ),
            ReconciliationError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    context,
                    ..fail("attendance_not_found", "Attendance not found".to_string())
                },
            ),
            ReconciliationError::Persistence(persistence) => match persistence {
                PersistenceError::Schema(violations) => (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        details: Some(format!("{} field(s) failed validation", violations.len())),
                        validation_errors: Some(violations.iter().map(Self::to_field_error_dto).collect()),
                        context,
                        ..fail(
                            persistence.code(),
                            "Validation failed while saving attendance data".to_string(),
                        )
                    },
                ),
                PersistenceError::Conflict { .. } => (
                    StatusCode::CONFLICT,
                    ErrorResponse {
                        details: Some(
                            "The record changed while this request was processed; retry the request".to_string(),
                        ),
                        context,
                        ..fail(persistence.code(), error.to_string())
                    },
                ),
                PersistenceError::Database(_) | PersistenceError::Encoding(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        status: "error".to_string(),
                        context,
                        ..fail(
                            persistence.code(),
                            "Database error while processing attendance".to_string(),
                        )
                    },
                ),
            },
        }
    }

    fn to_invalid_subject_dto(invalid: &DomainInvalidSubject) -> SharedInvalidSubject {
        SharedInvalidSubject {
            index: invalid.index,
            subject_name: invalid.subject_name.clone(),
            subject_code: invalid.subject_code.clone(),
            errors: invalid.violations.iter().map(|v| v.code().to_string()).collect(),
        }
    }

    fn to_field_error_dto(violation: &FieldViolation) -> FieldValidationError {
        FieldValidationError {
            path: violation.path.clone(),
            message: violation.message.clone(),
            value: violation.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::attendance::CleanupFailure;
    use crate::domain::models::AttendanceRecord;
    use crate::domain::subject_validator::SubjectViolation;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_to_dto_orders_semesters_and_months() {
        let mut record = AttendanceRecord::new("student-1");
        for (semester, month) in [(2, 5), (1, 9), (2, 1)] {
            record
                .semesters
                .entry(semester)
                .or_default()
                .months
                .insert(month, Default::default());
        }
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let dto = AttendanceMapper::to_dto(StoredAttendance {
            record,
            version: 3,
            created_at: created,
            updated_at: created,
        });

        let layout: Vec<(u32, Vec<u32>)> = dto
            .semesters
            .iter()
            .map(|s| (s.semester, s.months.iter().map(|m| m.month).collect()))
            .collect();
        assert_eq!(layout, vec![(1, vec![9]), (2, vec![1, 5])]);
        assert_eq!(dto.created_at, "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_missing_fields_map_to_shape_errors() {
        let request = SubmitAttendanceRequest {
            semester: Some(1),
            month: None,
            subjects: None,
        };
        let error = AttendanceMapper::to_submit_command("student-1", request).unwrap_err();
        assert_eq!(error, SubmissionShapeError::MissingMonth);
    }

    fn context() -> ErrorContext {
        ErrorContext {
            student_id: "student-1".to_string(),
            semester: Some(1),
            month: Some(2),
        }
    }

    #[test]
    fn test_invalid_subjects_error_body() {
        let error = ReconciliationError::InvalidSubjects(vec![DomainInvalidSubject {
            index: 2,
            subject_name: "Maths".to_string(),
            subject_code: "Not provided".to_string(),
            violations: vec![SubjectViolation::AttendedExceedsTotal],
        }]);

        let (status, body) = AttendanceMapper::to_error_response(&error, Some(context()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "fail");
        assert_eq!(body.code, "invalid_subjects");
        assert_eq!(body.context, Some(context()));
        assert_eq!(body.details.as_deref(), Some("1 subject(s) have validation errors"));

        let invalid = body.invalid_subjects.unwrap();
        assert_eq!(invalid[0].index, 2);
        assert_eq!(invalid[0].errors, vec!["attended_exceeds_total"]);
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let error = ReconciliationError::Persistence(PersistenceError::Database(sqlx::Error::PoolTimedOut));

        let (status, body) = AttendanceMapper::to_error_response(&error, Some(context()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, "error");
        assert_eq!(body.code, "storage_error");
        assert!(body.details.is_none());
        assert!(body.validation_errors.is_none());
        assert_eq!(body.context, Some(context()));
    }

    #[test]
    fn test_schema_violations_map_to_400_with_field_paths() {
        let error = ReconciliationError::Persistence(PersistenceError::Schema(vec![
            FieldViolation {
                path: "semesters.0.semester".to_string(),
                message: "must be a positive integer".to_string(),
                value: "0".to_string(),
            },
            FieldViolation {
                path: "semesters.0.months.0.overallAttendance".to_string(),
                message: "must be between 0 and 100".to_string(),
                value: "120".to_string(),
            },
        ]));

        let (status, body) = AttendanceMapper::to_error_response(&error, Some(context()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "fail");
        assert_eq!(body.code, "schema_validation_failed");
        assert_eq!(body.details.as_deref(), Some("2 field(s) failed validation"));
        assert_eq!(body.context, Some(context()));

        let errors = body.validation_errors.unwrap();
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["semesters.0.semester", "semesters.0.months.0.overallAttendance"]);
        assert_eq!(errors[1].message, "must be between 0 and 100");
        assert_eq!(errors[1].value, "120");
    }

    #[test]
    fn test_cleanup_response_lists_failures() {
        let result = CleanupAttendanceResult {
            dry_run: false,
            records_scanned: 2,
            records: vec![],
            failed: vec![CleanupFailure {
                student_id: "student-1".to_string(),
                code: "schema_validation_failed",
                message: "Attendance document failed schema validation (1 field(s))".to_string(),
            }],
            totals: Default::default(),
        };

        let response = AttendanceMapper::to_cleanup_response(result);
        assert_eq!(response.records_changed, 0);
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].student_id, "student-1");
        assert_eq!(response.failed[0].code, "schema_validation_failed");
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let error = ReconciliationError::Persistence(PersistenceError::Conflict {
            student_id: "student-1".to_string(),
        });
        let (status, body) = AttendanceMapper::to_error_response(&error, None);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.code, "concurrent_modification");
    }
}

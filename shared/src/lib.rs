use serde::{Deserialize, Serialize};

/// One subject row as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAttendance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_code: Option<String>,
    pub subject_name: String,
    pub attended_classes: u32,
    pub total_classes: u32,
}

/// Attendance for a single month of a semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAttendance {
    /// Calendar month, 1-12
    pub month: u32,
    pub subjects: Vec<SubjectAttendance>,
    /// Percentage in the range 0-100
    pub overall_attendance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterAttendance {
    pub semester: u32,
    pub months: Vec<MonthAttendance>,
}

/// The full attendance record of one student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub semesters: Vec<SemesterAttendance>,
    /// Human-readable timestamp with timezone (RFC 3339)
    pub created_at: String,
    /// Human-readable timestamp with timezone (RFC 3339)
    pub updated_at: String,
}

/// Body of `POST /api/students/attendance/{studentId}`.
///
/// Every field is optional at the decoding stage so that a missing field can
/// be reported with a specific error code instead of a generic decode failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceRequest {
    #[serde(default)]
    pub semester: Option<i64>,
    #[serde(default)]
    pub month: Option<i64>,
    #[serde(default)]
    pub subjects: Option<Vec<SubjectSubmission>>,
}

/// One subject entry as submitted by a client
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSubmission {
    #[serde(default)]
    pub subject_code: Option<String>,
    #[serde(default)]
    pub subject_name: Option<String>,
    #[serde(default)]
    pub attended_classes: Option<i64>,
    #[serde(default)]
    pub total_classes: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceResponse {
    pub status: String,
    pub message: String,
    pub data: SubmitAttendanceData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceData {
    pub attendance: AttendanceRecord,
    /// Percentage computed over the submitted batch, before junk filtering
    pub overall_attendance: f64,
    /// Number of submitted subjects that were stored
    pub stored_subjects: usize,
    /// Number of submitted subjects discarded as placeholder rows
    pub discarded_subjects: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAttendanceResponse {
    pub status: String,
    pub data: AttendanceData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceData {
    pub attendance: AttendanceRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAttendanceResponse {
    pub status: String,
    pub message: String,
    pub deleted_count: u64,
}

/// Query string of the maintenance cleanup endpoint
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupAttendanceRequest {
    /// Report only, without writing (defaults to true)
    #[serde(default)]
    pub dry_run: Option<bool>,
}

/// Counters describing what a cleanup pass found
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupCounts {
    /// Semesters numbered 0, dropped with everything in them
    pub invalid_semesters: usize,
    /// Months outside 1-12, dropped with everything in them
    pub invalid_months: usize,
    pub duplicate_semesters: usize,
    pub duplicate_months: usize,
    pub duplicate_subjects: usize,
    pub invalid_subjects: usize,
    pub subjects_before: usize,
    pub subjects_after: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCleanupReport {
    pub student_id: String,
    pub counts: CleanupCounts,
}

/// A record the cleanup pass could not repair or write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCleanupFailure {
    pub student_id: String,
    /// Error code, e.g. `schema_validation_failed`
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupAttendanceResponse {
    pub status: String,
    pub dry_run: bool,
    pub records_scanned: usize,
    pub records_changed: usize,
    pub totals: CleanupCounts,
    /// Only records that needed changes are listed
    pub records: Vec<RecordCleanupReport>,
    /// Records left untouched because cleaning them failed
    pub failed: Vec<RecordCleanupFailure>,
}

/// A submitted subject that failed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidSubject {
    /// 1-based position in the submitted list
    pub index: usize,
    pub subject_name: String,
    pub subject_code: String,
    /// Violated rule codes, e.g. `attended_exceeds_total`
    pub errors: Vec<String>,
}

/// A field of the stored document that failed schema validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidationError {
    /// Dotted path, e.g. `semesters.0.months.1.overallAttendance`
    pub path: String,
    pub message: String,
    pub value: String,
}

/// Request context echoed back on failures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorContext {
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
}

/// Uniform error body for every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// `fail` for client errors, `error` for server errors
    pub status: String,
    /// Machine-readable error code, e.g. `no_valid_subjects`
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_subjects: Option<Vec<InvalidSubject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<FieldValidationError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
}

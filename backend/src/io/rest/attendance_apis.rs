//! # REST API for Student Attendance
//!
//! Endpoints for submitting, retrieving, deleting and cleaning up attendance
//! records.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use tracing::{error, info, warn};

use crate::domain::commands::attendance::{
    CleanupAttendanceCommand, DeleteAttendanceCommand, GetAttendanceCommand,
};
use crate::domain::errors::{ReconciliationError, SubmissionShapeError};
use crate::io::rest::mappers::AttendanceMapper;
use crate::AppState;
use shared::{CleanupAttendanceRequest, ErrorContext, SubmitAttendanceRequest};

/// Create a router for attendance related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/maintenance/cleanup", post(cleanup_attendance))
        .route(
            "/:student_id",
            post(submit_attendance).get(get_attendance).delete(delete_attendance),
        )
}

/// Submit one month of attendance for a student
pub async fn submit_attendance(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    payload: Result<Json<SubmitAttendanceRequest>, JsonRejection>,
) -> Response {
    info!("POST /api/students/attendance/{}", student_id);

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ReconciliationError::from(SubmissionShapeError::MalformedBody(rejection.body_text()));
            return error_reply(&error, Some(error_context(&student_id, None, None)));
        }
    };

    let context = error_context(&student_id, request.semester, request.month);
    let command = match AttendanceMapper::to_submit_command(&student_id, request) {
        Ok(command) => command,
        Err(e) => return error_reply(&ReconciliationError::from(e), Some(context)),
    };

    match state.attendance_service.submit_attendance(command).await {
        Ok(result) => {
            let response = AttendanceMapper::to_submit_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_reply(&e, Some(context)),
    }
}

/// Get the full attendance record of a student
pub async fn get_attendance(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Response {
    info!("GET /api/students/attendance/{}", student_id);

    let command = GetAttendanceCommand {
        student_id: student_id.clone(),
    };

    match state.attendance_service.get_attendance(command).await {
        Ok(result) => {
            let response = AttendanceMapper::to_get_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_reply(&e, Some(error_context(&student_id, None, None))),
    }
}

/// Delete every attendance record of a student
pub async fn delete_attendance(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Response {
    info!("DELETE /api/students/attendance/{}", student_id);

    let command = DeleteAttendanceCommand {
        student_id: student_id.clone(),
    };

    match state.attendance_service.delete_attendance(command).await {
        Ok(result) => {
            let response = AttendanceMapper::to_delete_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_reply(&e, Some(error_context(&student_id, None, None))),
    }
}

/// Normalize stored records; reports only unless `dryRun=false`
pub async fn cleanup_attendance(
    State(state): State<AppState>,
    params: Result<Query<CleanupAttendanceRequest>, QueryRejection>,
) -> Response {
    info!("POST /api/students/attendance/maintenance/cleanup");

    let request = match params {
        Ok(Query(request)) => request,
        Err(rejection) => {
            let error = ReconciliationError::from(SubmissionShapeError::MalformedBody(rejection.body_text()));
            return error_reply(&error, None);
        }
    };

    let command = CleanupAttendanceCommand {
        dry_run: request.dry_run.unwrap_or(true),
    };

    match state.attendance_service.cleanup_attendance(command).await {
        Ok(result) => {
            let response = AttendanceMapper::to_cleanup_response(result);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_reply(&e, None),
    }
}

fn error_context(student_id: &str, semester: Option<i64>, month: Option<i64>) -> ErrorContext {
    ErrorContext {
        student_id: student_id.to_string(),
        semester,
        month,
    }
}

fn error_reply(error: &ReconciliationError, context: Option<ErrorContext>) -> Response {
    let (status, body) = AttendanceMapper::to_error_response(error, context);
    if status.is_server_error() {
        error!("Attendance request failed: {}", error);
    } else {
        warn!("Attendance request rejected ({}): {}", body.code, error);
    }
    (status, Json(body)).into_response()
}

//! # Attendance Tracker Backend
//!
//! REST backend that reconciles periodic attendance submissions into each
//! student's semester, month and subject record.
//!
//! ## Layers
//!
//! - **domain**: Validation, aggregation, junk filtering, merging and maintenance
//! - **storage**: SQLite persistence of versioned attendance documents
//! - **io**: Axum handlers and DTO mapping
//! - **config**: Command-line and environment settings

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::domain::AttendanceService;
use crate::storage::{AttendanceRepository, DbConnection};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub attendance_service: AttendanceService,
}

impl AppState {
    /// Build the services on top of an open database connection
    pub fn new(db_conn: DbConnection, config: &Config) -> Self {
        let repository = AttendanceRepository::new(db_conn);
        let attendance_service = AttendanceService::new(
            Arc::new(repository),
            config.overall_attendance_basis.into(),
            config.minimum_attendance,
        );

        Self { attendance_service }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db_conn = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!(
        "Setting up domain model (overall attendance basis: {:?}, minimum attendance: {}%)",
        config.overall_attendance_basis, config.minimum_attendance
    );
    Ok(AppState::new(db_conn, config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;

    Ok(Router::new()
        .nest("/api/students/attendance", io::rest::attendance_apis::router())
        .merge(io::rest::health_apis::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Ok(match allowed_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid allowed origin {}", origin))?;
            cors.allow_origin(origin)
        }
        None => cors.allow_origin(Any),
    })
}

//! # IO Module
//!
//! The adapter layer between HTTP clients and the domain logic.
//!
//! Translates requests into domain commands and domain results into response
//! DTOs from the `shared` crate. Services are injected through Axum state.
//!
//! ## Supported Operations
//!
//! - **POST /api/students/attendance/{studentId}**: Reconcile one month of attendance
//! - **GET /api/students/attendance/{studentId}**: Full record of a student
//! - **DELETE /api/students/attendance/{studentId}**: Remove a student's record
//! - **POST /api/students/attendance/maintenance/cleanup**: Normalize stored records
//! - **GET /health**: Liveness check

pub mod rest;

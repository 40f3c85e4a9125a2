//! # Domain Module
//!
//! Contains the business logic of the attendance tracker.
//!
//! This module reconciles periodic attendance submissions into each student's
//! nested record (semester, month, subject). It operates independently of the
//! HTTP layer and of the storage backend.
//!
//! ## Module Organization
//!
//! - **subject_validator**: Structural and numeric checks on submitted subjects
//! - **attendance_aggregator**: Weighted attendance percentage
//! - **junk_filter**: Detection of placeholder rows exported by source systems
//! - **merge_engine**: Locating or creating semester and month nodes and merging subjects by key
//! - **record_maintenance**: Normalization of previously stored records
//! - **student_locks**: Per-student serialization of read-modify-write cycles
//! - **attendance_service**: Orchestration and persistence
//!
//! ## Business Rules
//!
//! - A subject is identified by its code when one is given, otherwise by its name
//! - Subjects are replaced wholesale when their key reappears in the same month
//! - Semesters and months are created lazily on first submission
//! - Nothing is written unless the whole submission is accepted

pub mod attendance_aggregator;
pub mod attendance_service;
pub mod commands;
pub mod errors;
pub mod junk_filter;
pub mod merge_engine;
pub mod models;
pub mod record_maintenance;
pub mod student_locks;
pub mod subject_validator;

pub use attendance_service::AttendanceService;
pub use commands::*;
pub use errors::{ReconciliationError, SubmissionShapeError};

//! # REST API Interface Layer
//!
//! Provides HTTP REST endpoints for the attendance tracker.
//! This layer handles:
//! - HTTP request/response serialization and deserialization
//! - Mapping request DTOs to domain commands
//! - Error translation from domain errors to HTTP status codes and JSON bodies
//! - Request logging
//!
//! It carries no business logic; every decision is made by the domain layer.

pub mod attendance_apis;
pub mod health_apis;
pub mod mappers;

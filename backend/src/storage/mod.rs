//! # Storage Module
//!
//! Persistence of attendance records.
//!
//! The domain layer only sees the [`AttendanceStorage`] trait, so the SQLite
//! implementation here can be replaced without touching the reconciliation
//! logic. Each record is stored as a single JSON document guarded by a
//! version number; a write is one statement, so either the whole merged
//! record is saved or nothing is.

pub mod connection;
pub mod document;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::AttendanceRepository;
pub use traits::{AttendanceStorage, PersistenceError, StoredDocument};

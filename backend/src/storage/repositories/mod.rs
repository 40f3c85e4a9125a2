// Repository modules
pub mod attendance_repository;

// Re-export repository types
pub use attendance_repository::AttendanceRepository;

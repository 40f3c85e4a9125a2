pub mod attendance_mapper;

pub use attendance_mapper::AttendanceMapper;

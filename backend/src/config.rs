//! Command-line and environment configuration.

use clap::{Parser, ValueEnum};

use crate::domain::models::OverallAttendanceBasis;

/// Which subjects a stored month percentage is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BasisArg {
    /// Every subject stored for the month after the merge
    MergedMonth,
    /// The latest submitted batch, placeholder rows included
    Submission,
}

impl From<BasisArg> for OverallAttendanceBasis {
    fn from(arg: BasisArg) -> Self {
        match arg {
            BasisArg::MergedMonth => OverallAttendanceBasis::MergedMonth,
            BasisArg::Submission => OverallAttendanceBasis::Submission,
        }
    }
}

/// Command-line arguments for the attendance backend
#[derive(Parser, Debug, Clone)]
#[command(name = "attendance-tracker-backend")]
#[command(about = "Student attendance reconciliation service")]
#[command(version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000", env = "ATTENDANCE_BIND")]
    pub bind: String,

    /// SQLite database URL
    #[arg(long, default_value = "sqlite:attendance.db", env = "ATTENDANCE_DATABASE_URL")]
    pub database_url: String,

    /// Percentage below which a submission is logged as a warning
    #[arg(long, default_value_t = 75.0, env = "ATTENDANCE_MINIMUM_PERCENT")]
    pub minimum_attendance: f64,

    /// How stored month percentages are computed
    #[arg(long, value_enum, default_value_t = BasisArg::MergedMonth, env = "ATTENDANCE_OVERALL_BASIS")]
    pub overall_attendance_basis: BasisArg,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info", env = "ATTENDANCE_LOG")]
    pub log_filter: String,

    /// Origin allowed to call the API from a browser (any origin when unset)
    #[arg(long, env = "ATTENDANCE_ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            database_url: "sqlite:attendance.db".to_string(),
            minimum_attendance: 75.0,
            overall_attendance_basis: BasisArg::MergedMonth,
            log_filter: "info".to_string(),
            allowed_origin: None,
        }
    }
}

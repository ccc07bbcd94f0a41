use std::fmt;

use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

/// Machine-readable reason attached to every validation failure. The UI
/// switches its inline form messages on this code rather than on the
/// display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    MissingTitle,
    InvalidCategory,
    InvalidRecurrence,
    MissingDate,
    MissingTime,
    MissingCustomSchedule,
    InvalidWeekday,
    EmptyTimesForWeekday,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationCode::MissingTitle => "MISSING_TITLE",
            ValidationCode::InvalidCategory => "INVALID_CATEGORY",
            ValidationCode::InvalidRecurrence => "INVALID_RECURRENCE",
            ValidationCode::MissingDate => "MISSING_DATE",
            ValidationCode::MissingTime => "MISSING_TIME",
            ValidationCode::MissingCustomSchedule => "MISSING_CUSTOM_SCHEDULE",
            ValidationCode::InvalidWeekday => "INVALID_WEEKDAY",
            ValidationCode::EmptyTimesForWeekday => "EMPTY_TIMES_FOR_WEEKDAY",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {message}")]
    Database { message: String },

    #[error("record not found")]
    NotFound,

    #[error("validation failed ({code}): {message}")]
    Validation {
        code: ValidationCode,
        message: String,
    },

    /// Raised by the platform notification boundary. Always caught and
    /// logged by the scheduler; the alarm record stays the source of
    /// truth and the next reseed self-heals.
    #[error("scheduling failed: {message}")]
    Scheduling { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", code = %code, %message, "validation error");
        AppError::Validation { code, message }
    }

    pub fn scheduling(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::notify", %message, "scheduling error");
        AppError::Scheduling { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::db", "resource not found");
        AppError::NotFound
    }

    pub fn database(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::db", %message, "database error");
        AppError::Database { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            AppError::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::QueryReturnedNoRows;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            _ => {
                error!(target: "app::db", error = ?error, "sqlite error");
                AppError::database(error.to_string())
            }
        }
    }
}

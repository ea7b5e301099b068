//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the engine can surface: request validation, lifecycle
//! conflicts, calculation failures and storage problems.

use thiserror::Error;

use crate::models::PayrollStatus;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type. Every variant owns
/// its data, so errors can be cloned and broadcast to run-outcome subscribers.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::AlreadyProcessed { year: 2025, month: 6 };
/// assert_eq!(error.to_string(), "Payroll 2025-06 has already been processed");
/// ```
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A request field was missing or out of range.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The requested period or payslip does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        /// Description of the missing resource.
        resource: String,
    },

    /// The period was already processed and can never be run again.
    #[error("Payroll {year}-{month:02} has already been processed")]
    AlreadyProcessed {
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// A run for the period is currently in flight.
    #[error("Payroll {year}-{month:02} is currently being processed")]
    AlreadyRunning {
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
    },

    /// An execution found the locked period in an unexpected status.
    #[error("Invalid payroll state: expected {expected}, found {actual}")]
    InvalidState {
        /// The status the operation required.
        expected: PayrollStatus,
        /// The status actually observed under the lock.
        actual: PayrollStatus,
    },

    /// A summary was requested before the period finished processing.
    #[error("Payroll {year}-{month:02} has not been processed (status: {status})")]
    NotProcessed {
        /// Period year.
        year: i32,
        /// Period month.
        month: u32,
        /// The current status of the period.
        status: PayrollStatus,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// The storage backend failed or rejected a write.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the storage failure.
        message: String,
    },

    /// A breakdown could not be serialized or deserialized.
    #[error("Serialization error: {message}")]
    Serialization {
        /// A description of the serialization failure.
        message: String,
    },

    /// The run queue has no live worker to accept jobs.
    #[error("Payroll run queue is closed")]
    QueueClosed,
}

impl EngineError {
    /// Creates a validation error for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization {
            message: err.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

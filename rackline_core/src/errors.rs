//! # Error Types
//!
//! Structured error types for rackline_core. Each variant carries enough
//! context for the UI (or any other caller) to explain what went wrong and
//! whether retrying makes sense.
//!
//! ## Example
//!
//! ```rust
//! use rackline_core::errors::{CalcError, CalcResult};
//!
//! fn check_load(it_load_kw: f64) -> CalcResult<()> {
//!     if it_load_kw <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "itLoad",
//!             it_load_kw.to_string(),
//!             "IT load must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_load(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for rackline_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation and layout operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// Input parameters failed validation. All violations are listed.
    #[error("Validation failed: {}", .errors.join(", "))]
    Validation { errors: Vec<String> },

    /// A single input value is invalid (duplicate id, unknown endpoint, ...)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Formula evaluation hit a degenerate case validation does not cover
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// The layout store rejected or failed an operation
    #[error("Persistence error: {operation} - {reason}")]
    Persistence { operation: String, reason: String },

    /// Undo/redo history is inconsistent
    #[error("History error: {reason}")]
    History { reason: String },

    /// Referenced entity does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch on a stored layout
    #[error("Version mismatch: document version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create a Validation error from a list of violations
    pub fn validation(errors: Vec<String>) -> Self {
        CalcError::Validation { errors }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(
        calculation_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a Persistence error
    pub fn persistence(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::Persistence {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a History error
    pub fn history(reason: impl Into<String>) -> Self {
        CalcError::History {
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CalcError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::Persistence { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Validation { .. } => "VALIDATION_FAILED",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::Persistence { .. } => "PERSISTENCE_ERROR",
            CalcError::History { .. } => "HISTORY_ERROR",
            CalcError::NotFound { .. } => "NOT_FOUND",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_errors() {
        let error = CalcError::validation(vec![
            "Voltage must be positive".to_string(),
            "Current must be positive".to_string(),
        ]);
        assert_eq!(
            error.to_string(),
            "Validation failed: Voltage must be positive, Current must be positive"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("itLoad", "-5", "IT load must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::history("index out of range").error_code(), "HISTORY_ERROR");
        assert_eq!(CalcError::not_found("Module", "m-1").error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_only_persistence_is_recoverable() {
        assert!(CalcError::persistence("update layout", "offline").is_recoverable());
        assert!(!CalcError::calculation_failed("economic", "zero power cost").is_recoverable());
    }
}

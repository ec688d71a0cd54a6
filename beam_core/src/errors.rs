//! # Error Types
//!
//! Structured error types for beam_core. Only conditions that abort a beam's
//! analysis (or a whole optimization) are errors; recoverable design and
//! detailing problems are reported as status fields on the result records.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{CalcError, CalcResult};
//!
//! fn validate_length(length_m: f64) -> CalcResult<()> {
//!     if length_m <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "length_m",
//!             length_m.to_string(),
//!             "Span length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for beam_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, dangling index, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Beam has no nodes or no spans
    #[error("Missing topology on beam '{beam_id}': {reason}")]
    MissingTopology { beam_id: String, reason: String },

    /// Reduced stiffness matrix is singular (under-restrained structure)
    #[error("Singular structure on beam '{beam_id}' ({free_dofs} free DOFs) - check that the beam is stable")]
    SingularStructure { beam_id: String, free_dofs: usize },

    /// Calculation failed for a reason not covered above
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// Optimizer found no candidate height passing every check
    #[error("No feasible section for beam '{beam_id}' among {trials} candidate heights")]
    NoFeasibleSection { beam_id: String, trials: usize },

    /// Cooperative cancellation was observed
    #[error("Cancelled during {stage}")]
    Cancelled { stage: String },

    /// Settings file could not be read, parsed or validated
    #[error("Configuration error in '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingTopology error
    pub fn missing_topology(beam_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::MissingTopology {
            beam_id: beam_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a SingularStructure error
    pub fn singular_structure(beam_id: impl Into<String>, free_dofs: usize) -> Self {
        CalcError::SingularStructure {
            beam_id: beam_id.into(),
            free_dofs,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a Cancelled error
    pub fn cancelled(stage: impl Into<String>) -> Self {
        CalcError::Cancelled { stage: stage.into() }
    }

    /// Create a ConfigError
    pub fn config_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that only abort the current beam, not the batch
    pub fn is_per_beam(&self) -> bool {
        matches!(
            self,
            CalcError::MissingTopology { .. }
                | CalcError::SingularStructure { .. }
                | CalcError::InvalidInput { .. }
                | CalcError::CalculationFailed { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingTopology { .. } => "MISSING_TOPOLOGY",
            CalcError::SingularStructure { .. } => "SINGULAR_STRUCTURE",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::NoFeasibleSection { .. } => "NO_FEASIBLE_SECTION",
            CalcError::Cancelled { .. } => "CANCELLED",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
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
    fn test_error_serialization() {
        let error = CalcError::singular_structure("V1", 4);
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
        assert!(json.contains("SingularStructure"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CalcError::calculation_failed("stiffness", "NaN").error_code(),
            "CALCULATION_FAILED"
        );
        assert_eq!(CalcError::missing_topology("V1", "no spans").error_code(), "MISSING_TOPOLOGY");
        assert_eq!(CalcError::cancelled("batch").error_code(), "CANCELLED");
    }

    #[test]
    fn test_per_beam_classification() {
        assert!(CalcError::singular_structure("V1", 2).is_per_beam());
        assert!(CalcError::missing_topology("V1", "no nodes").is_per_beam());
        assert!(!CalcError::cancelled("batch").is_per_beam());
    }
}

//! Error types for the neuron core and its harness

use thiserror::Error;

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while configuring the core or building a stimulus schedule.
///
/// The clocked state machine itself has no error path: every bus word is
/// well-formed, so these only come out of parameter and scenario validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Invalid stimulus scenario
    #[error("Invalid scenario '{scenario}': {reason}")]
    InvalidScenario {
        /// Scenario name
        scenario: String,
        /// Reason the scenario was rejected
        reason: String,
    },
}

impl CoreError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid scenario error
    pub fn invalid_scenario(scenario: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScenario {
            scenario: scenario.into(),
            reason: reason.into(),
        }
    }
}

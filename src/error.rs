//! Errors raised by the step layout engine.

use thiserror::Error;

/// Errors specific to step configuration, layout and state changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepError {
    /// Empty title list, bad radius, mismatched step count and similar
    #[error("invalid step configuration: {0}")]
    InvalidConfig(String),

    #[error("step index {index} is out of range for {step_count} steps")]
    OutOfRange { index: usize, step_count: usize },

    /// Geometry was queried before a width was reported and laid out
    #[error("step geometry has not been laid out")]
    NotLaidOut,
}

impl StepError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        StepError::InvalidConfig(message.into())
    }

    /// Whether the caller passed a bad index (as opposed to a bad setup)
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StepError::OutOfRange { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = StepError::OutOfRange {
            index: 5,
            step_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "step index 5 is out of range for 3 steps"
        );
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_invalid_config_message() {
        let err = StepError::invalid_config("no titles");
        assert_eq!(err.to_string(), "invalid step configuration: no titles");
        assert!(!err.is_out_of_range());
    }
}

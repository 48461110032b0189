//! Error types for RiskGuard Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid case transition for {case_number}: {from} -> {to}")]
    InvalidTransition {
        case_number: String,
        from: String,
        to: String,
    },

    #[error("Alert already acknowledged: {0}")]
    AlreadyAcknowledged(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let err = CoreError::InvalidInput("amount must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: amount must be positive");
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = CoreError::InvalidTransition {
            case_number: "CASE-20240101-ABCDEFGH".to_string(),
            from: "RESOLVED".to_string(),
            to: "INVESTIGATING".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid case transition for CASE-20240101-ABCDEFGH: RESOLVED -> INVESTIGATING"
        );
    }
}

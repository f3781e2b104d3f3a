//! Error types for Turnstile
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Turnstile
#[derive(Debug, Error)]
pub enum TurnstileError {
    /// Configuration rejected by validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Participant ID outside 1..=N
    #[error("Unknown participant: {0}")]
    UnknownParticipant(u32),

    /// Token advanced by a participant that does not hold it
    #[error("Not participant {id}'s turn (token held by {current})")]
    NotYourTurn { id: u32, current: u32 },

    /// Invalid state transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Shared token lock poisoned by a panicking participant
    #[error("Lock poisoned: {0}")]
    Poisoned(String),

    /// A participant left the rotation without passing the token on
    #[error("Participant {0} abandoned the turn rotation")]
    Abandoned(u32),

    /// Participant thread panicked before finishing
    #[error("Participant {0} panicked")]
    ParticipantPanicked(u32),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Turnstile operations
pub type Result<T> = std::result::Result<T, TurnstileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_error() {
        let err = TurnstileError::InvalidConfig("participants must be > 0".to_string());
        assert_eq!(err.to_string(), "Invalid config: participants must be > 0");
    }

    #[test]
    fn test_unknown_participant_error() {
        let err = TurnstileError::UnknownParticipant(7);
        assert_eq!(err.to_string(), "Unknown participant: 7");
    }

    #[test]
    fn test_not_your_turn_error() {
        let err = TurnstileError::NotYourTurn { id: 2, current: 1 };
        assert_eq!(err.to_string(), "Not participant 2's turn (token held by 1)");
    }

    #[test]
    fn test_participant_panicked_error() {
        let err = TurnstileError::ParticipantPanicked(3);
        assert_eq!(err.to_string(), "Participant 3 panicked");
    }

    #[test]
    fn test_abandoned_error() {
        let err = TurnstileError::Abandoned(2);
        assert_eq!(err.to_string(), "Participant 2 abandoned the turn rotation");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: TurnstileError = json_err.into();
        assert!(matches!(err, TurnstileError::Json(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: TurnstileError = io_err.into();
        assert!(matches!(err, TurnstileError::Io(_)));
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<u32>("[not, a, number]").unwrap_err();
        let err: TurnstileError = yaml_err.into();
        assert!(matches!(err, TurnstileError::Yaml(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<u32> {
            Ok(1)
        }

        fn returns_err() -> Result<u32> {
            Err(TurnstileError::InvalidState("done".to_string()))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }
}

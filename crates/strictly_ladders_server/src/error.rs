//! Error types for sessions and configuration.

use crate::SessionId;
use derive_more::{Display, Error, From};
use strictly_ladders::GameError;
use tracing::instrument;

/// Error from a session-level operation.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// No session is registered under this id.
    #[display("Game {} not found", _0)]
    #[from(skip)]
    NotFound(#[error(not(source))] SessionId),

    /// The game rejected the operation.
    #[display("{}", _0)]
    Game(GameError),

    /// A snapshot could not be encoded for delivery.
    #[display("Failed to encode snapshot: {}", _0)]
    Encoding(serde_json::Error),
}

/// Configuration error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn parse_snapshot(raw: &str) -> Result<strictly_ladders::GameSnapshot, SessionError> {
        Ok(serde_json::from_str(raw)?)
    }

    #[test]
    fn test_session_error_sources() {
        let missing = SessionError::NotFound(SessionId::from(4));
        assert_eq!(missing.to_string(), "Game 4 not found");
        assert!(missing.source().is_none());

        let game = SessionError::from(GameError::GameAlreadyFinished);
        assert!(matches!(game, SessionError::Game(GameError::GameAlreadyFinished)));
        assert_eq!(game.to_string(), GameError::GameAlreadyFinished.to_string());
        assert!(game.source().is_some());

        let encoding = parse_snapshot("not json").unwrap_err();
        assert!(matches!(encoding, SessionError::Encoding(_)));
        assert!(encoding.source().is_some());
    }
}

//! Error types for board configuration and gameplay.

/// Error that can occur when building a board or driving a game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum GameError {
    /// Another player already uses this name (compared case-insensitively).
    #[display("Duplicate player name: {}", _0)]
    DuplicatePlayerName(String),

    /// A winner exists, so the game no longer accepts gameplay changes.
    #[display("Game already finished")]
    GameAlreadyFinished,

    /// Dice cannot be rolled before two players have joined.
    #[display("Need at least 2 players to roll, {} joined", joined)]
    InsufficientPlayers {
        /// Number of players that have joined so far.
        joined: usize,
    },

    /// A board dimension, entity, or layout broke a configuration rule.
    #[display("Invalid configuration: {}", _0)]
    InvalidConfiguration(String),
}

impl std::error::Error for GameError {}

//! Turn state machine: joining, rolling, moving, winning.
//!
//! The state machine never owns the board. Boards are immutable and passed
//! by reference, so a session can share one board across every reader while
//! only the turn state sits behind a lock.

use crate::invariants::{GameInvariants, InvariantSet};
use crate::{Board, DiceRoll, GameError, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// A player and where their piece stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct Player {
    name: String,
    /// `None` until the player's first move places them on the board.
    #[new(default)]
    position: Option<Point>,
}

impl Player {
    /// Player's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell the piece stands on, or `None` while unplaced.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Whether the piece has entered the board.
    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }
}

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GamePhase {
    /// Fewer than two players have joined.
    Lobby,
    /// Two or more players, no winner yet.
    Active,
    /// A player reached the final cell.
    Finished,
}

/// What a roll did to the acting player's piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// The piece moved and every redirect was followed.
    Moved {
        /// Cell the roll itself landed on.
        landed: Point,
        /// Cell the piece ended up on.
        to: Point,
        /// Number of redirects followed from `landed`.
        hops: usize,
    },
    /// The roll would pass the final cell; the piece stays where it is.
    Overshot,
}

/// Everything that happened during one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    /// Player who rolled.
    pub player: String,
    /// Face rolled.
    pub roll: DiceRoll,
    /// Position before the roll.
    pub from: Option<Point>,
    /// Effect on the piece.
    pub movement: Movement,
    /// Winner after this turn, if the game is over.
    pub winner: Option<String>,
}

/// Result of a dice-roll request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollOutcome {
    /// The game was already over; nothing changed and no die was rolled.
    AlreadyFinished {
        /// Name of the player who won earlier.
        winner: String,
    },
    /// A turn was played.
    Rolled(TurnReport),
}

impl RollOutcome {
    /// Face rolled, or `None` when the game was already over.
    pub fn roll(&self) -> Option<DiceRoll> {
        match self {
            RollOutcome::AlreadyFinished { .. } => None,
            RollOutcome::Rolled(turn) => Some(turn.roll),
        }
    }

    /// Winner after this request, if any.
    pub fn winner(&self) -> Option<&str> {
        match self {
            RollOutcome::AlreadyFinished { winner } => Some(winner),
            RollOutcome::Rolled(turn) => turn.winner.as_deref(),
        }
    }
}

/// Mutable state of one game: players in turn order, whose turn it is, the
/// last roll, and the winner.
///
/// Once a winner is set, no gameplay operation changes players, positions, or
/// the turn index again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    players: Vec<Player>,
    turn_index: usize,
    last_roll: Option<DiceRoll>,
    winner: Option<String>,
}

impl GameState {
    /// Creates an empty game in the lobby.
    pub fn new() -> Self {
        Self::default()
    }

    /// Players in join order, which is also turn order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Index of the player whose turn it is.
    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Player whose turn it is, if anyone has joined.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    /// Most recent roll, `None` before the first one.
    pub fn last_roll(&self) -> Option<DiceRoll> {
        self.last_roll
    }

    /// Winner's name, once decided.
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> GamePhase {
        if self.winner.is_some() {
            GamePhase::Finished
        } else if self.players.len() < 2 {
            GamePhase::Lobby
        } else {
            GamePhase::Active
        }
    }

    /// Appends a player at the end of the turn order, unplaced.
    ///
    /// # Errors
    ///
    /// - [`GameError::GameAlreadyFinished`] once a winner exists.
    /// - [`GameError::DuplicatePlayerName`] if the name matches an existing
    ///   player, ignoring case.
    #[instrument(skip(self, name), fields(name))]
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<(), GameError> {
        let name = name.into();
        tracing::Span::current().record("name", name.as_str());

        if self.winner.is_some() {
            warn!("Join rejected, game already finished");
            return Err(GameError::GameAlreadyFinished);
        }

        let lowered = name.to_lowercase();
        if self.players.iter().any(|p| p.name.to_lowercase() == lowered) {
            warn!("Join rejected, duplicate name");
            return Err(GameError::DuplicatePlayerName(name));
        }

        self.players.push(Player::new(name));
        info!(players = self.players.len(), "Player joined");
        Ok(())
    }

    /// Rolls the die for the current player and plays the turn.
    ///
    /// A finished game returns its winner without drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientPlayers`] while fewer than two players
    /// have joined.
    #[instrument(skip(self, board, rng))]
    pub fn roll<R: Rng + ?Sized>(
        &mut self,
        board: &Board,
        rng: &mut R,
    ) -> Result<RollOutcome, GameError> {
        if let Some(winner) = self.finished_winner()? {
            return Ok(RollOutcome::AlreadyFinished { winner });
        }
        let roll = DiceRoll::roll(rng);
        Ok(RollOutcome::Rolled(self.play_turn(board, roll)))
    }

    /// Plays the current player's turn with a predetermined roll.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientPlayers`] while fewer than two players
    /// have joined.
    #[instrument(skip(self, board))]
    pub fn apply_roll(&mut self, board: &Board, roll: DiceRoll) -> Result<RollOutcome, GameError> {
        if let Some(winner) = self.finished_winner()? {
            return Ok(RollOutcome::AlreadyFinished { winner });
        }
        Ok(RollOutcome::Rolled(self.play_turn(board, roll)))
    }

    /// Checks the roll preconditions, returning the winner of a finished game.
    fn finished_winner(&self) -> Result<Option<String>, GameError> {
        if self.players.len() < 2 {
            warn!(joined = self.players.len(), "Roll rejected, not enough players");
            return Err(GameError::InsufficientPlayers {
                joined: self.players.len(),
            });
        }
        Ok(self.winner.clone())
    }

    fn play_turn(&mut self, board: &Board, roll: DiceRoll) -> TurnReport {
        let dimension = board.dimension();
        self.last_roll = Some(roll);

        let player = &mut self.players[self.turn_index];
        let from = player.position;
        let step = usize::from(roll.value());
        let candidate = match from {
            // Entering the board: a roll of 1 lands on cell 0
            None => step - 1,
            Some(p) => p.index() + step,
        };

        let movement = match dimension.point(candidate) {
            None => {
                debug!(player = %player.name, candidate, "Roll overshoots final cell, piece stays");
                Movement::Overshot
            }
            Some(landed) => {
                let resolution = board.resolve(landed);
                player.position = Some(resolution.cell);
                debug!(
                    player = %player.name,
                    landed = landed.index(),
                    to = resolution.cell.index(),
                    hops = resolution.hops,
                    "Piece moved"
                );
                Movement::Moved {
                    landed,
                    to: resolution.cell,
                    hops: resolution.hops,
                }
            }
        };

        if player.position.map(|p| p.index()) == Some(dimension.final_cell()) {
            info!(winner = %player.name, "Player reached the final cell");
            self.winner = Some(player.name.clone());
        }
        let acting = player.name.clone();

        self.turn_index = (self.turn_index + 1) % self.players.len();

        debug_assert!(
            GameInvariants::check_all(self).is_ok(),
            "turn broke a game invariant: {:?}",
            GameInvariants::check_all(self)
        );

        TurnReport {
            player: acting,
            roll,
            from,
            movement,
            winner: self.winner.clone(),
        }
    }
}
